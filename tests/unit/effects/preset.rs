use super::*;

#[test]
fn names_round_trip_through_parse() {
    for p in Preset::ALL {
        assert_eq!(Preset::parse(p.name()), Some(p));
    }
}

#[test]
fn aliases_are_accepted() {
    assert_eq!(Preset::parse("Orbital"), Some(Preset::Orbital));
    assert_eq!(Preset::parse("slice-split"), Some(Preset::SliceSplit));
    assert_eq!(Preset::parse("column_wave"), Some(Preset::ColumnWave));
    assert_eq!(Preset::parse("twist"), Some(Preset::Warp));
    assert_eq!(Preset::parse("scanline_glitch"), Some(Preset::Scanline));
    assert_eq!(Preset::parse("passthrough"), Some(Preset::None));
}

#[test]
fn unknown_names_fall_back_to_passthrough() {
    assert_eq!(Preset::parse("sparkles"), None);
    assert_eq!(Preset::from_name_or_passthrough("sparkles"), Preset::None);
    let p: Preset = serde_json::from_str("\"sparkles\"").unwrap();
    assert_eq!(p, Preset::None);
}

#[test]
fn serde_uses_stable_names() {
    let json = serde_json::to_string(&RenderParams::new(Preset::ColumnWave, 0.5)).unwrap();
    assert!(json.contains("\"melt\""));
    let back: RenderParams = serde_json::from_str(&json).unwrap();
    assert_eq!(back.preset, Preset::ColumnWave);
}

#[test]
fn non_finite_intensity_degrades_to_zero() {
    assert_eq!(RenderParams::new(Preset::Warp, f32::NAN).effective_intensity(), 0.0);
    assert_eq!(
        RenderParams::new(Preset::Warp, f32::INFINITY).effective_intensity(),
        0.0
    );
    assert_eq!(RenderParams::new(Preset::Warp, -1.5).effective_intensity(), -1.5);
}

#[test]
fn bands_tile_the_axis_without_gaps() {
    let (n, len) = (28u32, 960u32);
    let mut next = 0;
    for i in 0..n {
        let (a, b) = band_bounds(i, n, len);
        assert_eq!(a, next);
        assert!(b >= a);
        next = b;
    }
    assert_eq!(next, len);
    assert_eq!(band_bounds(0, 0, 10), (0, 0));
}
