use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        LoopError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(LoopError::input("x").to_string().contains("input error:"));
    assert!(
        LoopError::unsupported("x")
            .to_string()
            .contains("unsupported capability:")
    );
    assert!(LoopError::encode("x").to_string().contains("encode error:"));
    assert!(LoopError::ExportBusy.to_string().contains("already in progress"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LoopError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
