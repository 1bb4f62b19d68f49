use super::*;

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(0, 200), 0);
    assert_eq!(mul_div255_u8(255, 128), 128);
}

#[test]
fn integer_harmonics_close_the_loop() {
    for k in 1..=4 {
        let start = harmonic(0.0, k, 0.7);
        let end = harmonic(TAU, k, 0.7);
        assert!((start - end).abs() < 1e-4, "k={k}");
    }
}

#[test]
fn wrap_coord_handles_negatives_and_garbage() {
    assert_eq!(wrap_coord(-1.0, 10), 9);
    assert_eq!(wrap_coord(10.0, 10), 0);
    assert_eq!(wrap_coord(25.2, 10), 5);
    assert_eq!(wrap_coord(f32::NAN, 10), 0);
    assert_eq!(wrap_coord(f32::INFINITY, 10), 0);
    assert_eq!(wrap_coord(3.0, 0), 0);
    assert!(wrap_coord(1e30, 7) < 7);
}

#[test]
fn px_offset_is_total() {
    assert_eq!(px_offset(2.6), 3);
    assert_eq!(px_offset(-2.6), -3);
    assert_eq!(px_offset(f32::NAN), 0);
}
