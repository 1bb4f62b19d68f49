use super::*;

#[test]
fn manual_pacer_jumps_to_deadlines() {
    let t0 = Instant::now();
    let mut p = ManualPacer::new(t0);
    p.sleep_until(t0 + Duration::from_millis(50));
    assert_eq!(p.now(), t0 + Duration::from_millis(50));
    // Deadlines in the past do not move the clock back.
    p.sleep_until(t0);
    assert_eq!(p.now(), t0 + Duration::from_millis(50));
    p.advance(Duration::from_millis(5));
    assert_eq!(p.now(), t0 + Duration::from_millis(55));
}

#[test]
fn manual_pacer_lag_accumulates() {
    let t0 = Instant::now();
    let mut p = ManualPacer::new(t0).with_lag(Duration::from_millis(10));
    p.sleep_until(t0);
    p.sleep_until(t0);
    assert_eq!(p.now(), t0 + Duration::from_millis(20));
}

#[test]
fn wall_clock_sleeps_until_the_deadline() {
    let mut p = WallClockPacer;
    let target = p.now() + Duration::from_millis(15);
    p.sleep_until(target);
    assert!(p.now() >= target);
}
