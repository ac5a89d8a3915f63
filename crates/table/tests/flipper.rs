use glam::Quat;
use table::{Actuator, FlipperSide, Gesture, InputEvent, Simulation, TableConfig};

const FRAME: f32 = 1.0 / 60.0;

fn assert_body_matches_node(sim: &Simulation, side: FlipperSide) {
    let flipper = sim.flipper(side);
    let node = sim.scene().node(flipper.node()).unwrap();
    let body = sim.world().motion_state(flipper.body()).unwrap();
    assert_eq!(body.orientation, node.orientation);
    assert_eq!(body.position, node.position);

    let expected = flipper.base_orientation() * Quat::from_rotation_y(flipper.offset());
    assert!(
        node.orientation.abs_diff_eq(expected, 1e-6),
        "{side:?} orientation {:?} != {expected:?}",
        node.orientation
    );
}

#[test]
fn rest_orientation_is_the_captured_base() {
    let mut sim = Simulation::new(TableConfig::default()).unwrap();
    let base = Quat::from_rotation_y(-0.3);
    let left = sim.flipper(FlipperSide::Left);
    assert!(left.base_orientation().abs_diff_eq(base, 1e-7));
    assert_eq!(left.effective_orientation(), left.base_orientation());

    sim.frame(FRAME).unwrap();
    let left = sim.flipper(FlipperSide::Left);
    let node = sim.scene().node(left.node()).unwrap();
    assert_eq!(node.orientation, left.base_orientation());
}

#[test]
fn left_flip_swings_up_and_back() {
    let mut sim = Simulation::new(TableConfig::default()).unwrap();
    sim.handle_input(InputEvent::press(Gesture::FlipLeft)).unwrap();

    let mut previous = 0.0;
    for frame in 1..=10 {
        sim.frame(FRAME).unwrap();
        let offset = sim.flipper(FlipperSide::Left).offset();
        assert!(offset >= previous, "frame {frame}: {offset} < {previous}");
        previous = offset;
        if frame == 3 {
            // Half of the 0.1 s swing is half of the eased angle
            assert!((offset - 0.3).abs() < 1e-3, "offset {offset}");
        }
        assert_body_matches_node(&sim, FlipperSide::Left);
    }
    let left = sim.flipper(FlipperSide::Left);
    assert_eq!(left.offset(), 0.6);
    assert!(!left.is_swinging());

    sim.handle_input(InputEvent::release(Gesture::FlipLeft)).unwrap();
    for _ in 0..10 {
        sim.frame(FRAME).unwrap();
        assert_body_matches_node(&sim, FlipperSide::Left);
    }
    assert_eq!(sim.flipper(FlipperSide::Left).offset(), 0.0);
}

#[test]
fn right_flip_swings_negative() {
    let mut sim = Simulation::new(TableConfig::default()).unwrap();
    sim.handle_input(InputEvent::press(Gesture::FlipRight)).unwrap();
    for _ in 0..10 {
        sim.frame(FRAME).unwrap();
    }
    assert_eq!(sim.flipper(FlipperSide::Right).offset(), -0.6);
    assert_eq!(sim.flipper(FlipperSide::Left).offset(), 0.0);
    assert_body_matches_node(&sim, FlipperSide::Right);
}

#[test]
fn release_mid_swing_retargets_from_current_angle() {
    let mut sim = Simulation::new(TableConfig::default()).unwrap();
    sim.handle_input(InputEvent::press(Gesture::FlipLeft)).unwrap();
    sim.frame(FRAME).unwrap();
    sim.frame(FRAME).unwrap();
    let mid = sim.flipper(FlipperSide::Left).offset();
    assert!(mid > 0.0 && mid < 0.6);

    sim.handle_input(InputEvent::release(Gesture::FlipLeft)).unwrap();
    sim.frame(FRAME).unwrap();
    let after = sim.flipper(FlipperSide::Left).offset();
    assert!(after < mid, "expected to head back down from {mid}, got {after}");
    assert!(after > 0.0);
}

#[test]
fn flipper_bodies_are_written_every_frame_without_input() {
    let mut sim = Simulation::new(TableConfig::default()).unwrap();
    let report = sim.frame(FRAME).unwrap();
    // Both flippers and the plunger
    assert_eq!(report.kinematic_synced, 3);
    assert_eq!(report.dynamic_synced, 0);
    assert_eq!(report.substeps, 1);
}
