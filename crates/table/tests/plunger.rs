use physics::ActivationState;
use table::config::PlungerConfig;
use table::{Actuator, Gesture, InputEvent, PlungerState, PlungerTunables, Simulation, TableConfig};

const FRAME: f32 = 1.0 / 60.0;

fn run(sim: &mut Simulation, frames: usize) {
    for _ in 0..frames {
        sim.frame(FRAME).unwrap();
    }
}

#[test]
fn impulse_is_linear_and_clamped() {
    let tunables = PlungerTunables::from(&PlungerConfig::default());
    assert!((tunables.impulse(0.0) - 8.0).abs() < 1e-6);
    assert!((tunables.impulse(1.0) - 26.5).abs() < 1e-5);
    assert!((tunables.impulse(2.0) - 45.0).abs() < 1e-6);
    assert!((tunables.impulse(3.5) - 45.0).abs() < 1e-6);

    let mut previous = tunables.impulse(0.0);
    for i in 1..=40 {
        let next = tunables.impulse(i as f32 * 0.1);
        assert!(next >= previous, "impulse decreased at {}s", i as f32 * 0.1);
        previous = next;
    }
}

#[test]
fn one_second_charge_launches_at_26_5() {
    let mut sim = Simulation::new(TableConfig::default()).unwrap();
    sim.handle_input(InputEvent::press(Gesture::Charge)).unwrap();
    let ball = sim.ball().expect("ball spawned on charge");
    run(&mut sim, 60);

    let shot = sim
        .handle_input(InputEvent::release(Gesture::Charge))
        .unwrap()
        .expect("charged plunger fires");
    assert!((shot.charge_seconds - 1.0).abs() < 1e-4);
    assert!((shot.impulse - 26.5).abs() < 1e-3, "impulse {}", shot.impulse);

    let velocity = sim.world().linear_velocity(ball.body).unwrap();
    assert_eq!(velocity.x, 0.0);
    assert_eq!(velocity.y, 0.0);
    assert!((velocity.z - 26.5).abs() < 1e-3);
    assert_eq!(
        sim.world().activation_state(ball.body).unwrap(),
        ActivationState::Active
    );
    // The reference is dropped once the ball is in play
    assert!(sim.ball().is_none());
    assert_eq!(sim.balls(), &[ball]);
}

#[test]
fn long_charge_saturates_at_max_impulse() {
    let mut sim = Simulation::new(TableConfig::default()).unwrap();
    sim.handle_input(InputEvent::press(Gesture::Charge)).unwrap();
    run(&mut sim, 300);
    let shot = sim
        .handle_input(InputEvent::release(Gesture::Charge))
        .unwrap()
        .unwrap();
    assert!((shot.charge_seconds - 2.0).abs() < 1e-6);
    assert!((shot.impulse - 45.0).abs() < 1e-6);
}

#[test]
fn release_without_charge_is_a_no_op() {
    let mut sim = Simulation::new(TableConfig::default()).unwrap();
    let shot = sim.handle_input(InputEvent::release(Gesture::Charge)).unwrap();
    assert!(shot.is_none());
    assert!(sim.balls().is_empty());
    assert!(sim.registry().is_empty());
    assert_eq!(sim.plunger().state(), PlungerState::Idle);
}

#[test]
fn second_press_does_not_restart_or_respawn() {
    let mut sim = Simulation::new(TableConfig::default()).unwrap();
    sim.handle_input(InputEvent::press(Gesture::Charge)).unwrap();
    run(&mut sim, 30);
    sim.handle_input(InputEvent::press(Gesture::Charge)).unwrap();

    assert_eq!(sim.balls().len(), 1);
    assert_eq!(
        sim.plunger().state(),
        PlungerState::Charging { started_at: 0.0 }
    );

    run(&mut sim, 30);
    let shot = sim
        .handle_input(InputEvent::release(Gesture::Charge))
        .unwrap()
        .unwrap();
    assert!((shot.impulse - 26.5).abs() < 1e-3);
}

#[test]
fn next_charge_spawns_a_fresh_ball() {
    let mut sim = Simulation::new(TableConfig::default()).unwrap();
    sim.handle_input(InputEvent::press(Gesture::Charge)).unwrap();
    run(&mut sim, 10);
    sim.handle_input(InputEvent::release(Gesture::Charge)).unwrap();
    run(&mut sim, 30);

    sim.handle_input(InputEvent::press(Gesture::Charge)).unwrap();
    let second = sim.ball().unwrap();
    assert_eq!(sim.balls().len(), 2);
    assert_ne!(sim.balls()[0], second);
    assert_eq!(sim.registry().len(), 2);
}

#[test]
fn plunger_body_follows_the_pull_back() {
    let mut sim = Simulation::new(TableConfig::default()).unwrap();
    sim.handle_input(InputEvent::press(Gesture::Charge)).unwrap();
    run(&mut sim, 60);

    let plunger = sim.plunger();
    // Halfway through a two second ease-in-out pull of one unit
    assert!((plunger.offset() + 0.5).abs() < 1e-3, "offset {}", plunger.offset());

    let node = sim.scene().node(plunger.node()).unwrap();
    let body = sim.world().motion_state(plunger.body()).unwrap();
    assert_eq!(node.position, plunger.position());
    assert_eq!(body.position, node.position);
    assert_eq!(body.orientation, node.orientation);
}

#[test]
fn plunger_snaps_to_rest_after_the_forward_stroke() {
    let mut sim = Simulation::new(TableConfig::default()).unwrap();
    sim.handle_input(InputEvent::press(Gesture::Charge)).unwrap();
    run(&mut sim, 30);
    sim.handle_input(InputEvent::release(Gesture::Charge)).unwrap();
    assert_eq!(sim.plunger().state(), PlungerState::Released);

    run(&mut sim, 20);
    let plunger = sim.plunger();
    assert_eq!(plunger.state(), PlungerState::Idle);
    assert_eq!(plunger.offset(), 0.0);
    assert_eq!(plunger.position(), plunger.rest_position());

    let body = sim.world().motion_state(plunger.body()).unwrap();
    assert_eq!(body.position, plunger.rest_position());
}

#[test]
fn tunables_change_the_next_shot() {
    let mut sim = Simulation::new(TableConfig::default()).unwrap();
    let mut config = TableConfig::default();
    config.plunger.min_impulse = 10.0;
    config.plunger.max_impulse = 20.0;
    sim.apply_tunables(&config);

    sim.handle_input(InputEvent::press(Gesture::Charge)).unwrap();
    run(&mut sim, 300);
    let shot = sim
        .handle_input(InputEvent::release(Gesture::Charge))
        .unwrap()
        .unwrap();
    assert!((shot.impulse - 20.0).abs() < 1e-6);
}
