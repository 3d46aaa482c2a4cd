//! End-to-end gateway scenarios against the simulated machine

use kerf_core::{
    Alarm, ArcPlane, AxisMask, Condition, MachineState, OverrideControl, PlanLine,
    ProbeCommandFlags, ProbeResult, RtFlags, Settings,
};

use crate::machine::{build, SimConfig, SimGateway};

fn sim_with(config: SimConfig) -> SimGateway {
    let _ = env_logger::builder().is_test(true).try_init();
    build(Settings::default(), config).unwrap()
}

fn sim() -> SimGateway {
    sim_with(SimConfig::default())
}

#[test]
fn test_straight_line_reaches_target() {
    let mut gw = sim();
    gw.line(&[10.0, 0.0, 0.0], &PlanLine::feed(600.0));
    assert_eq!(gw.planner().len(), 1);
    gw.planner_synchronize();
    assert_eq!(gw.sys().position, [10.0, 0.0, 0.0]);
    assert_eq!(gw.sys().state, MachineState::Idle);
    assert!(gw.planner().is_drained());
}

#[test]
fn test_full_circle_segment_count_and_closure() {
    let mut gw = sim();
    // Get to the arc start first, then carve the circle.
    gw.line(&[10.0, 0.0, 0.0], &PlanLine::feed(600.0));
    gw.planner_synchronize();
    let blocks_before = gw.steppers().blocks_executed;
    let travel_before = gw.steppers().travel_mm;

    let mut position = [10.0, 0.0, 0.0];
    // G2-style full circle: target equals start, centre at the origin.
    gw.arc(
        &[10.0, 0.0, 0.0],
        &PlanLine::feed(600.0),
        &mut position,
        [-10.0, 0.0],
        10.0,
        ArcPlane::XY,
        false,
    );
    gw.planner_synchronize();
    assert_eq!(gw.steppers().blocks_executed - blocks_before, 157);
    // Endpoint is the commanded target, bit for bit.
    assert_eq!(gw.sys().position, [10.0, 0.0, 0.0]);
    // Chord sum of a tolerance-fit polygon stays within a hair of the true
    // circumference.
    let circumference = 2.0 * std::f64::consts::PI * 10.0;
    assert!((gw.steppers().travel_mm - travel_before - circumference).abs() < 0.05);
}

#[test]
fn test_helical_half_turn() {
    let mut gw = sim();
    gw.line(&[10.0, 0.0, 0.0], &PlanLine::feed(600.0));
    gw.planner_synchronize();
    let travel_before = gw.steppers().travel_mm;

    let mut position = [10.0, 0.0, 0.0];
    gw.arc(
        &[-10.0, 0.0, 5.0],
        &PlanLine::feed(600.0),
        &mut position,
        [-10.0, 0.0],
        10.0,
        ArcPlane::XY,
        false,
    );
    gw.planner_synchronize();
    assert_eq!(gw.sys().position, [-10.0, 0.0, 5.0]);
    // Helix length: half circumference combined with the 5 mm rise.
    let half = std::f64::consts::PI * 10.0;
    let helix = (half * half + 25.0).sqrt();
    assert!((gw.steppers().travel_mm - travel_before - helix).abs() < 0.05);
}

#[test]
fn test_soft_limit_violation_alarms_and_aborts() {
    let mut gw = sim();
    gw.settings_mut().soft_limits = true;
    gw.line(&[1e6, 0.0, 0.0], &PlanLine::feed(600.0));
    assert!(gw.planner().is_drained());
    assert!(gw.sys().aborted());
    assert_eq!(gw.sys().state, MachineState::Alarm);
    assert_eq!(gw.reporter().alarms, [Alarm::SoftLimit]);
}

#[test]
fn test_probe_success_snapshots_trigger() {
    let mut gw = sim();
    gw.steppers_mut().trigger_at = Some([37.412, 0.0, 0.0]);
    let result = gw.probe_cycle(
        &[100.0, 0.0, 0.0],
        &PlanLine::feed(50.0),
        ProbeCommandFlags::empty(),
    );
    assert_eq!(result, ProbeResult::Found);
    assert!(gw.sys().probe_succeeded);
    assert_eq!(gw.sys().probe_position, [37.412, 0.0, 0.0]);
    assert_eq!(gw.sys().position, [37.412, 0.0, 0.0]);
    assert!(gw.planner().is_drained());
    assert_eq!(gw.sys().state, MachineState::Idle);
    // A following move plans from the stopped position, not the old target.
    gw.line(&[40.0, 0.0, 0.0], &PlanLine::feed(600.0));
    gw.planner_synchronize();
    assert_eq!(gw.sys().position, [40.0, 0.0, 0.0]);
}

#[test]
fn test_probe_miss_alarms() {
    let mut gw = sim();
    let result = gw.probe_cycle(
        &[100.0, 0.0, 0.0],
        &PlanLine::feed(50.0),
        ProbeCommandFlags::empty(),
    );
    assert_eq!(result, ProbeResult::FailEnd);
    assert_eq!(gw.reporter().alarms, [Alarm::ProbeFailContact]);
    assert!(gw.planner().is_drained());
}

#[test]
fn test_abort_mid_arc_stops_promptly() {
    let mut gw = sim();
    gw.line(&[10.0, 0.0, 0.0], &PlanLine::feed(600.0));
    gw.planner_synchronize();
    let blocks_before = gw.steppers().blocks_executed;
    gw.steppers_mut().reset_after_blocks = Some(blocks_before + 10);
    let mut position = [10.0, 0.0, 0.0];
    gw.arc(
        &[10.0, 0.0, 0.0],
        &PlanLine::feed(600.0),
        &mut position,
        [-10.0, 0.0],
        10.0,
        ArcPlane::XY,
        false,
    );
    assert!(gw.sys().aborted());
    assert!(!gw.steppers().is_awake());
    // The decomposition bailed long before the full 157 segments.
    let executed = gw.steppers().blocks_executed - blocks_before;
    assert!((10..40).contains(&executed), "executed {executed}");
    // Executed position is the last retired segment, nothing beyond it.
    assert_eq!(gw.sys().position, gw.steppers().last_executed.unwrap());
    assert_eq!(gw.sys().shared.exec_alarm(), Some(Alarm::AbortCycle));
}

#[test]
fn test_laser_raster_power_updates_in_order() {
    let mut gw = sim();
    gw.settings_mut().laser_mode = true;
    let mut on = PlanLine::feed(1200.0);
    on.condition = Condition::SPINDLE_CW;
    on.spindle_rpm = 300.0;

    gw.line(&[10.0, 0.0, 0.0], &on);
    // Zero-length power change between scan lines.
    let mut dim = on;
    dim.spindle_rpm = 80.0;
    gw.line(&[10.0, 0.0, 0.0], &dim);
    // The write happened after the first segment drained.
    assert_eq!(gw.spindle().writes.len(), 1);
    assert_eq!(gw.spindle().rpm, 80.0);
    assert_eq!(gw.sys().position, [10.0, 0.0, 0.0]);
}

#[test]
fn test_homing_establishes_zero_and_syncs_planner() {
    let mut gw = sim_with(SimConfig {
        homed: [0.0, 0.0, 150.0],
        ..Default::default()
    });
    gw.homing_cycle(AxisMask::empty());
    assert_eq!(gw.sys().position, [0.0, 0.0, 150.0]);
    assert_eq!(gw.sys().state, MachineState::Idle);
    assert_eq!(
        gw.limits().home_calls,
        [AxisMask::Z, AxisMask::X | AxisMask::Y]
    );
    assert!(gw.limits().hard_enabled);
    // A move back to the homed spot is planned as zero-length.
    gw.line(&[0.0, 0.0, 150.0], &PlanLine::feed(600.0));
    assert!(gw.planner().is_drained());
}

#[test]
fn test_homing_refuses_pretriggered_switch() {
    let mut gw = sim();
    gw.settings_mut().homing.two_switches_on_axes = true;
    gw.limits_mut().asserted = AxisMask::X;
    gw.homing_cycle(AxisMask::empty());
    assert!(gw.limits().home_calls.is_empty());
    assert_eq!(gw.sys().shared.exec_alarm(), Some(Alarm::HardLimit));
    assert_eq!(gw.spindle().stops, 1);
}

#[test]
fn test_parking_round_trip_during_hold() {
    let mut gw = sim();
    gw.settings_mut().parking.enabled = true;

    // Queue work and hold it mid-program.
    gw.line(&[50.0, 0.0, 0.0], &PlanLine::feed(600.0));
    gw.line(&[50.0, 20.0, 0.0], &PlanLine::feed(600.0));
    gw.sys().shared.set_exec_state_flag(RtFlags::CYCLE_START);
    gw.poll_realtime();
    gw.sys().shared.set_exec_state_flag(RtFlags::FEED_HOLD);
    gw.poll_realtime();
    assert_eq!(gw.sys().state, MachineState::Hold);
    let held = gw.sys().position;

    // Park above the work, out of band.
    let mut park = PlanLine::rapid();
    park.condition |= Condition::SYSTEM_MOTION | Condition::NO_FEED_OVERRIDE;
    gw.parking_motion(&[held[0], held[1], 40.0], &park);
    assert_eq!(gw.sys().position[2], 40.0);
    assert_eq!(gw.sys().state, MachineState::Hold);
    assert!(!gw.steppers().parking_buffer_active());

    // Return and resume; the held program finishes untouched.
    gw.parking_motion(&held, &park);
    assert_eq!(gw.sys().position, held);
    gw.sys().shared.set_exec_state_flag(RtFlags::CYCLE_START);
    gw.planner_synchronize();
    assert_eq!(gw.sys().position, [50.0, 20.0, 0.0]);
    assert_eq!(gw.sys().state, MachineState::Idle);
}

#[test]
fn test_override_control_disables_parking() {
    let mut gw = sim();
    gw.settings_mut().parking.enabled = true;
    gw.settings_mut().parking.override_control = true;
    gw.override_control_update(OverrideControl::ParkingDisabled);
    assert_eq!(gw.sys().override_ctrl, OverrideControl::ParkingDisabled);
}

#[test]
fn test_dwell_after_motion() {
    let mut gw = sim();
    gw.line(&[5.0, 0.0, 0.0], &PlanLine::feed(600.0));
    gw.dwell(0.5);
    assert_eq!(gw.sys().position, [5.0, 0.0, 0.0]);
    assert_eq!(gw.delay().slept_ms, 500);
}

#[test]
fn test_check_mode_program_is_side_effect_free() {
    let mut gw = sim();
    gw.sys_mut().state = MachineState::CheckMode;
    gw.line(&[10.0, 0.0, 0.0], &PlanLine::feed(600.0));
    let mut position = [0.0, 0.0, 0.0];
    gw.arc(
        &[0.0, 0.0, 0.0],
        &PlanLine::feed(600.0),
        &mut position,
        [-5.0, 0.0],
        5.0,
        ArcPlane::XY,
        false,
    );
    gw.dwell(1.0);
    let result = gw.probe_cycle(
        &[20.0, 0.0, 0.0],
        &PlanLine::feed(50.0),
        ProbeCommandFlags::empty(),
    );
    assert_eq!(result, ProbeResult::CheckMode);
    assert!(gw.planner().is_drained());
    assert_eq!(gw.steppers().blocks_executed, 0);
    assert_eq!(gw.delay().slept_ms, 0);
    assert_eq!(gw.spindle().writes.len(), 0);
    assert_eq!(gw.sys().position, [0.0, 0.0, 0.0]);
}

#[test]
fn test_back_pressure_against_small_ring() {
    let config = SimConfig {
        ring_capacity: 4,
        ..Default::default()
    };
    let mut gw = build(Settings::default(), config).unwrap();
    gw.line(&[10.0, 0.0, 0.0], &PlanLine::feed(600.0));
    gw.planner_synchronize();
    let blocks_before = gw.steppers().blocks_executed;

    // Far more segments than ring slots: the back-pressure loop has to
    // start the cycle and drain while the arc keeps submitting.
    let mut position = [10.0, 0.0, 0.0];
    gw.arc(
        &[10.0, 0.0, 0.0],
        &PlanLine::feed(600.0),
        &mut position,
        [-10.0, 0.0],
        10.0,
        ArcPlane::XY,
        false,
    );
    gw.planner_synchronize();
    assert_eq!(gw.steppers().blocks_executed - blocks_before, 157);
    assert_eq!(gw.sys().position, [10.0, 0.0, 0.0]);
}

#[test]
fn test_status_report_during_cycle() {
    let mut gw = sim();
    gw.line(&[5.0, 0.0, 0.0], &PlanLine::feed(600.0));
    gw.sys().shared.set_exec_state_flag(RtFlags::STATUS_REPORT);
    gw.planner_synchronize();
    assert_eq!(gw.reporter().status_reports, 1);
}
