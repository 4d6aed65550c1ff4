//! Integration tests for fcs-controls components.

use fcs_controls::{
    Actuator, Clip, Component, ComponentCore, ComponentKind, Condition, ControlError, Detent,
    Distribution, Filter, FrameContext, Gain, Kinemat, Logic, NoiseKind, Parameter, Pid,
    Quantization, Sensor, SensorModel, StaticAircraftState, Summer, Switch, SwitchTest, Table,
    TransportDelay,
};
use fcs_core::equal_to_roundoff;
use fcs_props::PropertyStore;
use proptest::prelude::*;

fn run_sequence(
    component: &mut Component,
    store: &mut PropertyStore,
    input: &str,
    values: &[f64],
    dt: f64,
) -> Vec<f64> {
    let aircraft = StaticAircraftState::default();
    let ctx = FrameContext::new(dt, &aircraft);
    values
        .iter()
        .map(|v| {
            store.set_by_name(input, *v).unwrap();
            component.run(store, &ctx).unwrap();
            component.output()
        })
        .collect()
}

fn with_input(name: &str, store: &mut PropertyStore) -> ComponentCore {
    let input = store.create("test/input");
    ComponentCore::new(name, store).with_inputs(vec![Parameter::property(input)])
}

#[test]
fn summer_then_gain_then_clip() {
    let mut store = PropertyStore::new();
    let a = store.create("test/a");
    let b = store.create("test/b");
    store.set(a, 0.5);
    store.set(b, -0.2);

    let core = ComponentCore::new("pitch-sum", &mut store)
        .with_inputs(vec![Parameter::property(a), Parameter::property(b).negate()]);
    let mut summer = Component::new(core, ComponentKind::Summer(Summer::new(0.1))).unwrap();

    let sum_out = store.resolve("fcs/pitch-sum").unwrap();
    let core = ComponentCore::new("pitch-gain", &mut store)
        .with_inputs(vec![Parameter::property(sum_out)])
        .with_clip(Clip::new(Parameter::Constant(-1.0), Parameter::Constant(1.0)));
    let mut gain =
        Component::new(core, ComponentKind::Gain(Gain::pure(Parameter::Constant(2.0)))).unwrap();

    let aircraft = StaticAircraftState::default();
    let ctx = FrameContext::new(1.0 / 120.0, &aircraft);
    summer.run(&mut store, &ctx).unwrap();
    gain.run(&mut store, &ctx).unwrap();

    assert!((summer.output() - 0.8).abs() < 1e-12);
    assert_eq!(gain.output(), 1.0);
    assert_eq!(store.get_by_name("fcs/pitch-gain"), Some(1.0));
}

#[test]
fn output_properties_receive_value() {
    let mut store = PropertyStore::new();
    let out = store.create("fcs/elevator-pos-rad");
    let core = with_input("elevator", &mut store).with_outputs(vec![out]);
    let mut c =
        Component::new(core, ComponentKind::Gain(Gain::pure(Parameter::Constant(0.5)))).unwrap();
    run_sequence(&mut c, &mut store, "test/input", &[0.4], 0.01);
    assert_eq!(store.get(out), 0.2);
}

#[test]
fn delay_runs_before_clip() {
    let mut store = PropertyStore::new();
    let core = with_input("delayed", &mut store)
        .with_delay(TransportDelay::frames(3))
        .with_clip(Clip::new(Parameter::Constant(0.0), Parameter::Constant(2.0)));
    let mut c =
        Component::new(core, ComponentKind::Gain(Gain::pure(Parameter::Constant(1.0)))).unwrap();
    let out = run_sequence(&mut c, &mut store, "test/input", &[5.0, 1.0, 1.0, 1.0], 0.01);
    assert_eq!(out, vec![0.0, 0.0, 2.0, 1.0]);
}

#[test]
fn lag_filter_steady_state() {
    let mut store = PropertyStore::new();
    let core = with_input("lag", &mut store);
    let filter = Filter::lag(Some(Parameter::Constant(600.0)), "lag").unwrap();
    let mut c = Component::new(core, ComponentKind::Filter(filter)).unwrap();
    let mut inputs = vec![0.0];
    inputs.extend(std::iter::repeat_n(1.0, 200));
    let out = run_sequence(&mut c, &mut store, "test/input", &inputs, 1.0 / 120.0);
    assert_eq!(out[0], 0.0);
    assert!((out[200] - 1.0).abs() < 1e-9);
}

#[test]
fn actuator_rate_limit_scenario() {
    let mut store = PropertyStore::new();
    let core = with_input("aileron-act", &mut store);
    let act = Actuator::new(core.property_name(), &mut store)
        .unwrap()
        .with_rate_limits(Some(Parameter::Constant(0.085)), None);
    let mut c = Component::new(core, ComponentKind::Actuator(act)).unwrap();
    let dt = 1.0 / 120.0;
    let out = run_sequence(&mut c, &mut store, "test/input", &[1.0], dt);
    assert!(out[0] <= 0.085 / 120.0 + 1e-15);
    assert!(out[0] > 0.0);
}

#[test]
fn pid_negative_trigger_resets_to_exact_zero() {
    let mut store = PropertyStore::new();
    let trigger = store.create("ap/roll-windup");
    let core = with_input("roll-pid", &mut store);
    let pid = Pid::new(
        Parameter::Constant(1.0),
        Parameter::Constant(0.37),
        Parameter::Constant(0.0),
    )
    .with_trigger(Some(Parameter::property(trigger)));
    let mut c = Component::new(core, ComponentKind::Pid(pid)).unwrap();
    run_sequence(&mut c, &mut store, "test/input", &[0.3; 25], 0.01);

    store.set(trigger, -1.0);
    let out = run_sequence(&mut c, &mut store, "test/input", &[0.0], 0.01);
    assert_eq!(out[0], 0.0);
    let ComponentKind::Pid(pid) = c.kind() else {
        panic!("expected pid");
    };
    assert_eq!(pid.integral(), 0.0);
}

#[test]
fn switch_with_condition_groups() {
    let mut store = PropertyStore::new();
    let alt = store.create("ap/altitude-hold");
    let gear = store.create("gear/gear-pos-norm");
    let engaged = Condition::group(
        Logic::And,
        vec![
            Condition::parse_leaf("ap/altitude-hold == 1", &mut store, "ap-switch").unwrap(),
            Condition::group(
                Logic::Or,
                vec![
                    Condition::parse_leaf("gear/gear-pos-norm lt 0.5", &mut store, "ap-switch")
                        .unwrap(),
                    Condition::parse_leaf("ap/override ne 0", &mut store, "ap-switch").unwrap(),
                ],
                "ap-switch",
            )
            .unwrap(),
        ],
        "ap-switch",
    )
    .unwrap();
    let sw = Switch::new(
        vec![
            SwitchTest::when(engaged, Parameter::Constant(1.0)),
            SwitchTest::when(
                Condition::parse_leaf("ap/altitude-hold == 1", &mut store, "ap-switch").unwrap(),
                Parameter::Constant(2.0),
            ),
        ],
        "ap-switch",
    )
    .unwrap();
    let core = ComponentCore::new("ap-switch", &mut store);
    let mut c = Component::new(core, ComponentKind::Switch(sw)).unwrap();
    let aircraft = StaticAircraftState::default();
    let ctx = FrameContext::new(0.01, &aircraft);

    store.set(alt, 1.0);
    store.set(gear, 0.0);
    c.run(&mut store, &ctx).unwrap();
    assert_eq!(c.output(), 1.0);

    store.set(gear, 1.0);
    c.run(&mut store, &ctx).unwrap();
    assert_eq!(c.output(), 2.0);

    // nothing matches and there is no default: hold
    store.set(alt, 0.0);
    c.run(&mut store, &ctx).unwrap();
    assert_eq!(c.output(), 2.0);
}

#[test]
fn inverted_clip_stops_the_run() {
    let mut store = PropertyStore::new();
    let lo = store.create("test/lo");
    let core = with_input("clipped", &mut store)
        .with_clip(Clip::new(Parameter::property(lo), Parameter::Constant(1.0)));
    let mut c =
        Component::new(core, ComponentKind::Gain(Gain::pure(Parameter::Constant(1.0)))).unwrap();
    let aircraft = StaticAircraftState::default();
    let ctx = FrameContext::new(0.01, &aircraft);
    assert!(c.run(&mut store, &ctx).is_ok());
    store.set(lo, 3.0);
    assert!(c.run(&mut store, &ctx).is_err());
}

fn is_non_finite(result: Result<bool, ControlError>, component: &str) -> bool {
    matches!(result, Err(ControlError::NonFinite { component: ref c, .. }) if c == component)
}

#[test]
fn nan_schedule_stops_the_run_without_publishing() {
    let mut store = PropertyStore::new();
    let qbar = store.create("aero/qbar-psf");
    let table = Table::one_d(
        Parameter::property(qbar),
        vec![(0.0, 1.0), (100.0, 0.5)],
        "pitch-sched",
    )
    .unwrap();
    let core = with_input("pitch-sched", &mut store);
    let gain = Gain::scheduled(Parameter::Constant(1.0), Some(table), "pitch-sched").unwrap();
    let mut c = Component::new(core, ComponentKind::Gain(gain)).unwrap();
    let aircraft = StaticAircraftState::default();
    let ctx = FrameContext::new(0.01, &aircraft);

    store.set_by_name("test/input", 2.0).unwrap();
    c.run(&mut store, &ctx).unwrap();
    assert_eq!(store.get_by_name("fcs/pitch-sched"), Some(2.0));

    store.set(qbar, f64::NAN);
    assert!(is_non_finite(c.run(&mut store, &ctx), "pitch-sched"));
    assert_eq!(store.get_by_name("fcs/pitch-sched"), Some(2.0));
}

#[test]
fn non_finite_inputs_stop_stateful_components() {
    let aircraft = StaticAircraftState::default();
    let ctx = FrameContext::new(1.0 / 120.0, &aircraft);

    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let mut store = PropertyStore::new();
        let core = with_input("flaps", &mut store);
        let kinemat = Kinemat::new(
            vec![Detent::new(0.0, 0.0), Detent::new(10.0, 1.0), Detent::new(30.0, 1.0)],
            false,
            "flaps",
        )
        .unwrap();
        let mut flaps = Component::new(core, ComponentKind::Kinemat(kinemat)).unwrap();
        store.set_by_name("test/input", bad).unwrap();
        assert!(is_non_finite(flaps.run(&mut store, &ctx), "flaps"), "kinemat accepted {bad}");

        let mut store = PropertyStore::new();
        let core = with_input("aileron-act", &mut store);
        let act = Actuator::new(core.property_name(), &mut store)
            .unwrap()
            .with_rate_limits(Some(Parameter::Constant(0.085)), None);
        let mut act = Component::new(core, ComponentKind::Actuator(act)).unwrap();
        store.set_by_name("test/input", bad).unwrap();
        assert!(is_non_finite(act.run(&mut store, &ctx), "aileron-act"), "actuator accepted {bad}");

        act.reset_past_states();
        store.set_by_name("test/input", 1.0).unwrap();
        act.run(&mut store, &ctx).unwrap();
        assert!(act.output() > 0.0 && act.output() <= 0.085 / 120.0 + 1e-15);
    }
}

#[test]
fn clipped_nan_is_an_error_not_a_bound() {
    let mut store = PropertyStore::new();
    let core = with_input("clipped", &mut store)
        .with_clip(Clip::new(Parameter::Constant(-1.0), Parameter::Constant(1.0)));
    let mut c =
        Component::new(core, ComponentKind::Gain(Gain::pure(Parameter::Constant(1.0)))).unwrap();
    let aircraft = StaticAircraftState::default();
    let ctx = FrameContext::new(0.01, &aircraft);
    store.set_by_name("test/input", f64::NAN).unwrap();
    assert!(is_non_finite(c.run(&mut store, &ctx), "clipped"));
}

fn build_stateful(kind: &str, store: &mut PropertyStore) -> Component {
    let core = with_input(kind, store);
    let name = core.property_name().to_string();
    let model = match kind {
        "filter" => ComponentKind::Filter(
            Filter::second_order(
                [1.0, 0.5, 2.0, 1.0, 3.0, 2.0].map(|v| Some(Parameter::Constant(v))),
                kind,
            )
            .unwrap(),
        ),
        "pid" => ComponentKind::Pid(Pid::new(
            Parameter::Constant(0.4),
            Parameter::Constant(1.2),
            Parameter::Constant(0.05),
        )),
        "actuator" => ComponentKind::Actuator(
            Actuator::new(&name, store)
                .unwrap()
                .with_lag(Some(Parameter::Constant(8.0)))
                .with_rate_limits(Some(Parameter::Constant(2.0)), Some(Parameter::Constant(1.5)))
                .with_hysteresis(0.05),
        ),
        "sensor" => ComponentKind::Sensor(Sensor::new(
            SensorModel::new(&name, 42, store)
                .with_lag(Some(Parameter::Constant(4.0)))
                .with_noise(0.02, NoiseKind::Absolute, Distribution::Gaussian, store)
                .with_drift_rate(0.01)
                .with_quantization(Some(Quantization::new(10, -2.0, 2.0, kind).unwrap())),
        )),
        _ => ComponentKind::Kinemat(
            Kinemat::new(
                vec![Detent::new(0.0, 0.0), Detent::new(1.0, 0.5), Detent::new(2.0, 1.5)],
                false,
                kind,
            )
            .unwrap(),
        ),
    };
    Component::new(core.with_delay(TransportDelay::frames(2)), model).unwrap()
}

#[test]
fn reset_matches_fresh_component() {
    let inputs: Vec<f64> = (0..60).map(|i| (i as f64 * 0.3).sin() * 1.5).collect();
    for kind in ["filter", "pid", "actuator", "sensor", "kinemat"] {
        let mut store = PropertyStore::new();
        let mut c = build_stateful(kind, &mut store);
        let fresh = run_sequence(&mut c, &mut store, "test/input", &inputs, 0.02);
        c.reset_past_states();
        let replay = run_sequence(&mut c, &mut store, "test/input", &inputs, 0.02);
        assert_eq!(fresh, replay, "{kind} leaked state across reset");
    }
}

proptest! {
    #[test]
    fn saturating_clip_stays_in_bounds(
        value in prop::num::f64::POSITIVE
            | prop::num::f64::NEGATIVE
            | prop::num::f64::NORMAL
            | prop::num::f64::SUBNORMAL
            | prop::num::f64::ZERO,
        min in -1e6_f64..1e6,
        width in 0.0_f64..1e6,
    ) {
        let store = PropertyStore::new();
        let max = min + width;
        let clip = Clip::new(Parameter::Constant(min), Parameter::Constant(max));
        let out = clip.apply(value, &store, "c").unwrap();
        prop_assert!(min <= out && out <= max);
    }

    #[test]
    fn non_finite_clip_operands_are_rejected(
        bad in prop::sample::select(vec![f64::NAN, f64::INFINITY, f64::NEG_INFINITY]),
        slot in 0_usize..3,
        cyclic in any::<bool>(),
    ) {
        let store = PropertyStore::new();
        let mut operands = [-1.0, 1.0, 0.5];
        operands[slot] = bad;
        let clip = Clip::new(Parameter::Constant(operands[0]), Parameter::Constant(operands[1]))
            .cyclic(cyclic);
        let result = clip.apply(operands[2], &store, "c");
        prop_assert!(matches!(result, Err(ControlError::NonFinite { .. })), "{result:?}");
    }

    #[test]
    fn cyclic_clip_stays_in_half_open_range(
        value in -1e7_f64..1e7,
        min in -1e3_f64..1e3,
        width in 1e-3_f64..1e3,
    ) {
        let store = PropertyStore::new();
        let max = min + width;
        let clip = Clip::new(Parameter::Constant(min), Parameter::Constant(max)).cyclic(true);
        let out = clip.apply(value, &store, "c").unwrap();
        prop_assert!(min <= out && out < max, "{out} not in [{min}, {max})");
    }

    #[test]
    fn kinemat_converges_and_reports_fraction(
        target in 0.0_f64..30.0,
        times in prop::collection::vec(0.0_f64..3.0, 3),
    ) {
        let mut k = Kinemat::new(
            vec![
                Detent::new(0.0, 0.0),
                Detent::new(10.0, times[0]),
                Detent::new(20.0, times[1]),
                Detent::new(30.0, times[2]),
            ],
            false,
            "k",
        )
        .unwrap();
        let mut last = k.position();
        for _ in 0..1000 {
            let pos = k.step(target, 0.01, false);
            prop_assert!(pos >= last.min(target) - 1e-9);
            last = pos;
            let pct = k.output_pct();
            prop_assert!((0.0..=1.0).contains(&pct));
        }
        prop_assert!(equal_to_roundoff(k.position(), target));
    }
}
