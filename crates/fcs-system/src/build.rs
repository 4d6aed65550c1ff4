//! Construction of runtime components from configuration definitions.

use fcs_config::schema::{
    AxisDef, ClipDef, ComponentDef, ComponentKindDef, ConditionDef, DelayDef, DelayType,
    DistributionDef, FunctionDef, IntegrationDef, LogicDef, NoiseKindDef, OrientationDef,
    ParamDef, PidFormDef, PositionDef, SensorDef, TableDef, TaggedAngleDef,
};
use fcs_controls::{
    Accelerometer, Actuator, AngleDifference, Axis, Clip, Component, ComponentCore,
    ComponentKind, Condition, ControlError, ControlResult, Deadband, Detent, Distribution, Expr,
    FcsFunction, Filter, Gain, Gyro, IntegrationScheme, Interval, Kinemat, Logic, NaryOp,
    NoiseKind, Parameter, Pid, PidForm, Quantization, ScaleMode, Sensor, SensorModel,
    SensorOrientation, Summer, Switch, SwitchTest, Table, TaggedAngle, TaggedPosition,
    TransportDelay, UnaryOp, Waypoint, WaypointOutput,
};
use fcs_props::PropertyStore;
use nalgebra::Vector3;
use tracing::warn;
use uom::si::length::foot;

/// Shared inputs for building the components of one channel.
pub struct BuildContext<'a> {
    pub store: &'a mut PropertyStore,
    /// Step of the channel being built (s).
    pub dt: f64,
    /// Master seed for noise streams.
    pub seed: u64,
}

impl BuildContext<'_> {
    fn param(&mut self, def: &ParamDef, component: &str) -> ControlResult<Parameter> {
        match def {
            ParamDef::Value(v) => Ok(Parameter::Constant(*v)),
            ParamDef::Property(text) => Parameter::parse(text, self.store, component),
        }
    }

    fn opt_param(
        &mut self,
        def: Option<&ParamDef>,
        component: &str,
    ) -> ControlResult<Option<Parameter>> {
        def.map(|d| self.param(d, component)).transpose()
    }

    fn param_or(
        &mut self,
        def: Option<&ParamDef>,
        default: f64,
        component: &str,
    ) -> ControlResult<Parameter> {
        Ok(self
            .opt_param(def, component)?
            .unwrap_or(Parameter::Constant(default)))
    }
}

/// Build one component, binding its inputs and outputs in the store.
pub fn build_component(def: &ComponentDef, ctx: &mut BuildContext<'_>) -> ControlResult<Component> {
    let name = def.name.as_str();
    let inputs = def
        .inputs
        .iter()
        .map(|input| Parameter::parse(input, ctx.store, name))
        .collect::<ControlResult<Vec<_>>>()?;
    let outputs = def.outputs.iter().map(|o| ctx.store.create(o)).collect();

    let mut core = ComponentCore::new(name, ctx.store)
        .with_inputs(inputs)
        .with_outputs(outputs)
        .with_delay(def.delay.as_ref().and_then(|d| delay(d, ctx.dt)));
    if let Some(clip) = &def.clipto {
        core = core.with_clip(build_clip(clip, ctx, name)?);
    }

    let base = core.property_name().to_string();
    let kind = build_kind(&def.kind, &base, ctx, name)?;
    Component::new(core, kind)
}

fn delay(def: &DelayDef, dt: f64) -> Option<TransportDelay> {
    match def.delay_type {
        DelayType::Frames => TransportDelay::frames(def.value.floor() as usize),
        DelayType::Time => TransportDelay::from_time(def.value, dt),
    }
}

fn build_clip(def: &ClipDef, ctx: &mut BuildContext<'_>, name: &str) -> ControlResult<Clip> {
    let min = def
        .min
        .as_ref()
        .ok_or_else(|| missing(name, "clipto.min"))?;
    let max = def
        .max
        .as_ref()
        .ok_or_else(|| missing(name, "clipto.max"))?;
    let min = ctx.param(min, name)?;
    let max = ctx.param(max, name)?;
    Ok(Clip::new(min, max).cyclic(def.cyclic))
}

fn missing(component: &str, element: &'static str) -> ControlError {
    ControlError::MissingElement {
        component: component.to_string(),
        element,
    }
}

fn invalid(component: &str, element: &'static str, what: impl Into<String>) -> ControlError {
    ControlError::InvalidElement {
        component: component.to_string(),
        element,
        what: what.into(),
    }
}

fn build_kind(
    def: &ComponentKindDef,
    base: &str,
    ctx: &mut BuildContext<'_>,
    name: &str,
) -> ControlResult<ComponentKind> {
    let kind = match def {
        ComponentKindDef::Summer { bias } => ComponentKind::Summer(Summer::new(*bias)),
        ComponentKindDef::PureGain { gain } => {
            if gain.is_none() {
                warn!(component = name, "pure_gain without gain, using 1.0");
            }
            ComponentKind::Gain(Gain::pure(ctx.param_or(gain.as_ref(), 1.0, name)?))
        }
        ComponentKindDef::ScheduledGain { gain, table } => {
            let gain = ctx.param_or(gain.as_ref(), 1.0, name)?;
            let table = table
                .as_ref()
                .map(|t| build_table(t, ctx, name))
                .transpose()?;
            ComponentKind::Gain(Gain::scheduled(gain, table, name)?)
        }
        ComponentKindDef::AerosurfaceScale {
            gain,
            domain,
            range,
            zero_centered,
        } => {
            let gain = ctx.param_or(gain.as_ref(), 1.0, name)?;
            let mode = if *zero_centered {
                ScaleMode::ZeroCentered
            } else {
                ScaleMode::Linear
            };
            ComponentKind::Gain(Gain::aerosurface_scale(
                gain,
                domain.map(|d| Interval::new(d.min, d.max)),
                range.map(|r| Interval::new(r.min, r.max)),
                mode,
                name,
            )?)
        }
        ComponentKindDef::LagFilter { c1 } => {
            ComponentKind::Filter(Filter::lag(ctx.opt_param(c1.as_ref(), name)?, name)?)
        }
        ComponentKindDef::WashoutFilter { c1 } => {
            ComponentKind::Filter(Filter::washout(ctx.opt_param(c1.as_ref(), name)?, name)?)
        }
        ComponentKindDef::LeadLagFilter { c1, c2, c3, c4 } => {
            let c = [
                ctx.opt_param(c1.as_ref(), name)?,
                ctx.opt_param(c2.as_ref(), name)?,
                ctx.opt_param(c3.as_ref(), name)?,
                ctx.opt_param(c4.as_ref(), name)?,
            ];
            ComponentKind::Filter(Filter::lead_lag(c, name)?)
        }
        ComponentKindDef::SecondOrderFilter {
            c1,
            c2,
            c3,
            c4,
            c5,
            c6,
        } => {
            let c = [
                ctx.opt_param(c1.as_ref(), name)?,
                ctx.opt_param(c2.as_ref(), name)?,
                ctx.opt_param(c3.as_ref(), name)?,
                ctx.opt_param(c4.as_ref(), name)?,
                ctx.opt_param(c5.as_ref(), name)?,
                ctx.opt_param(c6.as_ref(), name)?,
            ];
            ComponentKind::Filter(Filter::second_order(c, name)?)
        }
        ComponentKindDef::Integrator { c1, trigger } => {
            let c1 = ctx.opt_param(c1.as_ref(), name)?;
            let trigger = ctx.opt_param(trigger.as_ref(), name)?;
            ComponentKind::Filter(Filter::integrator(c1, trigger, name)?)
        }
        ComponentKindDef::Deadband { width, gain } => {
            let width = ctx.param_or(width.as_ref(), 0.0, name)?;
            ComponentKind::Deadband(Deadband::new(width, *gain))
        }
        ComponentKindDef::Switch { tests } => {
            let mut built = Vec::with_capacity(tests.len());
            for test in tests {
                let value = ctx.param(&test.value, name)?;
                built.push(match &test.condition {
                    Some(condition) => {
                        SwitchTest::when(build_condition(condition, ctx, name)?, value)
                    }
                    None => SwitchTest::default_value(value),
                });
            }
            ComponentKind::Switch(Switch::new(built, name)?)
        }
        ComponentKindDef::Kinematic { traverse, scale } => {
            let detents = traverse
                .iter()
                .map(|d| Detent::new(d.position, d.time))
                .collect();
            ComponentKind::Kinemat(Kinemat::new(detents, *scale, name)?)
        }
        ComponentKindDef::Pid {
            kp,
            ki,
            kd,
            pvdot,
            trigger,
            integration,
            form,
        } => {
            let pid = Pid::new(
                ctx.param_or(kp.as_ref(), 0.0, name)?,
                ctx.param_or(ki.as_ref(), 0.0, name)?,
                ctx.param_or(kd.as_ref(), 0.0, name)?,
            )
            .with_derivative(ctx.opt_param(pvdot.as_ref(), name)?)
            .with_trigger(ctx.opt_param(trigger.as_ref(), name)?)
            .with_scheme(scheme(*integration))
            .with_form(match form {
                PidFormDef::Ideal => PidForm::Ideal,
                PidFormDef::Standard => PidForm::Standard,
            });
            ComponentKind::Pid(pid)
        }
        ComponentKindDef::Sensor { sensor } => {
            ComponentKind::Sensor(Sensor::new(sensor_model(sensor, base, ctx, name)?))
        }
        ComponentKindDef::Accelerometer {
            sensor,
            location,
            orientation: o,
            axis,
        } => {
            let r = Vector3::new(location.x, location.y, location.z)
                .map(|v| location.unit.length(v).get::<foot>());
            ComponentKind::Accelerometer(Accelerometer::new(
                r,
                sensor_orientation(o, *axis),
                sensor_model(sensor, base, ctx, name)?,
            ))
        }
        ComponentKindDef::Gyro {
            sensor,
            orientation: o,
            axis,
        } => ComponentKind::Gyro(Gyro::new(
            sensor_orientation(o, *axis),
            sensor_model(sensor, base, ctx, name)?,
        )),
        ComponentKindDef::Actuator {
            lag,
            rate_limit,
            rate_limit_incr,
            rate_limit_decr,
            deadband_width,
            hysteresis_width,
            bias,
        } => {
            let both = ctx.opt_param(rate_limit.as_ref(), name)?;
            let incr = ctx.opt_param(rate_limit_incr.as_ref(), name)?.or(both);
            let decr = ctx.opt_param(rate_limit_decr.as_ref(), name)?.or(both);
            let actuator = Actuator::new(base, ctx.store)?
                .with_lag(ctx.opt_param(lag.as_ref(), name)?)
                .with_rate_limits(incr, decr)
                .with_deadband(*deadband_width)
                .with_hysteresis(*hysteresis_width)
                .with_bias(*bias);
            ComponentKind::Actuator(actuator)
        }
        ComponentKindDef::Angle {
            target,
            source,
            unit,
        } => ComponentKind::Angle(AngleDifference::new(
            tagged_angle(target, ctx, name)?,
            tagged_angle(source, ctx, name)?,
            *unit,
        )),
        ComponentKindDef::WaypointHeading {
            target,
            source,
            unit,
        } => ComponentKind::Waypoint(Waypoint::new(
            position(target, ctx, name)?,
            position(source, ctx, name)?,
            WaypointOutput::Heading(*unit),
        )),
        ComponentKindDef::WaypointDistance {
            target,
            source,
            unit,
        } => ComponentKind::Waypoint(Waypoint::new(
            position(target, ctx, name)?,
            position(source, ctx, name)?,
            WaypointOutput::Distance(*unit),
        )),
        ComponentKindDef::FcsFunction { function } => {
            ComponentKind::Function(FcsFunction::new(build_expr(function, ctx, name)?))
        }
    };
    Ok(kind)
}

fn scheme(def: IntegrationDef) -> IntegrationScheme {
    match def {
        IntegrationDef::Rectangular => IntegrationScheme::Rectangular,
        IntegrationDef::Trapezoidal => IntegrationScheme::Trapezoidal,
        IntegrationDef::Ab2 => IntegrationScheme::AdamsBashforth2,
        IntegrationDef::Ab3 => IntegrationScheme::AdamsBashforth3,
        IntegrationDef::None => IntegrationScheme::None,
    }
}

fn build_condition(
    def: &ConditionDef,
    ctx: &mut BuildContext<'_>,
    name: &str,
) -> ControlResult<Condition> {
    match def {
        ConditionDef::Leaf(expression) => Condition::parse_leaf(expression, ctx.store, name),
        ConditionDef::Group { logic, conditions } => {
            let children = conditions
                .iter()
                .map(|c| build_condition(c, ctx, name))
                .collect::<ControlResult<Vec<_>>>()?;
            let logic = match logic {
                LogicDef::And => Logic::And,
                LogicDef::Or => Logic::Or,
            };
            Condition::group(logic, children, name)
        }
    }
}

fn build_table(def: &TableDef, ctx: &mut BuildContext<'_>, name: &str) -> ControlResult<Table> {
    let row = Parameter::parse(&def.row, ctx.store, name)?;
    match &def.column {
        None => {
            let data = def
                .data
                .iter()
                .map(|r| match r.as_slice() {
                    [x, y] => Ok((*x, *y)),
                    _ => Err(invalid(
                        name,
                        "table",
                        format!("1-D rows need 2 entries, got {}", r.len()),
                    )),
                })
                .collect::<ControlResult<Vec<_>>>()?;
            Table::one_d(row, data, name)
        }
        Some(column) => {
            let column = Parameter::parse(column, ctx.store, name)?;
            let data = def
                .data
                .iter()
                .map(|r| match r.split_first() {
                    Some((x, values)) => Ok((*x, values.to_vec())),
                    None => Err(invalid(name, "table", "empty row")),
                })
                .collect::<ControlResult<Vec<_>>>()?;
            Table::two_d(row, column, def.columns.clone(), data, name)
        }
    }
}

fn build_expr(def: &FunctionDef, ctx: &mut BuildContext<'_>, name: &str) -> ControlResult<Expr> {
    match def {
        FunctionDef::Value(v) => Ok(Expr::Param(Parameter::Constant(*v))),
        FunctionDef::Property(p) => Ok(Expr::Param(Parameter::parse(p, ctx.store, name)?)),
        FunctionDef::Table(t) => Ok(Expr::Table(Box::new(build_table(t, ctx, name)?))),
        FunctionDef::Sum(args) => nary(NaryOp::Sum, args, ctx, name),
        FunctionDef::Difference(args) => nary(NaryOp::Difference, args, ctx, name),
        FunctionDef::Product(args) => nary(NaryOp::Product, args, ctx, name),
        FunctionDef::Min(args) => nary(NaryOp::Min, args, ctx, name),
        FunctionDef::Max(args) => nary(NaryOp::Max, args, ctx, name),
        FunctionDef::Quotient(args) => {
            let (n, d) = binary(args, "quotient", ctx, name)?;
            Ok(Expr::quotient(n, d))
        }
        FunctionDef::Pow(args) => {
            let (b, e) = binary(args, "pow", ctx, name)?;
            Ok(Expr::pow(b, e))
        }
        FunctionDef::Abs(arg) => Ok(Expr::unary(UnaryOp::Abs, build_expr(arg, ctx, name)?)),
        FunctionDef::Sin(arg) => Ok(Expr::unary(UnaryOp::Sin, build_expr(arg, ctx, name)?)),
        FunctionDef::Cos(arg) => Ok(Expr::unary(UnaryOp::Cos, build_expr(arg, ctx, name)?)),
        FunctionDef::Tan(arg) => Ok(Expr::unary(UnaryOp::Tan, build_expr(arg, ctx, name)?)),
        FunctionDef::Sqrt(arg) => Ok(Expr::unary(UnaryOp::Sqrt, build_expr(arg, ctx, name)?)),
    }
}

fn nary(
    op: NaryOp,
    args: &[FunctionDef],
    ctx: &mut BuildContext<'_>,
    name: &str,
) -> ControlResult<Expr> {
    let operands = args
        .iter()
        .map(|a| build_expr(a, ctx, name))
        .collect::<ControlResult<Vec<_>>>()?;
    Expr::nary(op, operands, name)
}

fn binary(
    args: &[FunctionDef],
    what: &str,
    ctx: &mut BuildContext<'_>,
    name: &str,
) -> ControlResult<(Expr, Expr)> {
    match args {
        [a, b] => Ok((build_expr(a, ctx, name)?, build_expr(b, ctx, name)?)),
        _ => Err(invalid(
            name,
            "function",
            format!("{what} takes 2 operands, got {}", args.len()),
        )),
    }
}

fn sensor_model(
    def: &SensorDef,
    base: &str,
    ctx: &mut BuildContext<'_>,
    name: &str,
) -> ControlResult<SensorModel> {
    let lag = ctx.opt_param(def.lag.as_ref(), name)?;
    let quantization = def
        .quantization
        .map(|q| Quantization::new(q.bits, q.min, q.max, name))
        .transpose()?;
    let mut model = SensorModel::new(base, ctx.seed, ctx.store)
        .with_lag(lag)
        .with_drift_rate(def.drift_rate)
        .with_gain(def.gain)
        .with_bias(def.bias)
        .with_quantization(quantization);
    if let Some(noise) = def.noise {
        let kind = match noise.kind {
            NoiseKindDef::Percent => NoiseKind::Percent,
            NoiseKindDef::Absolute => NoiseKind::Absolute,
        };
        let distribution = match noise.distribution {
            DistributionDef::Uniform => Distribution::Uniform,
            DistributionDef::Gaussian => Distribution::Gaussian,
        };
        model = model.with_noise(noise.variance, kind, distribution, ctx.store);
    }
    Ok(model)
}

fn sensor_orientation(def: &OrientationDef, axis: AxisDef) -> SensorOrientation {
    SensorOrientation {
        roll: def.unit.angle(def.roll),
        pitch: def.unit.angle(def.pitch),
        yaw: def.unit.angle(def.yaw),
        axis: match axis {
            AxisDef::X => Axis::X,
            AxisDef::Y => Axis::Y,
            AxisDef::Z => Axis::Z,
        },
    }
}

fn tagged_angle(
    def: &TaggedAngleDef,
    ctx: &mut BuildContext<'_>,
    name: &str,
) -> ControlResult<TaggedAngle> {
    Ok(TaggedAngle::new(ctx.param(&def.value, name)?, def.unit))
}

fn position(
    def: &PositionDef,
    ctx: &mut BuildContext<'_>,
    name: &str,
) -> ControlResult<TaggedPosition> {
    Ok(TaggedPosition::new(
        tagged_angle(&def.latitude, ctx, name)?,
        tagged_angle(&def.longitude, ctx, name)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcs_config::schema::RangeDef;
    use fcs_controls::{FrameContext, StaticAircraftState};

    fn def(name: &str, kind: ComponentKindDef, inputs: &[&str]) -> ComponentDef {
        ComponentDef {
            name: name.to_string(),
            kind,
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            outputs: Vec::new(),
            clipto: None,
            delay: None,
        }
    }

    fn build(def: &ComponentDef, store: &mut PropertyStore) -> ControlResult<Component> {
        let mut ctx = BuildContext {
            store,
            dt: 0.01,
            seed: 1,
        };
        build_component(def, &mut ctx)
    }

    #[test]
    fn missing_clip_bound_is_fatal() {
        let mut store = PropertyStore::new();
        let mut d = def("g", ComponentKindDef::Summer { bias: 0.0 }, &["fcs/x"]);
        d.clipto = Some(ClipDef {
            min: Some(ParamDef::Value(-1.0)),
            max: None,
            cyclic: false,
        });
        let err = build(&d, &mut store).unwrap_err();
        assert_eq!(err, missing("g", "clipto.max"));
    }

    #[test]
    fn pure_gain_defaults_to_unity() {
        let mut store = PropertyStore::new();
        let d = def("g", ComponentKindDef::PureGain { gain: None }, &["fcs/x"]);
        let mut c = build(&d, &mut store).unwrap();
        store.set_by_name("fcs/x", 0.7).unwrap();
        let aircraft = StaticAircraftState::default();
        c.run(&mut store, &FrameContext::new(0.01, &aircraft)).unwrap();
        assert_eq!(c.output(), 0.7);
    }

    #[test]
    fn aerosurface_scale_requires_range() {
        let mut store = PropertyStore::new();
        let kind = ComponentKindDef::AerosurfaceScale {
            gain: None,
            domain: None,
            range: None,
            zero_centered: true,
        };
        let err = build(&def("s", kind, &["fcs/x"]), &mut store).unwrap_err();
        assert!(matches!(err, ControlError::MissingElement { element: "range", .. }));

        let kind = ComponentKindDef::AerosurfaceScale {
            gain: None,
            domain: None,
            range: Some(RangeDef {
                min: -0.35,
                max: 0.3,
            }),
            zero_centered: true,
        };
        assert!(build(&def("t", kind, &["fcs/x"]), &mut store).is_ok());
    }

    #[test]
    fn quotient_arity_is_checked() {
        let mut store = PropertyStore::new();
        let kind = ComponentKindDef::FcsFunction {
            function: FunctionDef::Quotient(vec![
                FunctionDef::Value(1.0),
                FunctionDef::Value(2.0),
                FunctionDef::Value(3.0),
            ]),
        };
        let err = build(&def("f", kind, &[]), &mut store).unwrap_err();
        assert!(matches!(err, ControlError::InvalidElement { element: "function", .. }));
    }

    #[test]
    fn one_d_table_rows_need_two_entries() {
        let mut store = PropertyStore::new();
        let kind = ComponentKindDef::ScheduledGain {
            gain: None,
            table: Some(TableDef {
                row: "aero/qbar-psf".to_string(),
                column: None,
                columns: Vec::new(),
                data: vec![vec![0.0, 1.0], vec![100.0]],
            }),
        };
        let err = build(&def("s", kind, &["fcs/x"]), &mut store).unwrap_err();
        assert!(matches!(err, ControlError::InvalidElement { element: "table", .. }));
    }

    #[test]
    fn time_delay_uses_channel_step() {
        let mut store = PropertyStore::new();
        let mut d = def("d", ComponentKindDef::Summer { bias: 0.0 }, &["fcs/x"]);
        d.delay = Some(DelayDef {
            value: 0.035,
            delay_type: DelayType::Time,
        });
        let c = build(&d, &mut store).unwrap();
        assert_eq!(c.core().delay().map(|d| d.len()), Some(3));
    }

    #[test]
    fn actuator_binds_malfunctions() {
        let mut store = PropertyStore::new();
        let kind = ComponentKindDef::Actuator {
            lag: None,
            rate_limit: Some(ParamDef::Value(1.0)),
            rate_limit_incr: None,
            rate_limit_decr: None,
            deadband_width: 0.0,
            hysteresis_width: 0.0,
            bias: 0.0,
        };
        build(&def("fcs/elevator-actuator", kind, &["fcs/x"]), &mut store).unwrap();
        for suffix in ["fail_zero", "fail_hardover", "fail_stuck"] {
            assert!(store.has_node(&format!("fcs/elevator-actuator/malfunction/{suffix}")));
        }
        assert!(store.has_node("fcs/elevator-actuator/saturated"));
    }
}
