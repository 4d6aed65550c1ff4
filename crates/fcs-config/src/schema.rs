//! Configuration schema for flight control systems.
//!
//! The schema describes an already-resolved component tree: every component
//! carries its inputs, parameters, clipping, delay and output bindings.

use fcs_core::units::{AngleUnit, LengthUnit};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FcsConfig {
    pub version: u32,
    pub name: String,
    /// Simulation frame step (s).
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Number of engines with throttle/mixture/advance command properties.
    #[serde(default)]
    pub engines: usize,
    /// Master seed for sensor noise streams.
    #[serde(default)]
    pub seed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autopilot: Option<SystemDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_control: Option<SystemDef>,
}

impl FcsConfig {
    /// Autopilot then flight control, in run order.
    pub fn systems(&self) -> impl Iterator<Item = &SystemDef> {
        self.autopilot.iter().chain(self.flight_control.iter())
    }
}

fn default_dt() -> f64 {
    1.0 / 120.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemDef {
    pub name: String,
    #[serde(default)]
    pub channels: Vec<ChannelDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelDef {
    pub name: String,
    /// Property gating execution; the channel runs while it is nonzero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute: Option<String>,
    /// Run every `rate`-th frame.
    #[serde(default = "default_rate")]
    pub rate: u32,
    #[serde(default)]
    pub components: Vec<ComponentDef>,
}

fn default_rate() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentDef {
    pub name: String,
    pub kind: ComponentKindDef,
    /// Input property names, optionally prefixed with `-`.
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clipto: Option<ClipDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<DelayDef>,
}

/// Number literal or property name (optionally `-` prefixed).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ParamDef {
    Value(f64),
    Property(String),
}

impl From<f64> for ParamDef {
    fn from(v: f64) -> Self {
        ParamDef::Value(v)
    }
}

impl From<&str> for ParamDef {
    fn from(s: &str) -> Self {
        ParamDef::Property(s.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClipDef {
    pub min: Option<ParamDef>,
    pub max: Option<ParamDef>,
    #[serde(default)]
    pub cyclic: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DelayType {
    #[default]
    Frames,
    Time,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DelayDef {
    pub value: f64,
    #[serde(rename = "type", default)]
    pub delay_type: DelayType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentKindDef {
    Summer {
        #[serde(default)]
        bias: f64,
    },
    PureGain {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gain: Option<ParamDef>,
    },
    ScheduledGain {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gain: Option<ParamDef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        table: Option<TableDef>,
    },
    AerosurfaceScale {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gain: Option<ParamDef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        domain: Option<RangeDef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<RangeDef>,
        #[serde(default = "default_true")]
        zero_centered: bool,
    },
    LagFilter {
        c1: Option<ParamDef>,
    },
    LeadLagFilter {
        c1: Option<ParamDef>,
        c2: Option<ParamDef>,
        c3: Option<ParamDef>,
        c4: Option<ParamDef>,
    },
    WashoutFilter {
        c1: Option<ParamDef>,
    },
    SecondOrderFilter {
        c1: Option<ParamDef>,
        c2: Option<ParamDef>,
        c3: Option<ParamDef>,
        c4: Option<ParamDef>,
        c5: Option<ParamDef>,
        c6: Option<ParamDef>,
    },
    Integrator {
        c1: Option<ParamDef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trigger: Option<ParamDef>,
    },
    Deadband {
        width: Option<ParamDef>,
        #[serde(default = "default_one")]
        gain: f64,
    },
    Switch {
        #[serde(default)]
        tests: Vec<SwitchTestDef>,
    },
    Kinematic {
        #[serde(default)]
        traverse: Vec<DetentDef>,
        #[serde(default)]
        scale: bool,
    },
    Pid {
        kp: Option<ParamDef>,
        ki: Option<ParamDef>,
        kd: Option<ParamDef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pvdot: Option<ParamDef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trigger: Option<ParamDef>,
        #[serde(default)]
        integration: IntegrationDef,
        #[serde(default)]
        form: PidFormDef,
    },
    Sensor {
        #[serde(flatten)]
        sensor: SensorDef,
    },
    Accelerometer {
        #[serde(flatten)]
        sensor: SensorDef,
        #[serde(default)]
        location: LocationDef,
        #[serde(default)]
        orientation: OrientationDef,
        #[serde(default)]
        axis: AxisDef,
    },
    Gyro {
        #[serde(flatten)]
        sensor: SensorDef,
        #[serde(default)]
        orientation: OrientationDef,
        #[serde(default)]
        axis: AxisDef,
    },
    Actuator {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lag: Option<ParamDef>,
        /// Sets both the increase and decrease limits.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rate_limit: Option<ParamDef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rate_limit_incr: Option<ParamDef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rate_limit_decr: Option<ParamDef>,
        #[serde(default)]
        deadband_width: f64,
        #[serde(default)]
        hysteresis_width: f64,
        #[serde(default)]
        bias: f64,
    },
    Angle {
        target: TaggedAngleDef,
        source: TaggedAngleDef,
        #[serde(default)]
        unit: AngleUnit,
    },
    WaypointHeading {
        target: PositionDef,
        source: PositionDef,
        #[serde(default)]
        unit: AngleUnit,
    },
    WaypointDistance {
        target: PositionDef,
        source: PositionDef,
        #[serde(default)]
        unit: LengthUnit,
    },
    FcsFunction {
        #[serde(with = "serde_yaml::with::singleton_map_recursive")]
        function: FunctionDef,
    },
}

impl ComponentKindDef {
    /// Type tag as written in configuration files.
    pub fn type_name(&self) -> &'static str {
        match self {
            ComponentKindDef::Summer { .. } => "summer",
            ComponentKindDef::PureGain { .. } => "pure_gain",
            ComponentKindDef::ScheduledGain { .. } => "scheduled_gain",
            ComponentKindDef::AerosurfaceScale { .. } => "aerosurface_scale",
            ComponentKindDef::LagFilter { .. } => "lag_filter",
            ComponentKindDef::LeadLagFilter { .. } => "lead_lag_filter",
            ComponentKindDef::WashoutFilter { .. } => "washout_filter",
            ComponentKindDef::SecondOrderFilter { .. } => "second_order_filter",
            ComponentKindDef::Integrator { .. } => "integrator",
            ComponentKindDef::Deadband { .. } => "deadband",
            ComponentKindDef::Switch { .. } => "switch",
            ComponentKindDef::Kinematic { .. } => "kinematic",
            ComponentKindDef::Pid { .. } => "pid",
            ComponentKindDef::Sensor { .. } => "sensor",
            ComponentKindDef::Accelerometer { .. } => "accelerometer",
            ComponentKindDef::Gyro { .. } => "gyro",
            ComponentKindDef::Actuator { .. } => "actuator",
            ComponentKindDef::Angle { .. } => "angle",
            ComponentKindDef::WaypointHeading { .. } => "waypoint_heading",
            ComponentKindDef::WaypointDistance { .. } => "waypoint_distance",
            ComponentKindDef::FcsFunction { .. } => "fcs_function",
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_one() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RangeDef {
    pub min: f64,
    pub max: f64,
}

/// Lookup table.
///
/// One-dimensional tables list `[breakpoint, value]` rows. Two-dimensional
/// tables add a `column` lookup and `columns` breakpoints, and each row is
/// `[row breakpoint, value per column...]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableDef {
    pub row: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<f64>,
    pub data: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SwitchTestDef {
    /// Absent for the default test.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionDef>,
    pub value: ParamDef,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogicDef {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

/// `"lhs op rhs"` leaf or a nested group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ConditionDef {
    Leaf(String),
    Group {
        #[serde(default)]
        logic: LogicDef,
        conditions: Vec<ConditionDef>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DetentDef {
    pub position: f64,
    pub time: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationDef {
    #[default]
    #[serde(alias = "rect")]
    Rectangular,
    #[serde(alias = "trap")]
    Trapezoidal,
    #[serde(alias = "adams_bashforth2")]
    Ab2,
    #[serde(alias = "adams_bashforth3")]
    Ab3,
    None,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PidFormDef {
    #[default]
    Ideal,
    Standard,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SensorDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lag: Option<ParamDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise: Option<NoiseDef>,
    #[serde(default)]
    pub drift_rate: f64,
    #[serde(default = "default_one")]
    pub gain: f64,
    #[serde(default)]
    pub bias: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantization: Option<QuantizationDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NoiseDef {
    pub variance: f64,
    #[serde(default)]
    pub kind: NoiseKindDef,
    #[serde(default)]
    pub distribution: DistributionDef,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoiseKindDef {
    #[default]
    Percent,
    Absolute,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DistributionDef {
    #[default]
    Uniform,
    Gaussian,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct QuantizationDef {
    pub bits: u32,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct LocationDef {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub unit: LengthUnit,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct OrientationDef {
    #[serde(default)]
    pub roll: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub unit: AngleUnit,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum AxisDef {
    #[default]
    #[serde(alias = "x")]
    X,
    #[serde(alias = "y")]
    Y,
    #[serde(alias = "z")]
    Z,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaggedAngleDef {
    pub value: ParamDef,
    #[serde(default)]
    pub unit: AngleUnit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionDef {
    pub latitude: TaggedAngleDef,
    pub longitude: TaggedAngleDef,
}

/// Expression tree for `fcs_function` components.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FunctionDef {
    Value(f64),
    Property(String),
    Table(TableDef),
    Sum(Vec<FunctionDef>),
    Difference(Vec<FunctionDef>),
    Product(Vec<FunctionDef>),
    Quotient(Vec<FunctionDef>),
    Pow(Vec<FunctionDef>),
    Min(Vec<FunctionDef>),
    Max(Vec<FunctionDef>),
    Abs(Box<FunctionDef>),
    Sin(Box<FunctionDef>),
    Cos(Box<FunctionDef>),
    Tan(Box<FunctionDef>),
    Sqrt(Box<FunctionDef>),
}
