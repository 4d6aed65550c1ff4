//! Flight control components and their per-frame algorithms.
//!
//! A flight control law is an ordered list of components. Each frame every
//! component reads its inputs from the property store, runs its algorithm
//! and writes its output back, so later components see values written
//! earlier in the same frame.
//!
//! # Architecture
//!
//! - [`Parameter`]: constant or property reference, evaluated on demand
//! - [`Condition`]: boolean comparison tree used by switches
//! - [`ComponentCore`]: inputs, outputs, clipping and transport delay shared
//!   by every kind
//! - [`ComponentKind`]: closed set of algorithms (summer, gain, filter,
//!   switch, kinemat, PID, sensors, actuator, ...)
//! - [`FrameContext`]: time step, trim flag and aircraft state
//!
//! Component history is owned by the component; the property store is the
//! only shared state.

pub mod actuator;
pub mod angle;
pub mod component;
pub mod condition;
pub mod context;
pub mod deadband;
pub mod error;
pub mod filter;
pub mod function;
pub mod gain;
pub mod inertial;
pub mod kinemat;
pub mod noise;
pub mod parameter;
pub mod pid;
pub mod sensor;
pub mod summer;
pub mod switch;
pub mod table;
pub mod waypoint;

pub use actuator::Actuator;
pub use angle::{AngleDifference, TaggedAngle};
pub use component::{Clip, Component, ComponentCore, ComponentKind, ComponentModel, TransportDelay};
pub use condition::{Comparison, Condition, Logic};
pub use context::{AircraftState, FrameContext, GeoPoint, Geodesy, SphericalEarth, StaticAircraftState};
pub use deadband::Deadband;
pub use error::{ControlError, ControlResult};
pub use filter::{Filter, FilterKind};
pub use function::{Expr, FcsFunction, NaryOp, UnaryOp};
pub use gain::{Gain, GainMode, Interval, ScaleMode};
pub use inertial::{Accelerometer, Axis, Gyro, SensorOrientation};
pub use kinemat::{Detent, Kinemat};
pub use noise::{Distribution, NoiseKind, component_rng};
pub use parameter::Parameter;
pub use pid::{IntegrationScheme, Pid, PidForm};
pub use sensor::{FirstOrderLag, Quantization, Sensor, SensorModel};
pub use summer::Summer;
pub use switch::{Switch, SwitchTest};
pub use table::Table;
pub use waypoint::{TaggedPosition, Waypoint, WaypointOutput};
