//! fcs-system: the flight control system container.
//!
//! Builds components from a validated configuration and drives them frame
//! by frame:
//! - autopilot and flight-control channels with execute gating and rates
//! - pilot command, aerosurface position and engine command properties
//! - trim mode and history reset

pub mod build;
pub mod channel;
pub mod commands;
pub mod error;
pub mod surfaces;
pub mod system;

pub use build::{BuildContext, build_component};
pub use channel::Channel;
pub use commands::{EngineControls, PilotCommand, PilotControls};
pub use error::{SystemError, SystemResult};
pub use surfaces::{Aerosurfaces, Surface, SurfacePosition};
pub use system::FlightControlSystem;
