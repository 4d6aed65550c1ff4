//! Per-frame execution context and aircraft-state collaborators.

use fcs_core::units::{Angle, Length, ft};
use nalgebra::Vector3;

/// Everything a component may consult besides the property store.
#[derive(Clone, Copy)]
pub struct FrameContext<'a> {
    /// Channel time step (seconds).
    pub dt: f64,
    /// Trim mode: dynamic elements converge immediately.
    pub trim: bool,
    /// Body-frame kinematics and geodesy of the host aircraft.
    pub aircraft: &'a dyn AircraftState,
}

impl<'a> FrameContext<'a> {
    pub fn new(dt: f64, aircraft: &'a dyn AircraftState) -> Self {
        Self {
            dt,
            trim: false,
            aircraft,
        }
    }

    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }
}

/// Aircraft state consumed by inertial sensors and waypoint components.
pub trait AircraftState {
    /// Body angular rate `[p, q, r]` (rad/s).
    fn angular_rate(&self) -> Vector3<f64>;

    /// Body angular acceleration `[pdot, qdot, rdot]` (rad/s²).
    fn angular_accel(&self) -> Vector3<f64>;

    /// Specific force at the center of gravity, body frame (ft/s²).
    fn body_accel(&self) -> Vector3<f64>;

    /// Position/geodesy collaborator.
    fn geodesy(&self) -> &dyn Geodesy;
}

/// Geographic position on the reference body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub latitude: Angle,
    pub longitude: Angle,
}

/// Great-circle navigation between two positions.
pub trait Geodesy {
    /// Initial true heading from `from` towards `to`, in `[0, 2π)`.
    fn heading_to(&self, from: GeoPoint, to: GeoPoint) -> Angle;

    /// Great-circle distance between the two positions.
    fn distance_to(&self, from: GeoPoint, to: GeoPoint) -> Length;
}

/// Spherical body of fixed radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphericalEarth {
    pub radius: Length,
}

impl SphericalEarth {
    /// Reference radius used by the simulation (ft).
    pub const REFERENCE_RADIUS_FT: f64 = 20_925_646.325_46;
}

impl Default for SphericalEarth {
    fn default() -> Self {
        Self {
            radius: ft(Self::REFERENCE_RADIUS_FT),
        }
    }
}

impl Geodesy for SphericalEarth {
    fn heading_to(&self, from: GeoPoint, to: GeoPoint) -> Angle {
        use uom::si::angle::radian;
        let (lat1, lon1) = (from.latitude.get::<radian>(), from.longitude.get::<radian>());
        let (lat2, lon2) = (to.latitude.get::<radian>(), to.longitude.get::<radian>());
        let dlon = lon2 - lon1;
        let y = dlon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
        let mut heading = y.atan2(x);
        if heading < 0.0 {
            heading += 2.0 * core::f64::consts::PI;
        }
        Angle::new::<radian>(heading)
    }

    fn distance_to(&self, from: GeoPoint, to: GeoPoint) -> Length {
        use uom::si::angle::radian;
        let (lat1, lon1) = (from.latitude.get::<radian>(), from.longitude.get::<radian>());
        let (lat2, lon2) = (to.latitude.get::<radian>(), to.longitude.get::<radian>());
        let a = (0.5 * (lat2 - lat1)).sin().powi(2)
            + lat1.cos() * lat2.cos() * (0.5 * (lon2 - lon1)).sin().powi(2);
        self.radius * (2.0 * a.sqrt().atan2((1.0 - a).sqrt()))
    }
}

/// Fixed aircraft state, for tests and offline runs.
#[derive(Clone, Debug, Default)]
pub struct StaticAircraftState {
    pub angular_rate: Vector3<f64>,
    pub angular_accel: Vector3<f64>,
    pub body_accel: Vector3<f64>,
    pub earth: SphericalEarth,
}

impl AircraftState for StaticAircraftState {
    fn angular_rate(&self) -> Vector3<f64> {
        self.angular_rate
    }

    fn angular_accel(&self) -> Vector3<f64> {
        self.angular_accel
    }

    fn body_accel(&self) -> Vector3<f64> {
        self.body_accel
    }

    fn geodesy(&self) -> &dyn Geodesy {
        &self.earth
    }
}
