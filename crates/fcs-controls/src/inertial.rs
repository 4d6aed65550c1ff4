//! Body-mounted inertial sensors.
//!
//! Both sensors derive their measurement from aircraft kinematics instead of
//! an input property, rotate it into the sensor frame and feed one axis into
//! the shared [`SensorModel`] pipeline.

use fcs_core::units::{Angle, rad};
use fcs_props::PropertyStore;
use nalgebra::{Matrix3, Vector3};
use uom::si::angle::radian;

use crate::component::{ComponentCore, ComponentModel};
use crate::context::FrameContext;
use crate::error::ControlResult;
use crate::sensor::SensorModel;

/// Sensitive axis in the sensor frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    #[default]
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Mounting attitude of a sensor relative to the body axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorOrientation {
    pub roll: Angle,
    pub pitch: Angle,
    pub yaw: Angle,
    pub axis: Axis,
}

impl Default for SensorOrientation {
    fn default() -> Self {
        Self {
            roll: rad(0.0),
            pitch: rad(0.0),
            yaw: rad(0.0),
            axis: Axis::X,
        }
    }
}

impl SensorOrientation {
    /// Body-to-sensor transform for the roll/pitch/yaw Euler sequence.
    pub fn matrix(&self) -> Matrix3<f64> {
        let (sr, cr) = self.roll.get::<radian>().sin_cos();
        let (sp, cp) = self.pitch.get::<radian>().sin_cos();
        let (sy, cy) = self.yaw.get::<radian>().sin_cos();
        Matrix3::new(
            cp * cy,
            cp * sy,
            -sp,
            sr * sp * cy - cr * sy,
            sr * sp * sy + cr * cy,
            sr * cp,
            cr * sp * cy + sr * sy,
            cr * sp * sy - sr * cy,
            cr * cp,
        )
    }

    /// Rotate a body vector and pick the sensitive axis.
    pub fn measure(&self, body: Vector3<f64>) -> f64 {
        (self.matrix() * body)[self.axis.index()]
    }
}

/// Specific force at a point offset from the center of gravity.
#[derive(Debug, Clone)]
pub struct Accelerometer {
    /// Offset from the CG, body axes (ft).
    pub location: Vector3<f64>,
    pub orientation: SensorOrientation,
    pub model: SensorModel,
}

impl Accelerometer {
    pub fn new(location: Vector3<f64>, orientation: SensorOrientation, model: SensorModel) -> Self {
        Self {
            location,
            orientation,
            model,
        }
    }

    /// `a + ω̇ × r + ω × (ω × r)` in body axes.
    pub fn specific_force(&self, ctx: &FrameContext<'_>) -> Vector3<f64> {
        let w = ctx.aircraft.angular_rate();
        let wdot = ctx.aircraft.angular_accel();
        let r = self.location;
        ctx.aircraft.body_accel() + wdot.cross(&r) + w.cross(&w.cross(&r))
    }
}

impl ComponentModel for Accelerometer {
    fn run(
        &mut self,
        core: &mut ComponentCore,
        store: &mut PropertyStore,
        ctx: &FrameContext<'_>,
    ) -> ControlResult<()> {
        let input = self.orientation.measure(self.specific_force(ctx));
        self.model.process(input, core, store, ctx)
    }

    fn reset(&mut self) {
        self.model.reset();
    }
}

/// Body angular rate sensor.
#[derive(Debug, Clone)]
pub struct Gyro {
    pub orientation: SensorOrientation,
    pub model: SensorModel,
}

impl Gyro {
    pub fn new(orientation: SensorOrientation, model: SensorModel) -> Self {
        Self { orientation, model }
    }
}

impl ComponentModel for Gyro {
    fn run(
        &mut self,
        core: &mut ComponentCore,
        store: &mut PropertyStore,
        ctx: &FrameContext<'_>,
    ) -> ControlResult<()> {
        let input = self.orientation.measure(ctx.aircraft.angular_rate());
        self.model.process(input, core, store, ctx)
    }

    fn reset(&mut self) {
        self.model.reset();
    }
}
