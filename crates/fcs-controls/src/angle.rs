//! Signed smallest angle from a source heading to a target heading.

use fcs_core::units::AngleUnit;
use fcs_props::PropertyStore;
use uom::si::angle::radian;

use crate::component::{ComponentCore, ComponentModel};
use crate::context::FrameContext;
use crate::error::ControlResult;
use crate::parameter::Parameter;

/// Angle-valued parameter with the unit its raw value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedAngle {
    pub value: Parameter,
    pub unit: AngleUnit,
}

impl TaggedAngle {
    pub fn new(value: Parameter, unit: AngleUnit) -> Self {
        Self { value, unit }
    }

    /// Current value in radians.
    pub fn radians(&self, store: &PropertyStore) -> f64 {
        self.unit.angle(self.value.value(store)).get::<radian>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleDifference {
    pub target: TaggedAngle,
    pub source: TaggedAngle,
    pub output_unit: AngleUnit,
}

impl AngleDifference {
    pub fn new(target: TaggedAngle, source: TaggedAngle, output_unit: AngleUnit) -> Self {
        Self {
            target,
            source,
            output_unit,
        }
    }

    /// Positive when the target lies counter-clockwise of the source.
    pub fn evaluate(&self, store: &PropertyStore) -> f64 {
        let (y1, x1) = self.source.radians(store).sin_cos();
        let (y2, x2) = self.target.radians(store).sin_cos();
        let cos = (x1 * x2 + y1 * y2).clamp(-1.0, 1.0);
        let magnitude = cos.acos();
        let signed = if x1 * y2 >= x2 * y1 {
            magnitude
        } else {
            -magnitude
        };
        self.output_unit.value_of(AngleUnit::Radians.angle(signed))
    }
}

impl ComponentModel for AngleDifference {
    fn run(
        &mut self,
        core: &mut ComponentCore,
        store: &mut PropertyStore,
        ctx: &FrameContext<'_>,
    ) -> ControlResult<()> {
        let value = self.evaluate(store);
        core.finish(value, store, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(source: f64, target: f64) -> (PropertyStore, AngleDifference) {
        let mut store = PropertyStore::new();
        let s = store.create("attitude/heading-deg");
        let t = store.create("ap/heading-setpoint-deg");
        store.set(s, source);
        store.set(t, target);
        let diff = AngleDifference::new(
            TaggedAngle::new(Parameter::property(t), AngleUnit::Degrees),
            TaggedAngle::new(Parameter::property(s), AngleUnit::Degrees),
            AngleUnit::Degrees,
        );
        (store, diff)
    }

    #[test]
    fn wraps_through_north() {
        let (store, diff) = setup(350.0, 10.0);
        assert!((diff.evaluate(&store) - 20.0).abs() < 1e-9);
        let (store, diff) = setup(10.0, 350.0);
        assert!((diff.evaluate(&store) + 20.0).abs() < 1e-9);
    }

    #[test]
    fn opposite_is_half_turn() {
        let (store, diff) = setup(0.0, 180.0);
        assert!((diff.evaluate(&store).abs() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn radian_output() {
        let (store, mut diff) = setup(0.0, 90.0);
        diff.output_unit = AngleUnit::Radians;
        assert!((diff.evaluate(&store) - core::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
