//! Heading or distance from a source position to a target position.

use fcs_core::units::{AngleUnit, LengthUnit};
use fcs_props::PropertyStore;

use crate::angle::TaggedAngle;
use crate::component::{ComponentCore, ComponentModel};
use crate::context::{FrameContext, GeoPoint};
use crate::error::ControlResult;

/// Latitude/longitude pair read from parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedPosition {
    pub latitude: TaggedAngle,
    pub longitude: TaggedAngle,
}

impl TaggedPosition {
    pub fn new(latitude: TaggedAngle, longitude: TaggedAngle) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn point(&self, store: &PropertyStore) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude.unit.angle(self.latitude.value.value(store)),
            longitude: self.longitude.unit.angle(self.longitude.value.value(store)),
        }
    }
}

/// What the waypoint reports, and in which unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaypointOutput {
    Heading(AngleUnit),
    Distance(LengthUnit),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub target: TaggedPosition,
    pub source: TaggedPosition,
    pub output: WaypointOutput,
}

impl Waypoint {
    pub fn new(target: TaggedPosition, source: TaggedPosition, output: WaypointOutput) -> Self {
        Self {
            target,
            source,
            output,
        }
    }

    pub fn type_tag(&self) -> &'static str {
        match self.output {
            WaypointOutput::Heading(_) => "waypoint_heading",
            WaypointOutput::Distance(_) => "waypoint_distance",
        }
    }

    pub fn evaluate(&self, store: &PropertyStore, ctx: &FrameContext<'_>) -> f64 {
        let from = self.source.point(store);
        let to = self.target.point(store);
        let geodesy = ctx.aircraft.geodesy();
        match self.output {
            WaypointOutput::Heading(unit) => unit.value_of(geodesy.heading_to(from, to)),
            WaypointOutput::Distance(unit) => unit.value_of(geodesy.distance_to(from, to)),
        }
    }
}

impl ComponentModel for Waypoint {
    fn run(
        &mut self,
        core: &mut ComponentCore,
        store: &mut PropertyStore,
        ctx: &FrameContext<'_>,
    ) -> ControlResult<()> {
        let value = self.evaluate(store, ctx);
        core.finish(value, store, ctx)
    }
}
