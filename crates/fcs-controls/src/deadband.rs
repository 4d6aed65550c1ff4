//! Symmetric dead zone around zero.

use fcs_props::PropertyStore;

use crate::component::{ComponentCore, ComponentModel};
use crate::context::FrameContext;
use crate::error::ControlResult;
use crate::parameter::Parameter;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deadband {
    pub width: Parameter,
    pub gain: f64,
}

impl Deadband {
    pub fn new(width: Parameter, gain: f64) -> Self {
        Self { width, gain }
    }

    /// Zero inside `±width/2`; outside, the offset is removed and the gain applied.
    pub fn apply(&self, input: f64, store: &PropertyStore) -> f64 {
        let half = 0.5 * self.width.value(store);
        if input < -half {
            (input + half) * self.gain
        } else if input > half {
            (input - half) * self.gain
        } else {
            0.0
        }
    }
}

impl ComponentModel for Deadband {
    fn run(
        &mut self,
        core: &mut ComponentCore,
        store: &mut PropertyStore,
        ctx: &FrameContext<'_>,
    ) -> ControlResult<()> {
        let value = self.apply(core.input(0, store), store);
        core.finish(value, store, ctx)
    }
}
