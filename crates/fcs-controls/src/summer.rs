//! Summer: signed sum of inputs plus a constant bias.

use fcs_props::PropertyStore;

use crate::component::{ComponentCore, ComponentModel};
use crate::context::FrameContext;
use crate::error::ControlResult;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summer {
    pub bias: f64,
}

impl Summer {
    pub fn new(bias: f64) -> Self {
        Self { bias }
    }
}

impl ComponentModel for Summer {
    fn run(
        &mut self,
        core: &mut ComponentCore,
        store: &mut PropertyStore,
        ctx: &FrameContext<'_>,
    ) -> ControlResult<()> {
        let sum: f64 = core.inputs().iter().map(|p| p.value(store)).sum();
        core.finish(sum + self.bias, store, ctx)
    }
}
