//! Ordered component lists with optional execution gating and rate.

use fcs_controls::{Component, ControlResult, FrameContext};
use fcs_core::PropertyId;
use fcs_props::PropertyStore;

/// Named, ordered sequence of components.
///
/// Components run in declaration order, so later ones see outputs written
/// earlier in the same frame.
#[derive(Debug)]
pub struct Channel {
    name: String,
    execute: Option<PropertyId>,
    rate: u32,
    components: Vec<Component>,
}

impl Channel {
    pub fn new(name: impl Into<String>, components: Vec<Component>) -> Self {
        Self {
            name: name.into(),
            execute: None,
            rate: 1,
            components,
        }
    }

    /// Run only while `property` is nonzero.
    pub fn with_execute(mut self, property: Option<PropertyId>) -> Self {
        self.execute = property;
        self
    }

    /// Run every `rate`-th frame. Zero is treated as one.
    pub fn with_rate(mut self, rate: u32) -> Self {
        self.rate = rate.max(1);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name() == name)
    }

    /// True if the channel is due in `frame` and its gate is open.
    pub fn is_due(&self, frame: u64, store: &PropertyStore) -> bool {
        frame % u64::from(self.rate) == 0 && self.execute.is_none_or(|id| store.get(id) != 0.0)
    }

    /// Run every component once. `ctx.dt` must already be the channel step.
    pub fn run(&mut self, store: &mut PropertyStore, ctx: &FrameContext<'_>) -> ControlResult<()> {
        for component in &mut self.components {
            component.run(store, ctx)?;
        }
        Ok(())
    }

    pub fn reset_past_states(&mut self) {
        for component in &mut self.components {
            component.reset_past_states();
        }
    }
}
