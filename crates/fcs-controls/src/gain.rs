//! Gain family.
//!
//! - **Pure**: `output = gain * input`
//! - **Scheduled**: `output = gain * input * table(schedule)`
//! - **Aerosurface scale**: clamps the input to its domain, maps the domain
//!   onto an output range, then multiplies by `gain`

use fcs_props::PropertyStore;

use crate::component::{ComponentCore, ComponentModel};
use crate::context::FrameContext;
use crate::error::{ControlError, ControlResult};
use crate::parameter::Parameter;
use crate::table::Table;

/// Closed interval used by the aerosurface scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Mapping mode for [`GainMode::AerosurfaceScale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMode {
    /// Zero input maps to zero output, with separate positive/negative scales.
    #[default]
    ZeroCentered,
    /// Straight line from `(domain.min, range.min)` to `(domain.max, range.max)`.
    Linear,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GainMode {
    Pure,
    Scheduled(Box<Table>),
    AerosurfaceScale {
        domain: Interval,
        range: Interval,
        mode: ScaleMode,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gain {
    pub gain: Parameter,
    pub mode: GainMode,
}

impl Gain {
    pub fn pure(gain: Parameter) -> Self {
        Self {
            gain,
            mode: GainMode::Pure,
        }
    }

    /// Scheduled gain. The lookup table is mandatory.
    pub fn scheduled(gain: Parameter, table: Option<Table>, component: &str) -> ControlResult<Self> {
        let table = table.ok_or_else(|| ControlError::missing(component, "table"))?;
        Ok(Self {
            gain,
            mode: GainMode::Scheduled(Box::new(table)),
        })
    }

    /// Aerosurface scale. The output range is mandatory; the domain defaults
    /// to `[-1, 1]`.
    pub fn aerosurface_scale(
        gain: Parameter,
        domain: Option<Interval>,
        range: Option<Interval>,
        mode: ScaleMode,
        component: &str,
    ) -> ControlResult<Self> {
        let range = range.ok_or_else(|| ControlError::missing(component, "range"))?;
        let domain = domain.unwrap_or(Interval::new(-1.0, 1.0));
        if !(domain.min < domain.max) {
            return Err(ControlError::invalid(
                component,
                "domain",
                format!("min {} must be below max {}", domain.min, domain.max),
            ));
        }
        Ok(Self {
            gain,
            mode: GainMode::AerosurfaceScale {
                domain,
                range,
                mode,
            },
        })
    }

    pub fn type_tag(&self) -> &'static str {
        match self.mode {
            GainMode::Pure => "pure_gain",
            GainMode::Scheduled(_) => "scheduled_gain",
            GainMode::AerosurfaceScale { .. } => "aerosurface_scale",
        }
    }

    /// Gain stage applied to an already-read input.
    pub fn apply(&self, input: f64, store: &PropertyStore) -> f64 {
        let gain = self.gain.value(store);
        match &self.mode {
            GainMode::Pure => gain * input,
            GainMode::Scheduled(table) => gain * input * table.value(store),
            GainMode::AerosurfaceScale {
                domain,
                range,
                mode,
            } => gain * scale(input, *domain, *range, *mode),
        }
    }
}

/// A zero-centered side is only divided by when the clamped input lies on it,
/// so one-sided domains such as `[0, 30]` never divide by zero.
fn scale(input: f64, domain: Interval, range: Interval, mode: ScaleMode) -> f64 {
    let input = input.clamp(domain.min, domain.max);
    match mode {
        ScaleMode::ZeroCentered => {
            if input == 0.0 {
                0.0
            } else if input > 0.0 {
                input / domain.max * range.max
            } else {
                input / domain.min * range.min
            }
        }
        ScaleMode::Linear => {
            range.min + (input - domain.min) / (domain.max - domain.min) * (range.max - range.min)
        }
    }
}

impl ComponentModel for Gain {
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
