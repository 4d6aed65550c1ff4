//! Kinematic servo: travels between detents at per-segment rates.
//!
//! Each segment `[detent[i-1], detent[i]]` is crossed in `transition_time[i]`
//! seconds. A transition time of zero crosses the segment instantly. The
//! frame budget is spent across as many segments as it covers.

use fcs_core::{ensure_finite, equal_to_roundoff};
use fcs_props::PropertyStore;

use crate::component::{ComponentCore, ComponentModel};
use crate::context::FrameContext;
use crate::error::{ControlError, ControlResult};

/// Position and the time taken to reach it from the previous detent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detent {
    pub position: f64,
    pub transition_time: f64,
}

impl Detent {
    pub fn new(position: f64, transition_time: f64) -> Self {
        Self {
            position,
            transition_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Kinemat {
    detents: Vec<Detent>,
    scale: bool,
    position: f64,
}

impl Kinemat {
    /// Build from at least two detents in strictly ascending order.
    ///
    /// With `scale` set the input is treated as a fraction of the last detent.
    pub fn new(detents: Vec<Detent>, scale: bool, component: &str) -> ControlResult<Self> {
        if detents.len() < 2 {
            return Err(ControlError::invalid(
                component,
                "traverse",
                format!("at least 2 detents required, {} given", detents.len()),
            ));
        }
        if detents
            .windows(2)
            .any(|w| !(w[1].position > w[0].position))
        {
            return Err(ControlError::invalid(
                component,
                "traverse",
                "detent positions must be strictly ascending",
            ));
        }
        if detents
            .iter()
            .any(|d| !(d.transition_time >= 0.0) || !d.transition_time.is_finite())
        {
            return Err(ControlError::invalid(
                component,
                "traverse",
                "transition times must be finite and non-negative",
            ));
        }
        let mut k = Self {
            detents,
            scale,
            position: 0.0,
        };
        k.position = k.rest_position();
        Ok(k)
    }

    fn first(&self) -> f64 {
        self.detents[0].position
    }

    fn last(&self) -> f64 {
        self.detents[self.detents.len() - 1].position
    }

    fn rest_position(&self) -> f64 {
        0.0_f64.clamp(self.first(), self.last())
    }

    pub fn detents(&self) -> &[Detent] {
        &self.detents
    }

    /// Current mechanism position.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Position as a fraction of full travel.
    pub fn output_pct(&self) -> f64 {
        (self.position - self.first()) / (self.last() - self.first())
    }

    /// Segment index `i` (`1..len`) whose interval the position is leaving.
    fn segment(&self, moving_down: bool) -> usize {
        let n = self.detents.len();
        let pos = self.position;
        let found = if moving_down {
            self.detents[1..].iter().position(|d| d.position >= pos)
        } else {
            self.detents[1..].iter().position(|d| d.position > pos)
        };
        found.map_or(n - 1, |i| i + 1)
    }

    /// Advance toward `command` for `dt` seconds.
    ///
    /// A NaN command leaves the position where it is.
    pub fn step(&mut self, command: f64, dt: f64, trim: bool) -> f64 {
        let mut input = command;
        if self.scale {
            input *= self.last();
        }
        if input.is_nan() {
            return self.position;
        }
        let input = input.clamp(self.first(), self.last());

        if trim {
            self.position = input;
            return input;
        }

        let mut budget = dt;
        while budget > 0.0 && !equal_to_roundoff(input, self.position) {
            let start = self.position;
            let moving_down = input < self.position;
            let i = self.segment(moving_down);
            let lo = self.detents[i - 1].position;
            let hi = self.detents[i].position;
            let target = if moving_down {
                input.max(lo)
            } else {
                input.min(hi)
            };
            let time = self.detents[i].transition_time;
            if time == 0.0 {
                self.position = target;
                if self.position == start {
                    break;
                }
                continue;
            }
            let rate = (hi - lo) / time;
            let needed = (target - self.position).abs() / rate;
            if needed <= budget {
                self.position = target;
                budget -= needed;
                if self.position == start {
                    break;
                }
            } else {
                let step = rate * budget;
                self.position += if moving_down { -step } else { step };
                budget = 0.0;
            }
        }
        self.position
    }
}

impl ComponentModel for Kinemat {
    fn run(
        &mut self,
        core: &mut ComponentCore,
        store: &mut PropertyStore,
        ctx: &FrameContext<'_>,
    ) -> ControlResult<()> {
        let command = ensure_finite(core.input(0, store), "kinemat command")
            .map_err(|e| ControlError::non_finite(core.name(), e))?;
        let value = self.step(command, ctx.dt, ctx.trim);
        core.finish(value, store, ctx)
    }

    fn reset(&mut self) {
        self.position = self.rest_position();
    }
}
