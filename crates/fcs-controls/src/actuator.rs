//! Actuator degradation pipeline.
//!
//! Models mechanical imperfection, in this order:
//!
//! 1. `fail_zero` / `fail_hardover` overrides on the command
//! 2. first-order lag
//! 3. rate limiting (separate increase and decrease limits)
//! 4. deadband
//! 5. hysteresis (backlash)
//! 6. bias
//! 7. transport delay
//!
//! `fail_stuck` replaces stages 2-7 with the previous value. The clip runs
//! last and drives the read-only `saturated` flag. A NaN or infinite command
//! is an error.

use std::cell::Cell;
use std::rc::Rc;

use fcs_core::{PropertyId, ensure_finite};
use fcs_props::PropertyStore;

use crate::component::{ComponentCore, ComponentModel};
use crate::context::FrameContext;
use crate::error::{ControlError, ControlResult};
use crate::parameter::Parameter;
use crate::sensor::FirstOrderLag;

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActuatorFailures {
    zero: PropertyId,
    hardover: PropertyId,
    stuck: PropertyId,
}

#[derive(Debug, Clone)]
pub struct Actuator {
    lag: Option<FirstOrderLag>,
    rate_limit_incr: Option<Parameter>,
    rate_limit_decr: Option<Parameter>,
    rate_prev: f64,
    deadband_width: f64,
    hysteresis_width: f64,
    hysteresis_prev: f64,
    bias: f64,
    previous: f64,
    failures: ActuatorFailures,
    saturated: Rc<Cell<bool>>,
}

impl Actuator {
    /// Create the malfunction properties and the read-only
    /// `<base>/saturated` flag.
    pub fn new(base: &str, store: &mut PropertyStore) -> ControlResult<Self> {
        let failures = ActuatorFailures {
            zero: store.create(&format!("{base}/malfunction/fail_zero")),
            hardover: store.create(&format!("{base}/malfunction/fail_hardover")),
            stuck: store.create(&format!("{base}/malfunction/fail_stuck")),
        };
        let saturated = Rc::new(Cell::new(false));
        let flag = Rc::clone(&saturated);
        store.tie(
            &format!("{base}/saturated"),
            Box::new(move || if flag.get() { 1.0 } else { 0.0 }),
            None,
        )?;
        Ok(Self {
            lag: None,
            rate_limit_incr: None,
            rate_limit_decr: None,
            rate_prev: 0.0,
            deadband_width: 0.0,
            hysteresis_width: 0.0,
            hysteresis_prev: 0.0,
            bias: 0.0,
            previous: 0.0,
            failures,
            saturated,
        })
    }

    pub fn with_lag(mut self, c1: Option<Parameter>) -> Self {
        self.lag = c1.map(FirstOrderLag::new);
        self
    }

    /// Rate limits as positive magnitudes (units/s).
    pub fn with_rate_limits(mut self, incr: Option<Parameter>, decr: Option<Parameter>) -> Self {
        self.rate_limit_incr = incr;
        self.rate_limit_decr = decr;
        self
    }

    pub fn with_deadband(mut self, width: f64) -> Self {
        self.deadband_width = width;
        self
    }

    pub fn with_hysteresis(mut self, width: f64) -> Self {
        self.hysteresis_width = width;
        self
    }

    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    /// True when the last output sat on a nonzero clip bound.
    pub fn is_saturated(&self) -> bool {
        self.saturated.get()
    }

    fn rate_limit(&mut self, value: f64, dt: f64, trim: bool, store: &PropertyStore) -> f64 {
        if self.rate_limit_incr.is_none() && self.rate_limit_decr.is_none() {
            return value;
        }
        let mut out = value;
        if !trim {
            let delta = value - self.rate_prev;
            if let Some(incr) = &self.rate_limit_incr {
                let step = incr.value(store) * dt;
                if delta > step {
                    out = self.rate_prev + step;
                }
            }
            if let Some(decr) = &self.rate_limit_decr {
                let step = -decr.value(store) * dt;
                if delta < step {
                    out = self.rate_prev + step;
                }
            }
        }
        self.rate_prev = out;
        out
    }

    fn deadband(&self, value: f64) -> f64 {
        if self.deadband_width == 0.0 {
            return value;
        }
        let half = 0.5 * self.deadband_width;
        if value < -half {
            value + half
        } else if value > half {
            value - half
        } else {
            0.0
        }
    }

    fn hysteresis(&mut self, value: f64, trim: bool) -> f64 {
        if self.hysteresis_width == 0.0 {
            return value;
        }
        let half = 0.5 * self.hysteresis_width;
        let prev = self.hysteresis_prev;
        let out = if trim {
            value
        } else if value > prev {
            prev.max(value - half)
        } else if value < prev {
            prev.min(value + half)
        } else {
            prev
        };
        self.hysteresis_prev = out;
        out
    }
}

impl ComponentModel for Actuator {
    fn run(
        &mut self,
        core: &mut ComponentCore,
        store: &mut PropertyStore,
        ctx: &FrameContext<'_>,
    ) -> ControlResult<()> {
        let mut v = ensure_finite(core.input(0, store), "actuator command")
            .map_err(|e| ControlError::non_finite(core.name(), e))?;
        if store.get(self.failures.zero) != 0.0 {
            v = 0.0;
        }
        if store.get(self.failures.hardover) != 0.0 {
            if let Some((min, max)) = core.clip_bounds(store) {
                v = if v < 0.0 { min } else { max };
            }
        }

        if store.get(self.failures.stuck) != 0.0 {
            v = self.previous;
        } else {
            if let Some(lag) = self.lag.as_mut() {
                v = lag.process(v, ctx.dt, ctx.trim, store);
            }
            v = self.rate_limit(v, ctx.dt, ctx.trim, store);
            v = self.deadband(v);
            v = self.hysteresis(v, ctx.trim);
            v += self.bias;
            v = core.apply_delay(v, ctx.trim);
        }
        self.previous = v;

        let clipped = core.apply_clip(v, store)?;
        let saturated = core.clip_bounds(store).is_some_and(|(min, max)| {
            (max != 0.0 && clipped >= max) || (min != 0.0 && clipped <= min)
        });
        self.saturated.set(saturated);
        core.set_output(clipped);
        Ok(())
    }

    fn reset(&mut self) {
        if let Some(lag) = self.lag.as_mut() {
            lag.reset();
        }
        self.rate_prev = 0.0;
        self.hysteresis_prev = 0.0;
        self.previous = 0.0;
        self.saturated.set(false);
    }
}
