//! Sensor degradation pipeline.
//!
//! Stages run in a fixed order:
//!
//! 1. first-order lag
//! 2. noise (percent or absolute)
//! 3. drift
//! 4. gain, then bias
//! 5. transport delay
//! 6. hard failures (`fail_low`, `fail_high`)
//! 7. quantization
//! 8. clip
//!
//! `fail_stuck` skips the whole pipeline and holds the last output.

use fcs_core::PropertyId;
use fcs_props::PropertyStore;

use crate::component::{ComponentCore, ComponentModel};
use crate::context::FrameContext;
use crate::error::{ControlError, ControlResult};
use crate::noise::{Distribution, Noise, NoiseKind};
use crate::parameter::Parameter;

/// One-pole Tustin lag `C1 / (s + C1)` with zero initial history.
///
/// In trim mode the value passes straight through and re-seeds the history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirstOrderLag {
    pub c1: Parameter,
    input1: f64,
    output1: f64,
}

impl FirstOrderLag {
    pub fn new(c1: Parameter) -> Self {
        Self {
            c1,
            input1: 0.0,
            output1: 0.0,
        }
    }

    pub fn process(&mut self, value: f64, dt: f64, trim: bool, store: &PropertyStore) -> f64 {
        if trim {
            self.input1 = value;
            self.output1 = value;
            return value;
        }
        let c1 = self.c1.value(store);
        let denom = 2.0 + dt * c1;
        let ca = dt * c1 / denom;
        let cb = (2.0 - dt * c1) / denom;
        let out = ca * (value + self.input1) + cb * self.output1;
        self.input1 = value;
        self.output1 = out;
        out
    }

    pub fn reset(&mut self) {
        self.input1 = 0.0;
        self.output1 = 0.0;
    }
}

/// Uniform quantizer over `[min, max]` with `2^bits` levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantization {
    pub bits: u32,
    pub min: f64,
    pub max: f64,
    granularity: f64,
}

impl Quantization {
    pub fn new(bits: u32, min: f64, max: f64, component: &str) -> ControlResult<Self> {
        if bits == 0 || bits > 52 {
            return Err(ControlError::invalid(
                component,
                "quantization",
                format!("bits must be in 1..=52, got {bits}"),
            ));
        }
        if !(max > min) {
            return Err(ControlError::invalid(
                component,
                "quantization",
                format!("max {max} must exceed min {min}"),
            ));
        }
        Ok(Self {
            bits,
            min,
            max,
            granularity: (max - min) / 2f64.powi(bits as i32),
        })
    }

    /// Size of one quantization step.
    pub fn granularity(&self) -> f64 {
        self.granularity
    }

    pub fn apply(&self, value: f64) -> f64 {
        let v = value.clamp(self.min, self.max);
        ((v - self.min) / self.granularity).floor() * self.granularity + self.min
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SensorFailures {
    low: PropertyId,
    high: PropertyId,
    stuck: PropertyId,
}

/// Degradation stages shared by plain, acceleration and rate sensors.
#[derive(Debug, Clone)]
pub struct SensorModel {
    lag: Option<FirstOrderLag>,
    noise: Noise,
    drift_rate: f64,
    drift: f64,
    gain: f64,
    bias: f64,
    quantization: Option<Quantization>,
    failures: SensorFailures,
}

fn flag(store: &PropertyStore, id: PropertyId) -> bool {
    store.get(id) != 0.0
}

impl SensorModel {
    /// Create the malfunction and noise properties under `base`.
    pub fn new(base: &str, seed: u64, store: &mut PropertyStore) -> Self {
        let failures = SensorFailures {
            low: store.create(&format!("{base}/malfunction/fail_low")),
            high: store.create(&format!("{base}/malfunction/fail_high")),
            stuck: store.create(&format!("{base}/malfunction/fail_stuck")),
        };
        Self {
            lag: None,
            noise: Noise::new(base, seed, store),
            drift_rate: 0.0,
            drift: 0.0,
            gain: 1.0,
            bias: 0.0,
            quantization: None,
            failures,
        }
    }

    pub fn with_lag(mut self, c1: Option<Parameter>) -> Self {
        self.lag = c1.map(FirstOrderLag::new);
        self
    }

    pub fn with_noise(
        mut self,
        variance: f64,
        kind: NoiseKind,
        distribution: Distribution,
        store: &mut PropertyStore,
    ) -> Self {
        self.noise.configure(variance, kind, distribution, store);
        self
    }

    pub fn with_drift_rate(mut self, rate: f64) -> Self {
        self.drift_rate = rate;
        self
    }

    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_quantization(mut self, quantization: Option<Quantization>) -> Self {
        self.quantization = quantization;
        self
    }

    /// Accumulated drift.
    pub fn drift(&self) -> f64 {
        self.drift
    }

    /// Run the pipeline on an ideal measurement and latch the result.
    pub fn process(
        &mut self,
        input: f64,
        core: &mut ComponentCore,
        store: &PropertyStore,
        ctx: &FrameContext<'_>,
    ) -> ControlResult<()> {
        if flag(store, self.failures.stuck) {
            return Ok(());
        }

        let mut v = input;
        if let Some(lag) = self.lag.as_mut() {
            v = lag.process(v, ctx.dt, ctx.trim, store);
        }
        v = self.noise.apply(v, store);
        if self.drift_rate != 0.0 {
            self.drift += self.drift_rate * ctx.dt;
            v += self.drift;
        }
        v = v * self.gain + self.bias;
        v = core.apply_delay(v, ctx.trim);

        if flag(store, self.failures.low) {
            v = f64::MIN;
        }
        if flag(store, self.failures.high) {
            v = f64::MAX;
        }
        if let Some(q) = &self.quantization {
            v = q.apply(v);
        }

        let v = core.apply_clip(v, store)?;
        core.set_output(v);
        Ok(())
    }

    pub fn reset(&mut self) {
        if let Some(lag) = self.lag.as_mut() {
            lag.reset();
        }
        self.noise.reset();
        self.drift = 0.0;
    }
}

/// Sensor measuring its first input.
#[derive(Debug, Clone)]
pub struct Sensor {
    pub model: SensorModel,
}

impl Sensor {
    pub fn new(model: SensorModel) -> Self {
        Self { model }
    }
}

impl ComponentModel for Sensor {
    fn run(
        &mut self,
        core: &mut ComponentCore,
        store: &mut PropertyStore,
        ctx: &FrameContext<'_>,
    ) -> ControlResult<()> {
        let input = core.input(0, store);
        self.model.process(input, core, store, ctx)
    }

    fn reset(&mut self) {
        self.model.reset();
    }
}
