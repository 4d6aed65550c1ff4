//! PID controller with selectable integration scheme and wind-up trigger.

use fcs_props::PropertyStore;

use crate::component::{ComponentCore, ComponentModel};
use crate::context::FrameContext;
use crate::error::ControlResult;
use crate::parameter::Parameter;

/// Trigger magnitude below which the integral keeps accumulating.
const TRIGGER_EPSILON: f64 = 1e-6;

/// Integration rule for the `I` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrationScheme {
    #[default]
    Rectangular,
    Trapezoidal,
    AdamsBashforth2,
    AdamsBashforth3,
    /// No integral action.
    None,
}

impl IntegrationScheme {
    fn delta(self, input: f64, prev: f64, prev2: f64) -> f64 {
        match self {
            IntegrationScheme::Rectangular => input,
            IntegrationScheme::Trapezoidal => 0.5 * (input + prev),
            IntegrationScheme::AdamsBashforth2 => 1.5 * input - 0.5 * prev,
            IntegrationScheme::AdamsBashforth3 => (23.0 * input - 16.0 * prev + 5.0 * prev2) / 12.0,
            IntegrationScheme::None => 0.0,
        }
    }
}

/// How the three terms combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PidForm {
    /// `Kp*e + I + Kd*de`
    #[default]
    Ideal,
    /// `Kp*(e + I + Kd*de)`
    Standard,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pid {
    pub kp: Parameter,
    pub ki: Parameter,
    pub kd: Parameter,
    /// Measured rate of the input. Without it the derivative is a backward
    /// difference.
    pub derivative: Option<Parameter>,
    /// `|trigger| >= eps` freezes the integral; `trigger < 0` zeroes it.
    pub trigger: Option<Parameter>,
    pub scheme: IntegrationScheme,
    pub form: PidForm,
    input_prev: f64,
    input_prev2: f64,
    integral: f64,
}

impl Pid {
    pub fn new(kp: Parameter, ki: Parameter, kd: Parameter) -> Self {
        Self {
            kp,
            ki,
            kd,
            derivative: None,
            trigger: None,
            scheme: IntegrationScheme::default(),
            form: PidForm::default(),
            input_prev: 0.0,
            input_prev2: 0.0,
            integral: 0.0,
        }
    }

    pub fn with_derivative(mut self, derivative: Option<Parameter>) -> Self {
        self.derivative = derivative;
        self
    }

    pub fn with_trigger(mut self, trigger: Option<Parameter>) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_scheme(mut self, scheme: IntegrationScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_form(mut self, form: PidForm) -> Self {
        self.form = form;
        self
    }

    /// Accumulated integral term.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn step(&mut self, input: f64, dt: f64, store: &PropertyStore) -> f64 {
        let kp = self.kp.value(store);
        let ki = self.ki.value(store);
        let kd = self.kd.value(store);

        let rate = match &self.derivative {
            Some(p) => p.value(store),
            None if dt > 0.0 => (input - self.input_prev) / dt,
            None => 0.0,
        };

        let trigger = self.trigger.as_ref().map_or(0.0, |t| t.value(store));
        if trigger.abs() < TRIGGER_EPSILON {
            let delta = self.scheme.delta(input, self.input_prev, self.input_prev2);
            self.integral += ki * dt * delta;
        }
        if trigger < 0.0 {
            self.integral = 0.0;
        }

        self.input_prev2 = if trigger < 0.0 { 0.0 } else { self.input_prev };
        self.input_prev = input;

        match self.form {
            PidForm::Standard => kp * (input + self.integral + kd * rate),
            PidForm::Ideal => kp * input + self.integral + kd * rate,
        }
    }
}

impl ComponentModel for Pid {
    fn run(
        &mut self,
        core: &mut ComponentCore,
        store: &mut PropertyStore,
        ctx: &FrameContext<'_>,
    ) -> ControlResult<()> {
        let value = self.step(core.input(0, store), ctx.dt, store);
        core.finish(value, store, ctx)
    }

    fn reset(&mut self) {
        self.input_prev = 0.0;
        self.input_prev2 = 0.0;
        self.integral = 0.0;
    }
}
