//! Discrete filters built with the bilinear (Tustin) transform.
//!
//! | Kind | Continuous form |
//! |------|-----------------|
//! | lag | `C1 / (s + C1)` |
//! | lead-lag | `(C1 s + C2) / (C3 s + C4)` |
//! | washout | `s / (s + C1)` |
//! | second order | `(C1 s² + C2 s + C3) / (C4 s² + C5 s + C6)` |
//! | integrator | `C1 / s` |
//!
//! Coefficients are parameters, so the difference equation is rebuilt every
//! frame from the channel step. The first frame after construction or reset
//! seeds all history with the input and passes it through.

use fcs_props::PropertyStore;

use crate::component::{ComponentCore, ComponentModel};
use crate::context::FrameContext;
use crate::error::{ControlError, ControlResult};
use crate::parameter::Parameter;

/// Trigger magnitude above which the integrator is frozen.
const TRIGGER_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    Lag {
        c1: Parameter,
    },
    LeadLag {
        c1: Parameter,
        c2: Parameter,
        c3: Parameter,
        c4: Parameter,
    },
    Washout {
        c1: Parameter,
    },
    SecondOrder {
        c: [Parameter; 6],
    },
    Integrator {
        c1: Parameter,
        trigger: Option<Parameter>,
    },
}

/// Two samples of input and output history.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterState {
    pub input1: f64,
    pub input2: f64,
    pub output1: f64,
    pub output2: f64,
    pub initialized: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    kind: FilterKind,
    state: FilterState,
}

fn required(c: Option<Parameter>, component: &str, element: &'static str) -> ControlResult<Parameter> {
    c.ok_or_else(|| ControlError::missing(component, element))
}

fn all_zero(params: &[Parameter]) -> bool {
    params
        .iter()
        .all(|p| matches!(p, Parameter::Constant(v) if *v == 0.0))
}

impl Filter {
    fn with_kind(kind: FilterKind) -> Self {
        Self {
            kind,
            state: FilterState::default(),
        }
    }

    pub fn lag(c1: Option<Parameter>, component: &str) -> ControlResult<Self> {
        let c1 = required(c1, component, "c1")?;
        Ok(Self::with_kind(FilterKind::Lag { c1 }))
    }

    pub fn washout(c1: Option<Parameter>, component: &str) -> ControlResult<Self> {
        let c1 = required(c1, component, "c1")?;
        Ok(Self::with_kind(FilterKind::Washout { c1 }))
    }

    /// Lead-lag filter. Absent coefficients are zero, but the denominator
    /// may not be identically zero.
    pub fn lead_lag(c: [Option<Parameter>; 4], component: &str) -> ControlResult<Self> {
        let [c1, c2, c3, c4] = c.map(|p| p.unwrap_or(Parameter::Constant(0.0)));
        if all_zero(&[c3, c4]) {
            return Err(ControlError::invalid(
                component,
                "c3",
                "lead-lag denominator is zero",
            ));
        }
        Ok(Self::with_kind(FilterKind::LeadLag { c1, c2, c3, c4 }))
    }

    /// Second-order filter. Absent coefficients are zero, but the
    /// denominator may not be identically zero.
    pub fn second_order(c: [Option<Parameter>; 6], component: &str) -> ControlResult<Self> {
        let c = c.map(|p| p.unwrap_or(Parameter::Constant(0.0)));
        if all_zero(&c[3..]) {
            return Err(ControlError::invalid(
                component,
                "c4",
                "second-order denominator is zero",
            ));
        }
        Ok(Self::with_kind(FilterKind::SecondOrder { c }))
    }

    pub fn integrator(
        c1: Option<Parameter>,
        trigger: Option<Parameter>,
        component: &str,
    ) -> ControlResult<Self> {
        let c1 = required(c1, component, "c1")?;
        Ok(Self::with_kind(FilterKind::Integrator { c1, trigger }))
    }

    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn type_tag(&self) -> &'static str {
        match self.kind {
            FilterKind::Lag { .. } => "lag_filter",
            FilterKind::LeadLag { .. } => "lead_lag_filter",
            FilterKind::Washout { .. } => "washout_filter",
            FilterKind::SecondOrder { .. } => "second_order_filter",
            FilterKind::Integrator { .. } => "integrator",
        }
    }

    /// Advance one step. Returns the pre-delay, pre-clip output.
    pub fn step(&mut self, input: f64, dt: f64, store: &PropertyStore) -> f64 {
        let s = &mut self.state;
        if !s.initialized {
            *s = FilterState {
                input1: input,
                input2: input,
                output1: input,
                output2: input,
                initialized: true,
            };
            return input;
        }

        let mut input = input;
        let output = match &self.kind {
            FilterKind::Lag { c1 } => {
                let c1 = c1.value(store);
                let denom = 2.0 + dt * c1;
                let ca = dt * c1 / denom;
                let cb = (2.0 - dt * c1) / denom;
                ca * (input + s.input1) + cb * s.output1
            }
            FilterKind::LeadLag { c1, c2, c3, c4 } => {
                let (c1, c2, c3, c4) = (
                    c1.value(store),
                    c2.value(store),
                    c3.value(store),
                    c4.value(store),
                );
                let denom = 2.0 * c3 + dt * c4;
                let ca = (2.0 * c1 + dt * c2) / denom;
                let cb = (dt * c2 - 2.0 * c1) / denom;
                let cc = (2.0 * c3 - dt * c4) / denom;
                ca * input + cb * s.input1 + cc * s.output1
            }
            FilterKind::Washout { c1 } => {
                let c1 = c1.value(store);
                let denom = 2.0 + dt * c1;
                let ca = 2.0 / denom;
                let cb = (2.0 - dt * c1) / denom;
                ca * (input - s.input1) + cb * s.output1
            }
            FilterKind::SecondOrder { c } => {
                let [c1, c2, c3, c4, c5, c6] = c.map(|p| p.value(store));
                let dt2 = dt * dt;
                let denom = 4.0 * c4 + 2.0 * c5 * dt + c6 * dt2;
                let ca = (4.0 * c1 + 2.0 * c2 * dt + c3 * dt2) / denom;
                let cb = (2.0 * c3 * dt2 - 8.0 * c1) / denom;
                let cc = (4.0 * c1 - 2.0 * c2 * dt + c3 * dt2) / denom;
                let cd = (2.0 * c6 * dt2 - 8.0 * c4) / denom;
                let ce = (4.0 * c4 - 2.0 * c5 * dt + c6 * dt2) / denom;
                ca * input + cb * s.input1 + cc * s.input2 - cd * s.output1 - ce * s.output2
            }
            FilterKind::Integrator { c1, trigger } => {
                if trigger.as_ref().is_some_and(|t| t.value(store).abs() > TRIGGER_EPSILON) {
                    input = 0.0;
                    s.input1 = 0.0;
                }
                let ca = dt * c1.value(store) / 2.0;
                ca * (input + s.input1) + s.output1
            }
        };

        s.input2 = s.input1;
        s.input1 = input;
        s.output2 = s.output1;
        s.output1 = output;
        output
    }
}

impl ComponentModel for Filter {
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
        self.state = FilterState::default();
    }
}
