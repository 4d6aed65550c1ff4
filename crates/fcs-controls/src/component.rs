//! Component base contract and kind dispatch.
//!
//! Every component shares a [`ComponentCore`]: identity, signed inputs,
//! output bindings, optional clipping and optional transport delay. The
//! algorithm itself lives in a [`ComponentKind`] variant that implements
//! [`ComponentModel`].

use fcs_core::{PropertyId, ensure_finite};
use fcs_props::{PropertyStore, component_property_name};
use tracing::{debug, warn};

use crate::actuator::Actuator;
use crate::angle::AngleDifference;
use crate::context::FrameContext;
use crate::deadband::Deadband;
use crate::error::{ControlError, ControlResult};
use crate::filter::Filter;
use crate::function::FcsFunction;
use crate::gain::Gain;
use crate::inertial::{Accelerometer, Gyro};
use crate::kinemat::Kinemat;
use crate::parameter::Parameter;
use crate::pid::Pid;
use crate::sensor::Sensor;
use crate::summer::Summer;
use crate::switch::Switch;
use crate::waypoint::Waypoint;

/// Output clamp read from parameters every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub min: Parameter,
    pub max: Parameter,
    /// Wrap modulo the range instead of saturating.
    pub cyclic: bool,
}

impl Clip {
    pub fn new(min: Parameter, max: Parameter) -> Self {
        Self {
            min,
            max,
            cyclic: false,
        }
    }

    pub fn cyclic(mut self, cyclic: bool) -> Self {
        self.cyclic = cyclic;
        self
    }

    /// Current `(min, max)`.
    pub fn bounds(&self, store: &PropertyStore) -> (f64, f64) {
        (self.min.value(store), self.max.value(store))
    }

    /// Clamp or wrap `value`. An inverted range or a non-finite bound or value
    /// is a fatal error.
    pub fn apply(&self, value: f64, store: &PropertyStore, component: &str) -> ControlResult<f64> {
        let (min, max) = self.bounds(store);
        let finite = |v, what| {
            ensure_finite(v, what).map_err(|e| ControlError::non_finite(component, e))
        };
        let min = finite(min, "clip min")?;
        let max = finite(max, "clip max")?;
        let value = finite(value, "value before clip")?;
        let range = max - min;
        if range < 0.0 {
            return Err(ControlError::InvertedClip {
                component: component.to_string(),
                min,
                max,
            });
        }
        if self.cyclic && range > 0.0 {
            let mut offset = (value - min) % range;
            if offset < 0.0 {
                offset += range;
            }
            let wrapped = min + offset;
            // offset can round up to exactly `range`
            Ok(if wrapped >= max { min } else { wrapped })
        } else {
            Ok(value.clamp(min, max))
        }
    }
}

/// Fixed-length circular buffer of prior outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportDelay {
    buffer: Vec<f64>,
    index: usize,
}

impl TransportDelay {
    /// Buffer of `frames` slots. Zero frames means no delay element.
    pub fn frames(frames: usize) -> Option<Self> {
        (frames > 0).then(|| Self {
            buffer: vec![0.0; frames],
            index: 0,
        })
    }

    /// Buffer sized from a time span at the channel step.
    pub fn from_time(seconds: f64, dt: f64) -> Option<Self> {
        if !(seconds > 0.0 && dt > 0.0) {
            return None;
        }
        Self::frames((seconds / dt).floor() as usize)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Store `value` and return the buffered value now due.
    ///
    /// In trim mode the whole buffer is seeded with `value`.
    pub fn process(&mut self, value: f64, trim: bool) -> f64 {
        if trim {
            self.buffer.fill(value);
            return value;
        }
        self.buffer[self.index] = value;
        self.index = (self.index + 1) % self.buffer.len();
        self.buffer[self.index]
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.index = 0;
    }
}

/// State and bindings common to every component.
#[derive(Debug, Clone)]
pub struct ComponentCore {
    name: String,
    property_name: String,
    own: PropertyId,
    inputs: Vec<Parameter>,
    outputs: Vec<PropertyId>,
    clip: Option<Clip>,
    delay: Option<TransportDelay>,
    output: f64,
}

impl ComponentCore {
    /// Create the core and the component's own output property.
    pub fn new(name: impl Into<String>, store: &mut PropertyStore) -> Self {
        let name = name.into();
        let property_name = component_property_name(&name);
        let own = store.create(&property_name);
        Self {
            name,
            property_name,
            own,
            inputs: Vec::new(),
            outputs: Vec::new(),
            clip: None,
            delay: None,
            output: 0.0,
        }
    }

    pub fn with_inputs(mut self, inputs: Vec<Parameter>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<PropertyId>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_clip(mut self, clip: Clip) -> Self {
        self.clip = Some(clip);
        self
    }

    pub fn with_delay(mut self, delay: Option<TransportDelay>) -> Self {
        self.delay = delay;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the property the output is published under.
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn inputs(&self) -> &[Parameter] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[PropertyId] {
        &self.outputs
    }

    pub fn clip(&self) -> Option<&Clip> {
        self.clip.as_ref()
    }

    pub fn delay(&self) -> Option<&TransportDelay> {
        self.delay.as_ref()
    }

    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn set_output(&mut self, value: f64) {
        self.output = value;
    }

    /// Value of input `i` with its sign applied. Missing inputs read as zero.
    #[inline]
    pub fn input(&self, i: usize, store: &PropertyStore) -> f64 {
        self.inputs.get(i).map_or(0.0, |p| p.value(store))
    }

    /// Current clip bounds, if clipping is configured.
    pub fn clip_bounds(&self, store: &PropertyStore) -> Option<(f64, f64)> {
        self.clip.as_ref().map(|c| c.bounds(store))
    }

    /// Pass a value through the delay buffer, if any.
    pub fn apply_delay(&mut self, value: f64, trim: bool) -> f64 {
        match self.delay.as_mut() {
            Some(delay) => delay.process(value, trim),
            None => value,
        }
    }

    /// Clamp/wrap a value, if clipping is configured.
    pub fn apply_clip(&self, value: f64, store: &PropertyStore) -> ControlResult<f64> {
        match &self.clip {
            Some(clip) => clip.apply(value, store, &self.name),
            None => Ok(value),
        }
    }

    /// Standard post-processing: delay, clip, then latch as the output.
    pub fn finish(
        &mut self,
        value: f64,
        store: &PropertyStore,
        ctx: &FrameContext<'_>,
    ) -> ControlResult<()> {
        let delayed = self.apply_delay(value, ctx.trim);
        self.output = self.apply_clip(delayed, store)?;
        Ok(())
    }

    /// Write the output to the own property and every bound output.
    pub fn publish(&self, store: &mut PropertyStore) {
        store.set(self.own, self.output);
        for id in &self.outputs {
            store.set(*id, self.output);
        }
    }

    fn require_inputs(&self, min: usize, type_tag: &str) -> ControlResult<()> {
        if self.inputs.len() < min {
            return Err(ControlError::invalid(
                &self.name,
                "input",
                format!(
                    "{type_tag} needs at least {min} input(s), {} given",
                    self.inputs.len()
                ),
            ));
        }
        Ok(())
    }

    fn reset(&mut self) {
        if let Some(delay) = self.delay.as_mut() {
            delay.reset();
        }
        self.output = 0.0;
    }
}

/// Per-kind algorithm run once per frame over the shared core.
pub trait ComponentModel {
    /// Compute this frame's output and latch it into `core`.
    fn run(
        &mut self,
        core: &mut ComponentCore,
        store: &mut PropertyStore,
        ctx: &FrameContext<'_>,
    ) -> ControlResult<()>;

    /// Clear historical state. Configuration is kept.
    fn reset(&mut self) {}
}

/// Closed set of component algorithms.
#[derive(Debug, Clone)]
pub enum ComponentKind {
    Summer(Summer),
    Gain(Gain),
    Filter(Filter),
    Deadband(Deadband),
    Switch(Switch),
    Kinemat(Kinemat),
    Pid(Pid),
    Sensor(Sensor),
    Accelerometer(Accelerometer),
    Gyro(Gyro),
    Actuator(Actuator),
    Angle(AngleDifference),
    Waypoint(Waypoint),
    Function(FcsFunction),
}

impl ComponentKind {
    /// Declared type tag.
    pub fn type_tag(&self) -> &'static str {
        match self {
            ComponentKind::Summer(_) => "summer",
            ComponentKind::Gain(g) => g.type_tag(),
            ComponentKind::Filter(f) => f.type_tag(),
            ComponentKind::Deadband(_) => "deadband",
            ComponentKind::Switch(_) => "switch",
            ComponentKind::Kinemat(_) => "kinematic",
            ComponentKind::Pid(_) => "pid",
            ComponentKind::Sensor(_) => "sensor",
            ComponentKind::Accelerometer(_) => "accelerometer",
            ComponentKind::Gyro(_) => "gyro",
            ComponentKind::Actuator(_) => "actuator",
            ComponentKind::Angle(_) => "angle",
            ComponentKind::Waypoint(w) => w.type_tag(),
            ComponentKind::Function(_) => "fcs_function",
        }
    }

    /// Number of inputs the kind reads.
    pub fn min_inputs(&self) -> usize {
        match self {
            ComponentKind::Switch(_)
            | ComponentKind::Accelerometer(_)
            | ComponentKind::Gyro(_)
            | ComponentKind::Angle(_)
            | ComponentKind::Waypoint(_)
            | ComponentKind::Function(_) => 0,
            _ => 1,
        }
    }

    fn model_mut(&mut self) -> &mut dyn ComponentModel {
        match self {
            ComponentKind::Summer(m) => m,
            ComponentKind::Gain(m) => m,
            ComponentKind::Filter(m) => m,
            ComponentKind::Deadband(m) => m,
            ComponentKind::Switch(m) => m,
            ComponentKind::Kinemat(m) => m,
            ComponentKind::Pid(m) => m,
            ComponentKind::Sensor(m) => m,
            ComponentKind::Accelerometer(m) => m,
            ComponentKind::Gyro(m) => m,
            ComponentKind::Actuator(m) => m,
            ComponentKind::Angle(m) => m,
            ComponentKind::Waypoint(m) => m,
            ComponentKind::Function(m) => m,
        }
    }
}

/// A configured component: shared core plus its algorithm.
#[derive(Debug, Clone)]
pub struct Component {
    core: ComponentCore,
    kind: ComponentKind,
}

impl Component {
    /// Pair a core with an algorithm, checking the input count.
    pub fn new(core: ComponentCore, kind: ComponentKind) -> ControlResult<Self> {
        core.require_inputs(kind.min_inputs(), kind.type_tag())?;
        if matches!(kind, ComponentKind::Actuator(_)) && core.clip.is_none() {
            warn!(
                component = %core.name,
                "actuator has no clipto; fail_hardover will leave the command unchanged"
            );
        }
        debug!(
            component = %core.name,
            kind = kind.type_tag(),
            property = %core.property_name,
            inputs = core.inputs.len(),
            "component built"
        );
        Ok(Self { core, kind })
    }

    /// Execute one frame and publish the output.
    ///
    /// A NaN or infinite output stops the frame before anything is written.
    pub fn run(&mut self, store: &mut PropertyStore, ctx: &FrameContext<'_>) -> ControlResult<bool> {
        self.kind.model_mut().run(&mut self.core, store, ctx)?;
        ensure_finite(self.core.output, "output")
            .map_err(|e| ControlError::non_finite(&self.core.name, e))?;
        self.core.publish(store);
        Ok(true)
    }

    /// Clear history (previous inputs/outputs, delay buffer, integrators).
    pub fn reset_past_states(&mut self) {
        self.core.reset();
        self.kind.model_mut().reset();
    }

    pub fn name(&self) -> &str {
        self.core.name()
    }

    pub fn type_tag(&self) -> &'static str {
        self.kind.type_tag()
    }

    pub fn output(&self) -> f64 {
        self.core.output()
    }

    pub fn core(&self) -> &ComponentCore {
        &self.core
    }

    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ComponentKind {
        &mut self.kind
    }
}
