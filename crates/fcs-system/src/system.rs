//! The flight control system container.

use std::path::Path;

use fcs_config::{FcsConfig, SystemDef, validate_config};
use fcs_controls::{AircraftState, Component, FrameContext};
use fcs_props::{PropertyStore, normalize};
use tracing::debug;

use crate::build::{BuildContext, build_component};
use crate::channel::Channel;
use crate::commands::{EngineControls, PilotCommand, PilotControls};
use crate::error::{SystemError, SystemResult};
use crate::surfaces::{Aerosurfaces, Surface, SurfacePosition};

/// Autopilot and flight-control channels over a shared property store.
///
/// Each frame runs engine command defaults, then the autopilot channels,
/// then the flight-control channels, each in declaration order.
#[derive(Debug)]
pub struct FlightControlSystem {
    name: String,
    dt: f64,
    store: PropertyStore,
    autopilot: Vec<Channel>,
    flight_control: Vec<Channel>,
    pilot: PilotControls,
    surfaces: Aerosurfaces,
    engines: EngineControls,
    trim: bool,
    frame: u64,
}

impl FlightControlSystem {
    /// Validate `config` and build every channel.
    pub fn from_config(config: &FcsConfig) -> SystemResult<Self> {
        validate_config(config)?;

        let mut store = PropertyStore::new();
        let pilot = PilotControls::bind(&mut store)?;
        let surfaces = Aerosurfaces::bind(&mut store)?;
        let engines = EngineControls::bind(&mut store, config.engines)?;

        let autopilot = match &config.autopilot {
            Some(system) => build_channels(system, config, &mut store)?,
            None => Vec::new(),
        };
        let flight_control = match &config.flight_control {
            Some(system) => build_channels(system, config, &mut store)?,
            None => Vec::new(),
        };

        debug!(
            system = %config.name,
            autopilot_channels = autopilot.len(),
            fcs_channels = flight_control.len(),
            properties = store.len(),
            "flight control system built"
        );

        Ok(Self {
            name: config.name.clone(),
            dt: config.dt,
            store,
            autopilot,
            flight_control,
            pilot,
            surfaces,
            engines,
            trim: false,
            frame: 0,
        })
    }

    /// Load, validate and build from a YAML or JSON file.
    pub fn load(path: &Path) -> SystemResult<Self> {
        let config = fcs_config::load(path)?;
        Self::from_config(&config)
    }

    /// Execute one frame.
    pub fn run(&mut self, aircraft: &dyn AircraftState) -> SystemResult<()> {
        self.engines.apply_defaults();

        let frame = self.frame;
        for channel in self.autopilot.iter_mut().chain(self.flight_control.iter_mut()) {
            if !channel.is_due(frame, &self.store) {
                continue;
            }
            let ctx = FrameContext::new(self.dt * f64::from(channel.rate()), aircraft)
                .with_trim(self.trim);
            channel
                .run(&mut self.store, &ctx)
                .map_err(|source| SystemError::Frame {
                    channel: channel.name().to_string(),
                    frame,
                    source,
                })?;
        }

        self.frame += 1;
        Ok(())
    }

    /// Enter or leave trim mode.
    pub fn set_trim(&mut self, trim: bool) {
        self.trim = trim;
    }

    pub fn trim(&self) -> bool {
        self.trim
    }

    /// Clear the history of every component.
    pub fn reset_past_states(&mut self) {
        for channel in self.channels_mut() {
            channel.reset_past_states();
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Frame step (s).
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of frames run so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn autopilot(&self) -> &[Channel] {
        &self.autopilot
    }

    pub fn flight_control(&self) -> &[Channel] {
        &self.flight_control
    }

    /// Every channel in run order.
    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.autopilot.iter().chain(self.flight_control.iter())
    }

    fn channels_mut(&mut self) -> impl Iterator<Item = &mut Channel> {
        self.autopilot.iter_mut().chain(self.flight_control.iter_mut())
    }

    /// Look up a component by name, in either system.
    pub fn component(&self, name: &str) -> Option<&Component> {
        let key = normalize(name);
        self.channels()
            .flat_map(|c| c.components())
            .find(|c| normalize(c.name()) == key)
    }

    /// Current output of a component.
    pub fn output_of(&self, name: &str) -> Option<f64> {
        self.component(name).map(Component::output)
    }

    pub fn properties(&self) -> &PropertyStore {
        &self.store
    }

    pub fn properties_mut(&mut self) -> &mut PropertyStore {
        &mut self.store
    }

    pub fn pilot_command(&self, command: PilotCommand) -> f64 {
        self.pilot.get(command)
    }

    pub fn set_pilot_command(&mut self, command: PilotCommand, value: f64) {
        self.pilot.set(command, value);
    }

    pub fn surface(&self, surface: Surface) -> SurfacePosition {
        self.surfaces.position(surface)
    }

    pub fn engines(&self) -> &EngineControls {
        &self.engines
    }
}

fn build_channels(
    system: &SystemDef,
    config: &FcsConfig,
    store: &mut PropertyStore,
) -> SystemResult<Vec<Channel>> {
    let mut channels = Vec::with_capacity(system.channels.len());
    for def in &system.channels {
        let mut ctx = BuildContext {
            store: &mut *store,
            dt: config.dt * f64::from(def.rate.max(1)),
            seed: config.seed,
        };
        let components = def
            .components
            .iter()
            .map(|c| build_component(c, &mut ctx))
            .collect::<Result<Vec<_>, _>>()?;
        let execute = def.execute.as_deref().map(|p| store.create(p));
        debug!(
            system = %system.name,
            channel = %def.name,
            components = components.len(),
            rate = def.rate,
            "channel built"
        );
        channels.push(
            Channel::new(def.name.clone(), components)
                .with_execute(execute)
                .with_rate(def.rate),
        );
    }
    Ok(channels)
}
