//! Container-owned command state: pilot inputs and engine commands.
//!
//! Values live in shared cells tied into the property store, so components
//! and external collaborators read and write them through ordinary
//! property handles.

use std::cell::Cell;
use std::rc::Rc;

use fcs_props::{PropertyResult, PropertyStore};

/// Tie `name` read/write to a fresh cell.
pub(crate) fn tie_cell(store: &mut PropertyStore, name: &str) -> PropertyResult<Rc<Cell<f64>>> {
    let cell = Rc::new(Cell::new(0.0));
    let read = Rc::clone(&cell);
    let write = Rc::clone(&cell);
    store.tie(
        name,
        Box::new(move || read.get()),
        Some(Box::new(move |v| write.set(v))),
    )?;
    Ok(cell)
}

/// Normalized pilot command inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PilotCommand {
    Aileron,
    Elevator,
    Rudder,
    Flap,
    Speedbrake,
    Spoiler,
    PitchTrim,
    RollTrim,
    YawTrim,
}

impl PilotCommand {
    pub const ALL: [PilotCommand; 9] = [
        PilotCommand::Aileron,
        PilotCommand::Elevator,
        PilotCommand::Rudder,
        PilotCommand::Flap,
        PilotCommand::Speedbrake,
        PilotCommand::Spoiler,
        PilotCommand::PitchTrim,
        PilotCommand::RollTrim,
        PilotCommand::YawTrim,
    ];

    pub fn property_name(self) -> &'static str {
        match self {
            PilotCommand::Aileron => "fcs/aileron-cmd-norm",
            PilotCommand::Elevator => "fcs/elevator-cmd-norm",
            PilotCommand::Rudder => "fcs/rudder-cmd-norm",
            PilotCommand::Flap => "fcs/flap-cmd-norm",
            PilotCommand::Speedbrake => "fcs/speedbrake-cmd-norm",
            PilotCommand::Spoiler => "fcs/spoiler-cmd-norm",
            PilotCommand::PitchTrim => "fcs/pitch-trim-cmd-norm",
            PilotCommand::RollTrim => "fcs/roll-trim-cmd-norm",
            PilotCommand::YawTrim => "fcs/yaw-trim-cmd-norm",
        }
    }
}

#[derive(Debug)]
pub struct PilotControls {
    cells: Vec<Rc<Cell<f64>>>,
}

impl PilotControls {
    pub fn bind(store: &mut PropertyStore) -> PropertyResult<Self> {
        let cells = PilotCommand::ALL
            .iter()
            .map(|c| tie_cell(store, c.property_name()))
            .collect::<PropertyResult<Vec<_>>>()?;
        Ok(Self { cells })
    }

    fn cell(&self, command: PilotCommand) -> &Cell<f64> {
        &self.cells[command as usize]
    }

    pub fn get(&self, command: PilotCommand) -> f64 {
        self.cell(command).get()
    }

    pub fn set(&self, command: PilotCommand, value: f64) {
        self.cell(command).set(value);
    }
}

#[derive(Debug)]
struct CommandPair {
    cmd: Rc<Cell<f64>>,
    pos: Rc<Cell<f64>>,
}

impl CommandPair {
    fn bind(store: &mut PropertyStore, what: &str, engine: usize) -> PropertyResult<Self> {
        Ok(Self {
            cmd: tie_cell(store, &format!("fcs/{what}-cmd-norm[{engine}]"))?,
            pos: tie_cell(store, &format!("fcs/{what}-pos-norm[{engine}]"))?,
        })
    }

    fn follow(&self) {
        self.pos.set(self.cmd.get());
    }
}

/// Throttle, mixture and propeller advance of one engine.
#[derive(Debug)]
struct EngineCommand {
    throttle: CommandPair,
    mixture: CommandPair,
    advance: CommandPair,
}

/// Commanded and effective engine settings.
///
/// Each frame starts with every position equal to its command. Components
/// running later in the frame may overwrite a position.
#[derive(Debug)]
pub struct EngineControls {
    engines: Vec<EngineCommand>,
}

impl EngineControls {
    pub fn bind(store: &mut PropertyStore, count: usize) -> PropertyResult<Self> {
        let mut engines = Vec::with_capacity(count);
        for i in 0..count {
            engines.push(EngineCommand {
                throttle: CommandPair::bind(store, "throttle", i)?,
                mixture: CommandPair::bind(store, "mixture", i)?,
                advance: CommandPair::bind(store, "advance", i)?,
            });
        }
        Ok(Self { engines })
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Copy every command into its position.
    pub fn apply_defaults(&self) {
        for engine in &self.engines {
            engine.throttle.follow();
            engine.mixture.follow();
            engine.advance.follow();
        }
    }

    pub fn throttle_pos(&self, engine: usize) -> Option<f64> {
        self.engines.get(engine).map(|e| e.throttle.pos.get())
    }

    pub fn mixture_pos(&self, engine: usize) -> Option<f64> {
        self.engines.get(engine).map(|e| e.mixture.pos.get())
    }

    pub fn advance_pos(&self, engine: usize) -> Option<f64> {
        self.engines.get(engine).map(|e| e.advance.pos.get())
    }
}
