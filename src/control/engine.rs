//! Per-output control evaluation.
//!
//! Each tick the engine pulls the live parameters for every output out of
//! the [`ConfigStore`], then arbitrates mode, hysteresis and schedule:
//!
//! | mode   | result                                              |
//! |--------|-----------------------------------------------------|
//! | OFF    | off                                                 |
//! | MANUAL | on                                                  |
//! | AUTO   | hysteresis AND schedule, over the enabled sub-blocks |
//!
//! An AUTO output with neither sub-block enabled keeps its previous state.
//! Sub-blocks are only stepped in AUTO, so their latches are frozen while
//! an output is forced OFF or MANUAL.

use log::info;

use super::fixed::Fixed10;
use super::hysteresis::HysteresisBlock;
use super::outputs::{NUM_OUTPUTS, OUTPUT_DEFS, OutputDef};
use super::schedule::ScheduleBlock;
use crate::app::context::RoomContext;
use crate::app::ports::StoragePort;
use crate::registry::{ConfigStore, OutputParams, ParamId};
use crate::sensors::SensorValues;

/// Operating mode of an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Off,
    Manual,
    Auto,
}

impl Mode {
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Off),
            1 => Some(Self::Manual),
            2 => Some(Self::Auto),
            _ => None,
        }
    }

    pub const fn raw(self) -> i32 {
        match self {
            Self::Off => 0,
            Self::Manual => 1,
            Self::Auto => 2,
        }
    }
}

/// One controllable output and its sub-blocks.
#[derive(Debug, Clone)]
pub struct Output {
    pub key: &'static str,
    pub mode: Mode,
    pub state: bool,
    pub hysteresis: HysteresisBlock,
    pub schedule: ScheduleBlock,
    params: OutputParams,
}

impl Output {
    pub fn from_def(index: usize, def: &OutputDef) -> Self {
        let hysteresis = match def.hysteresis {
            Some(h) => HysteresisBlock::new(h.sensor, Some(h.direction)),
            None => HysteresisBlock::disabled(),
        };
        Self {
            key: def.key,
            mode: Mode::Off,
            state: false,
            hysteresis,
            schedule: ScheduleBlock::new(def.schedule),
            params: OutputParams::resolve(index),
        }
    }

    /// Copy the live parameter values into this output. Unknown mode values
    /// fall back to OFF.
    pub fn refresh<S: StoragePort>(&mut self, store: &ConfigStore<S>) {
        let read = |id: Option<ParamId>| id.map(|id| store.value(id));

        self.mode = read(self.params.mode)
            .and_then(Mode::from_raw)
            .unwrap_or(Mode::Off);

        let h = &mut self.hysteresis;
        if let Some(v) = read(self.params.setpoint) {
            h.setpoint = Fixed10::from_raw(v);
        }
        if let Some(v) = read(self.params.deadband) {
            h.deadband = Fixed10::from_raw(v);
        }
        if let Some(v) = read(self.params.offset) {
            h.offset = Fixed10::from_raw(v);
        }

        let s = &mut self.schedule;
        if let Some(v) = read(self.params.on_time) {
            s.on_time = v;
        }
        if let Some(v) = read(self.params.off_time) {
            s.off_time = v;
        }
    }

    /// Evaluate one tick. `reading` is the current value of the hysteresis
    /// block's sensor; `ctod` the seconds-of-day, if known.
    pub fn evaluate(&mut self, reading: i32, ctod: Option<u32>) -> bool {
        self.state = match self.mode {
            Mode::Off => false,
            Mode::Manual => true,
            Mode::Auto => {
                let hyst = self
                    .hysteresis
                    .enabled
                    .then(|| self.hysteresis.update(Fixed10::from_raw(reading)));
                let sched = self
                    .schedule
                    .enabled
                    .then(|| self.schedule.update(ctod));
                match (hyst, sched) {
                    (Some(h), Some(s)) => h && s,
                    (Some(h), None) => h,
                    (None, Some(s)) => s,
                    (None, None) => self.state,
                }
            }
        };
        self.state
    }
}

/// Result of one evaluation pass, indexed like the output set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputStates([bool; NUM_OUTPUTS]);

impl OutputStates {
    pub const fn new(states: [bool; NUM_OUTPUTS]) -> Self {
        Self(states)
    }

    pub fn get(&self, index: usize) -> bool {
        self.0[index]
    }

    /// Bit `i` set when output `i` is on.
    pub fn bitmap(&self) -> u8 {
        self.0
            .iter()
            .enumerate()
            .fold(0u8, |bits, (i, &on)| bits | (u8::from(on) << i))
    }
}

/// Owns the output set and every latch in it.
pub struct ControlEngine {
    outputs: [Output; NUM_OUTPUTS],
}

impl Default for ControlEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlEngine {
    pub fn new() -> Self {
        Self {
            outputs: core::array::from_fn(|i| Output::from_def(i, &OUTPUT_DEFS[i])),
        }
    }

    pub fn outputs(&self) -> &[Output; NUM_OUTPUTS] {
        &self.outputs
    }

    pub fn states(&self) -> OutputStates {
        OutputStates(core::array::from_fn(|i| self.outputs[i].state))
    }

    /// Run one complete pass over the output set.
    pub fn evaluate<S: StoragePort>(
        &mut self,
        ctx: &RoomContext<S>,
        ctod: Option<u32>,
    ) -> OutputStates {
        for output in &mut self.outputs {
            output.refresh(&ctx.config);
            step(output, &ctx.sensors, ctod);
        }
        self.states()
    }
}

fn step(output: &mut Output, sensors: &SensorValues, ctod: Option<u32>) {
    let before = output.state;
    let reading = sensors.get(output.hysteresis.sensor);
    let after = output.evaluate(reading, ctod);
    if before != after {
        info!(
            "OUT | {} {} -> {} ({:?})",
            output.key,
            on_off(before),
            on_off(after),
            output.mode
        );
    }
}

fn on_off(state: bool) -> &'static str {
    if state { "on" } else { "off" }
}
