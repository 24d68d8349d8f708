//! Clock generator step library.
//!
//! Powering a generator up or down is split into sub-steps ([`StepSet`]).
//! A [`StepTable`] groups the sub-steps of every generator kind into levels,
//! and [`run_levels`] executes level `n` of every generator before level
//! `n + 1` of any, so slow settle waits of one generator overlap with the
//! fast register pokes of the others.

mod runner;
mod step;
mod table;

pub use runner::{max_level, run_level, run_levels, StepFault};
pub use step::StepSet;
pub use table::{StepTable, TableError, MAX_LEVELS};

use crate::map;
use bitfield::bitfield;
use core::fmt;
use types::{Block, GeneratorId};

bitfield! {
    /// Generator control register
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct GenCon(u32);
    impl Debug;
    pub power_en, set_power_en: 0;
    pub lock_det_en, set_lock_det_en: 1;
    pub out_en, set_out_en: 2;
    pub clamp, set_clamp: 3;
    pub u8, post_div, set_post_div: 15, 8;
    pub u16, fb_div, set_fb_div: 27, 16;
}

impl GenCon {
    /// Divider fields, restored together with power
    pub const CONFIG: u32 = 0x0fff_ff00;

    pub fn bits(&self) -> u32 {
        self.0
    }
}

/// Selects which step procedure applies to a generator.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum GeneratorKind {
    /// Integer-N PLL with lock detector
    Pll,
    /// Fractional-N PLL; analog outputs are clamped while off
    FracPll,
    /// Crystal or RC oscillator, stable indication but no lock detector
    Oscillator,
}

impl GeneratorKind {
    pub const COUNT: usize = 3;

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Documented worst-case time for the ready indication to follow a
    /// power change.
    pub const fn settle_timeout_us(self) -> u32 {
        match self {
            Self::Pll => 150,
            Self::FracPll => 300,
            Self::Oscillator => 2000,
        }
    }
}

/// One power-controllable clock generator and its last known configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClockGenerator {
    id: GeneratorId,
    kind: GeneratorKind,
    block: Block,
    con: u32,
    stat: u32,
    rate_hz: u32,
    cached: GenCon,
    already_off: bool,
}

impl ClockGenerator {
    /// Generator `id` at its slot in the clock block.
    pub const fn new(id: u8, kind: GeneratorKind, rate_hz: u32) -> Self {
        Self::at(GeneratorId(id), kind, Block::Clock, map::gen_con(id), map::gen_stat(id), rate_hz)
    }

    pub const fn at(id: GeneratorId, kind: GeneratorKind, block: Block, con: u32, stat: u32, rate_hz: u32) -> Self {
        Self {
            id,
            kind,
            block,
            con,
            stat,
            rate_hz,
            cached: GenCon(0),
            already_off: false,
        }
    }

    pub fn id(&self) -> GeneratorId {
        self.id
    }

    pub fn kind(&self) -> GeneratorKind {
        self.kind
    }

    pub fn block(&self) -> Block {
        self.block
    }

    pub fn con(&self) -> u32 {
        self.con
    }

    pub fn stat(&self) -> u32 {
        self.stat
    }

    pub fn rate_hz(&self) -> u32 {
        self.rate_hz
    }

    /// Control register value cached by the last power-down.
    pub fn cached(&self) -> u32 {
        self.cached.bits()
    }

    /// The generator was already powered off when its configuration was
    /// cached; neither direction touches it.
    pub fn already_off(&self) -> bool {
        self.already_off
    }

    fn cache(&mut self, value: u32) {
        self.cached = GenCon(value);
        self.already_off = !self.cached.power_en();
    }
}

impl fmt::Display for ClockGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?}, {}kHz)", self.id, self.kind, self.rate_hz / 1000)
    }
}
