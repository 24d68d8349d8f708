#![no_std]
#![allow(non_upper_case_globals)]

mod abort;

pub use abort::AbortReason;

pub const KHz: u32 = 1000;
pub const MHz: u32 = 1_000_000;

/// Register blocks the sequencer programs. Each block is addressed through
/// the platform's register bus by `(block, offset)`.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Block {
    /// Clock controller: generator control/status, output gates, muxes
    Clock,
    /// Memory controller (self-refresh handshake)
    Memory,
    /// Primary controller interrupt block
    Interrupt,
}

/// Direction of a generator power transition.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    Down = 0,
    Up = 1,
}

impl Direction {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Identity of a single power-controllable clock generator.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct GeneratorId(pub u8);

impl core::fmt::Display for GeneratorId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "gen{}", self.0)
    }
}
