/* SPDX-License-Identifier: GPL-2.0-only */
#![no_std]

use core::fmt;

/// The idle state machine takes the subsystem from full power into deep idle
/// and back through discrete stages. Every stage has an entry action and an
/// exit action that undoes it:
///
/// ```text
///      Enter Stage
///           +
///           |
///           V
///   +-----------------+
///   | Abort check     |
///   +-----------------+
///   | Entry action    |  <- snapshot written
///   +-------+---------+
///           |
///           V
///       Next Stage
/// ```
///
/// Below is the current flow. Entry runs top to bottom, exit bottom to top:
///
/// ```text
///          Init
///            |
///      Preparations
///            |
///         Memory
///            |
///   ChildClockGenerators
///            |
///     OutputClockGate
///            |
///      UtilityState
///            |
///  ParentClockGenerators ---- handoff, core suspended
/// ```
///
/// Brief description of stages:
///   Init - idle baseline, nothing entered
///   Preparations - interrupt snapshot, non-wake interrupts masked
///   Memory - memory placed in self-refresh
///   ChildClockGenerators - generators fed by a parent powered down
///   OutputClockGate - output clocks gated
///   UtilityState - utility clock moved to the always-on oscillator
///   ParentClockGenerators - root generators powered down, wake armed, handoff
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Stage {
    Init = 0,
    Preparations,
    Memory,
    ChildClockGenerators,
    OutputClockGate,
    UtilityState,
    ParentClockGenerators,
}

impl Stage {
    /// Number of stages including `Init`.
    pub const COUNT: usize = 7;

    /// Stages in entry order.
    pub const ENTRY: [Stage; 6] = [
        Stage::Preparations,
        Stage::Memory,
        Stage::ChildClockGenerators,
        Stage::OutputClockGate,
        Stage::UtilityState,
        Stage::ParentClockGenerators,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Self::Init),
            1 => Some(Self::Preparations),
            2 => Some(Self::Memory),
            3 => Some(Self::ChildClockGenerators),
            4 => Some(Self::OutputClockGate),
            5 => Some(Self::UtilityState),
            6 => Some(Self::ParentClockGenerators),
            _ => None,
        }
    }

    /// Stage entered after this one.
    ///
    /// ```
    /// use idlestate::Stage;
    ///
    /// assert_eq!(Stage::Init.next(), Some(Stage::Preparations));
    /// assert_eq!(Stage::ParentClockGenerators.next(), None);
    /// ```
    pub const fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub const fn prev(self) -> Option<Self> {
        match self {
            Self::Init => None,
            s => Self::from_index(s.index() - 1),
        }
    }

    /// The last entry stage. It ends in the core suspension.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::ParentClockGenerators)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Preparations => "preparations",
            Self::Memory => "memory",
            Self::ChildClockGenerators => "child-clock-generators",
            Self::OutputClockGate => "output-clock-gate",
            Self::UtilityState => "utility-state",
            Self::ParentClockGenerators => "parent-clock-generators",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Describes when a stage action is made: on the way into deep idle or on
/// the way back out.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StageSequence {
    OnEntry,
    OnExit,
}

/// Where the machine is within a cycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    /// No cycle in progress, current stage is `Init`
    Idle,
    /// Stages are being entered; an abort may still be retried
    Entering,
    /// Stages are being exited; no entry allowed until `Init` is reached
    Exiting,
}
