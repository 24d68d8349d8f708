//! Deep-idle sequencer.
//!
//! Takes the subsystem from full power into deep idle one [`Stage`] at a
//! time, hands wake duties to the secondary controller, suspends the primary
//! core, and on wake walks every stage back in reverse.
//!
//! ```ignore
//! let mut ctx = SequencerContext::new(SequencerConfig::new(), Variant::Lp2.config()?);
//! match ctx.run_cycle(&mut platform) {
//!     Ok(()) => {}                       // slept and came back
//!     Err(reason) => info!("aborted: {}", reason), // already rolled back
//! }
//! ```
#![no_std]

mod abort;
mod bridge;
mod config;
mod context;
mod snapshot;
mod stages;
mod state;
mod stats;

pub use abort::AbortMonitor;
pub use bridge::{Bridge, Suspended};
pub use config::*;
pub use context::SequencerContext;
pub use snapshot::{SnapshotCache, MAX_GENERATORS};
pub use state::SequencerState;
pub use stats::{CycleCallback, CycleReport, StageLatency, Statistics};

pub use deepidle_soc::{Variant, VariantConfig};
pub use idlestate::{Phase, Stage};
pub use types::{AbortReason, Direction};

use deepidle_cpu::CoreControl;
use device::{AbortSources, ExclusiveLock, RegisterBus, SecondaryController, Timestamp, WakeTimer};

/// Every capability the sequencer consumes from its collaborators.
pub trait Platform:
    RegisterBus + Timestamp + WakeTimer + ExclusiveLock + SecondaryController + AbortSources + CoreControl
{
}

impl<T> Platform for T where
    T: RegisterBus + Timestamp + WakeTimer + ExclusiveLock + SecondaryController + AbortSources + CoreControl
{
}
