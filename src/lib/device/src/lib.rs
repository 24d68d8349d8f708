#![no_std]

mod bus;
mod error;
mod secondary;
mod sources;

pub use self::{
    bus::{modify, poll_until, RegisterBus, Timestamp},
    error::{Error, ErrorKind, Timeout},
    secondary::{ExclusiveLock, Handoff, SecondaryController, WakeTimer},
    sources::AbortSources,
};
