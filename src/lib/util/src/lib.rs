#![no_std]

pub mod fault;
pub mod timer;
