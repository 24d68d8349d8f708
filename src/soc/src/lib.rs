#![no_std]

pub mod clkgen;
pub mod map;
pub mod variant;

pub use clkgen::{
    max_level, run_level, run_levels, ClockGenerator, GeneratorKind, StepFault, StepSet,
    StepTable, TableError, MAX_LEVELS,
};
pub use variant::{Variant, VariantConfig};

pub const fn bit(nr: u32) -> u32 {
    1u32 << nr
}
