//! Per-variant generator sets and step tables.
//!
//! Variants differ in which generators exist and in how their sub-steps are
//! grouped into levels. Everything else is shared.

mod lp1;
mod lp2;

use crate::clkgen::{ClockGenerator, StepTable, TableError};
use core::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Variant {
    /// Serialized steps, one sub-step per level
    Lp1,
    /// Interleaved steps, settle waits pushed to late levels
    Lp2,
}

impl Variant {
    pub fn config(self) -> Result<VariantConfig, TableError> {
        match self {
            Self::Lp1 => lp1::config(),
            Self::Lp2 => lp2::config(),
        }
    }

    pub fn step_table(self) -> Result<StepTable, TableError> {
        match self {
            Self::Lp1 => lp1::step_table(),
            Self::Lp2 => lp2::step_table(),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lp1 => write!(f, "lp1"),
            Self::Lp2 => write!(f, "lp2"),
        }
    }
}

/// Everything the sequencer needs to know about one hardware variant.
#[derive(Clone, Debug)]
pub struct VariantConfig {
    pub table: StepTable,
    /// Generators fed by a parent, in registration order
    pub children: &'static [ClockGenerator],
    /// Root generators, in registration order
    pub parents: &'static [ClockGenerator],
    /// Output clocks gated while idle
    pub output_gates: u32,
    /// Interrupt lines left enabled to wake the subsystem
    pub wake_mask: u32,
}

#[cfg(test)]
mod tests {
    use super::Variant;
    use crate::clkgen::max_level;
    use types::Direction;

    #[test]
    fn builtin_variants_are_valid() {
        for v in [Variant::Lp1, Variant::Lp2] {
            let cfg = v.config().unwrap();
            assert!(!cfg.parents.is_empty());
            assert_eq!(cfg.wake_mask & 1, 1);
        }
    }

    #[test]
    fn interleaved_variant_needs_fewer_levels() {
        let lp1 = Variant::Lp1.config().unwrap();
        let lp2 = Variant::Lp2.config().unwrap();
        assert!(
            max_level(&lp2.table, lp2.children, Direction::Down)
                < max_level(&lp1.table, lp1.children, Direction::Down)
        );
    }
}
