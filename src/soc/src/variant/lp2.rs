use super::VariantConfig;
use crate::bit;
use crate::clkgen::{ClockGenerator, GeneratorKind, StepSet, StepTable, TableError};
use types::{KHz, MHz};

pub const XTAL_HZ: u32 = 38400 * KHz;
pub const SYS_PLL_HZ: u32 = 800 * MHz;
pub const MEM_PLL_HZ: u32 = 1066 * MHz;
pub const AUD_PLL_HZ: u32 = 451584 * (KHz / 10);
pub const PERI_PLL_HZ: u32 = 500 * MHz;
pub const RC_OSC_HZ: u32 = 32 * KHz;

static PARENTS: [ClockGenerator; 3] = [
    ClockGenerator::new(0, GeneratorKind::Oscillator, XTAL_HZ),
    ClockGenerator::new(1, GeneratorKind::Pll, SYS_PLL_HZ),
    ClockGenerator::new(2, GeneratorKind::Pll, MEM_PLL_HZ),
];

static CHILDREN: [ClockGenerator; 3] = [
    ClockGenerator::new(3, GeneratorKind::FracPll, AUD_PLL_HZ),
    ClockGenerator::new(4, GeneratorKind::Pll, PERI_PLL_HZ),
    ClockGenerator::new(5, GeneratorKind::Oscillator, RC_OSC_HZ),
];

// Settle waits sit in the last level so the register pokes of every other
// generator are already done when the first wait starts.
pub(super) fn step_table() -> Result<StepTable, TableError> {
    StepTable::empty()
        .with(
            GeneratorKind::Pll,
            &[StepSet::CACHE | StepSet::OUTPUT | StepSet::LOCK_DETECT, StepSet::POWER, StepSet::SETTLE],
            &[StepSet::POWER, StepSet::LOCK_DETECT, StepSet::SETTLE | StepSet::OUTPUT],
        )?
        .with(
            GeneratorKind::FracPll,
            &[
                StepSet::CACHE | StepSet::OUTPUT,
                StepSet::LOCK_DETECT | StepSet::CLAMP,
                StepSet::POWER | StepSet::SETTLE,
            ],
            &[
                StepSet::POWER,
                StepSet::CLAMP | StepSet::LOCK_DETECT,
                StepSet::SETTLE,
                StepSet::OUTPUT,
            ],
        )?
        .with(
            GeneratorKind::Oscillator,
            &[StepSet::CACHE | StepSet::OUTPUT | StepSet::POWER],
            &[StepSet::POWER, StepSet::SETTLE | StepSet::OUTPUT],
        )
}

pub(super) fn config() -> Result<VariantConfig, TableError> {
    Ok(VariantConfig {
        table: step_table()?,
        children: &CHILDREN,
        parents: &PARENTS,
        output_gates: bit(0) | bit(1) | bit(2) | bit(5) | bit(6),
        wake_mask: bit(0) | bit(3) | bit(7),
    })
}
