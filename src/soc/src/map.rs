//! Register map of the deep-idle relevant blocks, shared by every variant.
use crate::bit;

/* Block::Clock */

/// Generator `n` control register is at `CLK_GEN_BASE + n * CLK_GEN_STRIDE`
pub const CLK_GEN_BASE: u32 = 0x000;
pub const CLK_GEN_STRIDE: u32 = 0x10;
pub const CLK_GEN_CON: u32 = 0x0;
pub const CLK_GEN_STAT: u32 = 0x4;
/// Lock (PLL) or stable (oscillator) indication
pub const GEN_STAT_READY: u32 = bit(0);

/// One bit per output clock, set = running
pub const CLK_OUT_GATE: u32 = 0x200;
/// Utility clock source select
pub const CLK_UTIL_SEL: u32 = 0x204;
/// Mirrors `CLK_UTIL_SEL` once the glitch-free mux finished switching
pub const CLK_UTIL_STAT: u32 = 0x208;
pub const UTIL_SEL_MASK: u32 = 0x3;
pub const UTIL_SEL_AON_OSC: u32 = 0x3;

/* Block::Memory */

pub const MEM_SR_CTRL: u32 = 0x00;
pub const MEM_SR_REQ: u32 = bit(0);
pub const MEM_SR_STAT: u32 = 0x04;
pub const MEM_SR_ACK: u32 = bit(0);

/* Block::Interrupt */

pub const INTR_EN: u32 = 0x00;
/// Latched pending lines, write one to clear
pub const INTR_PENDING: u32 = 0x04;

pub const fn gen_con(n: u8) -> u32 {
    CLK_GEN_BASE + n as u32 * CLK_GEN_STRIDE + CLK_GEN_CON
}

pub const fn gen_stat(n: u8) -> u32 {
    CLK_GEN_BASE + n as u32 * CLK_GEN_STRIDE + CLK_GEN_STAT
}
