//! Host-side model of the deep-idle hardware.
//!
//! Every collaborator trait the sequencer consumes is implemented by one
//! [`SimPlatform`]. Status registers follow their control registers
//! immediately unless a signal is marked stuck, the clock advances one
//! microsecond per read, and a halted core panics so hosts and tests can
//! observe fatal faults.

use deepidle_cpu::{CoreControl, ResumePoint, ResumeSlot};
use deepidle_soc::map::*;
use deepidle_soc::clkgen::GenCon;
use deepidle_soc::{ClockGenerator, GeneratorKind, VariantConfig};
use device::{AbortSources, ExclusiveLock, Handoff, RegisterBus, SecondaryController, Timestamp, WakeTimer};
use log::{debug, trace};
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};
use idlestate::Stage;
use types::{Block, GeneratorId};
use util::fault;

/// Default stay when no wake deadline was programmed.
pub const DEFAULT_SLEEP_US: u64 = 10_000;

/// Powered, locked and running, with dividers that differ per generator.
pub fn running_con(gen: &ClockGenerator) -> u32 {
    let mut con = GenCon(0);
    con.set_power_en(true);
    con.set_lock_det_en(gen.kind() != GeneratorKind::Oscillator);
    con.set_out_en(true);
    con.set_post_div(1);
    con.set_fb_div(gen.id().0 as u16 + 1);
    con.bits()
}

#[derive(Debug)]
pub struct SimPlatform {
    regs: BTreeMap<(Block, u32), u32>,
    writes: Vec<(Block, u32, u32)>,
    now: Cell<u64>,

    stuck_generators: BTreeSet<u32>,
    stuck_self_refresh: bool,
    stuck_utility_clock: bool,
    mute_secondary: bool,
    /// Wake at a point other than the one handed to `suspend`
    foreign_resume: bool,

    pub display_busy: bool,
    pub host_busy: bool,
    pub sw_wake: bool,
    pub disallowed: bool,
    pub sub_fsm: Option<u16>,
    pub next_alarm: Option<u64>,
    latched_irqs: u32,
    /// Interrupt latched once this many more abort checks have passed
    irq_plan: Option<u32>,

    handoffs: Vec<Handoff>,
    acked: bool,
    wake_deadline: Option<u64>,
    wake_cancels: u32,
    lock_held: bool,
    lock_acquisitions: u32,
    timer_base: u64,
    wake_class_masked: bool,
    sleep_us: u64,
    suspensions: u32,
}

impl SimPlatform {
    /// A subsystem at full power with every generator of `variant` running.
    pub fn new(variant: &VariantConfig) -> Self {
        let mut regs = BTreeMap::new();
        for gen in variant.children.iter().chain(variant.parents) {
            regs.insert((gen.block(), gen.con()), running_con(gen));
        }
        regs.insert((Block::Clock, CLK_OUT_GATE), 0xff);
        regs.insert((Block::Clock, CLK_UTIL_SEL), 0x1);
        regs.insert((Block::Memory, MEM_SR_CTRL), 0x30);
        regs.insert((Block::Interrupt, INTR_EN), 0xffff);

        Self {
            regs,
            writes: Vec::new(),
            now: Cell::new(1_000),
            stuck_generators: BTreeSet::new(),
            stuck_self_refresh: false,
            stuck_utility_clock: false,
            mute_secondary: false,
            foreign_resume: false,
            display_busy: false,
            host_busy: false,
            sw_wake: false,
            disallowed: false,
            sub_fsm: None,
            next_alarm: None,
            latched_irqs: 0,
            irq_plan: None,
            handoffs: Vec::new(),
            acked: false,
            wake_deadline: None,
            wake_cancels: 0,
            lock_held: false,
            lock_acquisitions: 0,
            timer_base: 0,
            wake_class_masked: false,
            sleep_us: DEFAULT_SLEEP_US,
            suspensions: 0,
        }
    }

    /// Power a generator off before the cycle starts.
    pub fn power_off(&mut self, gen: &ClockGenerator) {
        let v = self.peek(gen.block(), gen.con());
        self.regs.insert((gen.block(), gen.con()), v & !1);
    }

    pub fn peek(&self, block: Block, offset: u32) -> u32 {
        self.regs.get(&(block, offset)).copied().unwrap_or(0)
    }

    /// Every control register as last written.
    pub fn registers(&self) -> BTreeMap<(Block, u32), u32> {
        self.regs.clone()
    }

    pub fn writes(&self) -> &[(Block, u32, u32)] {
        &self.writes
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    /// Current time without advancing the clock.
    pub fn time_us(&self) -> u64 {
        self.now.get()
    }

    pub fn advance(&self, us: u64) {
        self.now.set(self.now.get() + us);
    }

    /// Latch `line` for the abort monitor and show it in the pending register.
    pub fn raise_interrupt(&mut self, line: u32) {
        self.latched_irqs |= 1 << line;
        let pending = self.peek(Block::Interrupt, INTR_PENDING);
        self.regs.insert((Block::Interrupt, INTR_PENDING), pending | 1 << line);
    }

    /// Let `checks` more abort checks pass, then latch interrupt line 0.
    pub fn interrupt_after(&mut self, checks: u32) {
        self.irq_plan = Some(checks);
    }

    pub fn stick_generator(&mut self, id: GeneratorId) {
        self.stuck_generators.insert(gen_stat(id.0));
    }

    pub fn stick_self_refresh(&mut self) {
        self.stuck_self_refresh = true;
    }

    pub fn stick_utility_clock(&mut self) {
        self.stuck_utility_clock = true;
    }

    pub fn mute_secondary(&mut self) {
        self.mute_secondary = true;
    }

    pub fn resume_elsewhere(&mut self) {
        self.foreign_resume = true;
    }

    /// How long a suspension without a wake deadline lasts.
    pub fn set_sleep(&mut self, us: u64) {
        self.sleep_us = us;
    }

    pub fn handoffs(&self) -> &[Handoff] {
        &self.handoffs
    }

    pub fn suspensions(&self) -> u32 {
        self.suspensions
    }

    pub fn wake_deadline(&self) -> Option<u64> {
        self.wake_deadline
    }

    pub fn wake_cancels(&self) -> u32 {
        self.wake_cancels
    }

    pub fn lock_held(&self) -> bool {
        self.lock_held
    }

    pub fn lock_acquisitions(&self) -> u32 {
        self.lock_acquisitions
    }

    pub fn wake_class_masked(&self) -> bool {
        self.wake_class_masked
    }

    pub fn timer_base(&self) -> u64 {
        self.timer_base
    }

    fn is_generator_stat(offset: u32) -> bool {
        offset < CLK_OUT_GATE && offset % CLK_GEN_STRIDE == CLK_GEN_STAT
    }

    fn planned_interrupt(&mut self) -> u32 {
        match self.irq_plan {
            Some(0) => {
                self.irq_plan = None;
                1
            }
            Some(n) => {
                self.irq_plan = Some(n - 1);
                0
            }
            None => 0,
        }
    }
}

impl RegisterBus for SimPlatform {
    fn read(&mut self, block: Block, offset: u32) -> u32 {
        let v = match (block, offset) {
            (Block::Clock, o) if Self::is_generator_stat(o) => {
                let powered = self.peek(block, o - CLK_GEN_STAT) & 1;
                if self.stuck_generators.contains(&o) {
                    powered ^ GEN_STAT_READY
                } else {
                    powered
                }
            }
            (Block::Clock, CLK_UTIL_STAT) if !self.stuck_utility_clock => self.peek(block, CLK_UTIL_SEL) & UTIL_SEL_MASK,
            (Block::Clock, CLK_UTIL_STAT) => !self.peek(block, CLK_UTIL_SEL) & UTIL_SEL_MASK,
            (Block::Memory, MEM_SR_STAT) => {
                let req = self.peek(block, MEM_SR_CTRL) & MEM_SR_REQ != 0;
                if req != self.stuck_self_refresh {
                    MEM_SR_ACK
                } else {
                    0
                }
            }
            _ => self.peek(block, offset),
        };
        self.advance(1);
        trace!("read {:?}+{:#x} = {:#x}", block, offset, v);
        v
    }

    fn write(&mut self, block: Block, offset: u32, value: u32) {
        trace!("write {:?}+{:#x} = {:#x}", block, offset, value);
        self.regs.insert((block, offset), value);
        self.writes.push((block, offset, value));
        self.advance(1);
    }
}

impl Timestamp for SimPlatform {
    fn now_us(&self) -> u64 {
        let t = self.now.get();
        self.now.set(t + 1);
        t
    }
}

impl AbortSources for SimPlatform {
    fn display_busy(&mut self) -> bool {
        self.display_busy
    }

    fn host_busy(&mut self) -> bool {
        self.host_busy
    }

    fn latch_pending_interrupts(&mut self) -> u32 {
        std::mem::take(&mut self.latched_irqs) | self.planned_interrupt()
    }

    fn sw_wake_pending(&mut self) -> bool {
        self.sw_wake
    }

    fn disallowed_state(&mut self) -> bool {
        self.disallowed
    }

    fn sub_fsm_abort(&mut self) -> Option<u16> {
        self.sub_fsm
    }

    fn next_alarm_us(&mut self) -> Option<u64> {
        self.next_alarm
    }
}

impl SecondaryController for SimPlatform {
    fn hand_off(&mut self, handoff: &Handoff) {
        debug!("handoff {:?}", handoff);
        self.handoffs.push(*handoff);
        self.acked = !self.mute_secondary;
    }

    fn acknowledged(&mut self) -> bool {
        self.advance(1);
        self.acked
    }
}

impl WakeTimer for SimPlatform {
    fn program_wake(&mut self, deadline_us: u64) {
        self.wake_deadline = Some(deadline_us);
    }

    fn cancel_wake(&mut self) {
        self.wake_deadline = None;
        self.wake_cancels += 1;
    }
}

impl ExclusiveLock for SimPlatform {
    fn acquire(&mut self) {
        assert!(!self.lock_held, "deep-idle lock acquired twice");
        self.lock_held = true;
        self.lock_acquisitions += 1;
    }

    fn release(&mut self) {
        self.lock_held = false;
    }
}

impl CoreControl for SimPlatform {
    fn save_timer_base(&mut self) -> u64 {
        self.timer_base
    }

    fn restore_timer_base(&mut self, base: u64) {
        self.timer_base = base;
    }

    fn mask_wake_class(&mut self) {
        self.wake_class_masked = true;
    }

    fn unmask_wake_class(&mut self) {
        self.wake_class_masked = false;
    }

    fn suspend(&mut self, point: ResumePoint) -> ResumePoint {
        let now = self.now.get();
        let stay = match self.wake_deadline {
            Some(d) => d.saturating_sub(now),
            None => self.sleep_us,
        };
        debug!("core suspended for {}us", stay);
        self.suspensions += 1;
        self.acked = false;
        self.advance(stay);
        if self.foreign_resume {
            return ResumeSlot::new().prepare(Stage::Init);
        }
        point
    }

    fn hang(&mut self) -> ! {
        match fault::last() {
            Some(rec) => panic!("core halted: {}", rec),
            None => panic!("core halted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepidle_soc::Variant;

    #[test]
    fn status_follows_control() {
        let cfg = Variant::Lp2.config().unwrap();
        let mut sim = SimPlatform::new(&cfg);
        let g = cfg.parents[1];
        assert_eq!(sim.read(Block::Clock, g.stat()) & GEN_STAT_READY, GEN_STAT_READY);
        sim.power_off(&g);
        assert_eq!(sim.read(Block::Clock, g.stat()) & GEN_STAT_READY, 0);

        sim.write(Block::Memory, MEM_SR_CTRL, MEM_SR_REQ);
        assert_eq!(sim.read(Block::Memory, MEM_SR_STAT), MEM_SR_ACK);
        sim.stick_self_refresh();
        assert_eq!(sim.read(Block::Memory, MEM_SR_STAT), 0);
    }

    #[test]
    fn planned_interrupt_fires_once() {
        let cfg = Variant::Lp1.config().unwrap();
        let mut sim = SimPlatform::new(&cfg);
        sim.interrupt_after(1);
        assert_eq!(sim.latch_pending_interrupts(), 0);
        assert_eq!(sim.latch_pending_interrupts(), 1);
        assert_eq!(sim.latch_pending_interrupts(), 0);
    }
}
