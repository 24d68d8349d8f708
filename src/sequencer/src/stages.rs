//! Entry and exit actions of every stage. Each entry saves the registers it
//! changes into the snapshot before writing them, and the stage is marked
//! recorded once its entry completed; each exit restores from the snapshot.

use crate::context::SequencerContext;
use crate::Platform;
use deepidle_soc::map::*;
use deepidle_soc::run_levels;
use device::{modify, poll_until};
use idlestate::Stage;
use log::debug;
use types::{Block, Direction};
use util::fault::{Signal, SignalKind};

#[derive(Clone, Copy, Debug)]
enum Generators {
    Children,
    Parents,
}

impl SequencerContext {
    pub(crate) fn run_entry<P: Platform>(&mut self, hw: &mut P, stage: Stage) {
        match stage {
            Stage::Init => {}
            Stage::Preparations => self.mask_interrupts(hw),
            Stage::Memory => self.enter_self_refresh(hw),
            Stage::ChildClockGenerators => self.power(hw, Generators::Children, Direction::Down),
            Stage::OutputClockGate => self.gate_outputs(hw),
            Stage::UtilityState => self.switch_utility_clock(hw),
            Stage::ParentClockGenerators => self.power(hw, Generators::Parents, Direction::Down),
        }
    }

    pub(crate) fn run_exit<P: Platform>(&mut self, hw: &mut P, stage: Stage) {
        match stage {
            Stage::Init => {}
            Stage::Preparations => {
                hw.write(Block::Interrupt, INTR_EN, self.snapshot.intr_enable);
            }
            Stage::Memory => self.exit_self_refresh(hw),
            Stage::ChildClockGenerators => self.power(hw, Generators::Children, Direction::Up),
            Stage::OutputClockGate => {
                hw.write(Block::Clock, CLK_OUT_GATE, self.snapshot.out_gate);
            }
            Stage::UtilityState => self.restore_utility_clock(hw),
            Stage::ParentClockGenerators => {
                if self.snapshot.wake_deadline.take().is_some() {
                    hw.cancel_wake();
                }
                self.power(hw, Generators::Parents, Direction::Up);
            }
        }
    }

    fn mask_interrupts<P: Platform>(&mut self, hw: &mut P) {
        let en = hw.read(Block::Interrupt, INTR_EN);
        self.snapshot.intr_enable = en;
        self.snapshot.intr_pending = hw.read(Block::Interrupt, INTR_PENDING);
        hw.write(Block::Interrupt, INTR_EN, en & self.variant.wake_mask);
        debug!("interrupts {:#x} -> {:#x}", en, en & self.variant.wake_mask);
    }

    fn enter_self_refresh<P: Platform>(&mut self, hw: &mut P) {
        let ctrl = hw.read(Block::Memory, MEM_SR_CTRL);
        self.snapshot.mem_ctrl = ctrl;
        if !self.config.memory_self_refresh {
            return;
        }
        hw.write(Block::Memory, MEM_SR_CTRL, ctrl | MEM_SR_REQ);
        self.wait_self_refresh(hw, true);
    }

    fn exit_self_refresh<P: Platform>(&mut self, hw: &mut P) {
        if !self.config.memory_self_refresh {
            return;
        }
        let ctrl = self.snapshot.mem_ctrl;
        hw.write(Block::Memory, MEM_SR_CTRL, ctrl);
        self.wait_self_refresh(hw, ctrl & MEM_SR_REQ != 0);
    }

    fn wait_self_refresh<P: Platform>(&self, hw: &mut P, acked: bool) {
        let done = poll_until(hw, self.config.self_refresh_timeout_us, |hw| {
            (hw.read(Block::Memory, MEM_SR_STAT) & MEM_SR_ACK != 0) == acked
        });
        if done.is_err() {
            self.fatal_timeout(hw, Signal::new(SignalKind::SelfRefreshAck));
        }
    }

    fn gate_outputs<P: Platform>(&mut self, hw: &mut P) {
        self.snapshot.out_gate = hw.read(Block::Clock, CLK_OUT_GATE);
        let gate = modify(hw, Block::Clock, CLK_OUT_GATE, self.variant.output_gates, 0);
        debug!("output gates {:#x} -> {:#x}", self.snapshot.out_gate, gate);
    }

    fn switch_utility_clock<P: Platform>(&mut self, hw: &mut P) {
        self.snapshot.util_sel = hw.read(Block::Clock, CLK_UTIL_SEL);
        modify(hw, Block::Clock, CLK_UTIL_SEL, UTIL_SEL_MASK, UTIL_SEL_AON_OSC);
        self.wait_utility_clock(hw, UTIL_SEL_AON_OSC);
    }

    fn restore_utility_clock<P: Platform>(&mut self, hw: &mut P) {
        let sel = self.snapshot.util_sel;
        hw.write(Block::Clock, CLK_UTIL_SEL, sel);
        self.wait_utility_clock(hw, sel & UTIL_SEL_MASK);
    }

    fn wait_utility_clock<P: Platform>(&self, hw: &mut P, source: u32) {
        let done = poll_until(hw, self.config.util_switch_timeout_us, |hw| {
            hw.read(Block::Clock, CLK_UTIL_STAT) & UTIL_SEL_MASK == source
        });
        if done.is_err() {
            self.fatal_timeout(hw, Signal::new(SignalKind::UtilityClockSwitch));
        }
    }

    fn power<P: Platform>(&mut self, hw: &mut P, which: Generators, dir: Direction) {
        let gens = match which {
            Generators::Children => &mut self.snapshot.children,
            Generators::Parents => &mut self.snapshot.parents,
        };
        if let Err(fault) = run_levels(hw, &self.variant.table, gens, dir) {
            self.fatal_timeout(hw, Signal::generator(fault.generator));
        }
        debug!("{:?} powered {:?}", which, dir);
    }
}
