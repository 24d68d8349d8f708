use crate::abort::AbortMonitor;
use crate::bridge::Bridge;
use crate::config::SequencerConfig;
use crate::snapshot::SnapshotCache;
use crate::state::SequencerState;
use crate::stats::{CycleCallback, CycleReport, Statistics};
use crate::Platform;
use deepidle_soc::VariantConfig;
use idlestate::{Phase, Stage, StageSequence};
use log::{debug, info, warn};
use types::AbortReason;
use util::fault::{self, FatalCause, FatalRecord, Signal, SignalKind, Violation};
use util::timer::Stopwatch;

/// The deep-idle sequencer. One instance per subsystem; every operation
/// takes the platform it drives by reference.
pub struct SequencerContext {
    pub(crate) config: SequencerConfig,
    pub(crate) variant: VariantConfig,
    monitor: AbortMonitor,
    state: SequencerState,
    pub(crate) snapshot: SnapshotCache,
    bridge: Bridge,
    stats: Statistics,
    callback: Option<CycleCallback>,
    last_report: Option<CycleReport>,
}

impl SequencerContext {
    pub fn new(config: SequencerConfig, variant: VariantConfig) -> Self {
        Self {
            monitor: AbortMonitor::new(config.abort_irq_mask, config.min_residency_us),
            config,
            variant,
            state: SequencerState::new(),
            snapshot: SnapshotCache::new(),
            bridge: Bridge::new(),
            stats: Statistics::new(),
            callback: None,
            last_report: None,
        }
    }

    /// Advance to `stage`, which must be one past the current stage.
    ///
    /// Returns the abort reason if entry was refused; nothing of `stage` was
    /// done then and the caller unwinds with [`Self::request_exit`] or
    /// retries. Entering the terminal stage suspends the core and, on wake,
    /// walks every stage back before returning `Ok`.
    pub fn request_enter<P: Platform>(&mut self, hw: &mut P, stage: Stage) -> Result<(), AbortReason> {
        let current = self.state.stage();
        if self.state.phase() == Phase::Exiting {
            self.fatal(hw, FatalCause::Invariant(Violation::EnterWhileExiting(stage)));
        }
        if current.next() != Some(stage) {
            self.fatal(
                hw,
                FatalCause::Invariant(Violation::OutOfOrderEnter {
                    current,
                    requested: stage,
                }),
            );
        }
        if self.state.phase() == Phase::Idle {
            self.begin_cycle(hw);
        }

        if stage.is_terminal() {
            critical_section::with(|_| self.suspend(hw))?;
            self.unwind(hw);
            return Ok(());
        }

        let reason = self.monitor.check(hw);
        if !reason.is_empty() {
            return Err(self.abort(hw, stage, reason));
        }

        let mut sw = Stopwatch::new(hw.now_us());
        self.state.start_action(stage);
        self.run_entry(hw, stage);
        sw.tick(hw.now_us());
        self.commit_entry(stage, sw.duration_us());
        Ok(())
    }

    /// Undo `stage`, which must be the current stage.
    pub fn request_exit<P: Platform>(&mut self, hw: &mut P, stage: Stage) {
        let current = self.state.stage();
        if stage != current || stage == Stage::Init {
            self.fatal(
                hw,
                FatalCause::Invariant(Violation::OutOfOrderExit {
                    current,
                    requested: stage,
                }),
            );
        }
        if !self.snapshot.is_recorded(stage) {
            self.fatal(hw, FatalCause::Invariant(Violation::ExitUnentered(stage)));
        }
        self.state.set_phase(Phase::Exiting);

        let mut sw = Stopwatch::new(hw.now_us());
        self.state.start_action(stage);
        self.run_exit(hw, stage);
        self.state.end_action();
        self.snapshot.consume(stage);
        sw.tick(hw.now_us());
        self.snapshot.set_latency(stage, StageSequence::OnExit, sw.duration_us());
        debug!("exited {} in {}us", stage, sw.duration_us());

        let prev = stage.prev().unwrap_or(Stage::Init);
        self.state.set_stage(prev);
        if prev == Stage::Init {
            self.finish_cycle(hw);
        }
    }

    /// Exit every entered stage, deepest first.
    pub fn unwind<P: Platform>(&mut self, hw: &mut P) {
        while self.state.stage() != Stage::Init {
            self.request_exit(hw, self.state.stage());
        }
    }

    /// One full attempt: enter every stage in order. On abort the stages
    /// already entered are unwound before the reason is returned.
    pub fn run_cycle<P: Platform>(&mut self, hw: &mut P) -> Result<(), AbortReason> {
        for stage in Stage::ENTRY {
            if let Err(reason) = self.request_enter(hw, stage) {
                self.unwind(hw);
                return Err(reason);
            }
        }
        Ok(())
    }

    pub fn current_stage(&self) -> Stage {
        self.state.stage()
    }

    /// Reasons entry was refused during the current or last cycle.
    pub fn last_abort_reason(&self) -> AbortReason {
        self.state.abort()
    }

    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    pub fn snapshot(&self) -> &SnapshotCache {
        &self.snapshot
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    pub fn last_report(&self) -> Option<&CycleReport> {
        self.last_report.as_ref()
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn suspensions(&self) -> u32 {
        self.bridge.suspensions()
    }

    /// Called once at the end of every cycle, successful or not, from the
    /// sequencer's own context.
    pub fn set_event_callback(&mut self, cb: Option<CycleCallback>) {
        self.callback = cb;
    }

    /// Drop statistics and the last report. Refused, returning the phase,
    /// while a cycle is in progress.
    pub fn reset(&mut self) -> Result<(), Phase> {
        if self.state.phase() != Phase::Idle {
            warn!("reset refused while {:?}", self.state.phase());
            return Err(self.state.phase());
        }
        self.state = SequencerState::new();
        self.snapshot.reset();
        self.stats = Statistics::new();
        self.last_report = None;
        Ok(())
    }

    /// Record `cause` and halt the core. Never returns.
    pub(crate) fn fatal<P: Platform>(&self, hw: &mut P, cause: FatalCause) -> ! {
        fault::record(FatalRecord {
            stage: self.state.active(),
            cause,
            at_us: hw.now_us(),
        });
        hw.hang()
    }

    pub(crate) fn fatal_timeout<P: Platform>(&self, hw: &mut P, signal: Signal) -> ! {
        self.fatal(hw, FatalCause::Timeout(signal))
    }

    fn begin_cycle<P: Platform>(&mut self, hw: &mut P) {
        hw.acquire();
        self.state.begin();
        self.stats.attempts += 1;
        if self.snapshot.load(self.variant.children, self.variant.parents).is_err() {
            self.fatal(hw, FatalCause::Invariant(Violation::SnapshotOverflow));
        }
        debug!("cycle {} begins", self.stats.attempts);
    }

    fn commit_entry(&mut self, stage: Stage, took_us: u64) {
        self.state.end_action();
        self.snapshot.record(stage);
        self.snapshot.set_latency(stage, StageSequence::OnEntry, took_us);
        self.state.set_stage(stage);
        debug!("entered {} in {}us", stage, took_us);
    }

    fn abort<P: Platform>(&mut self, hw: &mut P, stage: Stage, reason: AbortReason) -> AbortReason {
        info!("entry to {} aborted: {}", stage, reason);
        self.state.add_abort(reason);
        self.stats.record_abort(reason);
        if self.state.stage() == Stage::Init {
            self.finish_cycle(hw);
        }
        reason
    }

    /// Terminal stage. Runs with interrupts disabled from the last abort
    /// check until the core has resumed.
    fn suspend<P: Platform>(&mut self, hw: &mut P) -> Result<(), AbortReason> {
        let stage = Stage::ParentClockGenerators;
        let now = hw.now_us();
        let alarm = hw.next_alarm_us();
        let reason = self.monitor.check(hw) | self.monitor.check_residency(now, alarm);
        if !reason.is_empty() {
            return Err(self.abort(hw, stage, reason));
        }

        let mut sw = Stopwatch::new(now);
        self.state.start_action(stage);
        self.run_entry(hw, stage);
        let deadline = alarm.map(|a| a.saturating_sub(self.config.wake_margin_us as u64));
        if let Some(d) = deadline {
            hw.program_wake(d);
        }
        self.snapshot.wake_deadline = deadline;
        sw.tick(hw.now_us());
        self.commit_entry(stage, sw.duration_us());

        let point = self.bridge.prepare_resume(stage);
        let suspended = match self.bridge.handoff_and_suspend(
            hw,
            point,
            deadline,
            self.variant.wake_mask,
            self.config.secondary_ack_timeout_us,
        ) {
            Ok(s) => s,
            Err(_) => self.fatal_timeout(hw, Signal::new(SignalKind::SecondaryAck)),
        };
        match self.bridge.resume(hw, suspended) {
            Ok(slept) => self.snapshot.sleep_us = slept,
            Err(_) => self.fatal(hw, FatalCause::Invariant(Violation::ForeignResumePoint)),
        }
        self.state.mark_suspended();
        Ok(())
    }

    fn finish_cycle<P: Platform>(&mut self, hw: &mut P) {
        let report = CycleReport {
            success: self.state.suspended(),
            abort_reason: self.state.abort(),
            deepest: self.state.deepest(),
            latencies: self.snapshot.latency,
            sleep_us: self.snapshot.sleep_us,
        };
        self.stats.record_cycle(&report);
        info!("cycle {}: {}", self.stats.attempts, report);

        self.snapshot.reset();
        self.state.set_phase(Phase::Idle);
        hw.release();
        if let Some(cb) = self.callback {
            cb(&report);
        }
        self.last_report = Some(report);
    }
}
