use core::fmt;
use idlestate::Stage;
use types::AbortReason;

/// Time spent in one stage's entry and exit actions.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StageLatency {
    pub entry_us: u64,
    pub exit_us: u64,
}

impl StageLatency {
    pub const ZERO: Self = Self {
        entry_us: 0,
        exit_us: 0,
    };
}

/// Delivered once per cycle, after the machine is back at `Init`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CycleReport {
    /// The core was suspended and woke again
    pub success: bool,
    /// Every reason an entry was refused during the cycle
    pub abort_reason: AbortReason,
    /// Deepest stage entered
    pub deepest: Stage,
    pub latencies: [StageLatency; Stage::COUNT],
    pub sleep_us: u64,
}

impl CycleReport {
    pub fn entry_us(&self) -> u64 {
        self.latencies.iter().map(|l| l.entry_us).sum()
    }

    pub fn exit_us(&self) -> u64 {
        self.latencies.iter().map(|l| l.exit_us).sum()
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            write!(
                f,
                "slept {}us, entry {}us, exit {}us",
                self.sleep_us,
                self.entry_us(),
                self.exit_us()
            )
        } else {
            write!(f, "aborted at {} ({})", self.deepest, self.abort_reason)
        }
    }
}

pub type CycleCallback = fn(&CycleReport);

/// Counters across cycles, cleared only by a reset.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Statistics {
    pub attempts: u32,
    pub completed: u32,
    pub aborted: u32,
    /// Refused entries per common abort bit
    pub aborts_by_reason: [u32; AbortReason::COMMON_BITS],
    /// Refusals caused by the sub-state-machine, any code
    pub sub_fsm_aborts: u32,
    pub last_sleep_us: u64,
    pub total_sleep_us: u64,
    pub worst_entry_us: u64,
    pub worst_exit_us: u64,
}

impl Statistics {
    pub const fn new() -> Self {
        Self {
            attempts: 0,
            completed: 0,
            aborted: 0,
            aborts_by_reason: [0; AbortReason::COMMON_BITS],
            sub_fsm_aborts: 0,
            last_sleep_us: 0,
            total_sleep_us: 0,
            worst_entry_us: 0,
            worst_exit_us: 0,
        }
    }

    pub(crate) fn record_abort(&mut self, reason: AbortReason) {
        let common = reason.common().bits();
        for (bit, count) in self.aborts_by_reason.iter_mut().enumerate() {
            if common & (1 << bit) != 0 {
                *count += 1;
            }
        }
        if reason.sub_fsm_code().is_some() {
            self.sub_fsm_aborts += 1;
        }
    }

    pub(crate) fn record_cycle(&mut self, report: &CycleReport) {
        if report.success {
            self.completed += 1;
            self.last_sleep_us = report.sleep_us;
            self.total_sleep_us += report.sleep_us;
            self.worst_entry_us = self.worst_entry_us.max(report.entry_us());
            self.worst_exit_us = self.worst_exit_us.max(report.exit_us());
        } else {
            self.aborted += 1;
        }
    }

    /// Refusals carrying `reason`'s lowest common bit.
    pub fn aborts_for(&self, reason: AbortReason) -> u32 {
        reason.primary().map_or(0, |bit| self.aborts_by_reason[bit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_common_bit_is_counted() {
        let mut s = Statistics::new();
        s.record_abort(AbortReason::HOST_BUSY | AbortReason::PENDING_INTERRUPT);
        s.record_abort(AbortReason::HOST_BUSY);
        s.record_abort(AbortReason::SUB_STATE_MACHINE | AbortReason::sub_fsm(9));
        assert_eq!(s.aborts_for(AbortReason::HOST_BUSY), 2);
        assert_eq!(s.aborts_for(AbortReason::PENDING_INTERRUPT), 1);
        assert_eq!(s.aborts_for(AbortReason::SUB_STATE_MACHINE), 1);
        assert_eq!(s.aborts_for(AbortReason::DISPLAY_BUSY), 0);
        assert_eq!(s.sub_fsm_aborts, 1);
    }

    #[test]
    fn only_successful_cycles_update_sleep() {
        let mut s = Statistics::new();
        let mut r = CycleReport {
            success: false,
            abort_reason: AbortReason::SW_WAKE_REQUEST,
            deepest: Stage::Memory,
            latencies: [StageLatency::ZERO; Stage::COUNT],
            sleep_us: 0,
        };
        s.record_cycle(&r);
        r.success = true;
        r.sleep_us = 700;
        r.latencies[1].entry_us = 3;
        r.latencies[6].entry_us = 4;
        s.record_cycle(&r);
        assert_eq!((s.aborted, s.completed), (1, 1));
        assert_eq!(s.last_sleep_us, 700);
        assert_eq!(s.worst_entry_us, 7);
    }
}
