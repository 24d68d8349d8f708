use device::AbortSources;
use log::debug;
use types::AbortReason;

/// Aggregates the independent abort sources into one [`AbortReason`].
/// Sampled before every stage entry, never in the middle of one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AbortMonitor {
    irq_mask: u32,
    min_residency_us: u32,
}

impl AbortMonitor {
    pub const fn new(irq_mask: u32, min_residency_us: u32) -> Self {
        Self {
            irq_mask,
            min_residency_us,
        }
    }

    /// Sample every source. Empty means entry may proceed.
    pub fn check<S: AbortSources + ?Sized>(&self, src: &mut S) -> AbortReason {
        let mut reason = AbortReason::empty();
        reason.set(AbortReason::DISPLAY_BUSY, src.display_busy());
        reason.set(AbortReason::HOST_BUSY, src.host_busy());
        reason.set(
            AbortReason::PENDING_INTERRUPT,
            src.latch_pending_interrupts() & self.irq_mask != 0,
        );
        reason.set(AbortReason::SW_WAKE_REQUEST, src.sw_wake_pending());
        reason.set(AbortReason::DISALLOWED_STATE, src.disallowed_state());
        if let Some(code) = src.sub_fsm_abort() {
            reason |= AbortReason::sub_fsm(code);
        }
        if !reason.is_empty() {
            debug!("abort sources: {}", reason);
        }
        reason
    }

    /// Refuse a suspension the next alarm would cut shorter than the
    /// minimum residency. No alarm means nothing limits the stay.
    pub fn check_residency(&self, now_us: u64, next_alarm_us: Option<u64>) -> AbortReason {
        match next_alarm_us {
            Some(alarm) if alarm.saturating_sub(now_us) < self.min_residency_us as u64 => {
                debug!("alarm at {}us, {}us away", alarm, alarm.saturating_sub(now_us));
                AbortReason::TIMER_ALARM_DUE
            }
            _ => AbortReason::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Sources {
        display: bool,
        latched: u32,
        sub_fsm: Option<u16>,
    }

    impl AbortSources for Sources {
        fn display_busy(&mut self) -> bool {
            self.display
        }
        fn host_busy(&mut self) -> bool {
            false
        }
        fn latch_pending_interrupts(&mut self) -> u32 {
            core::mem::take(&mut self.latched)
        }
        fn sw_wake_pending(&mut self) -> bool {
            false
        }
        fn disallowed_state(&mut self) -> bool {
            false
        }
        fn sub_fsm_abort(&mut self) -> Option<u16> {
            self.sub_fsm
        }
        fn next_alarm_us(&mut self) -> Option<u64> {
            None
        }
    }

    #[test]
    fn quiet_sources_allow_entry() {
        let m = AbortMonitor::new(u32::MAX, 100);
        assert!(m.check(&mut Sources::default()).is_empty());
    }

    #[test]
    fn sources_combine_and_latch_clears() {
        let m = AbortMonitor::new(0b1100, 100);
        let mut s = Sources {
            display: true,
            latched: 0b0100,
            sub_fsm: Some(0x2a),
        };
        let r = m.check(&mut s);
        assert!(r.contains(AbortReason::DISPLAY_BUSY | AbortReason::PENDING_INTERRUPT));
        assert_eq!(r.sub_fsm_code(), Some(0x2a));
        assert_eq!(r.primary(), Some(0));

        s.display = false;
        s.sub_fsm = None;
        assert!(m.check(&mut s).is_empty());
    }

    #[test]
    fn masked_interrupts_do_not_abort() {
        let m = AbortMonitor::new(0b1100, 100);
        let mut s = Sources {
            latched: 0b0011,
            ..Default::default()
        };
        assert!(m.check(&mut s).is_empty());
    }

    #[test]
    fn residency() {
        let m = AbortMonitor::new(0, 2_000);
        assert_eq!(m.check_residency(1_000, Some(2_999)), AbortReason::TIMER_ALARM_DUE);
        assert!(m.check_residency(1_000, Some(3_000)).is_empty());
        assert!(m.check_residency(1_000, None).is_empty());
        assert_eq!(m.check_residency(5_000, Some(4_000)), AbortReason::TIMER_ALARM_DUE);
    }
}
