use crate::Platform;
use deepidle_cpu::{ResumeError, ResumePoint, ResumeSlot};
use device::{poll_until, Handoff, Timeout};
use idlestate::Stage;
use log::{debug, info};

/// State carried from suspension to resume.
#[derive(Debug)]
pub struct Suspended {
    point: ResumePoint,
    timer_base: u64,
    at_us: u64,
}

/// Hands wake duties to the secondary controller, suspends the core and
/// brings it back at the one recorded resume point.
#[derive(Debug, Default)]
pub struct Bridge {
    slot: ResumeSlot,
    suspensions: u32,
}

impl Bridge {
    pub const fn new() -> Self {
        Self {
            slot: ResumeSlot::new(),
            suspensions: 0,
        }
    }

    /// Record where execution continues after wake.
    pub fn prepare_resume(&mut self, stage: Stage) -> ResumePoint {
        self.slot.prepare(stage)
    }

    /// Save core state, hand off, and suspend. Returns once the core runs
    /// again. A missing acknowledge leaves the core running and is returned
    /// to the caller, which treats it as fatal.
    pub fn handoff_and_suspend<P: Platform + ?Sized>(
        &mut self,
        hw: &mut P,
        point: ResumePoint,
        deadline_us: Option<u64>,
        wake_mask: u32,
        ack_timeout_us: u32,
    ) -> Result<Suspended, Timeout> {
        let timer_base = hw.save_timer_base();
        hw.mask_wake_class();

        let handoff = Handoff {
            resume_vector: point.vector(),
            deadline_us,
            wake_mask,
        };
        hw.hand_off(&handoff);
        poll_until(hw, ack_timeout_us, |hw| hw.acknowledged())?;

        info!("suspending, resume vector {:#x}", handoff.resume_vector);
        let at_us = hw.now_us();
        self.suspensions += 1;
        let point = hw.suspend(point);
        Ok(Suspended {
            point,
            timer_base,
            at_us,
        })
    }

    /// Validate the resume point and restore core state. Returns the time
    /// spent suspended.
    pub fn resume<P: Platform + ?Sized>(&mut self, hw: &mut P, s: Suspended) -> Result<u64, ResumeError> {
        self.slot.take(s.point)?;
        let slept = hw.now_us().saturating_sub(s.at_us);
        hw.restore_timer_base(s.timer_base.wrapping_add(slept));
        hw.unmask_wake_class();
        debug!("resumed after {}us", slept);
        Ok(slept)
    }

    /// Suspensions since start-up.
    pub fn suspensions(&self) -> u32 {
        self.suspensions
    }
}
