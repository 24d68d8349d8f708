/// Everything the secondary controller needs to watch for wake events and
/// bring the primary controller back.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Handoff {
    /// Recovery vector execution resumes at
    pub resume_vector: u32,
    /// Absolute wake deadline, if a timer wake is armed
    pub deadline_us: Option<u64>,
    /// Interrupt lines that wake the primary controller
    pub wake_mask: u32,
}

/// The always-on controller that owns wake duties during deep idle.
pub trait SecondaryController {
    fn hand_off(&mut self, handoff: &Handoff);

    /// The secondary controller confirmed it took over.
    fn acknowledged(&mut self) -> bool;
}

/// Wake timer owned by the secondary controller.
pub trait WakeTimer {
    fn program_wake(&mut self, deadline_us: u64);
    fn cancel_wake(&mut self);
}

/// Hardware/software mutex held for a whole entry+exit cycle.
pub trait ExclusiveLock {
    fn acquire(&mut self);
    fn release(&mut self);
}
