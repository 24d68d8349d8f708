#![no_std]

pub mod resume;

pub use resume::{ResumeError, ResumePoint, ResumeSlot};

/// Control over the primary controller core itself. Only the core can save
/// and restore its fine-grained timer, and only the core can stop itself.
pub trait CoreControl {
    /// Read the fine-grained timer base that does not survive suspension.
    fn save_timer_base(&mut self) -> u64;

    fn restore_timer_base(&mut self, base: u64);

    /// Disable the interrupt class that must stay quiet across suspension.
    fn mask_wake_class(&mut self);

    fn unmask_wake_class(&mut self);

    /// Stop fetching instructions until the secondary controller wakes the
    /// core. Execution continues at the recorded point, which is handed back.
    fn suspend(&mut self, point: ResumePoint) -> ResumePoint;

    /// Halt forever in a diagnosable state.
    fn hang(&mut self) -> !;
}
