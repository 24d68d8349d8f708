/// Status inputs the abort monitor aggregates. Implementations only read
/// external status; `latch_pending_interrupts` may acknowledge the latch it
/// reports, nothing else may have side effects. Safe to call from interrupt
/// context.
pub trait AbortSources {
    fn display_busy(&mut self) -> bool;

    fn host_busy(&mut self) -> bool;

    /// Interrupt lines that fired since the previous call.
    fn latch_pending_interrupts(&mut self) -> u32;

    fn sw_wake_pending(&mut self) -> bool;

    /// A peripheral is in a state deep idle must not be entered from.
    fn disallowed_state(&mut self) -> bool;

    /// Abort code reported by the sub-state-machine, if it failed.
    fn sub_fsm_abort(&mut self) -> Option<u16>;

    /// Absolute time of the next software timer alarm.
    fn next_alarm_us(&mut self) -> Option<u64>;
}
