/// Shortest suspension worth the entry and exit cost
pub const MIN_RESIDENCY_US: u32 = 2_000;
/// Wake this much before the next alarm so exit completes in time
pub const WAKE_MARGIN_US: u32 = 500;
/// Memory controller self-refresh handshake, documented maximum
pub const SELF_REFRESH_TIMEOUT_US: u32 = 100;
/// Utility clock glitch-free mux switch, documented maximum
pub const UTIL_SWITCH_TIMEOUT_US: u32 = 50;
/// Secondary controller handoff acknowledge, documented maximum
pub const SECONDARY_ACK_TIMEOUT_US: u32 = 200;

/// Runtime knobs, fixed at start-up.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SequencerConfig {
    pub min_residency_us: u32,
    pub wake_margin_us: u32,
    pub self_refresh_timeout_us: u32,
    pub util_switch_timeout_us: u32,
    pub secondary_ack_timeout_us: u32,
    /// Put memory into self-refresh in the memory stage
    pub memory_self_refresh: bool,
    /// Interrupt lines whose latch aborts an entry
    pub abort_irq_mask: u32,
}

impl SequencerConfig {
    pub const fn new() -> Self {
        Self {
            min_residency_us: MIN_RESIDENCY_US,
            wake_margin_us: WAKE_MARGIN_US,
            self_refresh_timeout_us: SELF_REFRESH_TIMEOUT_US,
            util_switch_timeout_us: UTIL_SWITCH_TIMEOUT_US,
            secondary_ack_timeout_us: SECONDARY_ACK_TIMEOUT_US,
            memory_self_refresh: true,
            abort_irq_mask: u32::MAX,
        }
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self::new()
    }
}
