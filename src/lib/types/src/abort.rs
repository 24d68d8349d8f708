use bitflags::bitflags;
use core::fmt;

bitflags! {
    /// Reasons an entry attempt was abandoned.
    ///
    /// Bits 0..=6 are the common sequence aborts. The upper half carries the
    /// sub-state-machine's own 16-bit abort code and is only ever set together
    /// with [`AbortReason::SUB_STATE_MACHINE`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct AbortReason: u32 {
        /// Display engine is scanning out
        const DISPLAY_BUSY = 1 << 0;
        /// Host interface has outstanding traffic
        const HOST_BUSY = 1 << 1;
        /// An unmasked interrupt latched since the last check
        const PENDING_INTERRUPT = 1 << 2;
        /// Next timer alarm is closer than the minimum residency
        const TIMER_ALARM_DUE = 1 << 3;
        /// Software asked for a wake
        const SW_WAKE_REQUEST = 1 << 4;
        /// A peripheral is in a state that forbids deep idle
        const DISALLOWED_STATE = 1 << 5;
        /// The sub-state-machine reported a failure, see [`AbortReason::sub_fsm_code`]
        const SUB_STATE_MACHINE = 1 << 6;

        const SUB_FSM_CODE = 0xffff_0000;
    }
}

impl AbortReason {
    /// Number of bits in the common namespace.
    pub const COMMON_BITS: usize = 7;

    /// An abort reported by the sub-state-machine with its own code.
    pub const fn sub_fsm(code: u16) -> Self {
        Self::from_bits_retain(Self::SUB_STATE_MACHINE.bits() | ((code as u32) << 16))
    }

    pub fn sub_fsm_code(self) -> Option<u16> {
        if self.contains(Self::SUB_STATE_MACHINE) {
            Some((self.bits() >> 16) as u16)
        } else {
            None
        }
    }

    /// The reasons of the common namespace only.
    pub fn common(self) -> Self {
        self.difference(Self::SUB_FSM_CODE)
    }

    /// Bit index of the highest-precedence reason. Lower bits win; the
    /// sub-state-machine code never takes precedence over a common reason.
    pub fn primary(self) -> Option<usize> {
        let common = self.common().bits();
        if common == 0 {
            None
        } else {
            Some(common.trailing_zeros() as usize)
        }
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let mut first = true;
        for (name, _) in self.common().iter_names() {
            if !first {
                write!(f, "|")?;
            }
            write!(f, "{name}")?;
            first = false;
        }
        if let Some(code) = self.sub_fsm_code() {
            write!(f, "(0x{code:04x})")?;
        }
        Ok(())
    }
}
