/*
 * Fatal sequencer faults
 *
 * A fatal fault is never handed back to a caller. It is recorded here, logged,
 * and the primary controller is halted in place so the record can be read out
 * by a debugger or the secondary controller. Codes are negative and grouped
 * per hundred, timing faults first.
 */
use core::fmt;
use idlestate::Stage;
use log::error;
use spin::Mutex;
use types::GeneratorId;

/// The hardware signal that was not observed in time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SignalKind {
    /// Generator lock (power-up) or release (power-down)
    GeneratorSettle,
    /// Memory controller self-refresh acknowledge
    SelfRefreshAck,
    /// Utility clock mux switch status
    UtilityClockSwitch,
    /// Secondary controller handoff acknowledge
    SecondaryAck,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Signal {
    pub kind: SignalKind,
    pub generator: Option<GeneratorId>,
}

impl Signal {
    pub const fn new(kind: SignalKind) -> Self {
        Self {
            kind,
            generator: None,
        }
    }

    pub const fn generator(id: GeneratorId) -> Self {
        Self {
            kind: SignalKind::GeneratorSettle,
            generator: Some(id),
        }
    }
}

/// Programming-contract violations.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Violation {
    /// `enter` for a stage other than `current + 1`
    OutOfOrderEnter { current: Stage, requested: Stage },
    /// `exit` for a stage other than `current`
    OutOfOrderExit { current: Stage, requested: Stage },
    /// `enter` while the machine is unwinding
    EnterWhileExiting(Stage),
    /// `exit` for a stage whose entry never wrote its snapshot
    ExitUnentered(Stage),
    /// Execution came back with a resume point that was never recorded
    ForeignResumePoint,
    /// More generators than the snapshot can hold
    SnapshotOverflow,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FatalCause {
    Timeout(Signal),
    Invariant(Violation),
}

impl FatalCause {
    pub fn code(&self) -> i32 {
        match self {
            /* Timing faults */
            Self::Timeout(s) => match s.kind {
                SignalKind::GeneratorSettle => -100,
                SignalKind::SelfRefreshAck => -101,
                SignalKind::UtilityClockSwitch => -102,
                SignalKind::SecondaryAck => -103,
            },
            /* Contract violations */
            Self::Invariant(v) => match v {
                Violation::OutOfOrderEnter { .. } => -200,
                Violation::OutOfOrderExit { .. } => -201,
                Violation::EnterWhileExiting(_) => -202,
                Violation::ExitUnentered(_) => -203,
                Violation::ForeignResumePoint => -204,
                Violation::SnapshotOverflow => -205,
            },
        }
    }
}

/// Everything needed to diagnose a halted controller.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FatalRecord {
    /// Stage current when the fault was detected
    pub stage: Stage,
    pub cause: FatalCause,
    /// Monotonic timestamp of detection
    pub at_us: u64,
}

impl fmt::Display for FatalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fatal {} in stage {} at {}us: {:?}",
            self.cause.code(),
            self.stage,
            self.at_us,
            self.cause
        )
    }
}

static LAST_FATAL: Mutex<Option<FatalRecord>> = Mutex::new(None);

/// Store the record where it outlives the halt and log it.
pub fn record(rec: FatalRecord) {
    error!("{}", rec);
    *LAST_FATAL.lock() = Some(rec);
}

pub fn last() -> Option<FatalRecord> {
    *LAST_FATAL.lock()
}
