use idlestate::{Phase, Stage};
use types::AbortReason;

/// Where the machine is and how the current cycle is going.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SequencerState {
    stage: Stage,
    phase: Phase,
    abort: AbortReason,
    /// Stage whose entry or exit action is running
    in_flight: Option<Stage>,
    /// Deepest stage entered this cycle
    deepest: Stage,
    /// The core went through a suspension this cycle
    suspended: bool,
}

impl SequencerState {
    pub const fn new() -> Self {
        Self {
            stage: Stage::Init,
            phase: Phase::Idle,
            abort: AbortReason::empty(),
            in_flight: None,
            deepest: Stage::Init,
            suspended: false,
        }
    }

    /// Current stage: the last one entered and not yet exited.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Reasons accumulated since the cycle began. Kept after the cycle ends
    /// so the caller can still read why it ended.
    pub fn abort(&self) -> AbortReason {
        self.abort
    }

    /// Stage a fault is charged to: the one whose action is running, or
    /// the current stage between actions.
    pub fn active(&self) -> Stage {
        self.in_flight.unwrap_or(self.stage)
    }

    pub fn deepest(&self) -> Stage {
        self.deepest
    }

    pub fn suspended(&self) -> bool {
        self.suspended
    }

    pub(crate) fn begin(&mut self) {
        self.phase = Phase::Entering;
        self.abort = AbortReason::empty();
        self.deepest = Stage::Init;
        self.suspended = false;
    }

    pub(crate) fn start_action(&mut self, stage: Stage) {
        self.in_flight = Some(stage);
    }

    pub(crate) fn end_action(&mut self) {
        self.in_flight = None;
    }

    pub(crate) fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
        self.deepest = self.deepest.max(stage);
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn add_abort(&mut self, reason: AbortReason) {
        self.abort |= reason;
    }

    pub(crate) fn mark_suspended(&mut self) {
        self.suspended = true;
    }
}

impl Default for SequencerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_action_is_the_active_stage() {
        let mut s = SequencerState::new();
        s.set_stage(Stage::Preparations);
        assert_eq!(s.active(), Stage::Preparations);
        s.start_action(Stage::Memory);
        assert_eq!(s.active(), Stage::Memory);
        assert_eq!(s.stage(), Stage::Preparations);
        s.end_action();
        assert_eq!(s.active(), Stage::Preparations);
    }
}
