use crate::stats::StageLatency;
use deepidle_soc::ClockGenerator;
use heapless::Vec;
use idlestate::{Stage, StageSequence};

/// Most generators of one class (children or parents) a variant may register.
pub const MAX_GENERATORS: usize = 8;

/// Pre-transition hardware state, one slot per stage. A slot is written by
/// the stage's entry action before it changes anything and consumed by its
/// exit action, so no exit can run for a stage that was never entered.
#[derive(Clone, Debug)]
pub struct SnapshotCache {
    recorded: [bool; Stage::COUNT],
    pub(crate) intr_enable: u32,
    /// Lines already pending when the cycle began
    pub(crate) intr_pending: u32,
    pub(crate) mem_ctrl: u32,
    pub(crate) out_gate: u32,
    pub(crate) util_sel: u32,
    pub(crate) children: Vec<ClockGenerator, MAX_GENERATORS>,
    pub(crate) parents: Vec<ClockGenerator, MAX_GENERATORS>,
    pub(crate) wake_deadline: Option<u64>,
    pub(crate) sleep_us: u64,
    pub(crate) latency: [StageLatency; Stage::COUNT],
}

impl SnapshotCache {
    pub const fn new() -> Self {
        Self {
            recorded: [false; Stage::COUNT],
            intr_enable: 0,
            intr_pending: 0,
            mem_ctrl: 0,
            out_gate: 0,
            util_sel: 0,
            children: Vec::new(),
            parents: Vec::new(),
            wake_deadline: None,
            sleep_us: 0,
            latency: [StageLatency::ZERO; Stage::COUNT],
        }
    }

    /// Start a cycle from the variant's generator descriptors. Fails if the
    /// variant registers more generators than fit.
    pub(crate) fn load(&mut self, children: &[ClockGenerator], parents: &[ClockGenerator]) -> Result<(), ()> {
        self.reset();
        self.children.extend_from_slice(children)?;
        self.parents.extend_from_slice(parents)
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    pub(crate) fn record(&mut self, stage: Stage) {
        self.recorded[stage.index()] = true;
    }

    pub(crate) fn consume(&mut self, stage: Stage) {
        self.recorded[stage.index()] = false;
    }

    pub(crate) fn set_latency(&mut self, stage: Stage, seq: StageSequence, us: u64) {
        let l = &mut self.latency[stage.index()];
        match seq {
            StageSequence::OnEntry => l.entry_us = us,
            StageSequence::OnExit => l.exit_us = us,
        }
    }

    pub fn is_recorded(&self, stage: Stage) -> bool {
        self.recorded[stage.index()]
    }

    /// Child generator descriptors with whatever the last power-down cached.
    pub fn children(&self) -> &[ClockGenerator] {
        &self.children
    }

    pub fn parents(&self) -> &[ClockGenerator] {
        &self.parents
    }

    pub fn pending_at_entry(&self) -> u32 {
        self.intr_pending
    }

    pub fn wake_deadline(&self) -> Option<u64> {
        self.wake_deadline
    }

    pub fn latency(&self) -> &[StageLatency; Stage::COUNT] {
        &self.latency
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepidle_soc::GeneratorKind;

    static MANY: [ClockGenerator; MAX_GENERATORS + 1] = {
        let g = ClockGenerator::new(0, GeneratorKind::Pll, 0);
        [g; MAX_GENERATORS + 1]
    };

    #[test]
    fn slots_are_consumed_once() {
        let mut s = SnapshotCache::new();
        s.record(Stage::Memory);
        assert!(s.is_recorded(Stage::Memory));
        s.consume(Stage::Memory);
        assert!(!s.is_recorded(Stage::Memory));
        assert!(!s.is_recorded(Stage::Preparations));
    }

    #[test]
    fn too_many_generators_do_not_load() {
        let mut s = SnapshotCache::new();
        assert!(s.load(&MANY[..2], &MANY[..1]).is_ok());
        assert_eq!(s.children().len(), 2);
        assert!(s.load(&MANY, &[]).is_err());
    }
}
