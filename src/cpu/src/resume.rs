use idlestate::Stage;

/// High 16 bits of every resume cookie are this tag, low 16 bits a sequence.
pub const RESUME_TAG: u32 = 0x5245_0000;

/// Opaque token naming the one place execution may come back to after the
/// core is suspended. It cannot be cloned or built outside this module, so
/// the only legal way to resume is to hand back the token that was prepared.
#[derive(Debug, Eq, PartialEq)]
pub struct ResumePoint {
    cookie: u32,
    stage: Stage,
}

impl ResumePoint {
    /// Value the secondary controller stores as the recovery vector.
    pub fn vector(&self) -> u32 {
        self.cookie
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResumeError {
    /// Nothing was prepared
    NotArmed,
    /// The token is not the one that was prepared
    Mismatch,
}

/// Retains the recorded resume point across suspension.
#[derive(Debug)]
pub struct ResumeSlot {
    sequence: u16,
    armed: Option<(u32, Stage)>,
}

impl ResumeSlot {
    pub const fn new() -> Self {
        Self {
            sequence: 0,
            armed: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Record a new resume point, replacing any stale one.
    pub fn prepare(&mut self, stage: Stage) -> ResumePoint {
        self.sequence = self.sequence.wrapping_add(1);
        let cookie = RESUME_TAG | self.sequence as u32;
        self.armed = Some((cookie, stage));
        ResumePoint { cookie, stage }
    }

    /// Consume the token execution came back with. Disarms the slot on
    /// success so the same point can never be resumed twice.
    pub fn take(&mut self, point: ResumePoint) -> Result<Stage, ResumeError> {
        match self.armed {
            None => Err(ResumeError::NotArmed),
            Some((cookie, stage)) if cookie == point.cookie && stage == point.stage => {
                self.armed = None;
                Ok(stage)
            }
            Some(_) => Err(ResumeError::Mismatch),
        }
    }

    pub fn disarm(&mut self) {
        self.armed = None;
    }
}

impl Default for ResumeSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_prepared_point_resumes() {
        let mut slot = ResumeSlot::new();
        let stale = slot.prepare(Stage::ParentClockGenerators);
        let fresh = slot.prepare(Stage::ParentClockGenerators);
        assert_ne!(stale.vector(), fresh.vector());
        assert_eq!(slot.take(stale), Err(ResumeError::Mismatch));
        assert_eq!(slot.take(fresh), Ok(Stage::ParentClockGenerators));
        assert!(!slot.is_armed());
    }

    #[test]
    fn resume_without_prepare_is_rejected() {
        let mut slot = ResumeSlot::new();
        let p = slot.prepare(Stage::ParentClockGenerators);
        slot.disarm();
        assert_eq!(slot.take(p), Err(ResumeError::NotArmed));
    }
}
