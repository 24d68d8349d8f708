use super::{GeneratorKind, StepSet};
use core::fmt;
use heapless::Vec;
use types::Direction;

/// Deepest level any generator kind may define.
pub const MAX_LEVELS: usize = 6;

type Levels = Vec<StepSet, MAX_LEVELS>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TableError {
    TooManyLevels(GeneratorKind, Direction),
    EmptyLevel(GeneratorKind, Direction, usize),
    /// Power-down must cache the configuration at level 0
    CacheNotFirst(GeneratorKind),
    CacheOnPowerUp(GeneratorKind),
    DuplicateStep(GeneratorKind, Direction),
    /// Power-up does not undo exactly what power-down did
    Unbalanced(GeneratorKind),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyLevels(k, d) => write!(f, "{k:?} {d:?}: more than {MAX_LEVELS} levels"),
            Self::EmptyLevel(k, d, l) => write!(f, "{k:?} {d:?}: level {l} is empty"),
            Self::CacheNotFirst(k) => write!(f, "{k:?}: power-down must cache at level 0"),
            Self::CacheOnPowerUp(k) => write!(f, "{k:?}: cache step on power-up"),
            Self::DuplicateStep(k, d) => write!(f, "{k:?} {d:?}: step listed twice"),
            Self::Unbalanced(k) => write!(f, "{k:?}: power-up does not mirror power-down"),
        }
    }
}

/// Maps `(GeneratorKind, Direction, level)` to the sub-steps legal at that
/// level. Built once per hardware variant.
#[derive(Clone, Debug)]
pub struct StepTable {
    levels: [[Levels; 2]; GeneratorKind::COUNT],
}

impl StepTable {
    /// A table in which no kind has any step.
    pub fn empty() -> Self {
        Self {
            levels: core::array::from_fn(|_| [Levels::new(), Levels::new()]),
        }
    }

    /// Define both directions of `kind`.
    pub fn with(mut self, kind: GeneratorKind, down: &[StepSet], up: &[StepSet]) -> Result<Self, TableError> {
        let down_all = check(kind, Direction::Down, down)?;
        let up_all = check(kind, Direction::Up, up)?;

        if !down.is_empty() && !down[0].contains(StepSet::CACHE) {
            return Err(TableError::CacheNotFirst(kind));
        }
        if up_all.contains(StepSet::CACHE) {
            return Err(TableError::CacheOnPowerUp(kind));
        }
        // settle waits are direction specific, everything else must be undone
        let undone = StepSet::CACHE | StepSet::SETTLE;
        if down_all.difference(undone) != up_all.difference(undone) {
            return Err(TableError::Unbalanced(kind));
        }

        let slot = &mut self.levels[kind.index()];
        slot[Direction::Down.index()] =
            Levels::from_slice(down).map_err(|_| TableError::TooManyLevels(kind, Direction::Down))?;
        slot[Direction::Up.index()] =
            Levels::from_slice(up).map_err(|_| TableError::TooManyLevels(kind, Direction::Up))?;
        Ok(self)
    }

    pub fn levels(&self, kind: GeneratorKind, dir: Direction) -> &[StepSet] {
        &self.levels[kind.index()][dir.index()]
    }

    /// Sub-steps of `kind` at `level`, `None` past its last level.
    pub fn steps(&self, kind: GeneratorKind, dir: Direction, level: usize) -> Option<StepSet> {
        self.levels(kind, dir).get(level).copied()
    }
}

fn check(kind: GeneratorKind, dir: Direction, levels: &[StepSet]) -> Result<StepSet, TableError> {
    if levels.len() > MAX_LEVELS {
        return Err(TableError::TooManyLevels(kind, dir));
    }
    let mut all = StepSet::empty();
    for (i, &set) in levels.iter().enumerate() {
        if set.is_empty() {
            return Err(TableError::EmptyLevel(kind, dir, i));
        }
        if all.intersects(set) {
            return Err(TableError::DuplicateStep(kind, dir));
        }
        all |= set;
    }
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_power_down_without_cache() {
        let t = StepTable::empty().with(
            GeneratorKind::Pll,
            &[StepSet::OUTPUT, StepSet::POWER],
            &[StepSet::POWER, StepSet::OUTPUT],
        );
        assert_eq!(t.unwrap_err(), TableError::CacheNotFirst(GeneratorKind::Pll));
    }

    #[test]
    fn rejects_unbalanced_directions() {
        let t = StepTable::empty().with(
            GeneratorKind::Oscillator,
            &[StepSet::CACHE | StepSet::OUTPUT, StepSet::POWER],
            &[StepSet::POWER],
        );
        assert_eq!(t.unwrap_err(), TableError::Unbalanced(GeneratorKind::Oscillator));
    }

    #[test]
    fn rejects_duplicates_and_empty_levels() {
        let dup = StepTable::empty().with(
            GeneratorKind::Pll,
            &[StepSet::CACHE | StepSet::POWER, StepSet::POWER],
            &[StepSet::POWER],
        );
        assert_eq!(dup.unwrap_err(), TableError::DuplicateStep(GeneratorKind::Pll, Direction::Down));

        let empty = StepTable::empty().with(
            GeneratorKind::Pll,
            &[StepSet::CACHE, StepSet::empty()],
            &[],
        );
        assert_eq!(empty.unwrap_err(), TableError::EmptyLevel(GeneratorKind::Pll, Direction::Down, 1));
    }

    #[test]
    fn lookups_past_the_last_level_are_none() {
        let t = StepTable::empty()
            .with(
                GeneratorKind::Pll,
                &[StepSet::CACHE | StepSet::OUTPUT, StepSet::POWER | StepSet::SETTLE],
                &[StepSet::POWER, StepSet::SETTLE | StepSet::OUTPUT],
            )
            .unwrap();
        assert_eq!(t.steps(GeneratorKind::Pll, Direction::Down, 1), Some(StepSet::POWER | StepSet::SETTLE));
        assert_eq!(t.steps(GeneratorKind::Pll, Direction::Down, 2), None);
        assert!(t.levels(GeneratorKind::FracPll, Direction::Up).is_empty());
    }
}
