use super::{step, ClockGenerator, StepSet, StepTable};
use core::fmt;
use device::{Error, ErrorKind, RegisterBus, Timeout, Timestamp};
use log::debug;
use types::{Direction, GeneratorId};

/// A generator did not settle within its documented maximum latency.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StepFault {
    pub generator: GeneratorId,
    pub step: StepSet,
    pub timeout: Timeout,
}

impl Error for StepFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Timeout
    }
}

impl fmt::Display for StepFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?} not settled after {}us", self.generator, self.step, self.timeout.waited_us)
    }
}

/// Deepest level defined for any of `gens` in direction `dir`.
pub fn max_level(table: &StepTable, gens: &[ClockGenerator], dir: Direction) -> usize {
    gens.iter().map(|g| table.levels(g.kind(), dir).len()).max().unwrap_or(0)
}

/// Execute `level` for every generator that defines it. Power-down walks
/// the generators in reverse registration order so dependents go off before
/// what they depend on; power-up walks forward.
pub fn run_level<P>(hw: &mut P, table: &StepTable, gens: &mut [ClockGenerator], level: usize, dir: Direction) -> Result<(), StepFault>
where
    P: RegisterBus + Timestamp + ?Sized,
{
    match dir {
        Direction::Down => gens.iter_mut().rev().try_for_each(|g| run_one(hw, table, g, level, dir)),
        Direction::Up => gens.iter_mut().try_for_each(|g| run_one(hw, table, g, level, dir)),
    }
}

/// Execute every level of every generator, one level at a time.
pub fn run_levels<P>(hw: &mut P, table: &StepTable, gens: &mut [ClockGenerator], dir: Direction) -> Result<(), StepFault>
where
    P: RegisterBus + Timestamp + ?Sized,
{
    let levels = max_level(table, gens, dir);
    for level in 0..levels {
        run_level(hw, table, gens, level, dir)?;
    }
    debug!("{} generators {:?} in {} levels", gens.len(), dir, levels);
    Ok(())
}

fn run_one<P>(hw: &mut P, table: &StepTable, gen: &mut ClockGenerator, level: usize, dir: Direction) -> Result<(), StepFault>
where
    P: RegisterBus + Timestamp + ?Sized,
{
    let Some(steps) = table.steps(gen.kind(), dir, level) else {
        return Ok(());
    };
    debug!("{} level {}: {:?}", gen, level, steps);
    step::execute(hw, gen, steps, dir).map_err(|(step, timeout)| StepFault {
        generator: gen.id(),
        step,
        timeout,
    })
}
