use super::{ClockGenerator, GenCon};
use crate::map::GEN_STAT_READY;
use bitflags::bitflags;
use device::{poll_until, RegisterBus, Timeout, Timestamp};
use log::debug;
use types::Direction;

bitflags! {
    /// Atomic sub-steps of a generator power transition.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct StepSet: u8 {
        /// Read the control register into the descriptor (power-down only)
        const CACHE = 1 << 0;
        /// Gate / ungate the output
        const OUTPUT = 1 << 1;
        /// Clear / restore the lock-detection enable
        const LOCK_DETECT = 1 << 2;
        /// Assert / deassert the electrical clamp
        const CLAMP = 1 << 3;
        /// Power off / power on with the cached dividers
        const POWER = 1 << 4;
        /// Bounded wait for the ready indication to drop / rise
        const SETTLE = 1 << 5;
    }
}

/// Execution order of sub-steps sharing a level.
const DOWN_ORDER: [StepSet; 6] = [
    StepSet::CACHE,
    StepSet::OUTPUT,
    StepSet::LOCK_DETECT,
    StepSet::CLAMP,
    StepSet::POWER,
    StepSet::SETTLE,
];

const UP_ORDER: [StepSet; 5] = [
    StepSet::POWER,
    StepSet::CLAMP,
    StepSet::LOCK_DETECT,
    StepSet::SETTLE,
    StepSet::OUTPUT,
];

/// Run the sub-steps `steps` of one generator. On a timeout the step that
/// failed is returned and nothing after it is executed.
pub(super) fn execute<P>(hw: &mut P, gen: &mut ClockGenerator, steps: StepSet, dir: Direction) -> Result<(), (StepSet, Timeout)>
where
    P: RegisterBus + Timestamp + ?Sized,
{
    let order: &[StepSet] = match dir {
        Direction::Down => &DOWN_ORDER,
        Direction::Up => &UP_ORDER,
    };

    for &step in order.iter().filter(|s| steps.contains(**s)) {
        if step == StepSet::CACHE {
            let v = hw.read(gen.block, gen.con);
            gen.cache(v);
            if gen.already_off {
                debug!("{}: already off, skipped", gen);
            }
            continue;
        }
        if gen.already_off {
            return Ok(());
        }
        match dir {
            Direction::Down => power_down_step(hw, gen, step)?,
            Direction::Up => power_up_step(hw, gen, step)?,
        }
    }
    Ok(())
}

fn update<P: RegisterBus + ?Sized>(hw: &mut P, gen: &ClockGenerator, f: impl FnOnce(&mut GenCon)) {
    let mut con = GenCon(hw.read(gen.block, gen.con));
    f(&mut con);
    hw.write(gen.block, gen.con, con.0);
}

fn wait_ready<P>(hw: &mut P, gen: &ClockGenerator, ready: bool) -> Result<(), Timeout>
where
    P: RegisterBus + Timestamp + ?Sized,
{
    let (block, stat) = (gen.block, gen.stat);
    poll_until(hw, gen.kind.settle_timeout_us(), |hw| {
        ((hw.read(block, stat) & GEN_STAT_READY) != 0) == ready
    })
}

fn power_down_step<P>(hw: &mut P, gen: &ClockGenerator, step: StepSet) -> Result<(), (StepSet, Timeout)>
where
    P: RegisterBus + Timestamp + ?Sized,
{
    if step == StepSet::OUTPUT {
        update(hw, gen, |c| c.set_out_en(false));
    } else if step == StepSet::LOCK_DETECT {
        update(hw, gen, |c| c.set_lock_det_en(false));
    } else if step == StepSet::CLAMP {
        update(hw, gen, |c| c.set_clamp(true));
    } else if step == StepSet::POWER {
        update(hw, gen, |c| c.set_power_en(false));
    } else if step == StepSet::SETTLE {
        wait_ready(hw, gen, false).map_err(|t| (step, t))?;
    }
    Ok(())
}

fn power_up_step<P>(hw: &mut P, gen: &ClockGenerator, step: StepSet) -> Result<(), (StepSet, Timeout)>
where
    P: RegisterBus + Timestamp + ?Sized,
{
    let cached = gen.cached;
    if step == StepSet::POWER {
        update(hw, gen, |c| {
            c.0 = (c.0 & !GenCon::CONFIG) | (cached.0 & GenCon::CONFIG);
            c.set_power_en(cached.power_en());
        });
    } else if step == StepSet::CLAMP {
        update(hw, gen, |c| c.set_clamp(cached.clamp()));
    } else if step == StepSet::LOCK_DETECT {
        update(hw, gen, |c| c.set_lock_det_en(cached.lock_det_en()));
    } else if step == StepSet::SETTLE {
        wait_ready(hw, gen, true).map_err(|t| (step, t))?;
    } else if step == StepSet::OUTPUT {
        update(hw, gen, |c| c.set_out_en(cached.out_en()));
    }
    Ok(())
}
