use deepidle_soc::{
    map::GEN_STAT_READY, run_level, run_levels, ClockGenerator, GeneratorKind, StepSet, Variant,
};
use device::{RegisterBus, Timestamp};
use std::cell::Cell;
use std::collections::BTreeMap;
use types::{Block, Direction, GeneratorId};

/// Register file where a generator's ready bit mirrors its power bit, unless
/// the generator is stuck.
struct Regs {
    values: BTreeMap<u32, u32>,
    writes: Vec<(u32, u32)>,
    stuck: Option<u32>,
    now: Cell<u64>,
}

impl Regs {
    fn new(initial: &[(&ClockGenerator, u32)]) -> Self {
        let mut values = BTreeMap::new();
        for (g, v) in initial {
            values.insert(g.con(), *v);
        }
        Self {
            values,
            writes: Vec::new(),
            stuck: None,
            now: Cell::new(0),
        }
    }

    fn con(&self, g: &ClockGenerator) -> u32 {
        self.values[&g.con()]
    }
}

impl RegisterBus for Regs {
    fn read(&mut self, _block: Block, offset: u32) -> u32 {
        if let Some(v) = self.values.get(&offset) {
            return *v;
        }
        // status register sits right after its control register
        let con = offset - 4;
        let powered = self.values.get(&con).copied().unwrap_or(0) & 1;
        if self.stuck == Some(con) {
            GEN_STAT_READY
        } else {
            powered
        }
    }

    fn write(&mut self, _block: Block, offset: u32, value: u32) {
        self.values.insert(offset, value);
        self.writes.push((offset, value));
    }
}

impl Timestamp for Regs {
    fn now_us(&self) -> u64 {
        let t = self.now.get();
        self.now.set(t + 1);
        t
    }
}

const A_CON: u32 = 0x0032_0407;
const B_CON: u32 = 0x0000_0105;

fn a() -> ClockGenerator {
    ClockGenerator::new(1, GeneratorKind::FracPll, 45_158_400)
}

fn b() -> ClockGenerator {
    ClockGenerator::new(2, GeneratorKind::Oscillator, 32_000)
}

#[test]
fn power_down_interleaves_levels_and_power_up_restores() {
    let table = Variant::Lp2.step_table().unwrap();
    // registered B then A: power-down visits A first
    let mut gens = [b(), a()];
    let mut regs = Regs::new(&[(&gens[0], B_CON), (&gens[1], A_CON)]);
    let (ca, cb) = (gens[1].con(), gens[0].con());

    run_levels(&mut regs, &table, &mut gens, Direction::Down).unwrap();
    assert_eq!(
        regs.writes,
        vec![
            // level 0: A gate, B gate + power
            (ca, 0x0032_0403),
            (cb, 0x0000_0101),
            (cb, 0x0000_0100),
            // level 1: A lock-detect + clamp
            (ca, 0x0032_0401),
            (ca, 0x0032_0409),
            // level 2: A power
            (ca, 0x0032_0408),
        ]
    );
    assert_eq!(gens[1].cached(), A_CON);
    assert_eq!(gens[0].cached(), B_CON);

    regs.writes.clear();
    run_levels(&mut regs, &table, &mut gens, Direction::Up).unwrap();
    assert_eq!(regs.con(&gens[1]), A_CON);
    assert_eq!(regs.con(&gens[0]), B_CON);
    // B is fully restored at level 1, A needs two more levels
    assert_eq!(regs.writes.last(), Some(&(ca, A_CON)));
    assert_eq!(regs.writes[0], (cb, 0x0000_0101));
}

#[test]
fn generator_already_off_is_never_written() {
    let table = Variant::Lp1.step_table().unwrap();
    let mut gens = [a(), b()];
    let off = A_CON & !1;
    let mut regs = Regs::new(&[(&gens[0], off), (&gens[1], B_CON)]);
    let ca = gens[0].con();

    run_levels(&mut regs, &table, &mut gens, Direction::Down).unwrap();
    assert!(gens[0].already_off());
    run_levels(&mut regs, &table, &mut gens, Direction::Up).unwrap();

    assert!(regs.writes.iter().all(|(o, _)| *o != ca));
    assert_eq!(regs.con(&gens[0]), off);
    assert_eq!(regs.con(&gens[1]), B_CON);
}

#[test]
fn single_level_runs_only_that_level() {
    let table = Variant::Lp2.step_table().unwrap();
    let mut gens = [b(), a()];
    let mut regs = Regs::new(&[(&gens[0], B_CON), (&gens[1], A_CON)]);

    run_level(&mut regs, &table, &mut gens, 0, Direction::Down).unwrap();
    run_level(&mut regs, &table, &mut gens, 1, Direction::Down).unwrap();
    // A has not reached its power step yet
    assert_eq!(regs.con(&gens[1]) & 1, 1);
    assert_eq!(regs.con(&gens[0]) & 1, 0);
}

#[test]
fn stuck_ready_signal_is_reported() {
    let table = Variant::Lp2.step_table().unwrap();
    let mut gens = [b(), a()];
    let mut regs = Regs::new(&[(&gens[0], B_CON), (&gens[1], A_CON)]);
    regs.stuck = Some(gens[1].con());

    let fault = run_levels(&mut regs, &table, &mut gens, Direction::Down).unwrap_err();
    assert_eq!(fault.generator, GeneratorId(1));
    assert_eq!(fault.step, StepSet::SETTLE);
    assert!(fault.timeout.waited_us >= GeneratorKind::FracPll.settle_timeout_us() as u64);
}
