use crate::SimArgs;
use deepidle::{CycleReport, Direction, SequencerConfig, SequencerContext, Stage, Variant};
use deepidle_sim::SimPlatform;
use log::{error, info, trace};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub(crate) fn execute_command(args: &SimArgs) {
    let variant: Variant = args.variant.into();
    let cfg = match variant.config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{variant}: {e}");
            process::exit(1);
        }
    };
    let config = SequencerConfig {
        memory_self_refresh: !args.no_self_refresh,
        ..SequencerConfig::new()
    };

    let mut hw = SimPlatform::new(&cfg);
    hw.set_sleep(args.sleep_us);
    let mut ctx = SequencerContext::new(config, cfg);
    ctx.set_event_callback(Some(trace_report));

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || r.store(false, Ordering::SeqCst)).expect("setting Ctrl-C handler");

    info!("simulating {variant}, {} cycle(s)", args.cycles);
    let mut n = 0;
    while running.load(Ordering::SeqCst) && (args.cycles == 0 || n < args.cycles) {
        if let Some(stage) = args.abort_after {
            hw.interrupt_after(Stage::from(stage).index() as u32);
        }
        hw.next_alarm = args.alarm_in_us.map(|us| hw.time_us() + us);
        match ctx.run_cycle(&mut hw) {
            Ok(()) => {}
            Err(reason) => info!("cycle {} aborted: {reason}", n + 1),
        }
        if let Some(report) = ctx.last_report() {
            println!("cycle {}: {report}", n + 1);
        }
        n += 1;
    }

    let s = ctx.statistics();
    println!("======= DONE =======");
    println!(
        "attempts {}, completed {}, aborted {}, slept {}us total, worst entry {}us, worst exit {}us",
        s.attempts, s.completed, s.aborted, s.total_sleep_us, s.worst_entry_us, s.worst_exit_us
    );
}

fn trace_report(report: &CycleReport) {
    trace!("report: {report:?}");
}

pub(crate) fn print_tables(variant: Variant) {
    let cfg = match variant.config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{variant}: {e}");
            process::exit(1);
        }
    };
    for (class, gens) in [("children", cfg.children), ("parents", cfg.parents)] {
        println!("{variant} {class}:");
        for g in gens {
            println!("  {g}");
            for dir in [Direction::Down, Direction::Up] {
                for (level, steps) in cfg.table.levels(g.kind(), dir).iter().enumerate() {
                    println!("    {dir:?} {level}: {steps:?}");
                }
            }
        }
    }
}
