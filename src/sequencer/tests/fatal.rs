//! Timing faults and contract violations halt the core. The simulated core
//! panics with the recorded fault when halted.

use deepidle::{SequencerConfig, SequencerContext, Stage, Variant};
use deepidle_sim::SimPlatform;
use std::sync::{Mutex, MutexGuard};

// the fault record is global; keep halts from interleaving
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

fn setup(v: Variant) -> (SequencerContext, SimPlatform) {
    let cfg = v.config().unwrap();
    let sim = SimPlatform::new(&cfg);
    (SequencerContext::new(SequencerConfig::new(), cfg), sim)
}

#[test]
#[should_panic(expected = "fatal -200")]
fn skipping_a_stage_halts() {
    let _g = serial();
    let (mut ctx, mut sim) = setup(Variant::Lp1);
    let _ = ctx.request_enter(&mut sim, Stage::Memory);
}

#[test]
#[should_panic(expected = "fatal -201")]
fn exiting_below_current_halts() {
    let _g = serial();
    let (mut ctx, mut sim) = setup(Variant::Lp1);
    ctx.request_enter(&mut sim, Stage::Preparations).unwrap();
    ctx.request_enter(&mut sim, Stage::Memory).unwrap();
    ctx.request_exit(&mut sim, Stage::Preparations);
}

#[test]
#[should_panic(expected = "fatal -201")]
fn exiting_init_halts() {
    let _g = serial();
    let (mut ctx, mut sim) = setup(Variant::Lp2);
    ctx.request_exit(&mut sim, Stage::Init);
}

#[test]
#[should_panic(expected = "fatal -202")]
fn entering_while_unwinding_halts() {
    let _g = serial();
    let (mut ctx, mut sim) = setup(Variant::Lp2);
    for stage in &Stage::ENTRY[..3] {
        ctx.request_enter(&mut sim, *stage).unwrap();
    }
    ctx.request_exit(&mut sim, Stage::ChildClockGenerators);
    let _ = ctx.request_enter(&mut sim, Stage::ChildClockGenerators);
}

#[test]
#[should_panic(expected = "fatal -101 in stage memory")]
fn missing_self_refresh_ack_halts() {
    let _g = serial();
    let (mut ctx, mut sim) = setup(Variant::Lp1);
    sim.stick_self_refresh();
    ctx.request_enter(&mut sim, Stage::Preparations).unwrap();
    let _ = ctx.request_enter(&mut sim, Stage::Memory);
}

#[test]
#[should_panic(expected = "fatal -100 in stage child-clock-generators")]
fn generator_that_never_settles_halts() {
    let _g = serial();
    let (mut ctx, mut sim) = setup(Variant::Lp2);
    let child = Variant::Lp2.config().unwrap().children[0];
    sim.stick_generator(child.id());
    let _ = ctx.run_cycle(&mut sim);
}

#[test]
#[should_panic(expected = "fatal -102 in stage utility-state")]
fn utility_clock_that_never_switches_halts() {
    let _g = serial();
    let (mut ctx, mut sim) = setup(Variant::Lp1);
    sim.stick_utility_clock();
    let _ = ctx.run_cycle(&mut sim);
}

#[test]
#[should_panic(expected = "fatal -102 in stage utility-state")]
fn utility_clock_stuck_on_the_way_back_halts() {
    let _g = serial();
    let (mut ctx, mut sim) = setup(Variant::Lp2);
    for stage in &Stage::ENTRY[..5] {
        ctx.request_enter(&mut sim, *stage).unwrap();
    }
    sim.stick_utility_clock();
    ctx.request_exit(&mut sim, Stage::UtilityState);
}

#[test]
#[should_panic(expected = "fatal -100 in stage parent-clock-generators")]
fn parent_generator_that_never_settles_halts() {
    let _g = serial();
    let (mut ctx, mut sim) = setup(Variant::Lp2);
    let parent = Variant::Lp2.config().unwrap().parents[1];
    sim.stick_generator(parent.id());
    let _ = ctx.run_cycle(&mut sim);
}

#[test]
#[should_panic(expected = "fatal -103 in stage parent-clock-generators")]
fn secondary_that_never_acknowledges_halts() {
    let _g = serial();
    let (mut ctx, mut sim) = setup(Variant::Lp1);
    sim.mute_secondary();
    let _ = ctx.run_cycle(&mut sim);
}

#[test]
#[should_panic(expected = "fatal -204 in stage parent-clock-generators")]
fn waking_at_an_unrecorded_point_halts() {
    let _g = serial();
    let (mut ctx, mut sim) = setup(Variant::Lp2);
    sim.resume_elsewhere();
    let _ = ctx.run_cycle(&mut sim);
}
