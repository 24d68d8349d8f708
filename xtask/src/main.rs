mod sim;

use clap::{Parser, Subcommand, ValueEnum};
use deepidle::{Stage, Variant};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run deep-idle cycles against the simulated hardware
    Sim(SimArgs),
    /// Print the step tables of a variant
    Tables {
        #[arg(long, value_enum, default_value_t = Board::Lp2)]
        variant: Board,
    },
}

#[derive(Debug, clap::Args)]
struct SimArgs {
    #[arg(long, value_enum, default_value_t = Board::Lp2)]
    variant: Board,
    /// Latch an interrupt right before entering the stage after this one
    #[arg(long, value_enum)]
    abort_after: Option<EntryStage>,
    /// Time spent suspended when no alarm is pending
    #[arg(long, default_value_t = deepidle_sim::DEFAULT_SLEEP_US)]
    sleep_us: u64,
    /// Next alarm, relative to the start of each cycle
    #[arg(long)]
    alarm_in_us: Option<u64>,
    /// Number of cycles, 0 runs until interrupted
    #[arg(long, default_value_t = 1)]
    cycles: u32,
    /// Leave memory out of self-refresh
    #[arg(long)]
    no_self_refresh: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Board {
    Lp1,
    Lp2,
}

impl From<Board> for Variant {
    fn from(b: Board) -> Self {
        match b {
            Board::Lp1 => Variant::Lp1,
            Board::Lp2 => Variant::Lp2,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EntryStage {
    Preparations,
    Memory,
    ChildClockGenerators,
    OutputClockGate,
    UtilityState,
}

impl From<EntryStage> for Stage {
    fn from(s: EntryStage) -> Self {
        match s {
            EntryStage::Preparations => Stage::Preparations,
            EntryStage::Memory => Stage::Memory,
            EntryStage::ChildClockGenerators => Stage::ChildClockGenerators,
            EntryStage::OutputClockGate => Stage::OutputClockGate,
            EntryStage::UtilityState => Stage::UtilityState,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    match &cli.command {
        Commands::Sim(args) => sim::execute_command(args),
        Commands::Tables { variant } => sim::print_tables((*variant).into()),
    }
}
