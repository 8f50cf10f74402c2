//! `director-cli`: run a storylet library against an empty world for a fixed
//! number of ticks, printing each tick's explanation.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use narrator_director::{Director, DirectorConfig, StubJudge};

#[derive(Parser)]
#[command(name = "director-cli", about = "Run a storylet library for N ticks")]
struct Cli {
    /// Directory containing `.json` storylet files.
    storylets_dir: PathBuf,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 10)]
    ticks: u64,

    /// RNG seed for the run.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let library = match narrator_storylets::compiler::compile_from_dir(&cli.storylets_dir) {
        Ok(library) => library,
        Err(errors) => {
            eprintln!("failed to load storylets from {}:", cli.storylets_dir.display());
            for error in &errors {
                eprintln!("  - {error}");
            }
            return ExitCode::FAILURE;
        }
    };

    let judge = StubJudge::new();
    let config = DirectorConfig::new(cli.seed);
    let mut director = Director::new(&library, config, &judge);

    for i in 0..cli.ticks {
        match director.tick() {
            Ok(_) => {
                print!("{}", director.explain(i).unwrap_or_default());
            }
            Err(e) => {
                eprintln!("tick {i} aborted: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
