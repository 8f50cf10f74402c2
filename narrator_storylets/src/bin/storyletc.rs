//! `storyletc`: validate (and optionally summarize) a directory of authored storylets.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

#[derive(Parser)]
#[command(name = "storyletc", about = "Compile and validate a storylet directory")]
struct Cli {
    /// Directory containing `.json` storylet files.
    dir: PathBuf,

    /// Print a one-line summary per loaded storylet.
    #[arg(long)]
    list: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match narrator_storylets::compiler::compile_from_dir(&cli.dir) {
        Ok(library) => {
            println!("loaded {} storylet(s) from {}", library.len(), cli.dir.display());
            if cli.list {
                for storylet in library.iter() {
                    println!(
                        "  {:<32} weight={:<5} once={:<5} tags={:?}",
                        storylet.id, storylet.weight, storylet.once, storylet.tags
                    );
                }
            }
            ExitCode::SUCCESS
        }
        Err(errors) => {
            eprintln!("failed to compile {}:", cli.dir.display());
            for error in &errors {
                eprintln!("  - {error}");
            }
            ExitCode::FAILURE
        }
    }
}
