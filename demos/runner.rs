use std::{path::PathBuf, process};

use anyhow::{bail, Context};
use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use regasm::{compile, execute, input};

/// Compile and run a regasm program.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Program to run, must have the `.asm` extension
    program: PathBuf,

    /// Newline separated integers consumed by `read`
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if cli.program.extension().map_or(true, |ext| ext != "asm") {
        bail!("the file must have an .asm extension");
    }

    let source = input::load_program(&cli.program)?;
    let values = match &cli.input {
        Some(path) => input::load_input(path)?,
        None => Vec::new(),
    };

    let program = compile(&source)?;
    match execute(&program, &values) {
        Ok(output) => {
            for record in output {
                println!("{}", record);
            }
            Ok(())
        }
        Err(aborted) => {
            for record in &aborted.output {
                println!("{}", record);
            }
            Err(aborted.error.into())
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    SimpleLogger::new()
        .with_level(level(cli.verbose))
        .init()
        .context("could not set up logging")?;

    if let Err(err) = run(&cli) {
        eprintln!("{:#}", err);
        process::exit(1);
    }
    Ok(())
}
