use anyhow::{bail, Context, Result};
use clap::Parser;
use push3_vm::program::assemble;
use push3_vm::{Int, Machine, Stacks, StepOutcome, VmConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What a run left behind.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Report {
    steps: u64,
    halted: bool,
    int: Vec<Int>,
    bool: Vec<bool>,
    /// Exec items still pending when the step budget ran out.
    pending: usize,
}

fn load_program(program: Option<&Path>, source: Option<&Path>) -> Result<Vec<u8>> {
    match (program, source) {
        (Some(path), None) => {
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        (None, Some(path)) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            assemble(&text).with_context(|| format!("in {}", path.display()))
        }
        _ => bail!("give exactly one of --program or --source"),
    }
}

fn run(code: &[u8], ints: &[Int], bools: &[bool], config: &VmConfig) -> Result<Report> {
    let initial = Stacks::for_program(code)
        .with_ints(ints.iter().copied())
        .with_bools(bools.iter().copied());
    let mut machine = Machine::from_config(code, initial, config);

    let halted = match config.step_budget {
        Some(budget) => machine.run_for(budget)?.outcome == StepOutcome::Halt,
        None => {
            machine.run()?;
            true
        }
    };
    if !halted {
        log::warn!("step budget exhausted after {} steps", machine.steps());
    }

    Ok(Report {
        steps: machine.steps(),
        halted,
        int: machine.int_stack().to_vec(),
        bool: machine.bool_stack().to_vec(),
        pending: machine.exec_stack().len(),
    })
}

#[derive(Parser, Debug)]
#[command(version, about = "Run a push3 program and print its final stacks", long_about = None)]
struct Args {
    /// Bytecode file
    #[arg(short, long)]
    program: Option<PathBuf>,

    /// S-expression source, assembled before running
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// TOML file with a `VmConfig`
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Integers preloaded bottom to top
    #[arg(short, long = "int", allow_negative_numbers = true)]
    ints: Vec<Int>,

    /// Booleans preloaded bottom to top
    #[arg(short, long = "bool")]
    bools: Vec<bool>,

    /// Overrides the config's step budget
    #[arg(long)]
    budget: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => VmConfig::load(path)?,
        None => VmConfig::default(),
    };
    if args.budget.is_some() {
        config.step_budget = args.budget;
    }

    let code = load_program(args.program.as_deref(), args.source.as_deref())?;
    let report = match run(&code, &args.ints, &args.bools, &config) {
        Ok(report) => report,
        Err(e) => {
            log::error!("Error: {:#}", e);
            return Err(e);
        }
    };
    print!("{}", serde_yaml::to_string(&report)?);

    Ok(())
}
