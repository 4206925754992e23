//! The stack machine.
//!
//! A [`Machine`] owns four bounded stacks and a borrowed, read-only program buffer.
//! Each step pops one descriptor off the exec stack and acts on it; the run ends
//! when the exec stack is empty. Sublist descriptors are expanded on demand: their
//! window is tokenized and the result is pushed back in reverse, so the leftmost
//! token runs next.

pub mod fixed;
mod ops;
mod stack;

pub use stack::{BoundedStack, StackKind};

use crate::config::VmConfig;
use crate::descriptor::{Descriptor, Tag};
use crate::entropy::{ContextEntropy, Entropy};
use crate::error::VmResult;
use crate::parser;

/// Integer stack cell. Literals are 32-bit, arithmetic wraps at 128 bits.
pub type Int = i128;

/// Contents of all four stacks, bottom to top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stacks {
    pub code: Vec<Descriptor>,
    pub exec: Vec<Descriptor>,
    pub int: Vec<Int>,
    pub bool: Vec<bool>,
}

impl Stacks {
    /// Stacks for running a whole program: one sublist spanning `program`.
    pub fn for_program(program: &[u8]) -> Self {
        Self {
            exec: vec![Descriptor::sublist(0, program.len() as u32)],
            ..Default::default()
        }
    }

    pub fn with_ints(mut self, ints: impl IntoIterator<Item = Int>) -> Self {
        self.int.extend(ints);
        self
    }

    pub fn with_bools(mut self, bools: impl IntoIterator<Item = bool>) -> Self {
        self.bool.extend(bools);
        self
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The exec stack still holds work.
    Continue,
    /// The exec stack is empty.
    Halt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub outcome: StepOutcome,
    /// How many descriptors were executed in this run.
    pub steps: u64,
}

pub struct Machine<'p, E: Entropy> {
    program: &'p [u8],
    code: BoundedStack<Descriptor>,
    exec: BoundedStack<Descriptor>,
    int: BoundedStack<Int>,
    bool: BoundedStack<bool>,
    entropy: E,
    steps: u64,
}

impl<'p> Machine<'p, ContextEntropy> {
    /// A machine whose headroom and entropy come from `config`.
    pub fn from_config(program: &'p [u8], initial: Stacks, config: &VmConfig) -> Self {
        Machine::new(program, initial, config.stack_headroom, config.entropy())
    }
}

impl<'p, E: Entropy> Machine<'p, E> {
    pub fn new(program: &'p [u8], initial: Stacks, headroom: usize, entropy: E) -> Self {
        let Stacks {
            code,
            exec,
            int,
            bool,
        } = initial;
        Self {
            program,
            code: BoundedStack::with_initial(StackKind::Code, code, headroom),
            exec: BoundedStack::with_initial(StackKind::Exec, exec, headroom),
            int: BoundedStack::with_initial(StackKind::Integer, int, headroom),
            bool: BoundedStack::with_initial(StackKind::Boolean, bool, headroom),
            entropy,
            steps: 0,
        }
    }

    /// Total descriptors executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_halted(&self) -> bool {
        self.exec.is_empty()
    }

    pub fn exec_stack(&self) -> &[Descriptor] {
        self.exec.as_slice()
    }

    pub fn int_stack(&self) -> &[Int] {
        self.int.as_slice()
    }

    pub fn bool_stack(&self) -> &[bool] {
        self.bool.as_slice()
    }

    pub fn into_stacks(self) -> Stacks {
        Stacks {
            code: self.code.into_vec(),
            exec: self.exec.into_vec(),
            int: self.int.into_vec(),
            bool: self.bool.into_vec(),
        }
    }

    /// Execute a single descriptor.
    pub fn step(&mut self) -> VmResult<StepOutcome> {
        let Some(desc) = self.exec.pop() else {
            return Ok(StepOutcome::Halt);
        };
        self.steps += 1;
        log::trace!("step {}: {:?}", self.steps, desc);

        match desc.tag() {
            Some(Tag::Sublist) => self.expand(desc)?,
            Some(Tag::IntLiteral) => self.int.push(desc.int_value() as Int)?,
            Some(Tag::BoolLiteral) => self.bool.push(desc.bool_value())?,
            Some(Tag::Instruction) => {
                if let Some(op) = desc.opcode() {
                    self.dispatch(op)?;
                }
            }
            Some(Tag::None) | None => {}
        }

        Ok(if self.exec.is_empty() {
            StepOutcome::Halt
        } else {
            StepOutcome::Continue
        })
    }

    fn expand(&mut self, desc: Descriptor) -> VmResult<()> {
        let (offset, length) = (desc.offset(), desc.length());
        if !parser::window_in_bounds(self.program, offset, length) {
            log::debug!(
                "skipping sublist off=0x{:X} len={} (program len={})",
                offset,
                length,
                self.program.len()
            );
            return Ok(());
        }

        let body = parser::parse_window(self.program, offset, length);
        for d in body.into_iter().rev() {
            self.exec.push(d)?;
        }
        Ok(())
    }

    /// Run until the exec stack drains. Returns the number of steps taken.
    pub fn run(&mut self) -> VmResult<u64> {
        let start = self.steps;
        while self.step()? == StepOutcome::Continue {}
        Ok(self.steps - start)
    }

    /// Run at most `budget` steps.
    pub fn run_for(&mut self, budget: u64) -> VmResult<RunOutcome> {
        let mut steps = 0u64;
        while steps < budget && !self.is_halted() {
            self.step()?;
            steps += 1;
        }
        Ok(RunOutcome {
            outcome: if self.is_halted() {
                StepOutcome::Halt
            } else {
                StepOutcome::Continue
            },
            steps,
        })
    }
}

/// Run `program` from `initial` and return the final stacks.
///
/// With `config.step_budget` set, execution stops after that many steps and the
/// unfinished work is left on the returned exec stack.
pub fn execute(program: &[u8], initial: Stacks, config: &VmConfig) -> VmResult<Stacks> {
    execute_with_entropy(program, initial, config, config.entropy())
}

pub fn execute_with_entropy<E: Entropy>(
    program: &[u8],
    initial: Stacks,
    config: &VmConfig,
    entropy: E,
) -> VmResult<Stacks> {
    let mut machine = Machine::new(program, initial, config.stack_headroom, entropy);
    match config.step_budget {
        Some(budget) => {
            let out = machine.run_for(budget)?;
            if out.outcome == StepOutcome::Continue {
                log::debug!("step budget of {} exhausted", budget);
            }
        }
        None => {
            machine.run()?;
        }
    }
    Ok(machine.into_stacks())
}
