//! push3-vm
//!
//! A deterministic Push3-style stack machine for evolved programs. Programs are
//! arbitrary byte strings; the parser turns them into 256-bit descriptors and the
//! machine runs those against code, exec, integer and boolean stacks.
//!
//! Malformed input is tolerated: truncated tokens end a window, unknown bytes are
//! no-ops and starved opcodes are skipped. The only faults are an oversized
//! descriptor payload and a full stack, reported as [`VmError`].

pub mod adapter;
pub mod config;
pub mod descriptor;
pub mod entropy;
pub mod error;
pub mod opcode;
pub mod parser;
pub mod program;
pub mod vm;

pub use adapter::{run_binary, run_program, run_unary, ProgramInputs};
pub use config::VmConfig;
pub use descriptor::{Descriptor, Tag};
pub use entropy::{ContextEntropy, Entropy};
pub use error::{VmError, VmResult};
pub use opcode::Opcode;
pub use parser::parse_window;
pub use vm::{execute, execute_with_entropy, Int, Machine, RunOutcome, Stacks, StepOutcome};
