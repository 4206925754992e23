//! Fixed-arity wrappers around [`execute`] for callers that only care about
//! integers in and integers out.

use crate::config::VmConfig;
use crate::descriptor::Descriptor;
use crate::error::VmResult;
use crate::vm::{execute, Int, Stacks};

/// Everything one invocation starts from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramInputs {
    pub code: Vec<u8>,
    pub code_stack: Vec<Descriptor>,
    pub exec_stack: Vec<Descriptor>,
    pub int_stack: Vec<Int>,
    pub bool_stack: Vec<bool>,
}

impl ProgramInputs {
    /// The whole of `code` as one sublist on the exec stack, with `ints` preloaded.
    pub fn new(code: impl Into<Vec<u8>>, ints: impl IntoIterator<Item = Int>) -> Self {
        let code = code.into();
        let Stacks {
            code: code_stack,
            exec: exec_stack,
            ..
        } = Stacks::for_program(&code);
        Self {
            code,
            code_stack,
            exec_stack,
            int_stack: ints.into_iter().collect(),
            bool_stack: Vec::new(),
        }
    }

    pub fn run(self, config: &VmConfig) -> VmResult<Stacks> {
        let initial = Stacks {
            code: self.code_stack,
            exec: self.exec_stack,
            int: self.int_stack,
            bool: self.bool_stack,
        };
        execute(&self.code, initial, config)
    }
}

pub fn run_program(
    code: &[u8],
    ints: impl IntoIterator<Item = Int>,
    config: &VmConfig,
) -> VmResult<Stacks> {
    execute(code, Stacks::for_program(code).with_ints(ints), config)
}

/// Top of the integer stack after running `code` on `[x]`.
pub fn run_unary(code: &[u8], x: Int, config: &VmConfig) -> VmResult<Option<Int>> {
    let out = run_program(code, [x], config)?;
    Ok(out.int.last().copied())
}

/// `(second, top)` of the integer stack after running `code` on `[x, y]`.
pub fn run_binary(
    code: &[u8],
    x: Int,
    y: Int,
    config: &VmConfig,
) -> VmResult<Option<(Int, Int)>> {
    let out = run_program(code, [x, y], config)?;
    Ok(match out.int.as_slice() {
        [.., second, top] => Some((*second, *top)),
        _ => None,
    })
}
