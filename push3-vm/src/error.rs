use crate::vm::StackKind;

/// Faults that abort an execution.
///
/// Malformed programs never end up here: truncated tokens, bad sublist bounds,
/// unknown bytes and starved opcodes are all absorbed by the parser and the
/// machine. Only these two conditions mark a program as invalid.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("descriptor payload does not fit in 184 bits (needs {bits} bits)")]
    PayloadOverflow { bits: usize },

    #[error("{stack} stack overflow (capacity={capacity})")]
    StackOverflow { stack: StackKind, capacity: usize },
}

pub type VmResult<T> = std::result::Result<T, VmError>;
