use thiserror::Error;

pub type CrimsonResult<T> = Result<T, CrimsonError>;

/// Errors surfaced while resolving or running a Crimson program.
///
/// Structural errors abort before any statement runs; value faults abort the
/// current run at the failing statement. Lenient parse gaps (missing
/// identifiers, unknown call targets) are deliberately not errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CrimsonError {
    #[error("no main function found; code must be inside void main() or int main() to execute")]
    NoEntryFunction,
    #[error("main function not properly closed with }}")]
    UnclosedEntryBlock,
    #[error("line {line}: code outside main function is not allowed; all executable code must be inside main()")]
    CodeOutsideEntry { line: usize },
    #[error("non-numeric operand '{text}' in comparison")]
    NonNumericOperand { text: String },
    #[error("Sleep expects a numeric argument, got '{text}'")]
    SleepArgument { text: String },
    #[error("i/o error: {0}")]
    Io(String),
}

pub(crate) fn map_io_error(err: std::io::Error) -> CrimsonError {
    CrimsonError::Io(err.to_string())
}
