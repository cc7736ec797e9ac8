//! Errors reported by the compiler, the virtual machine and the input loader.
//!
//! Every error carries the 1-based source line it was raised at, so the caller
//! can render or translate it however it likes.

use thiserror::Error;

/// Failure to compile a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[compilation error: line {line}] {kind}")]
pub struct CompileError {
    pub line: usize,
    pub kind: CompileErrorKind,
}

impl CompileError {
    pub fn new(line: usize, kind: CompileErrorKind) -> Self {
        CompileError { line, kind }
    }
}

/// What went wrong while compiling a line.
///
/// `received` fields hold the offending tokens joined by a single space.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileErrorKind {
    #[error("<?> unrecognized instruction: {received}")]
    UnrecognizedInstruction { received: String },

    #[error("<op> must have only one left value, but received: {received}")]
    OnlyOneLeftValue { received: String },
    #[error("<op> invalid left value: {received}")]
    InvalidLeftValue { received: String },
    #[error("<op> invalid first right value: {received}")]
    InvalidFirstRightValue { received: String },
    #[error("<op> invalid operator, expected (+, -, *, /), but received: {received}")]
    InvalidOperator { received: String },
    #[error("<op> invalid second right value: {received}")]
    InvalidSecondRightValue { received: String },
    #[error("<op> expected the operation to finish, but received: {received}")]
    OperationNotFinished { received: String },

    #[error("<to> expected a valid label, but received: {received}")]
    InvalidLabel { received: String },

    #[error("<if> expected 'if', but received: {received}")]
    ExpectedIf { received: String },
    #[error("<if> expected a value, but received: {received}")]
    ExpectedValue { received: String },
    #[error("<if> expected a comparator (==, !=, >, <, >=, <=), but received: {received}")]
    ExpectedComparator { received: String },
    #[error("<if> expected a logic connective (&&, ||), but received: {received}")]
    ExpectedLogic { received: String },
    #[error("<if> expected the condition to end with a value, but received: {received}")]
    ExpectedEndWithValue { received: String },

    #[error("<halt> expected no parameter, but received: {received}")]
    HaltParameter { received: String },

    #[error("<write> expected a value, but received: {received}")]
    WriteExpectedValue { received: String },
    #[error("<write> expected only one value, but received: {received}")]
    WriteTooManyValues { received: String },

    #[error("<read> expected a variable or reference, but received: {received}")]
    ReadInvalidDestination { received: String },
    #[error("<read> expected a valid fallback label, but received: {received}")]
    ReadInvalidFallback { received: String },
    #[error("<read> expected the instruction to finish, but received: {received}")]
    ReadNotFinished { received: String },

    #[error("<label> label already defined: {label}")]
    DuplicateLabel { label: String },
    #[error("<label> label not defined: {label}")]
    UndefinedLabel { label: String },
}

/// Failure while executing a compiled program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[execution error: line {line}] {kind}")]
pub struct RuntimeError {
    pub line: usize,
    pub kind: RuntimeErrorKind,
}

impl RuntimeError {
    pub fn new(line: usize, kind: RuntimeErrorKind) -> Self {
        RuntimeError { line, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeErrorKind {
    /// A reference register holds an address outside of memory.
    #[error("<memory> invalid memory access: &{register} holds {address}")]
    InvalidMemoryAccess { register: u16, address: i64 },
    #[error("<arith> division by zero")]
    DivisionByZero,
    #[error("<read> input exhausted")]
    InputExhausted,
    #[error("<label> label not defined: {label}")]
    UndefinedLabel { label: String },
    #[error("<op> cannot store into constant {value}")]
    ConstantDestination { value: i64 },
}

/// A line of the input stream that is not a base-10 integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[input error: {source_name} line {line}] expected an integer, but received: {text}")]
pub struct InputError {
    pub source_name: String,
    pub line: usize,
    pub text: String,
}
