//! Register assembly (regasm) is a compiler and virtual machine for a tiny
//! assembly-like language working on 1024 cells of 64-bit memory.
//!
//! # Example
//!
//! ```text
//! # sums the input until it runs out
//! loop:
//!     read $1 done
//!     $0 = $0 + $1
//!     to loop
//! done:
//!     write $0
//! ```
//!
//! # Operands
//!
//! | Operand | Usage | Brief |
//! |---------|-------|-------|
//! | Constant  | `-12` | A signed 64-bit integer. |
//! | Variable  | `$N`  | Memory cell `N`, `0 <= N <= 1023`. |
//! | Reference | `&N`  | Memory cell whose address is stored in cell `N`. |
//!
//! # Instructions
//!
//! | Instruction | Usage                      | Brief   |
//! |-------------|----------------------------|---------|
//! | Operation   | `$d = $a [op $b]`          | Store `$a op $b` (or `$a`) into `$d`. `op` is one of `+ - * /`. |
//! | Jump        | `to label [if ...]`        | Jump to `label`, if the condition holds. |
//! | Write       | `write value`              | Append `value` to the output. |
//! | Read        | `read $d [label]`          | Store the next input value into `$d`, or jump to `label` when the input is exhausted. |
//! | Halt        | `halt`                     | Stop the program. |
//!
//! A condition is `if $a cmp $b` with `cmp` one of `== != > < >= <=`, chained
//! with `&&` / `||`. Chains are evaluated left to right without precedence and
//! without short-circuiting.
//!
//! # Important notes
//!
//! - Each instruction is on its own line. `label:` lines mark the next instruction.
//! - `#` starts a comment, either on its own line or after an instruction.
//! - The program stops after its last instruction or at `halt`.
//! - Reading or writing through a reference that holds an address outside of
//!   memory stops the program with an error, as does division by zero.

pub mod bytecode;
pub mod condition;
pub mod error;
pub mod input;
mod lexer;
pub mod token;
pub mod vm;

pub use bytecode::Program;
pub use error::{CompileError, RuntimeError};
pub use vm::{execute, Aborted, OutputRecord, Vm};

/// Compile program text.
pub fn compile(program: &str) -> Result<Program, CompileError> {
    bytecode::Parser::new(program).parse()
}
