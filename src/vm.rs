//! Virtual machine that runs a compiled program

use log::{debug, trace};
use std::fmt;
use thiserror::Error;

use crate::{
    bytecode::{Instruction, Program},
    condition::Condition,
    error::{RuntimeError, RuntimeErrorKind},
    token::{ArithOp, Operand, Register, MEMORY_SIZE},
};

/// One executed `write`
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct OutputRecord {
    /// The operand that was written
    pub operand: Operand,
    /// Address held by the register, for references
    pub target: Option<Register>,
    /// Resolved value
    pub value: i64,
}

impl fmt::Display for OutputRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.operand, self.target) {
            (Operand::Reference(register), Some(target)) => {
                write!(f, "$ [ {} -> {} ] {}", register, target, self.value)
            }
            (Operand::Variable(register), _) | (Operand::Reference(register), None) => {
                write!(f, "$ [ {} ] {}", register, self.value)
            }
            (Operand::Constant(value), _) => write!(f, "$ {}", value),
        }
    }
}

/// A run that stopped on a runtime error, with the output produced until then.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("{error}")]
pub struct Aborted {
    pub output: Vec<OutputRecord>,
    pub error: RuntimeError,
}

/// Run `program` from start to end on a fresh machine.
pub fn execute(program: &Program, input: &[i64]) -> Result<Vec<OutputRecord>, Aborted> {
    let mut vm = Vm::new(program, input);
    match vm.run() {
        Ok(()) => Ok(vm.into_output()),
        Err(error) => Err(Aborted {
            output: vm.into_output(),
            error,
        }),
    }
}

type InsResult = Result<(), RuntimeErrorKind>;
/// `Some(index)` when the instruction moved the pc
type JumpResult = Result<Option<usize>, RuntimeErrorKind>;

/// Virtual machine representation
pub struct Vm<'a> {
    program: &'a Program,
    pc: usize,        // index of the next instruction
    halted: bool,     // set by `halt` or by running off the end
    input: &'a [i64], // values for `read`
    cursor: usize,    // next unread input

    memory: [i64; MEMORY_SIZE],
    output: Vec<OutputRecord>,
}

impl<'a> Vm<'a> {
    pub fn new(program: &'a Program, input: &'a [i64]) -> Self {
        Vm {
            program,
            pc: 0,
            halted: false,
            input,
            cursor: 0,
            memory: [0; MEMORY_SIZE],
            output: Vec::new(),
        }
    }

    /// Run until the program halts or fails.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        debug!(
            "running {} instructions with {} input values",
            self.program.statements().len(),
            self.input.len()
        );

        while !self.halted {
            self.step()?;
        }

        debug!("finished with {} output records", self.output.len());
        Ok(())
    }

    /// Execute a single instruction.
    pub fn step(&mut self) -> Result<(), RuntimeError> {
        let program = self.program;
        let statement = match program.statements().get(self.pc) {
            Some(statement) => statement,
            None => {
                self.halted = true;
                return Ok(());
            }
        };

        trace!("{:>4} | line {}: {:?}", self.pc, statement.line, statement.instruction);

        let jump = match &statement.instruction {
            Instruction::Operation { dest, lhs, rhs } => {
                self.ins_operation(*dest, *lhs, *rhs).map(|()| None)
            }
            Instruction::Jump { label, condition } => self.ins_jump(label, condition.as_ref()),
            Instruction::Write(operand) => self.ins_write(*operand).map(|()| None),
            Instruction::Read { dest, fallback } => self.ins_read(*dest, fallback.as_deref()),
            Instruction::Halt => {
                self.halted = true;
                return Ok(());
            }
        }
        .map_err(|kind| RuntimeError::new(statement.line, kind))?;

        self.pc = match jump {
            Some(target) => target,
            None => self.pc + 1,
        };
        if self.pc >= program.statements().len() {
            self.halted = true;
        }

        Ok(())
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Index of the next instruction
    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn memory(&self) -> &[i64] {
        &self.memory
    }

    pub fn output(&self) -> &[OutputRecord] {
        &self.output
    }

    pub fn into_output(self) -> Vec<OutputRecord> {
        self.output
    }

    /// Register named by the address stored in `register`
    fn deref(&self, register: Register) -> Result<Register, RuntimeErrorKind> {
        let address = self.memory[register.index()];
        Register::from_address(address).ok_or(RuntimeErrorKind::InvalidMemoryAccess {
            register: register.index() as u16,
            address,
        })
    }

    /// Value of an operand
    fn resolve(&self, operand: Operand) -> Result<i64, RuntimeErrorKind> {
        match operand {
            Operand::Constant(value) => Ok(value),
            Operand::Variable(register) => Ok(self.memory[register.index()]),
            Operand::Reference(register) => Ok(self.memory[self.deref(register)?.index()]),
        }
    }

    /// Store into a variable, or through a reference
    fn store(&mut self, dest: Operand, value: i64) -> InsResult {
        let register = match dest {
            Operand::Variable(register) => register,
            Operand::Reference(register) => self.deref(register)?,
            Operand::Constant(value) => {
                return Err(RuntimeErrorKind::ConstantDestination { value })
            }
        };
        self.memory[register.index()] = value;
        Ok(())
    }

    /// `dest = lhs [op rhs]`
    fn ins_operation(
        &mut self,
        dest: Operand,
        lhs: Operand,
        rhs: Option<(ArithOp, Operand)>,
    ) -> InsResult {
        let lhs = self.resolve(lhs)?;
        let value = match rhs {
            Some((op, rhs)) => {
                let rhs = self.resolve(rhs)?;
                op.apply(lhs, rhs).ok_or(RuntimeErrorKind::DivisionByZero)?
            }
            None => lhs,
        };
        self.store(dest, value)
    }

    /// Jump to `label` if there is no condition or it holds
    fn ins_jump(&self, label: &str, condition: Option<&Condition>) -> JumpResult {
        let taken = match condition {
            Some(condition) => condition.evaluate(|operand| self.resolve(operand))?,
            None => true,
        };
        if taken {
            Ok(Some(self.label(label)?))
        } else {
            Ok(None)
        }
    }

    /// Append the value to the output
    fn ins_write(&mut self, operand: Operand) -> InsResult {
        let value = self.resolve(operand)?;
        let target = match operand {
            Operand::Reference(register) => Some(self.deref(register)?),
            _ => None,
        };
        self.output.push(OutputRecord {
            operand,
            target,
            value,
        });
        Ok(())
    }

    /// Consume one input value, falling back to `fallback` when there is none
    fn ins_read(&mut self, dest: Operand, fallback: Option<&str>) -> JumpResult {
        match self.input.get(self.cursor) {
            Some(&value) => {
                self.store(dest, value)?;
                self.cursor += 1;
                Ok(None)
            }
            None => match fallback {
                Some(label) => Ok(Some(self.label(label)?)),
                None => Err(RuntimeErrorKind::InputExhausted),
            },
        }
    }

    /// Instruction index of a label
    fn label(&self, label: &str) -> Result<usize, RuntimeErrorKind> {
        self.program
            .label(label)
            .ok_or_else(|| RuntimeErrorKind::UndefinedLabel {
                label: label.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{Parser, Statement};
    use std::collections::HashMap;

    fn compile(program: &str) -> Program {
        Parser::new(program).parse().unwrap()
    }

    fn run(program: &str, input: &[i64]) -> Result<Vec<OutputRecord>, Aborted> {
        execute(&compile(program), input)
    }

    fn values(output: &[OutputRecord]) -> Vec<i64> {
        output.iter().map(|record| record.value).collect()
    }

    #[test]
    fn arithmetic() {
        let program = r"
            $0 = 6
            $1 = $0 + 4
            $2 = $0 * 4
            $3 = $0 - 10
            $4 = -7 / 2
            write $1
            write $2
            write $3
            write $4
        ";
        let output = run(program, &[]).unwrap();
        assert_eq!(values(&output), vec![10, 24, -4, -3]);
    }

    #[test]
    fn end_to_end_sum() {
        let output = run("$0 = 3\n$1 = 4\n$2 = $0 + $1\nwrite $2", &[]).unwrap();
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].operand, Operand::Variable(Register::new(2).unwrap()));
        assert_eq!(output[0].value, 7);
        assert_eq!(output[0].to_string(), "$ [ 2 ] 7");
    }

    #[test]
    fn reference_round_trip() {
        let output = run("$0 = 1\n$1 = 99\nwrite &0\nwrite 5", &[]).unwrap();
        assert_eq!(output[0].target, Register::new(1));
        assert_eq!(output[0].value, 99);
        assert_eq!(output[0].to_string(), "$ [ 0 -> 1 ] 99");
        assert_eq!(output[1].to_string(), "$ 5");
    }

    #[test]
    fn store_through_reference() {
        let program = compile("$0 = 10\n&0 = 42\nread &0");
        let mut vm = Vm::new(&program, &[7]);
        vm.step().unwrap();
        vm.step().unwrap();
        assert_eq!(vm.memory()[10], 42);
        assert_eq!(vm.memory()[0], 10);
        vm.run().unwrap();
        assert_eq!(vm.memory()[10], 7);
    }

    #[test]
    fn invalid_reference() {
        let err = run("write 1\n$0 = 1024\nwrite &0", &[]).unwrap_err();
        assert_eq!(values(&err.output), vec![1]);
        assert_eq!(err.error.line, 3);
        assert_eq!(
            err.error.kind,
            RuntimeErrorKind::InvalidMemoryAccess {
                register: 0,
                address: 1024
            }
        );

        let err = run("$5 = -1\n&5 = 3", &[]).unwrap_err();
        assert_eq!(err.error.line, 2);
    }

    #[test]
    fn division_by_zero_keeps_destination() {
        let program = compile("$0 = 8\n$0 = 4 / 0");
        let mut vm = Vm::new(&program, &[]);
        let err = vm.run().unwrap_err();
        assert_eq!(err, RuntimeError::new(2, RuntimeErrorKind::DivisionByZero));
        assert_eq!(vm.memory()[0], 8);
    }

    #[test]
    fn conditional_loop() {
        let program = r"
            $0 = 3
            loop:
                write $0
                $0 = $0 - 1
                to loop if $0 > 0
        ";
        assert_eq!(values(&run(program, &[]).unwrap()), vec![3, 2, 1]);
    }

    #[test]
    fn condition_resolves_every_operand() {
        // The first comparison is false, the second still dereferences &1.
        let program = "$1 = 2000\nto end if $0 == 1 && &1 == 0\nend:";
        let err = run(program, &[]).unwrap_err();
        assert_eq!(err.error.line, 2);
        assert!(matches!(
            err.error.kind,
            RuntimeErrorKind::InvalidMemoryAccess { register: 1, .. }
        ));
    }

    #[test]
    fn read_input() {
        // $1 holds 0, so `read &1` overwrites $0
        let output = run("read $0\nwrite $0\nread &1\nwrite $0", &[5, 6]).unwrap();
        assert_eq!(values(&output), vec![5, 6]);
    }

    #[test]
    fn read_exhausted() {
        let err = run("read $0\nread $1", &[1]).unwrap_err();
        assert_eq!(err.error, RuntimeError::new(2, RuntimeErrorKind::InputExhausted));
    }

    #[test]
    fn read_through_invalid_reference() {
        let err = run("$0 = -1\nread &0", &[1]).unwrap_err();
        assert_eq!(
            err.error,
            RuntimeError::new(
                2,
                RuntimeErrorKind::InvalidMemoryAccess {
                    register: 0,
                    address: -1
                }
            )
        );
    }

    #[test]
    fn unknown_label_is_an_error() {
        let jump = Statement {
            line: 1,
            instruction: Instruction::Jump {
                label: "nowhere".into(),
                condition: None,
            },
        };
        let program = Program::new(vec![jump], HashMap::new());
        let err = execute(&program, &[]).unwrap_err();
        assert_eq!(
            err.error.kind,
            RuntimeErrorKind::UndefinedLabel {
                label: "nowhere".into()
            }
        );

        let read = Statement {
            line: 4,
            instruction: Instruction::Read {
                dest: Operand::Variable(Register::new(0).unwrap()),
                fallback: Some("gone".into()),
            },
        };
        let program = Program::new(vec![read], HashMap::new());
        let err = execute(&program, &[]).unwrap_err();
        assert_eq!(err.error.line, 4);
    }

    #[test]
    fn constant_destination_is_an_error() {
        let assign = Statement {
            line: 2,
            instruction: Instruction::Operation {
                dest: Operand::Constant(3),
                lhs: Operand::Constant(1),
                rhs: None,
            },
        };
        let program = Program::new(vec![assign], HashMap::new());
        let err = execute(&program, &[]).unwrap_err();
        assert_eq!(
            err.error,
            RuntimeError::new(2, RuntimeErrorKind::ConstantDestination { value: 3 })
        );
    }

    #[test]
    fn read_fallback() {
        let program = r"
            loop:
                read $1 done
                $0 = $0 + $1
                to loop
            done:
                write $0
        ";
        assert_eq!(values(&run(program, &[1, 2, 3]).unwrap()), vec![6]);
        assert_eq!(values(&run(program, &[]).unwrap()), vec![0]);
    }

    #[test]
    fn halt() {
        let output = run("write 1\nhalt\nwrite 2", &[]).unwrap();
        assert_eq!(values(&output), vec![1]);
    }

    #[test]
    fn jump_to_trailing_label_ends_program() {
        let program = compile("to end\nwrite 1\nend:");
        let mut vm = Vm::new(&program, &[]);
        vm.step().unwrap();
        assert!(vm.is_halted());
        assert_eq!(vm.pc(), 2);
        assert!(vm.output().is_empty());
    }

    #[test]
    fn jump_to_own_label() {
        let program = compile("loop:\nto loop\nwrite 1");
        let mut vm = Vm::new(&program, &[]);
        vm.step().unwrap();
        vm.step().unwrap();
        assert_eq!(vm.pc(), 0);
        assert!(!vm.is_halted());
    }

    #[test]
    fn empty_program() {
        assert_eq!(run("# nothing\n", &[]).unwrap(), vec![]);
    }
}
