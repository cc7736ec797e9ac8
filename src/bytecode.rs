//! Compiled program representation

use log::debug;
use std::collections::HashMap;

use crate::{
    condition::Condition,
    error::{CompileError, CompileErrorKind},
    lexer::{is_comment, is_word, Lexer, Line},
    token::{ArithOp, Operand},
};

/// Representation of a compiled program. Only built by `Parser::parse`.
#[derive(Debug, Clone)]
pub struct Program {
    /// Instructions from top to bottom
    statements: Vec<Statement>,
    /// Maps label name to the index of the instruction that follows it
    labels: HashMap<String, usize>,
}

impl Program {
    pub(crate) fn new(statements: Vec<Statement>, labels: HashMap<String, usize>) -> Self {
        Program { statements, labels }
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn labels(&self) -> &HashMap<String, usize> {
        &self.labels
    }

    /// Index of the instruction following `label`.
    pub fn label(&self, label: &str) -> Option<usize> {
        self.labels.get(label).copied()
    }
}

/// Instruction with the source line it was compiled from
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Statement {
    /// 1-based line number
    pub line: usize,
    pub instruction: Instruction,
}

/// Supported instructions
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Instruction {
    /// `dest = lhs [op rhs]`, a plain copy when there is no operator
    Operation {
        dest: Operand,
        lhs: Operand,
        rhs: Option<(ArithOp, Operand)>,
    },
    /// Jump to a label, if the condition holds
    Jump {
        label: String,
        condition: Option<Condition>,
    },
    /// Append a value to the output
    Write(Operand),
    /// Take the next input value, or jump to the fallback label when there is none
    Read {
        dest: Operand,
        fallback: Option<String>,
    },
    /// Stop the program
    Halt,
}

impl Instruction {
    /// Labels this instruction may transfer control to.
    fn target(&self) -> Option<&str> {
        match self {
            Instruction::Jump { label, .. } => Some(label.as_str()),
            Instruction::Read { fallback, .. } => fallback.as_deref(),
            _ => None,
        }
    }
}

type MatchRes = Result<Option<Instruction>, CompileErrorKind>;
type MatchFn = fn(&[&str]) -> MatchRes;

/// Order matters: an operation is recognized by any `=` in the line, so the
/// keyword instructions have to get their chance first. A matcher that knows
/// the line but finds it malformed fails instead of passing it on.
const MATCHERS: [MatchFn; 5] = [
    match_jump,
    match_halt,
    match_write,
    match_operation,
    match_read,
];

fn joined(tokens: &[&str]) -> String {
    tokens.join(" ")
}

fn token_at(tokens: &[&str], index: usize) -> String {
    tokens.get(index).copied().unwrap_or_default().to_string()
}

/// `to <label> [if ...]`
fn match_jump(tokens: &[&str]) -> MatchRes {
    if tokens[0] != "to" {
        return Ok(None);
    }

    let label = match tokens.get(1) {
        Some(label) if is_word(label) => label.to_string(),
        _ => {
            return Err(CompileErrorKind::InvalidLabel {
                received: token_at(tokens, 1),
            })
        }
    };

    let rest = &tokens[2..];
    let condition = if is_comment(rest) {
        None
    } else if rest[0] == "if" {
        Some(Condition::compile(rest)?)
    } else {
        return Err(CompileErrorKind::InvalidLabel {
            received: joined(rest),
        });
    };

    Ok(Some(Instruction::Jump { label, condition }))
}

/// `halt`
fn match_halt(tokens: &[&str]) -> MatchRes {
    if tokens[0] != "halt" {
        return Ok(None);
    }
    if !is_comment(&tokens[1..]) {
        return Err(CompileErrorKind::HaltParameter {
            received: joined(&tokens[1..]),
        });
    }
    Ok(Some(Instruction::Halt))
}

/// `write <operand>`
fn match_write(tokens: &[&str]) -> MatchRes {
    if tokens[0] != "write" {
        return Ok(None);
    }
    let value = tokens
        .get(1)
        .and_then(|token| Operand::resolve(token))
        .ok_or_else(|| CompileErrorKind::WriteExpectedValue {
            received: token_at(tokens, 1),
        })?;
    if !is_comment(&tokens[2..]) {
        return Err(CompileErrorKind::WriteTooManyValues {
            received: joined(&tokens[2..]),
        });
    }
    Ok(Some(Instruction::Write(value)))
}

/// `<dest> = <lhs> [<op> <rhs>]`
fn match_operation(tokens: &[&str]) -> MatchRes {
    let code_len = (0..tokens.len())
        .find(|&i| is_comment(&tokens[i..]))
        .unwrap_or(tokens.len());
    let mut assignments = tokens[..code_len]
        .iter()
        .enumerate()
        .filter(|(_, token)| **token == "=")
        .map(|(i, _)| i);

    let assign = match assignments.next() {
        Some(i) => i,
        None => return Ok(None),
    };
    if let Some(extra) = assignments.next() {
        return Err(CompileErrorKind::OnlyOneLeftValue {
            received: joined(&tokens[..extra]),
        });
    }
    match assign {
        0 => {
            return Err(CompileErrorKind::InvalidLeftValue {
                received: joined(&tokens[..code_len]),
            })
        }
        1 => {}
        _ => {
            return Err(CompileErrorKind::OnlyOneLeftValue {
                received: joined(&tokens[..assign]),
            })
        }
    }

    let dest = Operand::resolve(tokens[0])
        .filter(Operand::is_place)
        .ok_or_else(|| CompileErrorKind::InvalidLeftValue {
            received: tokens[0].to_string(),
        })?;

    let lhs = tokens
        .get(2)
        .and_then(|token| Operand::resolve(token))
        .ok_or_else(|| CompileErrorKind::InvalidFirstRightValue {
            received: token_at(tokens, 2),
        })?;

    if is_comment(&tokens[3..]) {
        return Ok(Some(Instruction::Operation {
            dest,
            lhs,
            rhs: None,
        }));
    }

    let op = ArithOp::new(tokens[3]).ok_or_else(|| CompileErrorKind::InvalidOperator {
        received: tokens[3].to_string(),
    })?;

    let rhs = tokens
        .get(4)
        .and_then(|token| Operand::resolve(token))
        .ok_or_else(|| CompileErrorKind::InvalidSecondRightValue {
            received: token_at(tokens, 4),
        })?;

    let rest = tokens.get(5..).unwrap_or_default();
    if !is_comment(rest) {
        return Err(CompileErrorKind::OperationNotFinished {
            received: joined(rest),
        });
    }

    Ok(Some(Instruction::Operation {
        dest,
        lhs,
        rhs: Some((op, rhs)),
    }))
}

/// `read <dest> [fallback_label]`
fn match_read(tokens: &[&str]) -> MatchRes {
    if tokens[0] != "read" {
        return Ok(None);
    }

    let dest = tokens
        .get(1)
        .and_then(|token| Operand::resolve(token))
        .filter(Operand::is_place)
        .ok_or_else(|| CompileErrorKind::ReadInvalidDestination {
            received: token_at(tokens, 1),
        })?;

    let rest = tokens.get(2..).unwrap_or_default();
    if is_comment(rest) {
        return Ok(Some(Instruction::Read {
            dest,
            fallback: None,
        }));
    }

    if !is_word(rest[0]) {
        return Err(CompileErrorKind::ReadInvalidFallback {
            received: rest[0].to_string(),
        });
    }
    if !is_comment(&rest[1..]) {
        return Err(CompileErrorKind::ReadNotFinished {
            received: joined(&rest[1..]),
        });
    }

    Ok(Some(Instruction::Read {
        dest,
        fallback: Some(rest[0].to_string()),
    }))
}

/// Compiles program text into a `Program`
pub struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(program: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(program),
        }
    }

    /// Compile every line, then check that all referenced labels exist.
    pub fn parse(mut self) -> Result<Program, CompileError> {
        let mut statements = Vec::new();
        let mut labels = HashMap::new();

        while let Some((line, kind)) = self.lexer.next_line() {
            match kind {
                Line::Comment => {}
                Line::Label(name) => {
                    // Redefinition of a label
                    if labels.contains_key(name) {
                        return Err(CompileError::new(
                            line,
                            CompileErrorKind::DuplicateLabel {
                                label: name.to_string(),
                            },
                        ));
                    }
                    labels.insert(name.to_string(), statements.len());
                }
                Line::Code(tokens) => {
                    let instruction =
                        Self::match_instruction(&tokens).map_err(|kind| CompileError::new(line, kind))?;
                    statements.push(Statement { line, instruction });
                }
            }
        }

        for statement in &statements {
            if let Some(label) = statement.instruction.target() {
                if !labels.contains_key(label) {
                    return Err(CompileError::new(
                        statement.line,
                        CompileErrorKind::UndefinedLabel {
                            label: label.to_string(),
                        },
                    ));
                }
            }
        }

        debug!(
            "compiled {} instructions, {} labels",
            statements.len(),
            labels.len()
        );

        Ok(Program::new(statements, labels))
    }

    /// Run the matchers in order on a non-empty token list
    fn match_instruction(tokens: &[&str]) -> Result<Instruction, CompileErrorKind> {
        for matcher in MATCHERS {
            if let Some(instruction) = matcher(tokens)? {
                return Ok(instruction);
            }
        }
        Err(CompileErrorKind::UnrecognizedInstruction {
            received: joined(tokens),
        })
    }
}
