//! Conditions of the `to <label> if ...` instruction.
//!
//! A condition is a chain of comparisons joined by `&&` / `||`:
//!
//! ```text
//! if $0 < 10 && &1 != 0 || $2 == -1
//! ```
//!
//! The chain is folded strictly from left to right with no precedence between
//! connectives, so the example reads as `(($0 < 10) && (&1 != 0)) || ($2 == -1)`.
//! Every comparison is evaluated, even when the result is already decided.

use crate::error::CompileErrorKind;
use crate::lexer::is_comment;
use crate::token::{Comparator, Logic, Operand};

/// `lhs <cmp> rhs`
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Comparison {
    pub lhs: Operand,
    pub cmp: Comparator,
    pub rhs: Operand,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Condition {
    pub first: Comparison,
    /// Following comparisons, each with the connective placed before it
    pub rest: Vec<(Logic, Comparison)>,
}

/// What the token at a given position of the chain must be.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Expect {
    Value,
    Comparator,
    Logic,
}

fn expected_at(position: usize) -> Expect {
    match position % 4 {
        0 | 2 => Expect::Value,
        1 => Expect::Comparator,
        _ => Expect::Logic,
    }
}

impl Condition {
    /// Compile `if <op> <cmp> <op> (<logic> <op> <cmp> <op>)*`, optionally
    /// followed by a comment.
    pub fn compile(tokens: &[&str]) -> Result<Self, CompileErrorKind> {
        match tokens.first() {
            Some(&"if") => {}
            other => {
                return Err(CompileErrorKind::ExpectedIf {
                    received: other.copied().unwrap_or_default().to_string(),
                })
            }
        }

        let body = &tokens[1..];
        let end = (0..body.len())
            .find(|&i| is_comment(&body[i..]))
            .unwrap_or(body.len());
        let body = &body[..end];

        let mut operands = Vec::new();
        let mut comparators = Vec::new();
        let mut connectives = Vec::new();

        for (position, &token) in body.iter().enumerate() {
            let received = || token.to_string();
            match expected_at(position) {
                Expect::Value => operands.push(
                    Operand::resolve(token)
                        .ok_or_else(|| CompileErrorKind::ExpectedValue { received: received() })?,
                ),
                Expect::Comparator => comparators.push(Comparator::new(token).ok_or_else(|| {
                    CompileErrorKind::ExpectedComparator { received: received() }
                })?),
                Expect::Logic => connectives.push(
                    Logic::new(token)
                        .ok_or_else(|| CompileErrorKind::ExpectedLogic { received: received() })?,
                ),
            }
        }

        // The chain must stop right after the second operand of a comparison.
        if body.len() % 4 != 3 {
            let last = body.last().copied().unwrap_or("if");
            return Err(CompileErrorKind::ExpectedEndWithValue {
                received: last.to_string(),
            });
        }

        let mut comparisons = comparators.into_iter().enumerate().map(|(i, cmp)| Comparison {
            lhs: operands[2 * i],
            cmp,
            rhs: operands[2 * i + 1],
        });

        // body.len() >= 3 here, so there is at least one comparison
        let first = match comparisons.next() {
            Some(first) => first,
            None => {
                return Err(CompileErrorKind::ExpectedEndWithValue {
                    received: "if".to_string(),
                })
            }
        };
        let rest = connectives.into_iter().zip(comparisons).collect();

        Ok(Condition { first, rest })
    }

    /// Evaluate the chain, resolving operands with `resolve`.
    ///
    /// Operands of every comparison are resolved, so a resolution error in a
    /// later comparison is reported even if the outcome is already known.
    pub fn evaluate<E>(
        &self,
        mut resolve: impl FnMut(Operand) -> Result<i64, E>,
    ) -> Result<bool, E> {
        let mut compare = |comparison: &Comparison| -> Result<bool, E> {
            let lhs = resolve(comparison.lhs)?;
            let rhs = resolve(comparison.rhs)?;
            Ok(comparison.cmp.compare(lhs, rhs))
        };

        let mut acc = compare(&self.first)?;
        for (logic, comparison) in &self.rest {
            let next = compare(comparison)?;
            acc = logic.combine(acc, next);
        }
        Ok(acc)
    }
}
