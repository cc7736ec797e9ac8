//! Operands and operator symbols of the language.

use std::fmt;

/// Number of cells in the virtual machine memory.
pub const MEMORY_SIZE: usize = 1024;

/// Index of a memory cell, always in `0..MEMORY_SIZE`.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Register(u16);

impl Register {
    pub fn new(index: usize) -> Option<Self> {
        if index < MEMORY_SIZE {
            Some(Register(index as u16))
        } else {
            None
        }
    }

    /// Register named by a memory cell value, if the value is a valid address.
    pub fn from_address(address: i64) -> Option<Self> {
        usize::try_from(address).ok().and_then(Register::new)
    }

    /// Parse the decimal part of `$N` / `&N`.
    fn parse(digits: &str) -> Option<Self> {
        digits.parse::<usize>().ok().and_then(Register::new)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A value source or destination.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Operand {
    /// Immediate value, eg. `-12`
    Constant(i64),
    /// Direct register access, eg. `$3`
    Variable(Register),
    /// Access through the address held by a register, eg. `&3`
    Reference(Register),
}

impl Operand {
    /// Classify a token. Variables win over references, references over
    /// constants.
    pub fn resolve(token: &str) -> Option<Self> {
        if let Some(digits) = token.strip_prefix('$') {
            return Register::parse(digits).map(Operand::Variable);
        }
        if let Some(digits) = token.strip_prefix('&') {
            return Register::parse(digits).map(Operand::Reference);
        }
        token.parse::<i64>().ok().map(Operand::Constant)
    }

    /// Operands that can be stored into.
    pub fn is_place(&self) -> bool {
        !matches!(self, Operand::Constant(_))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Constant(value) => write!(f, "{}", value),
            Operand::Variable(register) => write!(f, "${}", register),
            Operand::Reference(register) => write!(f, "&{}", register),
        }
    }
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub fn new(token: &str) -> Option<Self> {
        match token {
            "+" => Some(ArithOp::Add),
            "-" => Some(ArithOp::Sub),
            "*" => Some(ArithOp::Mul),
            "/" => Some(ArithOp::Div),
            _ => None,
        }
    }

    /// Apply the operator with wrapping semantics. `None` on division by zero.
    pub fn apply(self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            ArithOp::Add => Some(lhs.wrapping_add(rhs)),
            ArithOp::Sub => Some(lhs.wrapping_sub(rhs)),
            ArithOp::Mul => Some(lhs.wrapping_mul(rhs)),
            ArithOp::Div if rhs == 0 => None,
            ArithOp::Div => Some(lhs.wrapping_div(rhs)),
        }
    }
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Comparator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl Comparator {
    pub fn new(token: &str) -> Option<Self> {
        match token {
            "==" => Some(Comparator::Eq),
            "!=" => Some(Comparator::Ne),
            ">" => Some(Comparator::Gt),
            "<" => Some(Comparator::Lt),
            ">=" => Some(Comparator::Ge),
            "<=" => Some(Comparator::Le),
            _ => None,
        }
    }

    pub fn compare(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Comparator::Eq => lhs == rhs,
            Comparator::Ne => lhs != rhs,
            Comparator::Gt => lhs > rhs,
            Comparator::Lt => lhs < rhs,
            Comparator::Ge => lhs >= rhs,
            Comparator::Le => lhs <= rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Logic {
    And,
    Or,
}

impl Logic {
    pub fn new(token: &str) -> Option<Self> {
        match token {
            "&&" => Some(Logic::And),
            "||" => Some(Logic::Or),
            _ => None,
        }
    }

    pub fn combine(self, acc: bool, next: bool) -> bool {
        match self {
            Logic::And => acc && next,
            Logic::Or => acc || next,
        }
    }
}
