use crate::params::{Term, TypedArgList};
use derive_more::derive::Display;
use std::str::FromStr;

/// Application of a predicate, e.g., `(at ?r rooma)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Predicate {
    pub name: String,
    pub args: Vec<Term>,
}

impl Predicate {
    pub fn new(name: impl Into<String>, args: Vec<Term>) -> Self {
        Predicate { name: name.into(), args }
    }
}

/// Declaration of a predicate in the `:predicates` section, e.g., `(at ?r - robot ?l - room)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PredicateDef {
    pub name: String,
    pub params: TypedArgList,
}

/// Declaration of a numeric function in the `:functions` section, e.g., `(battery ?r - robot) - number`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: String,
    pub params: TypedArgList,
    /// Return type annotation, as allowed since PDDL 3.1
    pub return_type: Option<String>,
}

/// Application of a numeric function, e.g., `(battery ?r)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FHead {
    pub name: String,
    pub args: Vec<Term>,
}

impl FHead {
    pub fn new(name: impl Into<String>, args: Vec<Term>) -> Self {
        FHead { name: name.into(), args }
    }
}

/// Numeric literal. Two constants are equal if they have the same value.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Display)]
#[display("{_0}")]
pub struct ConstantNumber(pub f64);

impl FromStr for ConstantNumber {
    type Err = std::num::ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(ConstantNumber)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum NumericOp {
    #[display("+")]
    Add,
    #[display("-")]
    Sub,
    #[display("*")]
    Mul,
    #[display("/")]
    Div,
}

impl FromStr for NumericOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(NumericOp::Add),
            "-" => Ok(NumericOp::Sub),
            "*" => Ok(NumericOp::Mul),
            "/" => Ok(NumericOp::Div),
            _ => Err(format!("unknown numeric operator `{s}`")),
        }
    }
}

/// Operation on numeric expressions. Unary negation is the operator `-` without a right-hand side.
#[derive(Clone, Debug, PartialEq)]
pub struct FExpression {
    pub op: NumericOp,
    pub lhs: Box<NumericExpr>,
    pub rhs: Option<Box<NumericExpr>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NumericExpr {
    Number(ConstantNumber),
    Head(FHead),
    Op(FExpression),
}

impl NumericExpr {
    pub fn number(value: f64) -> Self {
        NumericExpr::Number(ConstantNumber(value))
    }

    pub fn binary(op: NumericOp, lhs: NumericExpr, rhs: NumericExpr) -> Self {
        NumericExpr::Op(FExpression {
            op,
            lhs: Box::new(lhs),
            rhs: Some(Box::new(rhs)),
        })
    }

    pub fn negation(e: NumericExpr) -> Self {
        NumericExpr::Op(FExpression {
            op: NumericOp::Sub,
            lhs: Box::new(e),
            rhs: None,
        })
    }

    /// Value of the expression if it is a numeric literal.
    pub fn as_constant(&self) -> Option<f64> {
        match self {
            NumericExpr::Number(ConstantNumber(v)) => Some(*v),
            _ => None,
        }
    }
}

impl From<FHead> for NumericExpr {
    fn from(head: FHead) -> Self {
        NumericExpr::Head(head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants() {
        assert_eq!("2.5".parse::<ConstantNumber>(), Ok(ConstantNumber(2.5)));
        assert_eq!(ConstantNumber(5.0), ConstantNumber(5.0));
        assert_eq!(NumericExpr::number(3.0).as_constant(), Some(3.0));
        assert_eq!(NumericExpr::from(FHead::new("f", vec![])).as_constant(), None);
        assert!("x".parse::<NumericOp>().is_err());
        assert_eq!("*".parse::<NumericOp>(), Ok(NumericOp::Mul));
    }
}
