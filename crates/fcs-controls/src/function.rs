//! Arithmetic expression trees for generic function components.

use fcs_props::PropertyStore;

use crate::component::{ComponentCore, ComponentModel};
use crate::context::FrameContext;
use crate::error::{ControlError, ControlResult};
use crate::parameter::Parameter;
use crate::table::Table;

/// Operators taking a list of operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaryOp {
    Sum,
    Difference,
    Product,
    Min,
    Max,
}

/// Operators taking one operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Abs,
    Sin,
    Cos,
    Tan,
    Sqrt,
}

/// Expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Param(Parameter),
    Table(Box<Table>),
    Nary(NaryOp, Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Quotient(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// N-ary node. At least one operand is required.
    pub fn nary(op: NaryOp, operands: Vec<Expr>, component: &str) -> ControlResult<Self> {
        if operands.is_empty() {
            return Err(ControlError::invalid(
                component,
                "function",
                format!("{op:?} needs at least one operand"),
            ));
        }
        Ok(Expr::Nary(op, operands))
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary(op, Box::new(operand))
    }

    pub fn quotient(numerator: Expr, denominator: Expr) -> Self {
        Expr::Quotient(Box::new(numerator), Box::new(denominator))
    }

    pub fn pow(base: Expr, exponent: Expr) -> Self {
        Expr::Pow(Box::new(base), Box::new(exponent))
    }

    /// Evaluate against the current property values.
    pub fn value(&self, store: &PropertyStore) -> f64 {
        match self {
            Expr::Param(p) => p.value(store),
            Expr::Table(t) => t.value(store),
            Expr::Nary(op, operands) => {
                let mut values = operands.iter().map(|e| e.value(store));
                let first = values.next().unwrap_or(0.0);
                match op {
                    NaryOp::Sum => values.fold(first, |acc, v| acc + v),
                    NaryOp::Difference => values.fold(first, |acc, v| acc - v),
                    NaryOp::Product => values.fold(first, |acc, v| acc * v),
                    NaryOp::Min => values.fold(first, f64::min),
                    NaryOp::Max => values.fold(first, f64::max),
                }
            }
            Expr::Unary(op, operand) => {
                let v = operand.value(store);
                match op {
                    UnaryOp::Abs => v.abs(),
                    UnaryOp::Sin => v.sin(),
                    UnaryOp::Cos => v.cos(),
                    UnaryOp::Tan => v.tan(),
                    UnaryOp::Sqrt => v.sqrt(),
                }
            }
            Expr::Quotient(n, d) => {
                let d = d.value(store);
                if d == 0.0 { 0.0 } else { n.value(store) / d }
            }
            Expr::Pow(b, e) => b.value(store).powf(e.value(store)),
        }
    }
}

/// Generic function component: the output is an expression value.
#[derive(Debug, Clone, PartialEq)]
pub struct FcsFunction {
    pub expr: Expr,
}

impl FcsFunction {
    pub fn new(expr: Expr) -> Self {
        Self { expr }
    }
}

impl ComponentModel for FcsFunction {
    fn run(
        &mut self,
        core: &mut ComponentCore,
        store: &mut PropertyStore,
        ctx: &FrameContext<'_>,
    ) -> ControlResult<()> {
        let value = self.expr.value(store);
        core.finish(value, store, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(v: f64) -> Expr {
        Expr::Param(Parameter::Constant(v))
    }

    #[test]
    fn arithmetic() {
        let store = PropertyStore::new();
        let e = Expr::nary(
            NaryOp::Sum,
            vec![
                c(1.0),
                Expr::nary(NaryOp::Product, vec![c(2.0), c(3.0)], "f").unwrap(),
                Expr::quotient(c(1.0), c(4.0)),
            ],
            "f",
        )
        .unwrap();
        assert_eq!(e.value(&store), 7.25);
        let d = Expr::nary(NaryOp::Difference, vec![c(10.0), c(3.0), c(2.0)], "f").unwrap();
        assert_eq!(d.value(&store), 5.0);
        assert_eq!(Expr::pow(c(2.0), c(3.0)).value(&store), 8.0);
        assert_eq!(Expr::unary(UnaryOp::Abs, c(-2.0)).value(&store), 2.0);
    }

    #[test]
    fn quotient_by_zero_is_zero() {
        let store = PropertyStore::new();
        assert_eq!(Expr::quotient(c(1.0), c(0.0)).value(&store), 0.0);
    }

    #[test]
    fn empty_nary_is_rejected() {
        assert!(Expr::nary(NaryOp::Max, vec![], "f").is_err());
    }
}
