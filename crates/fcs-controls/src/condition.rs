//! Boolean condition trees used by switches.

use fcs_props::PropertyStore;

use crate::error::{ControlError, ControlResult};
use crate::parameter::Parameter;

/// Comparison operator of a leaf condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparison {
    /// Parse a symbolic (`>=`) or word (`ge`) operator.
    pub fn parse(token: &str) -> Option<Self> {
        let op = match token.to_ascii_lowercase().as_str() {
            "==" | "eq" => Comparison::Eq,
            "!=" | "ne" => Comparison::Ne,
            ">" | "gt" => Comparison::Gt,
            ">=" | "ge" => Comparison::Ge,
            "<" | "lt" => Comparison::Lt,
            "<=" | "le" => Comparison::Le,
            _ => return None,
        };
        Some(op)
    }

    /// Plain IEEE comparison, no tolerance.
    #[inline]
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::Eq => lhs == rhs,
            Comparison::Ne => lhs != rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::Ge => lhs >= rhs,
            Comparison::Lt => lhs < rhs,
            Comparison::Le => lhs <= rhs,
        }
    }
}

/// How the children of a group combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Logic {
    #[default]
    And,
    Or,
}

/// Leaf comparison or AND/OR group of sub-conditions.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Leaf {
        lhs: Parameter,
        op: Comparison,
        rhs: Parameter,
    },
    Group {
        logic: Logic,
        children: Vec<Condition>,
    },
}

impl Condition {
    /// Parse `"<lhs> <op> <rhs>"`, e.g. `"fcs/gear-pos-norm ge 0.5"`.
    pub fn parse_leaf(
        expression: &str,
        store: &mut PropertyStore,
        component: &str,
    ) -> ControlResult<Self> {
        let malformed = || ControlError::MalformedCondition {
            component: component.to_string(),
            expression: expression.to_string(),
        };
        let tokens: Vec<&str> = expression.split_whitespace().collect();
        let [lhs, op, rhs] = tokens.as_slice() else {
            return Err(malformed());
        };
        let op = Comparison::parse(op).ok_or_else(malformed)?;
        let lhs = Parameter::parse(lhs, store, component).map_err(|_| malformed())?;
        let rhs = Parameter::parse(rhs, store, component).map_err(|_| malformed())?;
        Ok(Condition::Leaf { lhs, op, rhs })
    }

    /// Group of sub-conditions. Empty groups are rejected.
    pub fn group(logic: Logic, children: Vec<Condition>, component: &str) -> ControlResult<Self> {
        if children.is_empty() {
            return Err(ControlError::MalformedCondition {
                component: component.to_string(),
                expression: format!("empty {logic:?} group"),
            });
        }
        Ok(Condition::Group { logic, children })
    }

    /// Evaluate against the current property values.
    pub fn evaluate(&self, store: &PropertyStore) -> bool {
        match self {
            Condition::Leaf { lhs, op, rhs } => op.apply(lhs.value(store), rhs.value(store)),
            Condition::Group { logic, children } => match logic {
                Logic::And => children.iter().all(|c| c.evaluate(store)),
                Logic::Or => children.iter().any(|c| c.evaluate(store)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_aliases() {
        for (word, sym) in [("eq", "=="), ("ne", "!="), ("gt", ">"), ("ge", ">="), ("lt", "<"), ("le", "<=")] {
            assert_eq!(Comparison::parse(word), Comparison::parse(sym));
            assert!(Comparison::parse(word).is_some());
        }
        assert_eq!(Comparison::parse("GE"), Some(Comparison::Ge));
        assert_eq!(Comparison::parse("=>"), None);
    }

    #[test]
    fn leaf_evaluates_against_store() {
        let mut store = PropertyStore::new();
        let c = Condition::parse_leaf("fcs/gear ge 0.5", &mut store, "sw").unwrap();
        assert!(!c.evaluate(&store));
        store.set_by_name("fcs/gear", 0.5).unwrap();
        assert!(c.evaluate(&store));
    }

    #[test]
    fn groups_combine() {
        let mut store = PropertyStore::new();
        let a = Condition::parse_leaf("x > 1", &mut store, "sw").unwrap();
        let b = Condition::parse_leaf("y == 2", &mut store, "sw").unwrap();
        let and = Condition::group(Logic::And, vec![a.clone(), b.clone()], "sw").unwrap();
        let or = Condition::group(Logic::Or, vec![a, b], "sw").unwrap();

        store.set_by_name("x", 3.0).unwrap();
        assert!(!and.evaluate(&store));
        assert!(or.evaluate(&store));
        store.set_by_name("y", 2.0).unwrap();
        assert!(and.evaluate(&store));
    }

    #[test]
    fn nested_groups() {
        let mut store = PropertyStore::new();
        let inner = Condition::group(
            Logic::Or,
            vec![
                Condition::parse_leaf("a == 1", &mut store, "sw").unwrap(),
                Condition::parse_leaf("b == 1", &mut store, "sw").unwrap(),
            ],
            "sw",
        )
        .unwrap();
        let outer = Condition::group(
            Logic::And,
            vec![inner, Condition::parse_leaf("c != 0", &mut store, "sw").unwrap()],
            "sw",
        )
        .unwrap();
        store.set_by_name("b", 1.0).unwrap();
        assert!(!outer.evaluate(&store));
        store.set_by_name("c", -1.0).unwrap();
        assert!(outer.evaluate(&store));
    }

    #[test]
    fn malformed_expressions() {
        let mut store = PropertyStore::new();
        for bad in ["", "x >", "x => 1", "x > 1 extra", "x gt"] {
            let err = Condition::parse_leaf(bad, &mut store, "sw").unwrap_err();
            assert!(matches!(err, ControlError::MalformedCondition { .. }), "{bad}");
        }
        assert!(Condition::group(Logic::Or, vec![], "sw").is_err());
    }

    #[test]
    fn exact_comparison() {
        let mut store = PropertyStore::new();
        let c = Condition::parse_leaf("x == 0.3", &mut store, "sw").unwrap();
        store.set_by_name("x", 0.1 + 0.2).unwrap();
        assert!(!c.evaluate(&store));
    }
}
