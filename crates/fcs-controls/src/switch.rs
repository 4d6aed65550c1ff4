//! Switch: first matching test selects the output value.

use fcs_props::PropertyStore;

use crate::component::{ComponentCore, ComponentModel};
use crate::condition::Condition;
use crate::context::FrameContext;
use crate::error::{ControlError, ControlResult};
use crate::parameter::Parameter;

/// One switch branch. A test without a condition is the default.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchTest {
    pub condition: Option<Condition>,
    pub value: Parameter,
}

impl SwitchTest {
    pub fn when(condition: Condition, value: Parameter) -> Self {
        Self {
            condition: Some(condition),
            value,
        }
    }

    pub fn default_value(value: Parameter) -> Self {
        Self {
            condition: None,
            value,
        }
    }

    pub fn is_default(&self) -> bool {
        self.condition.is_none()
    }
}

/// Ordered list of conditional tests plus an optional default.
///
/// Conditional tests are evaluated in declaration order and the first true
/// one wins. The default applies when none matches, wherever it was
/// declared. With no match and no default the previous output is held.
#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    tests: Vec<SwitchTest>,
    default: Option<Parameter>,
}

impl Switch {
    pub fn new(tests: Vec<SwitchTest>, component: &str) -> ControlResult<Self> {
        let mut default = None;
        let mut conditional = Vec::with_capacity(tests.len());
        for test in tests {
            match test.condition {
                None if default.is_some() => {
                    return Err(ControlError::invalid(
                        component,
                        "default",
                        "more than one default test",
                    ));
                }
                None => default = Some(test.value),
                Some(_) => conditional.push(test),
            }
        }
        if conditional.is_empty() && default.is_none() {
            return Err(ControlError::missing(component, "test"));
        }
        Ok(Self {
            tests: conditional,
            default,
        })
    }

    /// Selected value, or `None` when nothing applies.
    pub fn select(&self, store: &PropertyStore) -> Option<f64> {
        self.tests
            .iter()
            .find(|t| t.condition.as_ref().is_some_and(|c| c.evaluate(store)))
            .map(|t| t.value)
            .or(self.default)
            .map(|p| p.value(store))
    }
}

impl ComponentModel for Switch {
    fn run(
        &mut self,
        core: &mut ComponentCore,
        store: &mut PropertyStore,
        ctx: &FrameContext<'_>,
    ) -> ControlResult<()> {
        let value = self.select(store).unwrap_or(core.output());
        core.finish(value, store, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(expr: &str, store: &mut PropertyStore) -> Condition {
        Condition::parse_leaf(expr, store, "sw").unwrap()
    }

    #[test]
    fn first_match_wins() {
        let mut store = PropertyStore::new();
        let x = store.create("ap/x");
        store.set(x, 5.0);
        let tests = vec![
            SwitchTest::when(leaf("ap/x gt 1", &mut store), Parameter::Constant(10.0)),
            SwitchTest::when(leaf("ap/x gt 2", &mut store), Parameter::Constant(20.0)),
            SwitchTest::when(leaf("ap/x lt 0", &mut store), Parameter::Constant(30.0)),
        ];
        let sw = Switch::new(tests, "sw").unwrap();
        assert_eq!(sw.select(&store), Some(10.0));
    }

    #[test]
    fn default_is_fallback_wherever_declared() {
        let mut store = PropertyStore::new();
        let x = store.create("ap/x");
        store.set(x, 5.0);
        let tests = vec![
            SwitchTest::default_value(Parameter::Constant(-1.0)),
            SwitchTest::when(leaf("ap/x == 5", &mut store), Parameter::Constant(1.0)),
        ];
        let sw = Switch::new(tests, "sw").unwrap();
        assert_eq!(sw.select(&store), Some(1.0));
        store.set(x, 4.0);
        assert_eq!(sw.select(&store), Some(-1.0));
    }

    #[test]
    fn no_match_without_default_selects_nothing() {
        let mut store = PropertyStore::new();
        let tests = vec![SwitchTest::when(
            leaf("ap/x == 1", &mut store),
            Parameter::Constant(1.0),
        )];
        let sw = Switch::new(tests, "sw").unwrap();
        assert_eq!(sw.select(&store), None);
    }

    #[test]
    fn rejects_two_defaults() {
        let tests = vec![
            SwitchTest::default_value(Parameter::Constant(0.0)),
            SwitchTest::default_value(Parameter::Constant(1.0)),
        ];
        assert!(Switch::new(tests, "sw").is_err());
        assert!(Switch::new(Vec::new(), "sw").is_err());
    }
}
