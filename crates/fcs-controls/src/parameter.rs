//! Numeric value sources evaluated on demand each frame.

use fcs_core::PropertyId;
use fcs_props::PropertyStore;

use crate::error::{ControlError, ControlResult};

/// A literal constant or a (possibly sign-inverted) property reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parameter {
    /// Literal value.
    Constant(f64),
    /// Bound property, read every time the parameter is evaluated.
    Property { id: PropertyId, negated: bool },
}

impl Parameter {
    /// Bound property reference.
    pub fn property(id: PropertyId) -> Self {
        Self::Property { id, negated: false }
    }

    /// Parse the textual form used by configurations.
    ///
    /// A number literal becomes a constant. Anything else names a property,
    /// with a leading `-` inverting its sign. Unknown properties are created
    /// with a warning so that forward references work.
    pub fn parse(text: &str, store: &mut PropertyStore, component: &str) -> ControlResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ControlError::invalid(
                component,
                "parameter",
                "empty value or property name",
            ));
        }
        if let Ok(v) = text.parse::<f64>() {
            return Ok(Self::Constant(v));
        }
        let (name, negated) = match text.strip_prefix('-') {
            Some(rest) => (rest.trim(), true),
            None => (text, false),
        };
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(ControlError::invalid(
                component,
                "parameter",
                format!("'{text}' is neither a number nor a property name"),
            ));
        }
        let id = store.resolve_or_create(name, component);
        Ok(Self::Property { id, negated })
    }

    /// Current value.
    #[inline]
    pub fn value(&self, store: &PropertyStore) -> f64 {
        match *self {
            Parameter::Constant(v) => v,
            Parameter::Property { id, negated } => {
                let v = store.get(id);
                if negated { -v } else { v }
            }
        }
    }

    /// True for literal constants.
    pub fn is_constant(&self) -> bool {
        matches!(self, Parameter::Constant(_))
    }

    /// Same source with the opposite sign.
    pub fn negate(self) -> Self {
        match self {
            Parameter::Constant(v) => Parameter::Constant(-v),
            Parameter::Property { id, negated } => Parameter::Property {
                id,
                negated: !negated,
            },
        }
    }
}

impl From<f64> for Parameter {
    fn from(v: f64) -> Self {
        Parameter::Constant(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_constant() {
        let mut store = PropertyStore::new();
        let p = Parameter::parse(" 2.5 ", &mut store, "test").unwrap();
        assert_eq!(p, Parameter::Constant(2.5));
        assert!(store.is_empty());
    }

    #[test]
    fn parse_negated_property() {
        let mut store = PropertyStore::new();
        let id = store.create("fcs/b");
        store.set(id, -0.2);
        let p = Parameter::parse("-fcs/b", &mut store, "test").unwrap();
        assert_eq!(p.value(&store), 0.2);
        assert_eq!(p.negate().value(&store), -0.2);
    }

    #[test]
    fn parse_unknown_property_creates_node() {
        let mut store = PropertyStore::new();
        let p = Parameter::parse("ap/heading-setpoint", &mut store, "test").unwrap();
        assert!(store.has_node("ap/heading-setpoint"));
        assert_eq!(p.value(&store), 0.0);
    }

    #[test]
    fn parse_rejects_garbage() {
        let mut store = PropertyStore::new();
        assert!(Parameter::parse("", &mut store, "test").is_err());
        assert!(Parameter::parse("fcs/a fcs/b", &mut store, "test").is_err());
        assert!(Parameter::parse("-", &mut store, "test").is_err());
    }
}
