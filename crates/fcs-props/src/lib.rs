//! fcs-props: the property store shared by flight control components.
//!
//! Provides:
//! - Hierarchical, slash-separated property names with normalization
//! - Compact slot handles resolved once at bind time
//! - Tie bindings (getter/setter pairs) for external collaborators
//! - Create-on-miss resolution for forward references
//!
//! # Example
//!
//! ```
//! use fcs_props::PropertyStore;
//!
//! let mut store = PropertyStore::new();
//! let id = store.create("fcs/elevator-cmd-norm");
//! store.set(id, 0.25);
//! assert_eq!(store.get_by_name("fcs/elevator-cmd-norm"), Some(0.25));
//! ```

pub mod error;
pub mod name;
pub mod store;

pub use error::{PropertyError, PropertyResult};
pub use name::{component_property_name, normalize};
pub use store::{Getter, PropertyStore, Setter};
