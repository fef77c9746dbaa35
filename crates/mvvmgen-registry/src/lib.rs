//! Runtime registry for generated view-model property registrations.
//!
//! The code generator produces one [`RegistrationTable`] per module next to
//! the emitted C++ registrator. Installing the table into a
//! [`PropertyRegistry`] gives the same view of classes and properties the
//! generated registrator builds at engine startup.
//!
//! # Example
//!
//! ```
//! use mvvmgen_core::AccessSpecifier;
//! use mvvmgen_registry::{PropertyDescriptor, PropertyRegistry, RegistrationTable};
//!
//! let mut table = RegistrationTable::new("Game");
//! table.properties.push(PropertyDescriptor {
//!     class_name: "UHud".into(),
//!     name: "Health".into(),
//!     getter: "UHud::GetHealth".into(),
//!     setter: None,
//!     field: None,
//!     getter_visibility: AccessSpecifier::Public,
//!     setter_visibility: AccessSpecifier::Private,
//! });
//!
//! let registry = PropertyRegistry::new();
//! assert!(registry.install(&table));
//! assert!(registry.find_property_by_name("UHud", "Health").is_some());
//! ```

mod descriptor;
mod registry;

pub use descriptor::{ClassRegistration, PropertyDescriptor, RegistrationTable};
pub use registry::{PropertyReflection, PropertyRegistry};
