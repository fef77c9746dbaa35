//! Property descriptors and per-module registration tables.
//!
//! A [`PropertyDescriptor`] is the runtime-side twin of one generated
//! descriptor definition: the accessor symbols, the storage field and the
//! two visibilities. A [`RegistrationTable`] is everything a module's
//! registrator registers, in registration order.

use mvvmgen_core::{AccessSpecifier, PropertyDeclaration, TypeHash};

/// Description of one view-model property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// Qualified name of the owning class.
    pub class_name: String,
    /// Property name.
    pub name: String,
    /// Getter symbol, e.g. `UPlayerState::GetScore`.
    pub getter: String,
    /// Setter symbol; `None` for read-only properties.
    pub setter: Option<String>,
    /// Storage field name; `None` when the class supplies storage itself.
    pub field: Option<String>,
    pub getter_visibility: AccessSpecifier,
    pub setter_visibility: AccessSpecifier,
}

impl PropertyDescriptor {
    /// Build the descriptor the generator emits for a declaration.
    pub fn from_declaration(decl: &PropertyDeclaration) -> Self {
        let class = decl.class.qualified_name();
        Self {
            class_name: class.to_string(),
            name: decl.name.clone(),
            getter: format!("{class}::Get{}", decl.name),
            setter: decl
                .has_setter()
                .then(|| format!("{class}::Set{}", decl.name)),
            field: decl.auto_field().then(|| format!("{}Field", decl.name)),
            getter_visibility: decl.getter_access,
            setter_visibility: decl.setter_access,
        }
    }

    /// Identity of the owning class.
    pub fn class_hash(&self) -> TypeHash {
        TypeHash::from_name(&self.class_name)
    }

    /// Identity of this property.
    pub fn hash(&self) -> TypeHash {
        TypeHash::from_property(self.class_hash(), &self.name)
    }

    pub fn has_public_getter(&self) -> bool {
        self.getter_visibility == AccessSpecifier::Public
    }

    /// A read-only property never has a public setter.
    pub fn has_public_setter(&self) -> bool {
        self.setter.is_some() && self.setter_visibility == AccessSpecifier::Public
    }
}

/// A view-model class and the class it derives from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRegistration {
    /// Qualified class name.
    pub name: String,
    /// First base class as written in the class head.
    pub base: Option<String>,
}

/// All registrations of one module.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistrationTable {
    /// Module name; a module's table is installed once.
    pub module: String,
    /// Classes declaring properties in this module, sorted by name.
    pub classes: Vec<ClassRegistration>,
    /// Properties in registration order.
    pub properties: Vec<PropertyDescriptor>,
}

impl RegistrationTable {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            classes: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
