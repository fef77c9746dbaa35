//! Runtime property registry.
//!
//! The registry is the runtime end of the generated registration code. Each
//! module's registrator queues its properties with
//! [`PropertyRegistry::register_property`]; queued entries become visible
//! once [`PropertyRegistry::process_pending_registrations`] moves them into
//! the per-class tables.
//!
//! # Lookup
//!
//! Properties are keyed by the [`TypeHash`] of the owning class. A lookup
//! that misses on a class continues with its base class when the base was
//! registered through [`PropertyRegistry::register_class`].
//!
//! # Duplicates
//!
//! The same registrator can run more than once when several binaries link
//! the same module. A property already present for its class is skipped.

use std::sync::{Arc, LazyLock};

use mvvmgen_core::TypeHash;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::{ClassRegistration, PropertyDescriptor, RegistrationTable};

/// A registered property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyReflection {
    /// Property identity.
    pub hash: TypeHash,
    /// Owning class identity.
    pub class: TypeHash,
    pub descriptor: Arc<PropertyDescriptor>,
}

impl PropertyReflection {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    pending: Vec<Arc<PropertyDescriptor>>,
    properties: FxHashMap<TypeHash, Vec<PropertyReflection>>,
    class_names: FxHashMap<TypeHash, String>,
    supers: FxHashMap<TypeHash, TypeHash>,
    installed: FxHashSet<String>,
}

/// Registry of view-model classes and their properties.
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    state: RwLock<RegistryState>,
}

static GLOBAL: LazyLock<PropertyRegistry> = LazyLock::new(PropertyRegistry::new);

impl PropertyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used by installed modules.
    pub fn global() -> &'static PropertyRegistry {
        &GLOBAL
    }

    /// Queue a property. It is not visible to lookups until the next
    /// [`process_pending_registrations`](Self::process_pending_registrations).
    pub fn register_property(&self, descriptor: PropertyDescriptor) {
        trace!(class = %descriptor.class_name, property = %descriptor.name, "queued property");
        self.state.write().pending.push(Arc::new(descriptor));
    }

    /// Record a class and the class it derives from.
    pub fn register_class(&self, class: &ClassRegistration) {
        let hash = TypeHash::from_name(&class.name);
        let mut state = self.state.write();
        state.class_names.insert(hash, class.name.clone());
        if let Some(base) = &class.base {
            let base_hash = TypeHash::from_name(base);
            if base_hash != hash {
                state.supers.insert(hash, base_hash);
            }
        }
    }

    /// Move queued properties into the per-class tables.
    ///
    /// Returns the classes that received their first property, in the order
    /// they were first seen.
    pub fn process_pending_registrations(&self) -> Vec<TypeHash> {
        let mut state = self.state.write();
        let pending = std::mem::take(&mut state.pending);
        let mut added_classes = Vec::new();
        let mut skipped = 0usize;

        for descriptor in pending {
            let class = descriptor.class_hash();
            let hash = descriptor.hash();

            if !state.class_names.contains_key(&class) {
                state
                    .class_names
                    .insert(class, descriptor.class_name.clone());
            }

            let entries = state.properties.entry(class).or_default();
            if entries.is_empty() {
                added_classes.push(class);
            }
            if entries.iter().any(|p| p.hash == hash) {
                skipped += 1;
                continue;
            }
            entries.push(PropertyReflection {
                hash,
                class,
                descriptor,
            });
        }

        debug!(
            classes = added_classes.len(),
            duplicates = skipped,
            "processed pending registrations"
        );
        added_classes
    }

    /// Find a property by name, searching base classes when the class itself
    /// does not declare it.
    pub fn find_property(&self, class: TypeHash, name: &str) -> Option<PropertyReflection> {
        let state = self.state.read();
        let mut visited = FxHashSet::default();
        let mut current = Some(class);

        while let Some(class) = current {
            if !visited.insert(class) {
                break;
            }
            let hash = TypeHash::from_property(class, name);
            if let Some(found) = state
                .properties
                .get(&class)
                .and_then(|entries| entries.iter().find(|p| p.hash == hash))
            {
                return Some(found.clone());
            }
            current = state.supers.get(&class).copied();
        }
        None
    }

    /// Find a property by class name.
    pub fn find_property_by_name(&self, class: &str, name: &str) -> Option<PropertyReflection> {
        self.find_property(TypeHash::from_name(class), name)
    }

    /// Properties declared directly by `class`, in registration order.
    pub fn properties_of(&self, class: TypeHash) -> Vec<PropertyReflection> {
        self.state
            .read()
            .properties
            .get(&class)
            .cloned()
            .unwrap_or_default()
    }

    /// Names of all classes with at least one property, sorted.
    pub fn all_classes(&self) -> Vec<String> {
        let state = self.state.read();
        let mut names: Vec<String> = state
            .properties
            .keys()
            .filter_map(|hash| state.class_names.get(hash).cloned())
            .collect();
        names.sort();
        names
    }

    /// Base class recorded for `class`.
    pub fn super_class(&self, class: TypeHash) -> Option<TypeHash> {
        self.state.read().supers.get(&class).copied()
    }

    /// Number of properties visible to lookups.
    pub fn property_count(&self) -> usize {
        self.state.read().properties.values().map(Vec::len).sum()
    }

    /// Number of properties waiting for processing.
    pub fn pending_count(&self) -> usize {
        self.state.read().pending.len()
    }

    /// Whether a module's table has been installed.
    pub fn is_installed(&self, module: &str) -> bool {
        self.state.read().installed.contains(module)
    }

    /// Install a module's registration table and process it.
    ///
    /// Returns `false` without touching the registry when the module was
    /// installed before.
    pub fn install(&self, table: &RegistrationTable) -> bool {
        if !self.state.write().installed.insert(table.module.clone()) {
            debug!(module = %table.module, "module already installed");
            return false;
        }

        for class in &table.classes {
            self.register_class(class);
        }
        for descriptor in &table.properties {
            self.register_property(descriptor.clone());
        }
        let added = self.process_pending_registrations();

        debug!(
            module = %table.module,
            properties = table.len(),
            classes = added.len(),
            "installed module"
        );
        true
    }
}
