//! Generator configuration.
//!
//! Every piece of text the generator does not derive from declarations comes
//! from [`GeneratorConfig`]. The defaults reproduce the plugin's own output;
//! the manifest's `[generator]` table overrides individual fields.

use serde::Deserialize;

/// Copyright line written at the top of every artifact.
pub const DEFAULT_LICENSE_HEADER: &str = "// Copyright Andrei Sudarikov. All Rights Reserved.";

/// Header that declares the runtime registry.
pub const DEFAULT_REGISTRY_HEADER: &str = "Mvvm/Impl/Property/ViewModelRegistry.h";

/// Function the registrator calls once per property.
pub const DEFAULT_REGISTER_FUNCTION: &str = "UnrealMvvm_Impl::FViewModelRegistry::RegisterProperty";

/// Scope prefixed to the `V_<access>` visibility enumerators.
pub const DEFAULT_VISIBILITY_SCOPE: &str = "FViewModelPropertyBase::EAccessorVisibility::";

/// Text fragments used when rendering artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub license_header: String,
    pub registry_header: String,
    pub register_function: String,
    pub visibility_scope: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            license_header: DEFAULT_LICENSE_HEADER.to_string(),
            registry_header: DEFAULT_REGISTRY_HEADER.to_string(),
            register_function: DEFAULT_REGISTER_FUNCTION.to_string(),
            visibility_scope: DEFAULT_VISIBILITY_SCOPE.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Unqualified names: empty visibility scope and a bare `RegisterProperty`.
    pub fn unqualified() -> Self {
        Self {
            register_function: "RegisterProperty".to_string(),
            visibility_scope: String::new(),
            ..Self::default()
        }
    }
}
