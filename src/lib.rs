//! View-model property generator.
//!
//! Scans C++ headers for `VM_PROP_*` directives and generates, per module, a
//! source file that registers every declared property with the runtime
//! view-model registry.
//!
//! ```text
//! class UPlayerState : public UObject
//! {
//!     VM_PROP_AG_AS(int32, Score);
//! };
//! ```
//!
//! generates
//!
//! ```text
//! UPlayerState::FScoreProperty UPlayerState::ScorePropertyValue = { &UPlayerState::GetScore, ... };
//! ```
//!
//! The pipeline lives in [`Session`]; [`Manifest`] loads a session from
//! `mvvmgen.toml`. The building blocks are re-exported from the workspace
//! crates:
//!
//! - [`core`]: data model and errors
//! - [`parser`]: header lexer and directive parser
//! - [`codegen`]: resolve/generate passes and two-phase emission
//! - [`registry`]: runtime property registry
//!
//! # Example
//!
//! ```
//! use mvvmgen::prelude::*;
//!
//! let mut module = ModuleInfo::new("Game", "/src/Game", "/out/Game");
//! let header = module.add_header("Public/PlayerState.h");
//!
//! let mut session = Session::new();
//! session.add_source(
//!     header.path(),
//!     "class UPlayerState { VM_PROP_AG_AS(int32, Score); };",
//! );
//! session.add_module(module).unwrap();
//!
//! let report = session.run(RunMode::DryRun).unwrap();
//! assert_eq!(report.declaration_count(), 1);
//! ```

pub mod config;
pub mod session;

pub use mvvmgen_codegen as codegen;
pub use mvvmgen_core as core;
pub use mvvmgen_parser as parser;
pub use mvvmgen_registry as registry;

pub use config::{DEFAULT_MANIFEST, Manifest, ModuleManifest, ResolverConfig};
pub use session::{ModuleReport, RunMode, RunReport, Session};

/// Commonly used types.
pub mod prelude {
    pub use crate::config::Manifest;
    pub use crate::session::{ModuleReport, RunMode, RunReport, Session};
    pub use mvvmgen_codegen::{GeneratorConfig, KnownTypeResolver, TypeResolver, WriteStatus};
    pub use mvvmgen_core::{
        AccessSpecifier, ClassInfo, DirectiveKind, HeaderFile, ModuleInfo, MvvmError,
        PropertyDeclaration, PropertyFlags,
    };
    pub use mvvmgen_registry::{PropertyDescriptor, PropertyRegistry, RegistrationTable};
}
