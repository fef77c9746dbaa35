//! Generation passes.
//!
//! - [`resolve`]: classify property types and validate owning references
//! - [`generate`]: group declarations by module and render artifacts

pub mod generate;
pub mod resolve;

pub use generate::{GeneratePass, ModuleArtifact, registration_table};
pub use resolve::{ENGINE_TYPES, KnownTypeResolver, ResolveOutput, ResolvePass, TypeResolver};
