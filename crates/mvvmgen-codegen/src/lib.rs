//! Registration code generation for view-model properties.
//!
//! ## Architecture
//!
//! ```text
//! parse tasks ──► CollectionStore ──seal──► SealedDeclarations
//!                                               │
//!                                   ResolvePass │ (TypeResolver)
//!                                               ▼
//!                                         GeneratePass ──► ModuleArtifact per module
//!                                               │
//!                            commit_provisional │ phase 1 (.keep)
//!                                               ▼
//!                      ProvisionalBatch::promote  phase 2 (.cpp)
//! ```
//!
//! ## Modules
//!
//! - [`store`]: sharded collection of parsed declarations
//! - [`passes`]: resolve and generate passes
//! - [`render`]: artifact text
//! - [`include`]: artifact include list
//! - [`emit`]: two-phase, timestamp-preserving emission
//! - [`config`]: text fragments used by the renderer

pub mod config;
pub mod emit;
pub mod include;
pub mod passes;
pub mod render;
pub mod store;

pub use config::GeneratorConfig;
pub use emit::{
    FinalArtifact, ProvisionalBatch, ProvisionalCommit, WriteStatus, commit_provisional,
    final_path, provisional_path,
};
pub use passes::{
    GeneratePass, KnownTypeResolver, ModuleArtifact, ResolveOutput, ResolvePass, TypeResolver,
};
pub use render::render_module;
pub use store::{CollectionStore, SealedDeclarations};
