//! Core types shared by the view-model property generator.
//!
//! This crate holds everything the parser, the code generator and the
//! runtime registry agree on:
//!
//! - [`Span`] and [`TypeHash`] for locations and identity
//! - the error taxonomy in [`error`]
//! - the data model: [`ModuleInfo`], [`HeaderFile`], [`ClassInfo`] and
//!   [`PropertyDeclaration`]

pub mod class;
pub mod error;
pub mod module;
pub mod property;
pub mod span;
pub mod type_hash;

pub use class::ClassInfo;
pub use error::{
    ConfigError, EmitError, LexError, MvvmError, ParseError, ParseErrorKind, ResolveError, Result,
};
pub use module::{HeaderFile, ModuleInfo, PUBLIC_DIR};
pub use property::{
    AccessSpecifier, DIRECTIVE_PREFIX, DirectiveKind, PropertyDeclaration, PropertyFlags,
    TypeResolution, TypeToken, TypeTokenKind,
};
pub use span::Span;
pub use type_hash::{TypeHash, hash_constants};
