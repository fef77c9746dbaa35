//! Header parsing for view-model property directives.
//!
//! This crate turns C++ header text into [`PropertyDeclaration`]s:
//! - Lexical analysis of headers ([`Lexer`])
//! - A token reader with comment capture ([`TokenReader`])
//! - The `VM_PROP_*` directive grammar ([`parse_directive`])
//! - Class-scope scanning of whole headers ([`HeaderParser`])
//! - Owning-reference classification of property types ([`may_reference_object`])
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mvvmgen_core::HeaderFile;
//! use mvvmgen_parser::HeaderParser;
//!
//! let header = Arc::new(HeaderFile::new("Game", "PlayerState.h", "Public/PlayerState.h"));
//! let source = r#"
//!     class UPlayerState : public UObject
//!     {
//!         VM_PROP_AG_AS(int32, Score);
//!     };
//! "#;
//!
//! let parsed = HeaderParser::new(header).parse(source).unwrap();
//! assert_eq!(parsed.declarations[0].name, "Score");
//! ```
//!
//! [`PropertyDeclaration`]: mvvmgen_core::PropertyDeclaration

pub mod classify;
pub mod directive;
pub mod header;
pub mod lexer;
pub mod reader;

pub use classify::{OWNING_REFERENCE_PREFIXES, may_reference_object};
pub use directive::parse_directive;
pub use header::{HeaderParser, ParsedHeader};
pub use lexer::{Lexer, Token, TokenKind};
pub use reader::{TokenReader, format_comments};
