//! Unified error types for the generator.
//!
//! Every phase of a generation pass has its own error type, and all of them
//! convert into [`MvvmError`]:
//!
//! ```text
//! MvvmError (top-level wrapper)
//! ├── LexError       - header tokenization errors
//! ├── ParseError     - directive / class-scope syntax errors (with ParseErrorKind)
//! ├── ResolveError   - owning-reference type validation errors
//! ├── EmitError      - provisional / final artifact I/O errors
//! └── ConfigError    - manifest and module configuration errors
//! ```
//!
//! There is no warning tier: any of these aborts the pass, so generated output
//! is never partially consistent.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::Span;

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors that occur while tokenizing a header.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// A block comment was not properly terminated.
    #[error("unterminated comment at {span}")]
    UnterminatedComment { span: Span },

    /// A string literal was not properly terminated.
    #[error("unterminated string at {span}")]
    UnterminatedString { span: Span },

    /// A character literal was not properly terminated.
    #[error("unterminated character literal at {span}")]
    UnterminatedChar { span: Span },
}

impl LexError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnterminatedComment { span }
            | LexError::UnterminatedString { span }
            | LexError::UnterminatedChar { span } => *span,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A specific token was expected but not found.
    ExpectedToken,
    /// Unexpected end of file.
    UnexpectedEof,
    /// A property type was expected.
    ExpectedType,
    /// An identifier was expected.
    ExpectedIdentifier,
    /// A property with this name already exists in the class.
    DuplicateIdentifier,
    /// Mismatched or unterminated delimiter.
    MismatchedDelimiter,
    /// The directive was not terminated by `;` or a body.
    MissingSemicolon,
    /// An access specifier was not `public`, `protected` or `private`.
    InvalidModifier,
}

impl ParseErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::UnexpectedEof => "unexpected end of file",
            ParseErrorKind::ExpectedType => "expected type",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::DuplicateIdentifier => "duplicate identifier",
            ParseErrorKind::MismatchedDelimiter => "mismatched delimiter",
            ParseErrorKind::MissingSemicolon => "missing semicolon",
            ParseErrorKind::InvalidModifier => "invalid modifier",
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parse error with location and context.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}: {message}")]
pub struct ParseError {
    /// The category of this error.
    pub kind: ParseErrorKind,
    /// The source location where the error occurred.
    pub span: Span,
    /// A detailed error message.
    pub message: String,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Create an "expected token" error.
    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedToken,
            span,
            format!("expected {expected}, found {found}"),
        )
    }

    /// Create an "unexpected EOF" error.
    pub fn unexpected_eof(span: Span, context: &str) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedEof,
            span,
            format!("unexpected end of file {context}"),
        )
    }

    /// Create an "expected identifier" error.
    pub fn expected_identifier(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedIdentifier,
            span,
            format!("expected identifier, found {found}"),
        )
    }

    /// Format the error with source context for display.
    ///
    /// Prints the offending header line and a caret under the error location.
    pub fn display_with_source(&self, source: &str) -> String {
        let mut output = String::new();

        let line = self.span.line;
        let column = self.span.col.max(1);

        output.push_str(&format!("error at {}:{}: {}\n", line, column, self.kind));

        if !self.message.is_empty() {
            output.push_str(&format!("  {}\n", self.message));
        }

        if let Some(line_text) = source.lines().nth((line as usize).saturating_sub(1)) {
            output.push_str("  |\n");
            output.push_str(&format!("{:>3} | {}\n", line, line_text));

            let indent = " ".repeat(column as usize - 1);
            let pointer = if self.span.len <= 1 {
                "^".to_string()
            } else {
                "^".to_string() + &"~".repeat((self.span.len - 1) as usize)
            };
            output.push_str(&format!("  | {}{}\n", indent, pointer));
        }

        output
    }
}

// ============================================================================
// Resolution Errors
// ============================================================================

/// Errors reported by the on-demand property type resolver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// An owning-reference type named in a property type is not known.
    #[error(
        "{}:{line}: property '{class}::{property}' uses unknown type '{type_name}'",
        .file.display()
    )]
    UnknownType {
        /// Header declaring the property.
        file: PathBuf,
        /// Qualified name of the owning class.
        class: String,
        /// Property name.
        property: String,
        /// The identifier that failed to resolve.
        type_name: String,
        /// Line of the directive.
        line: u32,
    },

    /// The resolver rejected the type for another reason.
    #[error(
        "{}:{line}: property '{class}::{property}' has an invalid type: {message}",
        .file.display()
    )]
    Rejected {
        /// Header declaring the property.
        file: PathBuf,
        /// Qualified name of the owning class.
        class: String,
        /// Property name.
        property: String,
        /// Resolver diagnostic.
        message: String,
        /// Line of the directive.
        line: u32,
    },
}

// ============================================================================
// Emission Errors
// ============================================================================

/// Errors that occur while writing or promoting generated artifacts.
#[derive(Debug, Error)]
pub enum EmitError {
    /// An I/O operation on an artifact failed.
    #[error("failed to {action} '{}': {source}", .path.display())]
    Io {
        /// What was being done ("write", "copy", ...).
        action: &'static str,
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// A provisional artifact path does not carry the provisional extension.
    #[error("'{}' is not a provisional artifact path", .0.display())]
    NotProvisional(PathBuf),
}

impl EmitError {
    /// Wrap an I/O error with the path and action that produced it.
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        EmitError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Errors in the module manifest or session configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The manifest or a header directory could not be read.
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The manifest is not valid TOML or does not match the schema.
    #[error("invalid manifest '{}': {message}", .path.display())]
    InvalidManifest {
        /// The manifest path.
        path: PathBuf,
        /// Deserializer diagnostic.
        message: String,
    },

    /// Two modules share a name.
    #[error("duplicate module '{0}'")]
    DuplicateModule(String),

    /// A module definition is unusable.
    #[error("module '{name}': {message}")]
    InvalidModule {
        /// Module name.
        name: String,
        /// What is wrong with it.
        message: String,
    },
}

// ============================================================================
// Top-level
// ============================================================================

/// Top-level error for a generation pass.
#[derive(Debug, Error)]
pub enum MvvmError {
    /// A header could not be tokenized.
    #[error("{}: {error}", .file.display())]
    Lex {
        /// The header being tokenized.
        file: PathBuf,
        /// The lexer error.
        error: LexError,
    },

    /// A header contains a malformed directive or scope.
    #[error("{}: {error}", .file.display())]
    Parse {
        /// The header being parsed.
        file: PathBuf,
        /// The parse error.
        error: ParseError,
    },

    /// One or more property types failed resolution.
    #[error("{}", join_errors(.0))]
    Resolve(Vec<ResolveError>),

    /// A header could not be read.
    #[error("failed to read header '{}': {source}", .path.display())]
    Read {
        /// The header path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// Artifact emission failed.
    #[error(transparent)]
    Emit(#[from] EmitError),

    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn join_errors(errors: &[ResolveError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result alias for generator operations.
pub type Result<T, E = MvvmError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = ParseError::expected_token(Span::new(4, 18, 1), "','", "')'");
        assert_eq!(err.to_string(), "expected token at 4:18: expected ',', found ')'");
    }

    #[test]
    fn parse_error_with_source_points_at_column() {
        let source = "class UA\n{\n    VM_PROP_AG_AS(int32);\n};";
        let err = ParseError::expected_token(Span::new(3, 24, 1), "','", "')'");
        let rendered = err.display_with_source(source);
        assert!(rendered.contains("  3 |     VM_PROP_AG_AS(int32);"));
        assert!(rendered.contains(&format!("  | {}^", " ".repeat(23))));
    }

    #[test]
    fn resolve_errors_join_lines() {
        let err = MvvmError::Resolve(vec![
            ResolveError::UnknownType {
                file: PathBuf::from("Source/Game/Public/A.h"),
                class: "UA".into(),
                property: "Target".into(),
                type_name: "UMissing".into(),
                line: 7,
            },
            ResolveError::Rejected {
                file: PathBuf::from("Source/Game/Private/B.h"),
                class: "UB".into(),
                property: "Other".into(),
                message: "raw pointers are not allowed".into(),
                line: 9,
            },
        ]);
        let text = err.to_string();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("unknown type 'UMissing'"));
        assert!(text.starts_with("Source/Game/Public/A.h:7: property 'UA::Target'"));
        assert!(text.lines().nth(1).unwrap().starts_with("Source/Game/Private/B.h:9:"));
    }

    #[test]
    fn lex_error_span() {
        let err = LexError::UnterminatedComment { span: Span::new(2, 1, 40) };
        assert_eq!(err.span(), Span::new(2, 1, 40));
    }
}
