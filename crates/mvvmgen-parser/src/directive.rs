//! `VM_PROP_*` directive parsing.
//!
//! Grammar, after the keyword:
//!
//! ```text
//! '(' ( '(' 'const'? TYPE ')' ','? | 'const'? TYPE ',' )
//!     NAME ','?
//!     ( ACCESS ','? ( ACCESS ','? )? )?
//!     ANYTHING*
//! ')' ( '{' ANYTHING* '}' ';'? | ANYTHING* ';' )
//! ```
//!
//! `ACCESS` is `public`, `protected` or `private`. A type that contains
//! commas at the top level (`TMap<K, V>`) must be wrapped in parentheses.

use std::sync::Arc;

use mvvmgen_core::{
    AccessSpecifier, ClassInfo, DirectiveKind, ParseError, ParseErrorKind, PropertyDeclaration,
    PropertyFlags, TypeToken,
};
use tracing::trace;

use crate::lexer::{Token, TokenKind};
use crate::reader::{TokenReader, format_comments};

/// Parse one directive.
///
/// `keyword` is the directive keyword the reader has just consumed. On
/// success the reader is positioned after the directive's `;` or body.
pub fn parse_directive<'ast>(
    reader: &mut TokenReader<'ast>,
    class: &Arc<ClassInfo>,
    kind: DirectiveKind,
    keyword: Token<'ast>,
) -> Result<PropertyDeclaration, ParseError> {
    let tooltip = format_comments(&reader.take_comments());

    reader.require(TokenKind::LeftParen)?;

    let type_tokens = parse_type_tokens(reader, keyword)?;

    let name = match reader.peek() {
        token if token.kind == TokenKind::Identifier => reader.advance(),
        token if token.kind == TokenKind::Eof => {
            return Err(ParseError::unexpected_eof(token.span, "in property name"));
        }
        token => return Err(ParseError::expected_identifier(token.span, &token.describe())),
    };
    reader.optional(TokenKind::Comma);

    let first = parse_access_specifier(reader)?;
    let second = match first {
        Some(_) => parse_access_specifier(reader)?,
        None => None,
    };

    let mut decl = PropertyDeclaration::new(Arc::clone(class), kind, name.lexeme, keyword.span);
    decl.type_tokens = type_tokens;
    decl.tooltip = tooltip;

    match (first, second) {
        (Some(getter), Some(setter)) => {
            decl.getter_access = getter;
            decl.setter_access = setter;
        }
        (Some(access), None) if decl.flags.contains(PropertyFlags::HAS_SETTER) => {
            decl.setter_access = access;
        }
        (Some(access), None) => decl.getter_access = access,
        _ => {}
    }

    // Anything else inside the argument list is reserved and ignored.
    reader.consume_until(TokenKind::RightParen)?;

    if reader.check(TokenKind::LeftBrace) {
        reader.skip_braced_block()?;
        reader.optional(TokenKind::Semicolon);
    } else {
        reader.consume_until(TokenKind::Semicolon)?;
    }

    trace!(
        class = %class.qualified_name(),
        property = %decl.name,
        kind = %kind,
        line = decl.line,
        "parsed directive"
    );

    Ok(decl)
}

/// Read the type argument, including its terminator.
fn parse_type_tokens<'ast>(
    reader: &mut TokenReader<'ast>,
    keyword: Token<'ast>,
) -> Result<Vec<TypeToken>, ParseError> {
    let wrapped = reader.optional(TokenKind::LeftParen).is_some();
    reader.optional_keyword("const");

    let mut tokens = Vec::new();
    let mut depth = 0usize;

    let terminator = loop {
        let token = reader.peek();
        match token.kind {
            TokenKind::Eof => {
                return Err(ParseError::unexpected_eof(token.span, "in property type"));
            }
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen if depth > 0 => depth -= 1,
            TokenKind::RightParen if wrapped => {
                reader.advance();
                reader.optional(TokenKind::Comma);
                break token;
            }
            TokenKind::RightParen => {
                return Err(ParseError::expected_token(
                    token.span,
                    "',' after the property type",
                    &token.describe(),
                ));
            }
            TokenKind::Comma if depth == 0 && !wrapped => {
                reader.advance();
                break token;
            }
            _ => {}
        }
        tokens.push(reader.advance().to_type_token());
    };

    if tokens.is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::ExpectedType,
            terminator.span,
            format!("{} needs a property type", keyword.lexeme),
        ));
    }

    Ok(tokens)
}

/// Read an optional access specifier and its trailing comma.
fn parse_access_specifier(
    reader: &mut TokenReader<'_>,
) -> Result<Option<AccessSpecifier>, ParseError> {
    let Some(token) = reader.optional_identifier() else {
        return Ok(None);
    };
    reader.optional(TokenKind::Comma);

    AccessSpecifier::from_name(token.lexeme)
        .map(Some)
        .ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::InvalidModifier,
                token.span,
                format!(
                    "'{}' is not an access specifier; expected public, protected or private",
                    token.lexeme
                ),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lexer;
    use bumpalo::Bump;
    use mvvmgen_core::{HeaderFile, TypeResolution};
    use pretty_assertions::assert_eq;

    fn class() -> Arc<ClassInfo> {
        let header = Arc::new(HeaderFile::new("Game", "PlayerState.h", "Public/PlayerState.h"));
        Arc::new(ClassInfo::new("UPlayerState", Vec::new(), header, 1))
    }

    /// Parse the first directive in `source`, which must start with its keyword.
    fn parse(source: &str) -> Result<PropertyDeclaration, ParseError> {
        let arena = Bump::new();
        let tokens = Lexer::new(source, &arena).tokenize().unwrap();
        let mut reader = TokenReader::new(tokens);
        let keyword = reader.advance();
        let kind = DirectiveKind::from_keyword(keyword.lexeme).unwrap();
        parse_directive(&mut reader, &class(), kind, keyword)
    }

    fn type_text(decl: &PropertyDeclaration) -> Vec<&str> {
        decl.type_tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn simple_directive() {
        let decl = parse("VM_PROP_AG_AS(int32, Score);").unwrap();
        assert_eq!(decl.name, "Score");
        assert_eq!(type_text(&decl), vec!["int32"]);
        assert_eq!(decl.kind, DirectiveKind::AgAs);
        assert!(decl.auto_getter() && decl.auto_setter() && decl.auto_field() && decl.has_setter());
        assert_eq!(decl.getter_access, AccessSpecifier::Public);
        assert_eq!(decl.setter_access, AccessSpecifier::Private);
        assert_eq!(decl.resolution, TypeResolution::Pending);
        assert_eq!(decl.line, 1);
    }

    #[test]
    fn flag_round_trip() {
        let decl = parse("VM_PROP_MG_AS_NF(float, Speed);").unwrap();
        assert!(!decl.auto_getter());
        assert!(decl.auto_setter());
        assert!(!decl.auto_field());
        assert!(decl.has_setter());

        let decl = parse("VM_PROP_MG_NF(float, Speed);").unwrap();
        assert!(!decl.auto_getter());
        assert!(!decl.has_setter());
        assert!(!decl.auto_field());
    }

    #[test]
    fn leading_const_is_dropped() {
        let decl = parse("VM_PROP_MG_MS(const FString&, Title);").unwrap();
        assert_eq!(type_text(&decl), vec!["FString", "&"]);
    }

    #[test]
    fn pointer_type() {
        let decl = parse("VM_PROP_AG_AS(UObject*, Target);").unwrap();
        assert_eq!(type_text(&decl), vec!["UObject", "*"]);
    }

    #[test]
    fn wrapped_type_keeps_commas() {
        let decl = parse("VM_PROP_AG_AS((TMap<FName, int32>), Counts);").unwrap();
        assert_eq!(decl.name, "Counts");
        assert_eq!(decl.type_text(), "TMap<FName, int32>");
    }

    #[test]
    fn wrapped_type_with_const_and_no_comma() {
        let decl = parse("VM_PROP_AG_AS((const TArray<int32>) Items);").unwrap();
        assert_eq!(type_text(&decl), vec!["TArray", "<", "int32", ">"]);
        assert_eq!(decl.name, "Items");
    }

    #[test]
    fn nested_parens_in_type() {
        let decl = parse("VM_PROP_MG_MS(TFunction<void()>, Callback);").unwrap();
        assert_eq!(decl.type_text(), "TFunction<void()>");
    }

    #[test]
    fn zero_specifiers_use_defaults() {
        for source in ["VM_PROP_MG_NF(int32, A);", "VM_PROP_AG_AS(int32, A);"] {
            let decl = parse(source).unwrap();
            assert_eq!(decl.getter_access, AccessSpecifier::Public);
            assert_eq!(decl.setter_access, AccessSpecifier::Private);
        }
    }

    #[test]
    fn one_specifier_binds_to_setter_when_writable() {
        let decl = parse("VM_PROP_AG_MS(int32, A, protected);").unwrap();
        assert_eq!(decl.getter_access, AccessSpecifier::Public);
        assert_eq!(decl.setter_access, AccessSpecifier::Protected);
    }

    #[test]
    fn one_specifier_binds_to_getter_when_read_only() {
        let decl = parse("VM_PROP_MG_NF(int32, A, private);").unwrap();
        assert_eq!(decl.getter_access, AccessSpecifier::Private);
        assert_eq!(decl.setter_access, AccessSpecifier::Private);
    }

    #[test]
    fn two_specifiers_bind_getter_then_setter() {
        let decl = parse("VM_PROP_AG_AS(int32, A, protected, public);").unwrap();
        assert_eq!(decl.getter_access, AccessSpecifier::Protected);
        assert_eq!(decl.setter_access, AccessSpecifier::Public);
    }

    #[test]
    fn trailing_arguments_are_ignored() {
        let decl = parse("VM_PROP_AG_AS(int32, A, public, private, 42, \"x\", (y));").unwrap();
        assert_eq!(decl.getter_access, AccessSpecifier::Public);
        assert_eq!(decl.setter_access, AccessSpecifier::Private);
    }

    #[test]
    fn invalid_specifier() {
        let err = parse("VM_PROP_AG_AS(int32, A, internal);").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidModifier);
        assert_eq!(err.span.col, 25);
    }

    #[test]
    fn dummy_body_is_skipped() {
        let arena = Bump::new();
        let source = "VM_PROP_AG_AS(int32, A) { return {}; }; next";
        let tokens = Lexer::new(source, &arena).tokenize().unwrap();
        let mut reader = TokenReader::new(tokens);
        let keyword = reader.advance();
        let decl = parse_directive(&mut reader, &class(), DirectiveKind::AgAs, keyword).unwrap();
        assert_eq!(decl.name, "A");
        assert_eq!(reader.peek().lexeme, "next");
    }

    #[test]
    fn body_without_semicolon() {
        let arena = Bump::new();
        let tokens = Lexer::new("VM_PROP_MG_NF(int32, A) {} next", &arena).tokenize().unwrap();
        let mut reader = TokenReader::new(tokens);
        let keyword = reader.advance();
        parse_directive(&mut reader, &class(), DirectiveKind::MgNf, keyword).unwrap();
        assert_eq!(reader.peek().lexeme, "next");
    }

    #[test]
    fn missing_open_paren() {
        let err = parse("VM_PROP_AG_AS int32, A;").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExpectedToken);
    }

    #[test]
    fn unwrapped_type_without_name() {
        let err = parse("VM_PROP_AG_AS(int32);").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExpectedToken);
        assert_eq!(err.span.col, 20);
    }

    #[test]
    fn empty_type() {
        let err = parse("VM_PROP_AG_AS(, A);").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExpectedType);
    }

    #[test]
    fn name_must_be_identifier() {
        let err = parse("VM_PROP_AG_AS(int32, 42);").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExpectedIdentifier);
    }

    #[test]
    fn unterminated_argument_list() {
        let err = parse("VM_PROP_AG_AS(int32, A").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEof);
    }

    #[test]
    fn missing_semicolon() {
        let err = parse("VM_PROP_AG_AS(int32, A)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingSemicolon);
    }

    #[test]
    fn tooltip_from_preceding_comment() {
        let arena = Bump::new();
        let source = "/** Current score. */\nVM_PROP_AG_AS(int32, Score); // trailing";
        let tokens = Lexer::new(source, &arena).tokenize().unwrap();
        let mut reader = TokenReader::new(tokens);
        let keyword = reader.advance();
        let decl = parse_directive(&mut reader, &class(), DirectiveKind::AgAs, keyword).unwrap();
        assert_eq!(decl.tooltip.as_deref(), Some("Current score."));
        assert_eq!(decl.line, 2);
    }
}
