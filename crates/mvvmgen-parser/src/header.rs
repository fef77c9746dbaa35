//! Class-scope header scanning.
//!
//! [`HeaderParser`] walks a header's tokens and keeps a stack of open
//! scopes: namespaces, class bodies and plain blocks (function bodies,
//! enum bodies, initializers). Directive keywords are only honored when the
//! innermost scope is a class body; anywhere else they are ordinary
//! identifiers.
//!
//! Only as much C++ is understood as is needed to find class bodies:
//!
//! - `class`/`struct` heads with API macros, `final` and base lists
//! - `namespace` blocks, including `namespace A::B` and anonymous ones
//! - `enum class` is an enum, not a class
//! - forward declarations and elaborated type specifiers (`class UFoo*`)
//!   are not class definitions

use std::sync::Arc;

use bumpalo::Bump;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use mvvmgen_core::{
    ClassInfo, DirectiveKind, HeaderFile, MvvmError, ParseError, ParseErrorKind,
    PropertyDeclaration,
};

use crate::directive::parse_directive;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::reader::TokenReader;

/// Everything found in one header.
#[derive(Debug, Clone)]
pub struct ParsedHeader {
    /// The header that was parsed.
    pub header: Arc<HeaderFile>,
    /// Every class defined in the header, in source order, whether or not it
    /// declares properties.
    pub classes: Vec<Arc<ClassInfo>>,
    /// Property declarations in source order.
    pub declarations: Vec<PropertyDeclaration>,
}

/// Parses directives out of a single header.
pub struct HeaderParser {
    header: Arc<HeaderFile>,
}

impl HeaderParser {
    pub fn new(header: Arc<HeaderFile>) -> Self {
        Self { header }
    }

    /// Parse `source` as the contents of this parser's header.
    ///
    /// Any lexer or syntax error fails the whole file: nothing from a file
    /// with an error is returned.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(&self, source: &str) -> Result<ParsedHeader, MvvmError> {
        let arena = Bump::new();

        let tokens = Lexer::new(source, &arena)
            .tokenize()
            .map_err(|error| MvvmError::Lex {
                file: self.header.path().to_path_buf(),
                error,
            })?;

        let mut scanner = Scanner::new(&self.header, TokenReader::new(tokens));
        scanner.run().map_err(|error| MvvmError::Parse {
            file: self.header.path().to_path_buf(),
            error,
        })?;

        debug!(
            header = %self.header.module_relative_path(),
            classes = scanner.classes.len(),
            properties = scanner.declarations.len(),
            "parsed header"
        );

        Ok(ParsedHeader {
            header: Arc::clone(&self.header),
            classes: scanner.classes,
            declarations: scanner.declarations,
        })
    }
}

enum Scope<'ast> {
    /// `None` for an anonymous namespace.
    Namespace(Option<String>),
    Class {
        info: Arc<ClassInfo>,
        /// Property name -> line of its first declaration.
        properties: FxHashMap<String, u32>,
        open: Token<'ast>,
    },
    Block(Token<'ast>),
}

struct Scanner<'h, 'ast> {
    header: &'h Arc<HeaderFile>,
    reader: TokenReader<'ast>,
    scopes: Vec<Scope<'ast>>,
    classes: Vec<Arc<ClassInfo>>,
    declarations: Vec<PropertyDeclaration>,
}

impl<'h, 'ast> Scanner<'h, 'ast> {
    fn new(header: &'h Arc<HeaderFile>, reader: TokenReader<'ast>) -> Self {
        Self {
            header,
            reader,
            scopes: Vec::new(),
            classes: Vec::new(),
            declarations: Vec::new(),
        }
    }

    fn run(&mut self) -> Result<(), ParseError> {
        loop {
            let token = self.reader.advance();
            match token.kind {
                TokenKind::Eof => return self.finish(token),
                TokenKind::LeftBrace => {
                    self.scopes.push(Scope::Block(token));
                    self.reader.clear_comments();
                }
                TokenKind::RightBrace => {
                    if self.scopes.pop().is_none() {
                        return Err(ParseError::new(
                            ParseErrorKind::MismatchedDelimiter,
                            token.span,
                            "'}' without a matching '{'",
                        ));
                    }
                    self.reader.clear_comments();
                }
                TokenKind::Semicolon => self.reader.clear_comments(),
                TokenKind::Identifier => self.identifier(token)?,
                _ => {}
            }
        }
    }

    fn identifier(&mut self, token: Token<'ast>) -> Result<(), ParseError> {
        match token.lexeme {
            "namespace" => self.namespace_head(),
            "enum" => {
                // `enum class` / `enum struct` bodies are plain blocks.
                if !self.reader.optional_keyword("class") {
                    self.reader.optional_keyword("struct");
                }
            }
            "class" | "struct" => self.class_head(),
            "public" | "protected" | "private" if self.in_class_body() => {
                if self.reader.optional(TokenKind::Colon).is_some() {
                    self.reader.clear_comments();
                }
            }
            word => {
                if let Some(kind) = DirectiveKind::from_keyword(word) {
                    if self.in_class_body() {
                        self.directive(kind, token)?;
                    } else {
                        trace!(
                            line = token.span.line,
                            keyword = word,
                            "directive outside a class body ignored"
                        );
                    }
                }
            }
        }
        Ok(())
    }

    fn in_class_body(&self) -> bool {
        matches!(self.scopes.last(), Some(Scope::Class { .. }))
    }

    /// `namespace A::B {`, `namespace {`; aliases and `using namespace` are
    /// left to the main loop.
    fn namespace_head(&mut self) {
        let mut i = 0;
        let mut names = Vec::new();
        loop {
            let token = self.reader.peek_nth(i);
            match token.kind {
                TokenKind::Identifier => names.push(token.lexeme.to_string()),
                TokenKind::ColonColon => {}
                TokenKind::LeftBrace => break,
                _ => return,
            }
            i += 1;
        }

        for _ in 0..=i {
            self.reader.advance();
        }
        self.reader.clear_comments();

        if names.is_empty() {
            self.scopes.push(Scope::Namespace(None));
        } else {
            // `namespace A::B {` closes with a single brace.
            self.scopes.push(Scope::Namespace(Some(names.join("::"))));
        }
    }

    /// Look ahead from just after `class`/`struct` for a class definition
    /// head and enter its body if there is one.
    fn class_head(&mut self) {
        let mut i = 0;
        let mut name: Option<Token<'ast>> = None;
        let mut in_bases = false;
        // Path segments of the first base class; complete once `<`, `,` or
        // `{` follows it.
        let mut base: Vec<&'ast str> = Vec::new();
        let mut base_done = false;

        let len = loop {
            let token = self.reader.peek_nth(i);
            match token.kind {
                TokenKind::Identifier if !in_bases => {
                    if !token.is_word("final") {
                        name = Some(token);
                    }
                }
                TokenKind::Colon if !in_bases => in_bases = true,
                TokenKind::Identifier => {
                    let modifier = matches!(
                        token.lexeme,
                        "public" | "protected" | "private" | "virtual"
                    );
                    if !base_done && !modifier {
                        base.push(token.lexeme);
                    }
                }
                TokenKind::Less | TokenKind::Comma => base_done |= !base.is_empty(),
                TokenKind::ColonColon | TokenKind::Greater | TokenKind::Number => {}
                TokenKind::LeftBrace => break i + 1,
                // `;` (forward declaration), `*`/`&`/`(`/`)`/`=` (elaborated
                // type specifier in a declaration) and anything else.
                _ => return,
            }
            i += 1;
        };

        let Some(name) = name else {
            return;
        };

        let mut open = name;
        for _ in 0..len {
            open = self.reader.advance();
        }
        self.reader.clear_comments();

        let mut info = ClassInfo::new(
            name.lexeme,
            self.namespace_path(),
            Arc::clone(self.header),
            name.span.line,
        );
        if !base.is_empty() {
            info = info.with_base(base.join("::"));
        }
        let info = Arc::new(info);
        debug!(class = %info.qualified_name(), line = name.span.line, "entered class body");

        self.classes.push(Arc::clone(&info));
        self.scopes.push(Scope::Class {
            info,
            properties: FxHashMap::default(),
            open,
        });
    }

    /// Names of the enclosing namespaces and classes, outermost first.
    fn namespace_path(&self) -> Vec<String> {
        let mut path = Vec::new();
        for scope in &self.scopes {
            match scope {
                Scope::Namespace(Some(name)) => path.extend(name.split("::").map(str::to_string)),
                Scope::Class { info, .. } => path.push(info.name().to_string()),
                Scope::Namespace(None) | Scope::Block(_) => {}
            }
        }
        path
    }

    fn directive(&mut self, kind: DirectiveKind, keyword: Token<'ast>) -> Result<(), ParseError> {
        let Some(Scope::Class { info, properties, .. }) = self.scopes.last_mut() else {
            return Ok(());
        };

        let decl = parse_directive(&mut self.reader, info, kind, keyword)?;

        if let Some(first_line) = properties.get(&decl.name) {
            return Err(ParseError::new(
                ParseErrorKind::DuplicateIdentifier,
                decl.span,
                format!(
                    "property '{}' is already declared in '{}' at line {}",
                    decl.name,
                    info.qualified_name(),
                    first_line
                ),
            ));
        }
        properties.insert(decl.name.clone(), decl.line);

        self.reader.clear_comments();
        self.declarations.push(decl);
        Ok(())
    }

    fn finish(&self, eof: Token<'ast>) -> Result<(), ParseError> {
        let Some(scope) = self.scopes.last() else {
            return Ok(());
        };
        let (what, open) = match scope {
            Scope::Class { info, open, .. } => {
                (format!("class '{}'", info.qualified_name()), Some(*open))
            }
            Scope::Block(open) => ("block".to_string(), Some(*open)),
            Scope::Namespace(Some(name)) => (format!("namespace '{name}'"), None),
            Scope::Namespace(None) => ("anonymous namespace".to_string(), None),
        };
        let message = match open {
            Some(open) => format!("{what} opened at {} is never closed", open.span),
            None => format!("{what} is never closed"),
        };
        Err(ParseError::new(ParseErrorKind::MismatchedDelimiter, eof.span, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvvmgen_core::AccessSpecifier;
    use pretty_assertions::assert_eq;

    fn header() -> Arc<HeaderFile> {
        Arc::new(HeaderFile::new("Game", "/src/Game/Public/PlayerVM.h", "Public/PlayerVM.h"))
    }

    fn parse(source: &str) -> Result<ParsedHeader, MvvmError> {
        HeaderParser::new(header()).parse(source)
    }

    fn parse_error(source: &str) -> ParseError {
        match parse(source) {
            Err(MvvmError::Parse { error, .. }) => error,
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    fn names(parsed: &ParsedHeader) -> Vec<(String, String)> {
        parsed
            .declarations
            .iter()
            .map(|d| (d.class.qualified_name().to_string(), d.name.clone()))
            .collect()
    }

    #[test]
    fn unreal_style_class() {
        let source = r#"
#pragma once
#include "PlayerState.generated.h"

UCLASS()
class GAME_API UPlayerState : public UBaseViewModel
{
    GENERATED_BODY()

public:
    VM_PROP_AG_AS(int32, Score);
    VM_PROP_MG_NF(FText, DisplayName, protected);
};
"#;
        let parsed = parse(source).unwrap();
        assert_eq!(parsed.classes.len(), 1);
        assert_eq!(parsed.classes[0].name(), "UPlayerState");
        assert_eq!(parsed.classes[0].line(), 6);
        assert_eq!(parsed.classes[0].base(), Some("UBaseViewModel"));
        assert_eq!(
            names(&parsed),
            vec![
                ("UPlayerState".to_string(), "Score".to_string()),
                ("UPlayerState".to_string(), "DisplayName".to_string()),
            ]
        );
        assert_eq!(parsed.declarations[0].line, 11);
        assert_eq!(parsed.declarations[1].getter_access, AccessSpecifier::Protected);
    }

    #[test]
    fn final_and_template_bases() {
        let source =
            "class UA final : public TBase<UA, 2>, public IFace { VM_PROP_AG_AS(int32, X); };";
        let parsed = parse(source).unwrap();
        assert_eq!(names(&parsed), vec![("UA".to_string(), "X".to_string())]);
        assert_eq!(parsed.classes[0].base(), Some("TBase"));
    }

    #[test]
    fn first_base_is_recorded() {
        let source = "class UA : public virtual Game::UBase, public IFace {}; class UB {};";
        let parsed = parse(source).unwrap();
        assert_eq!(parsed.classes[0].base(), Some("Game::UBase"));
        assert_eq!(parsed.classes[1].base(), None);
    }

    #[test]
    fn namespaces_qualify_classes() {
        let source = r#"
namespace Game::UI {
    namespace {
        struct FHelper {};
    }
    class UHud { VM_PROP_AG_AS(int32, Ammo); };
}
"#;
        let parsed = parse(source).unwrap();
        assert_eq!(parsed.classes[0].qualified_name(), "Game::UI::FHelper");
        assert_eq!(names(&parsed), vec![("Game::UI::UHud".to_string(), "Ammo".to_string())]);
    }

    #[test]
    fn nested_class_path() {
        let source = "class UOuter { class UInner { VM_PROP_AG_AS(int32, X); }; \
                      VM_PROP_AG_AS(int32, Y); };";
        let parsed = parse(source).unwrap();
        assert_eq!(
            names(&parsed),
            vec![
                ("UOuter::UInner".to_string(), "X".to_string()),
                ("UOuter".to_string(), "Y".to_string()),
            ]
        );
    }

    #[test]
    fn forward_declarations_and_elaborated_types() {
        let source = r#"
class UForward;
void Take(class UParam* Param);
class UReal { VM_PROP_AG_AS(int32, X); };
"#;
        let parsed = parse(source).unwrap();
        assert_eq!(parsed.classes.len(), 1);
        assert_eq!(parsed.classes[0].name(), "UReal");
    }

    #[test]
    fn enum_class_is_not_a_class() {
        let source = "enum class EMode : uint8 { A, B }; class UA { VM_PROP_AG_AS(EMode, Mode); };";
        let parsed = parse(source).unwrap();
        assert_eq!(parsed.classes.len(), 1);
        assert_eq!(names(&parsed), vec![("UA".to_string(), "Mode".to_string())]);
    }

    #[test]
    fn directives_outside_class_bodies_are_ignored() {
        let source = r#"
VM_PROP_AG_AS(int32, Global);
class UA
{
    void Tick()
    {
        VM_PROP_AG_AS(int32, Local);
    }
    VM_PROP_AG_AS(int32, Member);
};
"#;
        let parsed = parse(source).unwrap();
        assert_eq!(names(&parsed), vec![("UA".to_string(), "Member".to_string())]);
    }

    #[test]
    fn directives_in_macros_are_ignored() {
        let source = "#define DECLARE_SCORE() \\\n    VM_PROP_AG_AS(int32, Score);\nclass UA { };";
        let parsed = parse(source).unwrap();
        assert!(parsed.declarations.is_empty());
        assert_eq!(parsed.classes.len(), 1);
    }

    #[test]
    fn tooltips_come_from_the_comment_right_above() {
        let source = r#"
// Class comment.
class UA
{
public:
    // Current score.
    VM_PROP_AG_AS(int32, Score);

    VM_PROP_AG_AS(int32, Lives); // trailing comment
    VM_PROP_AG_AS(int32, Level);
};
"#;
        let parsed = parse(source).unwrap();
        let tooltips: Vec<_> = parsed.declarations.iter().map(|d| d.tooltip.clone()).collect();
        assert_eq!(tooltips, vec![Some("Current score.".to_string()), None, None]);
    }

    #[test]
    fn comment_above_a_macro_call_is_not_a_tooltip() {
        let source = r#"
class UA
{
    // Engine boilerplate.
    GENERATED_BODY()
    VM_PROP_AG_AS(int32, Score);

    UPROPERTY()
    /** Lives left. */
    VM_PROP_AG_AS(int32, Lives);
};
"#;
        let parsed = parse(source).unwrap();
        assert_eq!(parsed.declarations[0].tooltip, None);
        assert_eq!(parsed.declarations[1].tooltip.as_deref(), Some("Lives left."));
    }

    #[test]
    fn duplicate_property_is_rejected() {
        let source = "class UA {\n    VM_PROP_AG_AS(int32, X);\n    VM_PROP_MG_NF(float, X);\n};";
        let err = parse_error(source);
        assert_eq!(err.kind, ParseErrorKind::DuplicateIdentifier);
        assert_eq!(err.span.line, 3);
        assert!(err.message.contains("at line 2"));
    }

    #[test]
    fn same_name_in_different_classes_is_fine() {
        let source =
            "class UA { VM_PROP_AG_AS(int32, X); }; class UB { VM_PROP_AG_AS(int32, X); };";
        assert_eq!(parse(source).unwrap().declarations.len(), 2);
    }

    #[test]
    fn syntax_error_fails_the_whole_file() {
        let source = "class UA { VM_PROP_AG_AS(int32, Good); VM_PROP_AG_AS(int32); };";
        let err = parse(source).unwrap_err();
        match err {
            MvvmError::Parse { file, error } => {
                assert_eq!(file, std::path::PathBuf::from("/src/Game/Public/PlayerVM.h"));
                assert_eq!(error.kind, ParseErrorKind::ExpectedToken);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn lexer_error_carries_file() {
        let err = parse("class UA { /* open").unwrap_err();
        assert!(matches!(err, MvvmError::Lex { .. }));
    }

    #[test]
    fn unbalanced_braces() {
        assert_eq!(parse_error("class UA { ").kind, ParseErrorKind::MismatchedDelimiter);
        assert_eq!(parse_error("};").kind, ParseErrorKind::MismatchedDelimiter);
    }

    #[test]
    fn struct_with_access_specifier_after_directives() {
        let source = "struct FState { VM_PROP_AG_AS(bool, bReady, public); private: int x; };";
        let parsed = parse(source).unwrap();
        assert_eq!(parsed.declarations[0].setter_access, AccessSpecifier::Public);
    }
}
