//! Token types for the header lexer.
//!
//! Only the C++ punctuation that class scanning and directive parsing care
//! about gets its own kind; every other operator character is a
//! [`TokenKind::Symbol`]. Keywords are plain identifiers and are matched by
//! lexeme.

use std::fmt;

use mvvmgen_core::{Span, TypeToken, TypeTokenKind};

/// A token from a header.
///
/// The `'ast` lifetime refers to the arena where the lexeme string is allocated.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    /// The type of token.
    pub kind: TokenKind,
    /// The source text of this token (allocated in arena).
    pub lexeme: &'ast str,
    /// Location in source.
    pub span: Span,
}

impl<'ast> Token<'ast> {
    /// Create a new token.
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }

    /// Whether this is the identifier `word`.
    #[inline]
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Identifier && self.lexeme == word
    }

    /// Human-readable form for diagnostics: the lexeme in quotes, or the kind
    /// description when there is no text.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => self.kind.description().to_string(),
            _ => format!("'{}'", self.lexeme),
        }
    }

    /// Copy this token out of the arena as a property type token.
    pub fn to_type_token(&self) -> TypeToken {
        let kind = match self.kind {
            TokenKind::Identifier => TypeTokenKind::Identifier,
            TokenKind::Number | TokenKind::StringLiteral | TokenKind::CharLiteral => {
                TypeTokenKind::Literal
            }
            _ => TypeTokenKind::Punct,
        };
        TypeToken::new(self.lexeme, kind, self.span)
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

/// Token categories produced by the header lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifier or keyword.
    Identifier,
    /// Numeric literal, including suffixes and digit separators.
    Number,
    /// `"..."`
    StringLiteral,
    /// `'x'`
    CharLiteral,
    /// `// ...` or `/* ... */`, with delimiters.
    Comment,

    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `:`
    Colon,
    /// `::`
    ColonColon,
    /// `*`
    Star,
    /// `&`
    Amp,
    /// `=`
    Equal,
    /// `~`
    Tilde,
    /// `.`
    Dot,
    /// Any other operator character.
    Symbol,

    /// Lexer error placeholder; the error itself is recorded by the lexer.
    Error,
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Returns a human-readable description for error messages.
    pub fn description(self) -> &'static str {
        use TokenKind::*;
        match self {
            Identifier => "identifier",
            Number => "number",
            StringLiteral => "string literal",
            CharLiteral => "character literal",
            Comment => "comment",
            LeftParen => "'('",
            RightParen => "')'",
            LeftBrace => "'{'",
            RightBrace => "'}'",
            LeftBracket => "'['",
            RightBracket => "']'",
            Less => "'<'",
            Greater => "'>'",
            Comma => "','",
            Semicolon => "';'",
            Colon => "':'",
            ColonColon => "'::'",
            Star => "'*'",
            Amp => "'&'",
            Equal => "'='",
            Tilde => "'~'",
            Dot => "'.'",
            Symbol => "symbol",
            Error => "invalid token",
            Eof => "end of file",
        }
    }

    /// The closing delimiter for an opening one.
    pub fn closing(self) -> Option<TokenKind> {
        match self {
            TokenKind::LeftParen => Some(TokenKind::RightParen),
            TokenKind::LeftBrace => Some(TokenKind::RightBrace),
            TokenKind::LeftBracket => Some(TokenKind::RightBracket),
            _ => None,
        }
    }

    /// Whether this kind closes a delimiter group.
    pub fn is_closing(self) -> bool {
        matches!(
            self,
            TokenKind::RightParen | TokenKind::RightBrace | TokenKind::RightBracket
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_pairs() {
        assert_eq!(TokenKind::LeftParen.closing(), Some(TokenKind::RightParen));
        assert_eq!(TokenKind::LeftBrace.closing(), Some(TokenKind::RightBrace));
        assert_eq!(TokenKind::Less.closing(), None);
        assert!(TokenKind::RightBracket.is_closing());
        assert!(!TokenKind::Greater.is_closing());
    }

    #[test]
    fn describe_uses_lexeme() {
        let token = Token::new(TokenKind::RightParen, ")", Span::new(1, 1, 1));
        assert_eq!(token.describe(), "')'");
        let eof = Token::new(TokenKind::Eof, "", Span::point(2, 1));
        assert_eq!(eof.describe(), "end of file");
    }

    #[test]
    fn type_token_kinds() {
        let ident = Token::new(TokenKind::Identifier, "UObject", Span::new(1, 1, 7));
        assert_eq!(ident.to_type_token().kind, TypeTokenKind::Identifier);
        let star = Token::new(TokenKind::Star, "*", Span::new(1, 8, 1));
        assert_eq!(star.to_type_token().kind, TypeTokenKind::Punct);
        let num = Token::new(TokenKind::Number, "4", Span::new(1, 8, 1));
        assert_eq!(num.to_type_token().text, "4");
    }
}
