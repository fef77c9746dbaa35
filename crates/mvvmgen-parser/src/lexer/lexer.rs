//! Header lexer.
//!
//! The [`Lexer`] converts C++ header text into a stream of [`Token`]s. It
//! dispatches on the first character of each token. Preprocessor lines are
//! skipped entirely, so directives written inside `#define` bodies are
//! never seen by the parser. Comments are kept as tokens because the
//! directive parser turns them into tooltips.
//!
//! All lexemes are copied into the arena, allowing the source string to be
//! freed after lexing completes.

use bumpalo::Bump;

use mvvmgen_core::{LexError, Span};

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind};

/// Raw string literal prefixes, longest first.
const RAW_STRING_PREFIXES: [&str; 5] = ["u8R\"", "LR\"", "uR\"", "UR\"", "R\""];

/// Longest delimiter allowed between `R"` and `(`.
const MAX_RAW_DELIMITER: usize = 16;

/// Lexer for C++ header text.
///
/// The `'src` lifetime is the source string being lexed (temporary).
/// The `'ast` lifetime is the arena where token lexemes are allocated (persists).
pub struct Lexer<'src, 'ast> {
    /// Low-level character cursor.
    cursor: Cursor<'src>,
    /// Arena for allocating token lexemes.
    arena: &'ast Bump,
    /// Accumulated errors.
    errors: Vec<LexError>,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
            errors: Vec::new(),
        }
    }

    /// Lex the whole input.
    ///
    /// The returned vector always ends with an [`TokenKind::Eof`] token.
    /// The first lexer error aborts the file.
    pub fn tokenize(mut self) -> Result<Vec<Token<'ast>>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            if let Some(error) = self.errors.first() {
                return Err(error.clone());
            }
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Token<'ast> {
        loop {
            self.skip_whitespace();

            if self.cursor.is_eof() {
                return self.make_eof();
            }

            if self.cursor.peek() == Some('#') && self.cursor.at_line_start() {
                self.skip_preprocessor_line();
                continue;
            }

            return self.scan_token();
        }
    }

    // =========================================
    // Internal: Token scanning
    // =========================================

    fn scan_token(&mut self) -> Token<'ast> {
        let start_line = self.cursor.line();
        let start_col = self.cursor.column();
        let start_offset = self.cursor.offset();

        let Some(first) = self.cursor.peek() else {
            return self.make_eof();
        };

        match first {
            '/' if self.cursor.check_str("//") => {
                self.cursor.eat_to_line_end();
                self.make_token(TokenKind::Comment, start_line, start_col, start_offset)
            }
            '/' if self.cursor.check_str("/*") => {
                self.scan_block_comment(start_line, start_col, start_offset)
            }

            '"' => self.scan_quoted('"', start_line, start_col, start_offset),
            '\'' => self.scan_quoted('\'', start_line, start_col, start_offset),

            c if c.is_ascii_digit() => self.scan_number(start_line, start_col, start_offset),
            '.' if self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.scan_number(start_line, start_col, start_offset)
            }

            c if is_ident_start(c) => match self.raw_string_prefix() {
                Some(prefix) => self.scan_raw_string(prefix, start_line, start_col, start_offset),
                None => self.scan_identifier(start_line, start_col, start_offset),
            },

            _ => self.scan_punct(start_line, start_col, start_offset),
        }
    }

    /// Skip whitespace and BOM.
    fn skip_whitespace(&mut self) {
        if self.cursor.check_str("\u{FEFF}") {
            self.cursor.advance_bytes(3);
        }

        loop {
            match self.cursor.peek() {
                Some(c) if c.is_whitespace() => {
                    self.cursor.advance();
                }
                // Stray continuation outside a preprocessor line.
                Some('\\') if self.cursor.eat_line_continuation() => {}
                _ => break,
            }
        }
    }

    /// Skip a `#...` line, following backslash continuations and block
    /// comments that span lines.
    fn skip_preprocessor_line(&mut self) {
        let start_line = self.cursor.line();
        let start_col = self.cursor.column();
        let start_offset = self.cursor.offset();

        while let Some(c) = self.cursor.peek() {
            match c {
                '\n' => break,
                '\\' if self.cursor.eat_line_continuation() => {}
                '/' if self.cursor.check_str("//") => {
                    self.cursor.eat_to_line_end();
                    break;
                }
                '/' if self.cursor.check_str("/*") => {
                    // An unterminated comment here is reported like any other.
                    let token = self.scan_block_comment(start_line, start_col, start_offset);
                    if token.kind == TokenKind::Error {
                        return;
                    }
                }
                _ => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// Create an EOF token.
    fn make_eof(&self) -> Token<'ast> {
        let lexeme = self.arena.alloc_str("");
        Token::new(
            TokenKind::Eof,
            lexeme,
            Span::point(self.cursor.line(), self.cursor.column()),
        )
    }

    /// Create a token from start position to current position.
    /// Copies the lexeme into the arena.
    fn make_token(
        &self,
        kind: TokenKind,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        let len = self.cursor.offset() - start_offset;
        let span = Span::new(start_line, start_col, len);
        let lexeme = self.arena.alloc_str(self.cursor.slice_from(start_offset));
        Token::new(kind, lexeme, span)
    }

    /// Create an error token and record the error.
    fn make_error(&mut self, error: LexError) -> Token<'ast> {
        let span = error.span();
        let lexeme = self.arena.alloc_str("");
        self.errors.push(error);
        Token::new(TokenKind::Error, lexeme, span)
    }

    fn span_from(&self, start_line: u32, start_col: u32, start_offset: u32) -> Span {
        Span::new(start_line, start_col, self.cursor.offset() - start_offset)
    }

    // =========================================
    // Scanning: Comments
    // =========================================

    /// Scan a block comment `/* ... */`.
    fn scan_block_comment(
        &mut self,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        self.cursor.advance_bytes(2);
        loop {
            if self.cursor.check_str("*/") {
                self.cursor.advance_bytes(2);
                return self.make_token(TokenKind::Comment, start_line, start_col, start_offset);
            }
            if self.cursor.advance().is_none() {
                let span = self.span_from(start_line, start_col, start_offset);
                return self.make_error(LexError::UnterminatedComment { span });
            }
        }
    }

    // =========================================
    // Scanning: Strings and characters
    // =========================================

    /// Scan a string or character literal. Neither may span lines.
    fn scan_quoted(
        &mut self,
        quote: char,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        self.cursor.advance();

        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    let span = self.span_from(start_line, start_col, start_offset);
                    let error = if quote == '"' {
                        LexError::UnterminatedString { span }
                    } else {
                        LexError::UnterminatedChar { span }
                    };
                    return self.make_error(error);
                }
                Some('\\') => {
                    self.cursor.advance();
                    if self.cursor.peek().is_some_and(|c| c != '\n') {
                        self.cursor.advance();
                    }
                }
                Some(c) if c == quote => {
                    self.cursor.advance();
                    let kind = if quote == '"' {
                        TokenKind::StringLiteral
                    } else {
                        TokenKind::CharLiteral
                    };
                    return self.make_token(kind, start_line, start_col, start_offset);
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// Byte length of a raw string prefix (`R"`, `LR"`, `u8R"`, ...) at the
    /// cursor, up to and including the opening quote.
    fn raw_string_prefix(&self) -> Option<usize> {
        RAW_STRING_PREFIXES
            .iter()
            .find(|prefix| self.cursor.check_str(prefix))
            .map(|prefix| prefix.len())
    }

    /// Scan a raw string literal `R"delim( ... )delim"`, which may span lines
    /// and contain quotes and backslashes verbatim.
    fn scan_raw_string(
        &mut self,
        prefix: usize,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        self.cursor.advance_bytes(prefix);

        let delimiter = self
            .cursor
            .eat_while(|c| !matches!(c, '(' | ')' | '\\' | '"') && !c.is_whitespace());
        if delimiter.len() > MAX_RAW_DELIMITER || !self.cursor.eat('(') {
            let span = self.span_from(start_line, start_col, start_offset);
            return self.make_error(LexError::UnterminatedString { span });
        }

        let closing = format!("){delimiter}\"");
        loop {
            if self.cursor.check_str(&closing) {
                self.cursor.advance_bytes(closing.len());
                return self.make_token(
                    TokenKind::StringLiteral,
                    start_line,
                    start_col,
                    start_offset,
                );
            }
            if self.cursor.advance().is_none() {
                let span = self.span_from(start_line, start_col, start_offset);
                return self.make_error(LexError::UnterminatedString { span });
            }
        }
    }

    // =========================================
    // Scanning: Numbers
    // =========================================

    /// Scan a numeric literal as one token.
    ///
    /// Accepts any pp-number shape: radix prefixes, suffixes such as `u`,
    /// `ll` and `f`, exponents with signs, and `'` digit separators.
    fn scan_number(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        while let Some(c) = self.cursor.peek() {
            if is_ident_continue(c) || c == '.' {
                self.cursor.advance();
                if matches!(c, 'e' | 'E' | 'p' | 'P')
                    && matches!(self.cursor.peek(), Some('+' | '-'))
                {
                    self.cursor.advance();
                }
            } else if c == '\''
                && self
                    .cursor
                    .peek_nth(1)
                    .is_some_and(|n| n.is_ascii_alphanumeric())
            {
                self.cursor.advance();
            } else {
                break;
            }
        }

        self.make_token(TokenKind::Number, start_line, start_col, start_offset)
    }

    // =========================================
    // Scanning: Identifiers
    // =========================================

    fn scan_identifier(
        &mut self,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        self.cursor.eat_while(is_ident_continue);
        self.make_token(TokenKind::Identifier, start_line, start_col, start_offset)
    }

    // =========================================
    // Scanning: Punctuation
    // =========================================

    fn scan_punct(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        let Some(c) = self.cursor.advance() else {
            return self.make_eof();
        };

        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '<' => TokenKind::Less,
            '>' => TokenKind::Greater,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            ':' if self.cursor.eat(':') => TokenKind::ColonColon,
            ':' => TokenKind::Colon,
            '*' => TokenKind::Star,
            '&' => TokenKind::Amp,
            '=' => TokenKind::Equal,
            '~' => TokenKind::Tilde,
            '.' => TokenKind::Dot,
            _ => TokenKind::Symbol,
        };

        self.make_token(kind, start_line, start_col, start_offset)
    }
}

/// Implement Iterator for convenient token streaming.
impl<'ast> Iterator for Lexer<'_, 'ast> {
    type Item = Token<'ast>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}
