//! Token reader over a lexed header.
//!
//! [`TokenReader`] is what the header scanner and the directive parser
//! consume. Comment tokens never reach them: the reader sets comments aside
//! as it goes and hands them out on request through
//! [`take_comments`](TokenReader::take_comments), which is how a directive
//! picks up the documentation written right above it.

use mvvmgen_core::{ParseError, ParseErrorKind, Span};

use crate::lexer::{Token, TokenKind};

/// Cursor over the significant (non-comment) tokens of one header.
pub struct TokenReader<'ast> {
    /// Significant tokens; always ends with `Eof`.
    buffer: Vec<Token<'ast>>,
    /// Comment tokens in source order.
    comments: Vec<Token<'ast>>,
    /// Whether each comment shares its first line with the token before it.
    trailing: Vec<bool>,
    /// For each token in `buffer`, how many comments precede it.
    comments_before: Vec<usize>,
    /// Index of the next token to consume.
    position: usize,
    /// Comments before this index are no longer pending.
    comment_mark: usize,
}

impl<'ast> TokenReader<'ast> {
    /// Create a reader from a lexer's output.
    pub fn new(tokens: Vec<Token<'ast>>) -> Self {
        let mut buffer = Vec::with_capacity(tokens.len());
        let mut comments = Vec::new();
        let mut trailing = Vec::new();
        let mut comments_before = Vec::with_capacity(tokens.len());

        for token in tokens {
            if token.kind == TokenKind::Comment {
                let last_line = buffer.last().map(|t: &Token<'ast>| t.span.line);
                trailing.push(last_line == Some(token.span.line));
                comments.push(token);
            } else {
                comments_before.push(comments.len());
                buffer.push(token);
            }
        }

        if buffer.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let span = buffer
                .last()
                .or(comments.last())
                .map_or(Span::point(1, 1), |t| Span::point(t.span.line, t.span.col + t.span.len));
            comments_before.push(comments.len());
            buffer.push(Token::new(TokenKind::Eof, "", span));
        }

        Self {
            buffer,
            comments,
            trailing,
            comments_before,
            position: 0,
            comment_mark: 0,
        }
    }

    /// Look at the next token without consuming it.
    #[inline]
    pub fn peek(&self) -> Token<'ast> {
        self.peek_nth(0)
    }

    /// Look `n` tokens ahead (0 = next). Past the end this is `Eof`.
    pub fn peek_nth(&self, n: usize) -> Token<'ast> {
        let last = self.buffer.len() - 1;
        self.buffer[(self.position + n).min(last)]
    }

    /// Consume and return the next token. At the end, keeps returning `Eof`.
    pub fn advance(&mut self) -> Token<'ast> {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    /// Whether all significant tokens have been consumed.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// Whether the next token has the given kind.
    #[inline]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Consume a token of the given kind or fail.
    pub fn require(&mut self, kind: TokenKind) -> Result<Token<'ast>, ParseError> {
        let token = self.peek();
        if token.kind == kind {
            return Ok(self.advance());
        }
        if token.kind == TokenKind::Eof {
            return Err(ParseError::unexpected_eof(
                token.span,
                &format!("while looking for {}", kind.description()),
            ));
        }
        Err(ParseError::expected_token(
            token.span,
            kind.description(),
            &token.describe(),
        ))
    }

    /// Consume the next token if it has the given kind.
    pub fn optional(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consume the next token if it is the identifier `word`.
    pub fn optional_keyword(&mut self, word: &str) -> bool {
        if self.peek().is_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the next token if it is an identifier.
    pub fn optional_identifier(&mut self) -> Option<Token<'ast>> {
        self.optional(TokenKind::Identifier)
    }

    /// Consume tokens through the first `end` that is not nested inside
    /// parentheses, braces or brackets.
    ///
    /// A closing delimiter that does not match the innermost open group, or
    /// the end of input, is an error. Returns the terminating token.
    pub fn consume_until(&mut self, end: TokenKind) -> Result<Token<'ast>, ParseError> {
        let mut open: Vec<Token<'ast>> = Vec::new();

        loop {
            let token = self.peek();

            if token.kind == TokenKind::Eof {
                return Err(match open.last() {
                    Some(opener) => Self::never_closed(opener),
                    None if end == TokenKind::Semicolon => Self::missing_semicolon(token.span),
                    None => ParseError::unexpected_eof(
                        token.span,
                        &format!("while looking for {}", end.description()),
                    ),
                });
            }

            if open.is_empty() && token.kind == end {
                return Ok(self.advance());
            }

            if token.kind.closing().is_some() {
                open.push(token);
            } else if token.kind.is_closing() {
                match open.last() {
                    Some(opener) if opener.kind.closing() == Some(token.kind) => {
                        open.pop();
                    }
                    Some(opener) => {
                        return Err(ParseError::new(
                            ParseErrorKind::MismatchedDelimiter,
                            token.span,
                            format!(
                                "{} does not close '{}' opened at {}",
                                token.describe(),
                                opener.lexeme,
                                opener.span
                            ),
                        ));
                    }
                    None if end == TokenKind::Semicolon => {
                        return Err(Self::missing_semicolon(token.span));
                    }
                    None => {
                        return Err(ParseError::new(
                            ParseErrorKind::MismatchedDelimiter,
                            token.span,
                            format!("expected {} before {}", end.description(), token.describe()),
                        ));
                    }
                }
            }

            self.advance();
        }
    }

    /// Skip a `{ ... }` block, braces included. The next token must be `{`.
    ///
    /// Returns the span of the closing brace.
    pub fn skip_braced_block(&mut self) -> Result<Span, ParseError> {
        let open = self.require(TokenKind::LeftBrace)?;
        let mut depth = 1usize;

        loop {
            let token = self.advance();
            match token.kind {
                TokenKind::LeftBrace => depth += 1,
                TokenKind::RightBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(token.span);
                    }
                }
                TokenKind::Eof => return Err(Self::never_closed(&open)),
                _ => {}
            }
        }
    }

    /// Comments between the most recently consumed token and the significant
    /// token before it, unless already cleared. They stop being pending once
    /// taken.
    ///
    /// Trailing comments (those starting on the line of the token before
    /// them) document that line, not what follows, and are skipped.
    pub fn take_comments(&mut self) -> Vec<Token<'ast>> {
        let end = self.consumed_comment_count();
        let adjacent = self
            .position
            .checked_sub(2)
            .map_or(0, |before| self.comments_before[before]);
        let start = self.comment_mark.max(adjacent).min(end);
        self.comment_mark = end;
        (start..end)
            .filter(|&i| !self.trailing[i])
            .map(|i| self.comments[i])
            .collect()
    }

    /// Drop every comment that precedes the most recently consumed token.
    pub fn clear_comments(&mut self) {
        self.comment_mark = self.comment_mark.max(self.consumed_comment_count());
    }

    fn consumed_comment_count(&self) -> usize {
        self.position
            .checked_sub(1)
            .map_or(0, |last| self.comments_before[last])
    }

    fn never_closed(opener: &Token<'ast>) -> ParseError {
        ParseError::new(
            ParseErrorKind::MismatchedDelimiter,
            opener.span,
            format!("'{}' opened at {} is never closed", opener.lexeme, opener.span),
        )
    }

    fn missing_semicolon(span: Span) -> ParseError {
        ParseError::new(
            ParseErrorKind::MissingSemicolon,
            span,
            "expected ';' to end the declaration",
        )
    }
}

/// Turn raw comment tokens into tooltip text.
///
/// Comment delimiters and the leading `*` of block comment lines are
/// stripped, each line is trimmed, and leading and trailing empty lines are
/// dropped. Returns `None` when nothing is left.
pub fn format_comments(comments: &[Token<'_>]) -> Option<String> {
    let mut lines: Vec<&str> = Vec::new();

    for comment in comments {
        let text = comment.lexeme;
        if let Some(line) = text.strip_prefix("//") {
            lines.push(line.trim_start_matches('/').trim());
        } else {
            let body = text.strip_prefix("/*").unwrap_or(text);
            let body = body.strip_suffix("*/").unwrap_or(body);
            for line in body.lines() {
                let line = line.trim();
                let line = line.trim_start_matches('*').trim();
                lines.push(line);
            }
        }
    }

    let first = lines.iter().position(|l| !l.is_empty())?;
    let last = lines.iter().rposition(|l| !l.is_empty())?;
    Some(lines[first..=last].join("\n"))
}
