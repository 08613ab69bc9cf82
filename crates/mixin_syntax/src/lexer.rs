//! Lexer for declaration sources.
//!
//! The lexer converts source text into a stream of tokens. Literals are kept
//! exactly as written: composition never evaluates them, it only relocates
//! them.

use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Multi-character operators, longest first. `>>` and `>>=` are assembled by
/// the parser from adjacent `>` tokens.
const OPERATORS: &[&str] = &[
    "<<=", "??=", "==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=", "-=", "*=", "/=", "%=",
    "&=", "|=", "^=", "??", "<<", "->",
];

/// Lexer for declaration source code.
pub struct Lexer<'src> {
    /// Source text being tokenized.
    source: &'src str,
    /// Remaining source text.
    rest: &'src str,
    /// Current byte offset in source.
    position: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    column: u32,
    /// True when only whitespace has been seen since the last newline.
    at_line_start: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            position: 0,
            line: 1,
            column: 1,
            at_line_start: true,
        }
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.position;
        let start_line = self.line;
        let start_column = self.column;

        let Some(c) = self.peek_char() else {
            return Token::new(
                TokenKind::Eof,
                Span::new(start, start, start_line, start_column),
            );
        };

        let line_start = self.at_line_start;
        self.at_line_start = false;

        let kind = match c {
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semi),
            '#' if line_start => self.scan_line_comment(),
            '/' if self.peek_char_n(1) == Some('/') => self.scan_line_comment(),
            '/' if self.peek_char_n(1) == Some('*') => self.scan_block_comment(),
            '"' => self.scan_string(false),
            '@' if self.peek_char_n(1) == Some('"') => {
                self.advance();
                self.scan_string(true)
            }
            '$' if matches!(self.peek_char_n(1), Some('"' | '@')) => {
                self.advance();
                let verbatim = self.peek_char() == Some('@');
                if verbatim {
                    self.advance();
                }
                self.scan_string(verbatim)
            }
            '\'' => self.scan_char(),
            '.' if self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit()) => self.scan_number(),
            c if c.is_ascii_digit() => self.scan_number(),
            '@' if self.peek_char_n(1).is_some_and(is_ident_start) => {
                self.advance();
                self.scan_ident()
            }
            c if is_ident_start(c) => self.scan_ident(),
            _ => self.scan_punctuation(),
        };

        Token::new(
            kind,
            Span::new(start, self.position, start_line, start_column),
        )
    }

    /// Tokenizes all source and returns a vector of tokens.
    ///
    /// Comments are included in the output.
    #[must_use]
    pub fn tokenize_all(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Peeks at the next character without consuming it.
    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    /// Peeks `n` characters ahead.
    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    /// Advances past the next character.
    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            let len = c.len_utf8();
            self.rest = &self.rest[len..];
            self.position += len;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
                self.at_line_start = true;
            } else {
                self.column += 1;
            }
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Scans a `//` comment or a preprocessor line.
    fn scan_line_comment(&mut self) -> TokenKind {
        let start = self.position;
        while self.peek_char().is_some_and(|c| c != '\n') {
            self.advance();
        }
        TokenKind::Comment(self.source[start..self.position].to_string())
    }

    /// Scans a `/* ... */` comment.
    fn scan_block_comment(&mut self) -> TokenKind {
        let start = self.position;
        self.advance();
        self.advance();
        loop {
            match self.peek_char() {
                Some('*') if self.peek_char_n(1) == Some('/') => {
                    self.advance();
                    self.advance();
                    break;
                }
                Some(_) => self.advance(),
                None => return TokenKind::Error("unterminated block comment".into()),
            }
        }
        TokenKind::Comment(self.source[start..self.position].to_string())
    }

    /// Scans a string literal. The prefix (`@`, `$`) has already been consumed
    /// but is included in the token text.
    fn scan_string(&mut self, verbatim: bool) -> TokenKind {
        let start = self.literal_start();
        self.advance(); // opening quote
        loop {
            match self.peek_char() {
                Some('"') if verbatim && self.peek_char_n(1) == Some('"') => {
                    self.advance();
                    self.advance();
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') if !verbatim => {
                    self.advance();
                    if self.peek_char().is_none() {
                        return TokenKind::Error("unexpected end of input in string escape".into());
                    }
                    self.advance();
                }
                Some('\n') if !verbatim => {
                    return TokenKind::Error("newline in string literal".into());
                }
                Some(_) => self.advance(),
                None => return TokenKind::Error("unterminated string literal".into()),
            }
        }
        TokenKind::Str(self.source[start..self.position].to_string())
    }

    /// Finds the start of a literal whose prefix characters were consumed.
    fn literal_start(&self) -> usize {
        let prefix = self.source[..self.position]
            .chars()
            .rev()
            .take_while(|c| matches!(c, '@' | '$'))
            .count();
        self.position - prefix
    }

    /// Scans a character literal.
    fn scan_char(&mut self) -> TokenKind {
        let start = self.position;
        self.advance();
        loop {
            match self.peek_char() {
                Some('\'') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some('\n') | None => {
                    return TokenKind::Error("unterminated character literal".into());
                }
                Some(_) => self.advance(),
            }
        }
        TokenKind::Char(self.source[start..self.position].to_string())
    }

    /// Scans a numeric literal with any suffix (`1.5f`, `0xFF`, `10UL`).
    fn scan_number(&mut self) -> TokenKind {
        let start = self.position;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else if c == '.' && self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            } else {
                break;
            }
        }
        TokenKind::Number(self.source[start..self.position].to_string())
    }

    /// Scans an identifier or keyword.
    fn scan_ident(&mut self) -> TokenKind {
        let start = self.position;
        while self.peek_char().is_some_and(is_ident_char) {
            self.advance();
        }
        TokenKind::Ident(self.source[start..self.position].to_string())
    }

    /// Scans operators and the remaining punctuation.
    fn scan_punctuation(&mut self) -> TokenKind {
        if let Some(op) = OPERATORS.iter().find(|op| self.rest.starts_with(**op)) {
            for _ in 0..op.len() {
                self.advance();
            }
            return TokenKind::Op((*op).to_string());
        }
        let Some(c) = self.peek_char() else {
            return TokenKind::Eof;
        };
        if c == ':' && self.peek_char_n(1) == Some(':') {
            self.advance();
            self.advance();
            return TokenKind::ColonColon;
        }
        if c == '=' && self.peek_char_n(1) == Some('>') {
            self.advance();
            self.advance();
            return TokenKind::FatArrow;
        }
        self.advance();
        match c {
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '.' => TokenKind::Dot,
            ':' => TokenKind::Colon,
            '?' => TokenKind::Question,
            '=' => TokenKind::Eq,
            '+' | '-' | '*' | '/' | '%' | '!' | '~' | '&' | '|' | '^' => {
                TokenKind::Op(c.to_string())
            }
            c => TokenKind::Error(format!("unexpected character: {c}")),
        }
    }
}

/// Returns true if `c` can start an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Returns true if `c` can appear in an identifier (not at start).
fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
