//! Token types for declaration sources.
//!
//! Tokens are the output of the lexer and input to the parser. Keywords are
//! lexed as identifiers; the parser decides by context whether a word is
//! reserved (see [`is_reserved`]).

use crate::span::Span;

/// A token from lexical analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The type and value of this token.
    pub kind: TokenKind,
    /// Source location of this token.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the text this token covers in the given source.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.text(source)
    }

    /// Returns true if this token is the identifier or keyword `word`.
    #[must_use]
    pub fn is_word(&self, word: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(name) if name == word)
    }
}

/// Token types.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Delimiters
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `<`
    Lt,
    /// `>`
    Gt,

    // Punctuation
    /// `,`
    Comma,
    /// `;`
    Semi,
    /// `.`
    Dot,
    /// `:`
    Colon,
    /// `::`
    ColonColon,
    /// `?`
    Question,
    /// `=>`
    FatArrow,
    /// `=`
    Eq,
    /// Any other operator (`+`, `==`, `&&`, `+=`, `++`, `??`, ...).
    Op(String),

    // Literals and names
    /// Identifier or keyword.
    Ident(String),
    /// Numeric literal, kept as written.
    Number(String),
    /// String literal including quotes and prefixes (`@`, `$`), kept as written.
    Str(String),
    /// Character literal including quotes, kept as written.
    Char(String),

    // Meta
    /// Comment or preprocessor line.
    Comment(String),
    /// End of input
    Eof,
    /// Lexer error
    Error(String),
}

impl TokenKind {
    /// Returns true if this token kind should be ignored during parsing.
    #[must_use]
    pub const fn is_trivia(&self) -> bool {
        matches!(self, Self::Comment(_))
    }

    /// Returns a human-readable name for this token kind.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::LParen => "'('".into(),
            Self::RParen => "')'".into(),
            Self::LBracket => "'['".into(),
            Self::RBracket => "']'".into(),
            Self::LBrace => "'{'".into(),
            Self::RBrace => "'}'".into(),
            Self::Lt => "'<'".into(),
            Self::Gt => "'>'".into(),
            Self::Comma => "','".into(),
            Self::Semi => "';'".into(),
            Self::Dot => "'.'".into(),
            Self::Colon => "':'".into(),
            Self::ColonColon => "'::'".into(),
            Self::Question => "'?'".into(),
            Self::FatArrow => "'=>'".into(),
            Self::Eq => "'='".into(),
            Self::Op(op) => format!("'{op}'"),
            Self::Ident(name) => format!("identifier '{name}'"),
            Self::Number(_) => "number".into(),
            Self::Str(_) => "string".into(),
            Self::Char(_) => "character".into(),
            Self::Comment(_) => "comment".into(),
            Self::Eof => "end of input".into(),
            Self::Error(_) => "error".into(),
        }
    }
}

/// Words that can never be used as identifiers.
const RESERVED: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "class",
    "const", "continue", "decimal", "default", "delegate", "do", "double", "else", "enum",
    "event", "explicit", "extern", "false", "finally", "float", "for", "foreach", "if",
    "implicit", "in", "int", "interface", "internal", "is", "long", "namespace", "new",
    "null", "object", "operator", "out", "override", "params", "private", "protected",
    "public", "readonly", "ref", "return", "sbyte", "sealed", "short", "static", "string",
    "struct", "this", "throw", "true", "try", "typeof", "uint", "ulong", "unsafe", "ushort",
    "using", "virtual", "void", "volatile", "while",
];

/// Returns true if `word` is a reserved keyword.
#[must_use]
pub fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word)
}
