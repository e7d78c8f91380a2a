// Lexer for GLSL shader source.
//
// Tokenizes the GLSL ES subset handled by the reducer. Uses the `logos` crate
// for DFA-based lexing. Type names are lexed as identifiers and resolved by
// the parser; preprocessor lines are kept whole as `Directive` tokens.
//
// Preconditions: input is valid UTF-8.
// Postconditions: returns all tokens with byte-offset spans, plus any lex errors.
// Failure modes: unrecognized characters and out-of-range literals produce
//   `LexError`; lexing continues.
// Side effects: none.

use logos::{FilterResult, Logos};
use std::fmt;

/// Byte-offset span in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A lexer error with location.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub span: Span,
    pub message: String,
}

/// Result of lexing: tokens plus any errors (non-fatal).
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<(Token, Span)>,
    pub errors: Vec<LexError>,
}

/// GLSL token types.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    // ── Keywords ──
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("discard")]
    Discard,
    #[token("const")]
    Const,
    #[token("uniform")]
    Uniform,
    #[token("in")]
    In,
    #[token("out")]
    Out,
    #[token("inout")]
    InOut,
    #[token("flat")]
    Flat,
    #[token("buffer")]
    Buffer,
    #[token("highp")]
    Highp,
    #[token("mediump")]
    Mediump,
    #[token("lowp")]
    Lowp,
    #[token("precision")]
    Precision,
    #[token("layout")]
    Layout,

    // ── Punctuation ──
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,

    // ── Operators ──
    #[token("=")]
    Assign,
    #[token("+=")]
    AddAssign,
    #[token("-=")]
    SubAssign,
    #[token("*=")]
    MulAssign,
    #[token("/=")]
    DivAssign,
    #[token("%=")]
    RemAssign,
    #[token("++")]
    Inc,
    #[token("--")]
    Dec,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("&")]
    Amp,
    #[token("^")]
    Caret,
    #[token("|")]
    Pipe,
    #[token("&&")]
    AndAnd,
    #[token("^^")]
    XorXor,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,

    // ── Literals ──
    /// `true` / `false`.
    #[token("true", |_| true)]
    #[token("false", |_| false)]
    BoolLit(bool),

    /// Signed integer literal (decimal, octal or hex). Values up to
    /// `0xFFFFFFFF` are accepted and wrap, as in GLSL.
    #[regex(r"[0-9]+|0[xX][0-9a-fA-F]+", parse_int)]
    IntLit(i32),

    /// Unsigned integer literal with a `u` / `U` suffix.
    #[regex(r"([0-9]+|0[xX][0-9a-fA-F]+)[uU]", parse_uint)]
    UintLit(u32),

    /// Floating-point literal. Literals that overflow `f32` are rejected.
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?[fF]?", parse_float)]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?[fF]?", parse_float)]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+[fF]?", parse_float)]
    FloatLit(f32),

    // ── Identifier ──
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    /// A whole preprocessor line, e.g. `#version 310 es`.
    #[regex(r"#[^\n]*", |lex| lex.slice().trim_end().to_string())]
    Directive(String),

    /// `/* ... */`; never emitted, the callback skips to the closing `*/`.
    #[token("/*", skip_block_comment)]
    BlockComment,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::If => "if",
            Token::Else => "else",
            Token::For => "for",
            Token::While => "while",
            Token::Do => "do",
            Token::Return => "return",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::Discard => "discard",
            Token::Const => "const",
            Token::Uniform => "uniform",
            Token::In => "in",
            Token::Out => "out",
            Token::InOut => "inout",
            Token::Flat => "flat",
            Token::Buffer => "buffer",
            Token::Highp => "highp",
            Token::Mediump => "mediump",
            Token::Lowp => "lowp",
            Token::Precision => "precision",
            Token::Layout => "layout",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Comma => ",",
            Token::Semi => ";",
            Token::Dot => ".",
            Token::Question => "?",
            Token::Colon => ":",
            Token::Assign => "=",
            Token::AddAssign => "+=",
            Token::SubAssign => "-=",
            Token::MulAssign => "*=",
            Token::DivAssign => "/=",
            Token::RemAssign => "%=",
            Token::Inc => "++",
            Token::Dec => "--",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Shl => "<<",
            Token::Shr => ">>",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::Le => "<=",
            Token::Ge => ">=",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::Amp => "&",
            Token::Caret => "^",
            Token::Pipe => "|",
            Token::AndAnd => "&&",
            Token::XorXor => "^^",
            Token::OrOr => "||",
            Token::Bang => "!",
            Token::Tilde => "~",
            Token::BoolLit(b) => return write!(f, "{b}"),
            Token::IntLit(v) => return write!(f, "{v}"),
            Token::UintLit(v) => return write!(f, "{v}u"),
            Token::FloatLit(v) => return write!(f, "{v:?}"),
            Token::Ident(name) => return write!(f, "{name}"),
            Token::Directive(text) => return write!(f, "{text}"),
            Token::BlockComment => "/*",
        };
        f.write_str(text)
    }
}

// ── Callbacks ──

fn parse_radix(digits: &str) -> Option<u32> {
    if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).ok()
    } else if digits.len() > 1 && digits.starts_with('0') {
        u32::from_str_radix(&digits[1..], 8).ok()
    } else {
        digits.parse().ok()
    }
}

fn parse_int(lex: &mut logos::Lexer<'_, Token>) -> Option<i32> {
    parse_radix(lex.slice()).map(|v| v as i32)
}

fn parse_uint(lex: &mut logos::Lexer<'_, Token>) -> Option<u32> {
    let slice = lex.slice();
    parse_radix(&slice[..slice.len() - 1])
}

fn parse_float(lex: &mut logos::Lexer<'_, Token>) -> Option<f32> {
    let digits = lex.slice().trim_end_matches(['f', 'F']);
    let value: f32 = digits.parse().ok()?;
    value.is_finite().then_some(value)
}

/// Consume a block comment up to and including `*/`. An unterminated
/// comment swallows the rest of the input and is reported as an error.
fn skip_block_comment(lex: &mut logos::Lexer<'_, Token>) -> FilterResult<(), ()> {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            FilterResult::Skip
        }
        None => {
            lex.bump(rest.len());
            FilterResult::Error(())
        }
    }
}

// ── Public API ──

/// Lex a GLSL source string into tokens.
///
/// Errors are collected and the lexer continues past bad input.
pub fn lex(source: &str) -> LexResult {
    let lexer = Token::lexer(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for (result, range) in lexer.spanned() {
        let span = Span {
            start: range.start,
            end: range.end,
        };
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => errors.push(LexError {
                span,
                message: format!("unexpected input: {:?}", &source[span.start..span.end]),
            }),
        }
    }

    LexResult { tokens, errors }
}

// ── Tests ──
