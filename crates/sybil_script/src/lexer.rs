//! Tokenizer for snippet source.
//!
//! Logos recognizes the tokens of a single line; `lex` layers the
//! indentation structure on top, emitting `Newline` at the end of each
//! logical line and `Indent`/`Dedent` when the leading whitespace of the
//! next logical line changes. Newlines inside brackets and after a trailing
//! backslash do not end a logical line. Blank and comment-only lines are
//! ignored entirely.

use logos::Logos;

use crate::errors::{syntax_error, ScriptResult};

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
enum RawToken {
    #[regex(r"#[^\n]*")]
    Comment,

    #[token("\n")]
    Newline,

    #[regex(r"\\[ \t\r]*\n")]
    LineContinuation,

    // === Keywords ===
    #[token("and")]
    And,
    #[token("assert")]
    Assert,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("def")]
    Def,
    #[token("del")]
    Del,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("False")]
    False,
    #[token("for")]
    For,
    #[token("if")]
    If,
    #[token("in")]
    In,
    #[token("is")]
    Is,
    #[token("None")]
    None,
    #[token("not")]
    Not,
    #[token("or")]
    Or,
    #[token("pass")]
    Pass,
    #[token("raise")]
    Raise,
    #[token("return")]
    Return,
    #[token("True")]
    True,
    #[token("while")]
    While,

    // === Symbols ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,

    // === Operators ===
    #[token("==")]
    EqEq,
    #[token("=")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token("<")]
    Lt,
    #[token(">=")]
    GtEq,
    #[token(">")]
    Gt,
    #[token("+=")]
    PlusEq,
    #[token("+")]
    Plus,
    #[token("-=")]
    MinusEq,
    #[token("-")]
    Minus,
    #[token("*=")]
    StarEq,
    #[token("*")]
    Star,
    #[token("//")]
    SlashSlash,
    #[token("/=")]
    SlashEq,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    // === Literals ===
    #[regex(r"[0-9][0-9_]*", |lex| {
        lex.slice().replace('_', "").parse::<i64>().ok()
    })]
    Int(i64),

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?|[0-9][0-9_]*[eE][+-]?[0-9]+", |lex| {
        lex.slice().replace('_', "").parse::<f64>().ok()
    })]
    Float(f64),

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    String,

    #[regex(r#"b"([^"\\\n]|\\.)*""#)]
    #[regex(r"b'([^'\\\n]|\\.)*'")]
    Bytes,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Ident(String),

    And,
    Assert,
    Break,
    Continue,
    Def,
    Del,
    Elif,
    Else,
    False,
    For,
    If,
    In,
    Is,
    None,
    Not,
    Or,
    Pass,
    Raise,
    Return,
    True,
    While,

    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon,

    Eq,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    PlusEq,
    Minus,
    MinusEq,
    Star,
    StarEq,
    Slash,
    SlashSlash,
    SlashEq,
    Percent,

    Newline,
    Indent,
    Dedent,
    Eof,
}

impl TokenKind {
    /// Human-readable name used in syntax error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Int(n) => format!("integer {n}"),
            TokenKind::Float(x) => format!("float {x}"),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::Bytes(_) => "bytes literal".to_string(),
            TokenKind::Ident(name) => format!("name '{name}'"),
            TokenKind::Newline => "end of line".to_string(),
            TokenKind::Indent => "indent".to_string(),
            TokenKind::Dedent => "dedent".to_string(),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("'{}'", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::And => "and",
            TokenKind::Assert => "assert",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Def => "def",
            TokenKind::Del => "del",
            TokenKind::Elif => "elif",
            TokenKind::Else => "else",
            TokenKind::False => "False",
            TokenKind::For => "for",
            TokenKind::If => "if",
            TokenKind::In => "in",
            TokenKind::Is => "is",
            TokenKind::None => "None",
            TokenKind::Not => "not",
            TokenKind::Or => "or",
            TokenKind::Pass => "pass",
            TokenKind::Raise => "raise",
            TokenKind::Return => "return",
            TokenKind::True => "True",
            TokenKind::While => "while",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Plus => "+",
            TokenKind::PlusEq => "+=",
            TokenKind::Minus => "-",
            TokenKind::MinusEq => "-=",
            TokenKind::Star => "*",
            TokenKind::StarEq => "*=",
            TokenKind::Slash => "/",
            TokenKind::SlashSlash => "//",
            TokenKind::SlashEq => "/=",
            TokenKind::Percent => "%",
            _ => "?",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Document line the token starts on.
    pub line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, line: u32) -> Self {
        Token { kind, line }
    }
}

/// Tokenize `source`, numbering its first line `first_line`.
pub fn lex(source: &str, first_line: u32) -> ScriptResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut indents: Vec<usize> = vec![0];
    let mut depth = 0usize;
    let mut line = first_line;
    let mut at_line_start = true;
    let mut logos = RawToken::lexer(source);

    while let Some(token_result) = logos.next() {
        let span = logos.span();
        let slice = logos.slice();

        let Ok(raw) = token_result else {
            let message = if slice.starts_with(['\'', '"']) || slice.starts_with("b'") {
                "unterminated string literal".to_string()
            } else if slice.starts_with(|c: char| c.is_ascii_digit()) {
                format!("invalid number literal '{slice}'")
            } else {
                format!("invalid character '{slice}'")
            };
            return Err(syntax_error(message, line));
        };

        match raw {
            RawToken::Comment => continue,
            RawToken::LineContinuation => {
                line += 1;
                continue;
            }
            RawToken::Newline => {
                if depth == 0 {
                    if !at_line_start {
                        tokens.push(Token::new(TokenKind::Newline, line));
                    }
                    at_line_start = true;
                }
                line += 1;
                continue;
            }
            _ => {}
        }

        if at_line_start {
            let column = indentation_before(source, span.start);
            let current = indents.last().copied().unwrap_or(0);
            if column > current {
                indents.push(column);
                tokens.push(Token::new(TokenKind::Indent, line));
            } else {
                while column < indents.last().copied().unwrap_or(0) {
                    indents.pop();
                    tokens.push(Token::new(TokenKind::Dedent, line));
                }
                if column != indents.last().copied().unwrap_or(0) {
                    return Err(syntax_error(
                        "unindent does not match any outer indentation level",
                        line,
                    ));
                }
            }
            at_line_start = false;
        }

        match raw {
            RawToken::LParen | RawToken::LBracket | RawToken::LBrace => depth += 1,
            RawToken::RParen | RawToken::RBracket | RawToken::RBrace => {
                depth = depth.saturating_sub(1);
            }
            _ => {}
        }

        let kind = convert_token(raw, slice, line)?;
        tokens.push(Token::new(kind, line));
    }

    if !at_line_start {
        tokens.push(Token::new(TokenKind::Newline, line));
    }
    while indents.len() > 1 {
        indents.pop();
        tokens.push(Token::new(TokenKind::Dedent, line));
    }
    tokens.push(Token::new(TokenKind::Eof, line));

    tracing::trace!(count = tokens.len(), first_line, "lexed snippet");
    Ok(tokens)
}

/// Width of the whitespace between the start of the line and `offset`.
/// Tabs advance to the next multiple of eight.
fn indentation_before(source: &str, offset: usize) -> usize {
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    source[line_start..offset].chars().fold(0, |col, c| match c {
        '\t' => (col / 8 + 1) * 8,
        '\r' => col,
        _ => col + 1,
    })
}

fn convert_token(raw: RawToken, slice: &str, line: u32) -> ScriptResult<TokenKind> {
    Ok(match raw {
        RawToken::Int(n) => TokenKind::Int(n),
        RawToken::Float(x) => TokenKind::Float(x),
        RawToken::String => TokenKind::Str(unescape_string(&slice[1..slice.len() - 1], line)?),
        RawToken::Bytes => TokenKind::Bytes(unescape_bytes(&slice[2..slice.len() - 1], line)?),
        RawToken::Ident => TokenKind::Ident(slice.to_string()),

        RawToken::And => TokenKind::And,
        RawToken::Assert => TokenKind::Assert,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Def => TokenKind::Def,
        RawToken::Del => TokenKind::Del,
        RawToken::Elif => TokenKind::Elif,
        RawToken::Else => TokenKind::Else,
        RawToken::False => TokenKind::False,
        RawToken::For => TokenKind::For,
        RawToken::If => TokenKind::If,
        RawToken::In => TokenKind::In,
        RawToken::Is => TokenKind::Is,
        RawToken::None => TokenKind::None,
        RawToken::Not => TokenKind::Not,
        RawToken::Or => TokenKind::Or,
        RawToken::Pass => TokenKind::Pass,
        RawToken::Raise => TokenKind::Raise,
        RawToken::Return => TokenKind::Return,
        RawToken::True => TokenKind::True,
        RawToken::While => TokenKind::While,

        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Semicolon => TokenKind::Semicolon,

        RawToken::EqEq => TokenKind::EqEq,
        RawToken::Eq => TokenKind::Eq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::PlusEq => TokenKind::PlusEq,
        RawToken::Plus => TokenKind::Plus,
        RawToken::MinusEq => TokenKind::MinusEq,
        RawToken::Minus => TokenKind::Minus,
        RawToken::StarEq => TokenKind::StarEq,
        RawToken::Star => TokenKind::Star,
        RawToken::SlashSlash => TokenKind::SlashSlash,
        RawToken::SlashEq => TokenKind::SlashEq,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,

        RawToken::Comment | RawToken::Newline | RawToken::LineContinuation => {
            return Err(syntax_error("unexpected trivia token", line));
        }
    })
}

/// Process escape sequences in a string body (quotes already stripped).
/// Unknown escapes are kept verbatim, backslash included.
fn unescape_string(body: &str, line: u32) -> ScriptResult<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('x') => out.push(hex_escape(&mut chars, 2, line)?),
            Some('u') => out.push(hex_escape(&mut chars, 4, line)?),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Ok(out)
}

fn hex_escape(chars: &mut std::str::Chars<'_>, width: usize, line: u32) -> ScriptResult<char> {
    let digits: String = chars.by_ref().take(width).collect();
    if digits.len() != width {
        return Err(syntax_error("truncated escape sequence", line));
    }
    u32::from_str_radix(&digits, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| syntax_error(format!("invalid escape sequence '{digits}'"), line))
}

fn unescape_bytes(body: &str, line: u32) -> ScriptResult<Vec<u8>> {
    if !body.is_ascii() {
        return Err(syntax_error(
            "bytes can only contain ASCII literal characters",
            line,
        ));
    }
    let text = unescape_string(body, line)?;
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).map_err(|_| syntax_error("invalid byte escape", line)))
        .collect()
}
