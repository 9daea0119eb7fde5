//! Tokenizer for Go source text.
//!
//! Produces just enough of the Go token set to parse top-level declarations:
//! identifiers, keywords, literals and punctuation. Comments are dropped and
//! semicolons are inserted at line ends following the Go spec rules.

use super::{Pos, SyntaxError};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords we branch on
    Package,
    Import,
    Type,
    Func,
    Var,
    Const,
    Struct,
    Interface,
    Map,
    Chan,
    /// break / continue / fallthrough / return: trigger semicolon insertion
    FlowKeyword(String),
    /// any other Go keyword (if, for, switch, ...)
    Keyword(String),

    Ident(String),
    /// Integer, float or imaginary literal, kept as written.
    Number(String),
    /// String literal; `raw` is the source text including quotes.
    Str { raw: String, value: String },
    Rune(String),

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Dot,
    Ellipsis,
    Star,
    Assign,
    Tilde,
    Arrow,    // <-
    IncDec,   // ++ / --
    Op(String),

    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Package => "'package'".into(),
            TokenKind::Import => "'import'".into(),
            TokenKind::Type => "'type'".into(),
            TokenKind::Func => "'func'".into(),
            TokenKind::Var => "'var'".into(),
            TokenKind::Const => "'const'".into(),
            TokenKind::Struct => "'struct'".into(),
            TokenKind::Interface => "'interface'".into(),
            TokenKind::Map => "'map'".into(),
            TokenKind::Chan => "'chan'".into(),
            TokenKind::FlowKeyword(k) | TokenKind::Keyword(k) => format!("'{k}'"),
            TokenKind::Ident(name) => format!("identifier '{name}'"),
            TokenKind::Number(n) => format!("number {n}"),
            TokenKind::Str { raw, .. } => format!("string {raw}"),
            TokenKind::Rune(r) => format!("rune {r}"),
            TokenKind::LParen => "'('".into(),
            TokenKind::RParen => "')'".into(),
            TokenKind::LBrace => "'{'".into(),
            TokenKind::RBrace => "'}'".into(),
            TokenKind::LBracket => "'['".into(),
            TokenKind::RBracket => "']'".into(),
            TokenKind::Comma => "','".into(),
            TokenKind::Semicolon => "';'".into(),
            TokenKind::Dot => "'.'".into(),
            TokenKind::Ellipsis => "'...'".into(),
            TokenKind::Star => "'*'".into(),
            TokenKind::Assign => "'='".into(),
            TokenKind::Tilde => "'~'".into(),
            TokenKind::Arrow => "'<-'".into(),
            TokenKind::IncDec => "'++'/'--'".into(),
            TokenKind::Op(op) => format!("'{op}'"),
            TokenKind::Eof => "end of file".into(),
        }
    }

    /// Tokens after which a newline becomes a semicolon.
    fn ends_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::Number(_)
                | TokenKind::Str { .. }
                | TokenKind::Rune(_)
                | TokenKind::FlowKeyword(_)
                | TokenKind::IncDec
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
}

pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { chars: source.chars().peekable(), line: 1, column: 1, tokens: Vec::new() }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, SyntaxError> {
        loop {
            self.skip_blanks();
            let pos = self.pos();
            let Some(c) = self.bump() else { break };
            match c {
                '\n' => self.newline(pos),
                '/' if self.peek() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' { break; }
                        self.bump();
                    }
                }
                '/' if self.peek() == Some('*') => {
                    self.bump();
                    let saw_newline = self.block_comment(pos)?;
                    // a block comment spanning lines acts like a newline
                    if saw_newline { self.newline(pos); }
                }
                '"' => {
                    let (raw, value) = self.interpreted_string(pos)?;
                    self.push(TokenKind::Str { raw, value }, pos);
                }
                '`' => {
                    let mut value = String::new();
                    loop {
                        match self.bump() {
                            Some('`') => break,
                            Some(c) => value.push(c),
                            None => return Err(SyntaxError::new("raw string literal not terminated", pos)),
                        }
                    }
                    self.push(TokenKind::Str { raw: format!("`{value}`"), value }, pos);
                }
                '\'' => {
                    let rune = self.rune(pos)?;
                    self.push(TokenKind::Rune(rune), pos);
                }
                c if is_ident_start(c) => {
                    let mut word = String::from(c);
                    while let Some(c) = self.peek() {
                        if !is_ident_continue(c) { break; }
                        word.push(c);
                        self.bump();
                    }
                    self.push(keyword_or_ident(word), pos);
                }
                c if c.is_ascii_digit() => {
                    let number = self.number(c);
                    self.push(TokenKind::Number(number), pos);
                }
                '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                    let number = self.number('.');
                    self.push(TokenKind::Number(number), pos);
                }
                '.' => {
                    if self.peek() == Some('.') {
                        self.bump();
                        if self.bump() != Some('.') {
                            return Err(SyntaxError::new("unexpected '..'", pos));
                        }
                        self.push(TokenKind::Ellipsis, pos);
                    } else {
                        self.push(TokenKind::Dot, pos);
                    }
                }
                '(' => self.push(TokenKind::LParen, pos),
                ')' => self.push(TokenKind::RParen, pos),
                '{' => self.push(TokenKind::LBrace, pos),
                '}' => self.push(TokenKind::RBrace, pos),
                '[' => self.push(TokenKind::LBracket, pos),
                ']' => self.push(TokenKind::RBracket, pos),
                ',' => self.push(TokenKind::Comma, pos),
                ';' => self.push(TokenKind::Semicolon, pos),
                '~' => self.push(TokenKind::Tilde, pos),
                '*' if self.peek() == Some('=') => { self.bump(); self.push(TokenKind::Op("*=".into()), pos) }
                '*' => self.push(TokenKind::Star, pos),
                '=' if self.peek() == Some('=') => { self.bump(); self.push(TokenKind::Op("==".into()), pos) }
                '=' => self.push(TokenKind::Assign, pos),
                '<' if self.peek() == Some('-') => { self.bump(); self.push(TokenKind::Arrow, pos) }
                '+' | '-' if self.peek() == Some(c) => { self.bump(); self.push(TokenKind::IncDec, pos) }
                '+' | '-' | '/' | '%' | '&' | '|' | '^' | '<' | '>' | '!' | ':' => {
                    let mut op = String::from(c);
                    while let Some(next) = self.peek() {
                        if !matches!(next, '=' | '<' | '>' | '&' | '|' | '^') { break; }
                        op.push(next);
                        self.bump();
                    }
                    self.push(TokenKind::Op(op), pos);
                }
                other => {
                    return Err(SyntaxError::new(format!("invalid character {other:?}"), pos));
                }
            }
        }
        let pos = self.pos();
        self.newline(pos);
        self.tokens.push(Token { kind: TokenKind::Eof, pos });
        Ok(self.tokens)
    }

    // ---- helpers ----

    fn pos(&self) -> Pos { Pos { line: self.line, column: self.column } }

    fn peek(&mut self) -> Option<char> { self.chars.peek().copied() }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, pos: Pos) {
        self.tokens.push(Token { kind, pos });
    }

    fn newline(&mut self, pos: Pos) {
        if self.tokens.last().is_some_and(|t| t.kind.ends_statement()) {
            self.push(TokenKind::Semicolon, pos);
        }
    }

    fn skip_blanks(&mut self) {
        while let Some(c) = self.peek() {
            if !matches!(c, ' ' | '\t' | '\r') { break; }
            self.bump();
        }
    }

    fn block_comment(&mut self, start: Pos) -> Result<bool, SyntaxError> {
        let mut saw_newline = false;
        loop {
            match self.bump() {
                Some('*') if self.peek() == Some('/') => {
                    self.bump();
                    return Ok(saw_newline);
                }
                Some('\n') => saw_newline = true,
                Some(_) => {}
                None => return Err(SyntaxError::new("comment not terminated", start)),
            }
        }
    }

    fn interpreted_string(&mut self, start: Pos) -> Result<(String, String), SyntaxError> {
        let mut raw = String::from('"');
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => {
                    raw.push('"');
                    return Ok((raw, value));
                }
                Some('\\') => {
                    raw.push('\\');
                    let Some(escaped) = self.bump() else { break };
                    raw.push(escaped);
                    match escaped {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        '\\' => value.push('\\'),
                        '"' => value.push('"'),
                        '\'' => value.push('\''),
                        // numeric escapes are kept verbatim; tags never rely on them
                        other => { value.push('\\'); value.push(other); }
                    }
                }
                Some('\n') | None => break,
                Some(c) => { raw.push(c); value.push(c); }
            }
        }
        Err(SyntaxError::new("string literal not terminated", start))
    }

    fn rune(&mut self, start: Pos) -> Result<String, SyntaxError> {
        let mut raw = String::from('\'');
        loop {
            match self.bump() {
                Some('\'') => {
                    raw.push('\'');
                    return Ok(raw);
                }
                Some('\\') => {
                    raw.push('\\');
                    match self.bump() {
                        Some(c) if c != '\n' => raw.push(c),
                        _ => break,
                    }
                }
                Some('\n') | None => break,
                Some(c) => raw.push(c),
            }
        }
        Err(SyntaxError::new("rune literal not terminated", start))
    }

    fn number(&mut self, first: char) -> String {
        let mut number = String::from(first);
        let hex = |n: &str| n.starts_with("0x") || n.starts_with("0X");
        while let Some(c) = self.peek() {
            let exponent_sign = matches!(c, '+' | '-')
                && match number.chars().last() {
                    Some('e' | 'E') => !hex(&number),
                    Some('p' | 'P') => true,
                    _ => false,
                };
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign {
                number.push(c);
                self.bump();
            } else {
                break;
            }
        }
        number
    }
}

fn is_ident_start(c: char) -> bool { c == '_' || c.is_alphabetic() }

fn is_ident_continue(c: char) -> bool { c == '_' || c.is_alphanumeric() }

fn keyword_or_ident(word: String) -> TokenKind {
    match word.as_str() {
        "package" => TokenKind::Package,
        "import" => TokenKind::Import,
        "type" => TokenKind::Type,
        "func" => TokenKind::Func,
        "var" => TokenKind::Var,
        "const" => TokenKind::Const,
        "struct" => TokenKind::Struct,
        "interface" => TokenKind::Interface,
        "map" => TokenKind::Map,
        "chan" => TokenKind::Chan,
        "break" | "continue" | "fallthrough" | "return" => TokenKind::FlowKeyword(word),
        "case" | "default" | "defer" | "else" | "for" | "go" | "goto" | "if" | "range"
        | "select" | "switch" => TokenKind::Keyword(word),
        _ => TokenKind::Ident(word),
    }
}
