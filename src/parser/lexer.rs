//! SQL lexer for MySQL ALTER TABLE scripts.
//!
//! Keywords are not special-cased here: every bare word becomes [`Token::Word`]
//! and the parser matches them case-insensitively.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

/// SQL token types.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare identifier or keyword, original spelling
    Word(String),
    /// Backtick or double-quoted identifier
    Quoted(String),
    /// Single-quoted string literal, unescaped
    Str(String),
    Num(String),

    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,
    Eq,
    /// Any other punctuation
    Symbol(char),

    Eof,
}

impl Token {
    /// Case-insensitive keyword check
    pub fn is_word(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => write!(f, "{}", w),
            Token::Quoted(q) => write!(f, "`{}`", q),
            Token::Str(s) => write!(f, "'{}'", s),
            Token::Num(n) => write!(f, "{}", n),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
            Token::Semicolon => f.write_str(";"),
            Token::Dot => f.write_str("."),
            Token::Eq => f.write_str("="),
            Token::Symbol(c) => write!(f, "{}", c),
            Token::Eof => f.write_str("end of input"),
        }
    }
}

/// A token plus its byte range in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub start: usize,
    pub end: usize,
}

/// SQL lexer.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn current(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map(|&(i, _)| i).unwrap_or(self.input.len())
    }

    /// Character after the current one
    fn lookahead(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next().map(|(_, c)| c)
    }

    fn advance(&mut self) {
        self.chars.next();
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.current() {
            self.advance();
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        self.advance(); // /
        self.advance(); // *
        while let Some(c) = self.current() {
            self.advance();
            if c == '*' && self.current() == Some('/') {
                self.advance();
                break;
            }
        }
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.current() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                word.push(c);
                self.advance();
            } else {
                break;
            }
        }
        word
    }

    /// Quoted identifier or string; a doubled quote is an escaped quote
    fn read_quoted(&mut self, quote: char, backslash_escapes: bool) -> String {
        self.advance(); // opening quote
        let mut out = String::new();
        while let Some(c) = self.current() {
            if c == quote {
                if self.lookahead() == Some(quote) {
                    out.push(c);
                    self.advance();
                    self.advance();
                } else {
                    self.advance(); // closing quote
                    break;
                }
            } else if c == '\\' && backslash_escapes {
                self.advance();
                if let Some(escaped) = self.current() {
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        _ => out.push(escaped),
                    }
                    self.advance();
                }
            } else {
                out.push(c);
                self.advance();
            }
        }
        out
    }

    fn read_number(&mut self) -> String {
        let mut num = String::new();
        let mut has_dot = false;
        while let Some(c) = self.current() {
            if c.is_ascii_digit() {
                num.push(c);
                self.advance();
            } else if c == '.' && !has_dot {
                has_dot = true;
                num.push(c);
                self.advance();
            } else {
                break;
            }
        }
        num
    }

    pub fn next_token(&mut self) -> Spanned {
        loop {
            while self.current().is_some_and(char::is_whitespace) {
                self.advance();
            }

            let start = self.offset();
            let token = match self.current() {
                None => Token::Eof,
                Some('-') if self.lookahead() == Some('-') => {
                    self.skip_line_comment();
                    continue;
                }
                Some('/') if self.lookahead() == Some('*') => {
                    self.skip_block_comment();
                    continue;
                }
                Some('#') => {
                    self.skip_line_comment();
                    continue;
                }
                Some('`') => Token::Quoted(self.read_quoted('`', false)),
                Some('"') => Token::Quoted(self.read_quoted('"', false)),
                Some('\'') => Token::Str(self.read_quoted('\'', true)),
                Some(c) if c.is_ascii_digit() => Token::Num(self.read_number()),
                Some(c) if c.is_alphabetic() || c == '_' => Token::Word(self.read_word()),
                Some(c) => {
                    self.advance();
                    match c {
                        '(' => Token::LParen,
                        ')' => Token::RParen,
                        ',' => Token::Comma,
                        ';' => Token::Semicolon,
                        '.' => Token::Dot,
                        '=' => Token::Eq,
                        other => Token::Symbol(other),
                    }
                }
            };
            let end = self.offset();
            return Spanned { token, start, end };
        }
    }

    /// Collect all tokens, ending with `Eof`.
    pub fn tokenize(&mut self) -> Vec<Spanned> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token();
            let done = spanned.token == Token::Eof;
            tokens.push(spanned);
            if done {
                break;
            }
        }
        tokens
    }
}
