// tarn-parser - Lexer for Tarn
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

//! Lexer (tokeniser) for Tarn source code.
//!
//! Converts a source string into a stream of tokens. Comments run from `;`
//! to the end of the line. Numbers are 64-bit floats; a leading `+`, `-` or
//! `.` starts a number only when a digit follows, so `+` and `-` lex as
//! symbols.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Delimiters
    LParen, // (
    RParen, // )

    // Reader macros
    Quote,   // '
    VecOpen, // #(

    // The dot of a dotted pair
    Dot,

    // Literals
    True,  // #t
    False, // #f
    Number(f64),
    String(String),
    Symbol(String),

    // Special
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Quote => write!(f, "'"),
            Token::VecOpen => write!(f, "#("),
            Token::Dot => write!(f, "."),
            Token::True => write!(f, "#t"),
            Token::False => write!(f, "#f"),
            Token::Number(n) => write!(f, "{}", n),
            Token::String(s) => write!(f, "\"{}\"", s),
            Token::Symbol(s) => write!(f, "{}", s),
            Token::Eof => write!(f, "EOF"),
        }
    }
}

/// Lexer error with position information.
#[derive(Debug, Clone)]
pub struct LexerError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lexer error at {}:{}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for LexerError {}

/// The lexer converts source code into tokens.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Current line (1-indexed).
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Current column (1-indexed).
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next();
        match c {
            Some('\n') => {
                self.line += 1;
                self.column = 1;
            }
            Some(_) => self.column += 1,
            None => {}
        }
        c
    }

    fn error(&self, message: impl Into<String>) -> LexerError {
        LexerError {
            message: message.into(),
            line: self.line,
            column: self.column,
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some(';') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Get the next token from the source.
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace_and_comments();

        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        match c {
            '(' => {
                self.advance();
                Ok(Token::LParen)
            }
            ')' => {
                self.advance();
                Ok(Token::RParen)
            }
            '\'' => {
                self.advance();
                Ok(Token::Quote)
            }
            '"' => self.read_string(),
            '#' => self.read_hash(),
            _ => self.read_atom(),
        }
    }

    fn read_string(&mut self) -> Result<Token, LexerError> {
        self.advance(); // opening quote
        let mut out = String::new();
        loop {
            match self.advance() {
                None => return Err(self.error("unterminated string")),
                Some('"') => return Ok(Token::String(out)),
                Some('\\') => match self.advance() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('\\') => out.push('\\'),
                    Some('"') => out.push('"'),
                    Some(other) => {
                        return Err(self.error(format!("unknown escape: \\{}", other)));
                    }
                    None => return Err(self.error("unterminated string escape")),
                },
                Some(other) => out.push(other),
            }
        }
    }

    fn read_hash(&mut self) -> Result<Token, LexerError> {
        self.advance(); // '#'
        match self.advance() {
            Some('t') => Ok(Token::True),
            Some('f') => Ok(Token::False),
            Some('(') => Ok(Token::VecOpen),
            Some(other) => Err(self.error(format!("unsupported # syntax: #{}", other))),
            None => Err(self.error("unexpected end of input after #")),
        }
    }

    fn is_delimiter(c: char) -> bool {
        c.is_whitespace() || matches!(c, '(' | ')' | '"' | ';' | '\'')
    }

    /// Read a number, a symbol, or the dotted-pair dot.
    fn read_atom(&mut self) -> Result<Token, LexerError> {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if Self::is_delimiter(c) {
                break;
            }
            text.push(c);
            self.advance();
        }
        if text.is_empty() {
            return Err(self.error("unexpected character"));
        }
        if text == "." {
            return Ok(Token::Dot);
        }
        if Self::looks_numeric(&text) {
            return text
                .parse::<f64>()
                .map(Token::Number)
                .map_err(|_| self.error(format!("malformed number: {}", text)));
        }
        Ok(Token::Symbol(text))
    }

    /// A token is numeric when it starts with a digit, or with a sign or
    /// dot immediately followed by a digit.
    fn looks_numeric(text: &str) -> bool {
        let mut chars = text.chars();
        match chars.next() {
            Some(c) if c.is_ascii_digit() => true,
            Some('+') | Some('-') | Some('.') => {
                matches!(chars.next(), Some(c) if c.is_ascii_digit())
            }
            _ => false,
        }
    }
}
