use std::{fmt, iter::Peekable, str::Chars};

use log::{debug, trace};

use crate::reporter::Reporter;
use crate::token::{Literal, Token, TokenType};

#[derive(Debug, PartialEq)]
pub enum LexerError {
    UnexpectedCharacter { line: u32, character: char },
    UnterminatedString { line: u32 }
}

impl LexerError {
    pub fn line(&self) -> u32 {
        match self {
            LexerError::UnexpectedCharacter { line, .. } => *line,
            LexerError::UnterminatedString { line } => *line
        }
    }
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexerError::UnexpectedCharacter { character, .. } => write!(f, "Unexpected character '{}'.", character),
            LexerError::UnterminatedString { .. } => write!(f, "Unterminated string.")
        }
    }
}

impl std::error::Error for LexerError {}

/// Result of scanning one unit of input.
///
/// `tokens` always ends with a single `Eof` token. `comment_depth` is the
/// number of block comments still open at the end of the input and has to be
/// handed to the next call when the input continues (prompt mode).
#[derive(Debug, PartialEq)]
pub struct Scan {
    pub tokens: Vec<Token>,
    pub comment_depth: u32
}

/// Scans `source` to the end, reporting lexical errors and skipping past them.
pub fn scan<R: Reporter + ?Sized>(source: &str, comment_depth: u32, reporter: &mut R) -> Scan {
    let mut lexer = Lexer::new(source, comment_depth);
    let mut tokens = Vec::new();

    loop {
        match lexer.scan_token() {
            Ok(token) => {
                trace!("[Line {}] {}", token.line, token);
                let is_eof = token.token_type == TokenType::Eof;
                tokens.push(token);
                if is_eof {
                    break;
                }
            },
            Err(err) => reporter.report(err.line(), "", &err.to_string())
        }
    }

    if lexer.comment_depth() != comment_depth {
        debug!("Block comment depth {} -> {}", comment_depth, lexer.comment_depth());
    }

    Scan {
        tokens,
        comment_depth: lexer.comment_depth()
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    start: usize,
    current_index: usize,
    source_iterator: Peekable<Chars<'a>>,
    line: u32,
    comment_depth: u32
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, comment_depth: u32) -> Lexer<'a> {
        Lexer {
            source,
            start: 0,
            current_index: 0,
            source_iterator: source.chars().peekable(),
            line: 1,
            comment_depth
        }
    }

    pub fn comment_depth(&self) -> u32 {
        self.comment_depth
    }

    /// Returns the next token, or `Eof` once the input is exhausted.
    /// A returned error has already consumed the offending input.
    pub fn scan_token(&mut self) -> Result<Token, LexerError> {
        self.comments_and_whitespaces();

        self.start = self.current_index;

        let c = match self.advance() {
            Some(c) => c,
            None => return Ok(self.make_token(TokenType::Eof))
        };

        if let Some(token) = self.identifier(c) {
            return Ok(token);
        }
        if let Some(token) = self.number(c) {
            return Ok(token);
        }

        match c {
            // Single-character
            '(' => Ok(self.make_token(TokenType::LeftParen)),
            ')' => Ok(self.make_token(TokenType::RightParen)),
            '{' => Ok(self.make_token(TokenType::LeftBrace)),
            '}' => Ok(self.make_token(TokenType::RightBrace)),
            ',' => Ok(self.make_token(TokenType::Comma)),
            '.' => Ok(self.make_token(TokenType::Dot)),
            '-' => Ok(self.make_token(TokenType::Minus)),
            '+' => Ok(self.make_token(TokenType::Plus)),
            ';' => Ok(self.make_token(TokenType::Semicolon)),
            '*' => Ok(self.make_token(TokenType::Star)),
            // Comments were already skipped, so this is division
            '/' => Ok(self.make_token(TokenType::Slash)),

            // One or two character tokens
            '!' => Ok(self.make_token_if_next('=', TokenType::BangEqual, TokenType::Bang)),
            '=' => Ok(self.make_token_if_next('=', TokenType::EqualEqual, TokenType::Equal)),
            '<' => Ok(self.make_token_if_next('=', TokenType::LessEqual, TokenType::Less)),
            '>' => Ok(self.make_token_if_next('=', TokenType::GreaterEqual, TokenType::Greater)),

            // Literals
            '"' => self.string(),

            _ => Err(LexerError::UnexpectedCharacter { line: self.line, character: c })
        }
    }

    /// Skips whitespace, line comments and (nested) block comments.
    /// Stops early with `comment_depth > 0` when the input ends inside a block comment.
    fn comments_and_whitespaces(&mut self) {
        loop {
            if self.comment_depth > 0 {
                self.block_comment();
                if self.comment_depth > 0 {
                    return;
                }
            }

            match self.peek() {
                Some(' ') | Some('\r') | Some('\t') => {
                    self.advance();
                },
                Some('\n') => {
                    self.line += 1;
                    self.advance();
                },
                Some('/') => match self.peek_next() {
                    Some('/') => {
                        while let Some(c) = self.peek() {
                            if c == '\n' {
                                break;
                            }
                            self.advance();
                        }
                    },
                    Some('*') => {
                        self.advance();
                        self.advance();
                        self.comment_depth += 1;
                    },
                    // Leave it to be handled as a Slash token
                    _ => return
                },
                _ => return
            }
        }
    }

    fn block_comment(&mut self) {
        while self.comment_depth > 0 {
            match (self.peek(), self.peek_next()) {
                (None, _) => break,
                (Some('/'), Some('*')) => {
                    self.advance();
                    self.advance();
                    self.comment_depth += 1;
                },
                (Some('*'), Some('/')) => {
                    self.advance();
                    self.advance();
                    self.comment_depth -= 1;
                },
                (Some('\n'), _) => {
                    self.line += 1;
                    self.advance();
                },
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn identifier(&mut self, c: char) -> Option<Token> {
        if c.is_ascii_alphabetic() || c == '_' {
            while let Some(c) = self.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    self.advance();
                    continue;
                }
                break;
            }

            let lexeme = &self.source[self.start..self.current_index];
            let token_type = TokenType::keyword(lexeme).unwrap_or(TokenType::Identifier);
            return Some(self.make_token(token_type));
        }
        None
    }

    fn number(&mut self, c: char) -> Option<Token> {
        if c.is_ascii_digit() {
            self.digits();

            if self.peek() == Some('.') && self.peek_next().map_or(false, |d| d.is_ascii_digit()) {
                self.advance();
                self.digits();
            }

            let mut token = self.make_token(TokenType::Number);
            token.literal = token.lexeme.parse().ok().map(Literal::Number);
            return Some(token);
        }
        None
    }

    fn digits(&mut self) {
        while let Some(d) = self.peek() {
            if d.is_ascii_digit() {
                self.advance();
                continue;
            }
            break;
        }
    }

    /// Called after the opening quote. The token keeps the line of the opening quote.
    fn string(&mut self) -> Result<Token, LexerError> {
        let start_line = self.line;
        let mut value = String::new();

        loop {
            match self.advance() {
                None => return Err(LexerError::UnterminatedString { line: self.line }),
                Some('"') => break,
                Some('\n') => {
                    self.line += 1;
                    value.push('\n');
                },
                Some('\\') => match self.advance() {
                    None => return Err(LexerError::UnterminatedString { line: self.line }),
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(other) => {
                        if other == '\n' {
                            self.line += 1;
                        }
                        value.push('\\');
                        value.push(other);
                    }
                },
                Some(c) => value.push(c)
            }
        }

        Ok(Token {
            token_type: TokenType::String,
            lexeme: self.source[self.start..self.current_index].to_owned(),
            literal: Some(Literal::String(value)),
            line: start_line
        })
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.source_iterator.next()?;
        self.current_index += c.len_utf8();
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.source_iterator.peek().copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source[self.current_index..].chars().nth(1)
    }

    fn make_token(&self, token_type: TokenType) -> Token {
        Token {
            token_type,
            lexeme: self.source[self.start..self.current_index].to_owned(),
            literal: None,
            line: self.line
        }
    }

    fn make_token_if_next(&mut self, expected: char, matched: TokenType, otherwise: TokenType) -> Token {
        if self.peek() == Some(expected) {
            self.advance();
            return self.make_token(matched);
        }
        self.make_token(otherwise)
    }
}
