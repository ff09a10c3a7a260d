use std::fmt;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum TokenType {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character tokens
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    String,
    Number,

    // Keywords
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    Eof,
}

impl TokenType {
    /// Reserved word lookup. Returns `None` for plain identifiers.
    pub fn keyword(text: &str) -> Option<TokenType> {
        match text {
            "and" =>    Some(TokenType::And),
            "class" =>  Some(TokenType::Class),
            "else" =>   Some(TokenType::Else),
            "false" =>  Some(TokenType::False),
            "for" =>    Some(TokenType::For),
            "fun" =>    Some(TokenType::Fun),
            "if" =>     Some(TokenType::If),
            "nil" =>    Some(TokenType::Nil),
            "or" =>     Some(TokenType::Or),
            "print" =>  Some(TokenType::Print),
            "return" => Some(TokenType::Return),
            "super" =>  Some(TokenType::Super),
            "this" =>   Some(TokenType::This),
            "true" =>   Some(TokenType::True),
            "var" =>    Some(TokenType::Var),
            "while" =>  Some(TokenType::While),
            _ => None
        }
    }

    fn name(&self) -> &'static str {
        match self {
            TokenType::LeftParen =>     "LEFT_PAREN",
            TokenType::RightParen =>    "RIGHT_PAREN",
            TokenType::LeftBrace =>     "LEFT_BRACE",
            TokenType::RightBrace =>    "RIGHT_BRACE",
            TokenType::Comma =>         "COMMA",
            TokenType::Dot =>           "DOT",
            TokenType::Minus =>         "MINUS",
            TokenType::Plus =>          "PLUS",
            TokenType::Semicolon =>     "SEMICOLON",
            TokenType::Slash =>         "SLASH",
            TokenType::Star =>          "STAR",
            TokenType::Bang =>          "BANG",
            TokenType::BangEqual =>     "BANG_EQUAL",
            TokenType::Equal =>         "EQUAL",
            TokenType::EqualEqual =>    "EQUAL_EQUAL",
            TokenType::Greater =>       "GREATER",
            TokenType::GreaterEqual =>  "GREATER_EQUAL",
            TokenType::Less =>          "LESS",
            TokenType::LessEqual =>     "LESS_EQUAL",
            TokenType::Identifier =>    "IDENTIFIER",
            TokenType::String =>        "STRING",
            TokenType::Number =>        "NUMBER",
            TokenType::And =>           "AND",
            TokenType::Class =>         "CLASS",
            TokenType::Else =>          "ELSE",
            TokenType::False =>         "FALSE",
            TokenType::Fun =>           "FUN",
            TokenType::For =>           "FOR",
            TokenType::If =>            "IF",
            TokenType::Nil =>           "NIL",
            TokenType::Or =>            "OR",
            TokenType::Print =>         "PRINT",
            TokenType::Return =>        "RETURN",
            TokenType::Super =>         "SUPER",
            TokenType::This =>          "THIS",
            TokenType::True =>          "TRUE",
            TokenType::Var =>           "VAR",
            TokenType::While =>         "WHILE",
            TokenType::Eof =>           "EOF",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Value carried by `String` and `Number` tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(f64),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(value) => write!(f, "{}", value),
            Literal::Number(value) => write!(f, "{:?}", value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub literal: Option<Literal>,
    pub line: u32,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.literal {
            Some(literal) => write!(f, "{} {} {}", self.token_type, self.lexeme, literal),
            None => write!(f, "{} {} null", self.token_type, self.lexeme),
        }
    }
}
