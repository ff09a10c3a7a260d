use std::fmt;

use crate::token::TokenType;

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Bool(bool),
    Number(f64),
    String(String),
    Nil,
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Bool(value)   => write!(f, "{}", value),
            LiteralValue::Number(value) => write!(f, "{:?}", value),
            LiteralValue::String(value) => write!(f, "{}", value),
            LiteralValue::Nil           => write!(f, "nil")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Bang,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    BangEqual,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Plus,
    Minus,
    Slash,
    Star,
}

impl UnaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOperator::Bang => "!",
            UnaryOperator::Minus => "-"
        }
    }
}

impl TryFrom<TokenType> for UnaryOperator {
    type Error = TokenType;

    fn try_from(token_type: TokenType) -> Result<Self, Self::Error> {
        match token_type {
            TokenType::Bang => Ok(UnaryOperator::Bang),
            TokenType::Minus => Ok(UnaryOperator::Minus),
            _ => Err(token_type)
        }
    }
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::BangEqual =>    "!=",
            BinaryOperator::EqualEqual =>   "==",
            BinaryOperator::Greater =>      ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Less =>         "<",
            BinaryOperator::LessEqual =>    "<=",
            BinaryOperator::Plus =>         "+",
            BinaryOperator::Minus =>        "-",
            BinaryOperator::Slash =>        "/",
            BinaryOperator::Star =>         "*",
        }
    }
}

impl TryFrom<TokenType> for BinaryOperator {
    type Error = TokenType;

    fn try_from(token_type: TokenType) -> Result<Self, Self::Error> {
        match token_type {
            TokenType::BangEqual =>     Ok(BinaryOperator::BangEqual),
            TokenType::EqualEqual =>    Ok(BinaryOperator::EqualEqual),
            TokenType::Greater =>       Ok(BinaryOperator::Greater),
            TokenType::GreaterEqual =>  Ok(BinaryOperator::GreaterEqual),
            TokenType::Less =>          Ok(BinaryOperator::Less),
            TokenType::LessEqual =>     Ok(BinaryOperator::LessEqual),
            TokenType::Plus =>          Ok(BinaryOperator::Plus),
            TokenType::Minus =>         Ok(BinaryOperator::Minus),
            TokenType::Slash =>         Ok(BinaryOperator::Slash),
            TokenType::Star =>          Ok(BinaryOperator::Star),
            _ => Err(token_type)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralValue),
    Grouping(Box<Expr>),
    Unary {
        operator: UnaryOperator,
        right: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        operator: BinaryOperator,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn literal(value: LiteralValue) -> Expr {
        Expr::Literal(value)
    }

    pub fn grouping(inner: Expr) -> Expr {
        Expr::Grouping(Box::new(inner))
    }

    pub fn unary(operator: UnaryOperator, right: Expr) -> Expr {
        Expr::Unary { operator, right: Box::new(right) }
    }

    pub fn binary(left: Expr, operator: BinaryOperator, right: Expr) -> Expr {
        Expr::Binary { left: Box::new(left), operator, right: Box::new(right) }
    }
}

/// Fully parenthesized prefix form, e.g. `(* (- 123.0) (group 45.67))`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::Grouping(inner) => write!(f, "(group {})", inner),
            Expr::Unary { operator, right } => write!(f, "({} {})", operator.symbol(), right),
            Expr::Binary { left, operator, right } => write!(f, "({} {} {})", operator.symbol(), left, right)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn prints_prefix_form() {
        let expr = Expr::binary(
            Expr::unary(UnaryOperator::Minus, Expr::literal(LiteralValue::Number(123.))),
            BinaryOperator::Star,
            Expr::grouping(Expr::literal(LiteralValue::Number(45.67)))
        );
        assert_eq!(expr.to_string(), "(* (- 123.0) (group 45.67))");
    }

    #[test]
    fn prints_literals() {
        assert_eq!(Expr::literal(LiteralValue::Nil).to_string(), "nil");
        assert_eq!(Expr::literal(LiteralValue::Bool(false)).to_string(), "false");
        assert_eq!(Expr::literal(LiteralValue::String("a b".to_owned())).to_string(), "a b");
        assert_eq!(
            Expr::unary(UnaryOperator::Bang, Expr::literal(LiteralValue::Bool(true))).to_string(),
            "(! true)"
        );
    }

    #[test]
    fn operator_conversions() {
        assert_eq!(UnaryOperator::try_from(TokenType::Bang), Ok(UnaryOperator::Bang));
        assert_eq!(UnaryOperator::try_from(TokenType::Plus), Err(TokenType::Plus));
        assert_eq!(BinaryOperator::try_from(TokenType::GreaterEqual), Ok(BinaryOperator::GreaterEqual));
        assert_eq!(BinaryOperator::try_from(TokenType::Bang), Err(TokenType::Bang));
        assert_eq!(BinaryOperator::try_from(TokenType::Equal), Err(TokenType::Equal));
        assert_eq!(BinaryOperator::try_from(TokenType::Slash), Ok(BinaryOperator::Slash));
        assert_eq!(UnaryOperator::try_from(TokenType::Minus), Ok(UnaryOperator::Minus));
    }
}
