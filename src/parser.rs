// expression     → equality ;
// equality       → comparison ( ( "!=" | "==" ) comparison )* ;
// comparison     → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
// term           → factor ( ( "-" | "+" ) factor )* ;
// factor         → unary ( ( "/" | "*" ) unary )* ;
// unary          → ( "!" | "-" ) unary | primary ;
// primary        → NUMBER | STRING | "true" | "false" | "nil" | "(" expression ")" ;

use std::fmt;

use log::debug;

use crate::ast::{BinaryOperator, Expr, LiteralValue, UnaryOperator};
use crate::reporter::{format_report, Reporter};
use crate::token::{Literal, Token, TokenType};

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub line: u32,
    pub location: String,
    pub message: String,
}

impl ParseError {
    pub fn report<R: Reporter + ?Sized>(&self, reporter: &mut R) {
        reporter.report(self.line, &self.location, &self.message);
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_report(self.line, &self.location, &self.message))
    }
}

impl std::error::Error for ParseError {}

type ParseResult = Result<Expr, ParseError>;

/// Deepest chain of unary operators and groupings accepted before giving up.
const MAX_NESTING: usize = 128;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
}

impl Parser {
    /// Appends an `Eof` token when `tokens` does not already end with one.
    pub fn new(mut tokens: Vec<Token>) -> Parser {
        if tokens.last().map_or(true, |token| token.token_type != TokenType::Eof) {
            let line = tokens.last().map_or(1, |token| token.line);
            tokens.push(Token {
                token_type: TokenType::Eof,
                lexeme: String::new(),
                literal: None,
                line,
            });
        }

        Parser { tokens, current: 0, depth: 0 }
    }

    /// Parses a single expression that must span the whole token sequence.
    pub fn parse(&mut self) -> ParseResult {
        let expr = self.expression()?;
        if !self.is_at_end() {
            return Err(self.error(self.peek(), "Expect end of expression."));
        }

        debug!("Parsed {}", expr);
        Ok(expr)
    }

    //////////////////////////////////////////////////////////////////////////
    /// Grammar rules
    //////////////////////////////////////////////////////////////////////////

    fn expression(&mut self) -> ParseResult {
        self.equality()
    }

    fn equality(&mut self) -> ParseResult {
        self.left_associative(&[TokenType::BangEqual, TokenType::EqualEqual], Parser::comparison)
    }

    fn comparison(&mut self) -> ParseResult {
        self.left_associative(
            &[TokenType::Greater, TokenType::GreaterEqual, TokenType::Less, TokenType::LessEqual],
            Parser::term
        )
    }

    fn term(&mut self) -> ParseResult {
        self.left_associative(&[TokenType::Minus, TokenType::Plus], Parser::factor)
    }

    fn factor(&mut self) -> ParseResult {
        self.left_associative(&[TokenType::Slash, TokenType::Star], Parser::unary)
    }

    fn unary(&mut self) -> ParseResult {
        if self.match_types(&[TokenType::Bang, TokenType::Minus]) {
            let operator = UnaryOperator::try_from(self.previous().token_type)
                .map_err(|_| self.error(self.previous(), "Expect unary operator."))?;
            let right = self.nested(Parser::unary)?;
            return Ok(Expr::unary(operator, right));
        }

        self.primary()
    }

    fn primary(&mut self) -> ParseResult {
        if self.match_types(&[TokenType::False]) {
            return Ok(Expr::literal(LiteralValue::Bool(false)));
        }
        if self.match_types(&[TokenType::True]) {
            return Ok(Expr::literal(LiteralValue::Bool(true)));
        }
        if self.match_types(&[TokenType::Nil]) {
            return Ok(Expr::literal(LiteralValue::Nil));
        }

        if self.match_types(&[TokenType::Number, TokenType::String]) {
            let token = self.previous();
            return match &token.literal {
                Some(Literal::Number(value)) => Ok(Expr::literal(LiteralValue::Number(*value))),
                Some(Literal::String(value)) => Ok(Expr::literal(LiteralValue::String(value.clone()))),
                None => Err(self.error(token, "Expect literal value."))
            };
        }

        if self.match_types(&[TokenType::LeftParen]) {
            let expr = self.nested(Parser::expression)?;
            self.consume(TokenType::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::grouping(expr));
        }

        Err(self.error(self.peek(), "Expect expression."))
    }

    /// `operand ( operator operand )*`, folded to the left.
    fn left_associative(&mut self, operators: &[TokenType], operand: fn(&mut Parser) -> ParseResult) -> ParseResult {
        let mut expr = operand(self)?;

        while self.match_types(operators) {
            let operator = BinaryOperator::try_from(self.previous().token_type)
                .map_err(|_| self.error(self.previous(), "Expect binary operator."))?;
            let right = operand(self)?;
            expr = Expr::binary(expr, operator, right);
        }

        Ok(expr)
    }

    /// Runs `rule` one nesting level deeper, failing instead of exhausting the stack.
    fn nested(&mut self, rule: fn(&mut Parser) -> ParseResult) -> ParseResult {
        if self.depth >= MAX_NESTING {
            return Err(self.error(self.previous(), "Expression nests too deeply."));
        }

        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    //////////////////////////////////////////////////////////////////////////
    /// Helper functions
    //////////////////////////////////////////////////////////////////////////

    fn match_types(&mut self, types: &[TokenType]) -> bool {
        for token_type in types {
            if self.check(*token_type) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, token_type: TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.peek().token_type == token_type
    }

    /// Never moves past `Eof`; at the end the `Eof` token itself is returned.
    fn advance(&mut self) -> &Token {
        if self.is_at_end() {
            return self.peek();
        }
        self.current += 1;
        self.previous()
    }

    fn consume(&mut self, expected_type: TokenType, message: &str) -> Result<&Token, ParseError> {
        if self.check(expected_type) {
            return Ok(self.advance());
        }
        Err(self.error(self.peek(), message))
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn error(&self, token: &Token, message: &str) -> ParseError {
        let location = match token.token_type {
            TokenType::Eof => " at end".to_owned(),
            _ => format!(" at '{}'", token.lexeme)
        };

        ParseError {
            line: token.line,
            location,
            message: message.to_owned(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lexer::scan;
    use crate::reporter::test::CollectingReporter;

    fn parse_source(source: &str) -> ParseResult {
        let mut reporter = CollectingReporter::default();
        let scan_result = scan(source, 0, &mut reporter);
        assert!(reporter.reports.is_empty(), "unexpected lexer errors: {:?}", reporter.reports);
        Parser::new(scan_result.tokens).parse()
    }

    fn number(value: f64) -> Expr {
        Expr::literal(LiteralValue::Number(value))
    }

    fn parse_error(line: u32, location: &str, message: &str) -> ParseResult {
        Err(ParseError {
            line,
            location: location.to_owned(),
            message: message.to_owned(),
        })
    }

    #[test]
    fn literals() {
        assert_eq!(parse_source("12.5"), Ok(number(12.5)));
        assert_eq!(parse_source("true"), Ok(Expr::literal(LiteralValue::Bool(true))));
        assert_eq!(parse_source("false"), Ok(Expr::literal(LiteralValue::Bool(false))));
        assert_eq!(parse_source("nil"), Ok(Expr::literal(LiteralValue::Nil)));
        assert_eq!(parse_source("\"chef\""), Ok(Expr::literal(LiteralValue::String("chef".to_owned()))));
    }

    #[test]
    fn factor_binds_tighter_than_term() {
        assert_eq!(
            parse_source("1 + 2 * 3"),
            Ok(Expr::binary(number(1.), BinaryOperator::Plus, Expr::binary(number(2.), BinaryOperator::Star, number(3.))))
        );
    }

    #[test]
    fn grouping_overrides_precedence() {
        assert_eq!(
            parse_source("(1 + 2) * 3"),
            Ok(Expr::binary(
                Expr::grouping(Expr::binary(number(1.), BinaryOperator::Plus, number(2.))),
                BinaryOperator::Star,
                number(3.)
            ))
        );
    }

    #[test]
    fn binary_operators_are_left_associative() {
        assert_eq!(
            parse_source("1 - 2 - 3"),
            Ok(Expr::binary(Expr::binary(number(1.), BinaryOperator::Minus, number(2.)), BinaryOperator::Minus, number(3.)))
        );
        assert_eq!(
            parse_source("8 / 4 / 2").map(|expr| expr.to_string()),
            Ok("(/ (/ 8.0 4.0) 2.0)".to_owned())
        );
        assert_eq!(
            parse_source("1 == 2 != 3").map(|expr| expr.to_string()),
            Ok("(!= (== 1.0 2.0) 3.0)".to_owned())
        );
    }

    #[test]
    fn unary_is_right_recursive() {
        assert_eq!(
            parse_source("!!true"),
            Ok(Expr::unary(
                UnaryOperator::Bang,
                Expr::unary(UnaryOperator::Bang, Expr::literal(LiteralValue::Bool(true)))
            ))
        );
        assert_eq!(
            parse_source("--1"),
            Ok(Expr::unary(UnaryOperator::Minus, Expr::unary(UnaryOperator::Minus, number(1.))))
        );
    }

    #[test]
    fn deep_nesting_is_an_error() {
        let source = format!("{}1", "-".repeat(200_000));
        assert_eq!(parse_source(&source), parse_error(1, " at '-'", "Expression nests too deeply."));

        let source = format!("{}true{}", "(".repeat(100_000), ")".repeat(100_000));
        assert_eq!(parse_source(&source), parse_error(1, " at '('", "Expression nests too deeply."));

        let source = format!("{}1{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        let mut expected = number(1.);
        for _ in 0..MAX_NESTING {
            expected = Expr::grouping(expected);
        }
        assert_eq!(parse_source(&source), Ok(expected));

        let source = format!("!{}false", "-".repeat(MAX_NESTING - 1));
        assert!(parse_source(&source).is_ok());
    }

    #[test]
    fn full_precedence_chain() {
        assert_eq!(
            parse_source("-1 * 2 + 3 > 4 == !false").map(|expr| expr.to_string()),
            Ok("(== (> (+ (* (- 1.0) 2.0) 3.0) 4.0) (! false))".to_owned())
        );
        assert_eq!(
            parse_source("1 <= 2 < 3 >= 4").map(|expr| expr.to_string()),
            Ok("(>= (< (<= 1.0 2.0) 3.0) 4.0)".to_owned())
        );
        assert_eq!(
            parse_source("(\"a\" + \"b\") != nil").map(|expr| expr.to_string()),
            Ok("(!= (group (+ a b)) nil)".to_owned())
        );
    }

    #[test]
    fn missing_closing_parenthesis() {
        assert_eq!(parse_source("(1 + 2"), parse_error(1, " at end", "Expect ')' after expression."));
        assert_eq!(parse_source("(1 + 2 3)"), parse_error(1, " at '3'", "Expect ')' after expression."));
    }

    #[test]
    fn missing_operand() {
        assert_eq!(parse_source("1 +"), parse_error(1, " at end", "Expect expression."));
        assert_eq!(parse_source(""), parse_error(1, " at end", "Expect expression."));
        assert_eq!(parse_source(")"), parse_error(1, " at ')'", "Expect expression."));
        assert_eq!(parse_source("1\n* \n;"), parse_error(3, " at ';'", "Expect expression."));
        assert_eq!(parse_source("foo"), parse_error(1, " at 'foo'", "Expect expression."));
    }

    #[test]
    fn trailing_tokens() {
        assert_eq!(parse_source("1 2"), parse_error(1, " at '2'", "Expect end of expression."));
        assert_eq!(parse_source("(1))"), parse_error(1, " at ')'", "Expect end of expression."));
    }

    #[test]
    fn tokens_without_eof() {
        let tokens = vec![Token {
            token_type: TokenType::Number,
            lexeme: "7".to_owned(),
            literal: Some(Literal::Number(7.)),
            line: 4,
        }];
        assert_eq!(Parser::new(tokens).parse(), Ok(number(7.)));

        assert_eq!(Parser::new(Vec::new()).parse(), parse_error(1, " at end", "Expect expression."));

        let tokens = vec![Token {
            token_type: TokenType::Minus,
            lexeme: "-".to_owned(),
            literal: None,
            line: 2,
        }];
        assert_eq!(Parser::new(tokens).parse(), parse_error(2, " at end", "Expect expression."));
    }

    #[test]
    fn never_moves_past_eof() {
        let mut parser = Parser::new(Vec::new());
        assert_eq!(parser.advance().token_type, TokenType::Eof);
        assert_eq!(parser.advance().token_type, TokenType::Eof);
        assert!(!parser.match_types(&[TokenType::Eof]));
        assert!(!parser.check(TokenType::Eof));
        assert!(parser.consume(TokenType::RightParen, "Expect ')'.").is_err());
        assert_eq!(parser.current, 0);
    }

    #[test]
    fn error_reports_through_reporter() {
        let mut reporter = CollectingReporter::default();
        let err = parse_source("(1").unwrap_err();
        err.report(&mut reporter);
        assert_eq!(reporter.reports, vec![(1, " at end".to_owned(), "Expect ')' after expression.".to_owned())]);
        assert_eq!(err.to_string(), "[Line 1] Error at end: Expect ')' after expression.");
    }
}
