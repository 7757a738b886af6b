//! Recursive-descent parser for condition expressions
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! or         := and ( "||" and )*
//! and        := equality ( "&&" equality )*
//! equality   := relational ( ( "===" | "!==" | "==" | "!=" ) relational )*
//! relational := additive ( ( ">" | ">=" | "<" | "<=" ) additive )*
//! additive   := term ( ( "+" | "-" ) term )*
//! term       := unary ( ( "*" | "/" ) unary )*
//! unary      := ( "!" | "-" ) unary | primary
//! primary    := number | string | "true" | "false" | ident | "(" or ")"
//! ```
//!
//! Input is capped at [`MAX_TOKENS`] tokens and [`MAX_DEPTH`] levels of
//! parentheses or unary operators, which bounds the AST depth and keeps
//! evaluation recursion shallow.

use super::ast::{ArithmeticOp, CompareOp, Expression, Literal};
use super::lexer::{tokenize, Spanned, Token};
use crate::error::ConditionError;

/// Deepest nesting of parentheses and unary operators
pub const MAX_DEPTH: usize = 64;

/// Longest accepted condition, in tokens
pub const MAX_TOKENS: usize = 1024;

/// Parse a condition expression string into an AST
pub fn parse(input: &str) -> Result<Expression, ConditionError> {
    let tokens = tokenize(input)?;
    if tokens.len() > MAX_TOKENS {
        return Err(ConditionError::TooLong { limit: MAX_TOKENS });
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_or()?;

    match parser.tokens.get(parser.pos) {
        None => Ok(expr),
        Some(extra) => Err(ConditionError::syntax(
            extra.position,
            format!("unexpected token {:?}", extra.token),
        )),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn nested<F>(&mut self, parse_inner: F) -> Result<Expression, ConditionError>
    where
        F: FnOnce(&mut Self) -> Result<Expression, ConditionError>,
    {
        if self.depth >= MAX_DEPTH {
            return Err(ConditionError::TooDeep { limit: MAX_DEPTH });
        }
        self.depth += 1;
        let result = parse_inner(self);
        self.depth -= 1;
        result
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let next = self.tokens.get(self.pos).cloned();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn parse_or(&mut self) -> Result<Expression, ConditionError> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::OrOr) {
            self.pos += 1;
            let right = self.parse_and()?;
            left = Expression::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression, ConditionError> {
        let mut left = self.parse_equality()?;
        while self.peek() == Some(&Token::AndAnd) {
            self.pos += 1;
            let right = self.parse_equality()?;
            left = Expression::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expression, ConditionError> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                Some(Token::StrictEq) | Some(Token::Eq) => CompareOp::Eq,
                Some(Token::StrictNotEq) | Some(Token::NotEq) => CompareOp::NotEq,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_relational()?;
            left = compare(left, op, right);
        }
    }

    fn parse_relational(&mut self) -> Result<Expression, ConditionError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Gt) => CompareOp::Gt,
                Some(Token::Gte) => CompareOp::Gte,
                Some(Token::Lt) => CompareOp::Lt,
                Some(Token::Lte) => CompareOp::Lte,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_additive()?;
            left = compare(left, op, right);
        }
    }

    fn parse_additive(&mut self) -> Result<Expression, ConditionError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => ArithmeticOp::Add,
                Some(Token::Minus) => ArithmeticOp::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_term()?;
            left = arithmetic(left, op, right);
        }
    }

    fn parse_term(&mut self) -> Result<Expression, ConditionError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => ArithmeticOp::Mul,
                Some(Token::Slash) => ArithmeticOp::Div,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = arithmetic(left, op, right);
        }
    }

    fn parse_unary(&mut self) -> Result<Expression, ConditionError> {
        match self.peek() {
            Some(Token::Bang) => {
                self.pos += 1;
                let inner = self.nested(Self::parse_unary)?;
                Ok(Expression::Not(Box::new(inner)))
            }
            Some(Token::Minus) => {
                self.pos += 1;
                let inner = self.nested(Self::parse_unary)?;
                Ok(Expression::Negate(Box::new(inner)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expression, ConditionError> {
        let Spanned { token, position } = self.advance().ok_or(ConditionError::UnexpectedEnd)?;

        match token {
            Token::Number(n) => Ok(Expression::Literal(Literal::Number(n))),
            Token::String(s) => Ok(Expression::Literal(Literal::String(s))),
            Token::True => Ok(Expression::Literal(Literal::Boolean(true))),
            Token::False => Ok(Expression::Literal(Literal::Boolean(false))),
            Token::Ident(name) => Ok(Expression::Variable(name)),
            Token::LParen => {
                let inner = self.nested(Self::parse_or)?;
                match self.advance() {
                    Some(Spanned {
                        token: Token::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(ConditionError::syntax(
                        other.position,
                        "expected ')'",
                    )),
                    None => Err(ConditionError::UnexpectedEnd),
                }
            }
            other => Err(ConditionError::syntax(
                position,
                format!("unexpected token {:?}", other),
            )),
        }
    }
}

fn compare(left: Expression, op: CompareOp, right: Expression) -> Expression {
    Expression::Compare {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

fn arithmetic(left: Expression, op: ArithmeticOp, right: Expression) -> Expression {
    Expression::Arithmetic {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Expression {
        Expression::Variable(name.to_string())
    }

    fn num(n: f64) -> Expression {
        Expression::Literal(Literal::Number(n))
    }

    #[test]
    fn test_parse_simple_comparison() {
        let expr = parse("bp >= 180").unwrap();
        assert_eq!(expr, compare(var("bp"), CompareOp::Gte, num(180.0)));
    }

    #[test]
    fn test_parse_strict_and_loose_equality() {
        let strict = parse("ethnicity === 'black'").unwrap();
        let loose = parse("ethnicity == 'black'").unwrap();
        assert_eq!(strict, loose);
        assert_eq!(
            strict,
            compare(
                var("ethnicity"),
                CompareOp::Eq,
                Expression::Literal(Literal::String("black".into()))
            )
        );

        let not_eq = parse(r#"status !== "done""#).unwrap();
        assert!(matches!(
            not_eq,
            Expression::Compare {
                op: CompareOp::NotEq,
                ..
            }
        ));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse("a > 1 || b > 2 && c > 3").unwrap();
        match expr {
            Expression::Or(left, right) => {
                assert_eq!(*left, compare(var("a"), CompareOp::Gt, num(1.0)));
                assert!(matches!(*right, Expression::And(_, _)));
            }
            other => panic!("Expected Or expression, got {:?}", other),
        }
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let expr = parse("(a > 1 || b > 2) && c > 3").unwrap();
        match expr {
            Expression::And(left, _) => assert!(matches!(*left, Expression::Or(_, _))),
            other => panic!("Expected And expression, got {:?}", other),
        }
    }

    #[test]
    fn test_arithmetic_precedence() {
        // a + b * 2 > 10  ==>  (a + (b * 2)) > 10
        let expr = parse("a + b * 2 > 10").unwrap();
        let expected = compare(
            arithmetic(
                var("a"),
                ArithmeticOp::Add,
                arithmetic(var("b"), ArithmeticOp::Mul, num(2.0)),
            ),
            CompareOp::Gt,
            num(10.0),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(
            parse("!smoker").unwrap(),
            Expression::Not(Box::new(var("smoker")))
        );
        assert_eq!(
            parse("x > -5").unwrap(),
            compare(var("x"), CompareOp::Gt, Expression::Negate(Box::new(num(5.0))))
        );
    }

    #[test]
    fn test_bare_literals() {
        assert_eq!(
            parse("true").unwrap(),
            Expression::Literal(Literal::Boolean(true))
        );
        assert_eq!(parse("smoker").unwrap(), var("smoker"));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse(""), Err(ConditionError::UnexpectedEnd));
        assert_eq!(parse("bp >="), Err(ConditionError::UnexpectedEnd));
        assert_eq!(parse("(bp > 1"), Err(ConditionError::UnexpectedEnd));
        assert!(matches!(
            parse("bp > 1 2"),
            Err(ConditionError::Syntax { position: 7, .. })
        ));
        assert!(parse("this is not valid").is_err());
        assert!(parse("alert('x'); true").is_err());
    }

    #[test]
    fn test_nesting_ceiling() {
        let at_limit = format!("{}true{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert!(parse(&at_limit).is_ok());

        let past_limit = format!(
            "{}true{}",
            "(".repeat(MAX_DEPTH + 1),
            ")".repeat(MAX_DEPTH + 1)
        );
        assert_eq!(
            parse(&past_limit),
            Err(ConditionError::TooDeep { limit: MAX_DEPTH })
        );

        let negations = format!("{}smoker", "!".repeat(MAX_DEPTH + 1));
        assert_eq!(
            parse(&negations),
            Err(ConditionError::TooDeep { limit: MAX_DEPTH })
        );
    }

    #[test]
    fn test_token_ceiling() {
        let chain = vec!["a > 1"; MAX_TOKENS].join(" && ");
        assert_eq!(
            parse(&chain),
            Err(ConditionError::TooLong { limit: MAX_TOKENS })
        );

        let deep = format!("{}true{}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(parse(&deep).is_err());
    }
}
