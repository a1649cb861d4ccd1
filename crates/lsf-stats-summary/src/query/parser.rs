//! Recursive-descent parser for the row-filter language.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr       := and ( 'or' and )*
//! and        := not ( 'and' not )*
//! not        := 'not' not | comparison
//! comparison := operand ( cmp operand | 'in' list | 'not' 'in' list )?
//! operand    := literal | column | '(' expr ')'
//! list       := '[' ( literal ( ',' literal )* )? ']'
//! ```

use super::QueryError;
use super::lexer::{Token, tokenize};
use crate::frame::Value;
use logos::Span;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// Parsed query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(String),
    Literal(Value),
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    In {
        needle: Box<Expr>,
        haystack: Vec<Value>,
        negated: bool,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    /// Every column referenced by the expression.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Column(name) => out.push(name),
            Expr::Literal(_) => {}
            Expr::Compare { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Expr::In { needle, .. } => needle.collect_columns(out),
            Expr::And(a, b) | Expr::Or(a, b) => {
                a.collect_columns(out);
                b.collect_columns(out);
            }
            Expr::Not(inner) => inner.collect_columns(out),
        }
    }
}

/// Parse query text into an expression.
pub fn parse(source: &str) -> Result<Expr, QueryError> {
    let tokens = tokenize(source).map_err(|span| QueryError::Lex {
        position: span.start,
        snippet: source[span].to_string(),
    })?;
    if tokens.is_empty() {
        return Err(QueryError::Empty);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expr()?;
    if let Some((token, span)) = parser.peek_spanned() {
        return Err(QueryError::Syntax {
            position: span.start,
            found: token.to_string(),
            expected: "end of query".to_string(),
        });
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|(t, _)| t)
    }

    fn peek_spanned(&self) -> Option<(&Token, &Span)> {
        self.tokens.get(self.pos).map(|(t, s)| (t, s))
    }

    fn peek_is(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, expected: &str) -> QueryError {
        match self.peek_spanned() {
            Some((token, span)) => QueryError::Syntax {
                position: span.start,
                found: token.to_string(),
                expected: expected.to_string(),
            },
            None => QueryError::UnexpectedEnd {
                expected: expected.to_string(),
            },
        }
    }

    fn expect(&mut self, token: Token) -> Result<(), QueryError> {
        if self.peek_is(&token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&token.to_string()))
        }
    }

    fn expr(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.and()?;
        while self.peek_is(&Token::Or) {
            self.pos += 1;
            let right = self.and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.not()?;
        while self.peek_is(&Token::And) {
            self.pos += 1;
            let right = self.not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not(&mut self) -> Result<Expr, QueryError> {
        if self.peek_is(&Token::Not) {
            self.pos += 1;
            let inner = self.not()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, QueryError> {
        let left = self.operand()?;

        let op = match self.peek() {
            Some(Token::Eq) => CompareOp::Eq,
            Some(Token::Ne) => CompareOp::Ne,
            Some(Token::Lt) => CompareOp::Lt,
            Some(Token::Le) => CompareOp::Le,
            Some(Token::Gt) => CompareOp::Gt,
            Some(Token::Ge) => CompareOp::Ge,
            Some(Token::In) => {
                self.pos += 1;
                return self.membership(left, false);
            }
            Some(Token::Not) if self.peek_at(1) == Some(&Token::In) => {
                self.pos += 2;
                return self.membership(left, true);
            }
            _ => return Ok(left),
        };
        self.pos += 1;

        let right = self.operand()?;
        Ok(Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn membership(&mut self, needle: Expr, negated: bool) -> Result<Expr, QueryError> {
        self.expect(Token::LBracket)?;
        let mut haystack = Vec::new();
        if !self.peek_is(&Token::RBracket) {
            haystack.push(self.literal()?);
            while self.peek_is(&Token::Comma) {
                self.pos += 1;
                haystack.push(self.literal()?);
            }
        }
        self.expect(Token::RBracket)?;
        Ok(Expr::In {
            needle: Box::new(needle),
            haystack,
            negated,
        })
    }

    fn literal(&mut self) -> Result<Value, QueryError> {
        let value = match self.peek() {
            Some(Token::Number(n)) => Value::Number(*n),
            Some(Token::Str(s)) => Value::Text(s.clone()),
            Some(Token::True) => Value::Bool(true),
            Some(Token::False) => Value::Bool(false),
            _ => return Err(self.error("a literal")),
        };
        self.pos += 1;
        Ok(value)
    }

    fn operand(&mut self) -> Result<Expr, QueryError> {
        match self.peek() {
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(_)) => match self.next() {
                Some(Token::Ident(name)) => Ok(Expr::Column(name)),
                _ => Err(self.error("a column")),
            },
            Some(Token::Number(_) | Token::Str(_) | Token::True | Token::False) => {
                Ok(Expr::Literal(self.literal()?))
            }
            _ => Err(self.error("a column, literal or '('")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str) -> Box<Expr> {
        Box::new(Expr::Column(name.to_string()))
    }

    fn lit(value: Value) -> Box<Expr> {
        Box::new(Expr::Literal(value))
    }

    #[test]
    fn test_parse_comparison() {
        assert_eq!(
            parse("duration > 60").unwrap(),
            Expr::Compare {
                op: CompareOp::Gt,
                left: col("duration"),
                right: lit(Value::Number(60.0)),
            }
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse("a == 1 or b == 2 and c == 3").unwrap();
        match expr {
            Expr::Or(_, right) => assert!(matches!(*right, Expr::And(_, _))),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parentheses() {
        let expr = parse("(a == 1 or b == 2) and c == 3").unwrap();
        assert!(matches!(expr, Expr::And(_, _)));
    }

    #[test]
    fn test_not_in() {
        assert_eq!(
            parse("sample not in ['A', 'B']").unwrap(),
            Expr::In {
                needle: col("sample"),
                haystack: vec![Value::Text("A".into()), Value::Text("B".into())],
                negated: true,
            }
        );
    }

    #[test]
    fn test_not_prefix() {
        assert_eq!(
            parse("not successful").unwrap(),
            Expr::Not(col("successful"))
        );
    }

    #[test]
    fn test_columns() {
        let expr = parse("a > 1 and (b == 'x' or not c)").unwrap();
        assert_eq!(expr.columns(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(parse(""), Err(QueryError::Empty)));
        assert!(matches!(
            parse("duration >"),
            Err(QueryError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            parse("duration > 1 2"),
            Err(QueryError::Syntax { position: 13, .. })
        ));
        assert!(matches!(
            parse("sample in 'A'"),
            Err(QueryError::Syntax { .. })
        ));
        assert!(matches!(
            parse("a $ b"),
            Err(QueryError::Lex { position: 2, .. })
        ));
    }
}
