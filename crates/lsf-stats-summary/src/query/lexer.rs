//! Tokens of the row-filter language.

use logos::{Lexer, Logos, Span};
use std::fmt;

/// Lexer error; logos requires a default value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LexError;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexError)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    #[token("and")]
    #[token("&")]
    #[token("&&")]
    And,

    #[token("or")]
    #[token("|")]
    #[token("||")]
    Or,

    #[token("not")]
    #[token("~")]
    Not,

    #[token("in")]
    In,

    #[token("True")]
    #[token("true")]
    True,

    #[token("False")]
    #[token("false")]
    False,

    #[token("==")]
    Eq,

    #[token("!=")]
    Ne,

    #[token("<=")]
    Le,

    #[token(">=")]
    Ge,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(",")]
    Comma,

    #[regex(r"-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", lex_number)]
    Number(f64),

    #[regex(r"'[^']*'", lex_quoted)]
    #[regex(r#""[^"]*""#, lex_quoted)]
    Str(String),

    /// Column name, bare or in backticks for names with spaces or commas.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    #[regex(r"`[^`]+`", lex_quoted)]
    Ident(String),
}

fn lex_number(lex: &mut Lexer<Token>) -> Option<f64> {
    lex.slice().parse().ok()
}

/// Strip the surrounding quote characters.
fn lex_quoted(lex: &mut Lexer<Token>) -> String {
    let s = lex.slice();
    s[1..s.len() - 1].to_string()
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::And => write!(f, "'and'"),
            Token::Or => write!(f, "'or'"),
            Token::Not => write!(f, "'not'"),
            Token::In => write!(f, "'in'"),
            Token::True => write!(f, "'True'"),
            Token::False => write!(f, "'False'"),
            Token::Eq => write!(f, "'=='"),
            Token::Ne => write!(f, "'!='"),
            Token::Le => write!(f, "'<='"),
            Token::Ge => write!(f, "'>='"),
            Token::Lt => write!(f, "'<'"),
            Token::Gt => write!(f, "'>'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::Comma => write!(f, "','"),
            Token::Number(n) => write!(f, "number {}", n),
            Token::Str(s) => write!(f, "string {:?}", s),
            Token::Ident(s) => write!(f, "column {}", s),
        }
    }
}

/// Tokenize a query, returning the span of the first invalid token on error.
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>, Span> {
    Token::lexer(source)
        .spanned()
        .map(|(token, span)| match token {
            Ok(token) => Ok((token, span)),
            Err(LexError) => Err(span),
        })
        .collect()
}
