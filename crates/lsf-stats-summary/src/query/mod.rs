//! Row filter expressions.
//!
//! A small pandas-`query`-like language:
//!
//! ```text
//! successful and duration > 600
//! sample in ['A', 'B'] | not `rep` == '1'
//! date >= '2021-01-14'
//! ```

mod eval;
mod lexer;
mod parser;

pub use parser::{CompareOp, Expr};

use crate::frame::{Frame, FrameError};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Query is empty")]
    Empty,
    #[error("Unexpected character {snippet:?} at position {position}")]
    Lex { position: usize, snippet: String },
    #[error("Expected {expected} at position {position}, found {found}")]
    Syntax {
        position: usize,
        found: String,
        expected: String,
    },
    #[error("Query ended early, expected {expected}")]
    UnexpectedEnd { expected: String },
    #[error("Query references unknown column: {0}")]
    UnknownColumn(String),
    #[error("Cannot compare {left} {op} {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
    #[error("Expected a boolean, found {0}")]
    NotBoolean(String),
    #[error("Cannot interpret {0:?} as a timestamp")]
    InvalidTimestamp(String),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// A parsed row filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    source: String,
    expr: Expr,
}

impl Query {
    pub fn parse(source: &str) -> Result<Self, QueryError> {
        let expr = parser::parse(source)?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    /// The query text as given.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate the query against every row, one flag per row.
    pub fn mask(&self, frame: &Frame) -> Result<Vec<bool>, QueryError> {
        let mut bindings = HashMap::new();
        for name in self.expr.columns() {
            let idx = frame
                .column_index(name)
                .ok_or_else(|| QueryError::UnknownColumn(name.to_string()))?;
            bindings.insert(name, idx);
        }

        frame
            .rows()
            .iter()
            .map(|row| eval::matches(&self.expr, &bindings, row))
            .collect()
    }

    /// Keep only matching rows. Returns the number of dropped rows.
    pub fn filter(&self, frame: &mut Frame) -> Result<usize, QueryError> {
        let mask = self.mask(frame)?;
        let before = frame.len();
        frame.retain_mask(&mask)?;
        let dropped = before - frame.len();
        tracing::debug!(
            "Query {:?} dropped {} of {} rows",
            self.source,
            dropped,
            before
        );
        Ok(dropped)
    }
}
