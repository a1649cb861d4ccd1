//! Row-wise evaluation of parsed queries.

use super::QueryError;
use super::parser::{CompareOp, Expr};
use crate::frame::Value;
use chrono::{NaiveDate, NaiveDateTime};
use lsf_stats_parsers::parse_lsf_timestamp;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashMap;

type Bindings<'q> = HashMap<&'q str, usize>;

/// Whether `row` satisfies `expr`.
pub(super) fn matches(
    expr: &Expr,
    bindings: &Bindings<'_>,
    row: &[Value],
) -> Result<bool, QueryError> {
    match expr {
        Expr::Column(name) => match &row[bindings[name.as_str()]] {
            Value::Bool(b) => Ok(*b),
            Value::Missing => Ok(false),
            other => {
                let found = format!("{} column {}", other.type_name(), name);
                Err(QueryError::NotBoolean(found))
            }
        },
        Expr::Literal(Value::Bool(b)) => Ok(*b),
        Expr::Literal(other) => {
            let found = format!("{} literal {}", other.type_name(), other);
            Err(QueryError::NotBoolean(found))
        }
        Expr::Compare { op, left, right } => {
            let left = operand(left, bindings, row)?;
            let right = operand(right, bindings, row)?;
            compare(*op, &left, &right)
        }
        Expr::In {
            needle,
            haystack,
            negated,
        } => {
            let needle = operand(needle, bindings, row)?;
            if needle.is_missing() {
                return Ok(*negated);
            }
            let mut found = false;
            for candidate in haystack {
                if compare(CompareOp::Eq, &needle, candidate)? {
                    found = true;
                    break;
                }
            }
            Ok(found != *negated)
        }
        Expr::And(a, b) => Ok(matches(a, bindings, row)? && matches(b, bindings, row)?),
        Expr::Or(a, b) => Ok(matches(a, bindings, row)? || matches(b, bindings, row)?),
        Expr::Not(inner) => Ok(!matches(inner, bindings, row)?),
    }
}

fn operand<'a>(
    expr: &'a Expr,
    bindings: &Bindings<'_>,
    row: &'a [Value],
) -> Result<Cow<'a, Value>, QueryError> {
    match expr {
        Expr::Column(name) => Ok(Cow::Borrowed(&row[bindings[name.as_str()]])),
        Expr::Literal(value) => Ok(Cow::Borrowed(value)),
        nested => Ok(Cow::Owned(Value::Bool(matches(nested, bindings, row)?))),
    }
}

/// Compare two cells. Missing cells only satisfy `!=`.
fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool, QueryError> {
    if left.is_missing() || right.is_missing() {
        return Ok(op == CompareOp::Ne);
    }

    let ordering = match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        (Value::Timestamp(a), Value::Text(b)) => Some(a.cmp(&timestamp_literal(b)?)),
        (Value::Text(a), Value::Timestamp(b)) => Some(timestamp_literal(a)?.cmp(b)),
        _ => match op {
            CompareOp::Eq => return Ok(false),
            CompareOp::Ne => return Ok(true),
            _ => {
                return Err(QueryError::TypeMismatch {
                    op: op.symbol(),
                    left: left.type_name(),
                    right: right.type_name(),
                });
            }
        },
    };

    // NaN orders with nothing
    let Some(ordering) = ordering else {
        return Ok(op == CompareOp::Ne);
    };

    Ok(match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
    })
}

/// Timestamp from a query string; a bare date means midnight.
fn timestamp_literal(text: &str) -> Result<NaiveDateTime, QueryError> {
    parse_lsf_timestamp(text)
        .or_else(|| {
            NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| QueryError::InvalidTimestamp(text.to_string()))
}
