use std::str::FromStr;

use rusqlite::ToSql;
use strum::EnumString;

use crate::error::PostlineError;

/// The closed set of comparison operators a filter key may name. Parsing goes
/// through `FromStr` so an operator outside this set is rejected up front
/// rather than silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum FilterOperator {
    Equal,
    MoreThan,
    MoreThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Between,
    Like,
    ILike,
}

impl FilterOperator {
    pub fn from_token(token: &str) -> Result<Self, PostlineError> {
        FilterOperator::from_str(token)
            .map_err(|_| PostlineError::UnknownOperator(token.to_owned()))
    }
}

/// A single compiled filter condition: one database column, one operator, and
/// the raw value it was given. Conditions AND together at query time.
#[derive(Debug, Clone)]
pub struct Condition {
    pub column: &'static str,
    pub operator: FilterOperator,
    pub value: String,
}

impl Condition {
    pub fn new(column: &'static str, operator: FilterOperator, value: String) -> Self {
        Condition {
            column,
            operator,
            value,
        }
    }

    /// Renders predicate text and positional params for this condition.
    pub fn to_predicate_parts(&self) -> Result<(String, Vec<Box<dyn ToSql>>), PostlineError> {
        let mut pred_vec: Vec<Box<dyn ToSql>> = Vec::new();

        let pred_str = match self.operator {
            FilterOperator::Equal => {
                pred_vec.push(to_sql_value(&self.value));
                format!("({} = ?)", self.column)
            }
            FilterOperator::MoreThan => {
                pred_vec.push(to_sql_value(&self.value));
                format!("({} > ?)", self.column)
            }
            FilterOperator::MoreThanOrEqual => {
                pred_vec.push(to_sql_value(&self.value));
                format!("({} >= ?)", self.column)
            }
            FilterOperator::LessThan => {
                pred_vec.push(to_sql_value(&self.value));
                format!("({} < ?)", self.column)
            }
            FilterOperator::LessThanOrEqual => {
                pred_vec.push(to_sql_value(&self.value));
                format!("({} <= ?)", self.column)
            }
            FilterOperator::Between => {
                let bounds: Vec<&str> = self.value.split(',').map(str::trim).collect();
                if bounds.len() != 2 {
                    return Err(PostlineError::Error(format!(
                        "Operator 'between' expects two comma-separated values, got '{}'",
                        self.value
                    )));
                }
                pred_vec.push(to_sql_value(bounds[0]));
                pred_vec.push(to_sql_value(bounds[1]));
                format!("({} BETWEEN ? AND ?)", self.column)
            }
            FilterOperator::Like => {
                pred_vec.push(Box::new(self.value.clone()));
                format!("({} LIKE ?)", self.column)
            }
            FilterOperator::ILike => {
                // The value already carries its wildcard wrapping; NOCASE
                // makes the match case-insensitive regardless of the
                // column's collation.
                pred_vec.push(Box::new(self.value.clone()));
                format!("({} LIKE ? COLLATE NOCASE)", self.column)
            }
        };

        Ok((pred_str, pred_vec))
    }
}

// SQLite compares TEXT and INTEGER by storage class, so numeric filter values
// must bind as integers for comparisons against id/timestamp columns to work.
fn to_sql_value(value: &str) -> Box<dyn ToSql> {
    match value.parse::<i64>() {
        Ok(n) => Box::new(n),
        Err(_) => Box::new(value.to_owned()),
    }
}
