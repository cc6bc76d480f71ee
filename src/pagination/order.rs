use std::str::FromStr;

use strum::{Display, EnumString};

use crate::error::PostlineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum Direction {
    #[strum(serialize = "ASC")]
    Asc,
    #[strum(serialize = "DESC")]
    Desc,
}

impl Direction {
    /// Parses a sort direction, normalizing case first. Anything other than
    /// ASC/DESC is rejected.
    pub fn from_token(token: &str) -> Result<Self, PostlineError> {
        Direction::from_str(&token.trim().to_ascii_uppercase())
            .map_err(|_| PostlineError::InvalidSortDirection(token.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSpec {
    pub column: &'static str,
    pub direction: Direction,
}

impl OrderSpec {
    pub fn new(column: &'static str, direction: Direction) -> Self {
        OrderSpec { column, direction }
    }
}

pub fn to_order_clause(order_specs: &[OrderSpec]) -> String {
    if order_specs.is_empty() {
        return String::new();
    }

    let mut order_clause = "\nORDER BY ".to_string();
    let mut first = true;

    for order in order_specs {
        match first {
            true => first = false,
            false => order_clause.push_str(", "),
        }

        order_clause.push_str(order.column);
        order_clause.push(' ');
        order_clause.push_str(&order.direction.to_string());
    }
    order_clause
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_direction_tokens() {
        assert_eq!(Direction::from_token("ASC").unwrap(), Direction::Asc);
        assert_eq!(Direction::from_token("desc").unwrap(), Direction::Desc);
        assert_eq!(Direction::from_token(" Asc ").unwrap(), Direction::Asc);
    }

    #[test]
    fn test_invalid_direction_rejected() {
        let result = Direction::from_token("sideways");
        assert!(matches!(
            result,
            Err(PostlineError::InvalidSortDirection(d)) if d == "sideways"
        ));
    }

    #[test]
    fn test_empty_order_clause() {
        assert_eq!(to_order_clause(&[]), "");
    }

    #[test]
    fn test_order_clause_rendering() {
        let specs = [
            OrderSpec::new("posts.created_at", Direction::Desc),
            OrderSpec::new("posts.id", Direction::Asc),
        ];
        assert_eq!(
            to_order_clause(&specs),
            "\nORDER BY posts.created_at DESC, posts.id ASC"
        );
    }
}
