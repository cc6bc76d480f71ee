use crate::error::PostlineError;
use crate::pagination::columns::ColMap;
use crate::pagination::filter::{Condition, FilterOperator};
use crate::pagination::order::{Direction, OrderSpec};
use crate::repo::FindOptions;

pub const TAKE_KEY: &str = "take";
pub const ORDER_CREATED_AT_KEY: &str = "order__createdAt";

/// Cursor shorthand keys. They arrive like any other filter key but compile
/// to comparisons on the id column so a replayed next URL bounds the scan.
pub const CURSOR_MORE_THAN_KEY: &str = "where__id_more_than";
pub const CURSOR_LESS_THAN_KEY: &str = "where__id_less_than";

const WHERE_PREFIX: &str = "where__";
const ORDER_PREFIX: &str = "order__";
const KEY_DELIMITER: &str = "__";

/// One page worth of request state: the requested row count plus the original
/// query pairs in request order. The pairs are kept verbatim because the next
/// URL replays them.
#[derive(Debug, Clone)]
pub struct PaginationRequest {
    take: i64,
    entries: Vec<(String, String)>,
}

impl PaginationRequest {
    /// Binds a raw query-string pair list into a request. This is the
    /// transport coercion step: `take` goes string→int here, and must be a
    /// positive integer.
    pub fn from_query_pairs(
        pairs: Vec<(String, String)>,
        default_take: i64,
    ) -> Result<Self, PostlineError> {
        let mut take = default_take;

        for (key, value) in &pairs {
            if key == TAKE_KEY {
                take = value.parse().map_err(|_| {
                    PostlineError::Error(format!("take must be an integer, got '{value}'"))
                })?;
            }
        }

        if take <= 0 {
            return Err(PostlineError::Error(format!(
                "take must be a positive integer, got '{take}'"
            )));
        }

        Ok(PaginationRequest {
            take,
            entries: pairs,
        })
    }

    pub fn take(&self) -> i64 {
        self.take
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// The primary sort direction, which also decides which cursor key the
    /// next URL carries. Defaults to ascending when the request doesn't say.
    pub fn order_created_at(&self) -> Direction {
        self.entries
            .iter()
            .rev()
            .find(|(key, _)| key == ORDER_CREATED_AT_KEY)
            .and_then(|(_, value)| Direction::from_token(value).ok())
            .unwrap_or(Direction::Asc)
    }

    /// Compiles the flat request into a predicate/order/limit triple. Pure
    /// and deterministic; runs before any query is issued, so a malformed
    /// descriptor fails fast with no partial query.
    ///
    /// Entries merge left-to-right keyed by field segment: a later key
    /// targeting the same field overwrites the earlier one.
    pub fn compile(&self, cols: &ColMap) -> Result<FindOptions, PostlineError> {
        let mut conditions: Vec<(&str, Condition)> = Vec::new();
        let mut order: Vec<(&str, OrderSpec)> = Vec::new();

        for (key, value) in &self.entries {
            if key.starts_with(WHERE_PREFIX) {
                let (field, condition) = Self::parse_where_filter(key, value, cols)?;
                upsert(&mut conditions, field, condition);
            } else if key.starts_with(ORDER_PREFIX) {
                let (field, spec) = Self::parse_order(key, value, cols)?;
                upsert(&mut order, field, spec);
            }
            // Remaining keys ("take" and friends) are transport state, not
            // filter input.
        }

        Ok(FindOptions {
            conditions: conditions.into_iter().map(|(_, c)| c).collect(),
            order: order.into_iter().map(|(_, s)| s).collect(),
            take: self.take,
            ..Default::default()
        })
    }

    fn parse_where_filter<'a>(
        key: &'a str,
        value: &str,
        cols: &ColMap,
    ) -> Result<(&'a str, Condition), PostlineError> {
        let split: Vec<&str> = key.split(KEY_DELIMITER).collect();

        if split.iter().any(|segment| segment.is_empty()) {
            return Err(PostlineError::MalformedFilterKey(key.to_owned()));
        }

        match split.len() {
            2 => {
                let field = split[1];
                let condition = match field {
                    "id_more_than" => {
                        Condition::new(lookup(cols, "id")?, FilterOperator::MoreThan, value.into())
                    }
                    "id_less_than" => {
                        Condition::new(lookup(cols, "id")?, FilterOperator::LessThan, value.into())
                    }
                    _ => Condition::new(lookup(cols, field)?, FilterOperator::Equal, value.into()),
                };
                Ok((field, condition))
            }
            3 => {
                let field = split[1];
                let operator = FilterOperator::from_token(split[2])?;
                let column = lookup(cols, field)?;

                // The case-insensitive substring operator gets its wildcard
                // wrapping at compile time; every other operator passes the
                // value through unmodified.
                let value = match operator {
                    FilterOperator::ILike => format!("%{value}%"),
                    _ => value.to_owned(),
                };

                Ok((field, Condition::new(column, operator, value)))
            }
            _ => Err(PostlineError::MalformedFilterKey(key.to_owned())),
        }
    }

    fn parse_order<'a>(
        key: &'a str,
        value: &str,
        cols: &ColMap,
    ) -> Result<(&'a str, OrderSpec), PostlineError> {
        let split: Vec<&str> = key.split(KEY_DELIMITER).collect();

        if split.len() != 2 || split.iter().any(|segment| segment.is_empty()) {
            return Err(PostlineError::MalformedFilterKey(key.to_owned()));
        }

        let field = split[1];
        let direction = Direction::from_token(value)?;

        Ok((field, OrderSpec::new(lookup(cols, field)?, direction)))
    }
}

fn lookup(cols: &ColMap, field: &str) -> Result<&'static str, PostlineError> {
    cols.get(field)
        .copied()
        .ok_or_else(|| PostlineError::UnknownField(field.to_owned()))
}

fn upsert<'a, T>(entries: &mut Vec<(&'a str, T)>, field: &'a str, item: T) {
    match entries.iter_mut().find(|(f, _)| *f == field) {
        Some(entry) => entry.1 = item,
        None => entries.push((field, item)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::columns::POSTS_QUERY_COLS;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn request(raw: &[(&str, &str)]) -> PaginationRequest {
        PaginationRequest::from_query_pairs(pairs(raw), 20).unwrap()
    }

    #[test]
    fn test_take_defaults_and_parses() {
        let req = request(&[]);
        assert_eq!(req.take(), 20);

        let req = request(&[("take", "5")]);
        assert_eq!(req.take(), 5);
    }

    #[test]
    fn test_take_must_be_positive_integer() {
        assert!(PaginationRequest::from_query_pairs(pairs(&[("take", "abc")]), 20).is_err());
        assert!(PaginationRequest::from_query_pairs(pairs(&[("take", "0")]), 20).is_err());
        assert!(PaginationRequest::from_query_pairs(pairs(&[("take", "-3")]), 20).is_err());
    }

    #[test]
    fn test_two_segment_key_compiles_to_equality() {
        let options = request(&[("where__title", "hello")])
            .compile(&POSTS_QUERY_COLS)
            .unwrap();
        assert_eq!(options.conditions.len(), 1);
        assert_eq!(options.conditions[0].column, "posts.title");
        assert_eq!(options.conditions[0].operator, FilterOperator::Equal);
        assert_eq!(options.conditions[0].value, "hello");
    }

    #[test]
    fn test_three_segment_key_compiles_operator() {
        let options = request(&[("where__likeCount__more_than", "10")])
            .compile(&POSTS_QUERY_COLS)
            .unwrap();
        assert_eq!(options.conditions[0].column, "posts.like_count");
        assert_eq!(options.conditions[0].operator, FilterOperator::MoreThan);
    }

    #[test]
    fn test_i_like_wraps_value_in_wildcards() {
        let options = request(&[("where__title__i_like", "foo")])
            .compile(&POSTS_QUERY_COLS)
            .unwrap();
        assert_eq!(options.conditions[0].operator, FilterOperator::ILike);
        assert_eq!(options.conditions[0].value, "%foo%");
    }

    #[test]
    fn test_cursor_shorthand_keys_bound_by_id() {
        let options = request(&[("where__id_more_than", "7")])
            .compile(&POSTS_QUERY_COLS)
            .unwrap();
        assert_eq!(options.conditions[0].column, "posts.id");
        assert_eq!(options.conditions[0].operator, FilterOperator::MoreThan);
        assert_eq!(options.conditions[0].value, "7");

        let options = request(&[("where__id_less_than", "7")])
            .compile(&POSTS_QUERY_COLS)
            .unwrap();
        assert_eq!(options.conditions[0].operator, FilterOperator::LessThan);
    }

    #[test]
    fn test_malformed_keys_rejected() {
        for key in ["where__", "where__a__b__c", "where__title__i_like__x"] {
            let result = request(&[(key, "v")]).compile(&POSTS_QUERY_COLS);
            assert!(
                matches!(result, Err(PostlineError::MalformedFilterKey(_))),
                "expected MalformedFilterKey for '{key}'"
            );
        }
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let result = request(&[("where__title__regex", ".*")]).compile(&POSTS_QUERY_COLS);
        assert!(matches!(result, Err(PostlineError::UnknownOperator(op)) if op == "regex"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = request(&[("where__password", "x")]).compile(&POSTS_QUERY_COLS);
        assert!(matches!(result, Err(PostlineError::UnknownField(f)) if f == "password"));
    }

    #[test]
    fn test_order_key_compiles_direction() {
        let options = request(&[("order__createdAt", "DESC")])
            .compile(&POSTS_QUERY_COLS)
            .unwrap();
        assert_eq!(
            options.order,
            vec![OrderSpec::new("posts.created_at", Direction::Desc)]
        );
    }

    #[test]
    fn test_invalid_sort_direction_rejected() {
        let result = request(&[("order__createdAt", "UPWARD")]).compile(&POSTS_QUERY_COLS);
        assert!(matches!(result, Err(PostlineError::InvalidSortDirection(_))));
    }

    #[test]
    fn test_later_key_overwrites_same_field() {
        let options = request(&[
            ("where__likeCount__more_than", "1"),
            ("where__likeCount__less_than", "9"),
        ])
        .compile(&POSTS_QUERY_COLS)
        .unwrap();
        // Same field segment: the later entry wins outright.
        assert_eq!(options.conditions.len(), 1);
        assert_eq!(options.conditions[0].operator, FilterOperator::LessThan);
    }

    #[test]
    fn test_distinct_fields_accumulate() {
        let options = request(&[
            ("where__likeCount__more_than", "1"),
            ("where__title__i_like", "rust"),
        ])
        .compile(&POSTS_QUERY_COLS)
        .unwrap();
        assert_eq!(options.conditions.len(), 2);
    }

    #[test]
    fn test_order_created_at_direction() {
        assert_eq!(request(&[]).order_created_at(), Direction::Asc);
        assert_eq!(
            request(&[("order__createdAt", "DESC")]).order_created_at(),
            Direction::Desc
        );
    }

    proptest! {
        // Compiling never panics, whatever the key shape; it either produces
        // options or one of the descriptor errors.
        #[test]
        fn prop_compile_never_panics(key in "[a-z_]{0,12}(__[a-zA-Z_]{0,8}){0,4}", value in "[a-zA-Z0-9]{0,8}") {
            let req = PaginationRequest::from_query_pairs(
                vec![(format!("where__{key}"), value)],
                20,
            ).unwrap();
            let _ = req.compile(&POSTS_QUERY_COLS);
        }
    }
}
