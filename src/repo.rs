use rusqlite::ToSql;

use crate::error::PostlineError;
use crate::pagination::{to_order_clause, Condition, OrderSpec};

/// A persisted record the paginator can scan. Ids are assumed to be assigned
/// monotonically at creation time, which is what makes an id cursor agree
/// with `created_at` ordering.
pub trait Entity {
    fn id(&self) -> i64;
}

/// The one storage capability the paginator needs: a bounded, filtered,
/// ordered read. Implementable over SQLite, memory, or anything else.
pub trait Repository<T: Entity> {
    fn find_many(&self, options: &FindOptions) -> Result<Vec<T>, PostlineError>;
}

/// Compiled query descriptor: predicates, ordering, row limit, and the
/// structural hints a specific endpoint may have forced in.
#[derive(Debug, Default)]
pub struct FindOptions {
    pub conditions: Vec<Condition>,
    pub order: Vec<OrderSpec>,
    pub take: i64,
    pub relations: Vec<&'static str>,
    pub select: Option<Vec<&'static str>>,
}

/// Endpoint-level structural overrides, merged over the compiled options with
/// precedence. This is how an endpoint forces an eager-loaded relation or a
/// fixed ordering without the compiler knowing about it.
#[derive(Debug, Default)]
pub struct FindOverrides {
    pub relations: Vec<&'static str>,
    pub select: Option<Vec<&'static str>>,
    pub order: Vec<OrderSpec>,
}

impl FindOptions {
    pub fn apply_overrides(&mut self, overrides: &FindOverrides) {
        for relation in &overrides.relations {
            if !self.relations.contains(relation) {
                self.relations.push(relation);
            }
        }
        if overrides.select.is_some() {
            self.select = overrides.select.clone();
        }
        if !overrides.order.is_empty() {
            self.order = overrides.order.clone();
        }
    }

    /// Renders all conditions into one AND-joined predicate plus its params.
    /// An empty condition set yields an empty predicate string.
    pub fn to_predicate_parts(&self) -> Result<(String, Vec<Box<dyn ToSql>>), PostlineError> {
        let mut pred_str = String::new();
        let mut pred_vec: Vec<Box<dyn ToSql>> = Vec::new();
        let mut first = true;

        for condition in &self.conditions {
            match first {
                true => first = false,
                false => pred_str.push_str(" AND "),
            }

            let (cond_str, cond_vec) = condition.to_predicate_parts()?;
            pred_str.push_str(&cond_str);
            pred_vec.extend(cond_vec);
        }

        Ok((pred_str, pred_vec))
    }

    pub fn to_order_clause(&self) -> String {
        to_order_clause(&self.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::{Direction, FilterOperator};
    use pretty_assertions::assert_eq;

    fn options_with(conditions: Vec<Condition>) -> FindOptions {
        FindOptions {
            conditions,
            take: 10,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_predicate() {
        let options = options_with(vec![]);
        let (pred_str, pred_vec) = options.to_predicate_parts().unwrap();
        assert_eq!(pred_str, "");
        assert!(pred_vec.is_empty());
    }

    #[test]
    fn test_conditions_join_with_and() {
        let options = options_with(vec![
            Condition::new("posts.id", FilterOperator::MoreThan, "2".into()),
            Condition::new("posts.title", FilterOperator::ILike, "%rust%".into()),
        ]);
        let (pred_str, pred_vec) = options.to_predicate_parts().unwrap();
        assert_eq!(
            pred_str,
            "(posts.id > ?) AND (posts.title LIKE ? COLLATE NOCASE)"
        );
        assert_eq!(pred_vec.len(), 2);
    }

    #[test]
    fn test_override_relations_union() {
        let mut options = options_with(vec![]);
        options.relations.push("author");

        let overrides = FindOverrides {
            relations: vec!["author", "images"],
            ..Default::default()
        };
        options.apply_overrides(&overrides);
        assert_eq!(options.relations, vec!["author", "images"]);
    }

    #[test]
    fn test_override_order_replaces_compiled_order() {
        let mut options = options_with(vec![]);
        options
            .order
            .push(OrderSpec::new("posts.title", Direction::Asc));

        let overrides = FindOverrides {
            order: vec![OrderSpec::new("posts.created_at", Direction::Desc)],
            ..Default::default()
        };
        options.apply_overrides(&overrides);
        assert_eq!(
            options.order,
            vec![OrderSpec::new("posts.created_at", Direction::Desc)]
        );
    }

    #[test]
    fn test_empty_overrides_change_nothing() {
        let mut options = options_with(vec![]);
        options
            .order
            .push(OrderSpec::new("posts.created_at", Direction::Asc));
        options.apply_overrides(&FindOverrides::default());
        assert_eq!(
            options.order,
            vec![OrderSpec::new("posts.created_at", Direction::Asc)]
        );
        assert!(options.select.is_none());
    }
}
