mod columns;
mod filter;
mod order;
mod page;
mod paginate;
mod request;

pub use columns::{ColMap, POSTS_QUERY_COLS, USERS_QUERY_COLS};
pub use filter::{Condition, FilterOperator};
pub use order::{to_order_clause, Direction, OrderSpec};
pub use page::{Cursor, Page};
pub use paginate::{paginate, PageUrlConfig};
pub use request::PaginationRequest;
