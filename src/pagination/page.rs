use serde::Serialize;

/// Continuation marker: the id of the last entity on a full page, or null
/// when the scan is exhausted.
#[derive(Debug, Clone, Serialize)]
pub struct Cursor {
    pub after: Option<i64>,
}

/// One page of results. Constructed fresh per request and never mutated;
/// serializes as `{ data, cursor: { after }, count, next }`.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub cursor: Cursor,
    pub count: usize,
    pub next: Option<String>,
}
