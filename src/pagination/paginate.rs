use url::Url;

use crate::error::PostlineError;
use crate::pagination::columns::ColMap;
use crate::pagination::order::Direction;
use crate::pagination::page::{Cursor, Page};
use crate::pagination::request::{
    PaginationRequest, CURSOR_LESS_THAN_KEY, CURSOR_MORE_THAN_KEY,
};
use crate::repo::{Entity, FindOverrides, Repository};

/// Scheme and authority used when rendering a next-page URL. Passed in
/// explicitly per call so the paginator stays free of ambient state.
#[derive(Debug, Clone)]
pub struct PageUrlConfig {
    pub protocol: String,
    pub host: String,
}

/// Runs one cursor-paginated read: compile the request, execute a single
/// bounded query, derive the continuation cursor, and render the next URL.
///
/// A page is "full" when it holds exactly `take` rows; only a full page
/// implies more data may exist. A short page terminates the scan with a null
/// cursor and no next link.
pub fn paginate<T, R>(
    request: &PaginationRequest,
    repository: &R,
    overrides: &FindOverrides,
    path: &str,
    page_url: &PageUrlConfig,
    cols: &ColMap,
) -> Result<Page<T>, PostlineError>
where
    T: Entity,
    R: Repository<T> + ?Sized,
{
    let mut options = request.compile(cols)?;
    options.apply_overrides(overrides);

    let results = repository.find_many(&options)?;

    let last_id = match results.last() {
        Some(last) if results.len() as i64 == request.take() => Some(last.id()),
        _ => None,
    };

    let next = match last_id {
        Some(id) => Some(render_next_url(request, path, page_url, id)?),
        None => None,
    };

    Ok(Page {
        count: results.len(),
        data: results,
        cursor: Cursor { after: last_id },
        next,
    })
}

/// Rebuilds the request URL with every non-empty original parameter replayed
/// and the new cursor appended. Both cursor keys are dropped from the replay;
/// dropping only one would let a stale cursor from the opposite scan
/// direction survive into the next request.
fn render_next_url(
    request: &PaginationRequest,
    path: &str,
    page_url: &PageUrlConfig,
    last_id: i64,
) -> Result<String, PostlineError> {
    let base = format!(
        "{}://{}/{}",
        page_url.protocol,
        page_url.host,
        path.trim_start_matches('/')
    );
    let mut url = Url::parse(&base)
        .map_err(|e| PostlineError::Error(format!("Invalid page URL '{base}': {e}")))?;

    {
        let mut query = url.query_pairs_mut();

        for (key, value) in request.entries() {
            if value.is_empty() {
                continue;
            }
            if key == CURSOR_MORE_THAN_KEY || key == CURSOR_LESS_THAN_KEY {
                continue;
            }
            query.append_pair(key, value);
        }

        let cursor_key = match request.order_created_at() {
            Direction::Asc => CURSOR_MORE_THAN_KEY,
            Direction::Desc => CURSOR_LESS_THAN_KEY,
        };
        query.append_pair(cursor_key, &last_id.to_string());
    }

    Ok(url.into())
}
