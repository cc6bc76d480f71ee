use chrono::Utc;
use rusqlite::{OptionalExtension, Row, ToSql};
use serde::Serialize;

use crate::database::Database;
use crate::error::PostlineError;
use crate::repo::{Entity, FindOptions, Repository};

/// Projection of a post's author: just the fields a feed needs to render a
/// byline, never the credential columns.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: i64,
    pub nickname: String,
    pub image: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub content: String,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorSummary>,
}

impl Entity for Post {
    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

const POST_SELECT_LIST: &str = "posts.id, posts.author_id, posts.title, posts.content, \
     posts.like_count, posts.comment_count, posts.created_at, posts.updated_at";

const AUTHOR_SELECT_LIST: &str = "users.nickname, users.image";

impl Post {
    fn from_row(row: &Row) -> rusqlite::Result<Post> {
        Ok(Post {
            id: row.get(0)?,
            author_id: row.get(1)?,
            title: row.get(2)?,
            content: row.get(3)?,
            like_count: row.get(4)?,
            comment_count: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
            author: None,
        })
    }

    fn from_row_with_author(row: &Row) -> rusqlite::Result<Post> {
        let mut post = Self::from_row(row)?;
        post.author = Some(AuthorSummary {
            id: post.author_id,
            nickname: row.get(8)?,
            image: row.get(9)?,
        });
        Ok(post)
    }

    pub fn create(db: &Database, author_id: i64, new_post: &NewPost) -> Result<Self, PostlineError> {
        let conn = db.conn()?;

        let now = Utc::now().timestamp();
        let id: i64 = conn.query_row(
            "INSERT INTO posts (author_id, title, content, like_count, comment_count, created_at, updated_at)
             VALUES (?, ?, ?, 0, 0, ?, ?) RETURNING id",
            rusqlite::params![author_id, new_post.title, new_post.content, now, now],
            |row| row.get(0),
        )?;

        Ok(Post {
            id,
            author_id,
            title: new_post.title.clone(),
            content: new_post.content.clone(),
            like_count: 0,
            comment_count: 0,
            created_at: now,
            updated_at: now,
            author: None,
        })
    }

    pub fn get_by_id(db: &Database, post_id: i64) -> Result<Option<Self>, PostlineError> {
        let conn = db.conn()?;

        conn.query_row(
            &format!(
                "SELECT {POST_SELECT_LIST}, {AUTHOR_SELECT_LIST}
                 FROM posts JOIN users ON users.id = posts.author_id
                 WHERE posts.id = ?"
            ),
            [post_id],
            Self::from_row_with_author,
        )
        .optional()
        .map_err(PostlineError::StorageUnavailable)
    }

    /// Patch semantics: only the provided fields change, `updated_at` always
    /// advances. Returns None when the post doesn't exist.
    pub fn update(
        db: &Database,
        post_id: i64,
        patch: &PostPatch,
    ) -> Result<Option<Self>, PostlineError> {
        let Some(mut post) = Self::get_by_id(db, post_id)? else {
            return Ok(None);
        };

        if let Some(title) = &patch.title {
            post.title = title.clone();
        }
        if let Some(content) = &patch.content {
            post.content = content.clone();
        }
        post.updated_at = Utc::now().timestamp();

        let conn = db.conn()?;
        conn.execute(
            "UPDATE posts SET title = ?, content = ?, updated_at = ? WHERE id = ?",
            rusqlite::params![post.title, post.content, post.updated_at, post_id],
        )?;

        Ok(Some(post))
    }

    pub fn delete(db: &Database, post_id: i64) -> Result<bool, PostlineError> {
        let conn = db.conn()?;
        let deleted = conn.execute("DELETE FROM posts WHERE id = ?", [post_id])?;
        Ok(deleted > 0)
    }
}

/// SQLite-backed post collection. When the "author" relation is requested it
/// joins in the author summary in the same single query.
pub struct PostsRepository {
    db: Database,
}

impl PostsRepository {
    pub fn new(db: Database) -> Self {
        PostsRepository { db }
    }
}

impl Repository<Post> for PostsRepository {
    fn find_many(&self, options: &FindOptions) -> Result<Vec<Post>, PostlineError> {
        let with_author = options.relations.contains(&"author");

        let (pred_str, mut params_vec) = options.to_predicate_parts()?;

        let mut sql = match with_author {
            true => format!(
                "SELECT {POST_SELECT_LIST}, {AUTHOR_SELECT_LIST}
                 FROM posts JOIN users ON users.id = posts.author_id"
            ),
            false => format!("SELECT {POST_SELECT_LIST} FROM posts"),
        };
        if !pred_str.is_empty() {
            sql.push_str("\nWHERE ");
            sql.push_str(&pred_str);
        }
        sql.push_str(&options.to_order_clause());
        sql.push_str("\nLIMIT ?");
        params_vec.push(Box::new(options.take));

        let conn = self.db.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let sql_params: Vec<&dyn ToSql> = params_vec.iter().map(|b| &**b).collect();

        let mapper: fn(&Row) -> rusqlite::Result<Post> = match with_author {
            true => Post::from_row_with_author,
            false => Post::from_row,
        };
        let rows = stmt.query_map(&sql_params[..], mapper)?;

        let mut posts = Vec::new();
        for row in rows {
            posts.push(row?);
        }
        Ok(posts)
    }
}
