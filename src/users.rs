use chrono::Utc;
use rusqlite::{OptionalExtension, Row, ToSql};
use serde::Serialize;

use crate::database::Database;
use crate::error::PostlineError;
use crate::repo::{Entity, FindOptions, Repository};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub nickname: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub image: Option<String>,
    pub role: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Entity for User {
    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug)]
pub struct NewUser {
    pub nickname: String,
    pub email: String,
    pub password: String,
}

const USER_SELECT_LIST: &str = "users.id, users.nickname, users.email, users.password, \
     users.image, users.role, users.created_at, users.updated_at";

impl User {
    fn from_row(row: &Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            nickname: row.get(1)?,
            email: row.get(2)?,
            password: row.get(3)?,
            image: row.get(4)?,
            role: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    pub fn create(db: &Database, new_user: &NewUser) -> Result<Self, PostlineError> {
        let conn = db.conn()?;

        let nickname_exists: bool = conn
            .query_row(
                "SELECT count(*) FROM users WHERE nickname = ?",
                [&new_user.nickname],
                |row| row.get::<_, i64>(0),
            )
            .map(|count| count > 0)?;
        if nickname_exists {
            return Err(PostlineError::Error(format!(
                "Nickname '{}' is already in use",
                new_user.nickname
            )));
        }

        let email_exists: bool = conn
            .query_row(
                "SELECT count(*) FROM users WHERE email = ?",
                [&new_user.email],
                |row| row.get::<_, i64>(0),
            )
            .map(|count| count > 0)?;
        if email_exists {
            return Err(PostlineError::Error(format!(
                "Email '{}' is already in use",
                new_user.email
            )));
        }

        let now = Utc::now().timestamp();
        let id: i64 = conn.query_row(
            "INSERT INTO users (nickname, email, password, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?) RETURNING id",
            rusqlite::params![new_user.nickname, new_user.email, new_user.password, now, now],
            |row| row.get(0),
        )?;

        Ok(User {
            id,
            nickname: new_user.nickname.clone(),
            email: new_user.email.clone(),
            password: new_user.password.clone(),
            image: None,
            role: "user".to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get_by_id(db: &Database, user_id: i64) -> Result<Option<Self>, PostlineError> {
        let conn = db.conn()?;

        conn.query_row(
            &format!("SELECT {USER_SELECT_LIST} FROM users WHERE users.id = ?"),
            [user_id],
            Self::from_row,
        )
        .optional()
        .map_err(PostlineError::StorageUnavailable)
    }

    pub fn get_by_email(db: &Database, email: &str) -> Result<Option<Self>, PostlineError> {
        let conn = db.conn()?;

        conn.query_row(
            &format!("SELECT {USER_SELECT_LIST} FROM users WHERE users.email = ?"),
            [email],
            Self::from_row,
        )
        .optional()
        .map_err(PostlineError::StorageUnavailable)
    }
}

/// SQLite-backed user collection, scannable through the paginator.
pub struct UsersRepository {
    db: Database,
}

impl UsersRepository {
    pub fn new(db: Database) -> Self {
        UsersRepository { db }
    }
}

impl Repository<User> for UsersRepository {
    fn find_many(&self, options: &FindOptions) -> Result<Vec<User>, PostlineError> {
        let (pred_str, mut params_vec) = options.to_predicate_parts()?;

        let mut sql = format!("SELECT {USER_SELECT_LIST} FROM users");
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

        let rows = stmt.query_map(&sql_params[..], User::from_row)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::connect(&dir.path().join("postline.db")).unwrap();
        (dir, db)
    }

    fn new_user(nickname: &str, email: &str) -> NewUser {
        NewUser {
            nickname: nickname.to_string(),
            email: email.to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn test_create_and_fetch() {
        let (_dir, db) = test_db();
        let created = User::create(&db, &new_user("alice", "alice@example.com")).unwrap();
        assert_eq!(created.role, "user");

        let by_id = User::get_by_id(&db, created.id).unwrap().unwrap();
        assert_eq!(by_id.nickname, "alice");

        let by_email = User::get_by_email(&db, "alice@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        assert!(User::get_by_email(&db, "nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_nickname_rejected() {
        let (_dir, db) = test_db();
        User::create(&db, &new_user("alice", "alice@example.com")).unwrap();

        let result = User::create(&db, &new_user("alice", "other@example.com"));
        assert!(matches!(result, Err(PostlineError::Error(msg)) if msg.contains("already in use")));
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (_dir, db) = test_db();
        User::create(&db, &new_user("alice", "alice@example.com")).unwrap();

        let result = User::create(&db, &new_user("bob", "alice@example.com"));
        assert!(matches!(result, Err(PostlineError::Error(msg)) if msg.contains("already in use")));
    }

    #[test]
    fn test_find_many_orders_and_limits() {
        let (_dir, db) = test_db();
        for i in 1..=4 {
            User::create(&db, &new_user(&format!("user{i}"), &format!("u{i}@example.com")))
                .unwrap();
        }

        let repo = UsersRepository::new(db);
        let options = FindOptions {
            order: vec![crate::pagination::OrderSpec::new(
                "users.id",
                crate::pagination::Direction::Desc,
            )],
            take: 2,
            ..Default::default()
        };
        let users = repo.find_many(&options).unwrap();
        let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![4, 3]);
    }

    #[test]
    fn test_password_not_serialized() {
        let (_dir, db) = test_db();
        let user = User::create(&db, &new_user("alice", "alice@example.com")).unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["nickname"], "alice");
    }
}
