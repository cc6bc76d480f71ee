use log::info;

use crate::database::Database;
use crate::error::PostlineError;
use crate::posts::{NewPost, Post};
use crate::users::{NewUser, User};

/// Inserts demo users and posts for local development. Posts are assigned to
/// authors round-robin so every feed has something to paginate.
pub fn run(db: &Database, user_count: i64, post_count: i64) -> Result<(), PostlineError> {
    if user_count <= 0 {
        return Err(PostlineError::Error(
            "Seeding requires at least one user".to_string(),
        ));
    }

    let mut authors = Vec::new();
    for i in 1..=user_count {
        let user = User::create(
            db,
            &NewUser {
                nickname: format!("user{i}"),
                email: format!("user{i}@example.com"),
                password: "password".to_string(),
            },
        )?;
        authors.push(user);
    }

    for i in 1..=post_count {
        let author = &authors[((i - 1) % user_count) as usize];
        Post::create(
            db,
            author.id,
            &NewPost {
                title: format!("Post #{i}"),
                content: format!("Seeded content for post {i}"),
            },
        )?;
    }

    info!("Seeded {user_count} users and {post_count} posts");
    println!("Seeded {user_count} users and {post_count} posts");

    Ok(())
}
