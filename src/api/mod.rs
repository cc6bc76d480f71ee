pub mod routes;

// Re-export route handlers for convenience
pub use routes::app;
pub use routes::posts;
pub use routes::users;
