use phf_macros::phf_ordered_map;

/// Maps API-facing field names to the database columns they resolve to.
/// Column values are table-qualified so predicates stay unambiguous when a
/// repository joins in a relation.
pub type ColMap = phf::OrderedMap<&'static str, &'static str>;

pub static POSTS_QUERY_COLS: ColMap = phf_ordered_map! {
    "id" => "posts.id",
    "authorId" => "posts.author_id",
    "title" => "posts.title",
    "content" => "posts.content",
    "likeCount" => "posts.like_count",
    "commentCount" => "posts.comment_count",
    "createdAt" => "posts.created_at",
    "updatedAt" => "posts.updated_at",
};

pub static USERS_QUERY_COLS: ColMap = phf_ordered_map! {
    "id" => "users.id",
    "nickname" => "users.nickname",
    "email" => "users.email",
    "role" => "users.role",
    "createdAt" => "users.created_at",
    "updatedAt" => "users.updated_at",
};
