// Import diesel table macros
use diesel::allow_tables_to_appear_in_same_query;
use diesel::joinable;
use diesel::table;

// Define users table
table! {
    users (id) {
        id -> Integer,
        username -> Text,
        email -> Text,
        pw_hash -> Text,
        about_me -> Nullable<Text>,
        last_seen -> Timestamp,
    }
}

// Define posts table
table! {
    posts (id) {
        id -> Integer,
        body -> Text,
        timestamp -> Timestamp,
        user_id -> Integer,
    }
}

// Follows edges. The DDL carries no uniqueness constraint on the pair;
// the composite key below only gives diesel a row identity.
table! {
    follows (follower_id, followed_id) {
        follower_id -> Integer,
        followed_id -> Integer,
    }
}

joinable!(posts -> users (user_id));

// Allow joining the tables if needed
allow_tables_to_appear_in_same_query!(users, posts, follows);
