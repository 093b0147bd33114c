pub mod follow;
pub mod post;
pub mod user;

pub use follow::Follow;
pub use post::{NewPost, Post};
pub use user::{NewUser, User};
