pub mod models;
pub mod user_directory;

pub use models::AuthUser;
pub use user_directory::{AuthError, UserDirectory};
