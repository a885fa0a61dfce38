pub mod models;

pub use models::session::Session;
pub use models::user::{User, UserPatch};
