pub mod auth;
pub mod optional_json;

pub use auth::AuthenticatedUser;
pub use optional_json::OptionalJson;
