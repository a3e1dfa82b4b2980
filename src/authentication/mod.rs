mod session;
mod token;

pub use session::{Session, looks_like_jwt};
pub use token::{TokenError, acquire_token};
