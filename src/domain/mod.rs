mod category;
mod credentials;
mod resource_id;

pub use category::{CATEGORY_NAME_PREFIX, CategoryPayload};
pub use credentials::{Credentials, LoginPayload};
pub use resource_id::ResourceId;
