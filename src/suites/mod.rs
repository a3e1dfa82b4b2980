pub mod category;
pub mod expectations;
pub mod login;
