mod user_manager;
mod user_models;

pub use user_manager::UserManager;
pub use user_models::{NewUser, User};
