pub mod blog;
pub mod format;
pub mod home;
pub mod layout;
pub mod markdown;
pub mod progress;
pub mod render;
pub mod text;
