pub mod input;
pub mod settings;
pub mod user;

pub use input::UserInput;
pub use settings::{load_settings, ScaffoldSettings};
pub use user::{load_user_config, UserConfig};
