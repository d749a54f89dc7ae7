pub mod file;
pub mod processor;
pub mod walker;

pub use processor::ContentProcessor;
pub use walker::{render_tree, NamePlaceholder};
