pub mod loader;
pub mod timestamp;
pub mod writer;

pub use loader::ArchiveLoader;
pub use timestamp::{correct_for_archive_timezone_quirk, ArchiveClock};
pub use writer::{ArchiveWriter, Artifact};
