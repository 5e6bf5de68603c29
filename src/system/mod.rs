// System Layer
pub mod filesystem;
pub mod history_store;

pub use filesystem::{DirectoryLister, FileSystem};
pub use history_store::ConversationStore;
