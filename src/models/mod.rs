// Data Models
pub mod command;
pub mod conversation;
pub mod directory_cache;
pub mod file_entry;
pub mod panel_state;

pub use command::{Action, ActionKind, ActionParams};
pub use conversation::{ConversationEntry, ConversationUpdate, EntryStatus};
pub use directory_cache::{DirectoryCache, SortBy, SortMode, SortOrder};
pub use file_entry::DirectoryEntry;
pub use panel_state::{PanelPair, PanelSide, PanelSnapshot, PanelState};
