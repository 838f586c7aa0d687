pub mod errors;
pub mod events;
pub mod id;
pub mod notifications;

pub use errors::{ConfigError, PokerSyncError, SyncError};
pub use events::EventBus;
pub use id::{is_valid_room_code, new_id, new_room_code, normalize_room_code};
pub use notifications::{Notification, NotificationLevel};

pub type Result<T> = std::result::Result<T, PokerSyncError>;
