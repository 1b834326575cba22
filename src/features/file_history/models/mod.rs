mod file_history;
mod storage_event;

pub use file_history::{FileEventName, FileHistoryEvent, SaveFileHistory};
pub use storage_event::{StorageEventEntity, StorageEventNotification, StorageEventRecord, StorageObject};
