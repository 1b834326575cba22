mod change_event;

pub use change_event::{BatchSummary, ChangeEvent, ChangeEventError, ChangeKind, ImageSide};
