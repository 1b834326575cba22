pub mod auth;
pub mod change_events;
pub mod equipment;
pub mod file_history;
pub mod status_counts;
