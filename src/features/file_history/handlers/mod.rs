mod file_history_handler;

pub use file_history_handler::*;
