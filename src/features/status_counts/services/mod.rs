mod status_counter;

pub use status_counter::{StatusCountUpdater, StatusCounter};
