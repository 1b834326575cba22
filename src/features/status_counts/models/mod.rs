mod status_count;

pub use status_count::StatusCount;
