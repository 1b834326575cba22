mod history_recorder;

pub use history_recorder::HistoryRecorder;
