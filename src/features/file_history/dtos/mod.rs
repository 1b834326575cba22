mod file_history_dto;

pub use file_history_dto::{FileHistoryResponseDto, NotificationSummaryDto};
