mod status_count_dto;

pub use status_count_dto::StatusCountResponseDto;
