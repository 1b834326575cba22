mod equipment_dto;

pub use equipment_dto::{
    CreateEquipmentDto, EquipmentResponseDto, UpdateEquipmentDto, UploadUrlResponseDto,
};
