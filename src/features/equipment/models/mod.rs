mod equipment;

pub use equipment::{Equipment, EquipmentStatus, EquipmentUpdate};
