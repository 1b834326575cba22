pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;

pub use repository::PgStatusCountStore;
pub use services::{StatusCountUpdater, StatusCounter};
