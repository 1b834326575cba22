pub mod models;
pub mod repository;
pub mod services;
pub mod workers;

pub use repository::PgChangeFeed;
pub use services::ChangeEventDispatcher;
pub use workers::ChangeStreamWorker;
