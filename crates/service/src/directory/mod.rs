pub mod repository;
pub mod service;

pub use repository::{DirectoryRepository, SeaOrmDirectoryRepository};
pub use service::{CallReveal, DirectoryService, MapReveal};
