pub mod payload;
pub mod repository;
pub mod sqlite_repo;
pub mod webhook_repo;
