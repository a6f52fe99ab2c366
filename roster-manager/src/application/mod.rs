pub mod assignment_store;
pub mod commands;
pub mod dto;
pub mod session;
pub mod time;
