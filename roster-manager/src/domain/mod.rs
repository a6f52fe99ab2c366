pub mod calendar_logic;
pub mod models;
pub mod swap_engine;
pub mod swap_history;
