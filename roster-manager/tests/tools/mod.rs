#![allow(dead_code)]

pub mod fake_backend;
pub mod show_output;
