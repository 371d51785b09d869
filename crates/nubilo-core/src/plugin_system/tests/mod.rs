pub mod common;

pub mod static_loader_tests;
