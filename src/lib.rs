pub mod api;
pub mod app;
pub mod cache;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod generator;
pub mod output;
pub mod report;
pub mod writer;
