pub mod app;
pub mod cli;
pub mod config;
pub mod global;
pub mod panel;
pub mod stager;
pub mod xapi;
