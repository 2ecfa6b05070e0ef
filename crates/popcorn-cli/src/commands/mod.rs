pub mod clear;
pub mod config;
pub mod context;
pub mod prompts;
pub mod rate;
pub mod search;
pub mod show;
pub mod ui;
pub mod watched;
