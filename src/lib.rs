pub mod app;
pub mod cli;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod duration;
pub mod error;
pub mod event;
pub mod fetch;
pub mod layout;
pub mod open;
pub mod source;
pub mod tab;
pub mod table;
pub mod theme;
pub mod view;
