pub mod api;
pub mod ask;
pub mod chat;
pub mod cli;
pub mod core;
pub mod view;
