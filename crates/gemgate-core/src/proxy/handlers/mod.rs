// Handlers module - API endpoint handlers

pub mod chat;
pub mod common;
pub mod image;
pub mod login;
