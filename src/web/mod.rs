//! Web chat interface

pub mod server;
pub mod templates;

pub use server::ChatServer;
