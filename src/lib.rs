// RODO Admin Client - Library root

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod navigation;
pub mod session;
pub mod storage;

pub use client::RodoClient;
pub use error::ClientError;
pub use session::SessionManager;
