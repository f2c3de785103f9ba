//! zmng — client library for ZoneMinder-style video surveillance servers.
//!
//! The heart of the crate is [`application::discovery`]: hand it whatever
//! the user typed (a bare host, `host:port`, or a full URL) and it works out
//! the portal, REST API, and streaming CGI URLs by ordered network probing.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::{discovery, streaming};
pub use domain::types;
pub use infrastructure::{api, http};
