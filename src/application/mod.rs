pub mod discovery;
pub mod streaming;
