#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

pub mod routes;
pub mod server;
pub mod signature;
pub mod types;
pub mod verification_provider;
