//! HTTP backend for a small event-management site: accounts, events with
//! image uploads, pre-registrations, and user / admin task lists, all kept
//! in a document store.

pub mod config;
pub mod db;
pub mod errors;
pub mod extract;
pub mod models;
pub mod password;
pub mod routes;
pub mod storage;

pub use routes::build_router;
