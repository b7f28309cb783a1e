pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod routes;
pub mod stats;
pub mod store;
pub mod utils;
