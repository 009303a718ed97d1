pub mod listing;
pub mod models;
