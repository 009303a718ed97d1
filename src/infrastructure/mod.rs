pub mod broadcast;
pub mod file_watcher;
pub mod registry;
