pub mod files;
pub mod web_ui;
pub mod websocket;
