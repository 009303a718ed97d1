pub mod directory_table;
pub mod footer;
pub mod header;
pub mod layout;
pub mod modals;
