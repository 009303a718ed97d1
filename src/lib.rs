pub mod api;
pub mod components;
pub mod config;
pub mod core;
pub mod error;
pub mod infrastructure;
pub mod utils;

pub mod build_info {
    include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

    /// Commit the binary was built from, `"dev"` outside a git checkout.
    pub const GIT_SHA: &str = match option_env!("VERGEN_GIT_SHA") {
        Some(sha) => sha,
        None => "dev",
    };
}
