#![warn(missing_debug_implementations)]

pub mod config;

pub mod menu;

pub mod registry;

pub use config::Config;
pub use menu::{Menu, MenuError, MenuState, Selection};
pub use registry::Registry;
