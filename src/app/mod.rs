pub mod config;
pub mod fields;
pub mod keybindings;
pub mod state;
pub mod validation;
