pub mod args;
pub mod history;
pub mod launcher;
