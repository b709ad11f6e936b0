pub mod browser;
pub mod naming;
