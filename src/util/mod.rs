pub mod paths;
pub mod persist;
