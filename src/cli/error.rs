// Exit codes
pub const SUCCESS: i32 = 0;
/// Spawn failure, no interactive terminal, or an unexpected TUI error
pub const ERROR: i32 = 1;
/// aria2c was terminated by a signal
pub const SIGNALED: i32 = 128;
