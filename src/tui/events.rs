use crossterm::event::Event as CrosstermEvent;

/// Events consumed by the TUI loop, in arrival order
#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// Terminal input event (keyboard, paste, resize)
    Input(CrosstermEvent),
    /// Tick event for periodic updates (banner expiry)
    Tick,
    /// Delayed return to the group list after the input source was set.
    /// Runs against whatever state is current when it arrives.
    AutoReturn,
    /// SIGINT or SIGTERM delivered to the process
    Interrupt,
}
