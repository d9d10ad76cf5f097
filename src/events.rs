#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    EngineEvent(EngineEvent),
    AppEvent(AppEvent),
}

/// Commands that go through the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// Start the ticker, or stop it if it is running
    TogglePlay,

    /// Advance by a single generation
    Step,

    /// Flip the cell under the cursor
    ToggleCell,

    Clear,
    Randomize,
    Center,

    /// Halve the tick interval
    Faster,

    /// Double the tick interval
    Slower,

    /// Stamp the selected pattern centred on the cursor
    Stamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    CursorEvent(CursorEvent),

    /// The simulation advanced on its own
    Redraw,

    /// Select the next pattern in the catalog
    NextPattern,

    /// Select the previous pattern in the catalog
    PrevPattern,

    /// The terminal was resized
    Resize { cols: u16, rows: u16 },

    /// Exit the application
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorEvent {
    Up,
    Down,
    Left,
    Right,
}

impl CursorEvent {
    /// Unit step `(dx, dy)` for this move
    pub fn delta(self) -> (i64, i64) {
        match self {
            CursorEvent::Up => (0, -1),
            CursorEvent::Down => (0, 1),
            CursorEvent::Left => (-1, 0),
            CursorEvent::Right => (1, 0),
        }
    }
}
