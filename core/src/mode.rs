//! Insert-mode edge detection

/// Collapsed view of the editor mode. Everything that is not insert mode is
/// treated the same, since there is only one command for each direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModeState {
    Insert,
    #[default]
    NotInsert,
}

/// Result of classifying a raw mode identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeEvent {
    Known(ModeState),
    Unrecognized,
}

impl ModeEvent {
    /// Classify a Neovim mode identifier, as found in `v:event.new_mode` or
    /// `mode(1)`.
    pub fn classify(mode: &str) -> Self {
        // CTRL-O from insert mode runs a single command and drops back into
        // insert, so it does not count as leaving.
        if mode == "niI" {
            return Self::Known(ModeState::Insert);
        }
        match mode.chars().next() {
            Some('i') => Self::Known(ModeState::Insert),
            Some(
                'n' | 'v' | 'V' | '\x16' | 's' | 'S' | '\x13' | 'R' | 'c' | 'r' | '!'
                | 't',
            ) => Self::Known(ModeState::NotInsert),
            _ => Self::Unrecognized,
        }
    }
}

/// What the dispatcher should do after a mode notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Enter,
    Leave,
}

#[derive(Debug, Default)]
pub struct ModeTracker {
    previous: ModeState,
}

impl ModeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ModeState {
        self.previous
    }

    pub fn reset(&mut self) {
        self.previous = ModeState::NotInsert;
    }

    /// Feed one raw mode notification. Returns a transition only on an actual
    /// insert edge.
    pub fn observe(&mut self, mode: &str) -> Option<Transition> {
        match ModeEvent::classify(mode) {
            ModeEvent::Known(next) => self.advance(next),
            ModeEvent::Unrecognized => {
                tracing::debug!(mode, "ignoring unrecognized mode");
                None
            }
        }
    }

    /// Adopt the mode the editor is in right now without reporting a
    /// transition. Unrecognized modes leave the state as is.
    pub fn sync(&mut self, mode: &str) -> ModeState {
        if let ModeEvent::Known(state) = ModeEvent::classify(mode) {
            self.previous = state;
        }
        self.previous
    }

    pub fn advance(&mut self, next: ModeState) -> Option<Transition> {
        let transition = match (self.previous, next) {
            (ModeState::NotInsert, ModeState::Insert) => Some(Transition::Enter),
            (ModeState::Insert, ModeState::NotInsert) => Some(Transition::Leave),
            _ => None,
        };
        self.previous = next;
        transition
    }
}
