use super::PlaybackState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Pause,
    Resume,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Pause => "pause",
            Action::Resume => "resume",
        }
    }
}

/// Which reading actions the control surface offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub start: bool,
    pub pause: bool,
    pub resume: bool,
}

impl Controls {
    /// Resume stays enabled while paused since that is the only state it
    /// can continue from. While reading it withdraws a pending pause.
    pub fn for_state(state: PlaybackState) -> Self {
        match state {
            PlaybackState::Idle => Self {
                start: true,
                pause: false,
                resume: false,
            },
            PlaybackState::Reading => Self {
                start: false,
                pause: true,
                resume: true,
            },
            PlaybackState::Paused => Self {
                start: true,
                pause: false,
                resume: true,
            },
        }
    }

    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::Start => self.start,
            Action::Pause => self.pause,
            Action::Resume => self.resume,
        }
    }
}
