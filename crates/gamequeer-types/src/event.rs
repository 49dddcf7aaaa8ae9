//! Event kinds and the pending-event vector

use std::fmt;

/// Every event the stage machine dispatches, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum EventKind {
    Enter = 0,
    ButtonA = 1,
    ButtonB = 2,
    ButtonL = 3,
    ButtonR = 4,
    Click = 5,
    BgDone = 6,
    Fg1Done = 7,
    Fg2Done = 8,
    Menu = 9,
    Timer = 10,
    Refresh = 11,
}

impl EventKind {
    /// Number of event kinds; also the length of a stage's handler table
    pub const COUNT: usize = 12;

    /// All kinds in dispatch priority order
    pub const ALL: [EventKind; EventKind::COUNT] = [
        EventKind::Enter,
        EventKind::ButtonA,
        EventKind::ButtonB,
        EventKind::ButtonL,
        EventKind::ButtonR,
        EventKind::Click,
        EventKind::BgDone,
        EventKind::Fg1Done,
        EventKind::Fg2Done,
        EventKind::Menu,
        EventKind::Timer,
        EventKind::Refresh,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            EventKind::Enter => "ENTER",
            EventKind::ButtonA => "BUTTON_A",
            EventKind::ButtonB => "BUTTON_B",
            EventKind::ButtonL => "BUTTON_L",
            EventKind::ButtonR => "BUTTON_R",
            EventKind::Click => "CLICK",
            EventKind::BgDone => "BGDONE",
            EventKind::Fg1Done => "FG1DONE",
            EventKind::Fg2Done => "FG2DONE",
            EventKind::Menu => "MENU",
            EventKind::Timer => "TIMER",
            EventKind::Refresh => "REFRESH",
        }
    }

    #[inline]
    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Bit set of pending events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventFlags(u16);

impl EventFlags {
    pub fn new() -> Self {
        Self(0)
    }

    #[inline]
    pub fn set(&mut self, kind: EventKind) {
        self.0 |= kind.bit();
    }

    #[inline]
    pub fn clear(&mut self, kind: EventKind) {
        self.0 &= !kind.bit();
    }

    #[inline]
    pub fn is_set(&self, kind: EventKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Clear `kind` and report whether it was pending
    pub fn take(&mut self, kind: EventKind) -> bool {
        let was_set = self.is_set(kind);
        self.clear(kind);
        was_set
    }

    pub fn clear_all(&mut self) {
        self.0 = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    /// Pending kinds in priority order
    pub fn iter(&self) -> impl Iterator<Item = EventKind> + '_ {
        EventKind::ALL.iter().copied().filter(|kind| self.is_set(*kind))
    }
}
