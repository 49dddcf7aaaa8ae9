//! Built-in variable slots
//!
//! Content reaches engine state exclusively through these slots: they live
//! in the built-in integer and string namespaces and are read and written by
//! bytecode like any other variable.

use crate::layout::{INT_SIZE, STR_SIZE};
use crate::pointer::{GamePtr, Offset};

/// Slots of the built-in integer table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BuiltinInt {
    /// Active menu kind (0 when closed, otherwise a [`MenuFlag`] value)
    MenuActive = 0,
    /// Value of the last confirmed choice-menu option
    MenuValue = 1,
    /// Player/badge id supplied by the host
    BadgeId = 2,
    BgX = 3,
    BgY = 4,
    Fg1X = 5,
    Fg1Y = 6,
    Fg2X = 7,
    Fg2Y = 8,
    OverlayX = 9,
    OverlayY = 10,
    /// Bit `i` draws label `i` inverted
    LabelFlags = 11,
}

impl BuiltinInt {
    pub const COUNT: usize = 12;

    /// Byte size of the built-in integer table
    pub const TABLE_SIZE: usize = Self::COUNT * INT_SIZE;

    pub const ALL: [BuiltinInt; BuiltinInt::COUNT] = [
        BuiltinInt::MenuActive,
        BuiltinInt::MenuValue,
        BuiltinInt::BadgeId,
        BuiltinInt::BgX,
        BuiltinInt::BgY,
        BuiltinInt::Fg1X,
        BuiltinInt::Fg1Y,
        BuiltinInt::Fg2X,
        BuiltinInt::Fg2Y,
        BuiltinInt::OverlayX,
        BuiltinInt::OverlayY,
        BuiltinInt::LabelFlags,
    ];

    pub fn ptr(self) -> GamePtr {
        GamePtr::BuiltinInt(Offset::from_u16(self as u16 * INT_SIZE as u16))
    }

    pub fn name(self) -> &'static str {
        match self {
            BuiltinInt::MenuActive => "GQI_MENU_ACTIVE",
            BuiltinInt::MenuValue => "GQI_MENU_VALUE",
            BuiltinInt::BadgeId => "GQI_BADGE_ID",
            BuiltinInt::BgX => "GQI_BG_X",
            BuiltinInt::BgY => "GQI_BG_Y",
            BuiltinInt::Fg1X => "GQI_FG1_X",
            BuiltinInt::Fg1Y => "GQI_FG1_Y",
            BuiltinInt::Fg2X => "GQI_FG2_X",
            BuiltinInt::Fg2Y => "GQI_FG2_Y",
            BuiltinInt::OverlayX => "GQI_OVERLAY_X",
            BuiltinInt::OverlayY => "GQI_OVERLAY_Y",
            BuiltinInt::LabelFlags => "GQI_LABEL_FLAGS",
        }
    }
}

/// Slots of the built-in string table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BuiltinStr {
    /// Buffer edited by the text-entry menu
    TextMenuResult = 0,
    Label1 = 1,
    Label2 = 2,
    Label3 = 3,
    Label4 = 4,
}

impl BuiltinStr {
    pub const COUNT: usize = 5;

    /// Byte size of the built-in string table
    pub const TABLE_SIZE: usize = Self::COUNT * STR_SIZE;

    pub const ALL: [BuiltinStr; BuiltinStr::COUNT] = [
        BuiltinStr::TextMenuResult,
        BuiltinStr::Label1,
        BuiltinStr::Label2,
        BuiltinStr::Label3,
        BuiltinStr::Label4,
    ];

    pub const LABELS: [BuiltinStr; 4] = [
        BuiltinStr::Label1,
        BuiltinStr::Label2,
        BuiltinStr::Label3,
        BuiltinStr::Label4,
    ];

    pub fn ptr(self) -> GamePtr {
        GamePtr::BuiltinStr(Offset::from_u16(self as u16 * STR_SIZE as u16))
    }

    pub fn name(self) -> &'static str {
        match self {
            BuiltinStr::TextMenuResult => "GQS_TEXTMENU_RESULT",
            BuiltinStr::Label1 => "GQS_LABEL1",
            BuiltinStr::Label2 => "GQS_LABEL2",
            BuiltinStr::Label3 => "GQS_LABEL3",
            BuiltinStr::Label4 => "GQS_LABEL4",
        }
    }
}

/// Menu kinds, stored in `GQI_MENU_ACTIVE` and carried by menu-flag pointers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MenuFlag {
    Choice = 1,
    TextEntry = 2,
}

impl MenuFlag {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(MenuFlag::Choice),
            2 => Some(MenuFlag::TextEntry),
            _ => None,
        }
    }

    /// The reserved pointer a stage uses to request this menu kind
    pub fn ptr(self) -> GamePtr {
        GamePtr::MenuFlag(self as u32)
    }
}
