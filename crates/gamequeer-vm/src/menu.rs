//! Choice menus and text entry
//!
//! While a menu is open, events are offered to it before the stage handlers
//! see them. The menu either consumes an event or declines it, in which case
//! general dispatch proceeds as if no menu were open.
//!
//! Text entry edits `GQS_TEXTMENU_RESULT` in place, so an ENTER handler can
//! pre-fill the buffer and a MENU handler reads the result from the same slot.

use crate::codec::{load_menu, load_str, FixedStr, STR_CAPACITY};
use crate::engine::Engine;
use crate::error::ContentFault;
use gamequeer_types::{BuiltinInt, BuiltinStr, EventKind, GamePtr, Menu, MenuFlag};
use tracing::debug;

/// Vertical space reserved above the menu body when a prompt is shown
pub const PROMPT_HEIGHT: i32 = 18;

/// Glyph classes cycled by the B button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlyphClass {
    Capitals,
    Lowercase,
    Digits,
    /// Space through `/` and `:` through `@`
    Symbols,
}

impl GlyphClass {
    pub fn of(glyph: u8) -> Self {
        match glyph {
            b'A'..=b'Z' => GlyphClass::Capitals,
            b'a'..=b'z' => GlyphClass::Lowercase,
            b'0'..=b'9' => GlyphClass::Digits,
            _ => GlyphClass::Symbols,
        }
    }

    pub fn next(self) -> Self {
        match self {
            GlyphClass::Capitals => GlyphClass::Lowercase,
            GlyphClass::Lowercase => GlyphClass::Digits,
            GlyphClass::Digits => GlyphClass::Symbols,
            GlyphClass::Symbols => GlyphClass::Capitals,
        }
    }

    pub fn first(self) -> u8 {
        match self {
            GlyphClass::Capitals => b'A',
            GlyphClass::Lowercase => b'a',
            GlyphClass::Digits => b'0',
            GlyphClass::Symbols => b' ',
        }
    }

    pub fn last(self) -> u8 {
        match self {
            GlyphClass::Capitals => b'Z',
            GlyphClass::Lowercase => b'z',
            GlyphClass::Digits => b'9',
            GlyphClass::Symbols => b'@',
        }
    }

    /// Label of the class B switches to, as shown in the hint bar
    pub fn hint(self) -> &'static str {
        match self {
            GlyphClass::Capitals => "az",
            GlyphClass::Lowercase => "09",
            GlyphClass::Digits => "$!",
            GlyphClass::Symbols => "AZ",
        }
    }
}

/// The glyph after `glyph`, wrapping within its class
pub fn next_glyph(glyph: u8, class: GlyphClass) -> u8 {
    match glyph {
        0 => class.first(),
        b'Z' => b'A',
        b'z' => b'a',
        b'9' => b'0',
        b'@' => b' ',
        b'/' => b':',
        other => other.wrapping_add(1),
    }
}

/// The glyph before `glyph`, wrapping within its class
pub fn prev_glyph(glyph: u8, class: GlyphClass) -> u8 {
    match glyph {
        0 => class.first(),
        b'A' | b'a' | b'0' | b' ' => GlyphClass::of(glyph).last(),
        b':' => b'/',
        other => other.wrapping_sub(1),
    }
}

/// What the left/right buttons edit during text entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Character,
    Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceMenu {
    pub menu: Menu,
    pub selected: usize,
    pub prompt: Option<FixedStr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntry {
    pub cursor: usize,
    pub class: GlyphClass,
    pub mode: EditMode,
    pub prompt: Option<FixedStr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuState {
    Closed,
    Choice(ChoiceMenu),
    TextEntry(TextEntry),
}

impl MenuState {
    pub fn is_open(&self) -> bool {
        !matches!(self, MenuState::Closed)
    }

    pub fn prompt(&self) -> Option<&FixedStr> {
        match self {
            MenuState::Closed => None,
            MenuState::Choice(choice) => choice.prompt.as_ref(),
            MenuState::TextEntry(entry) => entry.prompt.as_ref(),
        }
    }

    /// Top of the menu body
    pub fn offset_y(&self) -> i32 {
        if self.prompt().is_some() {
            PROMPT_HEIGHT
        } else {
            0
        }
    }
}

/// Outcome of offering an event to an open menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuResponse {
    Consumed,
    Declined,
}

/// Zero everything after the terminator and drop trailing spaces. The first
/// character is never removed.
pub fn trim_text(text: &FixedStr) -> FixedStr {
    let mut out = *text;
    let mut len = out.len();
    out.truncate(len);
    while len > 1 && out.byte(len - 1) == b' ' {
        len -= 1;
        out.truncate(len);
    }
    out
}

impl Engine {
    fn load_prompt(&self, ptr: GamePtr) -> Result<Option<FixedStr>, ContentFault> {
        if ptr.is_null() {
            return Ok(None);
        }
        Ok(Some(load_str(&self.memory, ptr)?))
    }

    /// Open the choice menu at `menu_ptr`. Nothing changes when the menu or
    /// its prompt cannot be loaded.
    pub fn open_choice_menu(&mut self, menu_ptr: GamePtr, prompt: GamePtr) -> Result<(), ContentFault> {
        let menu = load_menu(&self.memory, menu_ptr)?;
        let prompt = self.load_prompt(prompt)?;
        debug!(%menu_ptr, options = menu.len(), "choice menu opened");
        self.menu = MenuState::Choice(ChoiceMenu {
            menu,
            selected: 0,
            prompt,
        });
        self.memory
            .set_builtin_int(BuiltinInt::MenuActive, MenuFlag::Choice as i32);
        self.events.set(EventKind::Refresh);
        Ok(())
    }

    /// Open text entry over the current contents of `GQS_TEXTMENU_RESULT`
    pub fn open_text_entry(&mut self, prompt: GamePtr) -> Result<(), ContentFault> {
        let prompt = self.load_prompt(prompt)?;
        let mut text = trim_text(&self.memory.builtin_str(BuiltinStr::TextMenuResult));
        let class = if text.is_empty() {
            text.set_byte(0, GlyphClass::Capitals.first());
            GlyphClass::Capitals
        } else {
            GlyphClass::of(text.byte(0))
        };
        self.memory.set_builtin_str(BuiltinStr::TextMenuResult, &text);

        debug!(initial = %text, "text entry opened");
        self.menu = MenuState::TextEntry(TextEntry {
            cursor: 0,
            class,
            mode: EditMode::Character,
            prompt,
        });
        self.memory
            .set_builtin_int(BuiltinInt::MenuActive, MenuFlag::TextEntry as i32);
        self.events.set(EventKind::Refresh);
        Ok(())
    }

    pub fn close_menu(&mut self) {
        self.menu = MenuState::Closed;
        self.memory.set_builtin_int(BuiltinInt::MenuActive, 0);
        self.events.set(EventKind::Refresh);
    }

    /// Offer an event to the open menu, if any
    pub(crate) fn offer_menu_event(&mut self, kind: EventKind) -> MenuResponse {
        match self.menu {
            MenuState::Closed => MenuResponse::Declined,
            MenuState::Choice(_) => self.choice_event(kind),
            MenuState::TextEntry(_) => self.text_entry_event(kind),
        }
    }

    fn choice_event(&mut self, kind: EventKind) -> MenuResponse {
        let MenuState::Choice(choice) = &mut self.menu else {
            return MenuResponse::Declined;
        };
        match kind {
            EventKind::ButtonA => {
                let value = choice.menu.get(choice.selected).map_or(0, |option| option.value);
                debug!(selected = choice.selected, value, "menu option chosen");
                self.memory.set_builtin_int(BuiltinInt::MenuValue, value);
                self.close_menu();
                self.events.set(EventKind::Menu);
            }
            EventKind::ButtonL => {
                if choice.selected > 0 {
                    choice.selected -= 1;
                    self.events.set(EventKind::Refresh);
                }
            }
            EventKind::ButtonR => {
                if choice.selected + 1 < choice.menu.len() {
                    choice.selected += 1;
                    self.events.set(EventKind::Refresh);
                }
            }
            _ => return MenuResponse::Declined,
        }
        MenuResponse::Consumed
    }

    fn text_entry_event(&mut self, kind: EventKind) -> MenuResponse {
        let MenuState::TextEntry(entry) = &mut self.menu else {
            return MenuResponse::Declined;
        };
        let mut text = self.memory.builtin_str(BuiltinStr::TextMenuResult);
        let cursor = entry.cursor;

        match (kind, entry.mode) {
            (EventKind::ButtonA, _) => {
                let text = trim_text(&text);
                debug!(result = %text, "text entry confirmed");
                self.memory.set_builtin_str(BuiltinStr::TextMenuResult, &text);
                self.close_menu();
                self.events.set(EventKind::Menu);
                return MenuResponse::Consumed;
            }
            (EventKind::ButtonB, _) => {
                entry.class = entry.class.next();
                text.set_byte(cursor, entry.class.first());
            }
            (EventKind::ButtonL, EditMode::Character) => {
                text.set_byte(cursor, prev_glyph(text.byte(cursor), entry.class));
            }
            (EventKind::ButtonR, EditMode::Character) => {
                text.set_byte(cursor, next_glyph(text.byte(cursor), entry.class));
            }
            (EventKind::ButtonL, EditMode::Position) => {
                text = trim_text(&text);
                entry.cursor = cursor.min(text.len());
                if entry.cursor > 0 {
                    entry.cursor -= 1;
                    entry.class = GlyphClass::of(text.byte(entry.cursor));
                }
            }
            (EventKind::ButtonR, EditMode::Position) => {
                if text.byte(cursor) != 0 && cursor < STR_CAPACITY - 1 {
                    entry.cursor += 1;
                    let glyph = text.byte(entry.cursor);
                    if glyph != 0 {
                        entry.class = GlyphClass::of(glyph);
                    }
                }
            }
            (EventKind::Click, mode) => {
                entry.mode = match mode {
                    EditMode::Character => EditMode::Position,
                    EditMode::Position => EditMode::Character,
                };
            }
            _ => return MenuResponse::Declined,
        }

        self.memory.set_builtin_str(BuiltinStr::TextMenuResult, &text);
        self.events.set(EventKind::Refresh);
        MenuResponse::Consumed
    }
}
