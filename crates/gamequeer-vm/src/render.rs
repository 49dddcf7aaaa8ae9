//! Screen composition
//!
//! A redraw paints, in order: the four animation slots (background opaque,
//! the rest transparent), the four text labels, then the menu overlay.

use crate::anim::SlotId;
use crate::codec::{load_record, FixedStr};
use crate::engine::Engine;
use crate::error::{ContentFault, MemoryFault};
use crate::host::{Color, ImageRef, Rect, Surface};
use crate::menu::{ChoiceMenu, EditMode, MenuState, TextEntry};
use gamequeer_types::layout::SCREEN_W;
use gamequeer_types::{AnimFrame, BuiltinInt, BuiltinStr};
use tracing::warn;

/// Height of one text row
pub const LINE_HEIGHT: i32 = 10;
/// Width of one glyph
pub const GLYPH_WIDTH: i32 = 6;

const LABEL_X: i32 = 2;
const LABEL_TOP: i32 = 88;

const MENU_TEXT_X: i32 = 15;
const MENU_MARKER_X: i32 = 6;
const PROMPT_POS: (i32, i32) = (6, 3);

const HINT_BAR_Y: i32 = 95;
const HINT_OK_POS: (i32, i32) = (108, 112);
const HINT_B_POS: (i32, i32) = (86, 112);

const WIDTH: i32 = SCREEN_W as i32;

impl Engine {
    /// Redraw the whole screen
    pub fn render(&mut self, surface: &mut dyn Surface) {
        surface.clear();
        for slot in SlotId::ALL {
            if let Err(fault) = self.draw_slot(slot, surface) {
                warn!(slot = slot.index(), %fault, "animation frame unreadable, slot stopped");
                self.stop_slot(slot);
            }
        }
        self.draw_labels(surface);
        match &self.menu {
            MenuState::Closed => {}
            MenuState::Choice(choice) => draw_choice(surface, choice, self.menu.offset_y()),
            MenuState::TextEntry(entry) => {
                let text = self.memory.builtin_str(BuiltinStr::TextMenuResult);
                draw_text_entry(surface, entry, &text.to_string(), self.menu.offset_y());
            }
        }
        surface.flush();
    }

    fn draw_slot(&self, slot: SlotId, surface: &mut dyn Surface) -> Result<(), ContentFault> {
        let state = self.anims[slot.index()];
        let Some(anim) = state.anim else {
            return Ok(());
        };
        let frame_ptr = anim.frame_ptr(state.frame).map_err(MemoryFault::from)?;
        let frame: AnimFrame = load_record(&self.memory, frame_ptr)?;
        let data = self.memory.read_vec(frame.data, frame.data_size as usize)?;

        let (x, y) = slot.position();
        let image = ImageRef {
            format: frame.bpp,
            width: anim.width,
            height: anim.height,
            data: &data,
        };
        surface.draw_image(
            self.memory.builtin_int(x),
            self.memory.builtin_int(y),
            image,
            slot != SlotId::Background,
        );
        Ok(())
    }

    fn draw_labels(&self, surface: &mut dyn Surface) {
        let flags = self.memory.builtin_int(BuiltinInt::LabelFlags);
        for (i, slot) in BuiltinStr::LABELS.into_iter().enumerate() {
            let label = self.memory.builtin_str(slot);
            if label.is_empty() {
                continue;
            }
            let inverted = flags & (1 << i) != 0;
            let y = LABEL_TOP + i as i32 * LINE_HEIGHT;
            surface.draw_text(LABEL_X, y, &label.to_string(), inverted);
        }
    }
}

fn draw_frame_bar(surface: &mut dyn Surface, y: i32) {
    surface.draw_line((0, y), (WIDTH - 1, y), Color::White);
    surface.draw_line((0, y + 3), (WIDTH - 1, y + 3), Color::White);
}

fn draw_hint_bar(surface: &mut dyn Surface, b_hint: Option<&str>) {
    surface.fill_rect(Rect::new(0, HINT_BAR_Y, WIDTH as u32, (WIDTH - HINT_BAR_Y) as u32), Color::Black);
    draw_frame_bar(surface, HINT_BAR_Y);
    surface.draw_text(HINT_OK_POS.0, HINT_OK_POS.1, "OK", false);
    if let Some(hint) = b_hint {
        surface.draw_text(HINT_B_POS.0, HINT_B_POS.1, hint, false);
    }
}

fn draw_prompt(surface: &mut dyn Surface, prompt: Option<&FixedStr>) {
    if let Some(prompt) = prompt.filter(|p| !p.is_empty()) {
        surface.draw_text(PROMPT_POS.0, PROMPT_POS.1, &prompt.to_string(), false);
    }
}

fn draw_choice(surface: &mut dyn Surface, choice: &ChoiceMenu, top: i32) {
    let bottom = top + choice.menu.len() as i32 * LINE_HEIGHT;
    surface.fill_rect(Rect::new(0, 0, WIDTH as u32, bottom as u32), Color::Black);
    draw_prompt(surface, choice.prompt.as_ref());

    for (i, option) in choice.menu.options().iter().enumerate() {
        let y = top + i as i32 * LINE_HEIGHT;
        surface.draw_text(MENU_TEXT_X, y, &option.label(), false);
        if i == choice.selected {
            surface.draw_text(MENU_MARKER_X, y, ">", false);
        }
    }
    draw_frame_bar(surface, bottom);
    draw_hint_bar(surface, None);
}

fn draw_text_entry(surface: &mut dyn Surface, entry: &TextEntry, text: &str, top: i32) {
    let ypos = top + 8;
    let left = GLYPH_WIDTH * entry.cursor as i32;
    let box_top = ypos - 2;
    let box_bottom = ypos + 10;
    let stem_x = left + 3;
    let stem_top = box_top - 10;
    let stem_bottom = box_bottom + 10;

    surface.fill_rect(Rect::new(0, 0, WIDTH as u32, (stem_bottom + 5) as u32), Color::Black);
    draw_frame_bar(surface, stem_bottom + 2);
    draw_prompt(surface, entry.prompt.as_ref());

    surface.draw_text(0, ypos, text, true);

    // Cursor box with a stem above and below
    surface.draw_line((left, box_top), (left + GLYPH_WIDTH, box_top), Color::White);
    surface.draw_line((left, box_bottom), (left + GLYPH_WIDTH, box_bottom), Color::White);
    surface.draw_line((stem_x, stem_top), (stem_x, box_top), Color::White);
    surface.draw_line((stem_x, stem_bottom), (stem_x, box_bottom), Color::White);

    if entry.mode == EditMode::Character {
        for dx in [-3, 3] {
            surface.draw_line((stem_x, stem_top), (stem_x + dx, stem_top + 4), Color::White);
            surface.draw_line((stem_x, stem_bottom), (stem_x + dx, stem_bottom - 4), Color::White);
        }
    }
    draw_hint_bar(surface, Some(entry.class.hint()));
}
