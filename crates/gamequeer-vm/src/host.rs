//! Host contract
//!
//! The engine draws, reads buttons, drives LEDs and keeps time only through
//! these traits. Headless implementations are provided for tests and the
//! command-line runner.

use gamequeer_types::layout::LED_COUNT;
use gamequeer_types::{EventKind, Rgb};
use std::time::{Duration, Instant};

/// Monochrome draw color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    White,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

/// Encoded frame pixels handed to the surface for decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRef<'a> {
    /// Bits-per-pixel and compression tag of the frame
    pub format: u8,
    pub width: u8,
    pub height: u8,
    pub data: &'a [u8],
}

/// Pixel surface
pub trait Surface {
    fn clear(&mut self);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Color);
    /// Draw `text` with its top-left corner at `(x, y)`
    fn draw_text(&mut self, x: i32, y: i32, text: &str, inverted: bool);
    /// Draw an encoded image; transparent images skip background pixels
    fn draw_image(&mut self, x: i32, y: i32, image: ImageRef<'_>, transparent: bool);
    fn flush(&mut self);
}

/// Physical buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    L,
    R,
    Click,
}

impl Button {
    pub const ALL: [Button; 5] = [Button::A, Button::B, Button::L, Button::R, Button::Click];

    /// The event a press raises
    pub fn event(self) -> EventKind {
        match self {
            Button::A => EventKind::ButtonA,
            Button::B => EventKind::ButtonB,
            Button::L => EventKind::ButtonL,
            Button::R => EventKind::ButtonR,
            Button::Click => EventKind::Click,
        }
    }

    /// Desktop keyboard mapping
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            'a' => Some(Button::L),
            'd' => Some(Button::R),
            'l' => Some(Button::A),
            'k' => Some(Button::B),
            's' => Some(Button::Click),
            _ => None,
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Buttons pressed during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Buttons(u8);

impl Buttons {
    pub fn press(&mut self, button: Button) {
        self.0 |= button.bit();
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.0 & button.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Button> + '_ {
        Button::ALL.into_iter().filter(|b| self.is_pressed(*b))
    }
}

/// Button source polled once per tick
pub trait InputSource {
    fn poll(&mut self) -> Buttons;
}

/// The five RGB LEDs
pub trait LedSink {
    fn show(&mut self, colors: &[Rgb; LED_COUNT]);
}

/// Monotonic time plus sleep
pub trait Clock {
    /// Time since an arbitrary fixed origin
    fn now(&self) -> Duration;
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock that never sleeps; time advances only when told to
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Duration,
    slept: Vec<Duration>,
}

impl ManualClock {
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    /// Every sleep requested so far
    pub fn sleeps(&self) -> &[Duration] {
        &self.slept
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.slept.push(duration);
        self.now += duration;
    }
}

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCommand {
    Clear,
    FillRect(Rect, Color),
    Line((i32, i32), (i32, i32), Color),
    Text {
        x: i32,
        y: i32,
        text: String,
        inverted: bool,
    },
    Image {
        x: i32,
        y: i32,
        format: u8,
        width: u8,
        height: u8,
        len: usize,
        transparent: bool,
    },
    Flush,
}

/// Surface that records drawing calls instead of rasterizing them
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    flushes: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of completed frames
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Commands of the most recent frame (since the last `Clear`)
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| *c == DrawCommand::Clear)
            .unwrap_or(0);
        &self.commands[start..]
    }

    /// Text drawn in the most recent frame
    pub fn last_frame_text(&self) -> Vec<&str> {
        self.last_frame()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn reset(&mut self) {
        self.commands.clear();
        self.flushes = 0;
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect(rect, color));
    }

    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Color) {
        self.commands.push(DrawCommand::Line(from, to, color));
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, inverted: bool) {
        self.commands.push(DrawCommand::Text {
            x,
            y,
            text: text.to_string(),
            inverted,
        });
    }

    fn draw_image(&mut self, x: i32, y: i32, image: ImageRef<'_>, transparent: bool) {
        self.commands.push(DrawCommand::Image {
            x,
            y,
            format: image.format,
            width: image.width,
            height: image.height,
            len: image.data.len(),
            transparent,
        });
    }

    fn flush(&mut self) {
        self.commands.push(DrawCommand::Flush);
        self.flushes += 1;
    }
}

/// Input replayed from a fixed per-tick script
///
/// Each element is the set of buttons pressed in one tick; once the script
/// runs out every further tick is idle.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    ticks: Vec<Buttons>,
    position: usize,
}

impl ScriptedInput {
    pub fn new(ticks: Vec<Buttons>) -> Self {
        Self { ticks, position: 0 }
    }

    /// Parse a key script: one character per tick using the desktop
    /// mapping, `.` (or whitespace) for an idle tick.
    pub fn from_keys(keys: &str) -> Result<Self, char> {
        let mut ticks = Vec::with_capacity(keys.len());
        for key in keys.chars() {
            let mut buttons = Buttons::default();
            match key {
                '.' => {}
                k if k.is_whitespace() => continue,
                k => buttons.press(Button::from_key(k).ok_or(k)?),
            }
            ticks.push(buttons);
        }
        Ok(Self::new(ticks))
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.ticks.len()
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Buttons {
        let buttons = self.ticks.get(self.position).copied().unwrap_or_default();
        self.position += 1;
        buttons
    }
}

/// LED sink that keeps every update
#[derive(Debug, Clone, Default)]
pub struct RecordingLeds {
    pub history: Vec<[Rgb; LED_COUNT]>,
}

impl LedSink for RecordingLeds {
    fn show(&mut self, colors: &[Rgb; LED_COUNT]) {
        self.history.push(*colors);
    }
}
