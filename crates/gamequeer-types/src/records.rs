//! Cartridge record layouts
//!
//! Every record is packed with no padding and stores multi-byte fields
//! little-endian. Records are decoded from a byte buffer that the caller has
//! already copied out of namespaced memory, so decoding never touches memory
//! regions directly.

use crate::crc::crc16;
use crate::event::EventKind;
use crate::layout::{INT_SIZE, LED_COUNT, MAGIC, MENU_MAX_OPTIONS, PTR_SIZE, STR_SIZE};
use crate::pointer::{GamePtr, PointerError};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while decoding a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{record} record truncated: need {needed} bytes, got {got}")]
    Truncated {
        record: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("invalid pointer in {record} record: {source}")]
    Pointer {
        record: &'static str,
        #[source]
        source: PointerError,
    },

    #[error("menu option count {0} outside 1..={max}", max = MENU_MAX_OPTIONS)]
    OptionCount(i32),
}

/// A fixed-size record stored in namespaced memory
pub trait Record: Sized {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Short name used in diagnostics
    const NAME: &'static str;

    /// Decode from exactly `SIZE` (or more) bytes
    fn decode(bytes: &[u8]) -> Result<Self, DecodeError>;

    /// Append the encoded record to `out`
    fn encode(&self, out: &mut Vec<u8>);

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::SIZE);
        self.encode(&mut out);
        out
    }
}

/// Sequential little-endian field reader over a record buffer
struct FieldReader<'a> {
    record: &'static str,
    rest: &'a [u8],
}

impl<'a> FieldReader<'a> {
    fn new<R: Record>(bytes: &'a [u8]) -> Result<Self, DecodeError> {
        if bytes.len() < R::SIZE {
            return Err(DecodeError::Truncated {
                record: R::NAME,
                needed: R::SIZE,
                got: bytes.len(),
            });
        }
        Ok(Self {
            record: R::NAME,
            rest: &bytes[..R::SIZE],
        })
    }

    fn truncated(&self) -> DecodeError {
        DecodeError::Truncated {
            record: self.record,
            needed: 1,
            got: 0,
        }
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        self.rest.read_u8().map_err(|_| self.truncated())
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        self.rest
            .read_u16::<LittleEndian>()
            .map_err(|_| self.truncated())
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        self.rest
            .read_u32::<LittleEndian>()
            .map_err(|_| self.truncated())
    }

    fn i32(&mut self) -> Result<i32, DecodeError> {
        self.rest
            .read_i32::<LittleEndian>()
            .map_err(|_| self.truncated())
    }

    fn ptr(&mut self) -> Result<GamePtr, DecodeError> {
        let raw = self.u32()?;
        GamePtr::from_raw(raw).map_err(|source| DecodeError::Pointer {
            record: self.record,
            source,
        })
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        if self.rest.len() < N {
            return Err(self.truncated());
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.rest[..N]);
        self.rest = &self.rest[N..];
        Ok(out)
    }
}

/// Little-endian field writer used by `Record::encode`
struct FieldWriter<'a> {
    out: &'a mut Vec<u8>,
}

impl FieldWriter<'_> {
    fn u8(&mut self, value: u8) {
        self.out.push(value);
    }

    fn u16(&mut self, value: u16) {
        let mut buf = [0u8; 2];
        LittleEndian::write_u16(&mut buf, value);
        self.out.extend_from_slice(&buf);
    }

    fn u32(&mut self, value: u32) {
        let mut buf = [0u8; 4];
        LittleEndian::write_u32(&mut buf, value);
        self.out.extend_from_slice(&buf);
    }

    fn i32(&mut self, value: i32) {
        let mut buf = [0u8; 4];
        LittleEndian::write_i32(&mut buf, value);
        self.out.extend_from_slice(&buf);
    }

    fn ptr(&mut self, ptr: GamePtr) {
        self.u32(ptr.to_raw());
    }

    fn bytes(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }
}

/// Text of a NUL-terminated fixed-length string (non-ASCII bytes replaced)
pub fn fixed_to_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Encode `text` as a NUL-padded fixed-length string, truncating to fit
pub fn string_to_fixed(text: &str) -> [u8; STR_SIZE] {
    let mut out = [0u8; STR_SIZE];
    let bytes = text.as_bytes();
    let len = bytes.len().min(STR_SIZE - 1);
    out[..len].copy_from_slice(&bytes[..len]);
    out
}

// ===== Header =====

/// Game header at offset 0 of the cartridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub magic: [u8; 4],
    pub id: u16,
    pub title: [u8; STR_SIZE],
    pub anim_count: u16,
    pub stage_count: u16,
    pub starting_stage: GamePtr,
    pub startup_code: GamePtr,
    pub persistent_vars: GamePtr,
    pub persistent_crc16: GamePtr,
    pub color: u8,
    pub flags: u8,
    pub crc16: u16,
}

impl Header {
    /// Bytes covered by the header checksum
    pub const CHECKSUMMED_LEN: usize = Self::SIZE - 2;

    pub fn title(&self) -> String {
        fixed_to_string(&self.title)
    }

    pub fn has_valid_magic(&self) -> bool {
        self.magic == MAGIC
    }

    /// Checksum of an encoded header's leading bytes
    pub fn checksum_of(raw: &[u8]) -> u16 {
        let len = raw.len().min(Self::CHECKSUMMED_LEN);
        crc16(&raw[..len])
    }

    /// Recompute `crc16` from the other fields
    pub fn seal(&mut self) {
        let raw = self.to_bytes();
        self.crc16 = Self::checksum_of(&raw);
    }
}

impl Record for Header {
    const SIZE: usize = 4 + 2 + STR_SIZE + 2 + 2 + 4 * PTR_SIZE + 1 + 1 + 2;
    const NAME: &'static str = "header";

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new::<Self>(bytes)?;
        Ok(Self {
            magic: r.array()?,
            id: r.u16()?,
            title: r.array()?,
            anim_count: r.u16()?,
            stage_count: r.u16()?,
            starting_stage: r.ptr()?,
            startup_code: r.ptr()?,
            persistent_vars: r.ptr()?,
            persistent_crc16: r.ptr()?,
            color: r.u8()?,
            flags: r.u8()?,
            crc16: r.u16()?,
        })
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let mut w = FieldWriter { out };
        w.bytes(&self.magic);
        w.u16(self.id);
        w.bytes(&self.title);
        w.u16(self.anim_count);
        w.u16(self.stage_count);
        w.ptr(self.starting_stage);
        w.ptr(self.startup_code);
        w.ptr(self.persistent_vars);
        w.ptr(self.persistent_crc16);
        w.u8(self.color);
        w.u8(self.flags);
        w.u16(self.crc16);
    }
}

// ===== Stage =====

/// A scene: optional background visuals, optional menu, per-event handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub id: u16,
    pub anim_bg: GamePtr,
    pub cue_bg: GamePtr,
    pub menu: GamePtr,
    pub menu_prompt: GamePtr,
    pub event_commands: [GamePtr; EventKind::COUNT],
}

impl Stage {
    /// Bytecode entry point for `kind` (null when unhandled)
    pub fn handler(&self, kind: EventKind) -> GamePtr {
        self.event_commands[kind.index()]
    }
}

impl Record for Stage {
    const SIZE: usize = 2 + 4 * PTR_SIZE + EventKind::COUNT * PTR_SIZE;
    const NAME: &'static str = "stage";

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new::<Self>(bytes)?;
        let id = r.u16()?;
        let anim_bg = r.ptr()?;
        let cue_bg = r.ptr()?;
        let menu = r.ptr()?;
        let menu_prompt = r.ptr()?;
        let mut event_commands = [GamePtr::Null; EventKind::COUNT];
        for slot in event_commands.iter_mut() {
            *slot = r.ptr()?;
        }
        Ok(Self {
            id,
            anim_bg,
            cue_bg,
            menu,
            menu_prompt,
            event_commands,
        })
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let mut w = FieldWriter { out };
        w.u16(self.id);
        w.ptr(self.anim_bg);
        w.ptr(self.cue_bg);
        w.ptr(self.menu);
        w.ptr(self.menu_prompt);
        for ptr in self.event_commands {
            w.ptr(ptr);
        }
    }
}

// ===== Animation =====

/// Animation descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Animation {
    pub id: u16,
    pub frame_count: u16,
    pub ticks_per_frame: u16,
    pub flags: u16,
    pub width: u8,
    pub height: u8,
    pub frame_pointer: GamePtr,
}

impl Animation {
    /// Pointer to the frame record at `index`
    pub fn frame_ptr(&self, index: u16) -> Result<GamePtr, PointerError> {
        self.frame_pointer
            .add(index as u32 * AnimFrame::SIZE as u32)
    }
}

impl Record for Animation {
    const SIZE: usize = 2 + 2 + 2 + 2 + 1 + 1 + PTR_SIZE;
    const NAME: &'static str = "animation";

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new::<Self>(bytes)?;
        Ok(Self {
            id: r.u16()?,
            frame_count: r.u16()?,
            ticks_per_frame: r.u16()?,
            flags: r.u16()?,
            width: r.u8()?,
            height: r.u8()?,
            frame_pointer: r.ptr()?,
        })
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let mut w = FieldWriter { out };
        w.u16(self.id);
        w.u16(self.frame_count);
        w.u16(self.ticks_per_frame);
        w.u16(self.flags);
        w.u8(self.width);
        w.u8(self.height);
        w.ptr(self.frame_pointer);
    }
}

/// One frame of an animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimFrame {
    /// Bits-per-pixel and compression tag
    pub bpp: u8,
    pub data: GamePtr,
    pub data_size: u32,
}

impl AnimFrame {
    pub const FMT_1BPP_UNCOMP: u8 = 0x01;
    pub const FMT_1BPP_RLE4: u8 = 0x41;
}

impl Record for AnimFrame {
    const SIZE: usize = 1 + PTR_SIZE + 4;
    const NAME: &'static str = "frame";

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new::<Self>(bytes)?;
        Ok(Self {
            bpp: r.u8()?,
            data: r.ptr()?,
            data_size: r.u32()?,
        })
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let mut w = FieldWriter { out };
        w.u8(self.bpp);
        w.ptr(self.data);
        w.u32(self.data_size);
    }
}

// ===== LED cues =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A timed sequence of LED frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedCue {
    pub frame_count: u16,
    pub flags: u16,
    pub frames: GamePtr,
}

impl LedCue {
    pub const FLAG_LOOP: u16 = 0x0001;
    pub const FLAG_BACKGROUND: u16 = 0x0002;

    pub fn is_looping(&self) -> bool {
        self.flags & Self::FLAG_LOOP != 0
    }

    pub fn is_background(&self) -> bool {
        self.flags & Self::FLAG_BACKGROUND != 0
    }

    pub fn frame_ptr(&self, index: u16) -> Result<GamePtr, PointerError> {
        self.frames.add(index as u32 * LedCueFrame::SIZE as u32)
    }
}

impl Record for LedCue {
    const SIZE: usize = 2 + 2 + PTR_SIZE;
    const NAME: &'static str = "ledcue";

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new::<Self>(bytes)?;
        Ok(Self {
            frame_count: r.u16()?,
            flags: r.u16()?,
            frames: r.ptr()?,
        })
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let mut w = FieldWriter { out };
        w.u16(self.frame_count);
        w.u16(self.flags);
        w.ptr(self.frames);
    }
}

/// One LED frame: a duration and one color per physical LED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedCueFrame {
    /// Duration in LED ticks
    pub duration: u16,
    pub flags: u16,
    pub colors: [Rgb; LED_COUNT],
}

impl LedCueFrame {
    pub const FLAG_SMOOTH: u16 = 0x0001;

    pub fn is_smooth(&self) -> bool {
        self.flags & Self::FLAG_SMOOTH != 0
    }
}

impl Record for LedCueFrame {
    const SIZE: usize = 2 + 2 + LED_COUNT * 3;
    const NAME: &'static str = "ledcue frame";

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new::<Self>(bytes)?;
        let duration = r.u16()?;
        let flags = r.u16()?;
        let mut colors = [Rgb::BLACK; LED_COUNT];
        for color in colors.iter_mut() {
            *color = Rgb::new(r.u8()?, r.u8()?, r.u8()?);
        }
        Ok(Self {
            duration,
            flags,
            colors,
        })
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let mut w = FieldWriter { out };
        w.u16(self.duration);
        w.u16(self.flags);
        for color in self.colors {
            w.u8(color.r);
            w.u8(color.g);
            w.u8(color.b);
        }
    }
}

// ===== Menus =====

/// One `{label, value}` pair of a choice menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuOption {
    pub label: [u8; STR_SIZE],
    pub value: i32,
}

impl MenuOption {
    pub fn new(label: &str, value: i32) -> Self {
        Self {
            label: string_to_fixed(label),
            value,
        }
    }

    pub fn label(&self) -> String {
        fixed_to_string(&self.label)
    }
}

impl Default for MenuOption {
    fn default() -> Self {
        Self {
            label: [0; STR_SIZE],
            value: 0,
        }
    }
}

impl Record for MenuOption {
    const SIZE: usize = STR_SIZE + INT_SIZE;
    const NAME: &'static str = "menu option";

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new::<Self>(bytes)?;
        Ok(Self {
            label: r.array()?,
            value: r.i32()?,
        })
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let mut w = FieldWriter { out };
        w.bytes(&self.label);
        w.i32(self.value);
    }
}

/// A choice menu held in a fixed-capacity option table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    options: [MenuOption; MENU_MAX_OPTIONS],
    len: usize,
}

impl Menu {
    /// Validate the leading option count of an encoded menu
    pub fn option_count(count_bytes: &[u8]) -> Result<usize, DecodeError> {
        if count_bytes.len() < INT_SIZE {
            return Err(DecodeError::Truncated {
                record: "menu",
                needed: INT_SIZE,
                got: count_bytes.len(),
            });
        }
        let count = LittleEndian::read_i32(count_bytes);
        if count < 1 || count as usize > MENU_MAX_OPTIONS {
            return Err(DecodeError::OptionCount(count));
        }
        Ok(count as usize)
    }

    /// Encoded size of a menu with `count` options
    pub fn encoded_size(count: usize) -> usize {
        INT_SIZE + count * MenuOption::SIZE
    }

    /// Decode a full menu (count followed by the option table)
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let len = Self::option_count(bytes)?;
        let needed = Self::encoded_size(len);
        if bytes.len() < needed {
            return Err(DecodeError::Truncated {
                record: "menu",
                needed,
                got: bytes.len(),
            });
        }
        let mut options = [MenuOption::default(); MENU_MAX_OPTIONS];
        for (i, option) in options.iter_mut().take(len).enumerate() {
            let start = INT_SIZE + i * MenuOption::SIZE;
            *option = MenuOption::decode(&bytes[start..])?;
        }
        Ok(Self { options, len })
    }

    pub fn from_options(list: &[MenuOption]) -> Result<Self, DecodeError> {
        if list.is_empty() || list.len() > MENU_MAX_OPTIONS {
            return Err(DecodeError::OptionCount(list.len() as i32));
        }
        let mut options = [MenuOption::default(); MENU_MAX_OPTIONS];
        options[..list.len()].copy_from_slice(list);
        Ok(Self {
            options,
            len: list.len(),
        })
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        let mut w = FieldWriter { out };
        w.i32(self.len as i32);
        for option in self.options() {
            option.encode(w.out);
        }
    }

    pub fn options(&self) -> &[MenuOption] {
        &self.options[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Option<&MenuOption> {
        self.options().get(index)
    }
}
