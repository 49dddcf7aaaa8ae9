/// Cartridge file handling for the inspection commands
use anyhow::{Context, Result};
use gamequeer_types::{GamePtr, Header, Record};
use gamequeer_vm::memory::Memory;
use clap::{Args, ValueEnum};
use gamequeer_vm::{disassemble_cart, BackgroundCuePolicy, Engine, EngineConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub fn read_cart(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading cartridge '{}'", path.display()))
}

/// Background cue policy as spelled on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CuePolicyArg {
    Resume,
    Discard,
}

impl From<CuePolicyArg> for BackgroundCuePolicy {
    fn from(arg: CuePolicyArg) -> Self {
        match arg {
            CuePolicyArg::Resume => BackgroundCuePolicy::Resume,
            CuePolicyArg::Discard => BackgroundCuePolicy::Discard,
        }
    }
}

/// Command-line settings laid over the JSON config
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    /// System ticks per second
    #[arg(long, value_name = "HZ")]
    pub tick_hz: Option<u32>,
    /// System ticks per LED update
    #[arg(long, value_name = "TICKS")]
    pub led_divider: Option<u32>,
    /// Instructions one script may execute
    #[arg(long, value_name = "N")]
    pub max_instructions: Option<u32>,
    /// What happens to a background cue a foreground cue interrupted
    #[arg(long, value_enum, value_name = "POLICY")]
    pub cue_policy: Option<CuePolicyArg>,
    /// Player id exposed to content
    #[arg(long, value_name = "ID")]
    pub badge_id: Option<i32>,
    /// Load cartridges whose header checksum does not match
    #[arg(long)]
    pub skip_checksum: bool,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut EngineConfig) {
        if let Some(tick_hz) = self.tick_hz {
            config.tick_hz = tick_hz;
        }
        if let Some(divider) = self.led_divider {
            config.led_divider = divider;
        }
        if let Some(budget) = self.max_instructions {
            config.max_instructions = budget;
        }
        if let Some(policy) = self.cue_policy {
            config.cue_policy = policy.into();
        }
        if let Some(badge_id) = self.badge_id {
            config.badge_id = badge_id;
        }
        if self.skip_checksum {
            config.verify_checksum = false;
        }
    }
}

/// Engine configuration from an optional JSON file (defaults otherwise)
/// with command-line overrides applied on top
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config '{}'", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config '{}'", path.display()))?
        }
        None => EngineConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate().context("invalid engine configuration")?;
    Ok(config)
}

/// Header summary printed by `inspect`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CartInfo {
    pub size: usize,
    pub magic: String,
    pub id: u16,
    pub title: String,
    pub anim_count: u16,
    pub stage_count: u16,
    pub starting_stage: String,
    pub startup_code: String,
    pub persistent_vars: String,
    pub persistent_crc16: String,
    /// Bytes in the persistent block, when the cartridge declares one
    pub persistent_len: Option<u32>,
    pub color: u8,
    pub flags: u8,
    pub crc16: u16,
    pub checksum_ok: bool,
}

impl CartInfo {
    pub fn from_image(image: &[u8]) -> Result<Self> {
        let header = Header::decode(image).context("decoding cartridge header")?;
        let persistent_len = match (header.persistent_vars, header.persistent_crc16) {
            (GamePtr::Null, _) => None,
            (vars, crc) => crc.offset().get().checked_sub(vars.offset().get()),
        };
        Ok(Self {
            size: image.len(),
            magic: String::from_utf8_lossy(&header.magic).into_owned(),
            id: header.id,
            title: header.title(),
            anim_count: header.anim_count,
            stage_count: header.stage_count,
            starting_stage: header.starting_stage.to_string(),
            startup_code: header.startup_code.to_string(),
            persistent_vars: header.persistent_vars.to_string(),
            persistent_crc16: header.persistent_crc16.to_string(),
            persistent_len,
            color: header.color,
            flags: header.flags,
            crc16: header.crc16,
            checksum_ok: Header::checksum_of(image) == header.crc16,
        })
    }

    pub fn print(&self) {
        println!("Cartridge: {} (id {})", self.title, self.id);
        println!();
        println!("  Size: {} bytes", self.size);
        println!("  Magic: {}", self.magic);
        println!(
            "  Checksum: 0x{:04x} ({})",
            self.crc16,
            if self.checksum_ok { "ok" } else { "MISMATCH" }
        );
        println!("  Animations: {}", self.anim_count);
        println!("  Stages: {}", self.stage_count);
        println!("  Starting stage: {}", self.starting_stage);
        println!("  Startup code: {}", self.startup_code);
        match self.persistent_len {
            Some(len) => println!(
                "  Persistent block: {} ({} bytes, crc at {})",
                self.persistent_vars, len, self.persistent_crc16
            ),
            None => println!("  Persistent block: none"),
        }
        println!("  Color: {}  Flags: 0x{:02x}", self.color, self.flags);
    }
}

/// What `check` found beyond a successful load
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub title: String,
    /// Listing lines for unreadable stages, code that runs into unreadable
    /// memory, and unknown opcodes
    pub code_faults: Vec<String>,
}

/// Load the cartridge into a fresh engine (startup code included) and walk
/// every reachable code stream.
pub fn check_cart(image: Vec<u8>, config: &EngineConfig) -> Result<CheckReport> {
    let mut engine = Engine::new(config.clone())?;
    engine.load_game(image).context("loading cartridge")?;
    let title = engine.header().map(Header::title).unwrap_or_default();

    let listing = disassemble_cart(engine.memory()).context("walking cartridge code")?;
    let code_faults = listing
        .lines()
        .filter(|line| {
            line.contains("  ; ") || line.starts_with("; stage at") || line.contains("UNKNOWN(")
        })
        .map(str::to_string)
        .collect();
    Ok(CheckReport { title, code_faults })
}

/// Listing of the startup code and every stage reachable from it
pub fn disassemble_image(image: Vec<u8>, config: &EngineConfig) -> Result<String> {
    let mut memory = Memory::new(config.region_sizes());
    memory.load_cart(image);
    disassemble_cart(&memory).context("disassembling cartridge")
}
