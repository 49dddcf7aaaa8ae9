/// Headless cartridge runs
use anyhow::{anyhow, Context, Result};
use gamequeer_vm::host::{
    Clock, DrawCommand, RecordingLeds, RecordingSurface, ScriptedInput, SystemClock,
};
use gamequeer_vm::{Engine, EngineConfig, RunSummary, Runtime};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Inputs of one `run`
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub save: Option<PathBuf>,
    /// Stop after this many ticks; run until unload otherwise
    pub ticks: Option<u64>,
    /// Desktop key script, one character per tick
    pub keys: String,
    pub realtime: bool,
}

/// What a finished run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub summary: RunSummary,
    pub flushes: usize,
    pub led_updates: usize,
    /// Text drawn in the last complete frame
    pub last_frame: Vec<String>,
    pub save_written: bool,
}

/// Save image from disk; a missing file means a blank save
fn read_save(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no save image yet, starting blank");
            Ok(None)
        }
        Err(err) => Err(err).with_context(|| format!("reading save '{}'", path.display())),
    }
}

pub fn run_cart(image: Vec<u8>, config: EngineConfig, options: &RunOptions) -> Result<RunReport> {
    let input = ScriptedInput::from_keys(&options.keys)
        .map_err(|key| anyhow!("unmapped key '{key}' in input script"))?;

    let mut engine = Engine::new(config)?;
    if let Some(path) = options.save.as_deref() {
        if let Some(save) = read_save(path)? {
            engine.load_save(&save);
        }
    }
    engine.load_game(image).context("loading cartridge")?;
    if let Some(header) = engine.header() {
        info!(title = %header.title(), id = header.id, "cartridge loaded");
    }

    let mut runtime = Runtime::new(
        engine,
        RecordingSurface::new(),
        input,
        RecordingLeds::default(),
        SystemClock::new(),
    );
    if options.realtime {
        runtime = runtime.paced();
    }
    finish(runtime, options)
}

fn finish<C: Clock>(
    mut runtime: Runtime<RecordingSurface, ScriptedInput, RecordingLeds, C>,
    options: &RunOptions,
) -> Result<RunReport> {
    let summary = runtime.run(options.ticks);

    let last_frame = runtime
        .surface()
        .last_frame()
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect();

    let mut save_written = false;
    if let Some(path) = options.save.as_deref() {
        let memory = runtime.engine().memory();
        if summary.save_commits > 0 || memory.is_save_dirty() {
            fs::write(path, memory.save_image())
                .with_context(|| format!("writing save '{}'", path.display()))?;
            save_written = true;
            debug!(path = %path.display(), "save image written");
        }
    }

    Ok(RunReport {
        summary,
        flushes: runtime.surface().flushes(),
        led_updates: runtime.led_sink().history.len(),
        last_frame,
        save_written,
    })
}

impl RunReport {
    pub fn print(&self) {
        println!("Ticks: {}", self.summary.ticks);
        println!("Frames: {}", self.flushes);
        println!("LED updates: {}", self.led_updates);
        println!("Save commits: {}", self.summary.save_commits);
        if self.save_written {
            println!("Save image written");
        }
        if !self.last_frame.is_empty() {
            println!();
            println!("Last frame:");
            for line in &self.last_frame {
                println!("  {line}");
            }
        }
    }
}
