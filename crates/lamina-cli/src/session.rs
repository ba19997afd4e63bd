//! Command execution against a live layer stack.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use lamina_codec::{load_image, load_stack, save_image, save_stack};
use lamina_core::{EditError, LayerStack, OperatorSpec, PixelGrid};

use crate::command::{Command, USAGE};
use crate::config::AppConfig;
use crate::error::CommandError;

/// Whether the session should keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// One editing session: a stack plus the boundary defaults that fill in
/// omitted command arguments.
#[derive(Debug, Default)]
pub struct Session {
    stack: LayerStack,
    config: AppConfig,
}

impl Session {
    pub fn new(config: AppConfig) -> Self {
        Self {
            stack: LayerStack::new(),
            config,
        }
    }

    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse and execute one line.
    pub fn run_line(&mut self, line: &str, out: &mut dyn Write) -> Result<Flow, CommandError> {
        match Command::parse(line)? {
            Some(command) => self.execute(command, out),
            None => Ok(Flow::Continue),
        }
    }

    /// Execute one command. Listings and help go to `out`.
    pub fn execute(&mut self, command: Command, out: &mut dyn Write) -> Result<Flow, CommandError> {
        tracing::debug!("execute {command:?}");
        match command {
            Command::Create { layer } => self.stack.create_layer(&layer)?,
            Command::Remove { layer } => self.stack.remove_layer(&layer)?,
            Command::Select { layer } => self.stack.set_current(&layer)?,
            Command::Show { layer } => self.stack.set_visibility(&layer, true)?,
            Command::Hide { layer } => self.stack.set_visibility(&layer, false)?,
            Command::Load { path } => {
                let grid = load_image(&path)?;
                self.stack.load_image(grid)?;
            }
            Command::Add { layer, path } => {
                let grid = load_image(&path)?;
                self.stack.add_layer(&layer, grid)?;
            }
            Command::Checkerboard {
                width,
                height,
                tile,
            } => {
                let [first, second] = self.config.checkerboard_colors;
                let tile = tile.unwrap_or(self.config.checkerboard_tile);
                let grid =
                    PixelGrid::checkerboard("checkerboard", width, height, tile, first, second)?;
                self.stack.load_image(grid)?;
            }
            Command::Save { path } => {
                let layer = self
                    .stack
                    .current_layer()
                    .ok_or_else(|| EditError::InvalidState("no current layer to save".into()))?;
                let grid = layer.image().ok_or_else(|| {
                    EditError::InvalidState(format!("layer {:?} has no image", layer.name()))
                })?;
                save_image(grid, &path)?;
            }
            Command::Export { path } => {
                let grid = self.stack.render().ok_or_else(|| {
                    EditError::InvalidState("nothing to export: no visible layer has an image".into())
                })?;
                let path = path.unwrap_or_else(|| self.default_export_path(&grid));
                save_image(&grid, &path)?;
            }
            Command::Apply(spec) => self.stack.apply_spec(&spec)?,
            Command::Mosaic { seeds, rng_seed } => {
                let spec = OperatorSpec::Mosaic {
                    seeds: seeds.unwrap_or(self.config.mosaic_seeds),
                    rng_seed: rng_seed.or(self.config.rng_seed),
                };
                self.stack.apply_spec(&spec)?;
            }
            Command::Downscale { width, height } => {
                self.stack = self.stack.resized(width, height)?;
            }
            Command::LoadLayers { path } => {
                self.stack = load_stack(&path, &self.config.placeholder)?;
            }
            Command::SaveLayers { path } => {
                save_stack(
                    &self.stack,
                    &path,
                    self.config.export_format,
                    &self.config.placeholder,
                )?;
            }
            Command::Layers => self.list_layers(out)?,
            Command::Help => {
                for (_, usage) in USAGE {
                    writeln!(out, "  {usage}")?;
                }
            }
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Top to bottom; `*` marks the current layer.
    fn list_layers(&self, out: &mut dyn Write) -> std::io::Result<()> {
        if self.stack.is_empty() {
            return writeln!(out, "(no layers)");
        }
        let current = self.stack.current_index();
        for (index, layer) in self.stack.layers().iter().enumerate().rev() {
            let marker = if current == Some(index) { '*' } else { ' ' };
            let size = layer.image().map_or_else(
                || "no image".to_owned(),
                |g| format!("{}x{}", g.width(), g.height()),
            );
            let hidden = if layer.is_visible() { "" } else { " (hidden)" };
            writeln!(out, "{marker} {index}: {} [{size}]{hidden}", layer.name())?;
        }
        Ok(())
    }

    fn default_export_path(&self, grid: &PixelGrid) -> PathBuf {
        let stem = if grid.name().is_empty() {
            "export"
        } else {
            grid.name()
        };
        PathBuf::from(format!("{stem}.{}", self.config.export_format.extension()))
    }
}

/// Run every line of `input`, stopping at the first failure.
pub fn run_script(
    session: &mut Session,
    input: impl BufRead,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let flow = session
            .run_line(&line, out)
            .map_err(|source| CommandError::Script {
                line: index + 1,
                source: Box::new(source),
            })?;
        if flow == Flow::Quit {
            break;
        }
    }
    Ok(())
}

/// Read commands until `quit` or end of input, reporting failures to `err`
/// and carrying on. Returns the number of failed commands.
pub fn run_interactive(
    session: &mut Session,
    input: impl BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
    prompt: bool,
) -> std::io::Result<usize> {
    let mut failures = 0;
    let mut lines = input.lines();
    loop {
        if prompt {
            write!(out, "> ")?;
            out.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        match session.run_line(&line?, out) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => {
                failures += 1;
                tracing::debug!("command failed: {e}");
                writeln!(err, "error: {e}")?;
            }
        }
    }
    Ok(failures)
}
