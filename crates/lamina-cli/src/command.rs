//! The line protocol: one verb plus arguments per line.
//!
//! Tokens are whitespace separated; double quotes group a token that contains
//! spaces. Blank lines and lines starting with `#` carry no command.

use std::path::PathBuf;

use lamina_core::OperatorSpec;

use crate::error::CommandError;

/// Usage line for every verb, in `help` order.
pub const USAGE: &[(&str, &str)] = &[
    ("create", "create <layer>"),
    ("remove", "remove <layer>"),
    ("select", "select <layer>"),
    ("show", "show <layer>"),
    ("hide", "hide <layer>"),
    ("load", "load <path>"),
    ("add", "add <layer> <path>"),
    ("checkerboard", "checkerboard <width> <height> [tile]"),
    ("save", "save <path>"),
    ("export", "export [path]"),
    ("filter", "filter <blur|sharpen>"),
    ("kernel", "kernel <n> <n*n weights> | kernel <rows> <cols> <rows*cols weights>"),
    ("colortransform", "colortransform <grayscale|sepia>"),
    ("matrix", "matrix <9 coefficients, row-major>"),
    ("mosaic", "mosaic [seeds] [rng-seed]"),
    ("downscale", "downscale <width> <height>"),
    ("load-layers", "load-layers <manifest>"),
    ("save-layers", "save-layers <manifest>"),
    ("layers", "layers"),
    ("help", "help"),
    ("quit", "quit"),
];

/// A parsed dispatcher command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Append an empty layer and select it.
    Create { layer: String },
    /// Delete a layer.
    Remove { layer: String },
    /// Make a layer current.
    Select { layer: String },
    /// Make a layer visible.
    Show { layer: String },
    /// Hide a layer.
    Hide { layer: String },
    /// Decode a file into the current layer.
    Load { path: PathBuf },
    /// Append a layer holding a decoded file.
    Add { layer: String, path: PathBuf },
    /// Generate a checkerboard into the current layer.
    Checkerboard {
        width: u32,
        height: u32,
        tile: Option<u32>,
    },
    /// Write the current layer's image.
    Save { path: PathBuf },
    /// Write the rendered image.
    Export { path: Option<PathBuf> },
    /// Run a dimension-preserving operator on the current layer.
    Apply(OperatorSpec),
    /// Mosaic with optional overrides of the configured seed count and RNG seed.
    Mosaic {
        seeds: Option<i64>,
        rng_seed: Option<u64>,
    },
    /// Replace the stack with a downscaled copy.
    Downscale { width: i64, height: i64 },
    /// Replace the stack with one read from a manifest.
    LoadLayers { path: PathBuf },
    /// Write the stack as a manifest plus images.
    SaveLayers { path: PathBuf },
    /// List layers.
    Layers,
    /// Print usage.
    Help,
    /// End the session.
    Quit,
}

impl Command {
    /// Parse one line. `Ok(None)` for blank and comment lines.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let tokens = tokenize(line)?;
        let Some((verb, rest)) = tokens.split_first() else {
            return Ok(None);
        };
        if verb.starts_with('#') {
            return Ok(None);
        }
        let verb = verb.to_ascii_lowercase();
        let args = Args {
            verb: &verb,
            items: rest,
        };

        let command = match verb.as_str() {
            "create" => Self::Create {
                layer: args.single()?,
            },
            "remove" => Self::Remove {
                layer: args.single()?,
            },
            "select" => Self::Select {
                layer: args.single()?,
            },
            "show" => Self::Show {
                layer: args.single()?,
            },
            "hide" => Self::Hide {
                layer: args.single()?,
            },
            "load" => Self::Load {
                path: args.single()?.into(),
            },
            "add" => {
                args.count(2, 2)?;
                Self::Add {
                    layer: rest[0].clone(),
                    path: PathBuf::from(&rest[1]),
                }
            }
            "checkerboard" => {
                args.count(2, 3)?;
                Self::Checkerboard {
                    width: args.number(0, "width")?,
                    height: args.number(1, "height")?,
                    tile: args.optional(2, "tile")?,
                }
            }
            "save" => Self::Save {
                path: args.single()?.into(),
            },
            "export" => {
                args.count(0, 1)?;
                Self::Export {
                    path: rest.first().map(PathBuf::from),
                }
            }
            "filter" => match args.single()?.to_ascii_lowercase().as_str() {
                "blur" => Self::Apply(OperatorSpec::Blur),
                "sharpen" => Self::Apply(OperatorSpec::Sharpen),
                other => return Err(args.usage(format!("unknown filter {other:?}"))),
            },
            "colortransform" => match args.single()?.to_ascii_lowercase().as_str() {
                "grayscale" | "greyscale" => Self::Apply(OperatorSpec::Grayscale),
                "sepia" => Self::Apply(OperatorSpec::Sepia),
                other => return Err(args.usage(format!("unknown color transform {other:?}"))),
            },
            "kernel" => Self::Apply(OperatorSpec::Kernel {
                rows: args.kernel_rows()?,
            }),
            "matrix" => {
                args.count(9, 9)?;
                let values = args.weights(0)?;
                Self::Apply(OperatorSpec::Matrix {
                    rows: values.chunks(3).map(<[f64]>::to_vec).collect(),
                })
            }
            "mosaic" => {
                args.count(0, 2)?;
                Self::Mosaic {
                    seeds: args.optional(0, "seeds")?,
                    rng_seed: args.optional(1, "rng-seed")?,
                }
            }
            "downscale" => {
                args.count(2, 2)?;
                Self::Downscale {
                    width: args.number(0, "width")?,
                    height: args.number(1, "height")?,
                }
            }
            "load-layers" => Self::LoadLayers {
                path: args.single()?.into(),
            },
            "save-layers" => Self::SaveLayers {
                path: args.single()?.into(),
            },
            "layers" => {
                args.count(0, 0)?;
                Self::Layers
            }
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => return Err(CommandError::UnknownVerb(verb.clone())),
        };
        Ok(Some(command))
    }
}

struct Args<'a> {
    verb: &'a str,
    items: &'a [String],
}

impl Args<'_> {
    fn usage(&self, reason: String) -> CommandError {
        let usage = USAGE
            .iter()
            .find(|(verb, _)| *verb == self.verb)
            .map_or("", |(_, usage)| *usage);
        CommandError::Usage {
            verb: self.verb.to_owned(),
            reason,
            usage,
        }
    }

    fn count(&self, min: usize, max: usize) -> Result<(), CommandError> {
        let n = self.items.len();
        if n < min || n > max {
            let expected = if min == max {
                format!("{min}")
            } else {
                format!("{min} to {max}")
            };
            return Err(self.usage(format!("expected {expected} argument(s), got {n}")));
        }
        Ok(())
    }

    fn single(&self) -> Result<String, CommandError> {
        self.count(1, 1)?;
        Ok(self.items[0].clone())
    }

    fn number<T: std::str::FromStr>(&self, index: usize, what: &str) -> Result<T, CommandError> {
        let token = &self.items[index];
        token
            .parse()
            .map_err(|_| self.usage(format!("{what} {token:?} is not a valid number")))
    }

    fn optional<T: std::str::FromStr>(
        &self,
        index: usize,
        what: &str,
    ) -> Result<Option<T>, CommandError> {
        if index < self.items.len() {
            self.number(index, what).map(Some)
        } else {
            Ok(None)
        }
    }

    fn weights(&self, from: usize) -> Result<Vec<f64>, CommandError> {
        (from..self.items.len())
            .map(|i| self.number(i, "weight"))
            .collect()
    }

    /// `n w...` with n*n weights, otherwise `rows cols w...`.
    fn kernel_rows(&self) -> Result<Vec<Vec<f64>>, CommandError> {
        if self.items.is_empty() {
            return Err(self.usage("missing kernel size".into()));
        }
        let n: usize = self.number(0, "size")?;
        let given = self.items.len() - 1;
        if n > 0 && n.checked_mul(n) == Some(given) {
            let weights = self.weights(1)?;
            return Ok(weights.chunks(n).map(<[f64]>::to_vec).collect());
        }

        if self.items.len() < 2 {
            return Err(self.usage(format!("expected {n}x{n} weights, got none")));
        }
        let rows = n;
        let cols: usize = self.number(1, "columns")?;
        let weights = self.weights(2)?;
        if rows == 0 || cols == 0 || rows.checked_mul(cols) != Some(weights.len()) {
            return Err(self.usage(format!(
                "expected {n}x{n} or rows x cols weights, got {given} values"
            )));
        }
        Ok(weights.chunks(cols).map(<[f64]>::to_vec).collect())
    }
}

fn tokenize(line: &str) -> Result<Vec<String>, CommandError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if quoted {
        return Err(CommandError::Usage {
            verb: tokens.first().cloned().unwrap_or_default(),
            reason: "unterminated quote".into(),
            usage: "wrap a path containing spaces in double quotes",
        });
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
