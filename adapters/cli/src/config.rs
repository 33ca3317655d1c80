//! Optional TOML style file.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use chapelet_rendering::BeadStyle;

const SUPPORTED_STYLE_VERSION: u32 = 1;

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct StyleFile {
    version: u32,
    #[serde(default)]
    style: BeadStyle,
}

/// Loads the bead style from `path`, or the built-in style when no path is given.
pub(crate) fn load_style(path: Option<&Path>) -> Result<BeadStyle> {
    let Some(path) = path else {
        return Ok(BeadStyle::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read style file at {}", path.display()))?;
    let style = parse_style(&contents)
        .with_context(|| format!("invalid style file at {}", path.display()))?;
    log::info!("loaded style from {}", path.display());
    Ok(style)
}

fn parse_style(contents: &str) -> Result<BeadStyle> {
    let file: StyleFile =
        toml::from_str(contents).context("failed to parse style toml contents")?;
    if file.version != SUPPORTED_STYLE_VERSION {
        bail!(
            "unsupported style file version {}; expected {}",
            file.version,
            SUPPORTED_STYLE_VERSION
        );
    }

    file.style.validate().context("style failed validation")?;
    Ok(file.style)
}
