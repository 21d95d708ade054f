use std::{env, fs, path::Path};

use anyhow::Context;
use vox::import::ImportOptions;

/// Environment variable overriding the import scale
pub const SCALE_ENV: &str = "VOXTOOL_SCALE";

/// Load import options: TOML file if given, then environment overrides.
pub fn load_import_options(path: Option<&Path>) -> anyhow::Result<ImportOptions> {
    let options = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading import config {}", path.display()))?;
            parse_import_options(&text)
                .with_context(|| format!("parsing import config {}", path.display()))?
        }
        None => ImportOptions::default(),
    };

    apply_env(options, |key| env::var(key).ok())
}

pub fn parse_import_options(text: &str) -> anyhow::Result<ImportOptions> {
    Ok(toml::from_str(text)?)
}

/// Apply environment overrides through `lookup`, then validate.
pub fn apply_env(
    mut options: ImportOptions,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ImportOptions> {
    if let Some(value) = lookup(SCALE_ENV) {
        options.scale = value
            .trim()
            .parse()
            .with_context(|| format!("{} is not a number: {:?}", SCALE_ENV, value))?;
    }

    validate(&options)?;
    Ok(options)
}

pub fn validate(options: &ImportOptions) -> anyhow::Result<()> {
    anyhow::ensure!(
        options.scale.is_finite() && options.scale > 0.0,
        "scale must be a positive number, got {}",
        options.scale
    );
    Ok(())
}
