//! Rendering command results.

use serde::Serialize;

use crate::Cli;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json { Self::Json } else { Self::Yaml }
    }

    pub fn render<T: Serialize>(self, value: &T) -> anyhow::Result<String> {
        Ok(match self {
            Self::Yaml => serde_yaml::to_string(value)?,
            Self::Json => serde_json::to_string_pretty(value)?,
        })
    }
}

/// Prints `value` to stdout in the format selected on the command line.
pub fn print<T: Serialize>(cli: &Cli, value: &T) -> anyhow::Result<()> {
    let text = OutputFormat::from_cli(cli).render(value)?;
    println!("{}", text.trim_end());
    Ok(())
}
