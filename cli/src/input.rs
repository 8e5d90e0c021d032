//! Source text acquisition: `--text`, `--file`, or standard input.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

pub fn read_source(text: Option<&str>, file: Option<&Path>, stdin: impl Read) -> Result<String> {
    match (text, file) {
        (Some(text), _) => Ok(text.to_string()),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read passage from {}", path.display())),
        (None, None) => {
            let mut buffer = String::new();
            let mut stdin = stdin;
            stdin
                .read_to_string(&mut buffer)
                .context("Failed to read passage from standard input")?;
            Ok(buffer)
        }
    }
}
