//! `jadwa parse`: turn a saved model answer into a study.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use jadwa_core::ResponseMode;
use jadwa_runtime::parse;

use crate::output;

pub fn handle(mode: ResponseMode, file: Option<PathBuf>) -> Result<()> {
    let raw = match &file {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };

    let study = parse(&raw, mode).with_context(|| format!("answer could not be parsed as {mode}"))?;

    if output::is_json() {
        output::data("study", &study);
    } else {
        output::study(&study, None);
    }
    Ok(())
}
