//! `jadwa config` subcommands.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use jadwa_runtime::config::mask_secret;
use jadwa_runtime::RuntimeConfig;

use crate::cli::ConfigAction;
use crate::output;

const API_KEY_ENV: &str = "GEMINI_API_KEY";

pub fn handle(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Api => configure_api(),
        ConfigAction::Show => show(),
    }
}

/// `~/.jadwa/env`, loaded on every start.
pub fn global_env_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".jadwa").join("env"))
}

fn configure_api() -> Result<()> {
    output::header("Configure Gemini");
    println!("  Key from https://aistudio.google.com/apikey");
    println!();

    if let Some(current) = RuntimeConfig::from_env().api_key {
        println!("  Current: {}", mask_secret(&current));
        println!();
    }

    let key = prompt_api_key()?;
    if key.is_empty() {
        output::warning("No key entered, cancelled.");
        return Ok(());
    }

    let path = global_env_path().ok_or_else(|| anyhow!("Could not find home directory"))?;
    save_env_value(&path, API_KEY_ENV, &key)?;

    output::success(&format!("Saved {API_KEY_ENV} to {}", path.display()));
    output::dim("jadwa reads this file on every run.");
    Ok(())
}

/// Read a key without echoing it; each character shows as `*`.
fn prompt_api_key() -> Result<String> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyModifiers},
        terminal,
    };

    println!("Enter API key:");
    print!("> ");
    io::stdout().flush()?;

    let mut key = String::new();
    terminal::enable_raw_mode()?;

    let outcome = loop {
        let pressed = match event::read() {
            Ok(Event::Key(k)) => k,
            Ok(_) => continue,
            Err(e) => break Err(e),
        };
        match pressed.code {
            KeyCode::Enter => break Ok(()),
            KeyCode::Esc => {
                key.clear();
                break Ok(());
            }
            KeyCode::Char('c') if pressed.modifiers.contains(KeyModifiers::CONTROL) => {
                key.clear();
                break Ok(());
            }
            KeyCode::Backspace => {
                if key.pop().is_some() {
                    print!("\x08 \x08");
                    let _ = io::stdout().flush();
                }
            }
            KeyCode::Char(c) => {
                key.push(c);
                print!("*");
                let _ = io::stdout().flush();
            }
            _ => {}
        }
    };

    terminal::disable_raw_mode()?;
    println!();
    outcome?;
    Ok(key.trim().to_string())
}

/// Set `KEY="value"` in an env file, keeping its other entries.
fn save_env_value(path: &Path, env_var: &str, value: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let existing = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut config: BTreeMap<String, String> = existing
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let line = line.strip_prefix("export ").unwrap_or(line);
            if line.starts_with('#') {
                return None;
            }
            let (key, value) = line.split_once('=')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect();

    config.insert(env_var.to_string(), format!("\"{value}\""));

    let mut content = String::from("# jadwa configuration, loaded on every run\n\n");
    for (k, v) in &config {
        content.push_str(&format!("{k}={v}\n"));
    }
    fs::write(path, content)?;
    Ok(())
}

fn show() -> Result<()> {
    let config = RuntimeConfig::from_env();
    let key = config
        .api_key
        .as_deref()
        .map(mask_secret)
        .unwrap_or_else(|| "(not set)".to_string());
    let leads = config
        .leads_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(disabled)".to_string());

    let entries = [
        ("api_key", key),
        ("model", config.model.clone()),
        (
            "fallback_model",
            config.fallback_model.clone().unwrap_or_else(|| "(none)".to_string()),
        ),
        ("base_url", config.base_url.clone().unwrap_or_else(|| "(default)".to_string())),
        ("mode", config.mode.to_string()),
        ("language", config.language.to_string()),
        ("max_retries", config.retry.max_attempts.to_string()),
        ("backoff_base_ms", config.retry.base_delay.as_millis().to_string()),
        ("backoff_max_ms", config.retry.max_delay.as_millis().to_string()),
        ("leads_path", leads),
        (
            "admin_read",
            if config.admin_token_sha256.is_some() { "enabled" } else { "disabled" }.to_string(),
        ),
    ];

    if output::is_json() {
        let map: BTreeMap<&str, &str> = entries.iter().map(|(k, v)| (*k, v.as_str())).collect();
        output::data("config", &map);
        return Ok(());
    }

    let mut table = output::table();
    output::table_header(&mut table, &["Setting", "Value"]);
    for (k, v) in &entries {
        table.add_row(vec![k.to_string(), v.clone()]);
    }
    println!("{table}");
    Ok(())
}
