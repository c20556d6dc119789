//! `jadwa leads` subcommands.

use anyhow::{bail, Result};
use jadwa_runtime::leads::digest_token;
use jadwa_runtime::report::format_amount;
use jadwa_runtime::{LeadLog, RuntimeConfig};

use crate::cli::LeadsAction;
use crate::output;

pub fn handle(action: LeadsAction) -> Result<()> {
    let config = RuntimeConfig::from_env();
    match action {
        LeadsAction::List { token } => list(&config, &token),
        LeadsAction::Path => {
            match &config.leads_path {
                Some(path) => output::kv("Lead log:", &path.display().to_string()),
                None => output::warning("Lead logging is disabled (JADWA_LEADS_PATH=off)."),
            }
            Ok(())
        }
        LeadsAction::Digest { token } => {
            output::kv("JADWA_ADMIN_TOKEN_SHA256", &digest_token(&token));
            Ok(())
        }
    }
}

fn list(config: &RuntimeConfig, token: &str) -> Result<()> {
    let Some(path) = &config.leads_path else {
        bail!("lead logging is disabled; set JADWA_LEADS_PATH to a file");
    };
    let auth = config.admin_auth()?;
    let leads = LeadLog::new(path).read_all(&auth, token)?;

    if output::is_json() {
        output::data("leads", &leads);
        return Ok(());
    }
    if leads.is_empty() {
        output::dim("No leads logged yet.");
        return Ok(());
    }

    let mut table = output::table();
    output::table_header(&mut table, &["Date", "Project", "City", "Capital"]);
    for lead in &leads {
        table.add_row(vec![
            lead.date.format("%Y-%m-%d %H:%M").to_string(),
            lead.project.clone(),
            lead.city.clone(),
            format_amount(lead.capital),
        ]);
    }
    println!("{table}");
    output::dim(&format!("{} lead(s) in {}", leads.len(), path.display()));
    Ok(())
}
