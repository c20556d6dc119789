//! `jadwa prompt`: show what a study would send.

use anyhow::Result;
use jadwa_runtime::{build_prompts, RuntimeConfig};

use crate::cli::StudyArgs;
use crate::output;

pub fn handle(input: StudyArgs) -> Result<()> {
    let request = input.request()?;
    let config = input.apply(RuntimeConfig::from_env());
    let prompts = build_prompts(&request, config.mode, config.language);

    if output::is_json() {
        output::data(
            "prompts",
            &serde_json::json!({
                "mode": config.mode,
                "language": config.language,
                "model": config.model,
                "primary": prompts.primary,
                "financials": prompts.financials,
            }),
        );
        return Ok(());
    }

    output::header(&format!("Study prompt ({} mode)", config.mode));
    println!("{}", prompts.primary);
    if let Some(financials) = &prompts.financials {
        println!();
        output::header("Financial prompt");
        println!("{financials}");
    }
    println!();
    output::dim(&format!(
        "{} model call(s) on {}",
        prompts.call_count(),
        config.model
    ));
    Ok(())
}
