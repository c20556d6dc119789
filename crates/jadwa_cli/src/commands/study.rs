//! `jadwa study`: run the full analysis.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use jadwa_runtime::{export_html, render_markdown, Analyzer, FinancialsSource, RuntimeConfig};

use crate::cli::StudyArgs;
use crate::output;

pub async fn handle(
    input: StudyArgs,
    export: Option<PathBuf>,
    markdown: Option<PathBuf>,
) -> Result<()> {
    let request = input.request()?;
    let config = input.apply(RuntimeConfig::from_env());
    // Fails on a missing key before anything is sent.
    let analyzer = Analyzer::from_config(config)?;

    let spinner = output::spinner(&format!(
        "Preparing feasibility study for {}...",
        request.project_name
    ));
    let report = match analyzer.run(&request).await {
        Ok(report) => {
            output::spinner_success(&spinner, "Study ready");
            report
        }
        Err(e) => {
            output::spinner_error(&spinner, "Study failed");
            return Err(e.into());
        }
    };

    if let Some(path) = &export {
        let html = export_html(&report.request, &report.study, report.language);
        fs::write(path, html).with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = &markdown {
        let md = render_markdown(&report.request, &report.study, report.language);
        fs::write(path, md).with_context(|| format!("writing {}", path.display()))?;
    }

    if output::is_json() {
        output::data("study", &report);
    } else {
        output::header(&format!(
            "{} ({}, {} SAR)",
            report.request.project_name,
            report.request.city,
            report.request.capital_display()
        ));
        output::study(&report.study, Some(&report.metrics));
        println!();
        if report.financials_source == FinancialsSource::Heuristic {
            output::warning("The model gave no usable projection; figures are an estimate.");
        }
        output::dim(&format!(
            "model {} | attempts {} | mode {}",
            report.model_used, report.attempts, report.mode
        ));
    }

    for path in export.iter().chain(markdown.iter()) {
        output::success(&format!("Saved {}", path.display()));
    }
    Ok(())
}
