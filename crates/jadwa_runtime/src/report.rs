//! Report rendering: Markdown for terminals and files, HTML for a document
//! that word processors open directly.

use std::fmt::Write as _;

use jadwa_core::{FeasibilityStudy, FinancialMetrics, ReportLanguage, StudyRequest};

/// Section titles per report language.
struct Labels {
    title: &'static str,
    summary: &'static str,
    swot: &'static str,
    swot_entries: [&'static str; 4],
    financials: &'static str,
    year: &'static str,
    revenue: &'static str,
    profit: &'static str,
    metrics: &'static str,
    total_revenue: &'static str,
    total_profit: &'static str,
    margin: &'static str,
    roc: &'static str,
    payback: &'static str,
    plan: &'static str,
    city: &'static str,
    capital: &'static str,
    no_data: &'static str,
}

const ARABIC: Labels = Labels {
    title: "دراسة جدوى",
    summary: "الملخص التنفيذي",
    swot: "تحليل SWOT",
    swot_entries: ["نقاط القوة", "نقاط الضعف", "الفرص", "التهديدات"],
    financials: "التوقعات المالية",
    year: "السنة",
    revenue: "الإيرادات",
    profit: "صافي الربح",
    metrics: "المؤشرات",
    total_revenue: "إجمالي الإيرادات",
    total_profit: "إجمالي الأرباح",
    margin: "هامش الربح",
    roc: "العائد على رأس المال",
    payback: "سنة استرداد رأس المال",
    plan: "الخطة التشغيلية والتسويقية",
    city: "المدينة",
    capital: "رأس المال",
    no_data: "لا توجد بيانات",
};

const ENGLISH: Labels = Labels {
    title: "Feasibility Study",
    summary: "Executive Summary",
    swot: "SWOT Analysis",
    swot_entries: ["Strengths", "Weaknesses", "Opportunities", "Threats"],
    financials: "Financial Projection",
    year: "Year",
    revenue: "Revenue",
    profit: "Net Profit",
    metrics: "Indicators",
    total_revenue: "Total revenue",
    total_profit: "Total profit",
    margin: "Profit margin",
    roc: "Return on capital",
    payback: "Payback year",
    plan: "Operating and Marketing Plan",
    city: "City",
    capital: "Capital",
    no_data: "No data",
};

fn labels(language: ReportLanguage) -> &'static Labels {
    match language {
        ReportLanguage::Arabic => &ARABIC,
        ReportLanguage::English => &ENGLISH,
    }
}

fn city_name(request: &StudyRequest, language: ReportLanguage) -> &str {
    match language {
        ReportLanguage::Arabic => request.city.arabic_name(),
        ReportLanguage::English => request.city.name(),
    }
}

/// `1250000.0` -> `1,250,000`; fractional amounts keep two decimals.
pub fn format_amount(value: f64) -> String {
    let negative = value < 0.0;
    let abs = value.abs();
    let rounded = (abs * 100.0).round() / 100.0;
    let whole = rounded.trunc() as u64;
    let cents = ((rounded - rounded.trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if cents > 0 {
        let _ = write!(grouped, ".{cents:02}");
    }
    if negative && (whole > 0 || cents > 0) {
        grouped.insert(0, '-');
    }
    grouped
}

fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// `(label, value)` lines for the metrics block; absent metrics are skipped.
fn metric_lines(metrics: &FinancialMetrics, l: &Labels) -> Vec<(&'static str, String)> {
    let mut lines = Vec::new();
    if let Some(total) = metrics.total_revenue {
        lines.push((l.total_revenue, format_amount(total)));
    }
    lines.push((l.total_profit, format_amount(metrics.total_profit)));
    if let Some(margin) = metrics.profit_margin {
        lines.push((l.margin, percent(margin)));
    }
    if let Some(roc) = metrics.return_on_capital {
        lines.push((l.roc, percent(roc)));
    }
    if let Some(year) = &metrics.payback_year {
        lines.push((l.payback, year.clone()));
    }
    lines
}

pub fn render_markdown(
    request: &StudyRequest,
    study: &FeasibilityStudy,
    language: ReportLanguage,
) -> String {
    let l = labels(language);
    let mut out = String::new();

    let _ = writeln!(out, "# {}: {}\n", l.title, request.project_name);
    let _ = writeln!(out, "- **{}**: {}", l.city, city_name(request, language));
    let _ = writeln!(out, "- **{}**: {}\n", l.capital, format_amount(request.capital));

    let _ = writeln!(out, "## {}\n\n{}\n", l.summary, study.summary.trim());

    let _ = writeln!(out, "## {}\n", l.swot);
    for (label, (_, value)) in l.swot_entries.iter().zip(study.swot.entries()) {
        let _ = writeln!(out, "- **{label}**: {}", value.replace('\n', "; "));
    }
    out.push('\n');

    let _ = writeln!(out, "## {}\n", l.financials);
    let rows = study.financials.rows();
    if rows.is_empty() {
        let _ = writeln!(out, "_{}_\n", l.no_data);
    } else {
        let _ = writeln!(out, "| {} | {} | {} |", l.year, l.revenue, l.profit);
        out.push_str("|---|---:|---:|\n");
        for row in &rows {
            let revenue = row.revenue.map(format_amount).unwrap_or_else(|| "-".to_string());
            let _ = writeln!(out, "| {} | {} | {} |", row.year, revenue, format_amount(row.profit));
        }
        out.push('\n');

        let metrics = study.financials.metrics(request.capital);
        let _ = writeln!(out, "### {}\n", l.metrics);
        for (label, value) in metric_lines(&metrics, l) {
            let _ = writeln!(out, "- {label}: {value}");
        }
        out.push('\n');
    }

    let _ = writeln!(out, "## {}\n\n{}", l.plan, study.plan.trim());
    out
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Standalone HTML document. Every block element carries an explicit `dir`.
pub fn export_html(
    request: &StudyRequest,
    study: &FeasibilityStudy,
    language: ReportLanguage,
) -> String {
    let l = labels(language);
    let dir = if language.is_rtl() { "rtl" } else { "ltr" };
    let lang = language.as_str();
    let mut out = String::new();

    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html lang=\"{lang}\" dir=\"{dir}\">");
    let _ = writeln!(out, "<head>\n<meta charset=\"utf-8\">");
    let _ = writeln!(
        out,
        "<title>{}</title>\n</head>\n<body dir=\"{dir}\">",
        escape_html(&format!("{}: {}", l.title, request.project_name))
    );

    let _ = writeln!(
        out,
        "<h1 dir=\"{dir}\">{}: {}</h1>",
        l.title,
        escape_html(&request.project_name)
    );
    let _ = writeln!(
        out,
        "<p dir=\"{dir}\">{}: {} | {}: {}</p>",
        l.city,
        escape_html(city_name(request, language)),
        l.capital,
        format_amount(request.capital)
    );

    let _ = writeln!(out, "<h2 dir=\"{dir}\">{}</h2>", l.summary);
    paragraphs(&mut out, &study.summary, dir);

    let _ = writeln!(out, "<h2 dir=\"{dir}\">{}</h2>", l.swot);
    for (label, (_, value)) in l.swot_entries.iter().zip(study.swot.entries()) {
        let _ = writeln!(out, "<h3 dir=\"{dir}\">{label}</h3>");
        let _ = writeln!(out, "<ul dir=\"{dir}\">");
        for point in value.lines().map(str::trim).filter(|p| !p.is_empty()) {
            let _ = writeln!(out, "<li dir=\"{dir}\">{}</li>", escape_html(point));
        }
        let _ = writeln!(out, "</ul>");
    }

    let _ = writeln!(out, "<h2 dir=\"{dir}\">{}</h2>", l.financials);
    let rows = study.financials.rows();
    if rows.is_empty() {
        let _ = writeln!(out, "<p dir=\"{dir}\">{}</p>", l.no_data);
    } else {
        let _ = writeln!(out, "<table dir=\"{dir}\" border=\"1\">");
        let _ = writeln!(
            out,
            "<tr><th>{}</th><th>{}</th><th>{}</th></tr>",
            l.year, l.revenue, l.profit
        );
        for row in &rows {
            let revenue = row.revenue.map(format_amount).unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&row.year),
                revenue,
                format_amount(row.profit)
            );
        }
        let _ = writeln!(out, "</table>");

        let metrics = study.financials.metrics(request.capital);
        let _ = writeln!(out, "<ul dir=\"{dir}\">");
        for (label, value) in metric_lines(&metrics, l) {
            let _ = writeln!(out, "<li dir=\"{dir}\">{label}: {}</li>", escape_html(&value));
        }
        let _ = writeln!(out, "</ul>");
    }

    let _ = writeln!(out, "<h2 dir=\"{dir}\">{}</h2>", l.plan);
    paragraphs(&mut out, &study.plan, dir);

    let _ = writeln!(out, "</body>\n</html>");
    out
}

/// One `<p>` per non-empty line.
fn paragraphs(out: &mut String, text: &str, dir: &str) {
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let _ = writeln!(out, "<p dir=\"{dir}\">{}</p>", escape_html(line));
    }
}
