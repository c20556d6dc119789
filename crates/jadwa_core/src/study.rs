//! Feasibility study produced from one model response.
//!
//! Every field defaults to an empty value so renderers never deal with an
//! absent section. Length consistency of the financial sequences is not
//! enforced here; consumers go through [`Financials::rows`].

use serde::{Deserialize, Serialize};

/// Text used for SWOT entries the model did not provide.
pub const SWOT_PLACEHOLDER: &str = "Not provided";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityStudy {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub swot: Swot,
    #[serde(default)]
    pub financials: Financials,
    #[serde(default)]
    pub plan: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Swot {
    #[serde(default)]
    pub strength: String,
    #[serde(default)]
    pub weakness: String,
    #[serde(default)]
    pub opportunity: String,
    #[serde(default)]
    pub threat: String,
}

impl Swot {
    /// Build from up to four entries in S, W, O, T order; missing entries
    /// get [`SWOT_PLACEHOLDER`].
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut it = entries.into_iter().map(|s| -> String { s.into() });
        let mut next = || it.next().unwrap_or_else(|| SWOT_PLACEHOLDER.to_string());
        Self {
            strength: next(),
            weakness: next(),
            opportunity: next(),
            threat: next(),
        }
    }

    /// `(label, value)` pairs in S, W, O, T order.
    pub fn entries(&self) -> [(&'static str, &str); 4] {
        [
            ("Strength", self.strength.as_str()),
            ("Weakness", self.weakness.as_str()),
            ("Opportunity", self.opportunity.as_str()),
            ("Threat", self.threat.as_str()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.entries().iter().all(|(_, v)| v.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    #[serde(default)]
    pub years: Vec<String>,
    #[serde(default)]
    pub revenue: Vec<f64>,
    #[serde(default)]
    pub profit: Vec<f64>,
}

/// One aligned year of the projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialRow {
    pub year: String,
    pub revenue: Option<f64>,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialMetrics {
    pub years: usize,
    pub total_revenue: Option<f64>,
    pub total_profit: f64,
    /// Total profit over total revenue; only when every row has revenue.
    pub profit_margin: Option<f64>,
    /// Total profit over capital; `None` for zero capital.
    pub return_on_capital: Option<f64>,
    /// First year in which cumulative profit covers the capital.
    pub payback_year: Option<String>,
}

impl Financials {
    /// True when the three sequences have the same length.
    pub fn is_aligned(&self) -> bool {
        self.years.len() == self.revenue.len() && self.years.len() == self.profit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty() && self.revenue.is_empty() && self.profit.is_empty()
    }

    /// Rows zipped over `years` and `profit`, truncated to the shorter of the
    /// two. Revenue is attached where the revenue sequence reaches.
    pub fn rows(&self) -> Vec<FinancialRow> {
        self.years
            .iter()
            .zip(&self.profit)
            .enumerate()
            .map(|(i, (year, profit))| FinancialRow {
                year: year.clone(),
                revenue: self.revenue.get(i).copied(),
                profit: *profit,
            })
            .collect()
    }

    pub fn metrics(&self, capital: f64) -> FinancialMetrics {
        let rows = self.rows();
        let total_profit: f64 = rows.iter().map(|r| r.profit).sum();
        let revenues: Vec<f64> = rows.iter().filter_map(|r| r.revenue).collect();
        let total_revenue = (!revenues.is_empty()).then(|| revenues.iter().sum::<f64>());
        let profit_margin = match total_revenue {
            Some(rev) if revenues.len() == rows.len() && rev > 0.0 => Some(total_profit / rev),
            _ => None,
        };
        let return_on_capital = (capital > 0.0).then(|| total_profit / capital);

        let mut cumulative = 0.0;
        let payback_year = if capital > 0.0 {
            rows.iter().find_map(|r| {
                cumulative += r.profit;
                (cumulative >= capital).then(|| r.year.clone())
            })
        } else {
            None
        };

        FinancialMetrics {
            years: rows.len(),
            total_revenue,
            total_profit,
            profit_margin,
            return_on_capital,
            payback_year,
        }
    }

    /// Three-year profit curve (10%, 40%, 80% of capital) used when the model
    /// gave no financial data. Revenue is left empty.
    pub fn heuristic(capital: f64, start_year: i32) -> Self {
        let factors = [0.1, 0.4, 0.8];
        Self {
            years: (0..factors.len() as i32)
                .map(|i| (start_year + i).to_string())
                .collect(),
            revenue: Vec::new(),
            profit: factors.iter().map(|f| capital * f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn financials(years: &[&str], revenue: &[f64], profit: &[f64]) -> Financials {
        Financials {
            years: years.iter().map(|s| s.to_string()).collect(),
            revenue: revenue.to_vec(),
            profit: profit.to_vec(),
        }
    }

    #[test]
    fn test_swot_from_entries_fills_placeholder() {
        let swot = Swot::from_entries(["good location", "high rent"]);
        assert_eq!(swot.strength, "good location");
        assert_eq!(swot.weakness, "high rent");
        assert_eq!(swot.opportunity, SWOT_PLACEHOLDER);
        assert_eq!(swot.threat, SWOT_PLACEHOLDER);
    }

    #[test]
    fn test_rows_truncate_to_shortest() {
        let f = financials(&["2025", "2026", "2027"], &[100.0], &[10.0, 20.0]);
        assert!(!f.is_aligned());
        let rows = f.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].revenue, Some(100.0));
        assert_eq!(rows[1].revenue, None);
        assert_eq!(rows[1].profit, 20.0);
    }

    #[test]
    fn test_metrics() {
        let f = financials(
            &["2025", "2026", "2027"],
            &[100.0, 200.0, 300.0],
            &[10.0, 40.0, 60.0],
        );
        let m = f.metrics(50.0);
        assert_eq!(m.years, 3);
        assert_eq!(m.total_revenue, Some(600.0));
        assert_eq!(m.total_profit, 110.0);
        assert!((m.profit_margin.unwrap() - 110.0 / 600.0).abs() < 1e-9);
        assert!((m.return_on_capital.unwrap() - 2.2).abs() < 1e-9);
        assert_eq!(m.payback_year.as_deref(), Some("2026"));
    }

    #[test]
    fn test_metrics_zero_capital() {
        let f = financials(&["2025"], &[], &[5.0]);
        let m = f.metrics(0.0);
        assert_eq!(m.return_on_capital, None);
        assert_eq!(m.payback_year, None);
        assert_eq!(m.total_revenue, None);
        assert_eq!(m.profit_margin, None);
    }

    #[test]
    fn test_heuristic_projection() {
        let f = Financials::heuristic(50_000.0, 2025);
        assert_eq!(f.years, vec!["2025", "2026", "2027"]);
        assert_eq!(f.profit, vec![5_000.0, 20_000.0, 40_000.0]);
        assert!(f.revenue.is_empty());
        assert_eq!(f.rows().len(), 3);
    }

    #[test]
    fn test_study_deserializes_with_missing_fields() {
        let study: FeasibilityStudy = serde_json::from_str(r#"{"summary":"x"}"#).unwrap();
        assert_eq!(study.summary, "x");
        assert!(study.plan.is_empty());
        assert!(study.financials.is_empty());
        assert!(study.swot.is_empty());
    }
}
