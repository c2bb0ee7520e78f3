use crate::error::AppError;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One calendar month, identified by its `MM.YYYY` label.
///
/// The label is kept exactly as the caller wrote it so that output file names
/// match the requested months (`9.2024` stays `9.2024`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillingPeriod {
    year: i32,
    month: u32,
    label: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl BillingPeriod {
    fn with_label(year: i32, month: u32, label: String) -> Result<Self, AppError> {
        if !(1..=12).contains(&month) {
            return Err(AppError::InvalidPeriod(format!(
                "'{label}': month must be between 1 and 12"
            )));
        }

        let start = Utc
            .with_ymd_and_hms(year, month, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| AppError::InvalidPeriod(format!("'{label}': year out of range")))?;
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let next = Utc
            .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| AppError::InvalidPeriod(format!("'{label}': year out of range")))?;

        Ok(Self {
            year,
            month,
            label,
            start,
            end: next - Duration::seconds(1),
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// First instant of the month, 00:00:00 UTC on day one.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Last whole second of the month, 23:59:59 UTC on the final day.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn window_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds() + 1
    }
}

impl FromStr for BillingPeriod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let Some((month_raw, year_raw)) = label.split_once('.') else {
            return Err(AppError::InvalidPeriod(format!(
                "'{label}' is not in MM.YYYY form"
            )));
        };
        let month: u32 = month_raw.parse().map_err(|_| {
            AppError::InvalidPeriod(format!("'{label}': month '{month_raw}' is not a number"))
        })?;
        let year: i32 = year_raw.parse().map_err(|_| {
            AppError::InvalidPeriod(format!("'{label}': year '{year_raw}' is not a number"))
        })?;
        Self::with_label(year, month, label.to_string())
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionConfig {
    pub memory_allocated_mb: i64,
    pub ephemeral_storage_mb: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UsageMetrics {
    pub invocations: f64,
    pub duration_millis: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub invocation_cost: f64,
    pub duration_cost: f64,
    pub storage_cost: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCostRecord {
    pub function_name: String,
    pub config: FunctionConfig,
    pub usage: UsageMetrics,
    pub cost: CostBreakdown,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReport {
    pub period: BillingPeriod,
    pub records: Vec<FunctionCostRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricKind {
    Invocations,
    Duration,
}

impl MetricKind {
    pub fn metric_name(self) -> &'static str {
        match self {
            MetricKind::Invocations => "Invocations",
            MetricKind::Duration => "Duration",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("csv") {
            Ok(ReportFormat::Csv)
        } else if s.eq_ignore_ascii_case("json") {
            Ok(ReportFormat::Json)
        } else {
            Err(AppError::Config(
                "Unsupported report format. Use csv or json".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_label_as_given() {
        let period: BillingPeriod = "9.2024".parse().expect("valid period");
        assert_eq!(period.label(), "9.2024");
        assert_eq!(period.month(), 9);
        assert_eq!(period.year(), 2024);

        let padded: BillingPeriod = " 09.2024 ".parse().expect("valid period");
        assert_eq!(padded.label(), "09.2024");
        assert_eq!(padded.month(), 9);
    }

    #[test]
    fn window_covers_whole_month_in_utc() {
        let period: BillingPeriod = "11.2024".parse().expect("valid period");
        assert_eq!(period.start().to_rfc3339(), "2024-11-01T00:00:00+00:00");
        assert_eq!(period.end().to_rfc3339(), "2024-11-30T23:59:59+00:00");
        assert_eq!(period.window_seconds(), 30 * 86_400);
    }

    #[test]
    fn february_of_leap_year_ends_on_the_29th() {
        let period: BillingPeriod = "2.2024".parse().expect("valid period");
        assert_eq!(period.label(), "2.2024");
        assert_eq!(period.end().to_rfc3339(), "2024-02-29T23:59:59+00:00");
    }

    #[test]
    fn december_rolls_into_next_year() {
        let period: BillingPeriod = "12.2023".parse().expect("valid period");
        assert_eq!(period.end().to_rfc3339(), "2023-12-31T23:59:59+00:00");
        assert!(period.start() <= period.end());
    }

    #[test]
    fn rejects_malformed_labels() {
        for raw in ["13.2024", "0.2024", "x.2024", "11.abcd", "2024", ""] {
            let err = raw
                .parse::<BillingPeriod>()
                .expect_err("expected invalid period");
            assert!(matches!(err, AppError::InvalidPeriod(_)), "{raw}: {err}");
        }
    }

    #[test]
    fn report_format_parses_case_insensitively() {
        assert_eq!("CSV".parse::<ReportFormat>().expect("csv"), ReportFormat::Csv);
        assert_eq!("json".parse::<ReportFormat>().expect("json"), ReportFormat::Json);
        let err = "xml".parse::<ReportFormat>().expect_err("unsupported");
        assert!(err.to_string().contains("Unsupported report format"));
    }
}
