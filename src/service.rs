use crate::calculator::compute_cost;
use crate::error::AppError;
use crate::models::{BillingPeriod, FunctionCostRecord, MonthlyReport, ReportFormat};
use crate::pricing::Pricing;
use crate::providers::FunctionSource;
use crate::report::{rank_records, render, report_file_name};
use crate::storage::ReportSink;
use tracing::{error, info, warn};

#[derive(Debug)]
pub struct FunctionFailure {
    pub function_name: String,
    pub error: AppError,
}

#[derive(Debug)]
pub struct PeriodSummary {
    pub location: String,
    pub records: usize,
    pub failures: Vec<FunctionFailure>,
}

/// Result of one requested month, kept in request order.
#[derive(Debug)]
pub struct PeriodOutcome {
    pub label: String,
    pub result: Result<PeriodSummary, AppError>,
}

pub struct ReportService {
    source: Box<dyn FunctionSource>,
    sink: Box<dyn ReportSink>,
    pricing: Pricing,
    format: ReportFormat,
}

impl ReportService {
    pub fn new(
        source: Box<dyn FunctionSource>,
        sink: Box<dyn ReportSink>,
        pricing: Pricing,
        format: ReportFormat,
    ) -> Self {
        Self {
            source,
            sink,
            pricing,
            format,
        }
    }

    /// Processes the months one after another. A month that fails is logged
    /// and reported in its outcome; the remaining months still run.
    pub async fn run(&self, months: &[String]) -> Vec<PeriodOutcome> {
        let mut outcomes = Vec::with_capacity(months.len());

        for raw in months {
            let label = raw.trim().to_string();
            let result = match label.parse::<BillingPeriod>() {
                Ok(period) => self.process_period(&period).await,
                Err(e) => Err(e),
            };

            if let Err(e) = &result {
                error!(period = %label, error = %e, "failed to produce monthly report");
            }
            outcomes.push(PeriodOutcome { label, result });
        }

        outcomes
    }

    pub async fn process_period(&self, period: &BillingPeriod) -> Result<PeriodSummary, AppError> {
        let functions = self.source.list_functions().await?;
        info!(
            period = %period,
            source = self.source.name(),
            count = functions.len(),
            "found lambda functions"
        );

        let mut records = Vec::with_capacity(functions.len());
        let mut failures = Vec::new();

        for function in functions {
            info!(period = %period, function = %function, "processing function");
            match self.build_record(&function, period).await {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(
                        period = %period,
                        function = %function,
                        error = %e,
                        "skipping function"
                    );
                    failures.push(FunctionFailure {
                        function_name: function,
                        error: e,
                    });
                }
            }
        }

        let report = MonthlyReport {
            period: period.clone(),
            records: rank_records(records),
        };
        let content = render(&report, self.format)?;
        let location = self
            .sink
            .write_report(&report_file_name(period, self.format), &content)
            .await?;
        info!(period = %period, location = %location, "metrics and costs saved");

        Ok(PeriodSummary {
            location,
            records: report.records.len(),
            failures,
        })
    }

    pub async fn build_record(
        &self,
        function: &str,
        period: &BillingPeriod,
    ) -> Result<FunctionCostRecord, AppError> {
        let config = self.source.function_config(function).await?;
        let usage = self.source.usage(function, period).await?;
        let cost = compute_cost(&config, &usage, &self.pricing)?;
        Ok(FunctionCostRecord {
            function_name: function.to_string(),
            config,
            usage,
            cost,
        })
    }
}
