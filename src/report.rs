use crate::error::AppError;
use crate::models::{BillingPeriod, FunctionCostRecord, MonthlyReport, ReportFormat};
use std::cmp::Ordering;
use tracing::warn;

pub const CSV_HEADER: [&str; 9] = [
    "FunctionName",
    "MemoryAllocatedMB",
    "EphemeralStorageMB",
    "Invocations",
    "DurationMilliseconds",
    "InvocationCostUSD",
    "DurationCostUSD",
    "StorageCostUSD",
    "TotalCostUSD",
];

/// Most expensive first; equal totals fall back to the function name so the
/// order never depends on how the records were collected.
pub fn rank_records(mut records: Vec<FunctionCostRecord>) -> Vec<FunctionCostRecord> {
    records.sort_by(compare_records);
    records
}

fn compare_records(a: &FunctionCostRecord, b: &FunctionCostRecord) -> Ordering {
    b.cost
        .total_cost
        .total_cmp(&a.cost.total_cost)
        .then_with(|| a.function_name.cmp(&b.function_name))
}

pub fn report_file_name(period: &BillingPeriod, format: ReportFormat) -> String {
    format!("lambda_costs_{}.{}", period.label(), format.extension())
}

pub fn render(report: &MonthlyReport, format: ReportFormat) -> Result<String, AppError> {
    match format {
        ReportFormat::Csv => Ok(render_csv(&report.records)),
        ReportFormat::Json => render_json(report),
    }
}

/// Fields are joined with bare commas. Names containing a comma are written
/// unchanged and will shift the columns of their row.
pub fn render_csv(records: &[FunctionCostRecord]) -> String {
    let rows: Vec<String> = records.iter().map(csv_row).collect();
    format!("{}\n{}", CSV_HEADER.join(","), rows.join("\n"))
}

fn csv_row(r: &FunctionCostRecord) -> String {
    if r.function_name.contains(',') {
        warn!(
            function = %r.function_name,
            "function name contains a comma; its CSV row will not parse cleanly"
        );
    }
    [
        r.function_name.clone(),
        r.config.memory_allocated_mb.to_string(),
        r.config.ephemeral_storage_mb.to_string(),
        r.usage.invocations.to_string(),
        r.usage.duration_millis.to_string(),
        format!("{:.6}", r.cost.invocation_cost),
        format!("{:.6}", r.cost.duration_cost),
        format!("{:.6}", r.cost.storage_cost),
        format!("{:.6}", r.cost.total_cost),
    ]
    .join(",")
}

pub fn render_json(report: &MonthlyReport) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Splits a rendered CSV document back into its data rows.
#[cfg(test)]
pub(crate) fn parse_csv(raw: &str) -> Result<Vec<Vec<String>>, String> {
    let mut lines = raw.lines();
    let header = lines.next().ok_or("empty report")?;
    if header != CSV_HEADER.join(",") {
        return Err(format!("unexpected header '{header}'"));
    }

    lines
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(idx, line)| {
            let fields: Vec<String> = line.split(',').map(str::to_string).collect();
            if fields.len() != CSV_HEADER.len() {
                return Err(format!(
                    "row {} has {} fields, expected {}",
                    idx + 1,
                    fields.len(),
                    CSV_HEADER.len()
                ));
            }
            Ok(fields)
        })
        .collect()
}
