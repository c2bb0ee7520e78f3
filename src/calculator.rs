use crate::error::AppError;
use crate::models::{CostBreakdown, FunctionConfig, UsageMetrics};
use crate::pricing::{Pricing, FREE_EPHEMERAL_STORAGE_MB};
use crate::units::{mb_to_gb, millis_to_seconds};

/// Cost of one function over one billing period.
///
/// Nothing is rounded here; `total_cost` is the plain sum of the three
/// components. Inputs a platform would never report (non-positive memory,
/// negative or non-finite usage) are rejected instead of being priced.
pub fn compute_cost(
    config: &FunctionConfig,
    usage: &UsageMetrics,
    pricing: &Pricing,
) -> Result<CostBreakdown, AppError> {
    if config.memory_allocated_mb <= 0 {
        return Err(AppError::ContractViolation(format!(
            "memory allocation must be positive, got {} MB",
            config.memory_allocated_mb
        )));
    }
    check_usage("invocation count", usage.invocations)?;
    check_usage("duration sum", usage.duration_millis)?;

    let memory_gb = mb_to_gb(config.memory_allocated_mb as f64);
    let duration_seconds = millis_to_seconds(usage.duration_millis);

    let gb_seconds = duration_seconds * memory_gb;
    let duration_cost = gb_seconds * pricing.per_gb_second;
    let invocation_cost = (usage.invocations / 1_000_000.0) * pricing.per_million_invocations;

    let storage_cost = if config.ephemeral_storage_mb > FREE_EPHEMERAL_STORAGE_MB {
        let extra_storage_gb = mb_to_gb(config.ephemeral_storage_mb as f64) - 0.5;
        extra_storage_gb * duration_seconds * pricing.per_gb_second_storage
    } else {
        0.0
    };

    Ok(CostBreakdown {
        invocation_cost,
        duration_cost,
        storage_cost,
        total_cost: invocation_cost + duration_cost + storage_cost,
    })
}

fn check_usage(what: &str, value: f64) -> Result<(), AppError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AppError::ContractViolation(format!(
            "{what} must be a non-negative number, got {value}"
        )))
    }
}
