use crate::error::AppError;
use crate::models::{BillingPeriod, FunctionConfig, MetricKind};
use crate::pricing::FREE_EPHEMERAL_STORAGE_MB;
use crate::providers::FunctionSource;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Offline snapshot of an account: functions, their configuration and their
/// usage sums keyed by `MM.YYYY` period label.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub functions: Vec<InventoryFunction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryFunction {
    pub name: String,
    pub memory_mb: Option<i64>,
    pub ephemeral_storage_mb: Option<i64>,
    #[serde(default)]
    pub usage: HashMap<String, InventoryUsage>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryUsage {
    pub invocations: f64,
    pub duration_ms: f64,
}

pub struct InventorySource {
    inventory: Inventory,
}

impl InventorySource {
    pub fn new(inventory: Inventory) -> Self {
        Self { inventory }
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path)?;
        let inventory: Inventory = serde_json::from_str(&raw)?;
        Ok(Self::new(inventory))
    }

    fn find(&self, function: &str) -> Result<&InventoryFunction, AppError> {
        self.inventory
            .functions
            .iter()
            .find(|f| f.name == function)
            .ok_or_else(|| AppError::NotFound(format!("function '{function}'")))
    }

    fn usage_for(entry: &InventoryFunction, period: &BillingPeriod) -> InventoryUsage {
        if let Some(usage) = entry.usage.get(period.label()) {
            return *usage;
        }
        // "09.2024" and "9.2024" name the same month.
        entry
            .usage
            .iter()
            .find(|(label, _)| {
                label.parse::<BillingPeriod>().is_ok_and(|p| {
                    p.year() == period.year() && p.month() == period.month()
                })
            })
            .map(|(_, usage)| *usage)
            .unwrap_or_default()
    }
}

#[async_trait]
impl FunctionSource for InventorySource {
    fn name(&self) -> &'static str {
        "inventory"
    }

    async fn list_functions(&self) -> Result<Vec<String>, AppError> {
        Ok(self
            .inventory
            .functions
            .iter()
            .map(|f| f.name.clone())
            .collect())
    }

    async fn function_config(&self, function: &str) -> Result<FunctionConfig, AppError> {
        let entry = self.find(function)?;
        let memory = entry.memory_mb.ok_or_else(|| {
            AppError::NotFound(format!("memory size for function '{function}'"))
        })?;
        Ok(FunctionConfig {
            memory_allocated_mb: memory,
            ephemeral_storage_mb: entry
                .ephemeral_storage_mb
                .unwrap_or(FREE_EPHEMERAL_STORAGE_MB),
        })
    }

    async fn sum_metric(
        &self,
        function: &str,
        kind: MetricKind,
        period: &BillingPeriod,
    ) -> Result<f64, AppError> {
        let usage = Self::usage_for(self.find(function)?, period);
        Ok(match kind {
            MetricKind::Invocations => usage.invocations,
            MetricKind::Duration => usage.duration_ms,
        })
    }
}
