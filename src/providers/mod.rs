use crate::error::AppError;
use crate::models::{BillingPeriod, FunctionConfig, MetricKind, UsageMetrics};
use async_trait::async_trait;

pub mod aws;
pub mod inventory;

/// Where function rosters, configuration snapshots and usage sums come from.
#[async_trait]
pub trait FunctionSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Every function in the account, fully paginated.
    async fn list_functions(&self) -> Result<Vec<String>, AppError>;

    async fn function_config(&self, function: &str) -> Result<FunctionConfig, AppError>;

    /// Sum statistic of `kind` over the period; 0 when there are no datapoints.
    async fn sum_metric(
        &self,
        function: &str,
        kind: MetricKind,
        period: &BillingPeriod,
    ) -> Result<f64, AppError>;

    async fn usage(
        &self,
        function: &str,
        period: &BillingPeriod,
    ) -> Result<UsageMetrics, AppError> {
        let invocations = self
            .sum_metric(function, MetricKind::Invocations, period)
            .await?;
        let duration_millis = self.sum_metric(function, MetricKind::Duration, period).await?;
        Ok(UsageMetrics {
            invocations,
            duration_millis,
        })
    }
}
