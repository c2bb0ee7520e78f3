use crate::error::AppError;
use crate::models::{BillingPeriod, FunctionConfig, MetricKind};
use crate::pricing::FREE_EPHEMERAL_STORAGE_MB;
use crate::providers::FunctionSource;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudwatch::primitives::DateTime as CwDateTime;
use aws_sdk_cloudwatch::types::{Datapoint, Dimension, Statistic};
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::operation::get_function_configuration::{
    GetFunctionConfigurationError, GetFunctionConfigurationOutput,
};
use aws_sdk_lambda::operation::list_functions::ListFunctionsOutput;
use tracing::debug;

const LAMBDA_NAMESPACE: &str = "AWS/Lambda";
const FUNCTION_DIMENSION: &str = "FunctionName";

pub struct AwsSource {
    lambda: aws_sdk_lambda::Client,
    cloudwatch: aws_sdk_cloudwatch::Client,
}

impl AwsSource {
    /// Builds both clients from the default credential and region chain.
    pub async fn connect(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let shared = loader.load().await;
        Self {
            lambda: aws_sdk_lambda::Client::new(&shared),
            cloudwatch: aws_sdk_cloudwatch::Client::new(&shared),
        }
    }
}

/// One datapoint per month: the aggregation period spans the whole window.
fn metric_period_seconds(period: &BillingPeriod) -> Result<i32, AppError> {
    i32::try_from(period.window_seconds()).map_err(|_| {
        AppError::InvalidPeriod(format!("'{period}': window does not fit a metric period"))
    })
}

fn page_function_names(page: &ListFunctionsOutput) -> impl Iterator<Item = String> + '_ {
    page.functions()
        .iter()
        .filter_map(|f| f.function_name())
        .map(ToString::to_string)
}

fn next_page_marker(page: &ListFunctionsOutput) -> Option<String> {
    page.next_marker()
        .filter(|m| !m.is_empty())
        .map(ToString::to_string)
}

fn classify_config_error(
    function: &str,
    service_error: Option<&GetFunctionConfigurationError>,
    detail: String,
) -> AppError {
    if service_error.is_some_and(|e| e.is_resource_not_found_exception()) {
        AppError::NotFound(format!("function '{function}'"))
    } else {
        AppError::Lambda(detail)
    }
}

fn config_from_parts(
    function: &str,
    memory_mb: Option<i32>,
    ephemeral_storage_mb: Option<i32>,
) -> Result<FunctionConfig, AppError> {
    let memory = memory_mb
        .ok_or_else(|| AppError::NotFound(format!("memory size for function '{function}'")))?;
    Ok(FunctionConfig {
        memory_allocated_mb: i64::from(memory),
        ephemeral_storage_mb: ephemeral_storage_mb
            .map(i64::from)
            .unwrap_or(FREE_EPHEMERAL_STORAGE_MB),
    })
}

fn config_from_output(
    function: &str,
    resp: &GetFunctionConfigurationOutput,
) -> Result<FunctionConfig, AppError> {
    config_from_parts(
        function,
        resp.memory_size(),
        resp.ephemeral_storage().map(|s| s.size()),
    )
}

fn sum_datapoints(datapoints: &[Datapoint]) -> f64 {
    datapoints.iter().filter_map(|d| d.sum()).sum()
}

#[async_trait]
impl FunctionSource for AwsSource {
    fn name(&self) -> &'static str {
        "aws"
    }

    async fn list_functions(&self) -> Result<Vec<String>, AppError> {
        let mut names = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let page = self
                .lambda
                .list_functions()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| AppError::Lambda(DisplayErrorContext(e).to_string()))?;

            names.extend(page_function_names(&page));
            marker = next_page_marker(&page);
            if marker.is_none() {
                break;
            }
        }

        debug!(count = names.len(), "listed lambda functions");
        Ok(names)
    }

    async fn function_config(&self, function: &str) -> Result<FunctionConfig, AppError> {
        let resp = self
            .lambda
            .get_function_configuration()
            .function_name(function)
            .send()
            .await
            .map_err(|e| {
                let detail = DisplayErrorContext(&e).to_string();
                classify_config_error(function, e.as_service_error(), detail)
            })?;

        config_from_output(function, &resp)
    }

    async fn sum_metric(
        &self,
        function: &str,
        kind: MetricKind,
        period: &BillingPeriod,
    ) -> Result<f64, AppError> {
        let dimension = Dimension::builder()
            .name(FUNCTION_DIMENSION)
            .value(function)
            .build();

        let resp = self
            .cloudwatch
            .get_metric_statistics()
            .namespace(LAMBDA_NAMESPACE)
            .metric_name(kind.metric_name())
            .dimensions(dimension)
            .start_time(CwDateTime::from_secs(period.start().timestamp()))
            .end_time(CwDateTime::from_secs(period.end().timestamp()))
            .period(metric_period_seconds(period)?)
            .statistics(Statistic::Sum)
            .send()
            .await
            .map_err(|e| {
                AppError::CloudWatch(
                    aws_sdk_cloudwatch::error::DisplayErrorContext(e).to_string(),
                )
            })?;

        Ok(sum_datapoints(resp.datapoints()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_lambda::types::error::{ResourceNotFoundException, ServiceException};
    use aws_sdk_lambda::types::FunctionConfiguration;

    fn page(names: &[&str], marker: Option<&str>) -> ListFunctionsOutput {
        let functions = names
            .iter()
            .map(|n| FunctionConfiguration::builder().function_name(*n).build())
            .collect();
        ListFunctionsOutput::builder()
            .set_functions(Some(functions))
            .set_next_marker(marker.map(ToString::to_string))
            .build()
    }

    fn period(raw: &str) -> BillingPeriod {
        raw.parse().expect("valid period")
    }

    #[test]
    fn page_names_skip_entries_without_a_name() {
        let listing = ListFunctionsOutput::builder()
            .functions(FunctionConfiguration::builder().function_name("alpha").build())
            .functions(FunctionConfiguration::builder().build())
            .functions(FunctionConfiguration::builder().function_name("beta").build())
            .build();
        let names: Vec<String> = page_function_names(&listing).collect();
        assert_eq!(names, vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[test]
    fn pagination_continues_only_on_non_empty_marker() {
        assert_eq!(
            next_page_marker(&page(&["a"], Some("page-2"))),
            Some("page-2".to_string())
        );
        assert_eq!(next_page_marker(&page(&["a"], Some(""))), None);
        assert_eq!(next_page_marker(&page(&["a"], None)), None);
    }

    #[test]
    fn missing_ephemeral_storage_defaults_to_free_tier() {
        let resp = GetFunctionConfigurationOutput::builder().memory_size(256).build();
        let cfg = config_from_output("fn", &resp).expect("config");
        assert_eq!(cfg.memory_allocated_mb, 256);
        assert_eq!(cfg.ephemeral_storage_mb, 512);

        let cfg = config_from_parts("fn", Some(1024), Some(4096)).expect("config");
        assert_eq!(cfg.ephemeral_storage_mb, 4096);
    }

    #[test]
    fn missing_memory_size_is_not_found() {
        let resp = GetFunctionConfigurationOutput::builder().build();
        let err = config_from_output("fn", &resp).expect_err("expected not found");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn resource_not_found_maps_to_not_found() {
        let missing = GetFunctionConfigurationError::ResourceNotFoundException(
            ResourceNotFoundException::builder().message("gone").build(),
        );
        let err = classify_config_error("fn", Some(&missing), "detail".into());
        assert!(matches!(err, AppError::NotFound(ref m) if m.contains("'fn'")));

        let outage = GetFunctionConfigurationError::ServiceException(
            ServiceException::builder().message("boom").build(),
        );
        let err = classify_config_error("fn", Some(&outage), "service down".into());
        assert!(matches!(err, AppError::Lambda(ref m) if m == "service down"));

        let err = classify_config_error("fn", None, "timeout".into());
        assert!(matches!(err, AppError::Lambda(_)));
    }

    #[test]
    fn datapoints_are_summed_and_default_to_zero() {
        assert_eq!(sum_datapoints(&[]), 0.0);

        let points = vec![
            Datapoint::builder().sum(1500.0).build(),
            Datapoint::builder().build(),
            Datapoint::builder().sum(250.5).build(),
        ];
        assert_eq!(sum_datapoints(&points), 1750.5);
    }

    #[test]
    fn metric_period_spans_the_whole_month() {
        assert_eq!(metric_period_seconds(&period("2.2023")).expect("feb"), 28 * 86_400);
        assert_eq!(metric_period_seconds(&period("2.2024")).expect("leap"), 29 * 86_400);
        assert_eq!(metric_period_seconds(&period("11.2024")).expect("nov"), 30 * 86_400);
        assert_eq!(metric_period_seconds(&period("1.2024")).expect("jan"), 31 * 86_400);
    }
}
