use crate::error::AppError;
use crate::models::ReportFormat;
use crate::pricing::Pricing;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SERVICE_NAME: &str = "lambda-cost-report";

fn app_home_dir() -> Result<PathBuf, AppError> {
    if let Ok(custom) = std::env::var("LAMBDA_COST_HOME") {
        return Ok(PathBuf::from(custom));
    }

    if let Some(dirs) = ProjectDirs::from("com", "lambda-cost", SERVICE_NAME) {
        let candidate = dirs.data_local_dir().to_path_buf();
        if fs::create_dir_all(&candidate).is_ok() {
            return Ok(candidate);
        }
    }

    let cwd = std::env::current_dir()?;
    Ok(cwd.join(".lambda-cost"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output_dir: PathBuf,
    pub region: Option<String>,
    pub default_months: Vec<String>,
    pub format: ReportFormat,
    pub pricing: Pricing,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("costs"),
            region: None,
            default_months: vec![],
            format: ReportFormat::Csv,
            pricing: Pricing::default(),
        }
    }
}

pub fn config_dir() -> Result<PathBuf, AppError> {
    Ok(app_home_dir()?.join("config"))
}

pub fn config_path() -> Result<PathBuf, AppError> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn ensure_dirs() -> Result<(), AppError> {
    fs::create_dir_all(config_dir()?)?;
    Ok(())
}

fn normalize_config(config: &mut AppConfig) -> bool {
    let mut changed = false;

    let mut months = Vec::new();
    for month in &config.default_months {
        let trimmed = month.trim().to_string();
        if trimmed != *month {
            changed = true;
        }
        if trimmed.is_empty() || months.contains(&trimmed) {
            changed = true;
            continue;
        }
        months.push(trimmed);
    }
    config.default_months = months;

    if let Some(region) = config.region.take() {
        let trimmed = region.trim().to_string();
        if trimmed != region {
            changed = true;
        }
        config.region = (!trimmed.is_empty()).then_some(trimmed);
        if config.region.is_none() {
            changed = true;
        }
    }

    changed
}

pub fn load_config() -> Result<AppConfig, AppError> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    load_config_from(&path)
}

fn load_config_from(path: &Path) -> Result<AppConfig, AppError> {
    let raw_str = fs::read_to_string(path)?;
    let mut parsed: AppConfig = toml::from_str(&raw_str)?;

    if !parsed.pricing.is_valid() {
        return Err(AppError::Config(
            "Pricing rates must be non-negative numbers.".into(),
        ));
    }

    // Persist the cleaned-up form so later edits start from it.
    if normalize_config(&mut parsed) {
        fs::write(path, toml::to_string_pretty(&parsed)?)?;
    }

    Ok(parsed)
}

pub fn save_config(config: &AppConfig) -> Result<(), AppError> {
    ensure_dirs()?;
    let path = config_path()?;
    let raw = toml::to_string_pretty(config)?;
    fs::write(path, raw)?;
    Ok(())
}

pub fn ensure_initialized() -> Result<(), AppError> {
    ensure_dirs()?;
    let cfg_path = config_path()?;
    if !Path::new(&cfg_path).exists() {
        save_config(&AppConfig::default())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn normalize_config_trims_and_dedupes_months() {
        let mut cfg = AppConfig {
            region: Some(" eu-west-1 ".into()),
            default_months: vec![
                " 11.2024".into(),
                "11.2024".into(),
                "".into(),
                "10.2024".into(),
            ],
            ..AppConfig::default()
        };

        assert!(normalize_config(&mut cfg));
        assert_eq!(
            cfg.default_months,
            vec!["11.2024".to_string(), "10.2024".to_string()]
        );
        assert_eq!(cfg.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn normalize_config_leaves_clean_config_alone() {
        let mut cfg = AppConfig {
            region: Some("us-east-1".into()),
            default_months: vec!["1.2025".into()],
            ..AppConfig::default()
        };
        assert!(!normalize_config(&mut cfg));
    }

    #[test]
    fn blank_region_is_dropped() {
        let mut cfg = AppConfig {
            region: Some("   ".into()),
            ..AppConfig::default()
        };
        assert!(normalize_config(&mut cfg));
        assert_eq!(cfg.region, None);
    }

    #[test]
    fn load_fills_defaults_and_rewrites_normalized_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            "default_months = [\" 9.2024 \"]\nformat = \"json\"\n\n[pricing]\nper_gb_second = 0.00002\n",
        )
        .expect("seed config");

        let cfg = load_config_from(&path).expect("load config");
        assert_eq!(cfg.default_months, vec!["9.2024".to_string()]);
        assert_eq!(cfg.format, ReportFormat::Json);
        assert_eq!(cfg.output_dir, PathBuf::from("costs"));
        assert_eq!(cfg.pricing.per_gb_second, 0.00002);
        assert_eq!(cfg.pricing.per_million_invocations, 0.20);

        let reloaded = load_config_from(&path).expect("reload config");
        assert_eq!(reloaded, cfg);
        let raw = fs::read_to_string(&path).expect("read config");
        assert!(raw.contains("\"9.2024\""));
    }

    #[test]
    fn load_rejects_negative_rates() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[pricing]\nper_gb_second_storage = -1.0\n").expect("seed config");

        let err = load_config_from(&path).expect_err("expected config error");
        assert!(err.to_string().contains("non-negative"));
    }
}
