//! Shared helper functions for CLI commands

use miette::{IntoDiagnostic, Result};

use crate::api::ApiClient;
use crate::cli::GlobalOpts;
use crate::core::catalog::Catalog;
use crate::core::config::Config;
use crate::core::workspace::Workspace;
use crate::entities::task::{RiskPhase, Task};

/// Build the API client from config plus any global override.
pub fn client(global: &GlobalOpts, config: &Config) -> ApiClient {
    let api_url = global.api_url.as_deref().unwrap_or(&config.api_url);
    ApiClient::new(api_url, config.timeout())
}

/// The work order number a command should target: flag, then config.
pub fn resolve_work_order(global: &GlobalOpts, config: &Config) -> Result<String> {
    global
        .work_order
        .clone()
        .or_else(|| config.work_order.clone())
        .ok_or_else(|| {
            miette::miette!("No work order given (use --work-order or set one in .rams.yaml)")
        })
}

/// Load the catalog, failing the whole command on any partial result.
pub fn load_catalog(client: &ApiClient) -> Result<Catalog> {
    Catalog::load(client).into_diagnostic()
}

pub fn load_workspace(client: &ApiClient, number: &str) -> Result<Workspace> {
    Workspace::load(client, number).into_diagnostic()
}

/// Text for a task's risk cell. Tasks without hazards are never shown as
/// evaluated, whatever ratings they carry.
pub fn risk_cell(task: &Task, phase: RiskPhase) -> String {
    if !task.is_evaluable() {
        return "select hazards first".to_string();
    }
    let (likelihood, severity) = task.ratings(phase);
    match task.band(phase) {
        Some(band) => format!(
            "{} (L{} x S{} = {})",
            band.label,
            likelihood,
            severity,
            task.score(phase)
        ),
        None => "unevaluated".to_string(),
    }
}

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}

/// Parse repeated `--param id=value` occurrences.
pub fn parse_param_flags(raw: &[String]) -> Result<Vec<(i64, String)>> {
    raw.iter()
        .map(|entry| {
            let (id, value) = entry
                .split_once('=')
                .ok_or_else(|| miette::miette!("Expected id=value, got '{}'", entry))?;
            let id: i64 = id
                .trim()
                .parse()
                .map_err(|_| miette::miette!("Invalid id in '{}'", entry))?;
            Ok((id, value.trim().to_string()))
        })
        .collect()
}

/// Parse a comma-separated id list flag.
pub fn parse_id_list(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|_| miette::miette!("Invalid id '{}'", part))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
    }

    #[test]
    fn test_parse_param_flags() {
        let parsed =
            parse_param_flags(&["3=40 kg".to_string(), "7=2.5".to_string()]).unwrap();
        assert_eq!(parsed, vec![(3, "40 kg".to_string()), (7, "2.5".to_string())]);
        assert!(parse_param_flags(&["nope".to_string()]).is_err());
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("1, 2,3").unwrap(), vec![1, 2, 3]);
        assert!(parse_id_list("1,x").is_err());
    }

    #[test]
    fn test_risk_cell_without_hazards() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": 1,
            "sequence": 1,
            "activity": "Survey",
            "personnel_at_risk": "",
            "likelihood": 4,
            "severity": 5,
        }))
        .unwrap();
        assert_eq!(risk_cell(&task, RiskPhase::Initial), "select hazards first");
    }
}
