use anyhow::{bail, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Row count above which per-column rolling statistics run on the Rayon pool
pub const PARALLEL_THRESHOLD: usize = 1000;

/// Aggregation mode applied per column group.
///
/// For the plain rolling-statistic variants (Max through Kurt) the per-column
/// rolling results are combined with a row-wise maximum across the matched
/// columns, regardless of which statistic was requested. This mirrors the
/// reference behavior exactly and is intentional; do not "fix" it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Max,
    Min,
    Mean,
    Median,
    Sum,
    Std,
    Var,
    Skew,
    Kurt,
    MeanMax,
    MeanMin,
    Quantile,
    Dir,
    Above,
    Below,
    /// Any unrecognized mode string; groups carrying it are skipped without error
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mode::Max => "max",
            Mode::Min => "min",
            Mode::Mean => "mean",
            Mode::Median => "median",
            Mode::Sum => "sum",
            Mode::Std => "std",
            Mode::Var => "var",
            Mode::Skew => "skew",
            Mode::Kurt => "kurt",
            Mode::MeanMax => "mean_max",
            Mode::MeanMin => "mean_min",
            Mode::Quantile => "quantile",
            Mode::Dir => "dir",
            Mode::Above => "above",
            Mode::Below => "below",
            Mode::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Threshold for `above`/`below`: either one scalar for every row or a
/// per-row sequence compared by position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Limit {
    Scalar(f64),
    Series(Vec<f64>),
}

impl Default for Limit {
    fn default() -> Self {
        Limit::Scalar(0.0)
    }
}

impl Limit {
    /// Limit value for a given row; positions beyond a series limit are NaN
    pub fn at(&self, row: usize) -> f64 {
        match self {
            Limit::Scalar(v) => *v,
            Limit::Series(values) => values.get(row).copied().unwrap_or(f64::NAN),
        }
    }
}

/// Specification of one unified output column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Base column-name stems, looked up per producer as `<stem>_<producer>`
    pub columns: Vec<String>,
    pub mode: Mode,
    /// Emit one suffixed column per producer instead of a single unified one
    #[serde(default)]
    pub keep_suffix: bool,
    /// Rolling window size in rows
    #[serde(default = "default_rolling")]
    pub rolling: usize,
    /// Quantile in [0, 1], used only by `mode = quantile`
    #[serde(default = "default_quantile")]
    pub quantile_value: f64,
    /// Comparison threshold, used only by `mode = above | below`
    #[serde(default)]
    pub limit: Limit,
}

fn default_rolling() -> usize {
    1
}

fn default_quantile() -> f64 {
    0.5
}

impl ColumnSpec {
    pub fn new(columns: Vec<String>, mode: Mode) -> Self {
        Self {
            columns,
            mode,
            keep_suffix: false,
            rolling: default_rolling(),
            quantile_value: default_quantile(),
            limit: Limit::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rolling < 1 {
            bail!("rolling window must be at least 1, got {}", self.rolling);
        }
        if !(0.0..=1.0).contains(&self.quantile_value) {
            bail!(
                "quantile_value must be within [0, 1], got {}",
                self.quantile_value
            );
        }
        Ok(())
    }
}

/// Mapping from unified output column name to its spec; insertion order is
/// processing order
pub type ColumnGroupConfig = IndexMap<String, ColumnSpec>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_defaults_from_json() {
        let spec: ColumnSpec =
            serde_json::from_str(r#"{"columns": ["buy_signal"], "mode": "max"}"#).unwrap();
        assert_eq!(spec.columns, vec!["buy_signal".to_string()]);
        assert_eq!(spec.mode, Mode::Max);
        assert!(!spec.keep_suffix);
        assert_eq!(spec.rolling, 1);
        assert_eq!(spec.quantile_value, 0.5);
        assert_eq!(spec.limit, Limit::Scalar(0.0));
    }

    #[test]
    fn test_unknown_mode_deserializes() {
        let spec: ColumnSpec =
            serde_json::from_str(r#"{"columns": ["a"], "mode": "banana"}"#).unwrap();
        assert_eq!(spec.mode, Mode::Unknown);
    }

    #[test]
    fn test_missing_required_field_is_fatal() {
        let result = serde_json::from_str::<ColumnSpec>(r#"{"mode": "max"}"#);
        assert!(result.is_err());
        let result = serde_json::from_str::<ColumnSpec>(r#"{"columns": ["a"]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_limit_series_from_json() {
        let spec: ColumnSpec = serde_json::from_str(
            r#"{"columns": ["a"], "mode": "above", "limit": [1.0, 2.0, 3.0]}"#,
        )
        .unwrap();
        assert_eq!(spec.limit, Limit::Series(vec![1.0, 2.0, 3.0]));
        assert_eq!(spec.limit.at(1), 2.0);
        assert!(spec.limit.at(5).is_nan());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut spec = ColumnSpec::new(vec!["a".to_string()], Mode::Max);
        spec.rolling = 0;
        assert!(spec.validate().is_err());

        let mut spec = ColumnSpec::new(vec!["a".to_string()], Mode::Quantile);
        spec.quantile_value = 1.5;
        assert!(spec.validate().is_err());

        // Empty stems never match anything; that is a silent no-op, not an error
        let spec = ColumnSpec::new(vec![], Mode::Max);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_mode_snake_case_names() {
        assert_eq!(
            serde_json::from_str::<Mode>(r#""mean_max""#).unwrap(),
            Mode::MeanMax
        );
        assert_eq!(serde_json::to_string(&Mode::Kurt).unwrap(), r#""kurt""#);
        assert_eq!(Mode::MeanMin.to_string(), "mean_min");
    }
}
