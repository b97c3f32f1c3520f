use crate::rolling;
use crate::table::Table;
use crate::types::{ColumnGroupConfig, ColumnSpec, Mode, PARALLEL_THRESHOLD};
use anyhow::Result;
use rayon::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Derives unified columns from per-producer columns according to a
/// [`ColumnGroupConfig`].
///
/// Producers are processed in list order. With `keep_suffix = false` every
/// producer writes to the same unified column, so the last producer with at
/// least one matching source column wins. That overwrite order is part of
/// the contract, not an accident.
pub struct ColumnBuilder {
    config: ColumnGroupConfig,
    producers: Vec<String>,
    drop_others: bool,
    strict: bool,
}

impl ColumnBuilder {
    /// Create a builder, validating every column spec up front. Invalid
    /// window sizes or quantiles are fatal configuration errors.
    pub fn new(config: ColumnGroupConfig, producers: Vec<String>) -> Result<Self> {
        for (unified, spec) in &config {
            spec.validate()
                .map_err(|e| e.context(format!("invalid spec for column group '{}'", unified)))?;
        }
        Ok(Self {
            config,
            producers,
            drop_others: false,
            strict: false,
        })
    }

    /// Remove every `*_<producer>` column after all groups are processed.
    /// This is a blunt name-pattern cleanup: it also removes columns that
    /// were never part of any group, and freshly created `keep_suffix`
    /// outputs whose names match the pattern.
    pub fn drop_others(mut self, drop: bool) -> Self {
        self.drop_others = drop;
        self
    }

    /// Upgrade silent skips (unknown mode, producer without matching
    /// columns) to warnings. Output is identical either way.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Run the derivation pass. Consumes the table and returns it with the
    /// derived columns added and, if requested, the producer columns removed.
    pub fn build(&self, mut table: Table) -> Result<Table> {
        let mut created: BTreeSet<String> = BTreeSet::new();

        for (unified, spec) in &self.config {
            for producer in &self.producers {
                let cols: Vec<&[f64]> = spec
                    .columns
                    .iter()
                    .filter_map(|stem| table.column(&format!("{}_{}", stem, producer)))
                    .collect();

                if cols.is_empty() {
                    self.skip(format_args!(
                        "no source columns for group '{}' and producer '{}'",
                        unified, producer
                    ));
                    continue;
                }

                let Some(result) = derive_series(spec, &cols) else {
                    self.skip(format_args!(
                        "unrecognized mode for group '{}', skipping",
                        unified
                    ));
                    break;
                };

                let out_name = output_name(unified, producer, spec.keep_suffix);
                table.insert(out_name.clone(), result)?;
                created.insert(out_name);
            }
        }

        if self.drop_others {
            let suffixes: Vec<String> =
                self.producers.iter().map(|p| format!("_{}", p)).collect();
            let to_drop: Vec<String> = table
                .names()
                .filter(|name| suffixes.iter().any(|s| name.ends_with(s)))
                .map(str::to_string)
                .collect();
            for name in &to_drop {
                table.remove(name);
            }
            debug!("dropped {} producer columns", to_drop.len());
        }

        debug!("created {} derived columns", created.len());
        Ok(table)
    }

    fn skip(&self, message: std::fmt::Arguments<'_>) {
        if self.strict {
            warn!("{}", message);
        } else {
            debug!("{}", message);
        }
    }
}

/// One-shot form mirroring the builder contract:
/// `build_columns(table, config, producers, drop_others)`.
pub fn build_columns(
    table: Table,
    config: ColumnGroupConfig,
    producers: Vec<String>,
    drop_others: bool,
) -> Result<Table> {
    ColumnBuilder::new(config, producers)?
        .drop_others(drop_others)
        .build(table)
}

/// Unified or suffixed output name, with trailing underscores stripped so
/// stems that reduce to an empty base still produce a usable name
fn output_name(unified: &str, producer: &str, keep_suffix: bool) -> String {
    let name = if keep_suffix {
        format!("{}_{}", unified, producer)
    } else {
        unified.to_string()
    };
    name.trim_end_matches('_').to_string()
}

/// Compute the aggregated series for one (group, producer) pair, or None
/// for an unrecognized mode.
///
/// The plain rolling-statistic modes all finish with a row-wise maximum
/// across the matched columns, whatever statistic was requested. That is
/// faithful to the reference semantics and deliberately left as is.
fn derive_series(spec: &ColumnSpec, cols: &[&[f64]]) -> Option<Vec<f64>> {
    let w = spec.rolling;
    let stat_then_max = |stat: fn(&[f64], usize) -> Vec<f64>| {
        rolling::rowwise_max(&roll_each(cols, |c| stat(c, w)))
    };

    let result = match spec.mode {
        Mode::Max => stat_then_max(rolling::max),
        Mode::Min => stat_then_max(rolling::min),
        Mode::Mean => stat_then_max(rolling::mean),
        Mode::Median => stat_then_max(rolling::median),
        Mode::Sum => stat_then_max(rolling::sum),
        Mode::Std => stat_then_max(rolling::std),
        Mode::Var => stat_then_max(rolling::var),
        Mode::Skew => stat_then_max(rolling::skew),
        Mode::Kurt => stat_then_max(rolling::kurt),
        Mode::MeanMax => rolling::rowwise_mean_strict(&roll_each(cols, |c| rolling::max(c, w))),
        Mode::MeanMin => rolling::rowwise_mean_strict(&roll_each(cols, |c| rolling::min(c, w))),
        Mode::Quantile => {
            let q = spec.quantile_value;
            rolling::rowwise_max(&roll_each(cols, |c| rolling::quantile(c, w, q)))
        }
        Mode::Dir => {
            let summed =
                rolling::rowwise_sum(&roll_each(cols, |c| rolling::sum(&rolling::diff(c), w)));
            summed
                .iter()
                .map(|v| {
                    if *v > 0.0 {
                        1.0
                    } else if *v < 0.0 {
                        -1.0
                    } else {
                        0.0
                    }
                })
                .collect()
        }
        Mode::Above | Mode::Below => {
            let overall = rolling::rowwise_mean(&roll_each(cols, |c| rolling::mean(c, w)));
            overall
                .iter()
                .enumerate()
                .map(|(row, v)| {
                    let limit = spec.limit.at(row);
                    let hit = if spec.mode == Mode::Above {
                        *v > limit
                    } else {
                        *v < limit
                    };
                    if hit {
                        1.0
                    } else {
                        0.0
                    }
                })
                .collect()
        }
        Mode::Unknown => return None,
    };
    Some(result)
}

/// Apply a rolling statistic to every matched column, in parallel for large
/// tables
fn roll_each<F>(cols: &[&[f64]], stat: F) -> Vec<Vec<f64>>
where
    F: Fn(&[f64]) -> Vec<f64> + Sync,
{
    let rows = cols.first().map_or(0, |c| c.len());
    if cols.len() > 1 && rows >= PARALLEL_THRESHOLD {
        cols.par_iter().map(|c| stat(c)).collect()
    } else {
        cols.iter().map(|c| stat(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_name_suffixing() {
        assert_eq!(output_name("x", "ft_2", false), "x");
        assert_eq!(output_name("x", "ft_2", true), "x_ft_2");
    }

    #[test]
    fn test_output_name_strips_trailing_underscores() {
        assert_eq!(output_name("x_", "ft_2", false), "x");
        assert_eq!(output_name("x__", "p", false), "x");
        assert_eq!(output_name("", "ft_2", true), "_ft_2");
        assert_eq!(output_name("", "p", false), "");
    }
}
