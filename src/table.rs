use anyhow::{bail, Result};
use indexmap::IndexMap;

/// An ordered collection of equally long, named f64 columns.
///
/// Rows are aligned by position and represent consecutive time steps.
/// Undefined values (e.g. rolling-window warm-up rows) are stored as NaN.
/// Column order is insertion order; overwriting an existing column keeps
/// its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: IndexMap<String, Vec<f64>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from (name, values) pairs; all columns must share one length
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (name, values) in columns {
            table.insert(name.into(), values)?;
        }
        Ok(table)
    }

    /// Insert or overwrite a column. The length must match the existing row
    /// count; an overwritten column keeps its position in the column order.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if !self.columns.is_empty() && values.len() != self.num_rows() {
            bail!(
                "column '{}' has {} rows, table has {}",
                name,
                values.len(),
                self.num_rows()
            );
        }
        self.columns.insert(name, values);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Remove a column, preserving the order of the remaining ones
    pub fn remove(&mut self, name: &str) -> Option<Vec<f64>> {
        self.columns.shift_remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |(_, v)| v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_preserves_order() {
        let mut table = Table::new();
        table.insert("b", vec![1.0]).unwrap();
        table.insert("a", vec![2.0]).unwrap();
        table.insert("c", vec![3.0]).unwrap();
        let names: Vec<&str> = table.names().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut table = Table::new();
        table.insert("a", vec![1.0]).unwrap();
        table.insert("b", vec![2.0]).unwrap();
        table.insert("a", vec![9.0]).unwrap();
        let names: Vec<&str> = table.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(table.column("a").unwrap(), &[9.0]);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut table = Table::new();
        table.insert("a", vec![1.0, 2.0]).unwrap();
        assert!(table.insert("b", vec![1.0]).is_err());
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut table =
            Table::from_columns([("a", vec![1.0]), ("b", vec![2.0]), ("c", vec![3.0])]).unwrap();
        table.remove("b");
        let names: Vec<&str> = table.names().collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_empty_table() {
        let table = Table::new();
        assert!(table.is_empty());
        assert_eq!(table.num_rows(), 0);
        assert_eq!(table.num_columns(), 0);
    }
}
