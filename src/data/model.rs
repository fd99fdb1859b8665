use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a result table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring SQLite's storage classes.
/// Used in `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Blob(Vec<u8>),
    /// Canonical `YYYY-MM-DD` date, produced by `release_date` normalization.
    Date(String),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                String(_) => 3,
                Date(_) => 4,
                Blob(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) | (Date(a), Date(b)) => a.cmp(b),
            (Blob(a), Blob(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Blob(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Blob(b) => write!(f, "<{} bytes>", b.len()),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for charting and statistics.
    ///
    /// Numeric text is accepted as well: some columns of the streaming
    /// dataset were stored as TEXT.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Borrow the textual content of `String` and `Date` cells.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) | CellValue::Date(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Short type label used by the `info()`-style column summary.
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::String(_) => "text",
            CellValue::Integer(_) => "integer",
            CellValue::Float(_) => "float",
            CellValue::Blob(_) => "blob",
            CellValue::Date(_) => "date",
            CellValue::Null => "null",
        }
    }
}

// ---------------------------------------------------------------------------
// ResultTable – named columns, ordered rows
// ---------------------------------------------------------------------------

/// Tabular result of a query: named columns and ordered rows.
///
/// Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ResultTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate the cells of one column, top to bottom.
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a CellValue> + 'a> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Cell at (`row`, `column`).
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Sorted set of distinct values of a column.
    pub fn unique_values(&self, column: &str) -> BTreeSet<CellValue> {
        self.column(column)
            .map(|cells| cells.cloned().collect())
            .unwrap_or_default()
    }

    /// Distinct values of a column in order of first appearance.
    pub fn unique_in_order(&self, column: &str) -> Vec<CellValue> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        if let Some(cells) = self.column(column) {
            for cell in cells {
                if seen.insert(cell.clone()) {
                    out.push(cell.clone());
                }
            }
        }
        out
    }

    /// New table restricted to the given row indices (in the given order).
    pub fn select_rows(&self, indices: &[usize]) -> ResultTable {
        ResultTable {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    /// New table with only the named columns. Unknown names are skipped.
    pub fn project(&self, columns: &[&str]) -> ResultTable {
        let picked: Vec<(usize, String)> = columns
            .iter()
            .filter_map(|name| self.column_index(name).map(|i| (i, name.to_string())))
            .collect();
        ResultTable {
            columns: picked.iter().map(|(_, n)| n.clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| picked.iter().map(|(i, _)| row[*i].clone()).collect())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultTable {
        ResultTable::new(
            vec!["artist".into(), "streams".into()],
            vec![
                vec![CellValue::String("B".into()), CellValue::Integer(10)],
                vec![CellValue::String("A".into()), CellValue::Integer(30)],
                vec![CellValue::String("B".into()), CellValue::Null],
            ],
        )
    }

    #[test]
    fn unique_in_order_keeps_first_appearance() {
        let t = sample();
        assert_eq!(
            t.unique_in_order("artist"),
            vec![CellValue::String("B".into()), CellValue::String("A".into())]
        );
        assert_eq!(t.unique_values("artist").len(), 2);
        assert!(t.unique_values("missing").is_empty());
    }

    #[test]
    fn project_and_select_rows() {
        let t = sample();
        let p = t.project(&["streams", "nope"]);
        assert_eq!(p.columns, vec!["streams".to_string()]);
        assert_eq!(p.rows[1], vec![CellValue::Integer(30)]);

        let s = t.select_rows(&[2, 0]);
        assert_eq!(s.len(), 2);
        assert_eq!(s.cell(0, "streams"), Some(&CellValue::Null));
    }

    #[test]
    fn numeric_text_is_numeric() {
        assert_eq!(CellValue::String(" 42 ".into()).as_f64(), Some(42.0));
        assert_eq!(CellValue::Date("2023-01-01".into()).as_f64(), None);
        assert!(CellValue::Null < CellValue::Integer(-5));
    }
}
