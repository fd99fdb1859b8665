//! Reshaping of loaded tables into the series the charts and summary
//! tables draw.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::dataset::{ARTIST_COLUMN, TRACK_COLUMN};
use super::model::{CellValue, ResultTable};

// ---------------------------------------------------------------------------
// Counting and ranking
// ---------------------------------------------------------------------------

/// Occurrences of each non-null value of `column`, most frequent first.
/// Ties keep first-appearance order.
pub fn value_counts(table: &ResultTable, column: &str) -> Vec<(CellValue, usize)> {
    let Some(cells) = table.column(column) else {
        return Vec::new();
    };

    let mut order: Vec<CellValue> = Vec::new();
    let mut counts: HashMap<CellValue, usize> = HashMap::new();
    for cell in cells.filter(|c| !c.is_null()) {
        let count = counts.entry(cell.clone()).or_insert(0);
        if *count == 0 {
            order.push(cell.clone());
        }
        *count += 1;
    }

    let mut out: Vec<(CellValue, usize)> = order
        .into_iter()
        .map(|v| {
            let n = counts[&v];
            (v, n)
        })
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

/// The `n` rows with the largest numeric `column`. Non-numeric cells sort last.
pub fn top_n_by(table: &ResultTable, column: &str, n: usize) -> ResultTable {
    let Some(idx) = table.column_index(column) else {
        return ResultTable::new(table.columns.clone(), Vec::new());
    };

    let mut order: Vec<usize> = (0..table.len()).collect();
    order.sort_by(|&a, &b| {
        let va = table.rows[a][idx].as_f64();
        let vb = table.rows[b][idx].as_f64();
        match (va, vb) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
    order.truncate(n);
    table.select_rows(&order)
}

/// Streaming platform whose playlist and chart presence can be ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Spotify,
    Apple,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Spotify, Platform::Apple];

    pub fn label(self) -> &'static str {
        match self {
            Platform::Spotify => "Spotify",
            Platform::Apple => "Apple Music",
        }
    }

    fn key(self) -> &'static str {
        match self {
            Platform::Spotify => "spotify",
            Platform::Apple => "apple",
        }
    }

    pub fn playlists_column(self) -> String {
        format!("in_{}_playlists", self.key())
    }

    pub fn charts_column(self) -> String {
        format!("in_{}_charts", self.key())
    }

    pub fn total_column(self) -> String {
        format!("{}_total", self.key())
    }
}

/// Top `n` tracks by playlist presence plus chart presence on `platform`.
///
/// Output columns: track, artist, playlists, charts, `<platform>_total`.
pub fn platform_top(table: &ResultTable, platform: Platform, n: usize) -> ResultTable {
    let playlists = platform.playlists_column();
    let charts = platform.charts_column();
    let base = table.project(&[TRACK_COLUMN, ARTIST_COLUMN, &playlists, &charts]);

    let (Some(p_idx), Some(c_idx)) = (base.column_index(&playlists), base.column_index(&charts))
    else {
        return ResultTable::default();
    };

    let mut columns = base.columns.clone();
    columns.push(platform.total_column());
    let rows = base
        .rows
        .iter()
        .map(|row| {
            let total = match (row[p_idx].as_f64(), row[c_idx].as_f64()) {
                (Some(p), Some(c)) => CellValue::Integer((p + c).round() as i64),
                _ => CellValue::Null,
            };
            let mut row = row.clone();
            row.push(total);
            row
        })
        .collect();

    let with_totals = ResultTable::new(columns, rows);
    top_n_by(&with_totals, &platform.total_column(), n)
}

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

/// Numeric values of a column; non-numeric cells are skipped.
pub fn numeric_values(table: &ResultTable, column: &str) -> Vec<f64> {
    table
        .column(column)
        .map(|cells| cells.filter_map(CellValue::as_f64).collect())
        .unwrap_or_default()
}

/// Whether every non-null cell of `column` is stored as a number.
pub fn is_numeric_column(table: &ResultTable, column: &str) -> bool {
    let Some(cells) = table.column(column) else {
        return false;
    };
    let mut seen_any = false;
    for cell in cells {
        match cell {
            CellValue::Integer(_) | CellValue::Float(_) => seen_any = true,
            CellValue::Null => {}
            _ => return false,
        }
    }
    seen_any
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (n - 1 denominator).
fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Linear-interpolated quantile of already sorted values.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// Pearson correlation over pairs where both sides are numeric.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in &pairs {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx).powi(2);
        syy += (y - my).powi(2);
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    sxy / (sxx.sqrt() * syy.sqrt())
}

/// Square matrix of pairwise correlations.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

pub fn correlation_matrix(table: &ResultTable, columns: &[&str]) -> CorrelationMatrix {
    let series: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|c| {
            table
                .column(c)
                .map(|cells| cells.map(CellValue::as_f64).collect())
                .unwrap_or_default()
        })
        .collect();

    let values = series
        .iter()
        .map(|a| series.iter().map(|b| pearson(a, b)).collect())
        .collect();

    CorrelationMatrix {
        labels: columns.iter().map(|c| c.to_string()).collect(),
        values,
    }
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

fn float_or_null(v: Option<f64>) -> CellValue {
    v.map(CellValue::Float).unwrap_or(CellValue::Null)
}

/// `describe()` for numeric columns: one row per statistic, one column per
/// numeric source column.
pub fn describe_numeric(table: &ResultTable) -> ResultTable {
    let numeric: Vec<&String> = table
        .columns
        .iter()
        .filter(|c| is_numeric_column(table, c))
        .collect();

    let stats: Vec<Vec<CellValue>> = numeric
        .iter()
        .map(|col| {
            let mut values = numeric_values(table, col);
            values.sort_by(f64::total_cmp);
            vec![
                CellValue::Float(values.len() as f64),
                float_or_null(mean(&values)),
                float_or_null(sample_std(&values)),
                float_or_null(values.first().copied()),
                float_or_null(quantile(&values, 0.25)),
                float_or_null(quantile(&values, 0.5)),
                float_or_null(quantile(&values, 0.75)),
                float_or_null(values.last().copied()),
            ]
        })
        .collect();

    let labels = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];
    let mut columns = vec!["statistic".to_string()];
    columns.extend(numeric.iter().map(|c| c.to_string()));
    let rows = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let mut row = vec![CellValue::String(label.to_string())];
            row.extend(stats.iter().map(|s| s[i].clone()));
            row
        })
        .collect();
    ResultTable::new(columns, rows)
}

/// `describe()` for non-numeric columns: count, unique, top, freq.
pub fn describe_non_numeric(table: &ResultTable) -> ResultTable {
    let others: Vec<&String> = table
        .columns
        .iter()
        .filter(|c| !is_numeric_column(table, c))
        .collect();

    let stats: Vec<[CellValue; 4]> = others
        .iter()
        .map(|col| {
            let counts = value_counts(table, col);
            let count: usize = counts.iter().map(|(_, n)| n).sum();
            let (top, freq) = counts
                .first()
                .map(|(v, n)| (CellValue::String(v.to_string()), CellValue::Integer(*n as i64)))
                .unwrap_or((CellValue::Null, CellValue::Null));
            [
                CellValue::Integer(count as i64),
                CellValue::Integer(counts.len() as i64),
                top,
                freq,
            ]
        })
        .collect();

    let labels = ["count", "unique", "top", "freq"];
    let mut columns = vec!["statistic".to_string()];
    columns.extend(others.iter().map(|c| c.to_string()));
    let rows = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let mut row = vec![CellValue::String(label.to_string())];
            row.extend(stats.iter().map(|s| s[i].clone()));
            row
        })
        .collect();
    ResultTable::new(columns, rows)
}

/// `info()`-style overview: position, name, non-null count and dominant type.
pub fn column_info(table: &ResultTable) -> ResultTable {
    let rows = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let mut types: Vec<(&'static str, usize)> = Vec::new();
            let mut non_null = 0usize;
            for cell in table.rows.iter().map(|r| &r[i]).filter(|c| !c.is_null()) {
                non_null += 1;
                match types.iter_mut().find(|(t, _)| *t == cell.type_name()) {
                    Some((_, n)) => *n += 1,
                    None => types.push((cell.type_name(), 1)),
                }
            }
            let dtype = types
                .iter()
                .max_by_key(|(_, n)| *n)
                .map(|(t, _)| *t)
                .unwrap_or("null");
            vec![
                CellValue::Integer(i as i64),
                CellValue::String(col.clone()),
                CellValue::String(format!("{non_null} non-null")),
                CellValue::String(dtype.to_string()),
            ]
        })
        .collect();

    ResultTable::new(
        vec![
            "#".into(),
            "Column".into(),
            "Non-Null Count".into(),
            "Dtype".into(),
        ],
        rows,
    )
}

// ---------------------------------------------------------------------------
// Distributions and profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram; the last bin includes its right edge.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }
    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: lo + width * i as f64,
            end: lo + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for v in finite {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Feature values of the first row whose `track_name` equals `track`.
pub fn feature_profile(table: &ResultTable, track: &str, features: &[&str]) -> Vec<(String, f64)> {
    let Some(row) = table
        .column(TRACK_COLUMN)
        .and_then(|mut cells| cells.position(|c| c.as_str() == Some(track)))
    else {
        return Vec::new();
    };
    features
        .iter()
        .filter_map(|f| {
            let value = table.cell(row, f)?.as_f64()?;
            Some((f.to_string(), value))
        })
        .collect()
}
