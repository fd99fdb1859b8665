use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::model::{CellValue, ResultTable};
use super::normalize::parse_date;

// ---------------------------------------------------------------------------
// Filter predicate: which unique values are selected per column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column_name → set of selected values.
/// A column absent from the map is unconstrained.
pub type FilterState = BTreeMap<String, BTreeSet<CellValue>>;

/// Initialise a [`FilterState`] for `columns` with all values selected.
pub fn init_filter_state(table: &ResultTable, columns: &[&str]) -> FilterState {
    columns
        .iter()
        .map(|col| (col.to_string(), table.unique_values(col)))
        .collect()
}

/// Return indices of rows that pass all active filters.
///
/// A row passes a column filter when:
/// * The column is not present in `filters` → passes (no constraint)
/// * The filter set for that column is empty → nothing selected → fails
/// * The row's value for that column is in the selected set → passes
pub fn filtered_indices(table: &ResultTable, filters: &FilterState) -> Vec<usize> {
    let active: Vec<(Option<usize>, &BTreeSet<CellValue>)> = filters
        .iter()
        .map(|(col, selected)| (table.column_index(col), selected))
        .collect();

    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            active.iter().all(|(idx, selected)| {
                if selected.is_empty() {
                    return false;
                }
                match idx {
                    Some(i) => selected.contains(&row[*i]),
                    // table doesn't have this column → include only if Null is selected
                    None => selected.contains(&CellValue::Null),
                }
            })
        })
        .map(|(i, _)| i)
        .collect()
}

/// Rows whose date `column` lies in `from..=to`. Rows without a parseable
/// date are excluded while a window is set.
pub fn within_dates(
    table: &ResultTable,
    column: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<usize> {
    if from.is_none() && to.is_none() {
        return (0..table.len()).collect();
    }
    let Some(idx) = table.column_index(column) else {
        return Vec::new();
    };
    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            let Some(date) = row[idx].as_str().and_then(parse_date) else {
                return false;
            };
            from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t)
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ResultTable {
        let row = |artist: &str, date: &str| {
            vec![
                CellValue::String(artist.into()),
                CellValue::Date(date.into()),
            ]
        };
        ResultTable::new(
            vec!["Artist Name".into(), "release_date".into()],
            vec![
                row("SZA", "2022-12-09"),
                row("Bad Bunny", "2023-05-18"),
                row("SZA", "2023-01-02"),
            ],
        )
    }

    #[test]
    fn selection_filters_rows() {
        let t = table();
        let mut filters = init_filter_state(&t, &["Artist Name"]);
        assert_eq!(filtered_indices(&t, &filters), vec![0, 1, 2]);

        filters.insert(
            "Artist Name".into(),
            BTreeSet::from([CellValue::String("SZA".into())]),
        );
        assert_eq!(filtered_indices(&t, &filters), vec![0, 2]);

        filters.insert("Artist Name".into(), BTreeSet::new());
        assert!(filtered_indices(&t, &filters).is_empty());
    }

    #[test]
    fn unknown_columns_pass_only_with_null_selected() {
        let t = table();
        let mut filters = FilterState::new();
        filters.insert("genre".into(), BTreeSet::from([CellValue::String("pop".into())]));
        assert!(filtered_indices(&t, &filters).is_empty());
        filters.insert("genre".into(), BTreeSet::from([CellValue::Null]));
        assert_eq!(filtered_indices(&t, &filters).len(), 3);
    }

    #[test]
    fn date_window_is_inclusive() {
        let t = table();
        let from = NaiveDate::from_ymd_opt(2023, 1, 1);
        let to = NaiveDate::from_ymd_opt(2023, 5, 18);
        assert_eq!(within_dates(&t, "release_date", from, to), vec![1, 2]);
        assert_eq!(within_dates(&t, "release_date", None, None), vec![0, 1, 2]);
        assert_eq!(within_dates(&t, "release_date", None, from), vec![0]);
    }
}
