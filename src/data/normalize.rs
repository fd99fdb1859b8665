use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::debug;

use super::model::{CellValue, ResultTable};

pub const RELEASE_DATE_COLUMN: &str = "release_date";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d"];

/// Parse the date part of a textual timestamp, if it looks like one.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Rewrite every parseable `release_date` cell as a `YYYY-MM-DD` [`CellValue::Date`].
///
/// Unparseable text, numbers and NULLs are left as they are. Returns the
/// number of cells rewritten.
pub fn normalize_release_dates(table: &mut ResultTable) -> usize {
    let Some(idx) = table.column_index(RELEASE_DATE_COLUMN) else {
        return 0;
    };

    let mut rewritten = 0;
    for row in &mut table.rows {
        let cell = &mut row[idx];
        let parsed = match cell {
            CellValue::String(s) | CellValue::Date(s) => parse_date(s),
            _ => None,
        };
        match parsed {
            Some(date) => {
                *cell = CellValue::Date(date.format("%Y-%m-%d").to_string());
                rewritten += 1;
            }
            None if !cell.is_null() => debug!("Leaving release_date {cell:?} as is"),
            None => {}
        }
    }
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_column(values: Vec<CellValue>) -> ResultTable {
        ResultTable::new(
            vec![RELEASE_DATE_COLUMN.into()],
            values.into_iter().map(|v| vec![v]).collect(),
        )
    }

    fn is_iso_date(s: &str) -> bool {
        s.len() == 10
            && s.char_indices().all(|(i, c)| match i {
                4 | 7 => c == '-',
                _ => c.is_ascii_digit(),
            })
    }

    #[test]
    fn parseable_values_become_iso_dates() {
        let mut table = one_column(vec![
            CellValue::String("2023-07-14 00:00:00".into()),
            CellValue::String("2023-07-14T08:30:00.250".into()),
            CellValue::String("2023-07-14T08:30:00+02:00".into()),
            CellValue::String("2023/7/4".into()),
            CellValue::String("7/4/2023".into()),
            CellValue::String("2023-07-04".into()),
        ]);
        assert_eq!(normalize_release_dates(&mut table), 6);

        let out: Vec<&str> = table.rows.iter().map(|r| r[0].as_str().unwrap()).collect();
        assert!(out.iter().all(|s| is_iso_date(s)));
        assert_eq!(
            out,
            vec![
                "2023-07-14",
                "2023-07-14",
                "2023-07-14",
                "2023-07-04",
                "2023-07-04",
                "2023-07-04"
            ]
        );
        assert!(matches!(table.rows[0][0], CellValue::Date(_)));
    }

    #[test]
    fn unparseable_and_missing_values_are_untouched() {
        let original = vec![
            CellValue::String("not a date".into()),
            CellValue::String("2023-02-30".into()),
            CellValue::String(String::new()),
            CellValue::Integer(20230714),
            CellValue::Null,
        ];
        let mut table = one_column(original.clone());
        assert_eq!(normalize_release_dates(&mut table), 0);
        let after: Vec<CellValue> = table.rows.into_iter().map(|mut r| r.remove(0)).collect();
        assert_eq!(after, original);
    }

    #[test]
    fn tables_without_the_column_are_ignored() {
        let mut table = ResultTable::new(
            vec!["released".into()],
            vec![vec![CellValue::String("2023-01-01 00:00:00".into())]],
        );
        assert_eq!(normalize_release_dates(&mut table), 0);
        assert_eq!(table.rows[0][0], CellValue::String("2023-01-01 00:00:00".into()));
    }
}
