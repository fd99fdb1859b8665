use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::data::model::{CellValue, ResultTable};

/// Write `table` as CSV with a header row. NULL cells become empty fields and
/// blobs are written as lowercase hex.
pub fn write_csv<W: Write>(table: &ResultTable, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&table.columns)
        .context("writing CSV header")?;
    for (row_no, row) in table.rows.iter().enumerate() {
        out.write_record(row.iter().map(csv_field))
            .with_context(|| format!("writing CSV row {row_no}"))?;
    }
    out.flush().context("flushing CSV output")?;
    Ok(())
}

fn csv_field(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => String::new(),
        CellValue::Float(v) => v.to_string(),
        CellValue::Blob(bytes) => hex::encode(bytes),
        other => other.to_string(),
    }
}

pub fn save_csv(table: &ResultTable, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(table, file)
}

/// Ask for a destination and write the table there.
///
/// Returns `Ok(None)` when the dialog is cancelled.
pub fn export_with_dialog(table: &ResultTable, suggested_name: &str) -> Result<Option<PathBuf>> {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export table as CSV")
        .set_file_name(format!("{suggested_name}.csv"))
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return Ok(None);
    };
    save_csv(table, &path)?;
    log::info!("Exported {} rows to {}", table.len(), path.display());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_quotes_fields() {
        let table = ResultTable::new(
            vec!["track_name".into(), "artist(s)_name".into(), "streams".into()],
            vec![
                vec![
                    CellValue::String("Seven (feat. Latto)".into()),
                    CellValue::String("Latto, Jung Kook".into()),
                    CellValue::Integer(141381703),
                ],
                vec![CellValue::String("x".into()), CellValue::Null, CellValue::Float(0.5)],
                vec![
                    CellValue::String("cover".into()),
                    CellValue::Blob(vec![0x00, 0xab, 0xff]),
                    CellValue::Integer(0),
                ],
            ],
        );
        let mut buf = Vec::new();
        write_csv(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "track_name,artist(s)_name,streams\n\
             Seven (feat. Latto),\"Latto, Jung Kook\",141381703\n\
             x,,0.5\n\
             cover,00abff,0\n"
        );
    }
}
