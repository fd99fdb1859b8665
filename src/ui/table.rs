use eframe::egui::{self, Align, Color32, Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::ResultTable;
use crate::export;

/// Options for [`result_table`].
#[derive(Debug, Clone, Copy)]
pub struct TableView<'a> {
    /// Unique id salt; several tables can share a page.
    pub id: &'a str,
    /// Prefix rows with a 1-based row number column.
    pub numbered: bool,
    pub max_height: f32,
}

impl<'a> TableView<'a> {
    pub fn new(id: &'a str) -> Self {
        Self {
            id,
            numbered: false,
            max_height: 320.0,
        }
    }

    pub fn numbered(mut self) -> Self {
        self.numbered = true;
        self
    }

    pub fn max_height(mut self, h: f32) -> Self {
        self.max_height = h;
        self
    }
}

/// Render a [`ResultTable`] with an "Export CSV…" button above it.
///
/// Export outcomes are reported through `status`.
pub fn result_table(
    ui: &mut Ui,
    status: &mut Option<String>,
    table: &ResultTable,
    view: TableView<'_>,
) {
    ui.push_id(view.id, |ui: &mut Ui| {
        ui.horizontal(|ui: &mut Ui| {
            ui.label(
                RichText::new(format!("{} rows × {} columns", table.len(), table.columns.len()))
                    .small()
                    .color(Color32::GRAY),
            );
            if ui.small_button("Export CSV…").clicked() {
                match export::export_with_dialog(table, view.id) {
                    Ok(Some(path)) => {
                        *status = Some(format!("Exported to {}", path.display()));
                    }
                    Ok(None) => {}
                    Err(e) => {
                        log::error!("CSV export failed: {e:#}");
                        *status = Some(format!("Error: {e:#}"));
                    }
                }
            }
        });

        let n_cols = table.columns.len() + usize::from(view.numbered);
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(Layout::left_to_right(Align::Center))
            .columns(Column::auto().at_least(40.0).clip(true), n_cols)
            .max_scroll_height(view.max_height)
            .header(20.0, |mut header| {
                if view.numbered {
                    header.col(|ui: &mut Ui| {
                        ui.strong("#");
                    });
                }
                for name in &table.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, table.len(), |mut row| {
                    let idx = row.index();
                    if view.numbered {
                        row.col(|ui: &mut Ui| {
                            ui.label((idx + 1).to_string());
                        });
                    }
                    for cell in &table.rows[idx] {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell.to_string());
                        });
                    }
                });
            });
    });
}

/// Two-column "name: description" list.
pub fn description_list(ui: &mut Ui, items: &[(&str, &str)]) {
    egui::Grid::new("descriptions")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            for (name, description) in items {
                ui.strong(*name);
                ui.label(*description);
                ui.end_row();
            }
        });
}
