use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::{pastel, vivid};
use crate::data::aggregate::top_regions;
use crate::data::region::{Region, region_code, region_label};
use crate::state::AppState;
use crate::ui::{pie, plot, table};

// ---------------------------------------------------------------------------
// Left side panel – region filter
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter");
    ui.separator();

    let regions: Vec<Region> = match &state.dataset {
        Some(ds) => ds.regions.iter().copied().collect(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    ui.strong(format!(
        "Pilih Provinsi  ({}/{})",
        state.selection.len(),
        regions.len()
    ));
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("Semua").clicked() {
            state.select_all();
        }
        if ui.small_button("Kosongkan").clicked() {
            state.select_none();
        }
    });
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for region in regions {
                let mut text = RichText::new(region_label(region));
                if let Some(colors) = &state.region_colors {
                    text = text.color(colors.color_for(region));
                }

                let mut checked = state.selection.contains(&region);
                let response = ui.checkbox(&mut checked, text);
                let response = match region.and_then(region_code) {
                    Some(code) => response.on_hover_text(code),
                    None => response,
                };
                if response.changed() {
                    state.toggle_region(region);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} orders loaded, {} after filter",
                ds.len(),
                state.tables.filtered_rows
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel – the dashboard itself
// ---------------------------------------------------------------------------

/// Render every chart and the statistics table.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open an order dataset to begin  (File → Open…)");
        });
        return;
    }

    let tables = &state.tables;
    let top = top_regions(&tables.region_summary, state.config.top_regions);
    let spend: Vec<(&str, f64)> = top
        .iter()
        .map(|r| (region_label(r.region), r.total_spend))
        .collect();
    let customers: Vec<(&str, f64)> = top
        .iter()
        .map(|r| (region_label(r.region), r.total_customers as f64))
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Dasbor Penjualan E-Commerce");
            ui.label("Gambaran Kinerja Penjualan di Berbagai Provinsi di Brasil");
            ui.separator();

            ui.columns(2, |cols| {
                cols[0].strong("Total Belanja");
                pie::pie_chart(&mut cols[0], &spend, &pastel(spend.len()));
                cols[1].strong("Total Pelanggan");
                pie::pie_chart(&mut cols[1], &customers, &vivid(customers.len()));
            });
            ui.separator();

            ui.columns(2, |cols| {
                cols[0].strong("Distribusi Status Pesanan");
                plot::status_chart(&mut cols[0], &tables.status_counts);
                cols[1].strong("Histogram Repeat Order");
                plot::repeat_chart(&mut cols[1], &tables.repeat_categories);
            });
            ui.separator();

            ui.strong("Scatter Plot: Pola Belanja Bulanan");
            plot::monthly_scatter(ui, &tables.monthly_spend, state.region_colors.as_ref());
            ui.separator();

            ui.strong("Statistik Pelanggan per Provinsi");
            table::region_stats_table(ui, &tables.region_stats);
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Open order data")
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"]);
    if let Some(dir) = state.source_path().as_deref().and_then(|p| p.parent()) {
        dialog = dialog.set_directory(dir);
    }

    if let Some(path) = dialog.pick_file() {
        log::info!("Opening {}", path.display());
        state.open(&path);
    }
}
