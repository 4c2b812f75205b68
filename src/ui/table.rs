use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::RegionCustomerStats;
use crate::data::region::{region_code, region_label};

/// Customer statistics per region over the whole dataset.
pub fn region_stats_table(ui: &mut Ui, stats: &[RegionCustomerStats]) {
    if stats.is_empty() {
        super::placeholder(ui);
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(180.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::auto().at_least(120.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Provinsi");
            });
            header.col(|ui| {
                ui.strong("Kode");
            });
            header.col(|ui| {
                ui.strong("Pelanggan unik");
            });
            header.col(|ui| {
                ui.strong("Rata-rata belanja");
            });
        })
        .body(|mut body| {
            for s in stats {
                body.row(18.0, |mut row| {
                    let name = region_label(s.region);
                    row.col(|ui| {
                        ui.label(name);
                    });
                    row.col(|ui| {
                        ui.label(s.region.and_then(region_code).unwrap_or("–"));
                    });
                    row.col(|ui| {
                        ui.label(s.unique_customers.to_string());
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.2}", s.mean_spend));
                    });
                });
            }
        });
}
