pub mod panels;
pub mod pie;
pub mod plot;
pub mod table;

use eframe::egui::{Color32, RichText, Ui};

/// Stand-in for a chart whose table has no rows.
pub fn placeholder(ui: &mut Ui) {
    ui.add_space(8.0);
    ui.label(RichText::new("Tidak ada data untuk pilihan ini.").italics().color(Color32::GRAY));
    ui.add_space(8.0);
}
