use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Align2, Color32, FontId, Mesh, Sense, Shape, Stroke, Ui};

// ---------------------------------------------------------------------------
// Pie geometry
// ---------------------------------------------------------------------------

/// One wedge of a pie chart. Angles are radians in screen space, starting at
/// twelve o'clock and running clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub fraction: f64,
    pub start: f32,
    pub sweep: f32,
}

/// Lay out wedges for `entries`. Non-positive values get no wedge; an
/// all-zero input yields no slices.
pub fn pie_slices(entries: &[(&str, f64)]) -> Vec<PieSlice> {
    let total: f64 = entries.iter().map(|(_, v)| v.max(0.0)).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut angle = -FRAC_PI_2;
    entries
        .iter()
        .filter(|(_, v)| *v > 0.0)
        .map(|(label, value)| {
            let fraction = value / total;
            let sweep = fraction as f32 * TAU;
            let slice = PieSlice {
                label: label.to_string(),
                value: *value,
                fraction,
                start: angle,
                sweep,
            };
            angle += sweep;
            slice
        })
        .collect()
}

/// Index of the wedge covering `angle` (as returned by `atan2` in screen space).
pub fn slice_at(slices: &[PieSlice], angle: f32) -> Option<usize> {
    let first = slices.first()?.start;
    let offset = (angle - first).rem_euclid(TAU);
    slices
        .iter()
        .position(|s| offset >= s.start - first && offset < s.start - first + s.sweep)
}

// ---------------------------------------------------------------------------
// Pie widget
// ---------------------------------------------------------------------------

/// Draw a labelled pie chart with percentage annotations.
pub fn pie_chart(ui: &mut Ui, entries: &[(&str, f64)], colors: &[Color32]) {
    let slices = pie_slices(entries);
    if slices.is_empty() {
        super::placeholder(ui);
        return;
    }

    let size = ui.available_width().clamp(160.0, 360.0);
    let (response, painter) = ui.allocate_painter(egui::vec2(size, size), Sense::hover());
    let center = response.rect.center();
    let radius = size * 0.3;
    let edge = Stroke::new(1.0, Color32::BLACK);
    let text_color = ui.visuals().text_color();

    for (i, slice) in slices.iter().enumerate() {
        let fill = colors
            .get(i % colors.len().max(1))
            .copied()
            .unwrap_or(Color32::LIGHT_BLUE);

        let steps = ((slice.sweep / 0.05).ceil() as u32).max(1);
        let mut mesh = Mesh::default();
        mesh.colored_vertex(center, fill);
        for s in 0..=steps {
            let a = slice.start + slice.sweep * s as f32 / steps as f32;
            mesh.colored_vertex(center + radius * egui::vec2(a.cos(), a.sin()), fill);
        }
        for s in 1..=steps {
            mesh.add_triangle(0, s, s + 1);
        }
        painter.add(Shape::mesh(mesh));

        let start = egui::vec2(slice.start.cos(), slice.start.sin());
        painter.line_segment([center, center + radius * start], edge);

        let mid = slice.start + slice.sweep / 2.0;
        let dir = egui::vec2(mid.cos(), mid.sin());
        painter.text(
            center + radius * 0.65 * dir,
            Align2::CENTER_CENTER,
            format!("{:.1}%", slice.fraction * 100.0),
            FontId::proportional(10.0),
            Color32::BLACK,
        );
        painter.text(
            center + radius * 1.25 * dir,
            Align2::CENTER_CENTER,
            &slice.label,
            FontId::proportional(11.0),
            text_color,
        );
    }
    painter.circle_stroke(center, radius, edge);

    if let Some(pos) = response.hover_pos() {
        let d = pos - center;
        if d.length() <= radius {
            if let Some(i) = slice_at(&slices, d.y.atan2(d.x)) {
                let s = &slices[i];
                response.on_hover_text(format!(
                    "{}: {:.2} ({:.1}%)",
                    s.label,
                    s.value,
                    s.fraction * 100.0
                ));
            }
        }
    }
}
