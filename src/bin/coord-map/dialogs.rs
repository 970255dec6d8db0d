//! Modal forms: map create/edit, bulk coordinate import, and the inline
//! add-coordinate form.

use coord_map::{Layout, MapDetails, NewCoordinate, ParseReport, parser};
use eframe::egui;

/// Outcome of showing a dialog for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    None,
    Submit,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapFormMode {
    Create,
    Edit(String),
}

#[derive(Debug, Clone)]
pub struct MapForm {
    pub mode: MapFormMode,
    pub name: String,
    pub description: String,
}

impl MapForm {
    pub fn create() -> Self {
        Self {
            mode: MapFormMode::Create,
            name: String::new(),
            description: String::new(),
        }
    }

    pub fn edit(map: &coord_map::Map) -> Self {
        Self {
            mode: MapFormMode::Edit(map.id.clone()),
            name: map.name.clone(),
            description: map.description.clone(),
        }
    }

    pub fn details(&self) -> Option<MapDetails> {
        MapDetails::new(&self.name, &self.description).ok()
    }

    pub fn show(&mut self, ctx: &egui::Context) -> DialogAction {
        let (title, submit) = match self.mode {
            MapFormMode::Create => ("Create New Map", "Create Map"),
            MapFormMode::Edit(_) => ("Edit Map", "Save Changes"),
        };
        let can_submit = self.details().is_some();
        let mut action = DialogAction::None;

        modal(ctx, title, |ui| {
            ui.label("Name");
            let name = ui.add(
                egui::TextEdit::singleline(&mut self.name)
                    .hint_text("My Minecraft World")
                    .desired_width(f32::INFINITY),
            );
            if name.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) && can_submit {
                action = DialogAction::Submit;
            }

            ui.add_space(6.0);
            ui.label("Description");
            ui.add(
                egui::TextEdit::multiline(&mut self.description)
                    .hint_text("Optional")
                    .desired_rows(3)
                    .desired_width(f32::INFINITY),
            );

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.add_enabled(can_submit, egui::Button::new(submit)).clicked() {
                    action = DialogAction::Submit;
                }
                if ui.button("Cancel").clicked() {
                    action = DialogAction::Cancel;
                }
            });
        });

        action
    }
}

/// Bulk import dialog with a live parse preview.
#[derive(Debug, Clone, Default)]
pub struct ImportForm {
    pub text: String,
    pub layout: Layout,
}

impl ImportForm {
    pub fn report(&self) -> ParseReport {
        parser::parse_with_layout(&self.text, self.layout)
    }

    pub fn show(&mut self, ctx: &egui::Context) -> DialogAction {
        let mut action = DialogAction::None;
        let example = self.layout_example();

        modal(ctx, "Multi Add Coordinates", |ui| {
            ui.label(format!(
                "Enter one coordinate per line: {}",
                self.layout.format_hint()
            ));
            ui.horizontal(|ui| {
                ui.radio_value(&mut self.layout, Layout::LabelFirst, "Label first");
                ui.radio_value(&mut self.layout, Layout::LabelLast, "Label last");
            });

            egui::ScrollArea::vertical()
                .id_salt("import_text")
                .max_height(180.0)
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut self.text)
                            .font(egui::TextStyle::Monospace)
                            .hint_text(example)
                            .desired_rows(8)
                            .desired_width(f32::INFINITY),
                    );
                });

            if !self.text.trim().is_empty() {
                ui.add_space(6.0);
                show_preview(ui, &self.report());
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Add Coordinates").clicked() {
                    action = DialogAction::Submit;
                }
                if ui.button("Cancel").clicked() {
                    action = DialogAction::Cancel;
                }
            });
        });

        action
    }

    fn layout_example(&self) -> &'static str {
        match self.layout {
            Layout::LabelFirst => "Home Base, 100, 64, 200\nMine Entrance, -50, 70, 150",
            Layout::LabelLast => "100, 64, 200, Home Base\n-50, 70, 150, Mine Entrance",
        }
    }
}

fn show_preview(ui: &mut egui::Ui, report: &ParseReport) {
    ui.strong(format!("{} valid coordinate(s)", report.coordinates.len()));

    if report.warnings.is_empty() {
        return;
    }
    egui::ScrollArea::vertical()
        .id_salt("import_warnings")
        .max_height(120.0)
        .show(ui, |ui| {
            for warning in &report.warnings {
                let color = match warning.severity {
                    coord_map::Severity::Rejected => ui.visuals().error_fg_color,
                    coord_map::Severity::Suspicious => ui.visuals().warn_fg_color,
                };
                ui.colored_label(
                    color,
                    format!("Line {}: {}", warning.line_number, warning.issue),
                )
                .on_hover_text(&warning.line);
            }
        });
}

/// Inline add-coordinate form on the map detail side panel. Fields stay as
/// typed text until submitted.
#[derive(Debug, Clone, Default)]
pub struct CoordinateForm {
    pub x: String,
    pub y: String,
    pub z: String,
    pub label: String,
}

impl CoordinateForm {
    /// Returns the coordinate to add when the form is submitted with a label.
    /// The form is cleared on success.
    pub fn show(&mut self, ui: &mut egui::Ui) -> Option<NewCoordinate> {
        ui.strong("Add Coordinate");
        ui.separator();

        egui::Grid::new("coordinate_form")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                for (name, value, hint) in [
                    ("X", &mut self.x, "0"),
                    ("Y", &mut self.y, "64"),
                    ("Z", &mut self.z, "0"),
                ] {
                    ui.label(name);
                    ui.add(egui::TextEdit::singleline(value).hint_text(hint));
                    ui.end_row();
                }
                ui.label("Label");
                ui.add(egui::TextEdit::singleline(&mut self.label).hint_text("Home Base"));
                ui.end_row();
            });

        let parsed = parser::parse_form(&self.x, &self.y, &self.z, &self.label);
        let clicked = ui
            .add_enabled(
                parsed.is_some(),
                egui::Button::new("Add Coordinate").min_size(egui::vec2(ui.available_width(), 0.0)),
            )
            .clicked();

        let coordinate = parsed.filter(|_| clicked)?;
        *self = Self::default();
        Some(coordinate)
    }
}

/// Centered, non-collapsible window.
fn modal(ctx: &egui::Context, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .default_width(420.0)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, add_contents);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_form_requires_a_name() {
        let mut form = MapForm::create();
        assert!(form.details().is_none());
        form.name = "   ".to_owned();
        assert!(form.details().is_none());
        form.name = " Overworld ".to_owned();
        assert_eq!(form.details().unwrap().name(), "Overworld");
    }

    #[test]
    fn import_report_follows_layout() {
        let mut form = ImportForm {
            text: "100, 64, 200, Home".to_owned(),
            layout: Layout::LabelFirst,
        };
        assert!(form.report().coordinates.is_empty());

        form.layout = Layout::LabelLast;
        let report = form.report();
        assert_eq!(report.coordinates.len(), 1);
        assert_eq!(report.coordinates[0].label, "Home");
    }

    #[test]
    fn import_dialog_shows_without_action() {
        let ctx = egui::Context::default();
        let mut form = ImportForm {
            text: "Home, 100, 64, 200\nbroken".to_owned(),
            layout: Layout::LabelFirst,
        };
        let mut action = DialogAction::Submit;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            action = form.show(ctx);
        });
        assert_eq!(action, DialogAction::None);
        assert_eq!(form.report().coordinates.len(), 1);
    }
}
