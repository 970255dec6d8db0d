//! Screens of the coordinate map application.

use crate::canvas::{CanvasEvent, MapCanvas};
use crate::colors;
use crate::constants::SIDEBAR_WIDTH;
use crate::dialogs::{DialogAction, ImportForm, MapForm, MapFormMode};
use crate::{CoordMapApp, Dialog, Screen};
use coord_map::{Coordinate, Map};
use eframe::egui;
use egui_extras::{Column, TableBuilder};
use egui_toast::ToastKind;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Actions collected while the store is borrowed for drawing
enum MapAction {
    Open(String),
    Edit(String),
    Delete(String),
}

enum CoordinateAction {
    Select(String),
    Delete(String),
}

impl CoordMapApp {
    /// Zoom and full-screen shortcuts. Ignored while typing or when a dialog
    /// is open.
    pub fn handle_keyboard_input(&mut self, ctx: &egui::Context) {
        if self.dialog.is_some() || ctx.memory(|m| m.focused().is_some()) {
            return;
        }
        if !matches!(self.screen, Screen::MapDetail(_)) {
            return;
        }

        let config = &self.config;
        let view = &mut self.canvas.view;
        let full_screen = &mut self.full_screen;
        ctx.input(|i| {
            if i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals) {
                view.zoom_in(config);
            }
            if i.key_pressed(egui::Key::Minus) {
                view.zoom_out(config);
            }
            if i.key_pressed(egui::Key::Num0) {
                view.reset();
            }
            if i.key_pressed(egui::Key::Escape) {
                *full_screen = false;
            }
        });
    }

    /// Renders the map list with create, open, edit and delete actions.
    pub fn show_map_list(&mut self, ctx: &egui::Context) {
        let mut action = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.heading("Coordinate Maps");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Create New Map").clicked() {
                        self.dialog = Some(Dialog::Map(MapForm::create()));
                    }
                });
            });
            ui.separator();

            if self.store.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label("No maps yet.\nCreate one to start plotting coordinates.");
                });
                return;
            }

            egui::ScrollArea::vertical().show(ui, |ui| {
                for map in self.store.maps() {
                    if let Some(a) = map_card(ui, map) {
                        action = Some(a);
                    }
                    ui.add_space(6.0);
                }
            });
        });

        match action {
            Some(MapAction::Open(id)) => self.open_map(id),
            Some(MapAction::Edit(id)) => {
                if let Some(map) = self.store.map(&id) {
                    self.dialog = Some(Dialog::Map(MapForm::edit(map)));
                }
            }
            Some(MapAction::Delete(id)) => self.delete_map(&id),
            None => {}
        }
    }

    /// Renders the screen for a map id that no longer exists.
    pub fn show_map_not_found(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() / 3.0);
                ui.heading("Map not found");
                ui.add_space(8.0);
                if ui.button("Back to Maps").clicked() {
                    self.show_map_list_screen();
                }
            });
        });
    }

    /// Renders the map detail screen: header, side panel, coordinate list and canvas.
    pub fn show_map_detail(&mut self, ctx: &egui::Context, map_id: &str) {
        let Some(map) = self.store.map(map_id).cloned() else {
            return;
        };

        self.show_header(ctx, &map);
        self.show_status_bar(ctx);
        self.show_sidebar(ctx, &map);
        self.show_coordinate_list(ctx, &map);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let output = MapCanvas::new(
                    &map,
                    self.selected_coordinate.as_deref(),
                    &mut self.canvas,
                    &self.config,
                )
                .full_screen_button(true)
                .show(ui);
                self.apply_canvas_events(output.events);
            });
    }

    /// Renders the canvas over the whole window with a close button.
    pub fn show_full_screen(&mut self, ctx: &egui::Context, map_id: &str) {
        let Some(map) = self.store.map(map_id).cloned() else {
            return;
        };

        egui::TopBottomPanel::top("full_screen_header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong(&map.name);
                if !map.description.is_empty() {
                    ui.weak(&map.description);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("✕ Close").on_hover_text("Close (Esc)").clicked() {
                        self.full_screen = false;
                    }
                });
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let output = MapCanvas::new(
                    &map,
                    self.selected_coordinate.as_deref(),
                    &mut self.canvas,
                    &self.config,
                )
                .show(ui);
                self.apply_canvas_events(output.events);
            });
    }

    fn apply_canvas_events(&mut self, events: Vec<CanvasEvent>) {
        for event in events {
            match event {
                CanvasEvent::SelectionChanged(id) => self.selected_coordinate = id,
                CanvasEvent::FullScreenRequested => self.full_screen = true,
            }
        }
    }

    /// Renders the map name, description and map-level actions.
    fn show_header(&mut self, ctx: &egui::Context, map: &Map) {
        egui::TopBottomPanel::top("map_header").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                if ui.button("← Back").clicked() {
                    self.show_map_list_screen();
                }
                ui.separator();
                ui.heading(&map.name);
                ui.label(format!("{} coordinate(s)", map.coordinates.len()));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Delete").clicked() {
                        self.delete_map(&map.id);
                    }
                    if ui.button("Edit").clicked() {
                        self.dialog = Some(Dialog::Map(MapForm::edit(map)));
                    }
                });
            });
            if !map.description.is_empty() {
                ui.weak(&map.description);
            }
            ui.add_space(4.0);
        });
    }

    /// Renders the bottom status bar with the controls hint.
    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.label("Scroll: Zoom | Drag: Pan | Click: Select | +/-: Zoom | 0: Reset");
        });
    }

    /// Renders the left sidebar with the add form and bulk import.
    fn show_sidebar(&mut self, ctx: &egui::Context, map: &Map) {
        egui::SidePanel::left("sidebar")
            .exact_width(SIDEBAR_WIDTH)
            .resizable(false)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.add_space(4.0);
                    if let Some(coordinate) = self.coordinate_form.show(ui) {
                        let label = coordinate.label.clone();
                        if self.store.add_coordinate(&map.id, coordinate).is_some() {
                            self.notify(ToastKind::Success, format!("Added \"{label}\""));
                        }
                    }

                    ui.add_space(12.0);
                    if ui
                        .add(
                            egui::Button::new("Multi Add Coordinates")
                                .min_size(egui::vec2(ui.available_width(), 0.0)),
                        )
                        .clicked()
                    {
                        self.dialog = Some(Dialog::Import(ImportForm::default()));
                    }

                    ui.add_space(12.0);
                    self.show_selected_coordinate(ui, map);
                });
            });
    }

    fn show_selected_coordinate(&mut self, ui: &mut egui::Ui, map: &Map) {
        let Some(coordinate) = self
            .selected_coordinate
            .as_deref()
            .and_then(|id| map.coordinate(id))
        else {
            return;
        };

        ui.strong("Selected");
        ui.separator();
        egui::Grid::new("selected_coordinate")
            .num_columns(2)
            .show(ui, |ui| {
                ui.label("Label");
                ui.label(&coordinate.label);
                ui.end_row();
                ui.label("Position");
                ui.monospace(format!(
                    "{}, {}, {}",
                    coordinate.x, coordinate.y, coordinate.z
                ));
                ui.end_row();
            });
        if ui.button("Delete coordinate").clicked() {
            self.delete_coordinate(&map.id, &coordinate.id);
        }
    }

    /// Renders the table of all coordinates below the canvas.
    fn show_coordinate_list(&mut self, ctx: &egui::Context, map: &Map) {
        let mut action = None;

        egui::TopBottomPanel::bottom("coordinate_list")
            .resizable(true)
            .default_height(200.0)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                ui.strong(format!("Coordinates ({})", map.coordinates.len()));
                if map.coordinates.is_empty() {
                    ui.weak("No coordinates yet. Add one from the side panel.");
                    return;
                }
                action = coordinate_table(ui, &map.coordinates, self.selected_coordinate.as_deref());
            });

        match action {
            Some(CoordinateAction::Select(id)) => self.selected_coordinate = Some(id),
            Some(CoordinateAction::Delete(id)) => self.delete_coordinate(&map.id, &id),
            None => {}
        }
    }

    /// Renders the open dialog, if any, and applies its outcome.
    pub fn show_dialog(&mut self, ctx: &egui::Context) {
        let action = match &mut self.dialog {
            Some(Dialog::Map(form)) => form.show(ctx),
            Some(Dialog::Import(form)) => form.show(ctx),
            None => return,
        };

        match action {
            DialogAction::None => {}
            DialogAction::Cancel => self.dialog = None,
            DialogAction::Submit => {
                if let Some(dialog) = self.dialog.take() {
                    self.submit_dialog(dialog);
                }
            }
        }
    }

    /// Applies a submitted dialog. Dialogs with unusable input are put back.
    fn submit_dialog(&mut self, dialog: Dialog) {
        match dialog {
            Dialog::Map(form) => {
                let Some(details) = form.details() else {
                    self.dialog = Some(Dialog::Map(form));
                    return;
                };
                match &form.mode {
                    MapFormMode::Create => {
                        let map = self.store.create_map(details);
                        let (id, name) = (map.id.clone(), map.name.clone());
                        log::info!("Created map {id}");
                        self.notify(ToastKind::Success, format!("Created \"{name}\""));
                        self.open_map(id);
                    }
                    MapFormMode::Edit(map_id) => {
                        if self.store.update_map(map_id, details).is_some() {
                            self.notify(ToastKind::Success, "Map updated");
                        }
                    }
                }
            }
            Dialog::Import(form) => self.submit_import(form),
        }
    }

    fn submit_import(&mut self, form: ImportForm) {
        let Screen::MapDetail(map_id) = self.screen.clone() else {
            return;
        };

        if form.text.trim().is_empty() {
            self.notify(ToastKind::Error, "Please enter some coordinates to import");
            self.dialog = Some(Dialog::Import(form));
            return;
        }

        let report = form.report();
        if report.coordinates.is_empty() {
            self.notify(
                ToastKind::Error,
                format!(
                    "No valid coordinates found. Format: {} (one per line)",
                    form.layout.format_hint()
                ),
            );
            self.dialog = Some(Dialog::Import(form));
            return;
        }

        let rejected = report.rejected().count();
        let suspicious = report.suspicious().count();
        let Some(count) = self.store.bulk_import(&map_id, report.coordinates) else {
            return;
        };
        self.notify(ToastKind::Success, format!("Imported {count} coordinate(s)"));
        if rejected + suspicious > 0 {
            self.notify(
                ToastKind::Warning,
                format!("{rejected} line(s) skipped, {suspicious} value(s) look suspicious"),
            );
        }
    }

    fn delete_map(&mut self, map_id: &str) {
        let Some(removed) = self.store.delete_map(map_id) else {
            return;
        };
        self.notify(ToastKind::Success, format!("Deleted \"{}\"", removed.name));
        if self.screen == Screen::MapDetail(map_id.to_owned()) {
            self.show_map_list_screen();
        }
    }

    fn delete_coordinate(&mut self, map_id: &str, coordinate_id: &str) {
        let Some(removed) = self.store.delete_coordinate(map_id, coordinate_id) else {
            return;
        };
        if self.selected_coordinate.as_deref() == Some(coordinate_id) {
            self.selected_coordinate = None;
        }
        self.notify(ToastKind::Success, format!("Deleted \"{}\"", removed.label));
    }
}

fn map_card(ui: &mut egui::Ui, map: &Map) -> Option<MapAction> {
    let mut action = None;

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                let title = egui::RichText::new(&map.name).strong().size(16.0);
                if ui
                    .add(egui::Label::new(title).sense(egui::Sense::click()))
                    .on_hover_cursor(egui::CursorIcon::PointingHand)
                    .clicked()
                {
                    action = Some(MapAction::Open(map.id.clone()));
                }
                if !map.description.is_empty() {
                    ui.label(&map.description);
                }
                let created = map.created_at.format(DATE_FORMAT).unwrap_or_default();
                ui.weak(format!(
                    "{} coordinate(s) | Created {created}",
                    map.coordinates.len()
                ));
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Delete").clicked() {
                    action = Some(MapAction::Delete(map.id.clone()));
                }
                if ui.button("Edit").clicked() {
                    action = Some(MapAction::Edit(map.id.clone()));
                }
                if ui.button("Open").clicked() {
                    action = Some(MapAction::Open(map.id.clone()));
                }
            });
        });
    });

    action
}

fn coordinate_table(
    ui: &mut egui::Ui,
    coordinates: &[Coordinate],
    selected: Option<&str>,
) -> Option<CoordinateAction> {
    let mut action = None;

    TableBuilder::new(ui)
        .striped(true)
        .sense(egui::Sense::click())
        .column(Column::exact(16.0))
        .column(Column::remainder().at_least(120.0))
        .columns(Column::auto().at_least(60.0), 3)
        .column(Column::auto())
        .header(20.0, |mut header| {
            for title in ["", "Label", "X", "Y", "Z", ""] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for coordinate in coordinates {
                body.row(22.0, |mut row| {
                    row.set_selected(selected == Some(coordinate.id.as_str()));
                    row.col(|ui| {
                        let (rect, _) =
                            ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                        ui.painter()
                            .rect_filled(rect, 2.0, colors::marker_fill(coordinate));
                    });
                    row.col(|ui| {
                        ui.label(&coordinate.label);
                    });
                    for value in [coordinate.x, coordinate.y, coordinate.z] {
                        row.col(|ui| {
                            ui.monospace(value.to_string());
                        });
                    }
                    row.col(|ui| {
                        if ui.small_button("Delete").clicked() {
                            action = Some(CoordinateAction::Delete(coordinate.id.clone()));
                        }
                    });
                    if row.response().clicked() && action.is_none() {
                        action = Some(CoordinateAction::Select(coordinate.id.clone()));
                    }
                });
            }
        });

    action
}
