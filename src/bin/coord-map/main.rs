#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod canvas;
mod colors;
mod constants;
mod dialogs;
mod ui;

use canvas::CanvasState;
use clap::Parser;
use constants::{TOAST_ERROR_SECS, TOAST_SUCCESS_SECS, TOAST_WARNING_SECS, WINDOW_SIZE};
use coord_map::{MapDetails, MapStore, ViewConfig, parser};
use dialogs::{CoordinateForm, ImportForm, MapForm};
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(about = "Plot labeled block coordinates on pan/zoom maps")]
struct Args {
    /// RON file overriding canvas tunables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Coordinate text file (label, x, y, z per line) to open as a map
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Name of the seeded map (defaults to the file name)
    #[arg(long, requires = "seed")]
    seed_name: Option<String>,
}

/// Which screen the central area shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    MapList,
    MapDetail(String),
}

/// The single open dialog, if any
pub enum Dialog {
    Map(MapForm),
    Import(ImportForm),
}

/// Main application state for the coordinate map tool.
pub struct CoordMapApp {
    store: MapStore,
    config: ViewConfig,
    screen: Screen,
    selected_coordinate: Option<String>,
    canvas: CanvasState,
    full_screen: bool,
    dialog: Option<Dialog>,
    coordinate_form: CoordinateForm,
    toasts: Toasts,
}

impl CoordMapApp {
    fn new(args: Args) -> Self {
        let toasts = Toasts::new()
            .anchor(egui::Align2::RIGHT_TOP, (-10.0, 10.0))
            .direction(egui::Direction::TopDown);

        let mut app = Self {
            store: MapStore::new(),
            config: ViewConfig::default(),
            screen: Screen::MapList,
            selected_coordinate: None,
            canvas: CanvasState::new(&ViewConfig::default()),
            full_screen: false,
            dialog: None,
            coordinate_form: CoordinateForm::default(),
            toasts,
        };

        if let Some(path) = &args.config {
            match ViewConfig::load(path) {
                Ok(config) => {
                    app.canvas = CanvasState::new(&config);
                    app.config = config;
                }
                Err(err) => {
                    log::warn!("Falling back to default view config: {err}");
                    app.notify(ToastKind::Error, err.to_string());
                }
            }
        }

        if let Some(path) = &args.seed {
            app.seed_from_file(path, args.seed_name.as_deref());
        }

        app
    }

    /// Creates a map from a coordinate text file and opens it.
    fn seed_from_file(&mut self, path: &Path, name: Option<&str>) {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                log::warn!("Failed to read seed file {}: {err}", path.display());
                self.notify(
                    ToastKind::Error,
                    format!("Failed to read {}: {err}", path.display()),
                );
                return;
            }
        };

        let report = parser::parse(&text);
        for warning in &report.warnings {
            log::warn!(
                "{}:{}: {} ({})",
                path.display(),
                warning.line_number,
                warning.issue,
                warning.line
            );
        }

        let fallback = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Imported map".to_owned());
        let details = name
            .and_then(|n| MapDetails::new(n, "").ok())
            .or_else(|| MapDetails::new(&fallback, "").ok());
        let Some(details) = details else {
            self.notify(ToastKind::Error, "Seed map needs a non-empty name");
            return;
        };

        let map_id = self.store.create_map(details).id.clone();
        let count = report.coordinates.len();
        self.store.bulk_import(&map_id, report.coordinates);
        log::info!(
            "Seeded map {map_id} from {} with {count} coordinate(s)",
            path.display()
        );
        self.open_map(map_id);
    }

    /// Shows a transient notification.
    pub fn notify(&mut self, kind: ToastKind, text: impl Into<String>) {
        let seconds = match kind {
            ToastKind::Error => TOAST_ERROR_SECS,
            ToastKind::Warning => TOAST_WARNING_SECS,
            _ => TOAST_SUCCESS_SECS,
        };
        let text: String = text.into();
        self.toasts.add(Toast {
            kind,
            text: text.into(),
            options: ToastOptions::default()
                .duration_in_seconds(seconds)
                .show_icon(true),
            ..Default::default()
        });
    }

    pub fn open_map(&mut self, map_id: String) {
        self.screen = Screen::MapDetail(map_id);
        self.selected_coordinate = None;
        self.full_screen = false;
        self.coordinate_form = CoordinateForm::default();
        self.canvas.reset();
    }

    pub fn show_map_list_screen(&mut self) {
        self.screen = Screen::MapList;
        self.selected_coordinate = None;
        self.full_screen = false;
    }
}

impl eframe::App for CoordMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keyboard_input(ctx);

        match self.screen.clone() {
            Screen::MapList => self.show_map_list(ctx),
            Screen::MapDetail(map_id) => {
                if self.store.map(&map_id).is_none() {
                    self.show_map_not_found(ctx);
                } else if self.full_screen {
                    self.show_full_screen(ctx, &map_id);
                } else {
                    self.show_map_detail(ctx, &map_id);
                }
            }
        }

        self.show_dialog(ctx);
        self.toasts.show(ctx);
    }
}

fn main() -> eframe::Result {
    env_logger::init();
    let args = Args::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(WINDOW_SIZE)
            .with_title("Coord Map"),
        ..Default::default()
    };

    eframe::run_native(
        "Coord Map",
        options,
        Box::new(|_cc| Ok(Box::new(CoordMapApp::new(args)))),
    )
}
