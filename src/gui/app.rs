use eframe::egui;
use grid_converter::grid_processing::batch::DEFAULT_EXTENSIONS;
use grid_converter::{InputProvider, ResizeFilter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use strum::IntoEnumIterator;

#[path = "app_processing.rs"]
mod app_processing;

/// Settings remembered between sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct GuiSettings {
    pub width: u32,
    pub height: u32,
    pub filter: ResizeFilter,
    pub pretty: bool,
    pub last_source_dir: Option<PathBuf>,
    pub last_output_dir: Option<PathBuf>,
}

impl Default for GuiSettings {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            filter: ResizeFilter::default(),
            pretty: true,
            last_source_dir: None,
            last_output_dir: None,
        }
    }
}

impl GuiSettings {
    fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("grid-converter").join("gui.json"))
    }

    fn load() -> Self {
        Self::path()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default()
    }

    pub(crate) fn save(&self) -> anyhow::Result<()> {
        let path = Self::path().ok_or_else(|| anyhow::anyhow!("No config directory"))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) enum ProgressMessage {
    Progress { current: u32, total: u32 },
    Complete { message: String },
    Error(String),
}

/// Native pickers: file dialogs for paths, the form's fields for the size
pub(crate) struct DialogInputs<'a> {
    pub settings: &'a GuiSettings,
}

impl InputProvider for DialogInputs<'_> {
    fn source_path(&mut self) -> Option<PathBuf> {
        let extensions: Vec<&str> = DEFAULT_EXTENSIONS.split(',').collect();
        let mut dialog = rfd::FileDialog::new()
            .set_title("Select an image file")
            .add_filter("Image files", extensions.as_slice())
            .add_filter("All files", &["*"]);
        if let Some(dir) = &self.settings.last_source_dir {
            dialog = dialog.set_directory(dir);
        }
        dialog.pick_file()
    }

    fn grid_size(&mut self) -> Option<(i64, i64)> {
        Some((
            i64::from(self.settings.width),
            i64::from(self.settings.height),
        ))
    }

    fn destination_path(&mut self, source: &Path, suggested: &Path) -> Option<PathBuf> {
        let directory = self
            .settings
            .last_output_dir
            .as_deref()
            .or_else(|| source.parent())
            .map(Path::to_path_buf);
        let file_name = suggested
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output_grid.json".to_string());

        let mut dialog = rfd::FileDialog::new()
            .set_title("Save grid as")
            .add_filter("JSON", &["json"])
            .set_file_name(file_name);
        if let Some(dir) = directory {
            dialog = dialog.set_directory(dir);
        }
        dialog.save_file()
    }
}

pub struct GridConverterApp {
    settings: GuiSettings,

    // Conversion state
    is_processing: bool,
    progress: f32,
    current_status: String,

    /// Status log, newest last
    log: Vec<String>,

    // Communication channel for background conversion
    progress_receiver: Option<Receiver<ProgressMessage>>,
}

impl GridConverterApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            settings: GuiSettings::load(),
            is_processing: false,
            progress: 0.0,
            current_status: String::new(),
            log: Vec::new(),
            progress_receiver: None,
        }
    }

    /// Append to the status log and echo on stdout
    pub(crate) fn log_line(&mut self, line: impl Into<String>) {
        let line = line.into();
        println!("{}", line);
        self.log.push(line);
    }

    fn render_grid_settings(&mut self, ui: &mut egui::Ui) {
        ui.heading("Grid Settings");
        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Width:");
            ui.add(
                egui::DragValue::new(&mut self.settings.width)
                    .speed(1)
                    .range(1..=4000),
            );
            ui.label("Height:");
            ui.add(
                egui::DragValue::new(&mut self.settings.height)
                    .speed(1)
                    .range(1..=4000),
            );
        });

        ui.horizontal(|ui| {
            ui.label("Resize filter:");
            egui::ComboBox::from_id_salt("resize_filter")
                .selected_text(self.settings.filter.to_string())
                .show_ui(ui, |ui| {
                    for filter in ResizeFilter::iter() {
                        ui.selectable_value(&mut self.settings.filter, filter, filter.to_string());
                    }
                });
        });

        ui.checkbox(&mut self.settings.pretty, "Indent JSON output");

        ui.add_space(10.0);
    }

    fn render_convert_button(&mut self, ui: &mut egui::Ui) {
        ui.separator();

        let button_text = if self.is_processing {
            "Converting..."
        } else {
            "Convert Image..."
        };

        let button = egui::Button::new(button_text).min_size(egui::vec2(200.0, 40.0));

        if ui.add_enabled(!self.is_processing, button).clicked() {
            self.prompt_and_convert();
        }

        ui.add_space(10.0);
    }

    fn render_progress(&mut self, ui: &mut egui::Ui) {
        if self.is_processing {
            ui.label(&self.current_status);
            ui.add(
                egui::ProgressBar::new(self.progress)
                    .show_percentage()
                    .animate(true),
            );
        }

        if !self.log.is_empty() {
            ui.heading("Log");
            ui.separator();
            egui::ScrollArea::vertical()
                .max_height(140.0)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for line in &self.log {
                        ui.label(line);
                    }
                });
        }
    }
}

impl eframe::App for GridConverterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for progress updates from background thread
        self.check_progress();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Grid Converter");
            ui.label("Convert an image into a JSON grid of hex colors");
            ui.add_space(20.0);

            self.render_grid_settings(ui);
            self.render_convert_button(ui);
            self.render_progress(ui);
        });

        if self.is_processing {
            ctx.request_repaint();
        }
    }
}
