// Conversion flow for the GUI
// Prompts run on the UI thread; the conversion itself runs in a background thread.

use super::{DialogInputs, GridConverterApp, ProgressMessage};
use grid_converter::utils::format_duration;
use grid_converter::{collect_request, ConversionConfig, ConversionRequest, GridConverter};
use std::sync::mpsc::{channel, Receiver, TryRecvError};

fn show_dialog(level: rfd::MessageLevel, title: &str, description: &str) {
    rfd::MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(description)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

/// Pending messages, and whether the worker hung up without a final message
fn drain_messages(receiver: &Receiver<ProgressMessage>) -> (Vec<ProgressMessage>, bool) {
    let mut messages = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(msg) => messages.push(msg),
            Err(TryRecvError::Empty) => return (messages, false),
            Err(TryRecvError::Disconnected) => {
                let finished = messages.iter().any(|m| {
                    matches!(
                        m,
                        ProgressMessage::Complete { .. } | ProgressMessage::Error(_)
                    )
                });
                return (messages, !finished);
            }
        }
    }
}

impl GridConverterApp {
    /// Ask for source and destination, then start converting
    pub(crate) fn prompt_and_convert(&mut self) {
        let request = {
            let mut inputs = DialogInputs {
                settings: &self.settings,
            };
            collect_request(&mut inputs)
        };

        match request {
            Some(request) => self.start_conversion(request),
            None => self.log_line("Cancelled: no file selected"),
        }
    }

    fn start_conversion(&mut self, request: ConversionRequest) {
        self.settings.last_source_dir = request.source.parent().map(|p| p.to_path_buf());
        self.settings.last_output_dir = request.destination.parent().map(|p| p.to_path_buf());
        if let Err(e) = self.settings.save() {
            self.log_line(format!("Could not save settings: {}", e));
        }

        self.is_processing = true;
        self.progress = 0.0;
        self.current_status = format!("Converting {}", request.source.display());
        self.log_line(format!(
            "Converting '{}' to {}x{} grid",
            request.source.display(),
            request.width,
            request.height
        ));

        let (tx, rx) = channel();
        self.progress_receiver = Some(rx);

        let converter = GridConverter::new(ConversionConfig {
            filter: self.settings.filter,
            pretty: self.settings.pretty,
        });

        std::thread::spawn(move || {
            let progress_tx = tx.clone();
            let result = converter.convert_file(
                &request.source,
                &request.destination,
                request.width,
                request.height,
                |current, total| {
                    let _ = progress_tx.send(ProgressMessage::Progress { current, total });
                },
            );

            let message = match result {
                Ok(outcome) => ProgressMessage::Complete {
                    message: format!(
                        "Successfully converted '{}' to '{}' in {}",
                        outcome.source.display(),
                        outcome.destination.display(),
                        format_duration(outcome.elapsed)
                    ),
                },
                Err(e) => ProgressMessage::Error(e.to_string()),
            };
            let _ = tx.send(message);
        });
    }

    /// Check for progress updates from the background thread
    pub(crate) fn check_progress(&mut self) {
        let (messages, worker_lost) = match self.progress_receiver {
            Some(ref receiver) => drain_messages(receiver),
            None => return,
        };

        for msg in messages {
            match msg {
                ProgressMessage::Progress { current, total } => {
                    if total > 0 {
                        self.progress = current as f32 / total as f32;
                    }
                }
                ProgressMessage::Complete { message } => {
                    self.is_processing = false;
                    self.progress_receiver = None;
                    self.log_line(message.clone());
                    show_dialog(rfd::MessageLevel::Info, "Success", &message);
                }
                ProgressMessage::Error(err) => {
                    self.is_processing = false;
                    self.progress_receiver = None;
                    self.log_line(format!("Error: {}", err));
                    show_dialog(rfd::MessageLevel::Error, "Error", &err);
                }
            }
        }

        if worker_lost {
            self.is_processing = false;
            self.progress_receiver = None;
            let err = "Conversion stopped unexpectedly";
            self.log_line(format!("Error: {}", err));
            show_dialog(rfd::MessageLevel::Error, "Error", err);
        }
    }
}
