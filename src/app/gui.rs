use std::sync::mpsc::channel;
use std::time::Instant;
use crate::app::{App, FileStatus, Tab};
use crate::app::file_dialogs;
use crate::app::image_processing::{self, Job};
use crate::app::settings::{ConversionMode, ReductionMode};
use crate::utils::format_size;
use egui::{Color32, Frame, ProgressBar, Rounding, Stroke, RichText};

const ACCENT: Color32 = Color32::from_rgb(100, 200, 250);
const MUTED: Color32 = Color32::from_rgb(200, 200, 200);

pub fn render(app: &mut App, ctx: &egui::Context) {
    let frame = Frame {
        fill: Color32::from_rgb(30, 30, 40),
        rounding: Rounding::same(10.0),
        stroke: Stroke::new(1.0, ACCENT),
        inner_margin: egui::style::Margin::same(20.0),
        ..Default::default()
    };

    egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
        ui.heading(RichText::new("Image to SVG Converter").size(28.0).color(ACCENT));
        ui.add_space(10.0);

        ui.horizontal(|ui| {
            ui.selectable_value(&mut app.active_tab, Tab::Main, "Main");
            ui.selectable_value(&mut app.active_tab, Tab::Settings, "Settings");
        });
        ui.separator();
        ui.add_space(10.0);

        match app.active_tab {
            Tab::Main => render_main_tab(app, ui),
            Tab::Settings => render_settings_tab(app, ui),
        }
    });
}

fn render_main_tab(app: &mut App, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            let button_width = 200.0;
            if ui.add_sized([button_width, 30.0], egui::Button::new("Select Input Folder")).clicked() {
                if let Some(dir) = file_dialogs::select_input_folder() {
                    app.log(&format!("Input folder selected: {}", dir.display()));
                    file_dialogs::show_info("Selected Folder", &format!("Input Folder: {}", dir.display()));
                    app.input_dir = Some(dir);
                }
            }

            ui.add_space(10.0);

            ui.group(|ui| {
                ui.set_width(button_width);
                ui.label(RichText::new("Input Folder:").size(16.0).color(ACCENT));
                if let Some(dir) = &app.input_dir {
                    ui.label(dir.to_string_lossy());
                } else {
                    ui.label("Not selected");
                }
            });

            ui.add_space(10.0);

            ui.group(|ui| {
                ui.set_width(button_width);
                ui.label(RichText::new("Processes").size(16.0).color(ACCENT));
                ui.checkbox(&mut app.convert_enabled, "Convert Images to SVG");
                ui.checkbox(&mut app.reduce_enabled, "Reduce SVG Size");
            });

            ui.add_space(10.0);

            // Results
            ui.group(|ui| {
                ui.set_width(button_width);
                ui.label(RichText::new("Results").size(16.0).color(ACCENT));
                match &app.last_summary {
                    Some(summary) => {
                        ui.label(RichText::new(format!("Converted: {}", summary.converted)).color(MUTED));
                        ui.label(RichText::new(format!("Reduced: {}", summary.reduced)).color(MUTED));
                        ui.label(RichText::new(format!("Failed: {}", summary.failed)).color(MUTED));
                        ui.label(RichText::new(format!("Time: {:.2}s", summary.elapsed.as_secs_f64())).color(MUTED));
                    }
                    None => {
                        ui.label(RichText::new("No run yet").color(MUTED));
                    }
                }
            });

            ui.add_space(10.0);

            let running = app.is_running();
            ui.add_enabled_ui(!running, |ui| {
                if ui.add_sized([button_width, 30.0], egui::Button::new("Start")).clicked() {
                    start_process(app);
                }
            });
            ui.add_space(5.0);
            if ui.add_sized([button_width, 30.0], egui::Button::new("View Output Folder")).clicked() {
                view_output_folder(app);
            }
        });

        ui.add_space(10.0);

        // Queued files (scrollable table)
        ui.vertical(|ui| {
            ui.group(|ui| {
                ui.set_min_width(ui.available_width());
                ui.set_min_height(ui.available_height() - 250.0);
                ui.label(RichText::new("Files:").size(16.0).color(ACCENT));

                egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
                    egui::Grid::new("file_details_grid")
                    .num_columns(6)
                    .striped(true)
                    .show(ui, |ui| {
                        ui.label(RichText::new("#").strong());
                        ui.label(RichText::new("Task").strong());
                        ui.label(RichText::new("Name").strong());
                        ui.label(RichText::new("Size").strong());
                        ui.label(RichText::new("Output").strong());
                        ui.label(RichText::new("Status").strong());
                        ui.end_row();

                        for (index, detail) in app.file_details.iter().enumerate() {
                            let text_color = if Some(index) == app.currently_processing {
                                Color32::YELLOW
                            } else {
                                Color32::WHITE
                            };

                            ui.label(RichText::new(format!("{}", index + 1)).color(text_color));
                            ui.label(RichText::new(detail.task.label()).color(text_color));
                            ui.label(RichText::new(&detail.name).color(text_color));
                            ui.label(RichText::new(format_size(detail.original_size)).color(text_color));
                            ui.label(RichText::new(match (&detail.output_name, detail.output_size) {
                                (Some(name), Some(size)) => format!("{} ({})", name, format_size(size)),
                                (Some(name), None) => name.clone(),
                                _ => "-".to_string(),
                            }).color(text_color));

                            let status_color = match detail.status {
                                FileStatus::Queued => text_color,
                                FileStatus::Processing => Color32::YELLOW,
                                FileStatus::Done => Color32::GREEN,
                                FileStatus::Failed => Color32::RED,
                            };
                            let status = ui.label(RichText::new(detail.status.label()).color(status_color));
                            if let Some(error) = &detail.error_message {
                                status.on_hover_text(error.as_str());
                            }
                            ui.end_row();
                        }
                    });
                });
            });
        });
    });

    ui.add_space(20.0);

    // Log with Progress Bar
    ui.group(|ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new("Log").size(16.0).color(ACCENT));

        let progress = &app.conversion_progress;
        if progress.total > 0 {
            let progress_ratio = progress.completed as f32 / progress.total as f32;
            ui.add(ProgressBar::new(progress_ratio).text(format!("{} / {}", progress.completed, progress.total)));
        }
        if let (true, Some(started)) = (app.is_running(), app.conversion_start_time) {
            ui.label(RichText::new(format!("Running for {:.1}s", started.elapsed().as_secs_f64())).color(MUTED));
        }

        egui::ScrollArea::vertical()
            .max_height(200.0)
            .auto_shrink([false; 2])
            .show(ui, |ui| {
            let logs = app.log_messages.lock();
            for log in logs.iter() {
                if log.contains("error") || log.contains("failed") {
                    ui.label(RichText::new(log).color(Color32::RED));
                } else {
                    ui.label(log);
                }
            }
        });
    });
}

fn render_settings_tab(app: &mut App, ui: &mut egui::Ui) {
    ui.group(|ui| {
        ui.set_min_width(ui.available_width());

        ui.label(RichText::new("Conversion Options:").size(16.0).color(ACCENT));
        for mode in ConversionMode::ALL {
            ui.radio_value(&mut app.draft_conversion_mode, mode, mode.label());
        }

        ui.add_space(10.0);

        ui.label(RichText::new("Size Reduction Options:").size(16.0).color(ACCENT));
        for mode in ReductionMode::ALL {
            ui.radio_value(&mut app.draft_reduction_mode, mode, mode.label());
        }
    });

    ui.add_space(10.0);

    ui.group(|ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new("SVG Reduction Scale:").size(16.0).color(ACCENT));
        ui.text_edit_singleline(&mut app.scale_text);
        ui.label(RichText::new(format!("Saved scale: {}", app.settings.reduction_scale)).color(MUTED));
    });

    ui.add_space(10.0);

    if ui.add_sized([200.0, 30.0], egui::Button::new("Save Settings")).clicked() {
        save_settings(app);
    }
}

fn save_settings(app: &mut App) {
    match app.save_settings() {
        Ok(settings) => {
            app.log(&format!(
                "Settings saved: {} / {} / scale {}",
                settings.conversion_mode.label(),
                settings.reduction_mode.label(),
                settings.reduction_scale
            ));
            file_dialogs::show_info("Settings", "Settings saved successfully.");
        }
        Err(e) => {
            app.log(&format!("Settings error: {}", e));
            file_dialogs::show_error("Error", &e.to_string());
        }
    }
}

fn view_output_folder(app: &mut App) {
    let Some(dir) = app.input_dir.clone() else {
        app.log("No output folder to show yet.");
        return;
    };
    if let Err(e) = file_dialogs::open_folder(&dir) {
        app.log(&format!("Opening {} failed: {}", dir.display(), e));
        file_dialogs::show_error("Error", &e.to_string());
    }
}

fn start_process(app: &mut App) {
    if app.is_running() {
        app.log("A run is already in progress.");
        return;
    }

    let job = match Job::new(app.input_dir.as_deref(), app.convert_enabled, app.reduce_enabled, app.settings) {
        Ok(job) => job,
        Err(e) => {
            app.log(&format!("Start error: {}", e));
            file_dialogs::show_error("Error", &e.to_string());
            return;
        }
    };

    app.log("Starting...");
    app.file_details.clear();
    app.conversion_progress.completed = 0;
    app.conversion_progress.total = 0;
    app.currently_processing = None;
    app.conversion_start_time = Some(Instant::now());

    let log_messages = app.log_messages.clone();
    let (sender, receiver) = channel();
    app.conversion_receiver = Some(receiver);

    std::thread::spawn(move || {
        image_processing::process_folder(job, log_messages, sender);
    });
}
