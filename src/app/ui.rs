use eframe::egui::{self, Align, Color32, RichText};

use super::state::BatchProgress;
use super::{GraffitiApp, CAPTCHA_PREVIEW_SIZE};

const VK_BLUE: Color32 = Color32::from_rgb(0, 119, 255);
const ERROR_RED: Color32 = Color32::from_rgb(220, 50, 50);
const OK_GREEN: Color32 = Color32::from_rgb(0, 180, 0);

impl GraffitiApp {
    pub fn render(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let total_height = ui.available_height();
            let footer_height = 40.0;
            let footer_margin = 15.0;
            let content_height = total_height - footer_height - footer_margin;

            egui::ScrollArea::vertical()
                .max_height(content_height)
                .show(ui, |ui| {
                    ui.add_space(20.0);
                    ui.vertical_centered(|ui| {
                        ui.heading("VK Graffiti Uploader");
                        ui.add_space(5.0);
                        ui.label(
                            RichText::new("Send images to your own chat as graffiti")
                                .color(ui.visuals().text_color().gamma_multiply(0.7)),
                        );
                        ui.add_space(3.0);
                        ui.label(format!(
                            "{} {}, ID: {}",
                            self.user.first_name, self.user.last_name, self.user.id
                        ));
                    });

                    ui.add_space(20.0);

                    ui.vertical_centered(|ui| {
                        let busy = self.state.is_publishing();
                        ui.add_enabled_ui(!busy, |ui| {
                            let button = egui::Button::new("🖼 Select image(s)")
                                .min_size(egui::vec2(200.0, 40.0));
                            if ui.add(button).clicked() {
                                self.select_files();
                            }
                        });
                    });

                    self.render_captcha(ui);
                    self.render_progress(ui);

                    ui.add_space(20.0);
                });

            ui.with_layout(egui::Layout::bottom_up(Align::Center), |ui| {
                ui.add_space(footer_margin);
                self.render_footer(ui);
            });
        });
    }

    fn render_captcha(&mut self, ui: &mut egui::Ui) {
        if self.state.captcha.is_none() {
            return;
        }
        ui.add_space(20.0);
        ui.group(|ui| {
            ui.vertical_centered(|ui| {
                ui.label("Please enter the captcha to continue:");
                ui.add_space(8.0);
                if let Some(texture) = &self.state.captcha_texture {
                    ui.add(
                        egui::Image::new(texture)
                            .fit_to_exact_size(egui::vec2(CAPTCHA_PREVIEW_SIZE, CAPTCHA_PREVIEW_SIZE)),
                    );
                    ui.add_space(8.0);
                }

                let mut submitted = false;
                if let Some(prompt) = &mut self.state.captcha {
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut prompt.input).hint_text("captcha text"),
                    );
                    submitted =
                        response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                }
                ui.add_space(5.0);
                if ui.button("Submit").clicked() {
                    submitted = true;
                }
                if submitted {
                    self.submit_captcha();
                }
            });
        });
    }

    fn render_progress(&mut self, ui: &mut egui::Ui) {
        if matches!(self.state.progress, BatchProgress::NotStarted) {
            return;
        }
        ui.add_space(20.0);
        ui.group(|ui| {
            let completed = matches!(self.state.progress, BatchProgress::Completed { .. });

            let progress_bar = egui::ProgressBar::new(self.state.get_progress_percentage())
                .show_percentage()
                .animate(false)
                .fill(VK_BLUE);
            ui.add(progress_bar);

            ui.add_space(5.0);
            if completed {
                ui.colored_label(OK_GREEN, self.state.get_status_text());
            } else {
                ui.label(self.state.get_status_text());
            }

            if completed {
                ui.add_space(5.0);
                if ui.link("Open the conversation").clicked() {
                    let url = format!("https://vk.com/im?sel={}", self.user.id);
                    if let Err(e) = open::that(url) {
                        log::warn!("could not open a browser: {e}");
                    }
                }
            }
        });
    }

    fn render_footer(&self, ui: &mut egui::Ui) {
        if let Some(error) = &self.state.error_message {
            ui.add_space(5.0);
            ui.vertical_centered(|ui| {
                ui.colored_label(ERROR_RED, error);
            });
        }
    }
}
