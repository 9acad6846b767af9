use std::sync::{Arc, Mutex};

use anyhow::Context as _;
use eframe::egui;
use lifeline_core::{NavState, SceneController, Story, StoryConfig};

use crate::renderer::{self, Fit};
use crate::theme::ThemeMode;

/// Main application state.
pub struct StoryApp {
    controller: Option<SceneController>,
    nav: Option<NavState>,
    theme_mode: ThemeMode,
    /// Error message to display.
    error: Option<String>,
    /// Outcome of the async dataset load, picked up by the next frame.
    pending_data: PendingLoad,
    loading: bool,
}

type PendingLoad = Arc<Mutex<Option<Result<Vec<u8>, String>>>>;

fn parse_story(data: &[u8]) -> anyhow::Result<Story> {
    Story::from_bytes(data, StoryConfig::default()).context("Failed to load dataset")
}

impl StoryApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let theme_mode = ThemeMode::Dark;
        cc.egui_ctx.set_visuals(theme_mode.visuals());

        // The web build ships the bundled dataset next to the page.
        let app = Self::empty(theme_mode, cfg!(target_arch = "wasm32"));
        #[cfg(target_arch = "wasm32")]
        {
            let pd = Arc::clone(&app.pending_data);
            let ctx = cc.egui_ctx.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = Self::fetch_bytes("assets/life_expectancy.csv").await;
                match &result {
                    Ok(bytes) => web_sys::console::log_1(
                        &format!("lifeline: fetched {} bytes", bytes.len()).into(),
                    ),
                    Err(e) => {
                        web_sys::console::error_1(&format!("lifeline: fetch error: {e}").into());
                    }
                }
                if let Ok(mut lock) = pd.lock() {
                    *lock = Some(result);
                }
                ctx.request_repaint();
            });
        }
        app
    }

    fn empty(theme_mode: ThemeMode, loading: bool) -> Self {
        Self {
            controller: None,
            nav: None,
            theme_mode,
            error: None,
            pending_data: Arc::new(Mutex::new(None)),
            loading,
        }
    }

    /// Apply a finished async load. Either way the spinner stops.
    fn receive(&mut self, result: Result<Vec<u8>, String>) {
        self.loading = false;
        match result {
            Ok(data) => self.load_dataset(&data),
            Err(e) => self.error = Some(format!("Failed to fetch dataset: {e}")),
        }
    }

    fn load_dataset(&mut self, data: &[u8]) {
        match parse_story(data) {
            Ok(story) => {
                tracing::info!(records = story.dataset().len(), "dataset loaded");
                let mut controller = SceneController::new(Arc::new(story));
                self.nav = Some(controller.start());
                self.controller = Some(controller);
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "dataset rejected");
                self.error = Some(format!("{e:#}"));
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    async fn fetch_bytes(url: &str) -> Result<Vec<u8>, String> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen_futures::JsFuture;

        let window = web_sys::window().ok_or("no window")?;
        let resp_value = JsFuture::from(window.fetch_with_str(url))
            .await
            .map_err(|e| format!("{e:?}"))?;
        let resp: web_sys::Response = resp_value.dyn_into().map_err(|_| "not a Response")?;
        if !resp.ok() {
            return Err(format!("HTTP {}", resp.status()));
        }
        let buf = JsFuture::from(resp.array_buffer().map_err(|e| format!("{e:?}"))?)
            .await
            .map_err(|e| format!("{e:?}"))?;
        Ok(js_sys::Uint8Array::new(&buf).to_vec())
    }

    fn toolbar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("lifeline");
            ui.separator();

            #[cfg(not(target_arch = "wasm32"))]
            if ui.button("Open…").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Dataset", &["csv", "json"])
                    .pick_file()
                {
                    match std::fs::read(&path) {
                        Ok(data) => self.load_dataset(&data),
                        Err(e) => self.error = Some(format!("Failed to read file: {e}")),
                    }
                }
            }

            let theme_label = match self.theme_mode {
                ThemeMode::Dark => "☀ Light",
                ThemeMode::Light => "🌙 Dark",
            };
            if ui.button(theme_label).clicked() {
                self.theme_mode = self.theme_mode.toggled();
                ctx.set_visuals(self.theme_mode.visuals());
            }

            if let Some(nav) = &self.nav {
                ui.separator();
                ui.label(egui::RichText::new(&nav.title).strong());
            }
        });
    }

    fn navigation(&mut self, ui: &mut egui::Ui) {
        let (Some(controller), Some(nav)) = (self.controller.as_mut(), self.nav.as_ref()) else {
            return;
        };
        let count = controller.storyline().len();
        let mut next = None;
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!nav.back_disabled, egui::Button::new("◀ Back"))
                .clicked()
            {
                next = Some(controller.retreat());
            }
            ui.label(format!("{} / {count}", nav.slide + 1));
            if ui
                .add_enabled(!nav.next_disabled, egui::Button::new("Next ▶"))
                .clicked()
            {
                next = Some(controller.advance());
            }
        });
        if next.is_some() {
            self.nav = next;
        }
    }

    fn story_canvas(&mut self, ui: &mut egui::Ui) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        let viewport = controller.story().viewport();
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let fit = Fit::new(&viewport, response.rect);
        let story_rect = fit.rect(&viewport);

        match response.hover_pos().filter(|p| story_rect.contains(*p)) {
            Some(pos) => {
                controller.pointer_moved(fit.to_story(pos));
            }
            None => {
                controller.pointer_left();
            }
        }
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Some(nav) = controller.click(fit.to_story(pos)) {
                    self.nav = Some(nav);
                }
            }
        }

        painter.rect_filled(
            story_rect,
            egui::CornerRadius::ZERO,
            crate::theme::resolve(lifeline_protocol::ThemeToken::Background, self.theme_mode),
        );
        renderer::render_commands(&painter, &controller.commands(), fit, self.theme_mode);
    }
}

impl eframe::App for StoryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let pending = {
            let mut lock = self.pending_data.lock().unwrap_or_else(|e| e.into_inner());
            lock.take()
        };
        if let Some(result) = pending {
            self.receive(result);
        }

        let dropped = ctx.input(|i| {
            i.raw
                .dropped_files
                .first()
                .and_then(|f| f.bytes.as_ref().map(|b| b.to_vec()))
        });
        if let Some(data) = dropped {
            self.load_dataset(&data);
        }

        if let Some(controller) = self.controller.as_mut() {
            let (left, right) = ctx.input(|i| {
                (
                    i.key_pressed(egui::Key::ArrowLeft),
                    i.key_pressed(egui::Key::ArrowRight),
                )
            });
            if left {
                self.nav = Some(controller.retreat());
            } else if right {
                self.nav = Some(controller.advance());
            }
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ctx, ui));
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            self.navigation(ui);
            if let Some(err) = &self.error {
                ui.colored_label(ui.visuals().error_fg_color, err);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.controller.is_some() {
                self.story_canvas(ui);
            } else {
                ui.centered_and_justified(|ui| {
                    if self.loading {
                        ui.spinner();
                    } else {
                        ui.label("Open or drop a life-expectancy CSV (country,year,life_expectancy)");
                    }
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &[u8] = b"country,year,life_expectancy\nChina,1960,44.0\nJapan,1960,68.0\n";

    #[test]
    fn failed_fetch_stops_loading_and_shows_error() {
        let mut app = StoryApp::empty(ThemeMode::Dark, true);
        app.receive(Err("HTTP 404".into()));
        assert!(!app.loading);
        assert!(app.controller.is_none());
        assert_eq!(
            app.error.as_deref(),
            Some("Failed to fetch dataset: HTTP 404")
        );
    }

    #[test]
    fn fetched_bytes_start_the_story() {
        let mut app = StoryApp::empty(ThemeMode::Dark, true);
        app.receive(Ok(CSV.to_vec()));
        assert!(!app.loading);
        assert!(app.error.is_none());
        assert_eq!(app.nav.as_ref().map(|n| n.slide), Some(0));
    }

    #[test]
    fn rejected_dataset_keeps_the_cause() {
        let mut app = StoryApp::empty(ThemeMode::Light, false);
        app.load_dataset(b"country,year\nChad,1960\n");
        let err = app.error.unwrap_or_default();
        assert!(err.starts_with("Failed to load dataset: "));
        assert!(app.controller.is_none());
    }
}
