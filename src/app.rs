use crate::auth::{store, CredentialGate, StaticCredentials};
use crate::backend::BackendClient;
use crate::event::AppEvent;
use crate::format::{markup_blocks, MarkupBlock};
use crate::scenario::{ChatActor, Scenario, ScenarioDraft};
use crate::session::Sender;
use crate::state::{Effect, Flow, Panel, View};
use crate::theme::Theme;
use eframe::egui::{self, Align2, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{SystemTime, UNIX_EPOCH};

pub struct RehearseApp {
    rx: Receiver<AppEvent>,
    backend: BackendClient,
    flow: Flow,
    gate: StaticCredentials,
    theme: Theme,
    login_username: String,
    login_password: String,
    chat_input: String,
    form: ScenarioForm,
    alert: Option<String>,
    diagnostics_log: Vec<String>,
    scroll_to_bottom: bool,
}

/// Input buffers behind the add-scenario form. Goal questions are entered
/// one per line.
#[derive(Default)]
struct ScenarioForm {
    id: String,
    title: String,
    initial_facts: String,
    customer_name: String,
    backstory: String,
    tone: String,
    goal_questions: String,
}

impl ScenarioForm {
    fn to_draft(&self) -> ScenarioDraft {
        ScenarioDraft {
            id: self.id.trim().to_string(),
            title: self.title.trim().to_string(),
            initial_facts: self.initial_facts.trim().to_string(),
            chat_actor: ChatActor {
                customer_name: self.customer_name.trim().to_string(),
                backstory: self.backstory.trim().to_string(),
                tone: self.tone.trim().to_string(),
                goal_questions: self
                    .goal_questions
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect(),
            },
        }
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

impl RehearseApp {
    pub fn new(
        rx: Receiver<AppEvent>,
        backend: BackendClient,
        authenticated: bool,
        auth_warning: Option<String>,
    ) -> Self {
        let mut app = Self {
            rx,
            backend,
            flow: Flow::new(authenticated),
            gate: StaticCredentials::default(),
            theme: Theme::default(),
            login_username: String::new(),
            login_password: String::new(),
            chat_input: String::new(),
            form: ScenarioForm::default(),
            alert: None,
            diagnostics_log: Vec::new(),
            scroll_to_bottom: false,
        };

        if let Some(warning) = auth_warning {
            app.log_diagnostic(format!("login flag unreadable: {warning}"));
        }
        if authenticated {
            app.backend.fetch_catalog();
        }

        app
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    fn timestamp() -> String {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_secs().to_string(),
            Err(_) => "0".to_string(),
        }
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log
            .push(format!("[{}] {}", Self::timestamp(), message.into()));
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    self.dispatch(event);
                    ctx.request_repaint();
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn dispatch(&mut self, event: AppEvent) {
        match &event {
            AppEvent::CatalogFailed(message) => {
                self.log_diagnostic(format!("scenario catalog unavailable: {message}"));
            }
            AppEvent::ChatStartFailed { message, .. } | AppEvent::ChatFailed { message, .. } => {
                self.log_diagnostic(format!("chat request failed: {message}"));
            }
            AppEvent::FeedbackFailed(message) => {
                self.log_diagnostic(format!("feedback request failed: {message}"));
            }
            AppEvent::ScenarioAccepted(message) => {
                self.log_diagnostic(format!("scenario saved: {message}"));
            }
            AppEvent::ChatStarted { .. } | AppEvent::ReplyReceived { .. } => {
                self.scroll_to_bottom = true;
            }
            _ => {}
        }

        let accepted_submit = matches!(&event, AppEvent::ScenarioAccepted(_));
        let effects = self.flow.apply(event);
        if accepted_submit {
            self.form.clear();
        }
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::FetchCatalog => self.backend.fetch_catalog(),
            Effect::PersistLogin(authenticated) => {
                if let Err(err) = store::save(authenticated) {
                    self.log_diagnostic(format!("failed to persist login flag: {err}"));
                }
            }
            Effect::StartChat {
                session_id,
                scenario_id,
            } => {
                self.scroll_to_bottom = true;
                self.backend.start_chat(session_id, scenario_id);
            }
            Effect::SendMessage {
                session_id,
                scenario_id,
                message,
            } => {
                self.scroll_to_bottom = true;
                self.backend.send_message(session_id, scenario_id, message);
            }
            Effect::RequestFeedback {
                scenario_id,
                history,
            } => self.backend.request_feedback(scenario_id, history),
            Effect::SubmitScenario(draft) => self.backend.submit_scenario(draft),
            Effect::Alert(message) => self.alert = Some(message),
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context, pending: &mut Vec<AppEvent>) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Rehearse");
                ui.separator();
                if ui.button("Scenarios").clicked() {
                    pending.push(AppEvent::CatalogViewOpened);
                }
                if ui.button("Add scenario").clicked() {
                    pending.push(AppEvent::AddScenarioOpened);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Log out").clicked() {
                        pending.push(AppEvent::LogoutRequested);
                    }
                    if self.flow.waiting() {
                        ui.label(RichText::new("Working...").color(self.theme.text_muted));
                    }
                });
            });
        });
    }

    fn render_diagnostics(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("diagnostics_panel").show(ctx, |ui| {
            egui::CollapsingHeader::new("Diagnostics")
                .default_open(false)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("diagnostics_log")
                        .max_height(90.0)
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for entry in &self.diagnostics_log {
                                ui.label(entry);
                            }
                        });
                });
        });
    }

    fn render_login(&mut self, ctx: &egui::Context, pending: &mut Vec<AppEvent>) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(80.0);
                ui.heading("Rehearse");
                ui.label(
                    RichText::new("Customer service training simulator")
                        .color(self.theme.text_muted),
                );
                ui.add_space(self.theme.spacing_16);

                let card = self.theme.card_frame();
                card.show(ui, |ui| {
                    ui.set_max_width(320.0);
                    ui.label("Username");
                    ui.text_edit_singleline(&mut self.login_username);
                    ui.label("Password");
                    ui.add(egui::TextEdit::singleline(&mut self.login_password).password(true));

                    if let Some(error) = self.flow.login_error() {
                        ui.label(RichText::new(error).color(self.theme.danger));
                    }

                    ui.add_space(self.theme.spacing_8);
                    let submit = ui.button("Sign in").clicked()
                        || ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if submit {
                        let accepted = self
                            .gate
                            .check(self.login_username.trim(), &self.login_password);
                        if accepted {
                            self.login_password.clear();
                        }
                        pending.push(AppEvent::LoginSubmitted { accepted });
                    }
                });
            });
        });
    }

    fn render_main(&mut self, ctx: &egui::Context, pending: &mut Vec<AppEvent>) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Training scenarios");
            ui.separator();

            if self.flow.catalog().is_empty() {
                ui.label(
                    RichText::new("No scenarios available.").color(self.theme.text_muted),
                );
                return;
            }

            ScrollArea::vertical().id_salt("scenario_list").show(ui, |ui| {
                for scenario in self.flow.catalog() {
                    let card = self.theme.card_frame();
                    card.show(ui, |ui| {
                        ui.horizontal(|ui| {
                            if ui.button(&scenario.title).clicked() {
                                pending.push(AppEvent::ScenarioSelected(scenario.id.clone()));
                            }
                            ui.label(
                                RichText::new(format!(
                                    "{} · {}",
                                    scenario.customer_name, scenario.tone
                                ))
                                .color(self.theme.text_muted),
                            );
                        });
                    });
                }
            });
        });
    }

    fn render_detail(
        &mut self,
        ctx: &egui::Context,
        pending: &mut Vec<AppEvent>,
        scenario_id: &str,
        details_visible: bool,
        panel: Panel,
    ) {
        let Some(scenario) = self.flow.scenario(scenario_id).cloned() else {
            // Catalog refresh removed the scenario under us; fall back to the
            // list on the next frame.
            pending.push(AppEvent::CatalogViewOpened);
            return;
        };

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(&scenario.title);
            ui.separator();

            if details_visible {
                self.render_scenario_details(ui, &scenario);
            }

            match panel {
                Panel::None => {
                    ui.add_space(self.theme.spacing_8);
                    ui.horizontal(|ui| {
                        if ui
                            .add_enabled(!self.flow.waiting(), egui::Button::new("Start chat"))
                            .clicked()
                        {
                            pending.push(AppEvent::ChatStartRequested);
                        }
                        if ui
                            .add_enabled(!self.flow.waiting(), egui::Button::new("Get feedback"))
                            .clicked()
                        {
                            pending.push(AppEvent::FeedbackRequested);
                        }
                    });
                }
                Panel::Chat => self.render_chat(ui, pending, &scenario),
                Panel::Feedback => self.render_feedback(ui, pending),
            }
        });
    }

    fn render_scenario_details(&self, ui: &mut egui::Ui, scenario: &Scenario) {
        let card = self.theme.card_frame();
        card.show(ui, |ui| {
            match scenario.initial_facts.heading() {
                Some(heading) => ui.strong(heading),
                None => ui.strong("Initial facts"),
            };
            ui.label(scenario.initial_facts.content());
        });

        let card = self.theme.card_frame();
        card.show(ui, |ui| {
            ui.strong("Customer");
            ui.label(format!("{} — {}", scenario.customer_name, scenario.tone));
            ui.label(&scenario.backstory);
            if !scenario.goal_questions.is_empty() {
                ui.add_space(self.theme.spacing_8);
                ui.strong("Wants answers to");
                for question in &scenario.goal_questions {
                    ui.label(format!("· {question}"));
                }
            }
        });
    }

    fn render_chat(
        &mut self,
        ui: &mut egui::Ui,
        pending: &mut Vec<AppEvent>,
        scenario: &Scenario,
    ) {
        let transcript_height = (ui.available_height() - 140.0).max(120.0);
        ScrollArea::vertical()
            .id_salt("chat_transcript")
            .max_height(transcript_height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for turn in self.flow.transcript() {
                    let label = match turn.sender {
                        Sender::User => format!("[You] {}", turn.text),
                        Sender::Ai => format!("[{}] {}", scenario.customer_name, turn.text),
                    };
                    ui.label(label);
                }

                if self.flow.waiting() {
                    ui.label(
                        RichText::new(format!("{} is typing...", scenario.customer_name))
                            .color(self.theme.text_muted),
                    );
                }

                if self.scroll_to_bottom {
                    ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                }
            });
        self.scroll_to_bottom = false;

        ui.separator();
        let input_enabled = !self.flow.waiting();
        let hint = if input_enabled {
            "Type your reply..."
        } else {
            "Waiting for the customer..."
        };

        let mut send_now = false;
        let composer = self.theme.composer_frame();
        composer.show(ui, |ui| {
            ui.horizontal(|ui| {
                let response = ui.add_enabled(
                    input_enabled,
                    egui::TextEdit::singleline(&mut self.chat_input)
                        .desired_width(f32::INFINITY)
                        .hint_text(hint),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    send_now = true;
                }

                let clicked = ui
                    .add_enabled(
                        input_enabled && !self.chat_input.trim().is_empty(),
                        egui::Button::new("Send"),
                    )
                    .clicked();
                send_now |= clicked;
            });
        });

        if send_now && input_enabled {
            pending.push(AppEvent::MessageSubmitted(self.chat_input.clone()));
            self.chat_input.clear();
        }

        if ui.button("Close chat").clicked() {
            pending.push(AppEvent::ChatClosed);
        }
    }

    fn render_feedback(&mut self, ui: &mut egui::Ui, pending: &mut Vec<AppEvent>) {
        let card = self.theme.card_frame();
        card.show(ui, |ui| {
            ui.strong("Feedback");
            ui.separator();

            if let Some(error) = self.flow.feedback_error() {
                ui.label(RichText::new(error).color(self.theme.danger));
            } else if let Some(markup) = self.flow.feedback_markup() {
                ScrollArea::vertical().id_salt("feedback_body").show(ui, |ui| {
                    for block in markup_blocks(markup) {
                        match block {
                            MarkupBlock::Heading(text) => {
                                ui.add_space(self.theme.spacing_8);
                                ui.heading(
                                    RichText::new(text).color(self.theme.accent_primary),
                                );
                            }
                            MarkupBlock::Paragraph(lines) => {
                                for line in lines {
                                    if line.is_empty() {
                                        ui.add_space(self.theme.spacing_8);
                                    } else {
                                        ui.label(line);
                                    }
                                }
                            }
                        }
                    }
                });
            } else {
                ui.label(
                    RichText::new("Generating feedback...").color(self.theme.text_muted),
                );
            }
        });

        if ui.button("Close feedback").clicked() {
            pending.push(AppEvent::FeedbackClosed);
        }
    }

    fn render_add_scenario(&mut self, ctx: &egui::Context, pending: &mut Vec<AppEvent>) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Add scenario");
            ui.separator();

            ScrollArea::vertical().id_salt("add_scenario_form").show(ui, |ui| {
                let card = self.theme.card_frame();
                card.show(ui, |ui| {
                    ui.label("Scenario id");
                    ui.text_edit_singleline(&mut self.form.id);
                    ui.label("Title");
                    ui.text_edit_singleline(&mut self.form.title);
                    ui.label("Initial facts");
                    ui.text_edit_multiline(&mut self.form.initial_facts);
                });

                let card = self.theme.card_frame();
                card.show(ui, |ui| {
                    ui.strong("Customer persona");
                    ui.label("Name");
                    ui.text_edit_singleline(&mut self.form.customer_name);
                    ui.label("Tone");
                    ui.text_edit_singleline(&mut self.form.tone);
                    ui.label("Backstory");
                    ui.text_edit_multiline(&mut self.form.backstory);
                    ui.label("Goal questions (one per line)");
                    ui.text_edit_multiline(&mut self.form.goal_questions);
                });

                if let Some(notice) = self.flow.form_notice() {
                    ui.label(RichText::new(notice).color(self.theme.danger));
                }

                if ui
                    .add_enabled(!self.flow.waiting(), egui::Button::new("Save scenario"))
                    .clicked()
                {
                    pending.push(AppEvent::ScenarioSubmitted(self.form.to_draft()));
                }
            });
        });
    }

    fn render_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.alert.clone() else {
            return;
        };
        egui::Window::new("Notice")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(self.theme.spacing_8);
                if ui.button("OK").clicked() {
                    self.alert = None;
                }
            });
    }
}

impl eframe::App for RehearseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events(ctx);

        let view = self.flow.view().clone();
        let mut pending: Vec<AppEvent> = Vec::new();

        if view != View::Login {
            self.render_top_bar(ctx, &mut pending);
            self.render_diagnostics(ctx);
        }

        match &view {
            View::Login => self.render_login(ctx, &mut pending),
            View::Main => self.render_main(ctx, &mut pending),
            View::Detail {
                scenario_id,
                details_visible,
                panel,
            } => self.render_detail(ctx, &mut pending, scenario_id, *details_visible, *panel),
            View::AddScenario => self.render_add_scenario(ctx, &mut pending),
        }

        self.render_alert(ctx);

        for event in pending {
            self.dispatch(event);
        }
    }
}
