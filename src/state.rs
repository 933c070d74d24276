use crate::event::AppEvent;
use crate::format::format_feedback;
use crate::scenario::{Scenario, ScenarioDraft};
use crate::session::{ChatSession, ConversationTurn};

// Shown in the transcript when a chat request fails. Same wording the
// backend uses when its own upstream is unreachable.
const APOLOGY: &str =
    "I'm sorry, I'm having trouble connecting to the AI right now. Please try again later.";

/// Which screen is active. Exactly one at a time; the chat and feedback
/// panels are a single `Panel` slot inside `Detail`, so they can never be
/// open together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Login,
    Main,
    Detail {
        scenario_id: String,
        details_visible: bool,
        panel: Panel,
    },
    AddScenario,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    None,
    Chat,
    Feedback,
}

/// Work the app must perform after a transition. The state machine never
/// touches the network or the disk itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchCatalog,
    PersistLogin(bool),
    StartChat {
        session_id: String,
        scenario_id: String,
    },
    SendMessage {
        session_id: String,
        scenario_id: String,
        message: String,
    },
    RequestFeedback {
        scenario_id: String,
        history: Vec<ConversationTurn>,
    },
    SubmitScenario(ScenarioDraft),
    Alert(String),
}

/// The view/session state machine. All mutable client state lives here and
/// is only ever touched through [`Flow::apply`].
pub struct Flow {
    view: View,
    session: ChatSession,
    catalog: Vec<Scenario>,
    waiting: bool,
    login_error: Option<String>,
    feedback_markup: Option<String>,
    feedback_error: Option<String>,
    form_notice: Option<String>,
}

impl Flow {
    pub fn new(authenticated: bool) -> Self {
        Self {
            view: if authenticated { View::Main } else { View::Login },
            session: ChatSession::new(),
            catalog: Vec::new(),
            waiting: false,
            login_error: None,
            feedback_markup: None,
            feedback_error: None,
            form_notice: None,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn catalog(&self) -> &[Scenario] {
        &self.catalog
    }

    pub fn scenario(&self, id: &str) -> Option<&Scenario> {
        self.catalog.iter().find(|scenario| scenario.id == id)
    }

    pub fn transcript(&self) -> &[ConversationTurn] {
        self.session.transcript()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.id()
    }

    pub fn waiting(&self) -> bool {
        self.waiting
    }

    pub fn login_error(&self) -> Option<&str> {
        self.login_error.as_deref()
    }

    pub fn feedback_markup(&self) -> Option<&str> {
        self.feedback_markup.as_deref()
    }

    pub fn feedback_error(&self) -> Option<&str> {
        self.feedback_error.as_deref()
    }

    pub fn form_notice(&self) -> Option<&str> {
        self.form_notice.as_deref()
    }

    /// The single transition function: mutates the state and returns the
    /// effects the caller must run. Events that do not apply to the current
    /// view fall through without changing anything.
    pub fn apply(&mut self, event: AppEvent) -> Vec<Effect> {
        match event {
            AppEvent::LoginSubmitted { accepted } => self.on_login(accepted),
            AppEvent::LogoutRequested => self.on_logout(),
            AppEvent::ScenarioSelected(id) => self.on_scenario_selected(id),
            AppEvent::ChatStartRequested => self.on_chat_start(),
            AppEvent::ChatClosed => self.on_chat_closed(),
            AppEvent::MessageSubmitted(text) => self.on_message(text),
            AppEvent::FeedbackRequested => self.on_feedback_requested(),
            AppEvent::FeedbackClosed => self.on_feedback_closed(),
            AppEvent::AddScenarioOpened => self.on_add_scenario_opened(),
            AppEvent::CatalogViewOpened => self.on_catalog_view_opened(),
            AppEvent::ScenarioSubmitted(draft) => self.on_scenario_submitted(draft),
            AppEvent::CatalogLoaded(list) => {
                self.catalog = list;
                Vec::new()
            }
            AppEvent::CatalogFailed(_) => Vec::new(),
            AppEvent::ChatStarted { session_id, text } => self.on_chat_started(session_id, text),
            AppEvent::ChatStartFailed { session_id, .. } => self.on_chat_start_failed(session_id),
            AppEvent::ReplyReceived { session_id, text } => self.on_reply(session_id, text),
            AppEvent::ChatFailed { session_id, .. } => self.on_chat_failed(session_id),
            AppEvent::FeedbackReady(text) => self.on_feedback_ready(text),
            AppEvent::FeedbackFailed(message) => self.on_feedback_failed(message),
            AppEvent::ScenarioAccepted(_) => self.on_scenario_accepted(),
            AppEvent::ScenarioRejected(message) => self.on_scenario_rejected(message),
        }
    }

    fn on_login(&mut self, accepted: bool) -> Vec<Effect> {
        if self.view != View::Login {
            return Vec::new();
        }
        if !accepted {
            self.login_error = Some("Invalid username or password.".to_string());
            return Vec::new();
        }
        self.login_error = None;
        self.view = View::Main;
        vec![Effect::PersistLogin(true), Effect::FetchCatalog]
    }

    fn on_logout(&mut self) -> Vec<Effect> {
        if self.view == View::Login {
            return Vec::new();
        }
        self.view = View::Login;
        self.session.reset();
        self.waiting = false;
        self.feedback_markup = None;
        self.feedback_error = None;
        self.form_notice = None;
        vec![Effect::PersistLogin(false)]
    }

    fn on_scenario_selected(&mut self, id: String) -> Vec<Effect> {
        if self.view != View::Main || self.scenario(&id).is_none() {
            return Vec::new();
        }
        self.session.reset();
        self.feedback_markup = None;
        self.feedback_error = None;
        self.view = View::Detail {
            scenario_id: id,
            details_visible: true,
            panel: Panel::None,
        };
        Vec::new()
    }

    fn on_chat_start(&mut self) -> Vec<Effect> {
        if self.waiting {
            return Vec::new();
        }
        let View::Detail {
            scenario_id,
            details_visible,
            panel,
        } = &mut self.view
        else {
            return Vec::new();
        };
        if *panel != Panel::None {
            return Vec::new();
        }
        let session_id = self.session.start();
        *panel = Panel::Chat;
        *details_visible = false;
        self.waiting = true;
        vec![Effect::StartChat {
            session_id,
            scenario_id: scenario_id.clone(),
        }]
    }

    fn on_chat_closed(&mut self) -> Vec<Effect> {
        let View::Detail {
            details_visible,
            panel,
            ..
        } = &mut self.view
        else {
            return Vec::new();
        };
        if *panel != Panel::Chat {
            return Vec::new();
        }
        *panel = Panel::None;
        *details_visible = true;
        self.waiting = false;
        Vec::new()
    }

    fn on_message(&mut self, text: String) -> Vec<Effect> {
        if self.waiting {
            return Vec::new();
        }
        let View::Detail {
            scenario_id, panel, ..
        } = &self.view
        else {
            return Vec::new();
        };
        if *panel != Panel::Chat {
            return Vec::new();
        }
        let message = text.trim().to_string();
        if message.is_empty() {
            return Vec::new();
        }
        let scenario_id = scenario_id.clone();
        let session_id = self.session.ensure_started();
        self.session.push_user(message.clone());
        self.waiting = true;
        vec![Effect::SendMessage {
            session_id,
            scenario_id,
            message,
        }]
    }

    fn on_feedback_requested(&mut self) -> Vec<Effect> {
        let View::Detail {
            scenario_id, panel, ..
        } = &mut self.view
        else {
            return vec![Effect::Alert("Please select a scenario first.".to_string())];
        };
        if *panel == Panel::Chat {
            return Vec::new();
        }
        if self.session.is_empty() {
            return vec![Effect::Alert(
                "Chat with the customer before requesting feedback.".to_string(),
            )];
        }
        *panel = Panel::Feedback;
        let scenario_id = scenario_id.clone();
        self.feedback_markup = None;
        self.feedback_error = None;
        self.waiting = true;
        vec![Effect::RequestFeedback {
            scenario_id,
            history: self.session.transcript().to_vec(),
        }]
    }

    fn on_feedback_closed(&mut self) -> Vec<Effect> {
        let View::Detail { panel, .. } = &self.view else {
            return Vec::new();
        };
        if *panel != Panel::Feedback {
            return Vec::new();
        }
        self.view = View::Main;
        self.feedback_markup = None;
        self.feedback_error = None;
        self.waiting = false;
        Vec::new()
    }

    fn on_add_scenario_opened(&mut self) -> Vec<Effect> {
        if self.view != View::Main {
            return Vec::new();
        }
        self.view = View::AddScenario;
        self.form_notice = None;
        Vec::new()
    }

    fn on_catalog_view_opened(&mut self) -> Vec<Effect> {
        match &self.view {
            View::AddScenario => {}
            // Leaving a scenario is allowed once the chat panel is closed.
            View::Detail { panel, .. } if *panel != Panel::Chat => {
                self.feedback_markup = None;
                self.feedback_error = None;
                self.waiting = false;
            }
            _ => return Vec::new(),
        }
        self.view = View::Main;
        Vec::new()
    }

    fn on_scenario_submitted(&mut self, draft: ScenarioDraft) -> Vec<Effect> {
        if self.view != View::AddScenario || self.waiting {
            return Vec::new();
        }
        if draft.id.trim().is_empty() || draft.title.trim().is_empty() {
            return vec![Effect::Alert(
                "Scenario id and title are required.".to_string(),
            )];
        }
        self.form_notice = None;
        self.waiting = true;
        vec![Effect::SubmitScenario(draft)]
    }

    fn on_chat_started(&mut self, session_id: String, text: String) -> Vec<Effect> {
        if !self.session.matches(&session_id) {
            return Vec::new();
        }
        self.session.push_ai(text);
        self.waiting = false;
        Vec::new()
    }

    fn on_chat_start_failed(&mut self, session_id: String) -> Vec<Effect> {
        if !self.session.matches(&session_id) {
            return Vec::new();
        }
        self.session.push_ai(APOLOGY);
        self.waiting = false;
        if let View::Detail {
            details_visible,
            panel,
            ..
        } = &mut self.view
        {
            if *panel == Panel::Chat {
                *panel = Panel::None;
                *details_visible = true;
            }
        }
        Vec::new()
    }

    fn on_reply(&mut self, session_id: String, text: String) -> Vec<Effect> {
        if !self.session.matches(&session_id) {
            return Vec::new();
        }
        self.session.push_ai(text);
        self.waiting = false;
        Vec::new()
    }

    fn on_chat_failed(&mut self, session_id: String) -> Vec<Effect> {
        if !self.session.matches(&session_id) {
            return Vec::new();
        }
        self.session.push_ai(APOLOGY);
        self.waiting = false;
        Vec::new()
    }

    fn on_feedback_ready(&mut self, text: String) -> Vec<Effect> {
        let View::Detail { panel, .. } = &self.view else {
            return Vec::new();
        };
        if *panel != Panel::Feedback {
            return Vec::new();
        }
        self.feedback_markup = Some(format_feedback(&text));
        self.waiting = false;
        Vec::new()
    }

    fn on_feedback_failed(&mut self, message: String) -> Vec<Effect> {
        let View::Detail { panel, .. } = &self.view else {
            return Vec::new();
        };
        if *panel != Panel::Feedback {
            return Vec::new();
        }
        self.feedback_error = Some(message);
        self.waiting = false;
        Vec::new()
    }

    fn on_scenario_accepted(&mut self) -> Vec<Effect> {
        if self.view != View::AddScenario {
            return Vec::new();
        }
        self.view = View::Main;
        self.waiting = false;
        vec![Effect::FetchCatalog]
    }

    fn on_scenario_rejected(&mut self, message: String) -> Vec<Effect> {
        if self.view != View::AddScenario {
            return Vec::new();
        }
        self.form_notice = Some(message);
        self.waiting = false;
        Vec::new()
    }

    #[cfg(test)]
    fn open_chat_without_session(&mut self, scenario_id: &str) {
        self.session.reset();
        self.view = View::Detail {
            scenario_id: scenario_id.to_string(),
            details_visible: false,
            panel: Panel::Chat,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::{Effect, Flow, Panel, View};
    use crate::event::AppEvent;
    use crate::scenario::{ChatActor, InitialFacts, Scenario, ScenarioDraft};
    use crate::session::Sender;

    fn scenario(id: &str, title: &str) -> Scenario {
        Scenario {
            id: id.to_string(),
            title: title.to_string(),
            initial_facts: InitialFacts::Text(format!("Facts for {title}.")),
            customer_name: "Alice".to_string(),
            backstory: "Bought a router.".to_string(),
            tone: "polite".to_string(),
            goal_questions: vec!["How do I connect it?".to_string()],
        }
    }

    fn draft(id: &str, title: &str) -> ScenarioDraft {
        ScenarioDraft {
            id: id.to_string(),
            title: title.to_string(),
            initial_facts: "Facts.".to_string(),
            chat_actor: ChatActor {
                customer_name: "Bob".to_string(),
                backstory: "Story.".to_string(),
                tone: "neutral".to_string(),
                goal_questions: Vec::new(),
            },
        }
    }

    fn logged_in() -> Flow {
        let mut flow = Flow::new(false);
        flow.apply(AppEvent::LoginSubmitted { accepted: true });
        flow.apply(AppEvent::CatalogLoaded(vec![
            scenario("a", "Scenario A"),
            scenario("b", "Scenario B"),
        ]));
        flow
    }

    fn panel_of(flow: &Flow) -> Panel {
        match flow.view() {
            View::Detail { panel, .. } => *panel,
            other => panic!("expected detail view, got {other:?}"),
        }
    }

    fn start_chat(flow: &mut Flow) -> String {
        let effects = flow.apply(AppEvent::ChatStartRequested);
        match effects.as_slice() {
            [Effect::StartChat { session_id, .. }] => session_id.clone(),
            other => panic!("expected a start-chat effect, got {other:?}"),
        }
    }

    #[test]
    fn accepted_login_persists_flag_and_fetches_catalog() {
        let mut flow = Flow::new(false);
        let effects = flow.apply(AppEvent::LoginSubmitted { accepted: true });
        assert_eq!(
            effects,
            vec![Effect::PersistLogin(true), Effect::FetchCatalog]
        );
        assert_eq!(*flow.view(), View::Main);
        assert!(flow.login_error().is_none());
    }

    #[test]
    fn rejected_login_shows_inline_error_only() {
        let mut flow = Flow::new(false);
        let effects = flow.apply(AppEvent::LoginSubmitted { accepted: false });
        assert!(effects.is_empty());
        assert_eq!(*flow.view(), View::Login);
        assert!(flow.login_error().is_some());
    }

    #[test]
    fn logout_clears_persisted_flag_and_session() {
        let mut flow = logged_in();
        flow.apply(AppEvent::ScenarioSelected("a".to_string()));
        start_chat(&mut flow);
        let effects = flow.apply(AppEvent::LogoutRequested);
        assert_eq!(effects, vec![Effect::PersistLogin(false)]);
        assert_eq!(*flow.view(), View::Login);
        assert!(flow.session_id().is_none());
        assert!(flow.transcript().is_empty());
    }

    #[test]
    fn selecting_a_scenario_resets_the_session() {
        let mut flow = logged_in();
        flow.apply(AppEvent::ScenarioSelected("a".to_string()));
        assert_eq!(
            *flow.view(),
            View::Detail {
                scenario_id: "a".to_string(),
                details_visible: true,
                panel: Panel::None,
            }
        );
        assert!(flow.session_id().is_none());
        assert!(flow.transcript().is_empty());
    }

    #[test]
    fn selecting_an_unknown_scenario_is_a_no_op() {
        let mut flow = logged_in();
        assert!(flow.apply(AppEvent::ScenarioSelected("nope".to_string())).is_empty());
        assert_eq!(*flow.view(), View::Main);
    }

    #[test]
    fn starting_chat_issues_a_fresh_session_each_time() {
        let mut flow = logged_in();
        flow.apply(AppEvent::ScenarioSelected("a".to_string()));

        let first = start_chat(&mut flow);
        assert!(flow.transcript().is_empty());
        assert_eq!(flow.session_id(), Some(first.as_str()));

        flow.apply(AppEvent::ChatStarted {
            session_id: first.clone(),
            text: "Hi, I need help.".to_string(),
        });
        assert_eq!(flow.transcript().len(), 1);

        flow.apply(AppEvent::ChatClosed);
        let second = start_chat(&mut flow);
        assert_ne!(first, second);
        assert!(flow.transcript().is_empty());
    }

    #[test]
    fn closing_chat_reveals_details_and_keeps_transcript() {
        let mut flow = logged_in();
        flow.apply(AppEvent::ScenarioSelected("a".to_string()));
        let sid = start_chat(&mut flow);
        flow.apply(AppEvent::ChatStarted {
            session_id: sid,
            text: "Hello.".to_string(),
        });
        flow.apply(AppEvent::ChatClosed);
        assert_eq!(
            *flow.view(),
            View::Detail {
                scenario_id: "a".to_string(),
                details_visible: true,
                panel: Panel::None,
            }
        );
        assert_eq!(flow.transcript().len(), 1);
    }

    #[test]
    fn sending_a_message_appends_user_turn_and_requests_reply() {
        let mut flow = logged_in();
        flow.apply(AppEvent::ScenarioSelected("a".to_string()));
        let sid = start_chat(&mut flow);
        flow.apply(AppEvent::ChatStarted {
            session_id: sid.clone(),
            text: "Hi.".to_string(),
        });

        let effects = flow.apply(AppEvent::MessageSubmitted("  How can I help?  ".to_string()));
        assert_eq!(
            effects,
            vec![Effect::SendMessage {
                session_id: sid,
                scenario_id: "a".to_string(),
                message: "How can I help?".to_string(),
            }]
        );
        let last = flow.transcript().last().expect("turn should be appended");
        assert_eq!(last.sender, Sender::User);
        assert_eq!(last.text, "How can I help?");
    }

    #[test]
    fn empty_message_is_a_no_op() {
        let mut flow = logged_in();
        flow.apply(AppEvent::ScenarioSelected("a".to_string()));
        let sid = start_chat(&mut flow);
        flow.apply(AppEvent::ChatStarted {
            session_id: sid,
            text: "Hi.".to_string(),
        });
        let before = flow.transcript().len();
        assert!(flow.apply(AppEvent::MessageSubmitted("   ".to_string())).is_empty());
        assert_eq!(flow.transcript().len(), before);
    }

    #[test]
    fn first_send_lazily_creates_a_session() {
        let mut flow = logged_in();
        flow.open_chat_without_session("a");
        let effects = flow.apply(AppEvent::MessageSubmitted("Hello?".to_string()));
        let sid = flow.session_id().expect("session should exist").to_string();
        assert_eq!(
            effects,
            vec![Effect::SendMessage {
                session_id: sid,
                scenario_id: "a".to_string(),
                message: "Hello?".to_string(),
            }]
        );
    }

    #[test]
    fn waiting_blocks_a_second_request() {
        let mut flow = logged_in();
        flow.apply(AppEvent::ScenarioSelected("a".to_string()));
        start_chat(&mut flow);
        assert!(flow.waiting());
        assert!(flow.apply(AppEvent::MessageSubmitted("hi".to_string())).is_empty());
    }

    #[test]
    fn stale_replies_are_discarded() {
        let mut flow = logged_in();
        flow.apply(AppEvent::ScenarioSelected("a".to_string()));
        start_chat(&mut flow);
        let before = flow.transcript().len();
        assert!(flow
            .apply(AppEvent::ReplyReceived {
                session_id: "some-older-session".to_string(),
                text: "late reply".to_string(),
            })
            .is_empty());
        assert_eq!(flow.transcript().len(), before);
    }

    #[test]
    fn chat_failure_appends_apology_and_keeps_chat_open() {
        let mut flow = logged_in();
        flow.apply(AppEvent::ScenarioSelected("a".to_string()));
        let sid = start_chat(&mut flow);
        flow.apply(AppEvent::ChatStarted {
            session_id: sid.clone(),
            text: "Hi.".to_string(),
        });
        flow.apply(AppEvent::MessageSubmitted("hello".to_string()));
        flow.apply(AppEvent::ChatFailed {
            session_id: sid,
            message: "boom".to_string(),
        });
        assert_eq!(panel_of(&flow), Panel::Chat);
        assert!(!flow.waiting());
        let last = flow.transcript().last().expect("apology should be appended");
        assert_eq!(last.sender, Sender::Ai);
        assert!(last.text.contains("trouble connecting"));
    }

    #[test]
    fn start_failure_reshows_the_start_button() {
        let mut flow = logged_in();
        flow.apply(AppEvent::ScenarioSelected("a".to_string()));
        let sid = start_chat(&mut flow);
        flow.apply(AppEvent::ChatStartFailed {
            session_id: sid,
            message: "503".to_string(),
        });
        assert_eq!(
            *flow.view(),
            View::Detail {
                scenario_id: "a".to_string(),
                details_visible: true,
                panel: Panel::None,
            }
        );
        assert!(!flow.waiting());
        assert_eq!(flow.transcript().len(), 1);
    }

    #[test]
    fn feedback_with_empty_transcript_never_reaches_the_network() {
        let mut flow = logged_in();
        flow.apply(AppEvent::ScenarioSelected("a".to_string()));
        let effects = flow.apply(AppEvent::FeedbackRequested);
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], Effect::Alert(_)));
        assert_eq!(panel_of(&flow), Panel::None);
    }

    #[test]
    fn feedback_outside_a_scenario_alerts() {
        let mut flow = logged_in();
        let effects = flow.apply(AppEvent::FeedbackRequested);
        assert!(matches!(effects.as_slice(), [Effect::Alert(_)]));
    }

    #[test]
    fn feedback_request_carries_the_entire_transcript() {
        let mut flow = logged_in();
        flow.apply(AppEvent::ScenarioSelected("a".to_string()));
        let sid = start_chat(&mut flow);
        flow.apply(AppEvent::ChatStarted {
            session_id: sid.clone(),
            text: "Hi, my router is broken.".to_string(),
        });
        flow.apply(AppEvent::MessageSubmitted("Let me help.".to_string()));
        flow.apply(AppEvent::ReplyReceived {
            session_id: sid,
            text: "Thank you.".to_string(),
        });
        flow.apply(AppEvent::ChatClosed);

        let effects = flow.apply(AppEvent::FeedbackRequested);
        match effects.as_slice() {
            [Effect::RequestFeedback {
                scenario_id,
                history,
            }] => {
                assert_eq!(scenario_id, "a");
                assert_eq!(history.len(), 3);
            }
            other => panic!("expected a feedback request, got {other:?}"),
        }
        assert_eq!(panel_of(&flow), Panel::Feedback);
    }

    #[test]
    fn feedback_cannot_open_while_chat_is_open() {
        let mut flow = logged_in();
        flow.apply(AppEvent::ScenarioSelected("a".to_string()));
        let sid = start_chat(&mut flow);
        flow.apply(AppEvent::ChatStarted {
            session_id: sid,
            text: "Hi.".to_string(),
        });
        assert!(flow.apply(AppEvent::FeedbackRequested).is_empty());
        assert_eq!(panel_of(&flow), Panel::Chat);
    }

    #[test]
    fn feedback_text_is_formatted_into_markup() {
        let mut flow = logged_in();
        flow.apply(AppEvent::ScenarioSelected("a".to_string()));
        let sid = start_chat(&mut flow);
        flow.apply(AppEvent::ChatStarted {
            session_id: sid,
            text: "Hi.".to_string(),
        });
        flow.apply(AppEvent::ChatClosed);
        flow.apply(AppEvent::FeedbackRequested);
        flow.apply(AppEvent::FeedbackReady("**Summary**\nWell handled.".to_string()));
        assert_eq!(
            flow.feedback_markup(),
            Some("<h2>Summary</h2><p>Well handled.</p>")
        );
        assert!(!flow.waiting());
    }

    #[test]
    fn feedback_failure_shows_an_inline_error() {
        let mut flow = logged_in();
        flow.apply(AppEvent::ScenarioSelected("a".to_string()));
        let sid = start_chat(&mut flow);
        flow.apply(AppEvent::ChatStarted {
            session_id: sid,
            text: "Hi.".to_string(),
        });
        flow.apply(AppEvent::ChatClosed);
        flow.apply(AppEvent::FeedbackRequested);
        flow.apply(AppEvent::FeedbackFailed("backend returned 500".to_string()));
        assert_eq!(flow.feedback_error(), Some("backend returned 500"));
        assert!(flow.feedback_markup().is_none());
    }

    #[test]
    fn closing_feedback_returns_to_main_and_clears_selection() {
        let mut flow = logged_in();
        flow.apply(AppEvent::ScenarioSelected("a".to_string()));
        let sid = start_chat(&mut flow);
        flow.apply(AppEvent::ChatStarted {
            session_id: sid,
            text: "Hi.".to_string(),
        });
        flow.apply(AppEvent::ChatClosed);
        flow.apply(AppEvent::FeedbackRequested);
        flow.apply(AppEvent::FeedbackClosed);
        assert_eq!(*flow.view(), View::Main);
        assert!(flow.feedback_markup().is_none());
    }

    #[test]
    fn reselecting_a_scenario_shows_identical_content() {
        let mut flow = logged_in();
        flow.apply(AppEvent::ScenarioSelected("a".to_string()));
        let first = flow.scenario("a").expect("a should exist").clone();

        flow.apply(AppEvent::CatalogViewOpened);
        flow.apply(AppEvent::ScenarioSelected("b".to_string()));
        let sid = start_chat(&mut flow);
        flow.apply(AppEvent::ChatStarted {
            session_id: sid,
            text: "Hi.".to_string(),
        });
        flow.apply(AppEvent::ChatClosed);

        flow.apply(AppEvent::CatalogViewOpened);
        flow.apply(AppEvent::ScenarioSelected("a".to_string()));
        let again = flow.scenario("a").expect("a should still exist");
        assert_eq!(*again, first);
    }

    #[test]
    fn add_scenario_form_validates_and_submits() {
        let mut flow = logged_in();
        flow.apply(AppEvent::AddScenarioOpened);
        assert_eq!(*flow.view(), View::AddScenario);

        let effects = flow.apply(AppEvent::ScenarioSubmitted(draft(" ", "Title")));
        assert!(matches!(effects.as_slice(), [Effect::Alert(_)]));
        assert!(!flow.waiting());

        let effects = flow.apply(AppEvent::ScenarioSubmitted(draft("new-id", "Title")));
        assert!(matches!(effects.as_slice(), [Effect::SubmitScenario(_)]));
        assert!(flow.waiting());
    }

    #[test]
    fn rejected_submission_keeps_the_form_with_a_notice() {
        let mut flow = logged_in();
        flow.apply(AppEvent::AddScenarioOpened);
        flow.apply(AppEvent::ScenarioSubmitted(draft("id", "Title")));
        flow.apply(AppEvent::ScenarioRejected("id already exists".to_string()));
        assert_eq!(*flow.view(), View::AddScenario);
        assert_eq!(flow.form_notice(), Some("id already exists"));
        assert!(!flow.waiting());
    }

    #[test]
    fn accepted_submission_returns_to_main_and_refreshes() {
        let mut flow = logged_in();
        flow.apply(AppEvent::AddScenarioOpened);
        flow.apply(AppEvent::ScenarioSubmitted(draft("id", "Title")));
        let effects = flow.apply(AppEvent::ScenarioAccepted("created".to_string()));
        assert_eq!(effects, vec![Effect::FetchCatalog]);
        assert_eq!(*flow.view(), View::Main);
    }

    #[test]
    fn catalog_failure_changes_nothing() {
        let mut flow = logged_in();
        assert!(flow.apply(AppEvent::CatalogFailed("timeout".to_string())).is_empty());
        assert_eq!(*flow.view(), View::Main);
        assert_eq!(flow.catalog().len(), 2);
    }
}
