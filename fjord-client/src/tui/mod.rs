//! Terminal host for the feedback wizard and the dashboard.
//!
//! Layout:
//! - Centered window frame titled "Fjord Feedback"
//! - Card header line (the active card's title)
//! - Card body
//! - Bottom button row, right aligned
//!
//! The wizard state lives in [`FeedbackForm`]; this module only maps keys to form operations and
//! draws what the form's surface says. The POST runs on a worker thread and reports back over
//! an mpsc channel.
//!
//! Note: Logging is file-only in TUI mode (stdout logging is disabled) to avoid corrupting the terminal UI.

pub mod dashboard;

use crate::api::transport::{FeedbackTransport, TransportError};
use crate::cards::history::MemoryHistory;
use crate::cards::{CardId, BACK_BUTTON_ID, HEADER_TITLE_ID};
use crate::feedback::cache::{keys, LocalCache, MemoryCache};
use crate::feedback::wizard::{ids, WizardKind};
use crate::feedback::{FeedbackForm, Field, SubmitError};
use crate::models::responses::FeedbackResponse;
use crate::models::settings::Settings;
use crate::models::state::AppContext;
use crate::ui::counter::counter_id;
use crate::ui::surface::{Element, MemorySurface, Surface};
use crate::ui::widgets::Placeholder;
use anyhow::{bail, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use log::{info, warn};
use ratatui::backend::{Backend, CrosstermBackend, TestBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const WINDOW_TITLE: &str = "Fjord Feedback";
const URL_PLACEHOLDER: &str = "http://";
const EMAIL_PLACEHOLDER: &str = "example@example.com";

pub const SMOKE_TARGETS: [&str; 8] = [
    "intro",
    "moreinfo",
    "context",
    "submitting",
    "thanks",
    "failure",
    "tryagain",
    "dashboard",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Happy,
    Sad,
    Field(Field),
    EmailOk,
    Back,
    Next,
    Submit,
    Retry,
    Done,
    Cancel,
}

enum UiMsg {
    SubmitFinished(Result<FeedbackResponse, TransportError>),
}

/// Single-line editor. The cursor counts characters, not bytes.
#[derive(Debug, Clone, Default)]
struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            cursor: value.chars().count(),
            value,
        }
    }

    fn set(&mut self, value: &str) {
        if self.value != value {
            *self = TextInput::new(value);
        }
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    /// Returns true when the value changed.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char(c) => {
                let at = self.byte_index();
                self.value.insert(at, c);
                self.cursor += 1;
                true
            }
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    return false;
                }
                self.cursor -= 1;
                let at = self.byte_index();
                self.value.remove(at);
                true
            }
            KeyCode::Delete => {
                if self.cursor >= self.len() {
                    return false;
                }
                let at = self.byte_index();
                self.value.remove(at);
                true
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                false
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.len());
                false
            }
            KeyCode::Home => {
                self.cursor = 0;
                false
            }
            KeyCode::End => {
                self.cursor = self.len();
                false
            }
            _ => false,
        }
    }

    /// Value with a block cursor at the insertion point.
    fn display_with_cursor(&self) -> String {
        let mut out: String = self.value.chars().take(self.cursor).collect();
        out.push('█');
        out.extend(self.value.chars().skip(self.cursor));
        out
    }
}

#[derive(Debug, Default)]
struct Inputs {
    description: TextInput,
    url: TextInput,
    email: TextInput,
    country: TextInput,
    device: TextInput,
}

impl Inputs {
    fn get(&self, field: Field) -> &TextInput {
        match field {
            Field::Description => &self.description,
            Field::Url => &self.url,
            Field::Email => &self.email,
            Field::Country => &self.country,
            Field::Device => &self.device,
        }
    }

    fn get_mut(&mut self, field: Field) -> &mut TextInput {
        match field {
            Field::Description => &mut self.description,
            Field::Url => &mut self.url,
            Field::Email => &mut self.email,
            Field::Country => &mut self.country,
            Field::Device => &mut self.device,
        }
    }
}

const ALL_FIELDS: [Field; 5] = [
    Field::Description,
    Field::Url,
    Field::Email,
    Field::Country,
    Field::Device,
];

struct WizardState {
    form: FeedbackForm,
    inputs: Inputs,
    /// Terminal-only element state (placeholders) kept apart from the form's surface.
    chrome: MemorySurface,
    placeholders: Vec<(Field, Placeholder)>,
    card: CardId,
    focus: usize,
    quit: bool,
}

impl WizardState {
    fn new(form: FeedbackForm) -> Self {
        let placeholders = vec![
            (Field::Url, Placeholder::new(ids::URL, URL_PLACEHOLDER)),
            (Field::Email, Placeholder::new(ids::EMAIL, EMAIL_PLACEHOLDER)),
        ];
        let mut chrome = MemorySurface::new();
        for (_, p) in &placeholders {
            chrome.declare(&p.field_id, Element::visible());
        }
        let card = form.active();
        let mut state = Self {
            form,
            inputs: Inputs::default(),
            chrome,
            placeholders,
            card,
            focus: 0,
            quit: false,
        };
        sync_inputs(&mut state);
        focus_card_default(&mut state);
        state
    }

    fn focused(&self) -> Option<Focus> {
        focus_order(&self.form).get(self.focus).copied()
    }

    fn focused_field(&self) -> Option<Field> {
        match self.focused() {
            Some(Focus::Field(f)) => Some(f),
            _ => None,
        }
    }
}

/// Focusable controls of the active card, in Tab order.
fn focus_order(form: &FeedbackForm) -> Vec<Focus> {
    match form.active() {
        CardId::Intro => vec![Focus::Happy, Focus::Sad],
        CardId::Details => vec![
            Focus::Field(Field::Description),
            Focus::Back,
            Focus::Next,
            Focus::Cancel,
        ],
        CardId::Context => {
            let mut order = Vec::new();
            if form.kind().asks_for_device() {
                order.push(Focus::Field(Field::Country));
                order.push(Focus::Field(Field::Device));
            }
            order.push(Focus::Field(Field::Url));
            order.push(Focus::EmailOk);
            if form.fields().email_ok {
                order.push(Focus::Field(Field::Email));
            }
            order.extend([Focus::Back, Focus::Submit, Focus::Cancel]);
            order
        }
        CardId::Submitting => Vec::new(),
        CardId::Thanks => vec![Focus::Done],
        CardId::Failure => vec![Focus::Retry, Focus::Cancel],
        CardId::TryAgain => vec![Focus::Submit, Focus::Cancel],
    }
}

fn focus_for_element(id: &str) -> Option<Focus> {
    match id {
        ids::HAPPY_BUTTON => Some(Focus::Happy),
        ids::SAD_BUTTON => Some(Focus::Sad),
        ids::DESCRIPTION => Some(Focus::Field(Field::Description)),
        ids::URL => Some(Focus::Field(Field::Url)),
        ids::EMAIL => Some(Focus::Field(Field::Email)),
        ids::COUNTRY => Some(Focus::Field(Field::Country)),
        ids::DEVICE => Some(Focus::Field(Field::Device)),
        ids::EMAIL_OK => Some(Focus::EmailOk),
        ids::SUBMIT => Some(Focus::Submit),
        _ => None,
    }
}

fn is_enabled(form: &FeedbackForm, focus: Focus) -> bool {
    match focus {
        Focus::Back => form.surface().is_visible(BACK_BUTTON_ID),
        Focus::Next => !form.surface().is_disabled(ids::DESCRIPTION_NEXT),
        Focus::Submit => form.submit_enabled(),
        Focus::Field(Field::Email) => !form.surface().is_disabled(ids::EMAIL),
        _ => true,
    }
}

/// Copy form values into the editors (after a reset or a restore).
fn sync_inputs(state: &mut WizardState) {
    for field in ALL_FIELDS {
        let value = state.form.field_value(field).to_string();
        state.inputs.get_mut(field).set(&value);
    }
    sync_placeholders(state);
}

fn sync_placeholders(state: &mut WizardState) {
    let focused = state.focused_field();
    for (field, p) in &state.placeholders {
        state
            .chrome
            .set_value(&p.field_id, state.form.field_value(*field));
        state.chrome.toggle_class(&p.field_id, "placeholder", false);
        if focused != Some(*field) {
            p.on_blur(&mut state.chrome);
        }
    }
}

fn set_focus(state: &mut WizardState, index: usize) {
    if let Some(old) = state.focused_field() {
        if let Some((_, p)) = state.placeholders.iter().find(|(f, _)| *f == old) {
            p.on_blur(&mut state.chrome);
        }
    }
    state.focus = index;
    if let Some(new) = state.focused_field() {
        if let Some((_, p)) = state.placeholders.iter().find(|(f, _)| *f == new) {
            p.on_focus(&mut state.chrome);
        }
    }
}

/// Focus whatever the card asked for, or its first control.
fn focus_card_default(state: &mut WizardState) {
    let order = focus_order(&state.form);
    let wanted = state
        .form
        .surface()
        .focused()
        .and_then(|id| focus_for_element(&id));
    let index = wanted
        .and_then(|w| order.iter().position(|f| *f == w))
        .unwrap_or(0);
    state.focus = usize::MAX;
    set_focus(state, index);
    sync_placeholders(state);
}

/// Re-derive terminal state after anything that may have moved the form.
fn after_form_change(state: &mut WizardState) {
    if state.form.active() != state.card {
        state.card = state.form.active();
        sync_inputs(state);
        focus_card_default(state);
        return;
    }
    let len = focus_order(&state.form).len();
    if len > 0 && state.focus >= len {
        set_focus(state, len - 1);
    }
}

fn cycle_focus(state: &mut WizardState, forward: bool) {
    let len = focus_order(&state.form).len();
    if len == 0 {
        return;
    }
    let next = if forward {
        (state.focus + 1) % len
    } else {
        (state.focus + len - 1) % len
    };
    set_focus(state, next);
}

pub fn run(ctx: &AppContext, kind: WizardKind, search: &str, fragment: &str) -> Result<()> {
    info!(
        "[PHASE: tui] [STEP: start] Starting {} feedback wizard",
        kind.form_name()
    );

    let form = ctx.feedback_form(kind, search, fragment)?;
    let transport = ctx.feedback_transport();

    let mut terminal = setup_terminal()?;
    let result = run_loop(&mut terminal, form, transport);
    restore_terminal(&mut terminal)?;

    result
}

fn smoke_form(kind: WizardKind, cache: MemoryCache) -> Result<FeedbackForm> {
    Ok(FeedbackForm::new(
        kind,
        &Settings::default(),
        Box::new(cache),
        "",
        MemoryHistory::default(),
    )?)
}

/// Drive a fresh wizard to the requested card. Only smoke rendering injects sample input.
fn new_smoke_wizard_state(target: &str) -> Result<WizardState> {
    let mut form = match target {
        "tryagain" => {
            let mut cache = MemoryCache::new();
            cache.set(keys::DESCRIPTION, "The camera app crashes on start.")?;
            smoke_form(WizardKind::FirefoxOs, cache)?
        }
        _ => smoke_form(WizardKind::FirefoxOs, MemoryCache::new())?,
    };

    if matches!(
        target,
        "moreinfo" | "context" | "submitting" | "thanks" | "failure"
    ) {
        form.select_happy_sad(false)?;
        form.set_description("The camera app crashes on start.");
    }
    if matches!(target, "context" | "submitting" | "thanks" | "failure") {
        form.next()?;
        form.set_country("Germany");
        form.set_device("Flame");
    }
    if matches!(target, "submitting" | "thanks" | "failure") {
        form.begin_submit()?;
    }
    match target {
        "thanks" => {
            form.finish_submit(Ok(FeedbackResponse::default()));
        }
        "failure" => {
            form.finish_submit(Err(TransportError::Timeout));
        }
        _ => {}
    }

    let expected = CardId::parse(target);
    if expected.is_some_and(|card| card != form.active()) {
        bail!(
            "smoke target {} ended on card {}",
            target,
            form.active().as_id()
        );
    }
    Ok(WizardState::new(form))
}

/// Render one frame of `target` to an in-memory buffer and return it as text.
pub fn render_smoke(target: &str) -> Result<String> {
    let t = target.trim().to_ascii_lowercase();
    if !SMOKE_TARGETS.contains(&t.as_str()) {
        bail!(
            "unknown smoke target {:?} (expected one of {})",
            target,
            SMOKE_TARGETS.join("|")
        );
    }

    // In-memory backend: no raw mode, no alternate screen.
    let backend = TestBackend::new(100, 30);
    let mut terminal = Terminal::new(backend)?;
    if t == "dashboard" {
        let dash = dashboard::DashboardState::sample();
        terminal.draw(|f| dashboard::draw(f.size(), f, &dash))?;
    } else {
        let state = new_smoke_wizard_state(&t)?;
        terminal.draw(|f| draw(f.size(), f, &state))?;
    }
    Ok(buffer_text(terminal.backend()))
}

pub fn smoke(target: &str) -> Result<()> {
    info!(
        "[PHASE: tui] [STEP: smoke] Rendering single-frame TUI smoke target={}",
        target
    );
    let text = render_smoke(target)?;
    let drawn = text.lines().filter(|l| !l.trim().is_empty()).count();
    info!(
        "[PHASE: tui] [STEP: smoke] Rendered target={} ({} non-blank rows)",
        target, drawn
    );
    Ok(())
}

fn buffer_text(backend: &TestBackend) -> String {
    let buffer = backend.buffer();
    let area = buffer.area;
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            out.push_str(buffer.get(x, y).symbol());
        }
        out.push('\n');
    }
    out
}

pub(crate) fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

pub(crate) fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    form: FeedbackForm,
    transport: Arc<dyn FeedbackTransport>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    let mut state = WizardState::new(form);
    let (tx, rx) = mpsc::channel::<UiMsg>();

    while !state.quit {
        drain_messages(&mut state, &rx);
        terminal.draw(|f| draw(f.size(), f, &state))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut state, key, &tx, &transport);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    info!("[PHASE: tui] [STEP: exit] Wizard closed on card {}", state.card);
    Ok(())
}

fn drain_messages(state: &mut WizardState, rx: &mpsc::Receiver<UiMsg>) {
    while let Ok(msg) = rx.try_recv() {
        match msg {
            UiMsg::SubmitFinished(result) => {
                state.form.finish_submit(result);
                after_form_change(state);
            }
        }
    }
}

fn start_submit(
    state: &mut WizardState,
    tx: &mpsc::Sender<UiMsg>,
    transport: &Arc<dyn FeedbackTransport>,
) {
    for (_, p) in &state.placeholders {
        p.before_submit(&mut state.chrome);
    }
    let payload = match state.form.begin_submit() {
        Ok(payload) => payload,
        Err(SubmitError::Invalid(_)) => {
            // Errors are already flagged on the surface.
            sync_placeholders(state);
            return;
        }
        Err(e) => {
            warn!("[PHASE: tui] [STEP: submit] Submit not started: {}", e);
            sync_placeholders(state);
            return;
        }
    };
    after_form_change(state);

    let tx = tx.clone();
    let transport = transport.clone();
    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build();
        let result = match rt {
            Ok(rt) => rt.block_on(transport.post_feedback(&payload)),
            Err(e) => Err(TransportError::Network(format!(
                "Internal error starting submit: {}",
                e
            ))),
        };
        let _ = tx.send(UiMsg::SubmitFinished(result));
    });
}

fn handle_key(
    state: &mut WizardState,
    key: KeyEvent,
    tx: &mpsc::Sender<UiMsg>,
    transport: &Arc<dyn FeedbackTransport>,
) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.quit = true;
        return;
    }
    // Nothing but quitting while the POST is out.
    if state.form.active() == CardId::Submitting {
        return;
    }

    let focused = state.focused();
    match key.code {
        KeyCode::Esc => {
            state.form.back();
        }
        KeyCode::Tab => cycle_focus(state, true),
        KeyCode::BackTab => cycle_focus(state, false),
        KeyCode::Char('h') if state.form.active() == CardId::Intro => {
            let _ = state.form.select_happy_sad(true);
        }
        KeyCode::Char('s') if state.form.active() == CardId::Intro => {
            let _ = state.form.select_happy_sad(false);
        }
        KeyCode::Char('q') if state.form.active() == CardId::Intro => {
            state.quit = true;
        }
        KeyCode::Char(' ') if focused == Some(Focus::EmailOk) => {
            let on = !state.form.fields().email_ok;
            state.form.set_email_ok(on);
        }
        KeyCode::Enter => match focused {
            Some(Focus::Field(_)) => cycle_focus(state, true),
            Some(f) => activate(state, f, tx, transport),
            None => {}
        },
        code => {
            if let Some(field) = state.focused_field() {
                if !is_enabled(&state.form, Focus::Field(field)) {
                    return;
                }
                let input = state.inputs.get_mut(field);
                if input.handle_key(code) {
                    let value = input.value.clone();
                    state.form.set_field(field, &value);
                    if let Some((_, p)) = state.placeholders.iter().find(|(f, _)| *f == field) {
                        state.chrome.set_value(&p.field_id, &value);
                    }
                }
            }
        }
    }
    after_form_change(state);
}

fn activate(
    state: &mut WizardState,
    focus: Focus,
    tx: &mpsc::Sender<UiMsg>,
    transport: &Arc<dyn FeedbackTransport>,
) {
    if !is_enabled(&state.form, focus) {
        return;
    }
    match focus {
        Focus::Happy => {
            let _ = state.form.select_happy_sad(true);
        }
        Focus::Sad => {
            let _ = state.form.select_happy_sad(false);
        }
        Focus::EmailOk => {
            let on = !state.form.fields().email_ok;
            state.form.set_email_ok(on);
        }
        Focus::Back => {
            state.form.back();
        }
        Focus::Next => {
            let _ = state.form.next();
        }
        Focus::Submit => start_submit(state, tx, transport),
        Focus::Retry => {
            let _ = state.form.retry();
        }
        Focus::Done | Focus::Cancel => {
            let _ = state.form.cancel();
        }
        Focus::Field(_) => {}
    }
}

// -----------------------------------------------------------------------------
// Drawing
// -----------------------------------------------------------------------------

fn draw(area: Rect, f: &mut ratatui::Frame<'_>, state: &WizardState) {
    let (window_area, _) = centered_window(area, 80, 24);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", WINDOW_TITLE));
    f.render_widget(block, window_area);

    let inner = window_area.inner(&Margin {
        vertical: 1,
        horizontal: 2,
    });
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    let title = state
        .form
        .surface()
        .text(HEADER_TITLE_ID)
        .unwrap_or_default();
    f.render_widget(
        Paragraph::new(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        rows[0],
    );

    let body = card_body(state);
    f.render_widget(Paragraph::new(body).wrap(Wrap { trim: false }), rows[1]);
    draw_buttons(f, rows[2], state);
}

fn card_body(state: &WizardState) -> Text<'static> {
    let form = &state.form;
    let surface = form.surface();
    let mut lines: Vec<Line<'static>> = Vec::new();

    match form.active() {
        CardId::Intro => {
            lines.push(Line::from("Firefox is committed to user privacy and security."));
            lines.push(Line::from("How do you feel about it?"));
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                button_text(
                    ":) Happy",
                    state.focused() == Some(Focus::Happy),
                    true,
                ),
                Span::raw("   "),
                button_text(":( Sad", state.focused() == Some(Focus::Sad), true),
            ]));
            lines.push(Line::from(""));
            lines.push(hint("h = happy, s = sad, q = quit"));
        }
        CardId::Details => {
            if surface.is_visible(ids::HAPPY_TEXT) {
                lines.push(Line::from("What do you like?"));
            }
            if surface.is_visible(ids::SAD_TEXT) {
                lines.push(Line::from("What made you sad?"));
            }
            lines.push(Line::from(""));
            lines.push(field_line(state, Field::Description, "Description"));
            lines.push(counter_line(surface));
        }
        CardId::Context => {
            if form.kind().asks_for_device() {
                lines.push(field_line(state, Field::Country, "Country"));
                lines.push(field_line(state, Field::Device, "Device"));
            }
            lines.push(field_line(state, Field::Url, "URL (optional)"));
            if surface.is_visible(ids::URL_ERROR) {
                lines.push(error_line("Please enter a valid URL."));
            }
            lines.push(Line::from(""));
            let mark = if form.fields().email_ok { "x" } else { " " };
            lines.push(Line::from(Span::styled(
                format!("[{}] You may contact me about my feedback", mark),
                focus_style(state.focused() == Some(Focus::EmailOk)),
            )));
            lines.push(field_line(state, Field::Email, "Email"));
            if surface.is_visible(ids::EMAIL_ERROR) {
                lines.push(error_line("Please enter a valid email address."));
            }
        }
        CardId::Submitting => {
            lines.push(Line::from("Sending your feedback..."));
        }
        CardId::Thanks => {
            lines.push(Line::from("Thank you for your feedback!"));
            if surface.is_visible(ids::PLAY_STORE_CTA) {
                let url = surface.text(ids::PLAY_STORE_CTA).unwrap_or_default();
                lines.push(Line::from(""));
                lines.push(Line::from("Enjoying Firefox? Rate us on Google Play:"));
                lines.push(Line::from(Span::styled(
                    url,
                    Style::default().fg(Color::Cyan),
                )));
            }
        }
        CardId::Failure => {
            lines.push(error_line("Your feedback could not be sent."));
            lines.push(Line::from(
                "Your input has been kept. Check your connection and try again.",
            ));
        }
        CardId::TryAgain => {
            lines.push(Line::from("You have feedback that has not been sent yet:"));
            lines.push(Line::from(""));
            let preview: String = form.fields().description.chars().take(140).collect();
            lines.push(Line::from(Span::styled(
                preview,
                Style::default().fg(Color::Gray),
            )));
        }
    }
    Text::from(lines)
}

fn field_line(state: &WizardState, field: Field, label: &str) -> Line<'static> {
    let id = field.element_id();
    let surface = state.form.surface();
    let focused = state.focused_field() == Some(field);
    let enabled = !surface.is_disabled(id);

    let (value, mut style) = if state.chrome.has_class(id, "placeholder") {
        (
            state.chrome.value(id).unwrap_or_default(),
            Style::default().fg(Color::DarkGray),
        )
    } else if focused {
        (state.inputs.get(field).display_with_cursor(), Style::default())
    } else {
        (state.inputs.get(field).value.clone(), Style::default())
    };
    if !enabled {
        style = style.fg(Color::DarkGray);
    }
    if surface.has_class(id, "invalid") || surface.has_class(id, "error") {
        style = style.fg(Color::Red);
    }

    let marker = if focused { "> " } else { "  " };
    Line::from(vec![
        Span::raw(format!("{}{}: ", marker, label)),
        Span::styled(format!("[{}]", value), style),
    ])
}

fn counter_line(surface: &MemorySurface) -> Line<'static> {
    let counter = counter_id(ids::DESCRIPTION);
    let remaining = surface.text(&counter).unwrap_or_default();
    let style = if surface.has_class(&counter, "error") {
        Style::default().fg(Color::Red)
    } else if surface.has_class(&counter, "warning") {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Line::from(Span::styled(
        format!("  {} characters left", remaining),
        style,
    ))
}

fn error_line(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {}", text),
        Style::default().fg(Color::Red),
    ))
}

fn hint(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::DarkGray),
    ))
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    }
}

fn button_label(focus: Focus) -> &'static str {
    match focus {
        Focus::Back => "Back",
        Focus::Next => "Next",
        Focus::Submit => "Submit",
        Focus::Retry => "Try again",
        Focus::Done => "Done",
        Focus::Cancel => "Cancel",
        _ => "",
    }
}

fn draw_buttons(f: &mut ratatui::Frame<'_>, area: Rect, state: &WizardState) {
    let focused = state.focused();
    let mut spans = Vec::new();
    for b in focus_order(&state.form) {
        if matches!(
            b,
            Focus::Happy | Focus::Sad | Focus::EmailOk | Focus::Field(_)
        ) {
            continue;
        }
        if !spans.is_empty() {
            spans.push(Span::raw(" "));
        }
        spans.push(button_text(
            button_label(b),
            focused == Some(b),
            is_enabled(&state.form, b),
        ));
    }

    let p = Paragraph::new(Text::from(Line::from(spans))).alignment(Alignment::Right);
    f.render_widget(p, area);
}

pub(crate) fn centered_window(area: Rect, width: u16, height: u16) -> (Rect, Rect) {
    let w = width.min(area.width.saturating_sub(2)).max(60).min(area.width);
    let h = height.min(area.height.saturating_sub(2)).max(20).min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    let rect = Rect {
        x,
        y,
        width: w,
        height: h,
    };
    (rect, rect)
}

pub(crate) fn button_text(label: &str, focused: bool, enabled: bool) -> Span<'static> {
    let mut style = Style::default();
    if !enabled {
        style = style.fg(Color::DarkGray);
    }
    if focused && enabled {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(format!("[ {} ]", label), style)
}
