// Feedback wizard: field state, validation and the submission flow
//
// A submission has two halves so the POST can run elsewhere: `begin_submit` validates, builds
// the payload and parks the wizard on the submitting card; `finish_submit` routes the result.
// While parked, every navigation entry point is refused until the result arrives.

pub mod cache;
pub mod useragent;
pub mod wizard;

use crate::api::transport::{FeedbackTransport, TransportError};
use crate::cards::history::{normalize_fragment, History, MemoryHistory, NavigationState};
use crate::cards::{initial_card, CardId, Deck, NavError, Target};
use crate::models::requests::FeedbackPayload;
use crate::models::responses::FeedbackResponse;
use crate::models::settings::Settings;
use crate::ui::counter::{update_counter, CountMode};
use crate::ui::surface::{MemorySurface, Surface};
use crate::ui::widgets::android_review_url;
use crate::utils::logging::{describe_text, mask_email};
use crate::utils::querystring::{self, decode_component, QueryMap};
use crate::utils::validation::{is_blank_description, is_valid_email, is_valid_url};
use cache::{keys, LocalCache};
use log::{error, info, warn};
use thiserror::Error;
use uuid::Uuid;
use wizard::{ids, WizardKind};

const INVALID_CLASS: &str = "invalid";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("description is empty")]
    BlankDescription,
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("url is not valid")]
    InvalidUrl,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("form has invalid fields: {0:?}")]
    Invalid(Vec<ValidationError>),
    #[error("a submission is already in flight")]
    InFlight,
    #[error(transparent)]
    Navigation(#[from] NavError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Description,
    Url,
    Email,
    Country,
    Device,
}

impl Field {
    pub fn element_id(&self) -> &'static str {
        match self {
            Field::Description => ids::DESCRIPTION,
            Field::Url => ids::URL,
            Field::Email => ids::EMAIL,
            Field::Country => ids::COUNTRY,
            Field::Device => ids::DEVICE,
        }
    }
}

/// User input the wizard reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    HappySad(bool),
    Next,
    Back,
    Forward,
    Cancel,
    Retry,
    Input(Field, String),
    EmailOk(bool),
    Popstate(Option<NavigationState>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub happy: Option<bool>,
    pub description: String,
    pub email_ok: bool,
    pub email: String,
    pub url: String,
    pub country: String,
    pub device: String,
}

pub struct FeedbackForm {
    kind: WizardKind,
    settings: Settings,
    deck: Deck,
    history: MemoryHistory,
    surface: MemorySurface,
    fields: FormFields,
    query: QueryMap,
    cache: Box<dyn LocalCache>,
    attempt: Option<Uuid>,
}

impl FeedbackForm {
    /// Build the wizard, restore cached input and show the starting card.
    ///
    /// `search` is the page query string (`?utm_source=...`); `history` carries the URL fragment
    /// the session was opened with.
    pub fn new(
        kind: WizardKind,
        settings: &Settings,
        cache: Box<dyn LocalCache>,
        search: &str,
        mut history: MemoryHistory,
    ) -> Result<Self, NavError> {
        let mut deck = kind.deck()?;
        let mut surface = MemorySurface::new();
        wizard::declare_elements(&mut surface, &deck);

        let fields = FormFields {
            email_ok: cache.get(keys::EMAIL_OK).is_some_and(|v| !v.is_empty()),
            email: cache.get(keys::EMAIL).unwrap_or_default(),
            country: cache.get(keys::COUNTRY).unwrap_or_default(),
            device: cache.get(keys::DEVICE).unwrap_or_default(),
            description: cache.get(keys::DESCRIPTION).unwrap_or_default(),
            ..FormFields::default()
        };
        let pending = !fields.description.is_empty();

        normalize_fragment(&mut history);
        let start = {
            let entry = history.current();
            initial_card(
                &deck,
                entry.and_then(|e| e.state.as_ref()),
                entry.map(|e| e.fragment.as_str()),
                pending,
            )
        };
        deck.restore(Some(&NavigationState::new(start.as_id())), &mut surface)?;

        info!(
            "[PHASE: feedback] [STEP: init] {} wizard starting on {} (pending submission: {})",
            kind.form_name(),
            start,
            pending
        );

        let mut form = Self {
            kind,
            settings: settings.clone(),
            deck,
            history,
            surface,
            fields,
            query: querystring::parse_query(search),
            cache,
            attempt: None,
        };
        form.render_fields();
        form.refresh_submit();
        form.render_review_cta();
        Ok(form)
    }

    pub fn kind(&self) -> WizardKind {
        self.kind
    }

    pub fn active(&self) -> CardId {
        self.deck.active()
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn surface(&self) -> &MemorySurface {
        &self.surface
    }

    pub fn history(&self) -> &MemoryHistory {
        &self.history
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn cache(&self) -> &dyn LocalCache {
        self.cache.as_ref()
    }

    pub fn submit_enabled(&self) -> bool {
        !self.surface.is_disabled(ids::SUBMIT)
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    pub fn select_happy_sad(&mut self, happy: bool) -> Result<CardId, NavError> {
        self.ensure_idle()?;
        self.fields.happy = Some(happy);
        self.surface.set_visible(ids::HAPPY_TEXT, happy);
        self.surface.set_visible(ids::SAD_TEXT, !happy);
        self.go(Target::Forward)
    }

    pub fn next(&mut self) -> Result<CardId, NavError> {
        self.ensure_idle()?;
        self.go(Target::Forward)
    }

    /// Browser-style back. No-op on the first entry and while a submission is in flight.
    pub fn back(&mut self) -> Option<CardId> {
        if self.deck.active() == CardId::Submitting {
            return None;
        }
        let state = self.history.back()?;
        self.deck.restore(state.as_ref(), &mut self.surface).ok()
    }

    pub fn forward(&mut self) -> Option<CardId> {
        if self.deck.active() == CardId::Submitting {
            return None;
        }
        let state = self.history.forward()?;
        self.deck.restore(state.as_ref(), &mut self.surface).ok()
    }

    pub fn popstate(&mut self, state: Option<&NavigationState>) -> Result<CardId, NavError> {
        self.ensure_idle()?;
        self.deck.restore(state, &mut self.surface)
    }

    /// Drop the in-progress feedback and start over.
    pub fn cancel(&mut self) -> Result<CardId, NavError> {
        self.ensure_idle()?;
        self.reset();
        self.go(CardId::Intro.into())
    }

    /// Back to the description after a failed submission; the text is still there.
    pub fn retry(&mut self) -> Result<CardId, NavError> {
        self.ensure_idle()?;
        self.go(CardId::Details.into())
    }

    /// Refuse to leave the submitting card until `finish_submit` runs.
    fn ensure_idle(&self) -> Result<(), NavError> {
        if self.deck.active() == CardId::Submitting {
            warn!(
                "[PHASE: feedback] [STEP: navigate] Ignoring navigation while a submission is in flight"
            );
            return Err(NavError::Locked(CardId::Submitting));
        }
        Ok(())
    }

    fn go(&mut self, target: Target) -> Result<CardId, NavError> {
        self.deck
            .activate(target, true, &mut self.surface, &mut self.history)
    }

    // -------------------------------------------------------------------------
    // Fields
    // -------------------------------------------------------------------------

    pub fn set_description(&mut self, text: &str) {
        self.fields.description = text.to_string();
        self.surface.set_value(ids::DESCRIPTION, text);
        self.update_description_counter();
        let blank = is_blank_description(text);
        self.surface.toggle_class(ids::DESCRIPTION, INVALID_CLASS, blank);
        self.surface.set_disabled(ids::DESCRIPTION_NEXT, blank);
        self.refresh_submit();
    }

    pub fn set_url(&mut self, text: &str) {
        self.fields.url = text.to_string();
        self.surface.set_value(ids::URL, text);
        let valid = is_valid_url(text.trim());
        self.surface.toggle_class(ids::URL, INVALID_CLASS, !valid);
        if valid {
            self.surface.set_visible(ids::URL_ERROR, false);
        }
        self.refresh_submit();
    }

    pub fn set_email(&mut self, text: &str) {
        self.fields.email = text.to_string();
        self.surface.set_value(ids::EMAIL, text);
        let valid = self.email_valid();
        self.surface.toggle_class(ids::EMAIL, INVALID_CLASS, !valid);
        if valid {
            self.surface.set_visible(ids::EMAIL_ERROR, false);
        }
        self.refresh_submit();
    }

    pub fn set_email_ok(&mut self, on: bool) {
        self.fields.email_ok = on;
        self.render_email_ok();
        let valid = self.email_valid();
        self.surface.toggle_class(ids::EMAIL, INVALID_CLASS, !valid);
        self.refresh_submit();
    }

    pub fn set_country(&mut self, value: &str) {
        self.fields.country = value.to_string();
        self.surface.set_value(ids::COUNTRY, value);
        self.persist(keys::COUNTRY, value);
    }

    pub fn set_device(&mut self, value: &str) {
        self.fields.device = value.to_string();
        self.surface.set_value(ids::DEVICE, value);
        self.persist(keys::DEVICE, value);
    }

    pub fn set_field(&mut self, field: Field, value: &str) {
        match field {
            Field::Description => self.set_description(value),
            Field::Url => self.set_url(value),
            Field::Email => self.set_email(value),
            Field::Country => self.set_country(value),
            Field::Device => self.set_device(value),
        }
    }

    pub fn field_value(&self, field: Field) -> &str {
        match field {
            Field::Description => &self.fields.description,
            Field::Url => &self.fields.url,
            Field::Email => &self.fields.email,
            Field::Country => &self.fields.country,
            Field::Device => &self.fields.device,
        }
    }

    /// Dispatch one input event. Navigation failures are logged by the deck and ignored.
    pub fn handle(&mut self, event: UiEvent) {
        let _ = match event {
            UiEvent::HappySad(happy) => self.select_happy_sad(happy).map(drop),
            UiEvent::Next => self.next().map(drop),
            UiEvent::Back => {
                self.back();
                Ok(())
            }
            UiEvent::Forward => {
                self.forward();
                Ok(())
            }
            UiEvent::Cancel => self.cancel().map(drop),
            UiEvent::Retry => self.retry().map(drop),
            UiEvent::Input(field, value) => {
                self.set_field(field, &value);
                Ok(())
            }
            UiEvent::EmailOk(on) => {
                self.set_email_ok(on);
                Ok(())
            }
            UiEvent::Popstate(state) => self.popstate(state.as_ref()).map(drop),
        };
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if is_blank_description(&self.fields.description) {
            errors.push(ValidationError::BlankDescription);
        }
        if !self.email_valid() {
            errors.push(ValidationError::InvalidEmail);
        }
        if !is_valid_url(self.fields.url.trim()) {
            errors.push(ValidationError::InvalidUrl);
        }
        errors
    }

    fn email_valid(&self) -> bool {
        let email = self.fields.email.trim();
        !self.fields.email_ok || email.is_empty() || is_valid_email(email)
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Validate, assemble the payload and move to the submitting card.
    ///
    /// On error the active card is unchanged and nothing must be sent.
    pub fn begin_submit(&mut self) -> Result<FeedbackPayload, SubmitError> {
        if self.deck.active() == CardId::Submitting {
            warn!("[PHASE: feedback] [STEP: submit] Ignoring submit while one is in flight");
            return Err(SubmitError::InFlight);
        }

        let errors = self.validate();
        self.show_errors(&errors);
        if !errors.is_empty() {
            warn!(
                "[PHASE: feedback] [STEP: validate] Submission blocked: {:?}",
                errors
            );
            return Err(SubmitError::Invalid(errors));
        }

        let payload = self.build_payload();
        self.deck.activate(
            CardId::Submitting.into(),
            false,
            &mut self.surface,
            &mut self.history,
        )?;
        self.surface.set_disabled(ids::SUBMIT, true);

        if self.fields.email_ok {
            let email = self.fields.email.trim().to_string();
            self.persist(keys::EMAIL, &email);
        }

        let attempt = Uuid::new_v4();
        self.attempt = Some(attempt);
        info!(
            "[PHASE: feedback] [STEP: submit] Attempt {}: happy={} description={} email={}",
            attempt,
            payload.happy,
            describe_text(&payload.description),
            payload
                .email
                .as_deref()
                .map(mask_email)
                .unwrap_or_else(|| "-".to_string())
        );
        Ok(payload)
    }

    /// Route a finished POST to the thanks or failure card.
    pub fn finish_submit(&mut self, result: Result<FeedbackResponse, TransportError>) -> CardId {
        let attempt = self
            .attempt
            .take()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string());

        let target = match result {
            Ok(resp) => {
                info!(
                    "[PHASE: feedback] [STEP: submit] Attempt {} accepted (id {:?})",
                    attempt, resp.id
                );
                self.reset();
                CardId::Thanks
            }
            Err(e) => {
                error!(
                    "[PHASE: feedback] [STEP: submit] Attempt {} failed: {}",
                    attempt, e
                );
                if self.fields.email_ok {
                    self.persist(keys::EMAIL_OK, "true");
                }
                let description = self.fields.description.clone();
                self.persist(keys::DESCRIPTION, &description);
                CardId::Failure
            }
        };

        // Failures here mean the user already left the submitting card.
        let _ = self.deck.activate(
            target.into(),
            false,
            &mut self.surface,
            &mut self.history,
        );
        self.refresh_submit();
        self.render_review_cta();
        self.deck.active()
    }

    /// One submission: validate, POST once, route the result.
    pub async fn submit(
        &mut self,
        transport: &dyn FeedbackTransport,
    ) -> Result<CardId, SubmitError> {
        let payload = self.begin_submit()?;
        let result = transport.post_feedback(&payload).await;
        Ok(self.finish_submit(result))
    }

    fn build_payload(&self) -> FeedbackPayload {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        let utm = |key: &str| {
            querystring::get(&self.query, key)
                .filter(|v| !v.is_empty())
                .map(decode_component)
        };
        let email = self.fields.email.trim();
        let asks_device = self.kind.asks_for_device();

        FeedbackPayload {
            happy: self.fields.happy.unwrap_or(false),
            description: self.fields.description.clone(),
            product: self.settings.product.clone(),
            platform: self.settings.platform.clone(),
            locale: self.settings.locale.clone(),
            country: non_empty(&self.fields.country).filter(|_| asks_device),
            device: non_empty(&self.fields.device).filter(|_| asks_device),
            url: self.fields.url.trim().to_string(),
            user_agent: self.settings.user_agent.clone(),
            version: match self.kind {
                WizardKind::FirefoxOs => useragent::infer_fxos_version(&self.settings.user_agent),
                _ => None,
            },
            channel: match self.kind {
                WizardKind::Android => non_empty(&self.settings.channel),
                _ => None,
            },
            email: (self.fields.email_ok && !email.is_empty()).then(|| email.to_string()),
            source: utm("utm_source"),
            campaign: utm("utm_campaign"),
        }
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    fn reset(&mut self) {
        let country = std::mem::take(&mut self.fields.country);
        let device = std::mem::take(&mut self.fields.device);
        self.fields = FormFields {
            country,
            device,
            ..FormFields::default()
        };
        self.forget(keys::EMAIL_OK);
        self.forget(keys::DESCRIPTION);
        self.render_fields();
        self.refresh_submit();
    }

    fn render_fields(&mut self) {
        for field in [
            Field::Description,
            Field::Url,
            Field::Email,
            Field::Country,
            Field::Device,
        ] {
            let value = self.field_value(field).to_string();
            self.surface.set_value(field.element_id(), &value);
            self.surface.toggle_class(field.element_id(), INVALID_CLASS, false);
        }
        self.surface
            .set_visible(ids::HAPPY_TEXT, self.fields.happy == Some(true));
        self.surface
            .set_visible(ids::SAD_TEXT, self.fields.happy == Some(false));
        self.surface.set_visible(ids::EMAIL_ERROR, false);
        self.surface.set_visible(ids::URL_ERROR, false);
        self.surface.set_visible(ids::COUNTRY, self.kind.asks_for_device());
        self.surface.set_visible(ids::DEVICE, self.kind.asks_for_device());
        self.surface.set_disabled(
            ids::DESCRIPTION_NEXT,
            is_blank_description(&self.fields.description),
        );
        self.render_email_ok();
        self.update_description_counter();
    }

    fn render_email_ok(&mut self) {
        let on = self.fields.email_ok;
        self.surface
            .set_value(ids::EMAIL_OK, if on { "on" } else { "" });
        self.surface.toggle_class(ids::EMAIL_OK, "checked", on);
        self.surface.set_disabled(ids::EMAIL, !on);
    }

    fn update_description_counter(&mut self) {
        update_counter(
            &mut self.surface,
            ids::DESCRIPTION,
            self.settings.description_max_length,
            CountMode::Raw,
        );
    }

    fn show_errors(&mut self, errors: &[ValidationError]) {
        let has = |e: ValidationError| errors.contains(&e);
        self.surface.toggle_class(
            ids::DESCRIPTION,
            INVALID_CLASS,
            has(ValidationError::BlankDescription),
        );
        self.surface
            .toggle_class(ids::EMAIL, INVALID_CLASS, has(ValidationError::InvalidEmail));
        self.surface
            .set_visible(ids::EMAIL_ERROR, has(ValidationError::InvalidEmail));
        self.surface
            .toggle_class(ids::URL, INVALID_CLASS, has(ValidationError::InvalidUrl));
        self.surface
            .set_visible(ids::URL_ERROR, has(ValidationError::InvalidUrl));
    }

    fn refresh_submit(&mut self) {
        let blocked = self.deck.active() == CardId::Submitting || !self.validate().is_empty();
        self.surface.set_disabled(ids::SUBMIT, blocked);
    }

    fn render_review_cta(&mut self) {
        let url = match self.kind {
            WizardKind::Android => android_review_url(
                &self.settings.channel,
                querystring::get(&self.query, "prompted").is_some(),
            ),
            _ => None,
        };
        self.surface
            .set_visible(ids::PLAY_STORE_CTA, url.is_some());
        self.surface
            .set_text(ids::PLAY_STORE_CTA, url.as_deref().unwrap_or(""));
    }

    // -------------------------------------------------------------------------
    // Cache
    // -------------------------------------------------------------------------

    fn persist(&mut self, key: &str, value: &str) {
        if let Err(e) = self.cache.set(key, value) {
            warn!("[PHASE: cache] [STEP: set] Could not store {}: {}", key, e);
        }
    }

    fn forget(&mut self, key: &str) {
        if let Err(e) = self.cache.remove(key) {
            warn!("[PHASE: cache] [STEP: remove] Could not drop {}: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::INACTIVE_CLASS;
    use async_trait::async_trait;
    use cache::MemoryCache;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    // -------------------------------------------------------------------------
    // Stub transports
    // -------------------------------------------------------------------------

    /// Stub that accepts every payload and remembers the last one.
    struct AcceptingStub {
        call_count: AtomicU32,
        last: Mutex<Option<FeedbackPayload>>,
    }

    impl AcceptingStub {
        fn new() -> Self {
            Self {
                call_count: AtomicU32::new(0),
                last: Mutex::new(None),
            }
        }

        fn last_payload(&self) -> FeedbackPayload {
            self.last.lock().expect("lock").clone().expect("payload sent")
        }
    }

    #[async_trait]
    impl FeedbackTransport for AcceptingStub {
        async fn post_feedback(
            &self,
            payload: &FeedbackPayload,
        ) -> Result<FeedbackResponse, TransportError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().expect("lock") = Some(payload.clone());
            Ok(FeedbackResponse {
                id: Some(7),
                msg: None,
            })
        }
    }

    /// Stub that immediately returns a server error.
    struct ImmediateFailureStub {
        call_count: AtomicU32,
    }

    impl ImmediateFailureStub {
        fn new() -> Self {
            Self {
                call_count: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl FeedbackTransport for ImmediateFailureStub {
        async fn post_feedback(
            &self,
            _payload: &FeedbackPayload,
        ) -> Result<FeedbackResponse, TransportError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            Err(TransportError::Status {
                status: 500,
                body: "internal error".to_string(),
            })
        }
    }

    /// Stub that never answers.
    struct HangingStub {
        call_count: AtomicU32,
    }

    #[async_trait]
    impl FeedbackTransport for HangingStub {
        async fn post_feedback(
            &self,
            _payload: &FeedbackPayload,
        ) -> Result<FeedbackResponse, TransportError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            std::future::pending::<()>().await;
            Err(TransportError::Timeout)
        }
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    const FXOS_UA: &str = "Mozilla/5.0 (Mobile; rv:28.0) Gecko/28.0 Firefox/28.0";

    fn settings() -> Settings {
        Settings {
            user_agent: FXOS_UA.to_string(),
            description_max_length: 20,
            ..Settings::default()
        }
    }

    fn form_with(kind: WizardKind, cache: MemoryCache, search: &str, fragment: &str) -> FeedbackForm {
        FeedbackForm::new(
            kind,
            &settings(),
            Box::new(cache),
            search,
            MemoryHistory::new(fragment),
        )
        .expect("form")
    }

    fn form() -> FeedbackForm {
        form_with(WizardKind::FirefoxOs, MemoryCache::new(), "", "")
    }

    /// Walk to the last input card with a valid description.
    fn filled(mut f: FeedbackForm) -> FeedbackForm {
        f.select_happy_sad(true).expect("details");
        f.set_description("Camera app crashes");
        f.next().expect("context");
        f
    }

    // -------------------------------------------------------------------------
    // Tests
    // -------------------------------------------------------------------------

    #[test]
    fn fresh_form_starts_on_intro_with_submit_disabled() {
        let f = form();
        assert_eq!(f.active(), CardId::Intro);
        assert!(!f.submit_enabled());
        assert!(f.surface().has_class("moreinfo", INACTIVE_CLASS));
        assert!(f.surface().is_disabled(ids::EMAIL));
    }

    #[test]
    fn cached_description_resumes_on_try_again() {
        let mut cache = MemoryCache::new();
        cache.set(keys::DESCRIPTION, "half done").expect("set");
        cache.set(keys::EMAIL_OK, "true").expect("set");
        cache.set(keys::EMAIL, "me@example.com").expect("set");
        cache.set(keys::COUNTRY, "Brazil").expect("set");

        let f = form_with(WizardKind::FirefoxOs, cache, "", "");
        assert_eq!(f.active(), CardId::TryAgain);
        assert_eq!(f.fields().description, "half done");
        assert!(f.fields().email_ok);
        assert_eq!(f.surface().value(ids::EMAIL).as_deref(), Some("me@example.com"));
        assert_eq!(f.surface().value(ids::COUNTRY).as_deref(), Some("Brazil"));
        assert!(f.submit_enabled());
    }

    #[test]
    fn fragment_selects_starting_card_and_numeric_fragment_is_wiped() {
        let f = form_with(WizardKind::FirefoxOs, MemoryCache::new(), "", "#moreinfo");
        assert_eq!(f.active(), CardId::Details);

        let f = form_with(WizardKind::FirefoxOs, MemoryCache::new(), "", "#3");
        assert_eq!(f.active(), CardId::Intro);
        assert_eq!(f.history().current().expect("entry").fragment, "#");
    }

    #[test]
    fn happy_sad_shows_variant_and_moves_forward() {
        let mut f = form();
        assert_eq!(f.select_happy_sad(false), Ok(CardId::Details));
        assert!(f.surface().is_visible(ids::SAD_TEXT));
        assert!(!f.surface().is_visible(ids::HAPPY_TEXT));
        assert_eq!(f.history().len(), 2);
    }

    #[test]
    fn description_drives_counter_and_submit_affordance() {
        let mut f = form();
        f.set_description("   ");
        assert!(f.surface().has_class(ids::DESCRIPTION, INVALID_CLASS));
        assert!(f.surface().is_disabled(ids::DESCRIPTION_NEXT));
        assert!(!f.submit_enabled());

        f.set_description("0123456789abcdefg");
        assert_eq!(f.surface().text("description-counter").as_deref(), Some("3"));
        assert!(f.surface().has_class("description-counter", "warning"));
        assert!(f.submit_enabled());
    }

    #[test]
    fn invalid_url_disables_submit() {
        let mut f = filled(form());
        f.set_url("not a url");
        assert!(f.surface().has_class(ids::URL, INVALID_CLASS));
        assert!(!f.submit_enabled());
        f.set_url("about:config");
        assert!(f.submit_enabled());
    }

    #[test]
    fn email_checked_only_when_opted_in() {
        let mut f = filled(form());
        f.set_email("foo@");
        assert!(f.submit_enabled(), "email ignored while opt-in is off");

        f.set_email_ok(true);
        assert!(!f.surface().is_disabled(ids::EMAIL));
        assert!(!f.submit_enabled());
    }

    #[tokio::test]
    async fn invalid_email_blocks_submission_without_sending() {
        let mut f = filled(form());
        f.set_email_ok(true);
        f.set_email("foo@");
        let stub = AcceptingStub::new();

        let result = f.submit(&stub).await;

        assert_eq!(
            result,
            Err(SubmitError::Invalid(vec![ValidationError::InvalidEmail]))
        );
        assert_eq!(stub.call_count.load(Ordering::SeqCst), 0);
        assert_eq!(f.active(), CardId::Context);
        assert!(f.surface().is_visible(ids::EMAIL_ERROR));
    }

    #[tokio::test]
    async fn successful_submission_shows_thanks_and_clears_cache() {
        let mut cache = MemoryCache::new();
        cache.set(keys::DESCRIPTION, "stale").expect("set");
        let mut f = form_with(
            WizardKind::FirefoxOs,
            cache,
            "?utm_source=home%20screen&utm_campaign=",
            "",
        );
        f.cancel().expect("intro");
        let mut f = filled(f);
        f.set_country("Brazil");
        f.set_url("  http://example.com  ");
        f.set_email_ok(true);
        f.set_email(" me@example.com ");
        let stub = AcceptingStub::new();
        let history_before = f.history().len();

        let card = f.submit(&stub).await.expect("submit");

        assert_eq!(card, CardId::Thanks);
        assert_eq!(stub.call_count.load(Ordering::SeqCst), 1);
        assert_eq!(f.history().len(), history_before, "no history for submit cards");

        let p = stub.last_payload();
        assert!(p.happy);
        assert_eq!(p.description, "Camera app crashes");
        assert_eq!(p.product, "Firefox OS");
        assert_eq!(p.country.as_deref(), Some("Brazil"));
        assert_eq!(p.url, "http://example.com");
        assert_eq!(p.version.as_deref(), Some("1.3"));
        assert_eq!(p.email.as_deref(), Some("me@example.com"));
        assert_eq!(p.source.as_deref(), Some("home screen"));
        assert_eq!(p.campaign, None);

        assert_eq!(f.fields().description, "");
        assert!(!f.fields().email_ok);
        assert_eq!(f.fields().country, "Brazil");
        assert_eq!(f.cache().get(keys::DESCRIPTION), None);
        assert_eq!(f.cache().get(keys::EMAIL).as_deref(), Some("me@example.com"));
    }

    #[tokio::test]
    async fn failed_submission_persists_input_and_reenables_submit() {
        let mut f = filled(form());
        f.set_email_ok(true);
        let stub = ImmediateFailureStub::new();

        let card = f.submit(&stub).await.expect("submit");

        assert_eq!(card, CardId::Failure);
        assert_eq!(stub.call_count.load(Ordering::SeqCst), 1);
        assert_eq!(
            f.cache().get(keys::DESCRIPTION).as_deref(),
            Some("Camera app crashes")
        );
        assert_eq!(f.cache().get(keys::EMAIL_OK).as_deref(), Some("true"));
        assert!(f.submit_enabled());

        assert_eq!(f.retry(), Ok(CardId::Details));
        assert_eq!(f.fields().description, "Camera app crashes");
    }

    #[tokio::test]
    async fn hanging_request_keeps_wizard_on_submitting() {
        let mut f = filled(form());
        let stub = HangingStub {
            call_count: AtomicU32::new(0),
        };

        let outcome = tokio::time::timeout(Duration::from_millis(100), f.submit(&stub)).await;

        assert!(outcome.is_err(), "stub never answers");
        assert_eq!(stub.call_count.load(Ordering::SeqCst), 1);
        assert_eq!(f.active(), CardId::Submitting);
        assert!(!f.submit_enabled());
        assert_eq!(f.back(), None, "back is ignored while submitting");
    }

    #[test]
    fn second_submit_while_in_flight_is_rejected() {
        let mut f = filled(form());
        f.begin_submit().expect("first");
        assert_eq!(f.begin_submit(), Err(SubmitError::InFlight));

        let card = f.finish_submit(Ok(FeedbackResponse::default()));
        assert_eq!(card, CardId::Thanks);
    }

    #[test]
    fn next_on_last_input_card_does_not_enter_submitting() {
        let mut f = form();
        f.handle(UiEvent::HappySad(true));
        f.handle(UiEvent::Input(Field::Description, "hello".to_string()));
        f.handle(UiEvent::Next);
        assert_eq!(f.active(), CardId::Context);
        let history_len = f.history().len();

        f.handle(UiEvent::Next);
        assert_eq!(f.next(), Err(NavError::NoNextCard(CardId::Context)));
        assert_eq!(f.active(), CardId::Context);
        assert_eq!(f.history().len(), history_len);

        assert_eq!(f.back(), Some(CardId::Details));
        assert_eq!(f.forward(), Some(CardId::Context));
        assert!(f.begin_submit().is_ok());
    }

    #[test]
    fn result_card_fragments_start_on_intro() {
        for fragment in ["#submitting", "#thanks", "#failure"] {
            let mut f = form_with(WizardKind::FirefoxOs, MemoryCache::new(), "", fragment);
            assert_eq!(f.active(), CardId::Intro, "fragment {}", fragment);
            assert_eq!(f.select_happy_sad(true), Ok(CardId::Details));
        }

        let mut cache = MemoryCache::new();
        cache.set(keys::DESCRIPTION, "pending").expect("set");
        let f = form_with(WizardKind::FirefoxOs, cache, "", "#submitting");
        assert_eq!(f.active(), CardId::TryAgain);
    }

    #[test]
    fn navigation_is_locked_while_in_flight() {
        let mut f = filled(form());
        f.begin_submit().expect("first");

        let locked = Err(NavError::Locked(CardId::Submitting));
        assert_eq!(f.cancel(), locked);
        assert_eq!(f.retry(), locked);
        assert_eq!(f.next(), locked);
        assert_eq!(f.select_happy_sad(false), locked);
        assert_eq!(f.popstate(None), locked);
        f.handle(UiEvent::Cancel);
        f.handle(UiEvent::Retry);
        assert_eq!(f.active(), CardId::Submitting);
        assert_eq!(f.fields().description, "Camera app crashes");
        assert_eq!(f.begin_submit(), Err(SubmitError::InFlight));

        assert_eq!(f.finish_submit(Ok(FeedbackResponse::default())), CardId::Thanks);
        assert_eq!(f.cancel(), Ok(CardId::Intro));
    }

    #[test]
    fn try_again_card_submits_directly() {
        let mut cache = MemoryCache::new();
        cache.set(keys::DESCRIPTION, "retry me").expect("set");
        let mut f = form_with(WizardKind::FirefoxOs, cache, "", "");

        let payload = f.begin_submit().expect("payload");
        assert_eq!(payload.description, "retry me");
        assert!(!payload.happy);
        assert_eq!(f.active(), CardId::Submitting);
    }

    #[test]
    fn back_after_thanks_does_not_resubmit() {
        let mut f = filled(form());
        f.begin_submit().expect("payload");
        f.finish_submit(Ok(FeedbackResponse::default()));

        assert_eq!(f.back(), Some(CardId::Details));
        assert_eq!(f.forward(), Some(CardId::Context));
        assert_eq!(f.forward(), None);
    }

    #[test]
    fn cancel_resets_and_returns_to_intro() {
        let mut f = filled(form());
        f.set_email_ok(true);
        f.cancel().expect("intro");

        assert_eq!(f.active(), CardId::Intro);
        assert_eq!(f.fields().description, "");
        assert_eq!(f.surface().value(ids::DESCRIPTION).as_deref(), Some(""));
        assert!(!f.fields().email_ok);
        assert_eq!(
            f.history().current().expect("entry").fragment,
            "#intro"
        );
    }

    #[test]
    fn handle_dispatches_events() {
        let mut f = form();
        f.handle(UiEvent::HappySad(true));
        f.handle(UiEvent::Input(Field::Description, "hello".to_string()));
        f.handle(UiEvent::Next);
        assert_eq!(f.active(), CardId::Context);

        f.handle(UiEvent::Back);
        assert_eq!(f.active(), CardId::Details);

        f.handle(UiEvent::Popstate(None));
        assert_eq!(f.active(), CardId::Intro);

        f.handle(UiEvent::Input(Field::Device, "Flame".to_string()));
        assert_eq!(f.cache().get(keys::DEVICE).as_deref(), Some("Flame"));
    }

    #[test]
    fn generic_payload_omits_device_fields() {
        let mut f = filled(form_with(WizardKind::Generic, MemoryCache::new(), "", ""));
        f.set_country("Brazil");
        let p = f.begin_submit().expect("payload");
        assert_eq!(p.country, None);
        assert_eq!(p.version, None);
        assert_eq!(p.channel, None);
    }

    #[test]
    fn android_sends_channel_and_shows_review_link() {
        let s = Settings {
            channel: "beta".to_string(),
            ..settings()
        };
        let f = FeedbackForm::new(
            WizardKind::Android,
            &s,
            Box::new(MemoryCache::new()),
            "?prompted=1",
            MemoryHistory::default(),
        )
        .expect("form");
        assert!(f.surface().is_visible(ids::PLAY_STORE_CTA));
        assert!(f
            .surface()
            .text(ids::PLAY_STORE_CTA)
            .unwrap_or_default()
            .starts_with("market://"));

        let mut f = filled(f);
        let p = f.begin_submit().expect("payload");
        assert_eq!(p.channel.as_deref(), Some("beta"));
    }
}
