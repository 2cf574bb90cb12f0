// Wizard presets. The desktop, Android and Firefox OS forms share one implementation; what
// differs between them is only which cards exist and how they are titled.

use crate::cards::{Card, CardId, Deck, NavError, BACK_BUTTON_ID, HEADER_TITLE_ID};
use crate::ui::surface::{Element, MemorySurface};

pub mod ids {
    pub const HAPPY_BUTTON: &str = "happy-button";
    pub const SAD_BUTTON: &str = "sad-button";
    pub const HAPPY_TEXT: &str = "happy-text";
    pub const SAD_TEXT: &str = "sad-text";
    pub const DESCRIPTION: &str = "description";
    pub const DESCRIPTION_COUNTER: &str = "description-counter";
    pub const DESCRIPTION_NEXT: &str = "description-next-btn";
    pub const COUNTRY: &str = "country";
    pub const DEVICE: &str = "device";
    pub const URL: &str = "id_url";
    pub const URL_ERROR: &str = "url-error";
    pub const EMAIL_OK: &str = "email-ok";
    pub const EMAIL: &str = "id_email";
    pub const EMAIL_ERROR: &str = "email-error";
    pub const SUBMIT: &str = "form-submit-btn";
    pub const PLAY_STORE_CTA: &str = "play-store-cta";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardKind {
    #[default]
    FirefoxOs,
    Android,
    Generic,
}

impl WizardKind {
    pub fn parse(s: &str) -> Option<WizardKind> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fxos" | "firefoxos" | "firefox-os" => Some(WizardKind::FirefoxOs),
            "android" => Some(WizardKind::Android),
            "generic" | "desktop" => Some(WizardKind::Generic),
            _ => None,
        }
    }

    pub fn form_name(&self) -> &'static str {
        match self {
            WizardKind::FirefoxOs => "fxos",
            WizardKind::Android => "android",
            WizardKind::Generic => "generic",
        }
    }

    /// Declared cards plus the jumps the form performs outside the linear order.
    pub fn deck(&self) -> Result<Deck, NavError> {
        let mut cards = vec![
            Card::new(CardId::Intro, "Send feedback")
                .no_back()
                .focus(ids::HAPPY_BUTTON),
            Card::new(CardId::Details, "Tell us more").focus(ids::DESCRIPTION),
        ];
        // Only Firefox OS asks for country/device; the others go straight to URL + email.
        let context_title = match self {
            WizardKind::FirefoxOs => "Where are you?",
            _ => "Anything else?",
        };
        cards.push(Card::new(CardId::Context, context_title).focus(ids::URL));
        // Result cards are entered only by the submit flow.
        cards.push(Card::new(CardId::Submitting, "Sending...").no_back().no_nav());
        cards.push(Card::new(CardId::Thanks, "Thank you").no_back().no_nav());
        cards.push(
            Card::new(CardId::Failure, "Something went wrong")
                .no_back()
                .no_nav(),
        );
        if *self == WizardKind::FirefoxOs {
            cards.push(
                Card::new(CardId::TryAgain, "Try again")
                    .no_back()
                    .focus(ids::SUBMIT),
            );
        }

        let mut deck = Deck::new(cards)?
            .allow(CardId::Context, CardId::Submitting)
            .allow(CardId::Submitting, CardId::Thanks)
            .allow(CardId::Submitting, CardId::Failure)
            .allow(CardId::Failure, CardId::Details)
            .allow_from_all(CardId::Intro);
        if *self == WizardKind::FirefoxOs {
            deck = deck.allow(CardId::TryAgain, CardId::Submitting);
        }
        Ok(deck)
    }

    pub fn asks_for_device(&self) -> bool {
        *self == WizardKind::FirefoxOs
    }
}

/// Declare every element the form and the navigator write to.
pub fn declare_elements(surface: &mut MemorySurface, deck: &Deck) {
    for card in deck.cards() {
        surface.declare(card.id.as_id(), Element::visible());
    }
    for id in [
        HEADER_TITLE_ID,
        BACK_BUTTON_ID,
        ids::HAPPY_BUTTON,
        ids::SAD_BUTTON,
        ids::DESCRIPTION,
        ids::DESCRIPTION_COUNTER,
        ids::DESCRIPTION_NEXT,
        ids::COUNTRY,
        ids::DEVICE,
        ids::URL,
        ids::EMAIL_OK,
        ids::EMAIL,
        ids::SUBMIT,
        ids::PLAY_STORE_CTA,
    ] {
        surface.declare(id, Element::visible());
    }
    for id in [
        ids::HAPPY_TEXT,
        ids::SAD_TEXT,
        ids::EMAIL_ERROR,
        ids::URL_ERROR,
    ] {
        surface.declare(id, Element::default());
    }
}
