// Card navigator for multi-step feedback wizards
//
// A deck is an ordered set of cards with exactly one active. Transitions are limited to declared
// neighbours plus allowed jumps; back/forward goes through `restore` and never records history.
//
// Surface elements: one per card (id = `CardId::as_id`, inactive cards carry `inactive`),
// `header-title`, `back-button-container` (hidden on no-back cards) and the card's focus target.

pub mod history;

use crate::ui::surface::Surface;
use history::{History, NavigationState};
use log::{info, warn};
use std::collections::HashSet;
use thiserror::Error;

pub const HEADER_TITLE_ID: &str = "header-title";
pub const BACK_BUTTON_ID: &str = "back-button-container";
pub const INACTIVE_CLASS: &str = "inactive";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardId {
    Intro,
    Details,
    Context,
    Submitting,
    Thanks,
    Failure,
    TryAgain,
}

impl CardId {
    pub const ALL: [CardId; 7] = [
        CardId::Intro,
        CardId::Details,
        CardId::Context,
        CardId::Submitting,
        CardId::Thanks,
        CardId::Failure,
        CardId::TryAgain,
    ];

    pub fn as_id(&self) -> &'static str {
        match self {
            CardId::Intro => "intro",
            CardId::Details => "moreinfo",
            CardId::Context => "context",
            CardId::Submitting => "submitting",
            CardId::Thanks => "thanks",
            CardId::Failure => "failure",
            CardId::TryAgain => "tryagain",
        }
    }

    pub fn parse(id: &str) -> Option<CardId> {
        let id = id.trim().trim_start_matches('#');
        CardId::ALL
            .iter()
            .copied()
            .find(|c| c.as_id().eq_ignore_ascii_case(id))
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    pub no_back: bool,
    /// Entered only through registered jumps. Forward/reverse stop at it, and a session never
    /// starts on or restores to it.
    pub no_nav: bool,
    pub focus: Option<String>,
}

impl Card {
    pub fn new(id: CardId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            no_back: false,
            no_nav: false,
            focus: None,
        }
    }

    pub fn no_back(mut self) -> Self {
        self.no_back = true;
        self
    }

    pub fn no_nav(mut self) -> Self {
        self.no_nav = true;
        self
    }

    pub fn focus(mut self, element_id: impl Into<String>) -> Self {
        self.focus = Some(element_id.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Card(CardId),
    Forward,
    Reverse,
}

impl Target {
    /// Parse a card id or the literal `forward`/`reverse` tokens.
    pub fn parse(s: &str) -> Result<Target, NavError> {
        match s.trim() {
            "forward" => Ok(Target::Forward),
            "reverse" => Ok(Target::Reverse),
            other => CardId::parse(other)
                .map(Target::Card)
                .ok_or_else(|| NavError::UnknownCard(other.to_string())),
        }
    }
}

impl From<CardId> for Target {
    fn from(id: CardId) -> Self {
        Target::Card(id)
    }
}

/// Navigation failures. All are recoverable: the deck is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("unknown card id {0:?}")]
    UnknownCard(String),
    #[error("card {0} is not part of this wizard")]
    NotInDeck(CardId),
    #[error("no card after {0}")]
    NoNextCard(CardId),
    #[error("no card before {0}")]
    NoPreviousCard(CardId),
    #[error("transition {from} -> {to} is not allowed")]
    NotAllowed { from: CardId, to: CardId },
    #[error("card {0} cannot be entered by navigation")]
    NotNavigable(CardId),
    #[error("navigation is locked while on {0}")]
    Locked(CardId),
    #[error("a wizard needs at least one card")]
    EmptyDeck,
}

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    active: usize,
    jumps: HashSet<(CardId, CardId)>,
}

impl Deck {
    /// Declare a wizard. The first card starts active.
    pub fn new(cards: Vec<Card>) -> Result<Self, NavError> {
        if cards.is_empty() {
            return Err(NavError::EmptyDeck);
        }
        Ok(Self {
            cards,
            active: 0,
            jumps: HashSet::new(),
        })
    }

    /// Allow a direct jump between two non-adjacent cards.
    pub fn allow(mut self, from: CardId, to: CardId) -> Self {
        self.jumps.insert((from, to));
        self
    }

    /// Allow a jump to `to` from every declared card.
    pub fn allow_from_all(mut self, to: CardId) -> Self {
        for card in &self.cards {
            self.jumps.insert((card.id, to));
        }
        self
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn active(&self) -> CardId {
        self.cards[self.active].id
    }

    pub fn active_card(&self) -> &Card {
        &self.cards[self.active]
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: CardId) -> Option<usize> {
        self.cards.iter().position(|c| c.id == id)
    }

    /// Whether plain navigation (forward/reverse, fragments, restored history) may land on `id`.
    pub fn navigable(&self, id: CardId) -> bool {
        self.position(id).is_some_and(|idx| !self.cards[idx].no_nav)
    }

    /// Declared neighbour after `id`. Cards marked no-nav have no neighbours.
    pub fn next_of(&self, id: CardId) -> Option<CardId> {
        let idx = self.position(id)?;
        self.linked(idx, idx.checked_add(1)?)
    }

    pub fn previous_of(&self, id: CardId) -> Option<CardId> {
        let idx = self.position(id)?;
        self.linked(idx, idx.checked_sub(1)?)
    }

    fn linked(&self, from: usize, to: usize) -> Option<CardId> {
        let to = self.cards.get(to)?;
        if self.cards[from].no_nav || to.no_nav {
            return None;
        }
        Some(to.id)
    }

    /// Transition table: self, declared neighbours, plus registered jumps.
    pub fn allows(&self, from: CardId, to: CardId) -> bool {
        from == to
            || self.next_of(from) == Some(to)
            || self.previous_of(from) == Some(to)
            || self.jumps.contains(&(from, to))
    }

    fn resolve(&self, target: Target) -> Result<CardId, NavError> {
        let current = self.active();
        match target {
            Target::Forward => self.next_of(current).ok_or(NavError::NoNextCard(current)),
            Target::Reverse => self
                .previous_of(current)
                .ok_or(NavError::NoPreviousCard(current)),
            Target::Card(id) => {
                if !self.contains(id) {
                    return Err(NavError::NotInDeck(id));
                }
                if !self.allows(current, id) {
                    return Err(NavError::NotAllowed {
                        from: current,
                        to: id,
                    });
                }
                Ok(id)
            }
        }
    }

    /// Switch to a card (or the next/previous one) and optionally record a history entry.
    ///
    /// On error nothing changes: no card is deactivated and no history is pushed.
    pub fn activate(
        &mut self,
        target: Target,
        record_history: bool,
        surface: &mut dyn Surface,
        history: &mut dyn History,
    ) -> Result<CardId, NavError> {
        let id = match self.resolve(target) {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    "[PHASE: cards] [STEP: activate] Ignoring navigation from {}: {}",
                    self.active(),
                    e
                );
                return Err(e);
            }
        };

        self.show(id, surface);
        if record_history {
            history.push_state(NavigationState::new(id.as_id()), &format!("#{}", id));
        }
        Ok(id)
    }

    /// Handle a back/forward navigation: re-show the card named in the restored state.
    ///
    /// A missing state means the page's initial entry, which is the intro card.
    pub fn restore(
        &mut self,
        state: Option<&NavigationState>,
        surface: &mut dyn Surface,
    ) -> Result<CardId, NavError> {
        let page = state.map(|s| s.page.as_str()).unwrap_or("intro");
        let id = match CardId::parse(page) {
            Some(id) if self.navigable(id) => id,
            Some(id) if self.contains(id) => {
                warn!("[PHASE: cards] [STEP: restore] Card {} is not restorable", id);
                return Err(NavError::NotNavigable(id));
            }
            Some(id) => {
                warn!("[PHASE: cards] [STEP: restore] Card {} not in this wizard", id);
                return Err(NavError::NotInDeck(id));
            }
            None => {
                warn!("[PHASE: cards] [STEP: restore] Unknown card id {:?}", page);
                return Err(NavError::UnknownCard(page.to_string()));
            }
        };

        self.show(id, surface);
        Ok(id)
    }

    /// Write the active card's state to the surface without transitioning.
    pub fn sync(&self, surface: &mut dyn Surface) {
        self.render(surface);
    }

    fn show(&mut self, id: CardId, surface: &mut dyn Surface) {
        let Some(idx) = self.position(id) else {
            return;
        };
        let from = self.active();
        self.active = idx;
        self.render(surface);
        info!(
            "[PHASE: cards] [STEP: activate] {} -> {}",
            from.as_id(),
            id.as_id()
        );
    }

    fn render(&self, surface: &mut dyn Surface) {
        let active = self.active_card();
        for card in &self.cards {
            surface.toggle_class(card.id.as_id(), INACTIVE_CLASS, card.id != active.id);
        }
        surface.set_text(HEADER_TITLE_ID, &active.title);
        surface.set_visible(BACK_BUTTON_ID, !active.no_back);
        if let Some(focus) = &active.focus {
            surface.focus(focus);
        }
    }
}

/// Pick the card a freshly loaded wizard starts on.
///
/// Priority: restored history state, URL fragment, pending submission in the cache, intro.
/// No-nav cards are skipped wherever they are named.
pub fn initial_card(
    deck: &Deck,
    history_state: Option<&NavigationState>,
    fragment: Option<&str>,
    has_pending_submission: bool,
) -> CardId {
    let usable = |id: Option<CardId>| id.filter(|c| deck.navigable(*c));

    if let Some(id) = usable(history_state.and_then(|s| CardId::parse(&s.page))) {
        return id;
    }
    if let Some(id) = usable(fragment.and_then(CardId::parse)) {
        return id;
    }
    if has_pending_submission && deck.contains(CardId::TryAgain) {
        return CardId::TryAgain;
    }
    if deck.contains(CardId::Intro) {
        CardId::Intro
    } else {
        deck.cards()[0].id
    }
}

#[cfg(test)]
mod tests {
    use super::history::MemoryHistory;
    use super::*;
    use crate::ui::surface::{Element, MemorySurface};

    fn three_card_deck() -> Deck {
        Deck::new(vec![
            Card::new(CardId::Intro, "Send feedback").no_back(),
            Card::new(CardId::Details, "Tell us more").focus("description"),
            Card::new(CardId::Thanks, "Thank you").no_back(),
        ])
        .expect("deck")
    }

    fn surface() -> MemorySurface {
        let mut s = MemorySurface::new()
            .with(HEADER_TITLE_ID, Element::visible())
            .with(BACK_BUTTON_ID, Element::visible())
            .with("description", Element::visible());
        for id in CardId::ALL {
            s.declare(id.as_id(), Element::visible());
        }
        s
    }

    fn active_cards(s: &MemorySurface, deck: &Deck) -> Vec<CardId> {
        deck.cards()
            .iter()
            .filter(|c| !s.has_class(c.id.as_id(), INACTIVE_CLASS))
            .map(|c| c.id)
            .collect()
    }

    #[test]
    fn forward_walks_declared_order() {
        let mut deck = three_card_deck();
        let mut s = surface();
        let mut h = MemoryHistory::new("");
        deck.sync(&mut s);

        assert_eq!(deck.activate(Target::Forward, true, &mut s, &mut h), Ok(CardId::Details));
        assert_eq!(deck.activate(Target::Forward, true, &mut s, &mut h), Ok(CardId::Thanks));
        assert_eq!(active_cards(&s, &deck), vec![CardId::Thanks]);
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn forward_past_last_card_is_a_noop_error() {
        let mut deck = three_card_deck();
        let mut s = surface();
        let mut h = MemoryHistory::new("");
        deck.activate(Target::Forward, true, &mut s, &mut h).expect("details");
        deck.activate(Target::Forward, true, &mut s, &mut h).expect("thanks");

        let err = deck.activate(Target::Forward, true, &mut s, &mut h);
        assert_eq!(err, Err(NavError::NoNextCard(CardId::Thanks)));
        assert_eq!(deck.active(), CardId::Thanks);
        assert_eq!(active_cards(&s, &deck), vec![CardId::Thanks]);
        assert_eq!(h.len(), 3, "failed navigation must not push history");
    }

    #[test]
    fn reverse_on_first_card_is_a_noop_error() {
        let mut deck = three_card_deck();
        let mut s = surface();
        let mut h = MemoryHistory::new("");
        assert_eq!(
            deck.activate(Target::Reverse, true, &mut s, &mut h),
            Err(NavError::NoPreviousCard(CardId::Intro))
        );
        assert_eq!(deck.active(), CardId::Intro);
    }

    #[test]
    fn activate_without_history_still_switches() {
        let mut deck = three_card_deck();
        let mut s = surface();
        let mut h = MemoryHistory::new("");
        deck.sync(&mut s);

        deck.activate(CardId::Details.into(), false, &mut s, &mut h)
            .expect("activate");

        assert_eq!(h.len(), 1);
        assert!(s.has_class("intro", INACTIVE_CLASS));
        assert!(!s.has_class("moreinfo", INACTIVE_CLASS));
    }

    #[test]
    fn history_entry_carries_page_and_fragment() {
        let mut deck = three_card_deck();
        let mut s = surface();
        let mut h = MemoryHistory::new("");
        deck.activate(Target::Forward, true, &mut s, &mut h).expect("forward");

        let entry = h.current().expect("entry");
        assert_eq!(entry.state, Some(NavigationState::new("moreinfo")));
        assert_eq!(entry.fragment, "#moreinfo");
    }

    #[test]
    fn chrome_follows_active_card() {
        let mut deck = three_card_deck();
        let mut s = surface();
        let mut h = MemoryHistory::new("");
        deck.sync(&mut s);
        assert!(!s.is_visible(BACK_BUTTON_ID));
        assert_eq!(s.text(HEADER_TITLE_ID).as_deref(), Some("Send feedback"));

        deck.activate(Target::Forward, true, &mut s, &mut h).expect("forward");
        assert!(s.is_visible(BACK_BUTTON_ID));
        assert_eq!(s.text(HEADER_TITLE_ID).as_deref(), Some("Tell us more"));
        assert_eq!(s.focused().as_deref(), Some("description"));
    }

    #[test]
    fn unlisted_jump_is_rejected_until_allowed() {
        let deck = three_card_deck();
        let mut s = surface();
        let mut h = MemoryHistory::new("");

        let mut strict = deck.clone();
        assert_eq!(
            strict.activate(CardId::Thanks.into(), false, &mut s, &mut h),
            Err(NavError::NotAllowed {
                from: CardId::Intro,
                to: CardId::Thanks
            })
        );

        let mut relaxed = deck.allow(CardId::Intro, CardId::Thanks);
        assert_eq!(
            relaxed.activate(CardId::Thanks.into(), false, &mut s, &mut h),
            Ok(CardId::Thanks)
        );
    }

    #[test]
    fn cards_outside_the_deck_are_rejected() {
        let mut deck = three_card_deck();
        let mut s = surface();
        let mut h = MemoryHistory::new("");
        assert_eq!(
            deck.activate(CardId::Failure.into(), true, &mut s, &mut h),
            Err(NavError::NotInDeck(CardId::Failure))
        );
        assert_eq!(Target::parse("bogus"), Err(NavError::UnknownCard("bogus".into())));
    }

    #[test]
    fn back_then_restore_does_not_push_history() {
        let mut deck = three_card_deck();
        let mut s = surface();
        let mut h = MemoryHistory::new("");
        deck.activate(Target::Forward, true, &mut s, &mut h).expect("forward");
        deck.activate(Target::Forward, true, &mut s, &mut h).expect("forward");

        let state = h.back().expect("can go back");
        assert_eq!(deck.restore(state.as_ref(), &mut s), Ok(CardId::Details));
        assert_eq!(h.len(), 3);

        let state = h.back().expect("can go back");
        assert_eq!(state, None);
        assert_eq!(deck.restore(state.as_ref(), &mut s), Ok(CardId::Intro));

        let state = h.forward().expect("can go forward");
        assert_eq!(deck.restore(state.as_ref(), &mut s), Ok(CardId::Details));
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn restore_with_unknown_page_is_noop() {
        let mut deck = three_card_deck();
        let mut s = surface();
        let state = NavigationState::new("nope");
        assert!(deck.restore(Some(&state), &mut s).is_err());
        assert_eq!(deck.active(), CardId::Intro);
    }

    #[test]
    fn target_parse_accepts_tokens_and_ids() {
        assert_eq!(Target::parse("forward"), Ok(Target::Forward));
        assert_eq!(Target::parse("reverse"), Ok(Target::Reverse));
        assert_eq!(Target::parse("#thanks"), Ok(Target::Card(CardId::Thanks)));
        assert_eq!(CardId::parse("MOREINFO"), Some(CardId::Details));
    }

    fn deck_with_result_cards() -> Deck {
        Deck::new(vec![
            Card::new(CardId::Intro, "i"),
            Card::new(CardId::Context, "c"),
            Card::new(CardId::Submitting, "s").no_nav(),
            Card::new(CardId::Thanks, "t").no_nav(),
        ])
        .expect("deck")
        .allow(CardId::Context, CardId::Submitting)
        .allow(CardId::Submitting, CardId::Thanks)
    }

    #[test]
    fn forward_stops_before_no_nav_card() {
        let mut deck = deck_with_result_cards();
        let mut s = surface();
        let mut h = MemoryHistory::new("");
        deck.activate(Target::Forward, true, &mut s, &mut h).expect("context");

        assert_eq!(
            deck.activate(Target::Forward, true, &mut s, &mut h),
            Err(NavError::NoNextCard(CardId::Context))
        );
        assert_eq!(deck.active(), CardId::Context);
        assert_eq!(h.len(), 2);

        deck.activate(CardId::Submitting.into(), false, &mut s, &mut h)
            .expect("registered jump");
        assert_eq!(deck.next_of(CardId::Submitting), None);
        assert_eq!(deck.previous_of(CardId::Submitting), None);
        assert_eq!(
            deck.activate(Target::Reverse, true, &mut s, &mut h),
            Err(NavError::NoPreviousCard(CardId::Submitting))
        );
        deck.activate(CardId::Thanks.into(), false, &mut s, &mut h)
            .expect("registered jump");
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn no_nav_cards_are_never_restored_or_started_on() {
        let mut deck = deck_with_result_cards();
        let mut s = surface();

        let state = NavigationState::new("submitting");
        assert_eq!(
            deck.restore(Some(&state), &mut s),
            Err(NavError::NotNavigable(CardId::Submitting))
        );
        assert_eq!(deck.active(), CardId::Intro);

        assert_eq!(initial_card(&deck, Some(&state), None, false), CardId::Intro);
        assert_eq!(initial_card(&deck, None, Some("#submitting"), false), CardId::Intro);
        assert_eq!(initial_card(&deck, None, Some("#thanks"), false), CardId::Intro);
        assert_eq!(initial_card(&deck, None, Some("#context"), false), CardId::Context);
    }

    #[test]
    fn initial_card_priority() {
        let deck = Deck::new(vec![
            Card::new(CardId::Intro, "i"),
            Card::new(CardId::Details, "d"),
            Card::new(CardId::TryAgain, "t"),
        ])
        .expect("deck");

        let state = NavigationState::new("moreinfo");
        assert_eq!(initial_card(&deck, Some(&state), Some("#tryagain"), true), CardId::Details);
        assert_eq!(initial_card(&deck, None, Some("#tryagain"), false), CardId::TryAgain);
        assert_eq!(initial_card(&deck, None, Some("#thanks"), true), CardId::TryAgain);
        assert_eq!(initial_card(&deck, None, None, false), CardId::Intro);
    }

    #[test]
    fn empty_deck_is_rejected() {
        assert_eq!(Deck::new(Vec::new()).unwrap_err(), NavError::EmptyDeck);
    }
}
