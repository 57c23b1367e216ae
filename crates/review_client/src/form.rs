//! Element bindings of one review-authoring form, captured once at setup.
//!
//! Every optional control is modelled as an `Option` or a flag. A missing
//! control disables its operation; nothing is looked up again later.

use review_shared::domain::{stock_mode_options, AssistMode, ModeOption, ReviewId};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSelector {
    pub options: Vec<ModeOption>,
    pub selected: AssistMode,
}

impl ModeSelector {
    /// Selects the first option, or `rewrite` when the list is empty.
    pub fn new(options: Vec<ModeOption>) -> Self {
        let selected = options
            .first()
            .map(|option| option.value.clone())
            .unwrap_or_default();
        Self { options, selected }
    }

    pub fn offers(&self, mode: &AssistMode) -> bool {
        self.options.iter().any(|option| &option.value == mode)
    }
}

/// Pros/cons button of an already published review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewCardControl {
    pub review_id: Option<ReviewId>,
    pub pros_cons_url: Option<Url>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewForm {
    pub initial_text: String,
    /// Value of the hidden anti-forgery field; empty when the field is missing.
    pub csrf_token: String,
    pub mode_selector: Option<ModeSelector>,
    pub generate_url: Option<Url>,
    pub undo_control: bool,
    pub pros_cons_url: Option<Url>,
    pub status_element: bool,
    pub modal: bool,
    pub review_cards: Vec<ReviewCardControl>,
}

impl ReviewForm {
    /// A form holding only the review text field.
    pub fn new(initial_text: impl Into<String>) -> Self {
        Self {
            initial_text: initial_text.into(),
            ..Self::default()
        }
    }

    /// A form with every optional control present.
    pub fn complete(
        initial_text: impl Into<String>,
        csrf_token: impl Into<String>,
        generate_url: Url,
        pros_cons_url: Url,
    ) -> Self {
        Self::new(initial_text)
            .with_csrf_token(csrf_token)
            .with_mode_selector(ModeSelector::new(stock_mode_options()))
            .with_generate_url(generate_url)
            .with_undo_control()
            .with_pros_cons_url(pros_cons_url)
            .with_status_element()
            .with_modal()
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = token.into();
        self
    }

    pub fn with_mode_selector(mut self, selector: ModeSelector) -> Self {
        self.mode_selector = Some(selector);
        self
    }

    pub fn with_generate_url(mut self, url: Url) -> Self {
        self.generate_url = Some(url);
        self
    }

    pub fn with_undo_control(mut self) -> Self {
        self.undo_control = true;
        self
    }

    pub fn with_pros_cons_url(mut self, url: Url) -> Self {
        self.pros_cons_url = Some(url);
        self
    }

    pub fn with_status_element(mut self) -> Self {
        self.status_element = true;
        self
    }

    pub fn with_modal(mut self) -> Self {
        self.modal = true;
        self
    }

    pub fn with_review_card(mut self, card: ReviewCardControl) -> Self {
        self.review_cards.push(card);
        self
    }

    pub fn initial_mode(&self) -> AssistMode {
        self.mode_selector
            .as_ref()
            .map(|selector| selector.selected.clone())
            .unwrap_or_default()
    }
}
