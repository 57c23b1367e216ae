//! Review page widgets that hold a little state of their own: star rating,
//! character counter, review card toggles and submit validation.

use crate::error::WidgetError;

pub const MAX_STARS: u8 = 5;

/// Star input where clicking the selected star again clears the rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StarRating {
    value: u8,
}

impl StarRating {
    pub fn new(checked: Option<u8>) -> Result<Self, WidgetError> {
        let value = match checked {
            Some(star) => validate_star(star)?,
            None => 0,
        };
        Ok(Self { value })
    }

    /// Returns the rating after the click; `0` means unset.
    pub fn click(&mut self, star: u8) -> Result<u8, WidgetError> {
        let star = validate_star(star)?;
        self.value = if self.value == star { 0 } else { star };
        Ok(self.value)
    }

    pub fn value(&self) -> Option<u8> {
        (self.value > 0).then_some(self.value)
    }

    pub fn is_active(&self, index: usize) -> bool {
        index < usize::from(self.value)
    }

    pub fn active_stars(&self) -> [bool; MAX_STARS as usize] {
        std::array::from_fn(|index| self.is_active(index))
    }

    pub fn label(&self) -> String {
        match self.value() {
            Some(value) => format!("{value}/{MAX_STARS}"),
            None => "Select rating".to_string(),
        }
    }
}

fn validate_star(star: u8) -> Result<u8, WidgetError> {
    if (1..=MAX_STARS).contains(&star) {
        Ok(star)
    } else {
        Err(WidgetError::StarOutOfRange {
            value: star,
            max: MAX_STARS,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharCounter {
    count: usize,
}

impl CharCounter {
    pub fn new(text: &str) -> Self {
        let mut counter = Self::default();
        counter.sync(text);
        counter
    }

    pub fn sync(&mut self, text: &str) -> usize {
        self.count = text.chars().count();
        self.count
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// More/Less and spoiler buttons of one published review card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewCardToggles {
    collapsed: bool,
    spoiler_hidden: bool,
}

impl ReviewCardToggles {
    /// `None` when the card has no review text element to toggle.
    pub fn bind(has_text: bool, collapsed: bool, spoiler_hidden: bool) -> Option<Self> {
        has_text.then_some(Self {
            collapsed,
            spoiler_hidden,
        })
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn is_spoiler_hidden(&self) -> bool {
        self.spoiler_hidden
    }

    pub fn toggle_collapsed(&mut self) -> &'static str {
        self.collapsed = !self.collapsed;
        self.more_label()
    }

    pub fn toggle_spoiler(&mut self) -> &'static str {
        self.spoiler_hidden = !self.spoiler_hidden;
        self.spoiler_label()
    }

    pub fn more_label(&self) -> &'static str {
        if self.collapsed {
            "More"
        } else {
            "Less"
        }
    }

    pub fn spoiler_label(&self) -> &'static str {
        if self.spoiler_hidden {
            "Show spoiler"
        } else {
            "Hide spoiler"
        }
    }
}

pub const RATING_REQUIRED: &str = "Rating is required.";
pub const TEXT_REQUIRED: &str = "Review text is required.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFormValidator {
    rating_error: Option<&'static str>,
    text_error: Option<&'static str>,
}

impl ReviewFormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the form may be submitted.
    pub fn submit(&mut self, text: &str, rating: Option<u8>) -> bool {
        self.rating_error = rating.is_none().then_some(RATING_REQUIRED);
        self.text_error = text.trim().is_empty().then_some(TEXT_REQUIRED);
        self.rating_error.is_none() && self.text_error.is_none()
    }

    pub fn on_text_input(&mut self, text: &str) {
        if !text.trim().is_empty() {
            self.text_error = None;
        }
    }

    pub fn on_rating_change(&mut self) {
        self.rating_error = None;
    }

    pub fn rating_error(&self) -> Option<&'static str> {
        self.rating_error
    }

    pub fn text_error(&self) -> Option<&'static str> {
        self.text_error
    }
}

#[cfg(test)]
#[path = "tests/widgets_tests.rs"]
mod tests;
