use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ReviewId);

/// Transformation requested from the assist endpoint.
///
/// Modes are open-ended: the server decides which values it accepts, and the
/// mode selector offers whatever the page was configured with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssistMode(String);

impl AssistMode {
    pub const REWRITE: &'static str = "rewrite";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn rewrite() -> Self {
        Self::new(Self::REWRITE)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AssistMode {
    fn default() -> Self {
        Self::rewrite()
    }
}

impl fmt::Display for AssistMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeOption {
    pub value: AssistMode,
    pub label: String,
}

impl ModeOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: AssistMode::new(value),
            label: label.into(),
        }
    }
}

/// Options offered by the stock review page.
pub fn stock_mode_options() -> Vec<ModeOption> {
    vec![
        ModeOption::new(AssistMode::REWRITE, "Rewrite"),
        ModeOption::new("shorten", "Shorten"),
        ModeOption::new("funny", "Funny"),
        ModeOption::new("roast", "Roast"),
        ModeOption::new("professional", "Professional"),
        ModeOption::new("hype", "Hype"),
        ModeOption::new("savage_1star", "Savage 1-star"),
    ]
}
