use std::{fs, path::Path};

use anyhow::{anyhow, Context};
use review_client::{ModeSelector, ReviewCardControl, ReviewForm, StalePolicy};
use review_shared::domain::{stock_mode_options, AssistMode, ModeOption, ReviewId};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "review_assist.toml";
const ENV_PREFIX: &str = "REVIEW_ASSIST__";
const REVIEW_ID_PLACEHOLDER: &str = "{review_id}";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub generate_url: Option<String>,
    pub pros_cons_url: Option<String>,
    /// Review-card endpoint; `{review_id}` is substituted per card.
    pub card_pros_cons_url: Option<String>,
    pub csrf_token: String,
    /// Options of the mode selector. Empty means the page has no selector.
    pub modes: Vec<ModeOption>,
    pub default_mode: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub stale_policy: StalePolicy,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            generate_url: None,
            pros_cons_url: None,
            card_pros_cons_url: None,
            csrf_token: String::new(),
            modes: stock_mode_options(),
            default_mode: None,
            request_timeout_secs: None,
            stale_policy: StalePolicy::default(),
            log_filter: "info".into(),
        }
    }
}

/// Flag values that win over the file and the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub generate_url: Option<String>,
    pub pros_cons_url: Option<String>,
    pub csrf_token: Option<String>,
}

/// Reads `path` (or the optional default file), then applies
/// `REVIEW_ASSIST__*` environment overrides.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match path {
        Some(path) => read_settings_file(path)?,
        None if Path::new(DEFAULT_SETTINGS_FILE).exists() => {
            read_settings_file(Path::new(DEFAULT_SETTINGS_FILE))?
        }
        None => Settings::default(),
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("invalid settings file '{}'", path.display()))
}

pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

    if let Some(v) = var("GENERATE_URL") {
        settings.generate_url = Some(v);
    }
    if let Some(v) = var("PROS_CONS_URL") {
        settings.pros_cons_url = Some(v);
    }
    if let Some(v) = var("CARD_PROS_CONS_URL") {
        settings.card_pros_cons_url = Some(v);
    }
    if let Some(v) = var("CSRF_TOKEN") {
        settings.csrf_token = v;
    }
    if let Some(v) = var("DEFAULT_MODE") {
        settings.default_mode = Some(v);
    }
    if let Some(v) = var("REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = Some(parsed);
        }
    }
    if let Some(v) = var("STALE_POLICY") {
        match v.as_str() {
            "last_writer_wins" => settings.stale_policy = StalePolicy::LastWriterWins,
            "discard_stale" => settings.stale_policy = StalePolicy::DiscardStale,
            _ => {}
        }
    }
    if let Some(v) = var("LOG") {
        settings.log_filter = v;
    }
}

fn parse_url(field: &str, raw: &str) -> anyhow::Result<Url> {
    Url::parse(raw.trim()).with_context(|| format!("invalid {field} '{raw}'"))
}

impl Settings {
    pub fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(url) = overrides.generate_url {
            self.generate_url = Some(url);
        }
        if let Some(url) = overrides.pros_cons_url {
            self.pros_cons_url = Some(url);
        }
        if let Some(token) = overrides.csrf_token {
            self.csrf_token = token;
        }
    }

    /// Layout of the review-authoring form described by these settings.
    pub fn review_form(&self, text: impl Into<String>) -> anyhow::Result<ReviewForm> {
        let mut form = ReviewForm::new(text)
            .with_csrf_token(self.csrf_token.clone())
            .with_undo_control()
            .with_status_element()
            .with_modal();

        if !self.modes.is_empty() {
            let mut selector = ModeSelector::new(self.modes.clone());
            if let Some(default_mode) = &self.default_mode {
                let mode = AssistMode::new(default_mode.clone());
                if !selector.offers(&mode) {
                    return Err(anyhow!("default_mode '{default_mode}' is not a configured mode"));
                }
                selector.selected = mode;
            }
            form = form.with_mode_selector(selector);
        }
        if let Some(raw) = &self.generate_url {
            form = form.with_generate_url(parse_url("generate_url", raw)?);
        }
        if let Some(raw) = &self.pros_cons_url {
            form = form.with_pros_cons_url(parse_url("pros_cons_url", raw)?);
        }
        Ok(form)
    }

    pub fn card_control(&self, review_id: ReviewId) -> anyhow::Result<ReviewCardControl> {
        let template = self
            .card_pros_cons_url
            .as_deref()
            .ok_or_else(|| anyhow!("card_pros_cons_url is not configured"))?;
        if !template.contains(REVIEW_ID_PLACEHOLDER) {
            return Err(anyhow!(
                "card_pros_cons_url must contain {REVIEW_ID_PLACEHOLDER}"
            ));
        }
        let raw = template.replace(REVIEW_ID_PLACEHOLDER, &review_id.to_string());
        Ok(ReviewCardControl {
            review_id: Some(review_id),
            pros_cons_url: Some(parse_url("card_pros_cons_url", &raw)?),
        })
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
