// Locale selection and UI string lookup

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub const DEFAULT_FROM_TEXT: &str = "от";
pub const DEFAULT_TOUR_TEXT: &str = "Тур";

// Locales the formatters know how to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ru,
    En,
}

impl Locale {
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', '_']).next().unwrap_or_default();
        match primary.to_ascii_lowercase().as_str() {
            "ru" => Some(Locale::Ru),
            "en" => Some(Locale::En),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum LocaleError {
    #[error("Translation parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

// Localized UI strings by category and key, e.g. common.from
pub trait Localizer: Send + Sync {
    fn translate(&self, category: &str, key: &str) -> Option<String>;

    fn text_or(&self, category: &str, key: &str, default: &str) -> String {
        self.translate(category, key)
            .unwrap_or_else(|| default.to_string())
    }
}

pub type Translations = HashMap<String, HashMap<String, String>>;

// Translation table that can be swapped at runtime when the visitor switches language
#[derive(Debug, Default)]
pub struct StaticLocalizer {
    translations: RwLock<Translations>,
}

impl StaticLocalizer {
    pub fn new(translations: Translations) -> Self {
        Self {
            translations: RwLock::new(translations),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, LocaleError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn replace(&self, translations: Translations) {
        *self.translations.write() = translations;
    }
}

impl Localizer for StaticLocalizer {
    fn translate(&self, category: &str, key: &str) -> Option<String> {
        self.translations
            .read()
            .get(category)
            .and_then(|entries| entries.get(key))
            .cloned()
    }
}
