//! Language name to locale code mapping used for sheet column headers.
//!
//! Both directions are built once from the same table, so every locale that
//! resolves from a name also has a display form.

use std::collections::HashMap;
use std::sync::OnceLock;

/// A supported destination locale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    /// Locale code, e.g. "zh-Hans"
    pub code: &'static str,
    /// Language name as written in sheet headers, e.g. "Chinese (Simplified)"
    pub name: &'static str,
}

impl Locale {
    /// Display form, e.g. "English (en)"
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }
}

const LOCALES: &[Locale] = &[
    Locale { code: "en", name: "English" },
    Locale { code: "es", name: "Spanish" },
    Locale { code: "fr", name: "French" },
    Locale { code: "de", name: "German" },
    Locale { code: "it", name: "Italian" },
    Locale { code: "ja", name: "Japanese" },
    Locale { code: "ko", name: "Korean" },
    Locale { code: "pt", name: "Portuguese" },
    Locale { code: "ru", name: "Russian" },
    Locale { code: "zh-Hans", name: "Chinese (Simplified)" },
    Locale { code: "zh-Hant", name: "Chinese (Traditional)" },
    Locale { code: "ar", name: "Arabic" },
    Locale { code: "hi", name: "Hindi" },
    Locale { code: "sw", name: "Swahili" },
    Locale { code: "tr", name: "Turkish" },
    Locale { code: "vi", name: "Vietnamese" },
    Locale { code: "pl", name: "Polish" },
    Locale { code: "nl", name: "Dutch" },
    Locale { code: "th", name: "Thai" },
    Locale { code: "uk", name: "Ukrainian" },
];

struct LocaleIndex {
    by_name: HashMap<String, &'static Locale>,
    by_code: HashMap<String, &'static Locale>,
}

static INDEX: OnceLock<LocaleIndex> = OnceLock::new();

fn index() -> &'static LocaleIndex {
    INDEX.get_or_init(|| LocaleIndex {
        by_name: LOCALES
            .iter()
            .map(|locale| (locale.name.to_lowercase(), locale))
            .collect(),
        by_code: LOCALES
            .iter()
            .map(|locale| (locale.code.to_lowercase(), locale))
            .collect(),
    })
}

/// All supported locales in table order
pub fn supported_locales() -> &'static [Locale] {
    LOCALES
}

/// Resolve a header language name to its locale code (case-insensitive, trimmed)
pub fn locale_for(language_name: &str) -> Option<&'static str> {
    index()
        .by_name
        .get(&language_name.trim().to_lowercase())
        .map(|locale| locale.code)
}

/// Display name for a locale code, e.g. "en" => "English (en)"
pub fn name_for(locale_code: &str) -> Option<String> {
    index()
        .by_code
        .get(&locale_code.trim().to_lowercase())
        .map(|locale| locale.display_name())
}
