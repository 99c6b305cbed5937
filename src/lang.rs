//! Message catalogs for user-facing text
//!
//! Catalogs are JSON documents embedded at build time. A lookup tries the
//! selected language first, then English, then renders the bare key.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::{self, Write};
use std::sync::OnceLock;

/// Language used when nothing else is configured or detected
pub const DEFAULT_LANGUAGE: &str = "en";

/// Embedded catalogs, keyed by language code
const CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../lang/en.json")),
    ("tr", include_str!("../lang/tr.json")),
];

/// Descriptive header of a catalog file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogMeta {
    pub name: String,
    pub native_name: String,
    pub code: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Catalog {
    meta: CatalogMeta,
    messages: HashMap<String, String>,
}

impl Catalog {
    fn embedded(code: &str) -> Option<Self> {
        let (_, source) = CATALOGS.iter().find(|(c, _)| *c == code)?;
        match serde_json::from_str(source) {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                tracing::warn!(language = code, error = %e, "embedded catalog is malformed");
                None
            }
        }
    }
}

/// Language codes with an embedded catalog, sorted
pub fn available_languages() -> Vec<&'static str> {
    let mut codes: Vec<&'static str> = CATALOGS.iter().map(|(code, _)| *code).collect();
    codes.sort_unstable();
    codes
}

/// Whether a catalog exists for `code`
pub fn is_available(code: &str) -> bool {
    CATALOGS.iter().any(|(c, _)| *c == code)
}

/// Native name of a language (e.g. "Türkçe"), or the upper-cased code
pub fn native_name(code: &str) -> String {
    Catalog::embedded(code)
        .map(|catalog| catalog.meta.native_name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| code.to_uppercase())
}

/// Detect the system language from `LANG`, then `LANGUAGE`
pub fn detect_system_language() -> Option<String> {
    detect_from([std::env::var("LANG").ok(), std::env::var("LANGUAGE").ok()])
}

fn detect_from(candidates: [Option<String>; 2]) -> Option<String> {
    candidates.into_iter().flatten().find_map(|value| {
        let code: String = value.chars().take(2).collect::<String>().to_lowercase();
        (code.chars().count() == 2 && is_available(&code)).then_some(code)
    })
}

/// Resolved message catalog passed down to everything that talks to the user
#[derive(Debug, Clone)]
pub struct Messages {
    code: String,
    catalog: Catalog,
}

impl Messages {
    /// Load the catalog for `code`, if one is embedded
    pub fn load(code: &str) -> Option<Self> {
        Catalog::embedded(code).map(|catalog| Self {
            code: code.to_string(),
            catalog,
        })
    }

    /// Built-in English messages
    pub fn english() -> &'static Messages {
        static ENGLISH: OnceLock<Messages> = OnceLock::new();
        ENGLISH.get_or_init(|| Self {
            code: DEFAULT_LANGUAGE.to_string(),
            catalog: Catalog::embedded(DEFAULT_LANGUAGE).unwrap_or_default(),
        })
    }

    /// Pick the configured language, else the system language, else English
    pub fn select(preferred: Option<&str>) -> Self {
        preferred
            .and_then(Self::load)
            .or_else(|| detect_system_language().and_then(|code| Self::load(&code)))
            .unwrap_or_else(|| Self::english().clone())
    }

    /// Language code of this catalog
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Native name of this catalog's language
    pub fn native_name(&self) -> &str {
        &self.catalog.meta.native_name
    }

    /// Look up `key` and fill its `{}` placeholders with `args` in order
    pub fn get(&self, key: &str, args: &[&dyn fmt::Display]) -> String {
        let template = self
            .catalog
            .messages
            .get(key)
            .or_else(|| Self::english().catalog.messages.get(key));

        match template {
            Some(template) => fill(template, args),
            None => {
                let mut rendered = format!("[{}]", key);
                for arg in args {
                    let _ = write!(rendered, " {}", arg);
                }
                rendered
            }
        }
    }
}

fn fill(template: &str, args: &[&dyn fmt::Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;

    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        match args.next() {
            Some(arg) => {
                let _ = write!(out, "{}", arg);
            }
            None => out.push_str("{}"),
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}
