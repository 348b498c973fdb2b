//! Translation facade
//!
//! [`Translator`] is what application code calls. It resolves through any
//! backend (a plain resolver, a recording resolver or a chain) and then does
//! the work that sits on top of raw lookup: defaults, picking a plural form
//! for a count and filling in `%{name}` placeholders.

use crate::key::child_key;
use crate::{
    plural_category, DefaultValue, Key, KeyNormalizer, LookupOptions, MissingTranslation,
    Resolve, Result, StoreError,
};
use lexicon_log::{debug, warn};
use serde_json::{Map, Value};
use std::sync::Arc;

const ZERO_FORM: &str = "zero";
const OTHER_FORM: &str = "other";

/// Renders translations from a backend.
#[derive(Clone)]
pub struct Translator {
    backend: Arc<dyn Resolve>,
    normalizer: KeyNormalizer,
    default_locale: String,
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("default_locale", &self.default_locale)
            .finish_non_exhaustive()
    }
}

impl Translator {
    /// Create a translator over `backend` with `en` as default locale.
    pub fn new(backend: Arc<dyn Resolve>) -> Self {
        Self {
            backend,
            normalizer: KeyNormalizer::default(),
            default_locale: "en".to_string(),
        }
    }

    /// Set the default locale.
    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    /// Set the caller separator used when a request names none. Must match
    /// the backend's.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.normalizer = KeyNormalizer::new(separator);
        self
    }

    /// The default locale.
    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Translate `key` for `locale`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Missing`] when neither the key nor a default resolves,
    ///   or the plural form a count selects is absent
    /// - [`StoreError::MissingInterpolationArgument`] for an unmatched
    ///   placeholder
    /// - any backend failure
    pub fn translate(&self, locale: &str, key: &Key, options: &LookupOptions) -> Result<Value> {
        let value = match self.backend.resolve(locale, key, options) {
            Ok(value) => value,
            Err(e) if e.is_missing() => match &options.default {
                Some(DefaultValue::Key(default_key)) => {
                    debug!("Falling back from {} to {}", key, default_key);
                    let options = LookupOptions {
                        default: None,
                        ..options.clone()
                    };
                    return self.translate(locale, default_key, &options);
                }
                Some(DefaultValue::Value(value)) => value.clone(),
                None => return Err(e),
            },
            Err(e) => return Err(e),
        };

        let value = match (options.count, value) {
            (Some(count), Value::Object(forms)) => {
                self.select_plural(locale, key, options, count, forms)?
            }
            (_, value) => value,
        };

        match value {
            Value::String(text) => Ok(Value::String(interpolate(&text, key, options)?)),
            other => Ok(other),
        }
    }

    /// Translate `key` for the default locale.
    pub fn translate_default(&self, key: &Key, options: &LookupOptions) -> Result<Value> {
        self.translate(&self.default_locale, key, options)
    }

    /// Translate `key` to display text, never failing.
    ///
    /// Misses render as `translation missing: <locale>.<key>`; other failures
    /// are logged and render as the key.
    pub fn t(&self, locale: &str, key: impl Into<Key>) -> String {
        let key = key.into();
        match self.translate(locale, &key, &LookupOptions::new()) {
            Ok(Value::String(text)) => text,
            Ok(other) => other.to_string(),
            Err(StoreError::Missing(missing)) => missing.to_string(),
            Err(e) => {
                warn!("Failed to translate {}: {}", key, e);
                key.to_string()
            }
        }
    }

    fn select_plural(
        &self,
        locale: &str,
        key: &Key,
        options: &LookupOptions,
        count: f64,
        mut forms: Map<String, Value>,
    ) -> Result<Value> {
        let category = plural_category(count, locale).as_str();
        let form = if count == 0.0 && forms.contains_key(ZERO_FORM) {
            ZERO_FORM
        } else if forms.contains_key(category) {
            category
        } else if forms.contains_key(OTHER_FORM) {
            OTHER_FORM
        } else {
            category
        };

        match forms.remove(form) {
            Some(value) if !value.is_null() => Ok(value),
            _ => {
                let canonical = self.normalizer.flatten(
                    key,
                    options.scope.as_ref(),
                    options.separator.as_deref(),
                );
                Err(MissingTranslation::new(
                    locale,
                    key.clone(),
                    child_key(&canonical, form),
                    options.clone(),
                )
                .into())
            }
        }
    }
}

/// Fill `%{name}` placeholders from `options.args` and `count`.
///
/// `%%{` renders a literal `%{`. A `%{` without a closing brace is left as
/// is.
pub fn interpolate(text: &str, key: &Key, options: &LookupOptions) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        if let Some(escaped) = tail.strip_prefix("%%{") {
            out.push_str("%{");
            rest = escaped;
            continue;
        }

        let Some(body) = tail.strip_prefix("%{") else {
            out.push('%');
            rest = &tail[1..];
            continue;
        };
        let Some(end) = body.find('}') else {
            out.push_str(tail);
            rest = "";
            break;
        };

        let name = &body[..end];
        out.push_str(&argument(name, key, options)?);
        rest = &body[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

fn argument(name: &str, key: &Key, options: &LookupOptions) -> Result<String> {
    if let Some(value) = options.args.get(name) {
        return Ok(render(value));
    }
    if name == "count" {
        if let Some(count) = options.count {
            return Ok(render_number(count));
        }
    }
    Err(StoreError::MissingInterpolationArgument {
        key: key.to_string(),
        name: name.to_string(),
    })
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n
            .as_f64()
            .filter(|_| n.is_f64())
            .map(render_number)
            .unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

fn render_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryRepository, Resolver};
    use serde_json::json;

    fn translator() -> Translator {
        let resolver = Resolver::new(Arc::new(MemoryRepository::new()));
        resolver
            .store_translations(
                "en",
                &json!({
                    "greeting": "Hello %{name}",
                    "literal": "100%% sure, %%{name} stays",
                    "apples": {
                        "zero": "no apples",
                        "one": "one apple",
                        "other": "%{count} apples"
                    },
                    "pears": { "one": "one pear", "other": null },
                    "nested": { "a": "A", "b": "B" }
                }),
            )
            .unwrap();
        resolver
            .store_translations(
                "ru",
                &json!({ "files": { "one": "%{count} файл", "few": "%{count} файла", "many": "%{count} файлов" } }),
            )
            .unwrap();
        Translator::new(Arc::new(resolver))
    }

    #[test]
    fn test_interpolation() {
        let options = LookupOptions::new().arg("name", "Lucy");
        assert_eq!(
            translator()
                .translate("en", &Key::from("greeting"), &options)
                .unwrap(),
            json!("Hello Lucy")
        );
    }

    #[test]
    fn test_missing_argument() {
        let err = translator()
            .translate("en", &Key::from("greeting"), &LookupOptions::new())
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::MissingInterpolationArgument { ref name, .. } if name == "name"
        ));
    }

    #[test]
    fn test_escaped_placeholder() {
        assert_eq!(translator().t("en", "literal"), "100%% sure, %{name} stays");
    }

    #[test]
    fn test_plural_selection() {
        let translator = translator();
        let key = Key::from("apples");
        let render = |count: i32| {
            translator
                .translate("en", &key, &LookupOptions::new().count(count))
                .unwrap()
        };

        assert_eq!(render(0), json!("no apples"));
        assert_eq!(render(1), json!("one apple"));
        assert_eq!(render(3), json!("3 apples"));
    }

    #[test]
    fn test_plural_selection_by_language() {
        let translator = translator();
        let key = Key::from("files");
        let render = |count: i32| {
            translator
                .translate("ru", &key, &LookupOptions::new().count(count))
                .unwrap()
        };

        assert_eq!(render(21), json!("21 файл"));
        assert_eq!(render(3), json!("3 файла"));
        assert_eq!(render(11), json!("11 файлов"));
    }

    #[test]
    fn test_null_plural_form_is_missing() {
        let err = translator()
            .translate("en", &Key::from("pears"), &LookupOptions::new().count(2))
            .unwrap_err();
        assert_eq!(err.as_missing().unwrap().canonical_key, "pears\u{1}other");
    }

    #[test]
    fn test_defaults() {
        let translator = translator();

        let options = LookupOptions::new().default_key("greeting").arg("name", "Bob");
        assert_eq!(
            translator.translate("en", &Key::from("nope"), &options).unwrap(),
            json!("Hello Bob")
        );

        let options = LookupOptions::new().default_value("fallback");
        assert_eq!(
            translator.translate("en", &Key::from("nope"), &options).unwrap(),
            json!("fallback")
        );

        let options = LookupOptions::new().default_key("also_missing");
        let err = translator.translate("en", &Key::from("nope"), &options).unwrap_err();
        assert_eq!(err.as_missing().unwrap().canonical_key, "also_missing");
    }

    #[test]
    fn test_namespace_without_count() {
        assert_eq!(
            translator()
                .translate_default(&Key::from("nested"), &LookupOptions::new())
                .unwrap(),
            json!({ "a": "A", "b": "B" })
        );
    }

    #[test]
    fn test_t_reports_missing() {
        assert_eq!(translator().t("de", "greeting"), "translation missing: de.greeting");
        assert_eq!(translator().t("en", ["nested", "a"]), "A");
    }

    #[test]
    fn test_interpolate_edge_cases() {
        let key = Key::from("k");
        let options = LookupOptions::new().arg("n", 2).arg("f", 1.5).count(4);
        assert_eq!(interpolate("%{n}/%{f}/%{count}", &key, &options).unwrap(), "2/1.5/4");
        assert_eq!(interpolate("50% off %{", &key, &options).unwrap(), "50% off %{");
        assert_eq!(interpolate("", &key, &options).unwrap(), "");
    }
}
