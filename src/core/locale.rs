//! Interface language and message lookup.
//!
//! Message tables are nested TOML, addressed with dotted keys such as
//! `nav.home` or `articles.categories.ai-news`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use tracing::warn;

use crate::core::storage::{KeyValueStore, StorageError, LOCALE_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Zh];

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Zh => "zh",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "zh" => Ok(Locale::Zh),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

/// Flattened message tables for every locale.
#[derive(Debug, Default)]
pub struct Messages {
    tables: BTreeMap<Locale, BTreeMap<String, String>>,
}

impl Messages {
    pub fn from_toml(sources: &[(Locale, &str)]) -> Result<Self, toml::de::Error> {
        let mut tables = BTreeMap::new();
        for (locale, source) in sources {
            let table: toml::Table = toml::from_str(source)?;
            let mut flat = BTreeMap::new();
            flatten("", &table, &mut flat);
            tables.insert(*locale, flat);
        }
        Ok(Self { tables })
    }

    /// The tables shipped in `builtins/locales`.
    pub fn builtin() -> &'static Messages {
        static MESSAGES: OnceLock<Messages> = OnceLock::new();
        MESSAGES.get_or_init(|| {
            Messages::from_toml(&[
                (Locale::En, include_str!("../builtins/locales/en.toml")),
                (Locale::Zh, include_str!("../builtins/locales/zh.toml")),
            ])
            .expect("Failed to parse builtin locale tables")
        })
    }

    pub fn get(&self, locale: Locale, key: &str) -> Option<&str> {
        self.tables
            .get(&locale)
            .and_then(|table| table.get(key))
            .map(String::as_str)
    }

    /// Look `key` up in `locale`, then in English, then give back the key.
    pub fn lookup<'a>(&'a self, locale: Locale, key: &'a str) -> &'a str {
        self.get(locale, key)
            .or_else(|| self.get(Locale::En, key))
            .unwrap_or(key)
    }
}

fn flatten(prefix: &str, table: &toml::Table, out: &mut BTreeMap<String, String>) {
    for (name, value) in table {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        match value {
            toml::Value::String(text) => {
                out.insert(key, text.clone());
            }
            toml::Value::Table(nested) => flatten(&key, nested, out),
            other => {
                out.insert(key, other.to_string());
            }
        }
    }
}

/// Replace `{name}` placeholders. Unknown placeholders are left as-is.
pub fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (name, value) in args {
        result = result.replace(&format!("{{{name}}}"), value);
    }
    result
}

pub struct LocaleStore {
    store: Arc<dyn KeyValueStore>,
    messages: &'static Messages,
    locale: Locale,
}

impl LocaleStore {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_messages(store, Messages::builtin())
    }

    pub fn with_messages(store: Arc<dyn KeyValueStore>, messages: &'static Messages) -> Self {
        let locale = match store.get(LOCALE_KEY) {
            Ok(Some(saved)) => saved.parse().unwrap_or_else(|err: String| {
                warn!(error = %err, "Ignoring saved locale");
                Locale::default()
            }),
            Ok(None) => Locale::default(),
            Err(err) => {
                warn!(error = %err, "Failed to read saved locale");
                Locale::default()
            }
        };
        Self {
            store,
            messages,
            locale,
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn set(&mut self, locale: Locale) -> Result<(), StorageError> {
        self.store.set(LOCALE_KEY, locale.as_str())?;
        self.locale = locale;
        Ok(())
    }

    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.messages.lookup(self.locale, key)
    }

    pub fn t_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        interpolate(self.t(key), args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;

    fn leaked(messages: Messages) -> &'static Messages {
        Box::leak(Box::new(messages))
    }

    #[test]
    fn builtin_tables_load() {
        let messages = Messages::builtin();
        assert_eq!(messages.get(Locale::En, "nav.home"), Some("Home"));
        assert_eq!(messages.get(Locale::Zh, "nav.home"), Some("首页"));
        assert_eq!(
            messages.get(Locale::En, "articles.categories.ai-news"),
            Some("AI News")
        );
    }

    #[test]
    fn lookup_falls_back_to_english_then_key() {
        let messages = leaked(
            Messages::from_toml(&[
                (Locale::En, "[chat]\nsend = \"Send\"\noffline = \"Offline\"\n"),
                (Locale::Zh, "[chat]\nsend = \"发送\"\n"),
            ])
            .unwrap(),
        );
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut locale = LocaleStore::with_messages(store, messages);
        locale.set(Locale::Zh).unwrap();

        assert_eq!(locale.t("chat.send"), "发送");
        assert_eq!(locale.t("chat.offline"), "Offline");
        assert_eq!(locale.t("chat.missing"), "chat.missing");
    }

    #[test]
    fn saved_locale_is_restored() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set(LOCALE_KEY, "zh").unwrap();
        let locale = LocaleStore::load(Arc::clone(&store));
        assert_eq!(locale.locale(), Locale::Zh);
        assert_eq!(locale.t("theme.system"), "跟随系统");

        store.set(LOCALE_KEY, "fr").unwrap();
        assert_eq!(LocaleStore::load(store).locale(), Locale::En);
    }

    #[test]
    fn placeholders_are_substituted() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let locale = LocaleStore::load(store);
        assert_eq!(locale.t_with("articles.readTime", &[("time", "12")]), "12 min read");
        assert_eq!(interpolate("{a} and {b}", &[("a", "x")]), "x and {b}");
    }
}
