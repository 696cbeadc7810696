use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::appearance::{Appearance, AppearanceSource};
use crate::core::storage::{KeyValueStore, StorageError, THEME_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::System => "system",
        }
    }

    /// light → dark → system → light
    pub fn next(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::System,
            ThemePreference::System => ThemePreference::Light,
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            "system" => Ok(ThemePreference::System),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

/// The user's theme choice and what it currently resolves to.
pub struct ThemeStore {
    store: Arc<dyn KeyValueStore>,
    appearance: Box<dyn AppearanceSource>,
    preference: ThemePreference,
    resolved: Appearance,
}

impl ThemeStore {
    /// Load the saved preference. Unknown or unreadable values fall back
    /// to following the system.
    pub fn load(store: Arc<dyn KeyValueStore>, appearance: Box<dyn AppearanceSource>) -> Self {
        let preference = match store.get(THEME_KEY) {
            Ok(Some(saved)) => saved.parse().unwrap_or_else(|err: String| {
                warn!(error = %err, "Ignoring saved theme");
                ThemePreference::default()
            }),
            Ok(None) => ThemePreference::default(),
            Err(err) => {
                warn!(error = %err, "Failed to read saved theme");
                ThemePreference::default()
            }
        };
        let mut theme = Self {
            store,
            appearance,
            preference,
            resolved: Appearance::default(),
        };
        theme.resolved = theme.resolve();
        theme
    }

    pub fn preference(&self) -> ThemePreference {
        self.preference
    }

    pub fn resolved(&self) -> Appearance {
        self.resolved
    }

    fn resolve(&self) -> Appearance {
        match self.preference {
            ThemePreference::Light => Appearance::Light,
            ThemePreference::Dark => Appearance::Dark,
            ThemePreference::System => self.appearance.detect().unwrap_or_default(),
        }
    }

    pub fn set(&mut self, preference: ThemePreference) -> Result<Appearance, StorageError> {
        self.store.set(THEME_KEY, preference.as_str())?;
        self.preference = preference;
        self.resolved = self.resolve();
        debug!(preference = %preference, resolved = %self.resolved, "Theme applied");
        Ok(self.resolved)
    }

    pub fn toggle(&mut self) -> Result<Appearance, StorageError> {
        self.set(self.preference.next())
    }

    /// Re-read the OS hint. Only matters while following the system.
    pub fn refresh_system(&mut self) -> Appearance {
        if self.preference == ThemePreference::System {
            self.resolved = self.resolve();
        }
        self.resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::appearance::FixedAppearance;
    use crate::core::storage::MemoryStore;

    fn store_with(saved: Option<&str>) -> Arc<dyn KeyValueStore> {
        let store = MemoryStore::new();
        if let Some(value) = saved {
            store.set(THEME_KEY, value).unwrap();
        }
        Arc::new(store)
    }

    #[test]
    fn defaults_to_system_and_light_without_hint() {
        let theme = ThemeStore::load(store_with(None), Box::new(FixedAppearance(None)));
        assert_eq!(theme.preference(), ThemePreference::System);
        assert_eq!(theme.resolved(), Appearance::Light);
    }

    #[test]
    fn system_follows_os_hint() {
        let theme = ThemeStore::load(
            store_with(Some("system")),
            Box::new(FixedAppearance(Some(Appearance::Dark))),
        );
        assert_eq!(theme.resolved(), Appearance::Dark);
    }

    #[test]
    fn toggle_cycles_and_persists() {
        let store = store_with(Some("light"));
        let mut theme = ThemeStore::load(
            Arc::clone(&store),
            Box::new(FixedAppearance(Some(Appearance::Light))),
        );

        assert_eq!(theme.toggle().unwrap(), Appearance::Dark);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        theme.toggle().unwrap();
        assert_eq!(theme.preference(), ThemePreference::System);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("system"));
        theme.toggle().unwrap();
        assert_eq!(theme.preference(), ThemePreference::Light);
    }

    struct SwitchableAppearance(Arc<std::sync::Mutex<Option<Appearance>>>);

    impl AppearanceSource for SwitchableAppearance {
        fn detect(&self) -> Option<Appearance> {
            *self.0.lock().unwrap()
        }
    }

    #[test]
    fn refresh_follows_os_changes_only_for_system() {
        let hint = Arc::new(std::sync::Mutex::new(Some(Appearance::Light)));
        let mut theme = ThemeStore::load(
            store_with(None),
            Box::new(SwitchableAppearance(Arc::clone(&hint))),
        );
        assert_eq!(theme.resolved(), Appearance::Light);

        *hint.lock().unwrap() = Some(Appearance::Dark);
        assert_eq!(theme.resolved(), Appearance::Light);
        assert_eq!(theme.refresh_system(), Appearance::Dark);

        theme.set(ThemePreference::Light).unwrap();
        assert_eq!(theme.refresh_system(), Appearance::Light);
    }

    #[test]
    fn unknown_saved_value_is_ignored() {
        let theme = ThemeStore::load(store_with(Some("sepia")), Box::new(FixedAppearance(None)));
        assert_eq!(theme.preference(), ThemePreference::System);
    }
}
