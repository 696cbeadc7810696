//! OS light/dark preference, used when the theme is set to follow the
//! system.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Appearance {
    #[default]
    Light,
    Dark,
}

impl Appearance {
    pub fn as_str(self) -> &'static str {
        match self {
            Appearance::Light => "light",
            Appearance::Dark => "dark",
        }
    }

    /// Browser chrome colour that goes with this appearance.
    pub fn theme_color(self) -> &'static str {
        match self {
            Appearance::Light => "#ffffff",
            Appearance::Dark => "#1a1a2e",
        }
    }
}

impl fmt::Display for Appearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of the system appearance. Swapped out in tests.
pub trait AppearanceSource: Send + Sync {
    fn detect(&self) -> Option<Appearance>;
}

/// Asks the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsAppearance;

impl AppearanceSource for OsAppearance {
    fn detect(&self) -> Option<Appearance> {
        detect_preferred_appearance()
    }
}

/// Always reports the same answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedAppearance(pub Option<Appearance>);

impl AppearanceSource for FixedAppearance {
    fn detect(&self) -> Option<Appearance> {
        self.0
    }
}

/// Best-effort OS lookup. `None` when there is no usable hint.
pub fn detect_preferred_appearance() -> Option<Appearance> {
    #[cfg(target_os = "macos")]
    {
        use std::process::Command;
        // A missing AppleInterfaceStyle key means light mode.
        let output = Command::new("/usr/bin/defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .ok()?;
        if !output.status.success() {
            return Some(Appearance::Light);
        }
        return Some(from_macos_style(&String::from_utf8_lossy(&output.stdout)));
    }

    #[cfg(target_os = "windows")]
    {
        use winreg::enums::HKEY_CURRENT_USER;
        use winreg::RegKey;
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let personalize = hkcu
            .open_subkey("Software\\Microsoft\\Windows\\CurrentVersion\\Themes\\Personalize")
            .ok()?;
        let value: u32 = personalize.get_value("AppsUseLightTheme").ok()?;
        return Some(if value == 0 {
            Appearance::Dark
        } else {
            Appearance::Light
        });
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(scheme) = gsettings("color-scheme") {
            if let Some(appearance) = from_gnome_color_scheme(&scheme) {
                return Some(appearance);
            }
        }
        gsettings("gtk-theme").map(|theme| from_gtk_theme(&theme))
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        None
    }
}

#[cfg(target_os = "linux")]
fn gsettings(key: &str) -> Option<String> {
    use std::process::Command;
    let output = Command::new("gsettings")
        .args(["get", "org.gnome.desktop.interface", key])
        .output()
        .ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn from_macos_style(stdout: &str) -> Appearance {
    if stdout.to_ascii_lowercase().contains("dark") {
        Appearance::Dark
    } else {
        Appearance::Light
    }
}

/// GNOME 42+ reports `'prefer-dark'`, `'prefer-light'` or `'default'`.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn from_gnome_color_scheme(value: &str) -> Option<Appearance> {
    let value = value.to_ascii_lowercase();
    if value.contains("prefer-dark") {
        Some(Appearance::Dark)
    } else if value.contains("prefer-light") || value.contains("default") {
        Some(Appearance::Light)
    } else {
        None
    }
}

/// Older GNOME themes carry "-dark" in the GTK theme name.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn from_gtk_theme(value: &str) -> Appearance {
    if value.to_ascii_lowercase().contains("-dark") {
        Appearance::Dark
    } else {
        Appearance::Light
    }
}
