use crate::core::config::data::{path_display, Config};

impl Config {
    /// Human readable listing of every key, with effective values.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = vec!["Current configuration:".to_string()];
        match &self.api_base {
            Some(base) => lines.push(format!("  api-base: {base}")),
            None => lines.push(format!("  api-base: (unset, using {})", self.api_base())),
        }
        match self.use_keyring() {
            true => lines.push("  use-keyring: on".to_string()),
            false => lines.push("  use-keyring: off".to_string()),
        }
        match (&self.storage_path, self.storage_path()) {
            (Some(path), _) => lines.push(format!("  storage-path: {}", path_display(path))),
            (None, Some(default)) => lines.push(format!(
                "  storage-path: (unset, using {})",
                path_display(default)
            )),
            (None, None) => lines.push("  storage-path: (unset)".to_string()),
        }
        lines
    }

    pub fn print_all(&self) {
        for line in self.describe() {
            println!("{line}");
        }
    }
}
