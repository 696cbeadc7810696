use std::error::Error;
use std::process::Command;

use tracing::warn;

use crate::core::auth::Redirector;

/// Sends the user to the login page in their desktop browser, printing the
/// address when no browser can be launched.
pub struct BrowserRedirector;

impl Redirector for BrowserRedirector {
    fn redirect(&self, url: &str) {
        println!("Opening {url}");
        if let Err(err) = open_in_browser(url) {
            warn!(error = %err, "Could not launch a browser");
            println!("Open this address in your browser to continue: {url}");
        }
    }
}

pub fn open_in_browser(url: &str) -> Result<(), Box<dyn Error>> {
    let (program, args): (&str, Vec<&str>) = if cfg!(target_os = "macos") {
        ("open", vec![url])
    } else if cfg!(target_os = "windows") {
        ("cmd", vec!["/C", "start", "", url])
    } else if cfg!(unix) {
        ("xdg-open", vec![url])
    } else {
        return Err(format!("no browser launcher configured for URL: {url}").into());
    };

    let status = Command::new(program).args(&args).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("failed to launch browser with {program}").into())
    }
}
