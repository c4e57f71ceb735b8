//! Terminal collaborators for the policy editor.
//!
//! Notifications go to stdout, errors and alerts to stderr. There is no
//! router in a terminal, so navigation is only logged.

use bastion_policy::lifecycle::{Navigator, Notifier};
use log::{debug, info};
use std::io::{self, BufRead, Write};

/// Notifier and navigator writing to the terminal.
pub struct ConsoleUi {
    assume_yes: bool,
}

impl ConsoleUi {
    /// Create a console UI. With `assume_yes` every confirmation is
    /// answered without asking.
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Notifier for ConsoleUi {
    fn notify_success(&self, title: &str, text: &str) {
        println!("{}: {}", title, text);
    }

    fn notify_error(&self, title: &str, text: &str) {
        eprintln!("{}: {}", title, text);
    }

    fn show_error_msg(&self, description: &str) {
        eprintln!("{}", description);
    }

    fn alert_popup(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn confirm_popup(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        print!("{} [y/N] ", message);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }

    fn block_ui(&self) {
        debug!("Waiting for the policy store");
    }

    fn unblock_ui(&self) {
        debug!("Policy store answered");
    }

    fn show_inline_alert(&self, message: &str) {
        println!("Note: {}", message);
    }
}

impl Navigator for ConsoleUi {
    fn navigate_to(&self, path: &str, _trigger: bool) {
        info!("Navigating to {}", path);
    }

    fn allow_navigation(&self) {
        debug!("Navigation guard released");
    }

    fn prevent_navigation(&self, _message: &str) {
        debug!("Navigation guard installed");
    }
}
