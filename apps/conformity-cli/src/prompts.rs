//! Dialoguer-backed implementation of the migration prompt seam.

use conformity_migration::Prompter;
use dialoguer::{Confirm, Input, Password, Select};

/// Interactive prompter for terminal sessions.  Every method degrades to
/// the safe answer (no / empty) if the terminal goes away mid-prompt.
#[derive(Debug, Default)]
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn confirm(&self, message: &str) -> bool {
        Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()
            .unwrap_or(false)
    }

    fn input(&self, message: &str) -> String {
        Input::<String>::new()
            .with_prompt(message)
            .interact_text()
            .unwrap_or_default()
    }

    fn secret(&self, message: &str) -> String {
        Password::new()
            .with_prompt(message)
            .interact()
            .unwrap_or_default()
    }

    fn acknowledge(&self, message: &str) {
        println!("{message}");
        loop {
            let choice = Select::new()
                .with_prompt("Continue when done")
                .items(&["Done", "Not yet"])
                .default(0)
                .interact();
            match choice {
                Ok(0) | Err(_) => return,
                _ => continue,
            }
        }
    }
}

/// Pick one item from a fixed list, returning it as an owned string.
pub fn select_one(message: &str, items: &[&str]) -> String {
    let index = Select::new()
        .with_prompt(message)
        .items(items)
        .default(0)
        .interact()
        .unwrap_or(0);
    items[index].to_string()
}
