//! Operator interaction seam.
//!
//! Destructive steps go through a confirm-then-reconfirm gate; manual steps
//! (inviting users, updating CloudFormation stacks) block until the operator
//! acknowledges.  The CLI wires in a dialoguer-backed implementation; tests
//! and `--assume-yes` runs use [`AssumeAnswer`].

/// Interactive prompts, injected so migration logic stays testable.
pub trait Prompter {
    /// Yes/no question.
    fn confirm(&self, message: &str) -> bool;

    /// Free-form input.
    fn input(&self, message: &str) -> String;

    /// Masked input for credentials.
    fn secret(&self, message: &str) -> String;

    /// Display a message the operator must act on before continuing.
    fn acknowledge(&self, message: &str);

    /// Yes/no with an are-you-sure follow-up.  An unconfident "yes"
    /// (declined on the follow-up) re-asks the original question.
    fn confirm_sure(&self, message: &str) -> bool {
        loop {
            if !self.confirm(message) {
                return false;
            }
            if self.confirm("You chose Yes. Are you sure?") {
                return true;
            }
        }
    }
}

/// Non-interactive prompter giving the same answer to every question.
#[derive(Debug, Clone, Copy)]
pub struct AssumeAnswer(pub bool);

impl Prompter for AssumeAnswer {
    fn confirm(&self, _message: &str) -> bool {
        self.0
    }

    fn input(&self, _message: &str) -> String {
        String::new()
    }

    fn secret(&self, _message: &str) -> String {
        String::new()
    }

    fn acknowledge(&self, _message: &str) {}

    fn confirm_sure(&self, _message: &str) -> bool {
        self.0
    }
}
