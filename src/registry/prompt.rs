use inquire::InquireError;

/// A yes/no question put to the user before a file's permissions are changed.
pub trait Confirm {
    fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Asks on the terminal. Anything but an explicit "yes" counts as "no".
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, title: &str, message: &str) -> bool {
        let answer = inquire::Confirm::new(message)
            .with_help_message(title)
            .with_default(false)
            .prompt();

        match answer {
            Ok(yes) => yes,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => false,
            Err(e) => {
                tracing::warn!("could not ask for confirmation: {e}");
                false
            }
        }
    }
}
