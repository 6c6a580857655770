use inquire::{InquireError, Select};
use std::fmt;
use vodl_engine::{Rendition, RenditionChooser, VodError};

/// Asks the user to pick a rendition in the terminal.
pub struct PromptChooser;

struct Choice<'a> {
    number: usize,
    rendition: &'a Rendition,
}

impl fmt::Display for Choice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}) {} [{}] {}",
            self.number,
            self.rendition.name,
            self.rendition.group_id,
            self.rendition.resolution.as_deref().unwrap_or("")
        )
    }
}

impl RenditionChooser for PromptChooser {
    fn choose(&mut self, choices: &[&Rendition], default: usize) -> Result<usize, VodError> {
        let options: Vec<Choice<'_>> = choices
            .iter()
            .enumerate()
            .map(|(idx, rendition)| Choice {
                number: idx + 1,
                rendition,
            })
            .collect();

        Select::new("Choose quality", options)
            .with_starting_cursor(default.saturating_sub(1))
            .prompt()
            .map(|choice| choice.number)
            .map_err(|e| match e {
                InquireError::OperationCanceled | InquireError::OperationInterrupted => {
                    VodError::selection("cancelled by user")
                }
                other => VodError::selection(other.to_string()),
            })
    }
}
