//! Interactive delete-scope prompts.

use deptcal_core::deletion::{Choice, Confirmation, DeletePrompt};
use dialoguer::Select;

/// Answers given up front on the command line. Unanswered prompts are asked
/// interactively.
#[derive(Debug, Default, Clone, Copy)]
pub struct PresetAnswers {
    pub future: Option<bool>,
    pub linked: Option<bool>,
}

impl PresetAnswers {
    pub fn from_flags(future: bool, only_this: bool, linked: bool, this_department: bool) -> Self {
        PresetAnswers {
            future: flag_pair(future, only_this),
            linked: flag_pair(linked, this_department),
        }
    }
}

fn flag_pair(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

pub struct TerminalConfirmation {
    answers: PresetAnswers,
}

impl TerminalConfirmation {
    pub fn new(answers: PresetAnswers) -> Self {
        TerminalConfirmation { answers }
    }

    fn ask(prompt: &str, yes: &str, no: &str) -> Choice {
        let selection = Select::new()
            .with_prompt(prompt)
            .items(&[yes, no, "Cancel"])
            .default(1)
            .interact_opt();

        match selection {
            Ok(Some(0)) => Choice::Yes,
            Ok(Some(1)) => Choice::No,
            Ok(_) => Choice::Cancel,
            Err(e) => {
                tracing::warn!(error = %e, "Prompt failed, cancelling delete");
                Choice::Cancel
            }
        }
    }
}

fn preset(answer: Option<bool>) -> Option<Choice> {
    answer.map(|yes| if yes { Choice::Yes } else { Choice::No })
}

impl Confirmation for TerminalConfirmation {
    fn confirm(&self, prompt: &DeletePrompt) -> Choice {
        match prompt {
            DeletePrompt::FutureOccurrences {
                title,
                recurrence_index,
            } => preset(self.answers.future).unwrap_or_else(|| {
                Self::ask(
                    &format!("'{}' (occurrence {}) is part of a recurring series", title, recurrence_index),
                    "Delete this and all later occurrences",
                    "Delete only this occurrence",
                )
            }),
            DeletePrompt::LinkedSiblings {
                title,
                sibling_count,
            } => preset(self.answers.linked).unwrap_or_else(|| {
                Self::ask(
                    &format!(
                        "'{}' is linked to {} other {}",
                        title,
                        sibling_count,
                        if *sibling_count == 1 { "department" } else { "departments" }
                    ),
                    "Delete every linked department's copy",
                    "Delete only this department's copy",
                )
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_answer_prompts() {
        let answers = PresetAnswers::from_flags(true, false, false, true);
        let confirm = TerminalConfirmation::new(answers);

        let future = DeletePrompt::FutureOccurrences {
            title: "Mock exam".into(),
            recurrence_index: 2,
        };
        let linked = DeletePrompt::LinkedSiblings {
            title: "Mock exam".into(),
            sibling_count: 2,
        };
        assert_eq!(confirm.confirm(&future), Choice::Yes);
        assert_eq!(confirm.confirm(&linked), Choice::No);
    }

    #[test]
    fn no_flags_leave_prompts_open() {
        let answers = PresetAnswers::from_flags(false, false, false, false);
        assert!(answers.future.is_none());
        assert!(answers.linked.is_none());
    }
}
