use std::path::Path;

use anyhow::{Context, Result, bail};
use deptcal_core::EventDraft;
use owo_colors::OwoColorize;

use crate::render::pluralize;
use crate::utils::tui;

/// Fill in `departmentId` from the config when the draft leaves it out.
fn apply_default_department(draft: &mut EventDraft, default: Option<String>) -> Result<()> {
    if !draft.event.department_id.is_empty() {
        return Ok(());
    }
    match default {
        Some(department) => {
            draft.event.department_id = department;
            Ok(())
        }
        None => bail!("Draft has no departmentId and no default_department is configured"),
    }
}

pub async fn run(path: &Path, count: Option<usize>) -> Result<()> {
    let (config, engine) = super::open_engine()?;

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read draft {}", path.display()))?;
    let mut draft: EventDraft = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse draft {}", path.display()))?;

    apply_default_department(&mut draft, config.default_department)?;

    let title = draft.event.title.clone();
    let spinner = tui::create_spinner(format!("Saving {}", title));
    let result = engine.save_event(draft, count).await;
    spinner.finish_and_clear();

    match result {
        Ok(outcome) => {
            println!(
                "{} {} {} created",
                "+".green(),
                outcome.occurrences,
                pluralize("occurrence", outcome.occurrences)
            );
            println!(
                "  {}",
                format!(
                    "{} {} written",
                    outcome.created_count,
                    pluralize("document", outcome.created_count)
                )
                .dimmed()
            );
            if outcome.fell_back {
                println!(
                    "  {}",
                    "Linked group was missing from the store, saved as a new group".yellow()
                );
            }
            Ok(())
        }
        Err(e) => {
            println!("{}", "Could not save the event".red());
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> EventDraft {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn missing_department_uses_configured_default() {
        let mut draft = parse(r#"{"id": "a", "title": "t", "startDate": "2026-01-05", "endDate": "2026-01-05"}"#);
        apply_default_department(&mut draft, Some("math".to_string())).unwrap();
        assert_eq!(draft.event.department_id, "math");
        assert_eq!(draft.event.target_department_ids(), vec!["math".to_string()]);
    }

    #[test]
    fn missing_department_without_default_is_rejected() {
        let mut draft = parse(r#"{"id": "a", "title": "t", "startDate": "2026-01-05", "endDate": "2026-01-05"}"#);
        assert!(apply_default_department(&mut draft, None).is_err());
    }

    #[test]
    fn explicit_department_is_kept() {
        let mut draft = parse(
            r#"{"id": "a", "title": "t", "startDate": "2026-01-05", "endDate": "2026-01-05", "departmentId": "art"}"#,
        );
        apply_default_department(&mut draft, Some("math".to_string())).unwrap();
        assert_eq!(draft.event.department_id, "art");
    }
}
