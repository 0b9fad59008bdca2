use anyhow::{Context, Result};
use deptcal_core::store::DocumentStore;
use owo_colors::OwoColorize;

use crate::prompt::{PresetAnswers, TerminalConfirmation};
use crate::render::{Render, pluralize};

pub async fn run(id: &str, answers: PresetAnswers) -> Result<()> {
    let (_, engine) = super::open_engine()?;

    let event = engine
        .store()
        .get(&engine.config().events_collection, id)
        .await?
        .map(|doc| doc.to_event())
        .transpose()
        .context("Stored event is malformed")?;

    if let Some(event) = &event {
        println!("{}", event.render());
    }

    let confirm = TerminalConfirmation::new(answers);
    let outcome = match engine.delete_event(id, event.as_ref(), &confirm).await {
        Ok(outcome) => outcome,
        Err(e) => {
            println!("{}", "Could not delete the event".red());
            return Err(e.into());
        }
    };

    if outcome.deleted_count == 0 {
        println!("{}", "Nothing deleted".dimmed());
        return Ok(());
    }

    println!(
        "{} {} {} deleted ({})",
        "-".red(),
        outcome.deleted_count,
        pluralize("event", outcome.deleted_count),
        outcome.scope.render()
    );
    Ok(())
}
