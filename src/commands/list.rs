use anyhow::Result;
use deptcal_core::Event;
use deptcal_core::store::DocumentStore;
use owo_colors::OwoColorize;

use crate::render::Render;

pub async fn run(department: Option<&str>) -> Result<()> {
    let (_, engine) = super::open_engine()?;

    let docs = engine
        .store()
        .get_all(&engine.config().events_collection)
        .await?;

    let mut events = Vec::with_capacity(docs.len());
    for doc in &docs {
        match doc.to_event() {
            Ok(event) => events.push(event),
            Err(e) => tracing::warn!(id = %doc.id, error = %e, "Skipping malformed event"),
        }
    }

    events.retain(|event: &Event| department.is_none_or(|dept| event.department_id == dept));
    events.sort_by(|a, b| {
        a.start_date
            .cmp(&b.start_date)
            .then_with(|| a.department_id.cmp(&b.department_id))
    });

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    for event in &events {
        println!("  {}", event.render());
    }

    Ok(())
}
