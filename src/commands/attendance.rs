use anyhow::Result;
use deptcal_core::AttendanceStatus;
use owo_colors::OwoColorize;

use crate::render::pluralize;

pub async fn run(recurrence_group_id: &str, participant: &str, status: AttendanceStatus) -> Result<()> {
    let (_, engine) = super::open_engine()?;

    let outcome = engine
        .batch_update_attendance(recurrence_group_id, participant, status)
        .await?;

    if outcome.updated_count == 0 {
        println!("{}", format!("No occurrences found for series {}", recurrence_group_id).dimmed());
        return Ok(());
    }

    println!(
        "{} {} marked {:?} on {} {}",
        "~".yellow(),
        participant,
        status,
        outcome.updated_count,
        pluralize("document", outcome.updated_count)
    );
    Ok(())
}
