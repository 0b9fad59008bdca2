//! Colored terminal rendering for deptcal types.

use deptcal_core::Event;
use deptcal_core::deletion::DeleteScope;
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Event {
    fn render(&self) -> String {
        let dates = if self.start_date == self.end_date {
            self.start_date.format("%a %b %-d %Y").to_string()
        } else {
            format!(
                "{} - {}",
                self.start_date.format("%a %b %-d"),
                self.end_date.format("%a %b %-d %Y")
            )
        };

        let mut tags = vec![format!("[{}]", self.department_id)];
        if let (Some(_), Some(index)) = (&self.recurrence_group_id, self.recurrence_index) {
            tags.push(format!("#{}", index));
        }
        if self.related_group_id.is_some() {
            tags.push("linked".to_string());
        }

        format!("{:<28} {} {}", dates, self.title, tags.join(" ").dimmed())
    }
}

impl Render for DeleteScope {
    fn render(&self) -> String {
        match self {
            DeleteScope::Single => "this event".to_string(),
            DeleteScope::LinkedGroup => "all linked departments".to_string(),
            DeleteScope::FutureOccurrences => "this and later occurrences".to_string(),
            DeleteScope::Cancelled => "nothing".dimmed().to_string(),
        }
    }
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pluralizes_counts() {
        assert_eq!(pluralize("occurrence", 1), "occurrence");
        assert_eq!(pluralize("occurrence", 3), "occurrences");
        assert_eq!(pluralize("document", 0), "documents");
    }
}
