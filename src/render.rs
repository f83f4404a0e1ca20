//! Colored terminal rendering for confsync-core types.

use confsync_core::remote::Remote;
use confsync_core::{ApplyStats, Event, Plan, RemoteEventIndex, RemoteId};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Remote {
    fn render(&self) -> String {
        match self.account_identifier() {
            Some(account) => format!("📅 {} ({})", self.provider.name(), account),
            None => format!("📅 {}", self.provider.name()),
        }
    }
}

impl Render for Event {
    fn render(&self) -> String {
        format!(
            "{} {} {}",
            "+".green(),
            self.title().green(),
            self.render_dates().dimmed()
        )
    }
}

/// A plan alongside the remote events it was computed from, so removals can
/// be shown by title and dates instead of by opaque id.
pub struct PlanPreview<'a> {
    pub plan: &'a Plan,
    pub existing: &'a RemoteEventIndex,
}

impl PlanPreview<'_> {
    fn removal(&self, id: &RemoteId) -> String {
        let event = self
            .existing
            .iter()
            .find_map(|(event, existing_id)| (existing_id == id).then_some(event));

        match event {
            Some(event) => format!(
                "{} {} {}",
                "-".red(),
                event.title().red(),
                event.render_dates().dimmed()
            ),
            None => format!("{} {}", "-".red(), id.as_str().red()),
        }
    }
}

impl Render for PlanPreview<'_> {
    fn render(&self) -> String {
        if self.plan.is_empty() {
            return format!("   {}", "No changes".dimmed());
        }

        let mut lines = Vec::new();
        for id in &self.plan.to_remove {
            lines.push(format!("   {}", self.removal(id)));
        }
        for event in &self.plan.to_add {
            lines.push(format!("   {}", event.render()));
        }
        lines.join("\n")
    }
}

impl Render for ApplyStats {
    fn render(&self) -> String {
        format!(
            "Synced: {} {} added, {} {} removed",
            self.added,
            pluralize("event", self.added),
            self.removed,
            pluralize("event", self.removed)
        )
    }
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn event(title: &str, day: u32) -> Event {
        Event::new(
            title,
            NaiveDate::from_ymd_opt(2020, 3, day).unwrap(),
            NaiveDate::from_ymd_opt(2020, 3, day + 1).unwrap(),
            None,
            "",
        )
        .unwrap()
    }

    #[test]
    fn empty_plan_says_no_changes() {
        let preview = PlanPreview {
            plan: &Plan::default(),
            existing: &RemoteEventIndex::new(),
        };
        assert!(preview.render().contains("No changes"));
    }

    #[test]
    fn removals_show_the_remote_event_before_additions() {
        let old = event("OldConf", 5);
        let existing = RemoteEventIndex::from([(old, RemoteId::new("7a8b9c"))]);
        let plan = Plan {
            to_remove: [RemoteId::new("7a8b9c")].into(),
            to_add: [event("RustConf", 1)].into(),
        };

        let rendered = PlanPreview {
            plan: &plan,
            existing: &existing,
        }
        .render();

        let removal = rendered.find("OldConf").unwrap();
        let addition = rendered.find("RustConf").unwrap();
        assert!(removal < addition);
        assert!(rendered.contains("2020-03-05"));
        assert!(!rendered.contains("7a8b9c"));
    }

    #[test]
    fn unknown_removed_id_falls_back_to_the_id() {
        let plan = Plan {
            to_remove: [RemoteId::new("abc")].into(),
            to_add: Default::default(),
        };
        let rendered = PlanPreview {
            plan: &plan,
            existing: &RemoteEventIndex::new(),
        }
        .render();
        assert!(rendered.contains("abc"));
    }

    #[test]
    fn stats_are_pluralized() {
        let rendered = ApplyStats { removed: 1, added: 2 }.render();
        assert_eq!(rendered, "Synced: 2 events added, 1 event removed");
    }
}
