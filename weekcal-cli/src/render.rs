//! TUI rendering traits for weekcal types.
//!
//! Extension traits that add colored terminal rendering to weekcal-core
//! types and server responses using owo_colors.

use owo_colors::OwoColorize;
use weekcal_core::{DayColumn, Notification, NotificationKind, Task};

use crate::client::{StoreStatus, WeekState};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Notification {
    fn render(&self) -> String {
        match self.kind {
            NotificationKind::Success => format!("{} {}", "✓".green(), self.message),
            NotificationKind::ValidationError => {
                format!("{} {}", "!".yellow(), self.message.yellow())
            }
            NotificationKind::RemoteError => format!("{} {}", "✗".red(), self.message.red()),
            NotificationKind::LocalOnly => format!("{} {}", "i".blue(), self.message.blue()),
        }
    }
}

impl Render for Task {
    fn render(&self) -> String {
        format!("{} {} {}", self.time.bold(), self.title, self.id.dimmed())
    }
}

impl Render for DayColumn {
    fn render(&self) -> String {
        let mut lines = vec![format!(
            "{} {}",
            self.day.label().bold(),
            format!("({})", self.tasks.len()).dimmed()
        )];

        if self.tasks.is_empty() {
            lines.push(format!("   {}", "-".dimmed()));
        }
        for task in &self.tasks {
            lines.push(format!("   {}", task.render()));
        }

        lines.join("\n")
    }
}

impl Render for StoreStatus {
    fn render(&self) -> String {
        match (&self.error, self.degraded) {
            (Some(error), _) => format!(
                "{} {}",
                "Offline:".red().bold(),
                format!("{} (showing {})", error, source_label(&self.source)).red()
            ),
            (None, true) => "Some changes were only saved locally"
                .yellow()
                .to_string(),
            (None, false) => String::new(),
        }
    }
}

impl Render for WeekState {
    fn render(&self) -> String {
        let mut sections: Vec<String> = Vec::new();

        let status = self.status.render();
        if !status.is_empty() {
            sections.push(status);
        }

        if self.week.is_empty() {
            sections.push("No tasks this week".dimmed().to_string());
        } else {
            sections.extend(self.week.days.iter().map(|day| day.render()));
        }

        if self.selection.active {
            sections.push(
                format!("{} selected", self.selection.ids.len())
                    .dimmed()
                    .to_string(),
            );
        }

        sections.join("\n")
    }
}

fn source_label(source: &str) -> &str {
    match source {
        "local_snapshot" => "local data",
        "empty" => "nothing",
        _ => "remote data",
    }
}

/// Simple pluralization helper
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

/// Print each notification on its own line.
pub fn print_notifications(notifications: &[Notification]) {
    for notification in notifications {
        println!("{}", notification.render());
    }
}
