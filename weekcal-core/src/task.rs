//! Task types.
//!
//! A [`Task`] is the in-memory view model shared by the sync engine, the
//! local snapshots and the API. The remote record carries two more fields
//! (owner and creation time), see [`crate::remote::TaskRecord`].

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::WeekcalError;

/// One of the seven fixed columns of the week.
///
/// The serialized form is the French label, which is what remote records and
/// local snapshots store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "Lundi")]
    Monday,
    #[serde(rename = "Mardi")]
    Tuesday,
    #[serde(rename = "Mercredi")]
    Wednesday,
    #[serde(rename = "Jeudi")]
    Thursday,
    #[serde(rename = "Vendredi")]
    Friday,
    #[serde(rename = "Samedi")]
    Saturday,
    #[serde(rename = "Dimanche")]
    Sunday,
}

impl Weekday {
    /// All days in week order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Monday => "Lundi",
            Weekday::Tuesday => "Mardi",
            Weekday::Wednesday => "Mercredi",
            Weekday::Thursday => "Jeudi",
            Weekday::Friday => "Vendredi",
            Weekday::Saturday => "Samedi",
            Weekday::Sunday => "Dimanche",
        }
    }

    /// Parse a stored label exactly. Used for remote records, where anything
    /// else is a protocol error rather than user input.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == label)
    }

    fn english(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }
}

impl FromStr for Weekday {
    type Err = WeekcalError;

    /// Accepts the stored label, case-insensitively, plus English names and
    /// their three-letter abbreviations.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_lowercase();

        Weekday::ALL
            .into_iter()
            .find(|day| {
                day.label().to_lowercase() == input
                    || day.english() == input
                    || (input.len() == 3 && day.english().starts_with(&input))
            })
            .ok_or_else(|| WeekcalError::Validation(format!("Unknown day '{}'", s.trim())))
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Wall-clock time of day in canonical zero-padded 24-hour `HH:MM` form.
///
/// Canonical form makes string order equal chronological order, which is
/// how tasks are ordered inside a day.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskTime(String);

impl TaskTime {
    pub fn parse(input: &str) -> Result<Self, WeekcalError> {
        let input = input.trim();
        let time = NaiveTime::parse_from_str(input, "%H:%M").map_err(|_| {
            WeekcalError::Validation(format!(
                "Invalid time '{}'. Expected HH:MM (24-hour)",
                input
            ))
        })?;
        Ok(TaskTime(time.format("%H:%M").to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskTime {
    type Error = WeekcalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TaskTime::parse(&value)
    }
}

impl From<TaskTime> for String {
    fn from(time: TaskTime) -> Self {
        time.0
    }
}

impl fmt::Display for TaskTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A task as seen by the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub day: Weekday,
    pub time: TaskTime,
}

impl Task {
    /// Ordering inside a day column: time first, then title and id so that
    /// equal times still render in a stable order.
    pub fn cmp_in_day(&self, other: &Task) -> Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| self.title.cmp(&other.title))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.time, self.title)
    }
}

/// Tasks of one day, sorted by time.
pub fn tasks_for_day(tasks: &[Task], day: Weekday) -> Vec<&Task> {
    let mut day_tasks: Vec<&Task> = tasks.iter().filter(|t| t.day == day).collect();
    day_tasks.sort_by(|a, b| a.cmp_in_day(b));
    day_tasks
}

/// One column of the week view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayColumn {
    pub day: Weekday,
    pub tasks: Vec<Task>,
}

/// The task list grouped into the seven day columns, in week order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekView {
    pub days: Vec<DayColumn>,
}

impl WeekView {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let days = Weekday::ALL
            .into_iter()
            .map(|day| DayColumn {
                day,
                tasks: tasks_for_day(tasks, day).into_iter().cloned().collect(),
            })
            .collect();

        WeekView { days }
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(|d| d.tasks.is_empty())
    }

    pub fn task_count(&self) -> usize {
        self.days.iter().map(|d| d.tasks.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, title: &str, day: Weekday, time: &str) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            day,
            time: TaskTime::parse(time).unwrap(),
        }
    }

    #[test]
    fn test_weekday_serializes_as_label() {
        let json = serde_json::to_string(&Weekday::Monday).unwrap();
        assert_eq!(json, "\"Lundi\"");

        let day: Weekday = serde_json::from_str("\"Dimanche\"").unwrap();
        assert_eq!(day, Weekday::Sunday);
    }

    #[test]
    fn test_weekday_rejects_unknown_label_when_deserializing() {
        assert!(serde_json::from_str::<Weekday>("\"Monday\"").is_err());
    }

    #[test]
    fn test_weekday_from_str_accepts_aliases() {
        assert_eq!("Lundi".parse::<Weekday>().unwrap(), Weekday::Monday);
        assert_eq!("mercredi".parse::<Weekday>().unwrap(), Weekday::Wednesday);
        assert_eq!("Friday".parse::<Weekday>().unwrap(), Weekday::Friday);
        assert_eq!("sat".parse::<Weekday>().unwrap(), Weekday::Saturday);
        assert!("someday".parse::<Weekday>().is_err());
    }

    #[test]
    fn test_weekday_from_label_is_exact() {
        assert_eq!(Weekday::from_label("Jeudi"), Some(Weekday::Thursday));
        assert_eq!(Weekday::from_label("jeudi"), None);
    }

    #[test]
    fn test_time_is_canonicalized() {
        assert_eq!(TaskTime::parse("9:05").unwrap().as_str(), "09:05");
        assert_eq!(TaskTime::parse(" 18:30 ").unwrap().as_str(), "18:30");
        assert_eq!(TaskTime::parse("00:00").unwrap().as_str(), "00:00");
    }

    #[test]
    fn test_time_rejects_invalid_input() {
        assert!(TaskTime::parse("25:00").is_err());
        assert!(TaskTime::parse("ab:cd").is_err());
        assert!(TaskTime::parse("9h").is_err());
        assert!(TaskTime::parse("").is_err());
        assert!(TaskTime::parse("12:30:00").is_err());
    }

    #[test]
    fn test_time_deserialization_validates() {
        assert!(serde_json::from_str::<TaskTime>("\"7:45\"").is_ok());
        assert!(serde_json::from_str::<TaskTime>("\"noon\"").is_err());
    }

    #[test]
    fn test_canonical_order_is_chronological() {
        let nine = TaskTime::parse("9:00").unwrap();
        let ten = TaskTime::parse("10:00").unwrap();
        assert!(nine < ten);
    }

    #[test]
    fn test_tasks_for_day_filters_and_sorts() {
        let tasks = vec![
            task("a", "Sport", Weekday::Monday, "10:00"),
            task("b", "Réviser", Weekday::Monday, "09:00"),
            task("c", "Courses", Weekday::Tuesday, "08:00"),
        ];

        let monday: Vec<&str> = tasks_for_day(&tasks, Weekday::Monday)
            .into_iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(monday, vec!["b", "a"]);
    }

    #[test]
    fn test_equal_times_order_by_title() {
        let tasks = vec![
            task("1", "Zumba", Weekday::Friday, "18:00"),
            task("2", "Anglais", Weekday::Friday, "18:00"),
        ];

        let friday = tasks_for_day(&tasks, Weekday::Friday);
        assert_eq!(friday[0].title, "Anglais");
    }

    #[test]
    fn test_week_view_has_all_days_in_order() {
        let tasks = vec![task("a", "Sport", Weekday::Sunday, "10:00")];
        let view = WeekView::from_tasks(&tasks);

        assert_eq!(view.days.len(), 7);
        assert_eq!(view.days[0].day, Weekday::Monday);
        assert_eq!(view.days[6].day, Weekday::Sunday);
        assert_eq!(view.days[6].tasks.len(), 1);
        assert_eq!(view.task_count(), 1);
        assert!(!view.is_empty());
    }

    #[test]
    fn test_snapshot_shape_has_only_view_fields() {
        let json = serde_json::to_value(task("x", "Lire", Weekday::Monday, "21:00")).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys.len(), 4);
        assert_eq!(json["day"], "Lundi");
        assert_eq!(json["time"], "21:00");
    }
}
