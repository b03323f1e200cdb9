//! Create form input and its validation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::MutationError;
use crate::task::{TaskTime, Weekday};

/// Raw input for a create, as typed by the user.
///
/// Days are kept as text so that an unknown day name is a validation error
/// rather than a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub time: String,
    /// Used when `repeated` is false.
    #[serde(default)]
    pub day: Option<String>,
    /// Used when `repeated` is true.
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default)]
    pub repeated: bool,
}

/// A draft that passed validation: one record will be written per day.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDraft {
    pub title: String,
    pub time: TaskTime,
    /// Target days in week order, without duplicates.
    pub days: Vec<Weekday>,
}

impl TaskDraft {
    pub fn single(title: impl Into<String>, time: impl Into<String>, day: Weekday) -> Self {
        TaskDraft {
            title: title.into(),
            time: time.into(),
            day: Some(day.label().to_string()),
            days: Vec::new(),
            repeated: false,
        }
    }

    pub fn repeated(
        title: impl Into<String>,
        time: impl Into<String>,
        days: impl IntoIterator<Item = Weekday>,
    ) -> Self {
        TaskDraft {
            title: title.into(),
            time: time.into(),
            day: None,
            days: days.into_iter().map(|d| d.label().to_string()).collect(),
            repeated: true,
        }
    }

    pub fn validate(&self) -> Result<ValidDraft, MutationError> {
        let title = self.title.trim();
        let time = self.time.trim();
        if title.is_empty() || time.is_empty() {
            return Err(MutationError::Validation(
                "Please fill in all fields".to_string(),
            ));
        }

        let days: BTreeSet<Weekday> = if self.repeated {
            if self.days.is_empty() {
                return Err(MutationError::Validation(
                    "Select at least one day".to_string(),
                ));
            }
            self.days
                .iter()
                .map(|d| d.parse::<Weekday>())
                .collect::<Result<_, _>>()?
        } else {
            match self.day.as_deref().map(str::trim) {
                Some(day) if !day.is_empty() => BTreeSet::from([day.parse::<Weekday>()?]),
                _ => return Err(MutationError::Validation("Select a day".to_string())),
            }
        };

        let time = TaskTime::parse(time)?;

        Ok(ValidDraft {
            title: title.to_string(),
            time,
            days: days.into_iter().collect(),
        })
    }
}
