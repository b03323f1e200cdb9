use anyhow::Result;
use dialoguer::{Confirm, MultiSelect, Select};
use indicatif::{ProgressBar, ProgressStyle};
use weekcal_core::Weekday;

pub fn create_spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["-", "\\", "|", "/"])
        .template("{msg} {spinner}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.into());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

fn day_labels() -> Vec<&'static str> {
    Weekday::ALL.iter().map(|d| d.label()).collect()
}

/// Pick one day of the week.
pub fn select_day() -> Result<Weekday> {
    let index = Select::new()
        .with_prompt("  Day")
        .items(&day_labels())
        .default(0)
        .interact()?;
    Ok(Weekday::ALL[index])
}

/// Pick any number of days of the week, in week order.
pub fn select_days() -> Result<Vec<Weekday>> {
    let indices = MultiSelect::new()
        .with_prompt("  Days (space to toggle)")
        .items(&day_labels())
        .interact()?;
    Ok(indices.into_iter().map(|i| Weekday::ALL[i]).collect())
}

pub fn confirm(prompt: impl Into<String>) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt.into())
        .default(false)
        .interact()?)
}
