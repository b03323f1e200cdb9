use anyhow::Result;
use dialoguer::{Confirm, Input};
use weekcal_core::{TaskTime, Weekday};

use crate::client::CreateTaskRequest;
use crate::render::{Render, print_notifications};
use crate::utils::tui;

pub async fn run(
    title: Option<String>,
    time: Option<String>,
    day: Option<String>,
    days: Vec<String>,
) -> Result<()> {
    let interactive = title.is_none() || time.is_none() || (day.is_none() && days.is_empty());

    // --- Title ---
    let title = match title {
        Some(t) => t,
        None => Input::<String>::new()
            .with_prompt("  Title")
            .interact_text()?,
    };

    // --- Time ---
    let time = match time {
        Some(t) => t,
        None => Input::<String>::new()
            .with_prompt("  Time (HH:MM)")
            .validate_with(|input: &String| {
                TaskTime::parse(input).map(|_| ()).map_err(|e| e.to_string())
            })
            .interact_text()?,
    };

    // --- Day(s) ---
    let (day, days) = if day.is_some() || !days.is_empty() {
        (day, days)
    } else {
        let repeated = Confirm::new()
            .with_prompt("  Repeat on several days?")
            .default(false)
            .interact()?;
        if repeated {
            (None, labels(tui::select_days()?))
        } else {
            (Some(tui::select_day()?.label().to_string()), Vec::new())
        }
    };

    let client = super::connect_signed_in().await?.0;
    let result = client
        .create_task(&build_request(title, time, day, days))
        .await?;

    if interactive {
        println!();
    }
    print_notifications(&result.state.notifications);
    println!("{}", result.state.render());

    Ok(())
}

fn labels(days: Vec<Weekday>) -> Vec<String> {
    days.into_iter().map(|d| d.label().to_string()).collect()
}

/// Several days make a repeated task; the server checks the rest.
fn build_request(
    title: String,
    time: String,
    day: Option<String>,
    days: Vec<String>,
) -> CreateTaskRequest {
    let repeated = !days.is_empty();
    CreateTaskRequest {
        title,
        time,
        day: if repeated { None } else { day },
        days,
        repeated,
    }
}
