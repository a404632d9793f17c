//! Some utility functions

use chrono::{NaiveDate, NaiveTime};

use crate::Task;
use crate::clock::week_around;
use crate::sync::TaskSummary;

/// Format a due time as `HH:MM`
pub fn format_due_time(time: Option<NaiveTime>) -> String {
    match time {
        None => String::new(),
        Some(t) => t.format("%H:%M").to_string(),
    }
}

/// A one-line description of a task
pub fn task_line(task: &Task) -> String {
    let completion = if task.done() { "✓" } else { " " };
    let mut line = format!("[{}] {:>5} {}", completion, format_due_time(task.due_time()), task.title());
    if let Some(description) = task.description() {
        line.push_str(&format!(" ({})", description));
    }
    line.push_str(&format!("\t{}", task.id()));
    line
}

/// A debug utility that pretty-prints the tasks of a day
pub fn print_task_list(date: NaiveDate, tasks: &[Task], summary: TaskSummary) {
    println!("TASKS {} ({})", date, summary);
    for task in tasks {
        println!("    {}", task_line(task));
    }
}

/// Pretty-prints the seven days around `today`, highlighting the `selected` one
pub fn print_week_strip(today: NaiveDate, selected: NaiveDate) {
    let days: Vec<String> = week_around(today)
        .into_iter()
        .map(|day| {
            let label = if day == today { "Today".to_string() } else { day.format("%a %d").to_string() };
            if day == selected { format!("[{}]", label) } else { label }
        })
        .collect();
    println!("{}", days.join("  "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskId;

    #[test]
    fn lines() {
        let task = Task::new(TaskId::from("7"), "Call mom".to_string(), Some("about sunday".to_string()),
                             NaiveDate::from_ymd(2024, 5, 1), Some(NaiveTime::from_hms(18, 0, 0)), true);
        assert_eq!(task_line(&task), "[✓] 18:00 Call mom (about sunday)\t7");
        assert_eq!(format_due_time(None), "");
    }
}
