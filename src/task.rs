//! Daily to-do tasks, as exchanged with the server

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use chrono::{NaiveDate, NaiveTime};

use crate::error::{TodoError, TodoResult};

/// The identifier of a task.
///
/// It is assigned by the server, and this crate never looks into it.
/// Servers may send it as a JSON number or as a JSON string, both are accepted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaskId {
    content: String,
}

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Generate a random TaskId, the way a server would
    pub fn random() -> Self {
        let random = uuid::Uuid::new_v4().to_hyphenated().to_string();
        Self { content: random }
    }
}

impl From<String> for TaskId {
    fn from(content: String) -> Self {
        Self { content }
    }
}
impl From<&str> for TaskId {
    fn from(content: &str) -> Self {
        Self { content: content.to_string() }
    }
}
impl From<u64> for TaskId {
    fn from(number: u64) -> Self {
        Self { content: number.to_string() }
    }
}
impl FromStr for TaskId {
    type Err = TodoError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TodoError::Validation("A task ID must not be empty".to_string()));
        }
        Ok(Self::from(s))
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}

/// Used to support serde
impl Serialize for TaskId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.content)
    }
}
/// Used to support serde
impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(deserializer: D) -> Result<TaskId, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Ok(TaskId::from(n)),
            RawId::Text(s) => Ok(TaskId::from(s)),
        }
    }
}

/// A daily to-do task
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    /// The day this task belongs to
    date: NaiveDate,
    #[serde(default, with = "due_time")]
    due_time: Option<NaiveTime>,
    #[serde(default)]
    done: bool,
}

impl Task {
    /// Create a Task instance, that usually comes from a server
    pub fn new(id: TaskId, title: String, description: Option<String>, date: NaiveDate, due_time: Option<NaiveTime>, done: bool) -> Self {
        Self { id, title, description, date, due_time, done }
    }

    pub fn id(&self) -> &TaskId               { &self.id }
    pub fn title(&self) -> &str               { &self.title }
    pub fn description(&self) -> Option<&str> { self.description.as_deref() }
    pub fn date(&self) -> NaiveDate           { self.date }
    pub fn due_time(&self) -> Option<NaiveTime> { self.due_time }
    pub fn done(&self) -> bool                { self.done }

    /// Apply a partial update, the way a server does
    pub fn apply(&mut self, update: &TaskUpdate) {
        if let Some(title) = &update.title { self.title = title.clone(); }
        if let Some(description) = &update.description {
            self.description = description.clone().filter(|d| d.trim().is_empty() == false);
        }
        if let Some(date) = update.date { self.date = date; }
        if let Some(due_time) = update.due_time { self.due_time = due_time; }
        if let Some(done) = update.done { self.done = done; }
    }

    /// Flip the completion status
    pub fn toggle(&mut self) {
        self.done = !self.done;
    }
}

/// The body of a task creation request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(default, with = "due_time")]
    pub due_time: Option<NaiveTime>,
    /// New tasks are never done
    pub done: bool,
}

impl NewTask {
    /// Build a creation request. This fails in case the title is blank
    pub fn new(title: String, description: Option<String>, date: NaiveDate, due_time: Option<NaiveTime>) -> TodoResult<Self> {
        validate_title(&title)?;
        Ok(Self { title, description, date, due_time, done: false })
    }

    /// Build the task the server would store for this request
    pub fn into_task(self, id: TaskId) -> Task {
        Task::new(id, self.title, self.description, self.date, self.due_time, self.done)
    }
}

/// Edited fields of a task. Fields left to `None` are not sent, and are left unchanged by the server.
///
/// `description` and `due_time` can also be cleared: `Some(None)` is sent as an explicit `null`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "due_time::serialize_edit", deserialize_with = "due_time::deserialize_edit")]
    pub due_time: Option<Option<NaiveTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

impl TaskUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title<S: ToString>(mut self, title: S) -> Self {
        self.title = Some(title.to_string());
        self
    }
    /// A blank description clears it
    pub fn with_description<S: ToString>(mut self, description: S) -> Self {
        let description = description.to_string();
        self.description = if description.trim().is_empty() { Some(None) } else { Some(Some(description)) };
        self
    }
    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
    pub fn with_due_time(mut self, due_time: NaiveTime) -> Self {
        self.due_time = Some(Some(due_time));
        self
    }
    pub fn clear_due_time(mut self) -> Self {
        self.due_time = Some(None);
        self
    }
    pub fn with_done(mut self, done: bool) -> Self {
        self.done = Some(done);
        self
    }

    /// Returns an error in case a blank title is about to be sent
    pub fn validate(&self) -> TodoResult<()> {
        match &self.title {
            None => Ok(()),
            Some(title) => validate_title(title),
        }
    }
}

/// Titles must contain something else than whitespace
pub fn validate_title(title: &str) -> TodoResult<()> {
    if title.trim().is_empty() {
        return Err(TodoError::Validation("The title must not be empty".to_string()));
    }
    Ok(())
}

/// Deserializes a field that is present (possibly as `null`) to `Some`. Missing fields are handled by `#[serde(default)]`
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// (De)serialization of due times.
///
/// Servers send either `HH:MM` or `HH:MM:SS`. This crate always sends `HH:MM`.
mod due_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const SHORT_FORMAT: &str = "%H:%M";
    const LONG_FORMAT: &str = "%H:%M:%S";

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            None => serializer.serialize_none(),
            Some(time) => serializer.serialize_str(&time.format(SHORT_FORMAT).to_string()),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse(text)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("Invalid due time {:?}", text))),
        }
    }

    /// Edits skip missing due times, so the outer option is always `Some` here
    pub fn serialize_edit<S>(value: &Option<Option<NaiveTime>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize(&(*value).flatten(), serializer)
    }

    /// A `null` or empty due time in an edit clears it
    pub fn deserialize_edit<'de, D>(deserializer: D) -> Result<Option<Option<NaiveTime>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize(deserializer).map(Some)
    }

    pub fn parse(text: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(text, LONG_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(text, SHORT_FORMAT))
            .ok()
    }
}

/// Parse a due time typed by a user (`HH:MM` or `HH:MM:SS`)
pub fn parse_due_time(text: &str) -> TodoResult<NaiveTime> {
    due_time::parse(text.trim())
        .ok_or_else(|| TodoError::Validation(format!("Invalid due time {:?}, expected HH:MM", text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_server_task() {
        let json = r#"{"id": 12, "title": "Water the plants", "description": null, "date": "2024-05-01", "dueTime": "08:30:00", "done": false}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id(), &TaskId::from("12"));
        assert_eq!(task.title(), "Water the plants");
        assert_eq!(task.description(), None);
        assert_eq!(task.date(), NaiveDate::from_ymd(2024, 5, 1));
        assert_eq!(task.due_time(), Some(NaiveTime::from_hms(8, 30, 0)));
        assert_eq!(task.done(), false);

        let json = r#"{"id": "a-b-c", "title": "Read", "date": "2024-05-02", "done": true}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id().as_str(), "a-b-c");
        assert_eq!(task.due_time(), None);
        assert!(task.done());
    }

    #[test]
    fn new_task_body() {
        let new_task = NewTask::new("Run".to_string(), Some("5 km".to_string()), NaiveDate::from_ymd(2024, 5, 1), Some(NaiveTime::from_hms(7, 0, 0))).unwrap();
        let body = serde_json::to_value(&new_task).unwrap();
        assert_eq!(body, serde_json::json!({
            "title": "Run",
            "description": "5 km",
            "date": "2024-05-01",
            "dueTime": "07:00",
            "done": false,
        }));
    }

    #[test]
    fn blank_titles_are_rejected() {
        assert!(NewTask::new("   ".to_string(), None, NaiveDate::from_ymd(2024, 5, 1), None).is_err());
        assert!(TaskUpdate::new().with_title("").validate().is_err());
        assert!(TaskUpdate::new().with_done(true).validate().is_ok());
    }

    #[test]
    fn partial_update() {
        let update = TaskUpdate::new().with_title("Run further").with_done(true);
        assert_eq!(serde_json::to_value(&update).unwrap(), serde_json::json!({"title": "Run further", "done": true}));

        let mut task = Task::new(TaskId::from("1"), "Run".to_string(), None, NaiveDate::from_ymd(2024, 5, 1), None, false);
        task.apply(&update);
        assert_eq!(task.title(), "Run further");
        assert!(task.done());
        assert_eq!(task.date(), NaiveDate::from_ymd(2024, 5, 1));
    }

    #[test]
    fn clearing_fields() {
        let update = TaskUpdate::new().clear_description().clear_due_time();
        assert_eq!(serde_json::to_value(&update).unwrap(), serde_json::json!({"description": null, "dueTime": null}));
        assert_eq!(TaskUpdate::new().with_description("  "), TaskUpdate::new().clear_description());

        let mut task = Task::new(TaskId::from("1"), "Run".to_string(), Some("5 km".to_string()), NaiveDate::from_ymd(2024, 5, 1), Some(NaiveTime::from_hms(7, 0, 0)), false);
        task.apply(&TaskUpdate::new().with_title("Run again"));
        assert_eq!(task.description(), Some("5 km"));
        assert_eq!(task.due_time(), Some(NaiveTime::from_hms(7, 0, 0)));

        task.apply(&update);
        assert_eq!(task.description(), None);
        assert_eq!(task.due_time(), None);

        // A whole edit form, with emptied fields
        let form: TaskUpdate = serde_json::from_str(r#"{"title": "Run", "description": "", "dueTime": ""}"#).unwrap();
        assert_eq!(form.due_time, Some(None));
        let mut task = Task::new(TaskId::from("1"), "Run".to_string(), Some("5 km".to_string()), NaiveDate::from_ymd(2024, 5, 1), Some(NaiveTime::from_hms(7, 0, 0)), false);
        task.apply(&form);
        assert_eq!(task.description(), None);
        assert_eq!(task.due_time(), None);

        let untouched: TaskUpdate = serde_json::from_str(r#"{"title": "Run"}"#).unwrap();
        assert_eq!(untouched.description, None);
        assert_eq!(untouched.due_time, None);
    }

    #[test]
    fn due_times() {
        assert_eq!(parse_due_time("9:05").unwrap(), NaiveTime::from_hms(9, 5, 0));
        assert_eq!(parse_due_time("21:15:30").unwrap(), NaiveTime::from_hms(21, 15, 30));
        assert!(parse_due_time("noon").is_err());
    }
}
