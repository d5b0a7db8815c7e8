//! Notes and reminders persisted to the JSON data file

use chrono::{DateTime, Duration, Local, NaiveDateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// A note, or a reminder when `reminder` holds a date-time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Creation time. Kept as text: older data files hold browser locale
    /// strings such as `10/18/2026, 9:00:00 AM`.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub last_edit_time: String,
    /// Local date-time, e.g. `2026-03-01T09:30`
    #[serde(default)]
    pub reminder: Option<String>,
    #[serde(default)]
    pub alerted_day: bool,
    #[serde(default)]
    pub alerted_time: bool,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub missed: bool,
}

/// Which list an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind<'a> {
    Plain,
    Reminder(&'a str),
}

impl Note {
    pub fn kind(&self) -> NoteKind<'_> {
        match self.reminder.as_deref() {
            Some(at) if !at.trim().is_empty() => NoteKind::Reminder(at),
            _ => NoteKind::Plain,
        }
    }

    pub fn is_reminder(&self) -> bool {
        matches!(self.kind(), NoteKind::Reminder(_))
    }

    pub fn reminder_time(&self) -> Option<NaiveDateTime> {
        match self.kind() {
            NoteKind::Reminder(at) => parse_reminder_time(at),
            NoteKind::Plain => None,
        }
    }
}

/// Create note request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateNote {
    /// Blank titles are replaced by `UntitledN`
    #[validate(length(max = 100, message = "Title must be less than 100 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 5000, message = "Note content must be less than 5000 characters"))]
    #[serde(default)]
    pub content: String,
    /// Reminder date-time; the entry is stored as a reminder when present
    pub reminder: Option<String>,
}

impl CreateNote {
    /// Checks that need the current local time
    pub fn check(&self, now: NaiveDateTime) -> AppResult<()> {
        check_content(&self.content)?;
        match self.reminder.as_deref() {
            Some(at) => check_reminder(at, now),
            None => Ok(()),
        }
    }
}

fn check_title(title: &str) -> AppResult<()> {
    if title.chars().count() > 100 {
        return Err(AppError::Validation(
            "Title must be less than 100 characters".to_string(),
        ));
    }
    Ok(())
}

fn check_content(content: &str) -> AppResult<()> {
    if content.trim().is_empty() {
        return Err(AppError::Validation("Note content is required".to_string()));
    }
    if content.chars().count() > 5000 {
        return Err(AppError::Validation(
            "Note content must be less than 5000 characters".to_string(),
        ));
    }
    Ok(())
}

/// A blank reminder is no reminder; anything else must be a future time
fn check_reminder(at: &str, now: NaiveDateTime) -> AppResult<()> {
    if at.trim().is_empty() {
        return Ok(());
    }
    let parsed = parse_reminder_time(at)
        .ok_or_else(|| AppError::Validation(format!("Invalid reminder date: {}", at)))?;
    if parsed < now {
        return Err(AppError::Validation(
            "Reminder date cannot be in the past".to_string(),
        ));
    }
    Ok(())
}

/// Apply the create-time rules to the fields a patch supplies
fn check_patch(patch: &Map<String, Value>, existing: &Note, now: NaiveDateTime) -> AppResult<()> {
    if let Some(Value::String(title)) = patch.get("title") {
        check_title(title)?;
    }
    match patch.get("content") {
        Some(Value::String(content)) => check_content(content)?,
        Some(Value::Null) => check_content("")?,
        _ => {}
    }
    if let Some(Value::String(at)) = patch.get("reminder") {
        if existing.reminder.as_deref() != Some(at.as_str()) {
            check_reminder(at, now)?;
        }
    }
    Ok(())
}

fn stamp(now: DateTime<Local>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Notes and reminders split the way clients display them
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct NotesListing {
    pub notes: Vec<Note>,
    /// Missed first, then pending, then done
    pub reminders: Vec<Note>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// The reminder is due today
    Today,
    /// The reminder time is within a minute
    Due,
    /// The reminder time passed by more than a minute
    Missed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReminderAlert {
    pub id: i64,
    pub title: String,
    pub kind: AlertKind,
}

/// On-disk layout of the data file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesData {
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub reminders: Vec<Note>,
    #[serde(default = "first_id")]
    pub next_id: i64,
}

fn first_id() -> i64 {
    1
}

impl Default for NotesData {
    fn default() -> Self {
        Self {
            notes: Vec::new(),
            reminders: Vec::new(),
            next_id: first_id(),
        }
    }
}

impl NotesData {
    fn list_mut(&mut self, kind: NoteKind<'_>) -> &mut Vec<Note> {
        match kind {
            NoteKind::Plain => &mut self.notes,
            NoteKind::Reminder(_) => &mut self.reminders,
        }
    }

    fn all(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter().chain(self.reminders.iter())
    }

    /// Keep `next_id` above every stored id
    pub fn repair_next_id(&mut self) {
        let max = self.all().map(|n| n.id).max().unwrap_or(0);
        self.next_id = self.next_id.max(max + 1);
    }

    pub fn find(&self, id: i64) -> Option<&Note> {
        self.all().find(|n| n.id == id)
    }

    fn find_mut(&mut self, id: i64) -> Option<&mut Note> {
        self.notes
            .iter_mut()
            .chain(self.reminders.iter_mut())
            .find(|n| n.id == id)
    }

    /// Store a new entry under the next id
    pub fn insert(&mut self, new: CreateNote, now: DateTime<Local>) -> Note {
        let title = match new.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => sanitize_text(title),
            _ => {
                let untitled = self.all().filter(|n| n.title.starts_with("Untitled")).count();
                format!("Untitled{}", untitled + 1)
            }
        };

        let note = Note {
            id: self.next_id,
            title,
            content: sanitize_text(&new.content),
            timestamp: stamp(now),
            last_edit_time: stamp(now),
            reminder: new.reminder.filter(|r| !r.trim().is_empty()),
            alerted_day: false,
            alerted_time: false,
            done: false,
            missed: false,
        };
        self.next_id += 1;

        let kind = note.kind();
        self.list_mut(kind).push(note.clone());
        note
    }

    /// Merge `patch` over the stored entry. The id never changes; an entry
    /// whose reminder is set or cleared moves to the matching list.
    /// Rescheduling re-arms the alerts and marking done clears `missed`.
    pub fn merge(
        &mut self,
        id: i64,
        patch: &Map<String, Value>,
        now: DateTime<Local>,
    ) -> AppResult<Note> {
        let existing = self
            .find(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Note with id {} not found", id)))?;
        check_patch(patch, &existing, now.naive_local())?;

        let mut value = serde_json::to_value(&existing)?;
        if let Value::Object(fields) = &mut value {
            for (key, v) in patch {
                let v = match (key.as_str(), v) {
                    ("id", _) => continue,
                    ("title" | "content", Value::String(text)) => {
                        Value::String(sanitize_text(text))
                    }
                    _ => v.clone(),
                };
                fields.insert(key.clone(), v);
            }
            fields.insert("lastEditTime".to_string(), Value::String(stamp(now)));
        }

        let mut updated: Note = serde_json::from_value(value)
            .map_err(|e| AppError::Validation(format!("Invalid note fields: {}", e)))?;

        if updated.reminder != existing.reminder {
            updated.alerted_day = false;
            updated.alerted_time = false;
            updated.missed = false;
        }
        if updated.done && patch.get("done") == Some(&Value::Bool(true)) {
            updated.missed = false;
        }

        if updated.is_reminder() == existing.is_reminder() {
            if let Some(slot) = self.find_mut(id) {
                *slot = updated.clone();
            }
        } else {
            self.remove(id);
            let kind = updated.kind();
            self.list_mut(kind).push(updated.clone());
        }
        Ok(updated)
    }

    pub fn remove(&mut self, id: i64) -> Option<Note> {
        if let Some(pos) = self.notes.iter().position(|n| n.id == id) {
            return Some(self.notes.remove(pos));
        }
        self.reminders
            .iter()
            .position(|n| n.id == id)
            .map(|pos| self.reminders.remove(pos))
    }

    /// Raise day, time and missed alerts for pending reminders, each at most once
    pub fn check_reminders(&mut self, now: NaiveDateTime) -> Vec<ReminderAlert> {
        let mut alerts = Vec::new();

        for reminder in self.reminders.iter_mut().filter(|r| !r.done) {
            let Some(at) = reminder.reminder_time() else {
                continue;
            };

            let mut raised = Vec::new();
            if !reminder.alerted_day && at.date() == now.date() {
                reminder.alerted_day = true;
                raised.push(AlertKind::Today);
            }
            if !reminder.alerted_time && (now - at).num_milliseconds().abs() < 60_000 {
                reminder.alerted_time = true;
                raised.push(AlertKind::Due);
            }
            if !reminder.missed && now > at + Duration::minutes(1) {
                reminder.missed = true;
                raised.push(AlertKind::Missed);
            }

            alerts.extend(raised.into_iter().map(|kind| ReminderAlert {
                id: reminder.id,
                title: reminder.title.clone(),
                kind,
            }));
        }

        alerts
    }

    pub fn listing(&self) -> NotesListing {
        let mut reminders = self.reminders.clone();
        reminders.sort_by_key(|r| match (r.missed, r.done) {
            (true, _) => 0,
            (false, false) => 1,
            (false, true) => 2,
        });
        NotesListing {
            notes: self.notes.clone(),
            reminders,
        }
    }
}

/// Parse the date-time formats produced by browsers and RFC 3339 clients
pub fn parse_reminder_time(input: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
    ];
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_local());
    }
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(input, f).ok())
}

/// Escape HTML-significant characters
pub fn sanitize_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
