//! The structured filter produced from a query.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::date::DateCondition;
use crate::query::Field;

/// A closed set of lower-case keywords.
///
/// Implemented by the enums whose values users type in queries and in the
/// configuration file.
pub trait Keyword: Copy + Sized + 'static {
    /// Every value, in documentation order.
    const ALL: &'static [Self];

    /// Returns the keyword as it is written.
    fn as_str(self) -> &'static str;

    /// Looks up a value by keyword, ignoring case.
    fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|value| value.as_str().eq_ignore_ascii_case(word))
    }

    /// Returns every keyword joined with ", ".
    fn expected() -> String {
        Self::ALL
            .iter()
            .map(|value| value.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

macro_rules! keyword_display {
    ($($ty:ty),+) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl Keyword for TaskStatus {
    const ALL: &'static [Self] = &[
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
    ];

    fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

/// Task priority, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Keyword for Priority {
    const ALL: &'static [Self] = &[
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

/// How the free-text search query is matched against task titles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    Substring,
    Fuzzy,
}

impl Keyword for SearchMode {
    const ALL: &'static [Self] = &[SearchMode::Substring, SearchMode::Fuzzy];

    fn as_str(self) -> &'static str {
        match self {
            SearchMode::Substring => "substring",
            SearchMode::Fuzzy => "fuzzy",
        }
    }
}

/// Task attribute results are ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Created,
    Updated,
    Due,
    Priority,
    Title,
}

impl Keyword for SortKey {
    const ALL: &'static [Self] = &[
        SortKey::Created,
        SortKey::Updated,
        SortKey::Due,
        SortKey::Priority,
        SortKey::Title,
    ];

    fn as_str(self) -> &'static str {
        match self {
            SortKey::Created => "created",
            SortKey::Updated => "updated",
            SortKey::Due => "due",
            SortKey::Priority => "priority",
            SortKey::Title => "title",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl Keyword for SortOrder {
    const ALL: &'static [Self] = &[SortOrder::Asc, SortOrder::Desc];

    fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

keyword_display!(TaskStatus, Priority, SearchMode, SortKey, SortOrder);

/// Structured description of which tasks to show and in what order.
///
/// Unset fields do not filter. All conditions apply together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Id of the resolved project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Tags a task must all carry.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Tags a task must not carry.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    pub search_mode: SearchMode,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    #[serde(skip_serializing_if = "DateCondition::is_any")]
    pub due: DateCondition,
    #[serde(skip_serializing_if = "DateCondition::is_any")]
    pub created: DateCondition,
    #[serde(skip_serializing_if = "DateCondition::is_any")]
    pub updated: DateCondition,
}

impl TaskFilter {
    /// Returns the condition for a date field, or `None` for other fields.
    pub fn date_mut(&mut self, field: Field) -> Option<&mut DateCondition> {
        match field {
            Field::Due => Some(&mut self.due),
            Field::Created => Some(&mut self.created),
            Field::Updated => Some(&mut self.updated),
            Field::Status | Field::Priority | Field::Project | Field::Tag => None,
        }
    }

    /// Returns true if no condition is set. Search mode and sort order do
    /// not count.
    pub fn is_unrestricted(&self) -> bool {
        self.status.is_none()
            && self.priority.is_none()
            && self.project_id.is_none()
            && self.tags.is_empty()
            && self.exclude_tags.is_empty()
            && self.search_query.is_none()
            && self.due.is_any()
            && self.created.is_any()
            && self.updated.is_any()
    }
}
