//! Project lookup.
//!
//! The converter resolves `project:` clauses and mentions through a
//! [`ProjectRepository`]. [`MemoryProjects`] is the in-memory implementation
//! used by the CLI and in tests.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fuzzy::match_many;

/// Minimum fuzzy score for a project to appear in search results.
pub const DEFAULT_SEARCH_THRESHOLD: u8 = 40;

/// A specialized Result type for repository lookups.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors raised by a repository backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// The backend could not answer the lookup.
    #[error("project lookup failed: {message}")]
    Backend {
        /// Description from the backend.
        message: String,
    },
}

impl RepositoryError {
    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        RepositoryError::Backend {
            message: message.into(),
        }
    }
}

/// A project that tasks can belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Alternative names, e.g. abbreviations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl Project {
    /// Creates a project without aliases.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            aliases: Vec::new(),
        }
    }

    /// Adds an alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Returns the name followed by every alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Source of projects for resolving names in queries.
pub trait ProjectRepository {
    /// Finds a project by its name.
    fn get_by_name(&self, name: &str) -> RepositoryResult<Option<Project>>;

    /// Finds a project by one of its aliases.
    fn get_by_alias(&self, alias: &str) -> RepositoryResult<Option<Project>>;

    /// Returns up to `limit` projects matching `text`, best match first.
    fn search(&self, text: &str, limit: usize) -> RepositoryResult<Vec<Project>>;
}

/// Projects held in memory.
///
/// Name and alias lookups ignore case. Search scores every name and alias
/// with the fuzzy matcher and ranks each project by its best score.
#[derive(Debug, Clone)]
pub struct MemoryProjects {
    projects: Vec<Project>,
    threshold: u8,
}

impl MemoryProjects {
    /// Creates a repository with the default search threshold.
    pub fn new(projects: Vec<Project>) -> Self {
        Self {
            projects,
            threshold: DEFAULT_SEARCH_THRESHOLD,
        }
    }

    /// Sets the minimum fuzzy score for search results.
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// Returns all projects in insertion order.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

impl FromIterator<Project> for MemoryProjects {
    fn from_iter<I: IntoIterator<Item = Project>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl ProjectRepository for MemoryProjects {
    fn get_by_name(&self, name: &str) -> RepositoryResult<Option<Project>> {
        let name_lower = name.to_lowercase();
        Ok(self
            .projects
            .iter()
            .find(|p| p.name.to_lowercase() == name_lower)
            .cloned())
    }

    fn get_by_alias(&self, alias: &str) -> RepositoryResult<Option<Project>> {
        let alias_lower = alias.to_lowercase();
        Ok(self
            .projects
            .iter()
            .find(|p| p.aliases.iter().any(|a| a.to_lowercase() == alias_lower))
            .cloned())
    }

    fn search(&self, text: &str, limit: usize) -> RepositoryResult<Vec<Project>> {
        // One candidate per name or alias, remembering its project
        let candidates: Vec<(usize, &str)> = self
            .projects
            .iter()
            .enumerate()
            .flat_map(|(owner, project)| project.names().map(move |name| (owner, name)))
            .collect();

        let matches = match_many(text, candidates.iter().map(|(_, name)| *name), self.threshold);

        let mut seen = HashSet::new();
        let mut results = Vec::new();
        for m in matches {
            if results.len() >= limit {
                break;
            }
            let owner = candidates[m.index].0;
            // Matches are sorted, so the first hit is the project's best
            if seen.insert(owner) {
                tracing::debug!(query = text, matched = %m.text, score = m.score, "project search hit");
                results.push(self.projects[owner].clone());
            }
        }
        Ok(results)
    }
}
