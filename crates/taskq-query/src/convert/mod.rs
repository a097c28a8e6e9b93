//! Conversion from parsed clauses to a [`TaskFilter`].
//!
//! Each clause is validated against its field and applied to the filter on
//! its own. A clause that fails is reported and skipped, so the returned
//! filter always carries the effect of every clause that succeeded.
//!
//! | Field                       | Operators             | Negation  |
//! |-----------------------------|-----------------------|-----------|
//! | `status`, `priority`        | `:` `=`               | no        |
//! | `project`, `@name`          | `:` `=`               | no        |
//! | `tag`                       | `:` `=`               | excludes  |
//! | `due`, `created`, `updated` | `:` `=` `<` `<=` `>` `>=` | no    |
//!
//! Repeated `status`, `priority` and `project` clauses overwrite each other;
//! the last one wins. Tags accumulate. Repeated date clauses on one field
//! narrow the range to the overlap of both.

mod error;
mod filter;

pub use error::{ClauseError, ConvertError, FieldError};
pub use filter::{Keyword, Priority, SearchMode, SortKey, SortOrder, TaskFilter, TaskStatus};

use std::cmp::Ordering;

use chrono::{DateTime, Local, TimeZone};
use strsim::levenshtein;

use crate::date::{parse_date_range, DateCondition, DateRange};
use crate::mention::ProjectMentionQuery;
use crate::query::{Field, FilterClause, ParsedQuery};
use crate::repository::ProjectRepository;

/// Default number of candidates requested from fuzzy project search.
pub const DEFAULT_FUZZY_LIMIT: usize = 10;

/// Maximum edit distance for "did you mean" suggestions.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Defaults applied to every converted filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Candidates requested from fuzzy project search.
    pub fuzzy_limit: usize,
    pub search_mode: SearchMode,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            fuzzy_limit: DEFAULT_FUZZY_LIMIT,
            search_mode: SearchMode::default(),
            sort_by: SortKey::default(),
            sort_order: SortOrder::default(),
        }
    }
}

/// A filter together with the clauses that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub filter: TaskFilter,
    pub errors: Vec<ClauseError>,
}

impl Conversion {
    /// Returns true if every clause was applied.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the filter if every clause was applied.
    ///
    /// # Errors
    ///
    /// Returns a [`ConvertError`] listing every failed clause. The partial
    /// filter is dropped; read [`Conversion::filter`] directly to keep it.
    pub fn into_result(self) -> Result<TaskFilter, ConvertError> {
        if self.errors.is_empty() {
            Ok(self.filter)
        } else {
            Err(ConvertError {
                errors: self.errors,
            })
        }
    }
}

/// Turns parsed queries into task filters.
///
/// Project names are resolved through the repository. Relative dates are
/// resolved against the converter's clock, which defaults to the local time
/// at construction.
///
/// # Example
///
/// ```
/// use taskq_query::convert::{Converter, TaskStatus};
/// use taskq_query::query::QueryParser;
/// use taskq_query::repository::{MemoryProjects, Project};
///
/// let projects = MemoryProjects::new(vec![Project::new("p1", "Backend")]);
/// let query = QueryParser::parse_str("status:pending @backend tag:bug").unwrap();
///
/// let conversion = Converter::new(&projects).convert(&query);
/// let filter = conversion.into_result().unwrap();
///
/// assert_eq!(filter.status, Some(TaskStatus::Pending));
/// assert_eq!(filter.project_id.as_deref(), Some("p1"));
/// assert_eq!(filter.tags, vec!["bug"]);
/// ```
pub struct Converter<'a, R: ?Sized, Tz: TimeZone = Local> {
    repo: &'a R,
    options: ConvertOptions,
    now: DateTime<Tz>,
}

impl<'a, R: ProjectRepository + ?Sized> Converter<'a, R, Local> {
    /// Creates a converter with default options and the local clock.
    pub fn new(repo: &'a R) -> Self {
        Self {
            repo,
            options: ConvertOptions::default(),
            now: Local::now(),
        }
    }
}

impl<'a, R: ProjectRepository + ?Sized, Tz: TimeZone> Converter<'a, R, Tz> {
    /// Replaces the options.
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolves relative dates against `now`, in `now`'s time zone.
    pub fn at<Tz2: TimeZone>(self, now: DateTime<Tz2>) -> Converter<'a, R, Tz2> {
        Converter {
            repo: self.repo,
            options: self.options,
            now,
        }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Converts every clause of `query`.
    ///
    /// Bare words the parser skipped become the search query.
    pub fn convert(&self, query: &ParsedQuery) -> Conversion {
        let search = query.free_text.join(" ");
        self.convert_clauses(query.clauses.iter().cloned(), &search)
    }

    /// Converts free text with project mentions.
    ///
    /// The text left after removing mentions becomes the search query; each
    /// mention is resolved like a `project:` clause.
    pub fn convert_mentions(&self, query: &ProjectMentionQuery) -> Conversion {
        let clauses = query
            .mentions
            .iter()
            .map(|m| FilterClause::mention(m.name.clone(), m.fuzzy));
        self.convert_clauses(clauses, &query.base_query)
    }

    fn convert_clauses(
        &self,
        clauses: impl IntoIterator<Item = FilterClause>,
        search: &str,
    ) -> Conversion {
        let mut filter = self.empty_filter();
        let mut errors = Vec::new();

        let search = search.trim();
        if !search.is_empty() {
            filter.search_query = Some(search.to_string());
        }

        for clause in clauses {
            if let Err(error) = self.apply(&mut filter, &clause) {
                tracing::debug!(clause = %clause, error = %error, "clause rejected");
                errors.push(ClauseError { clause, error });
            }
        }

        Conversion { filter, errors }
    }

    fn empty_filter(&self) -> TaskFilter {
        TaskFilter {
            search_mode: self.options.search_mode,
            sort_by: self.options.sort_by,
            sort_order: self.options.sort_order,
            ..TaskFilter::default()
        }
    }

    /// Applies one clause to the filter.
    fn apply(&self, filter: &mut TaskFilter, clause: &FilterClause) -> Result<(), FieldError> {
        match clause.field {
            Field::Status => {
                require_plain(clause)?;
                filter.status = Some(parse_keyword(clause)?);
            }
            Field::Priority => {
                require_plain(clause)?;
                filter.priority = Some(parse_keyword(clause)?);
            }
            Field::Project => {
                require_plain(clause)?;
                filter.project_id = Some(self.resolve_project(clause)?);
            }
            Field::Tag => {
                require_exact(clause)?;
                let tag = clause.value.trim();
                if tag.is_empty() {
                    return Err(FieldError::EmptyTag);
                }
                let list = if clause.negated {
                    &mut filter.exclude_tags
                } else {
                    &mut filter.tags
                };
                if !list.iter().any(|t| t == tag) {
                    list.push(tag.to_string());
                }
            }
            Field::Due | Field::Created | Field::Updated => {
                require_not_negated(clause)?;
                let condition = parse_date_range(&clause.value, clause.operator, &self.now)
                    .map_err(|source| FieldError::InvalidDate {
                        field: clause.field,
                        source,
                    })?;
                if let Some(current) = filter.date_mut(clause.field) {
                    *current = narrow(std::mem::take(current), condition);
                }
            }
        }
        Ok(())
    }

    /// Resolves a project clause to a project id.
    ///
    /// Fuzzy clauses take the best search hit. Exact clauses try the name,
    /// then aliases.
    fn resolve_project(&self, clause: &FilterClause) -> Result<String, FieldError> {
        let name = clause.value.as_str();

        if clause.fuzzy {
            let hits = self.repo.search(name, self.options.fuzzy_limit)?;
            let best = hits
                .into_iter()
                .next()
                .ok_or_else(|| FieldError::no_fuzzy_match(name))?;
            tracing::debug!(query = name, project = %best.name, "fuzzy project match");
            return Ok(best.id);
        }

        if let Some(project) = self.repo.get_by_name(name)? {
            return Ok(project.id);
        }
        if let Some(project) = self.repo.get_by_alias(name)? {
            tracing::debug!(alias = name, project = %project.name, "project matched by alias");
            return Ok(project.id);
        }

        // A failed suggestion lookup must not hide the not-found error
        let suggestion = self
            .repo
            .search(name, 1)
            .ok()
            .and_then(|hits| hits.into_iter().next())
            .map(|p| p.name);
        Err(FieldError::project_not_found(name, suggestion))
    }
}

fn require_not_negated(clause: &FilterClause) -> Result<(), FieldError> {
    if clause.negated {
        return Err(FieldError::NegationUnsupported {
            field: clause.field,
        });
    }
    Ok(())
}

fn require_exact(clause: &FilterClause) -> Result<(), FieldError> {
    if !clause.operator.is_exact() {
        return Err(FieldError::UnsupportedOperator {
            field: clause.field,
            operator: clause.operator,
        });
    }
    Ok(())
}

fn require_plain(clause: &FilterClause) -> Result<(), FieldError> {
    require_not_negated(clause)?;
    require_exact(clause)
}

/// Parses a clause value as one of `K`'s keywords.
fn parse_keyword<K: Keyword>(clause: &FilterClause) -> Result<K, FieldError> {
    let value = clause.value.trim().to_lowercase();
    K::from_keyword(&value).ok_or_else(|| FieldError::InvalidValue {
        field: clause.field,
        value: clause.value.clone(),
        expected: K::expected(),
        suggestion: find_similar(&value, K::ALL.iter().map(|k| k.as_str())),
    })
}

/// Finds the closest candidate by edit distance, if it is close enough to
/// be a likely typo.
fn find_similar<'a>(value: &str, candidates: impl Iterator<Item = &'a str>) -> Option<String> {
    let (best, distance) = candidates
        .map(|candidate| (candidate, levenshtein(value, candidate)))
        .min_by_key(|(_, distance)| *distance)?;

    (distance > 0 && distance <= MAX_SUGGESTION_DISTANCE).then(|| best.to_string())
}

/// Combines two conditions on the same field.
///
/// Two ranges intersect. Otherwise the newer condition replaces the older.
fn narrow(current: DateCondition, next: DateCondition) -> DateCondition {
    match (current, next) {
        (DateCondition::Range(a), DateCondition::Range(b)) => {
            let (from, from_exclusive) =
                tighter((a.from, a.from_exclusive), (b.from, b.from_exclusive), Ordering::Greater);
            let (to, to_exclusive) =
                tighter((a.to, a.to_exclusive), (b.to, b.to_exclusive), Ordering::Less);
            DateCondition::Range(DateRange {
                from,
                to,
                from_exclusive,
                to_exclusive,
            })
        }
        (_, next) => next,
    }
}

/// Picks the stricter of two bounds. `wins` is the ordering a stricter
/// bound has against the other; on a tie, exclusive beats inclusive.
fn tighter<T: Ord>(a: (Option<T>, bool), b: (Option<T>, bool), wins: Ordering) -> (Option<T>, bool) {
    match (a, b) {
        ((Some(x), x_excl), (Some(y), y_excl)) => match x.cmp(&y) {
            Ordering::Equal => (Some(x), x_excl || y_excl),
            order if order == wins => (Some(x), x_excl),
            _ => (Some(y), y_excl),
        },
        (bound @ (Some(_), _), (None, _)) | ((None, _), bound) => bound,
    }
}
