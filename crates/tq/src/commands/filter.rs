//! Filter command implementation.
//!
//! Turns a query or plain search text into a task filter, resolving project
//! references against an optional projects file.

use std::fs;
use std::path::{Path, PathBuf};

use taskq_query::convert::{ConvertOptions, SearchMode, SortKey, SortOrder};
use taskq_query::{MemoryProjects, Project, QueryEngine};

use super::config::Config;
use super::{CommandContext, CommandError, Outcome, Result};
use crate::output::{format_interpretation_json, format_interpretation_table};

/// Options for the filter command.
#[derive(Debug, Default)]
pub struct FilterOptions {
    /// Query or plain search text.
    pub query: String,
    /// JSON file with the projects to resolve against.
    pub projects: Option<PathBuf>,
    /// Overrides the configured search mode.
    pub search_mode: Option<SearchMode>,
    /// Overrides the configured sort key.
    pub sort_by: Option<SortKey>,
    /// Overrides the configured sort order.
    pub sort_order: Option<SortOrder>,
}

impl FilterOptions {
    /// Applies command-line overrides on top of the configured options.
    fn convert_options(&self, config: &Config) -> ConvertOptions {
        let mut options = config.convert_options();
        if let Some(mode) = self.search_mode {
            options.search_mode = mode;
        }
        if let Some(key) = self.sort_by {
            options.sort_by = key;
        }
        if let Some(order) = self.sort_order {
            options.sort_order = order;
        }
        options
    }
}

/// Executes the filter command.
///
/// Returns [`Outcome::Partial`] when some clauses were rejected. The filter
/// built from the remaining clauses is printed either way.
///
/// # Errors
///
/// Returns an error if the projects file cannot be loaded or the query
/// cannot be tokenized.
pub fn execute(ctx: &CommandContext, opts: &FilterOptions, config: &Config) -> Result<Outcome> {
    let projects = match &opts.projects {
        Some(path) => load_projects(path)?,
        None => Vec::new(),
    };
    let repo = MemoryProjects::new(projects).with_threshold(config.search_threshold());
    tracing::debug!(projects = repo.len(), "loaded projects");

    let engine = QueryEngine::new(&repo).with_options(opts.convert_options(config));
    let interpretation = engine.interpret(&opts.query)?;

    if ctx.json_output {
        println!("{}", format_interpretation_json(&interpretation)?);
    } else if !ctx.quiet || interpretation.has_errors() {
        print!(
            "{}",
            format_interpretation_table(&interpretation, ctx.use_colors)
        );
    }

    Ok(Outcome::from_errors(interpretation.has_errors()))
}

/// Reads a JSON array of projects.
fn load_projects(path: &Path) -> Result<Vec<Project>> {
    let projects_error = |message: String| CommandError::Projects {
        path: path.to_path_buf(),
        message,
    };

    let content = fs::read_to_string(path).map_err(|e| projects_error(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| projects_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> CommandContext {
        CommandContext {
            json_output: true,
            use_colors: false,
            quiet: false,
        }
    }

    fn write_projects(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("projects.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_projects() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_projects(
            &dir,
            r#"[{"id": "1", "name": "Backend", "aliases": ["api"]}, {"id": "2", "name": "Docs"}]"#,
        );

        let projects = load_projects(&path).unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].aliases, vec!["api"]);
        assert!(projects[1].aliases.is_empty());
    }

    #[test]
    fn test_load_projects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_projects(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CommandError::Projects { .. }));
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn test_load_projects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_projects(&dir, r#"{"id": "1"}"#);
        assert!(matches!(
            load_projects(&path),
            Err(CommandError::Projects { .. })
        ));
    }

    #[test]
    fn test_convert_options_overrides_config() {
        let mut config = Config::default();
        config.search.mode = Some(SearchMode::Fuzzy);
        config.sort.key = Some(SortKey::Due);

        let opts = FilterOptions {
            sort_by: Some(SortKey::Title),
            sort_order: Some(SortOrder::Asc),
            ..FilterOptions::default()
        };
        let options = opts.convert_options(&config);

        assert_eq!(options.search_mode, SearchMode::Fuzzy);
        assert_eq!(options.sort_by, SortKey::Title);
        assert_eq!(options.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_execute_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_projects(&dir, r#"[{"id": "1", "name": "Backend"}]"#);
        let config = Config::default();

        let clean = FilterOptions {
            query: "@backend tag:bug".to_string(),
            projects: Some(path.clone()),
            ..FilterOptions::default()
        };
        assert_eq!(execute(&ctx(), &clean, &config).unwrap(), Outcome::Clean);

        let partial = FilterOptions {
            query: "project:Frontend tag:bug".to_string(),
            projects: Some(path),
            ..FilterOptions::default()
        };
        assert_eq!(
            execute(&ctx(), &partial, &config).unwrap(),
            Outcome::Partial
        );
    }
}
