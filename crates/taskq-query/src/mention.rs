//! Project mentions in free text.
//!
//! Search-box input that is not query syntax can still name projects with
//! `@name` (exact) or `@~name` (fuzzy). This path only looks for mentions; it
//! does not run the lexer or parser.

use std::sync::LazyLock;

use regex::Regex;

static MENTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(~)?([\w-]+)").expect("mention pattern is valid"));

/// A project named in free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMention {
    pub name: String,
    /// True for `@~name`.
    pub fuzzy: bool,
}

/// Free text split into its mentions and everything else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectMentionQuery {
    /// The input with every mention removed, trimmed, and with runs of
    /// whitespace collapsed to one space.
    pub base_query: String,
    /// Mentions in the order they appear.
    pub mentions: Vec<ProjectMention>,
}

impl ProjectMentionQuery {
    /// Returns true if at least one project was mentioned.
    pub fn has_mentions(&self) -> bool {
        !self.mentions.is_empty()
    }
}

/// Extracts `@name` and `@~name` mentions from `text`.
///
/// # Example
///
/// ```
/// use taskq_query::mention::extract_mentions;
///
/// let query = extract_mentions("@backend fix   bug @~front");
/// assert_eq!(query.base_query, "fix bug");
/// assert_eq!(query.mentions.len(), 2);
/// assert!(query.mentions[1].fuzzy);
/// ```
pub fn extract_mentions(text: &str) -> ProjectMentionQuery {
    let mentions = MENTION_PATTERN
        .captures_iter(text)
        .map(|caps| ProjectMention {
            name: caps[2].to_string(),
            fuzzy: caps.get(1).is_some(),
        })
        .collect();

    let stripped = MENTION_PATTERN.replace_all(text, "");
    let base_query = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    ProjectMentionQuery {
        base_query,
        mentions,
    }
}
