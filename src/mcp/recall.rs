//! Relevance-ranked memory search
//!
//! Scores an already-fetched candidate set against a free-text term:
//! - a comma anywhere in the term switches to AND mode (split on commas),
//!   otherwise sub-terms are whitespace separated and OR-ed
//! - each matched sub-term earns a base score plus whole-word, markdown
//!   header and repetition bonuses
//! - memories linked to a task get a small flat bonus
//!
//! Ordering is by score only; ties keep the backend's order.

use crate::error::{RamorieError, Result};
use crate::types::Memory;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

const BASE_MATCH: u32 = 20;
const WHOLE_WORD_BONUS: u32 = 10;
const HEADER_BONUS: u32 = 15;
const REPEAT_BONUS: u32 = 5;
const REPEAT_BONUS_CAP: u32 = 25;
const LINKED_TASK_BONUS: u32 = 5;

/// How sub-terms combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchMode {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

/// Split a raw term into its mode and lower-cased sub-terms
pub fn parse_terms(term: &str) -> (SearchMode, Vec<String>) {
    let (mode, parts): (SearchMode, Vec<&str>) = if term.contains(',') {
        (SearchMode::And, term.split(',').collect())
    } else {
        (SearchMode::Or, term.split_whitespace().collect())
    };

    let terms = parts
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    (mode, terms)
}

/// Score one lower-cased sub-term against lower-cased content
///
/// Returns `None` when the sub-term does not occur at all.
pub fn score_term(content: &str, term: &str) -> Option<u32> {
    if term.is_empty() || !content.contains(term) {
        return None;
    }

    let mut score = BASE_MATCH;

    if is_whole_word(content, term) {
        score += WHOLE_WORD_BONUS;
    }

    // "### t" contains "## t" as well
    if content.contains(&format!("## {}", term)) {
        score += HEADER_BONUS;
    }

    let occurrences = content.matches(term).count() as u32;
    if occurrences > 1 {
        score += ((occurrences - 1) * REPEAT_BONUS).min(REPEAT_BONUS_CAP);
    }

    Some(score)
}

fn is_whole_word(content: &str, term: &str) -> bool {
    content.match_indices(term).any(|(start, m)| {
        let before = content[..start].chars().next_back();
        let after = content[start + m.len()..].chars().next();
        before.map_or(true, char::is_whitespace) && after.map_or(true, char::is_whitespace)
    })
}

/// Validated recall parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RecallQuery {
    term: String,
    tag: Option<String>,
    linked_task_only: bool,
    include_relations: bool,
    limit: usize,
    min_score: i64,
}

impl RecallQuery {
    /// A blank term is rejected rather than treated as "match nothing"
    pub fn new(term: impl Into<String>) -> Result<Self> {
        let term = term.into().trim().to_string();
        if term.is_empty() {
            return Err(RamorieError::missing_argument("term"));
        }
        Ok(Self {
            term,
            tag: None,
            linked_task_only: false,
            include_relations: true,
            limit: 20,
            min_score: 0,
        })
    }

    pub fn tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn linked_task_only(mut self, linked: bool) -> Self {
        self.linked_task_only = linked;
        self
    }

    pub fn include_relations(mut self, include: bool) -> Self {
        self.include_relations = include;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn min_score(mut self, min_score: i64) -> Self {
        self.min_score = min_score;
        self
    }

    fn admits(&self, memory: &Memory) -> bool {
        if self.linked_task_only && !memory.has_linked_task() {
            return false;
        }
        match &self.tag {
            Some(tag) => memory.has_tag(tag),
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRef {
    pub id: Uuid,
    pub name: String,
}

/// One ranked memory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecallHit {
    pub id: Uuid,
    pub content: String,
    pub score: u32,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_task_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
}

impl RecallHit {
    fn new(memory: &Memory, score: u32, include_relations: bool) -> Self {
        let mut hit = Self {
            id: memory.id,
            content: memory.content.clone(),
            score,
            created_at: memory.created_at,
            project: None,
            linked_task_id: None,
            tags: None,
        };

        if include_relations {
            hit.project = memory.project.as_ref().map(|p| ProjectRef {
                id: p.id,
                name: p.name.clone(),
            });
            hit.linked_task_id = memory.linked_task_id;
            hit.tags = memory.tags.clone();
        }

        hit
    }
}

/// Result of one recall call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecallOutcome {
    pub term: String,
    pub search_mode: SearchMode,
    pub count: usize,
    pub total_found: usize,
    pub results: Vec<RecallHit>,
}

/// Filter, score, rank and truncate `memories`
pub fn recall(memories: &[Memory], query: &RecallQuery) -> RecallOutcome {
    let (mode, terms) = parse_terms(&query.term);

    let mut scored: Vec<(&Memory, u32)> = Vec::new();

    // Only separators: nothing can match, and AND must not match vacuously
    if !terms.is_empty() {
        for memory in memories.iter().filter(|m| query.admits(m)) {
            let content = memory.content.to_lowercase();

            let mut score = 0u32;
            let mut matched = 0usize;
            for term in &terms {
                if let Some(s) = score_term(&content, term) {
                    score += s;
                    matched += 1;
                }
            }

            let accepted = match mode {
                SearchMode::And => matched == terms.len(),
                SearchMode::Or => matched > 0,
            };
            if !accepted {
                continue;
            }

            if memory.has_linked_task() {
                score += LINKED_TASK_BONUS;
            }

            if i64::from(score) < query.min_score {
                continue;
            }

            scored.push((memory, score));
        }
    }

    // Stable: equal scores keep candidate order
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    let total_found = scored.len();
    let results: Vec<RecallHit> = scored
        .into_iter()
        .take(query.limit)
        .map(|(m, score)| RecallHit::new(m, score, query.include_relations))
        .collect();

    RecallOutcome {
        term: query.term.clone(),
        search_mode: mode,
        count: results.len(),
        total_found,
        results,
    }
}
