//! Search queries and their engine-DSL projection.

use serde_json::{json, Value};

use crate::page::PageParams;

/// A structured search over one index.
///
/// Built by handlers from query-string parameters; the live backend
/// projects it to the engine's JSON DSL via [`SearchQuery::to_body`], the
/// in-memory backend evaluates it directly with the same semantics.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Free-text query. `None` means match everything.
    pub text: Option<String>,
    /// Fields searched, with optional `^boost` suffixes (`"name^2"`).
    pub fields: Vec<String>,
    /// Exact-match constraint on a parent id, as `(path, id)` where path
    /// is the dotted document path (`"subject._id"`).
    pub parent: Option<(String, String)>,
    /// Window start.
    pub from: u64,
    /// Window size.
    pub size: u64,
}

impl SearchQuery {
    /// A query over `fields`, windowed by `params`.
    pub fn new(fields: &[&str], params: &PageParams) -> Self {
        let (from, size) = params.window();
        Self {
            text: None,
            fields: fields.iter().map(|f| f.to_string()).collect(),
            parent: None,
            from,
            size,
        }
    }

    /// Sets the free-text query. Empty and whitespace-only strings are
    /// treated as absent.
    pub fn with_text(mut self, text: Option<String>) -> Self {
        self.text = text.filter(|t| !t.trim().is_empty());
        self
    }

    /// Constrains hits to children of the given parent id.
    pub fn with_parent(mut self, path: &str, id: Option<String>) -> Self {
        self.parent = id.map(|id| (path.to_string(), id));
        self
    }

    /// Field names with any `^boost` suffix stripped.
    pub fn bare_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .map(|f| f.split_once('^').map_or(f.as_str(), |(name, _)| name))
    }

    /// Projects the query to the engine's search DSL.
    ///
    /// Text becomes a `multi_match` (or single-field `match`) with AND
    /// semantics, automatic fuzziness, and a 75% term floor. The parent
    /// constraint becomes a `term` filter.
    pub fn to_body(&self) -> Value {
        let mut must = Vec::new();
        if let Some(text) = &self.text {
            if self.fields.len() == 1 {
                let field = self.fields[0].clone();
                must.push(json!({
                    "match": {
                        field: {
                            "query": text,
                            "operator": "and",
                            "fuzziness": "AUTO",
                            "minimum_should_match": "75%"
                        }
                    }
                }));
            } else {
                must.push(json!({
                    "multi_match": {
                        "query": text,
                        "fields": self.fields,
                        "operator": "and",
                        "fuzziness": "AUTO",
                        "minimum_should_match": "75%"
                    }
                }));
            }
        } else {
            must.push(json!({ "match_all": {} }));
        }

        let mut filter = Vec::new();
        if let Some((path, id)) = &self.parent {
            filter.push(json!({ "term": { path.clone(): id } }));
        }

        json!({
            "from": self.from,
            "size": self.size,
            "track_total_hits": true,
            "query": {
                "bool": {
                    "must": must,
                    "filter": filter
                }
            }
        })
    }
}

/// Maximum edit distance for a term under AUTO fuzziness.
pub(crate) fn auto_fuzziness(term_len: usize) -> usize {
    match term_len {
        0..=2 => 0,
        3..=5 => 1,
        _ => 2,
    }
}
