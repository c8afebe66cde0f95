//! In-memory search index.
//!
//! Default backend mirroring the live engine's observable behavior:
//! AND-of-terms matching with AUTO fuzziness and the 75% term floor, term
//! filters on dotted paths, and windowed results with a total count.
//! Carries a failure-injection switch so tests can exercise the dual-write
//! inconsistency window.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::error::{IndexError, IndexResult};
use crate::index::query::auto_fuzziness;
use crate::index::{SearchHit, SearchIndex, SearchPage, SearchQuery};

/// Which operations the injected failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailNext {
    /// No injected failure.
    None,
    /// The next `put` fails with a write error.
    Put,
    /// The next `remove` fails with a write error.
    Remove,
}

/// Heap-backed [`SearchIndex`].
#[derive(Debug, Default)]
pub struct MemoryIndex {
    indices: RwLock<HashMap<String, Vec<(String, Value)>>>,
    fail_next: RwLock<Option<FailNext>>,
}

impl MemoryIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a one-shot failure for the next matching operation.
    pub fn fail_next(&self, mode: FailNext) {
        *self.fail_next.write() = Some(mode);
    }

    fn take_failure(&self, mode: FailNext) -> bool {
        let mut slot = self.fail_next.write();
        if *slot == Some(mode) {
            *slot = None;
            true
        } else {
            false
        }
    }
}

fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = document;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut current = vec![i + 1];
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current.push(substitution.min(previous[j + 1] + 1).min(current[j] + 1));
        }
        previous = current;
    }
    previous[b.len()]
}

fn term_matches(term: &str, doc_tokens: &[String]) -> bool {
    let budget = auto_fuzziness(term.chars().count());
    doc_tokens
        .iter()
        .any(|token| edit_distance(term, token) <= budget)
}

/// AND-of-terms with the 75% floor across all queried fields.
fn document_matches(document: &Value, query: &SearchQuery) -> bool {
    if let Some((path, id)) = &query.parent {
        let matched = lookup(document, path).map(|v| v.as_str() == Some(id.as_str()));
        if matched != Some(true) {
            return false;
        }
    }

    let Some(text) = &query.text else {
        return true;
    };
    let terms = tokenize(text);
    if terms.is_empty() {
        return true;
    }

    let doc_tokens: Vec<String> = query
        .bare_fields()
        .filter_map(|field| lookup(document, field))
        .filter_map(Value::as_str)
        .flat_map(tokenize)
        .collect();

    let matched = terms
        .iter()
        .filter(|term| term_matches(term, &doc_tokens))
        .count();
    matched * 4 >= terms.len() * 3
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, index: &str, id: &str, document: Value) -> IndexResult<()> {
        if self.take_failure(FailNext::Put) {
            return Err(IndexError::WriteFailed {
                index: index.to_string(),
                id: id.to_string(),
                message: "injected write failure".to_string(),
            });
        }
        let mut indices = self.indices.write();
        let docs = indices.entry(index.to_string()).or_default();
        match docs.iter_mut().find(|(doc_id, _)| doc_id == id) {
            Some((_, slot)) => *slot = document,
            None => docs.push((id.to_string(), document)),
        }
        Ok(())
    }

    async fn remove(&self, index: &str, entity: &str, id: &str) -> IndexResult<()> {
        if self.take_failure(FailNext::Remove) {
            return Err(IndexError::WriteFailed {
                index: index.to_string(),
                id: id.to_string(),
                message: "injected write failure".to_string(),
            });
        }
        let mut indices = self.indices.write();
        let docs = indices.entry(index.to_string()).or_default();
        let position = docs.iter().position(|(doc_id, _)| doc_id == id);
        match position {
            Some(i) => {
                docs.remove(i);
                Ok(())
            }
            None => Err(IndexError::NotFoundInIndex {
                index: index.to_string(),
                entity: entity.to_string(),
                id: id.to_string(),
            }),
        }
    }

    async fn get(&self, index: &str, id: &str) -> IndexResult<Option<Value>> {
        let indices = self.indices.read();
        Ok(indices.get(index).and_then(|docs| {
            docs.iter()
                .find(|(doc_id, _)| doc_id == id)
                .map(|(_, doc)| doc.clone())
        }))
    }

    async fn search(&self, index: &str, query: &SearchQuery) -> IndexResult<SearchPage> {
        let indices = self.indices.read();
        let matching: Vec<SearchHit> = indices
            .get(index)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| document_matches(doc, query))
                    .map(|(id, doc)| SearchHit {
                        id: id.clone(),
                        source: doc.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let total = matching.len() as u64;
        let hits = matching
            .into_iter()
            .skip(query.from as usize)
            .take(query.size as usize)
            .collect();
        Ok(SearchPage { hits, total })
    }

    async fn ping(&self) -> IndexResult<()> {
        Ok(())
    }
}
