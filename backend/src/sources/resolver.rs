//! Fallback resolution of one entity across its candidate sources
//!
//! Candidates are probed strictly in order. A candidate that errors or
//! returns no rows is recorded and skipped; the first one with at least one
//! row supplies the whole result. Results are never merged across sources.

use std::sync::Arc;

use shared::{
    normalize_rows, AttemptOutcome, Canonical, FetchFilter, FieldTable, NormalizeContext,
    Provenance, SourceAttempt,
};

use super::adapter::SourceAdapter;

/// One source in a chain, paired with the field table that reads it
pub struct Candidate<T: Canonical> {
    pub table: &'static FieldTable<T::Field>,
    pub adapter: Arc<dyn SourceAdapter>,
}

impl<T: Canonical> Clone for Candidate<T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            adapter: Arc::clone(&self.adapter),
        }
    }
}

/// Canonical records for one entity plus where they came from
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub records: Vec<T>,
    pub provenance: Provenance,
}

/// Ordered candidate chain for one entity
pub struct FallbackResolver<T: Canonical> {
    candidates: Vec<Candidate<T>>,
}

impl<T: Canonical> Clone for FallbackResolver<T> {
    fn clone(&self) -> Self {
        Self {
            candidates: self.candidates.clone(),
        }
    }
}

impl<T: Canonical> FallbackResolver<T> {
    pub fn new(candidates: Vec<Candidate<T>>) -> Self {
        Self { candidates }
    }

    /// Source names in probe order
    pub fn source_chain(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.adapter.name()).collect()
    }

    /// Resolve and normalize. Never fails: an exhausted chain yields an
    /// empty set whose provenance records why.
    pub async fn resolve(&self, filter: FetchFilter, ctx: &NormalizeContext) -> Resolved<T> {
        let entity = T::ENTITY;
        let mut attempts = Vec::with_capacity(self.candidates.len());

        for candidate in &self.candidates {
            let source = candidate.adapter.name().to_string();
            tracing::debug!(%entity, %source, limit = filter.limit, "Probing source");

            let rows = match candidate.adapter.fetch(filter).await {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::warn!(%entity, %source, error = %e, "Source failed, falling back");
                    attempts.push(SourceAttempt {
                        source,
                        outcome: AttemptOutcome::Error {
                            message: e.to_string(),
                        },
                    });
                    continue;
                }
            };

            if rows.is_empty() {
                tracing::debug!(%entity, %source, "Source empty, falling back");
                attempts.push(SourceAttempt {
                    source,
                    outcome: AttemptOutcome::Empty,
                });
                continue;
            }

            let (records, skipped) = normalize_rows::<T>(candidate.table, &rows, ctx);
            for error in &skipped {
                tracing::warn!(%entity, %source, error = %error, "Skipping row");
            }

            if !attempts.is_empty() {
                tracing::warn!(
                    %entity,
                    %source,
                    failed_attempts = attempts.len(),
                    "Source fallback succeeded"
                );
            }
            tracing::info!(%entity, %source, rows = rows.len(), "Resolved entity");

            attempts.push(SourceAttempt {
                source: source.clone(),
                outcome: AttemptOutcome::Rows { count: rows.len() },
            });
            return Resolved {
                records,
                provenance: Provenance {
                    entity,
                    selected_source: Some(source),
                    row_count: rows.len(),
                    skipped_rows: skipped.len(),
                    attempts,
                },
            };
        }

        tracing::info!(%entity, candidates = attempts.len(), "No source had data");
        Resolved {
            records: Vec::new(),
            provenance: Provenance {
                entity,
                selected_source: None,
                row_count: 0,
                skipped_rows: 0,
                attempts,
            },
        }
    }
}
