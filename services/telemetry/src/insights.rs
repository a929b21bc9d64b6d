use parking_lot::RwLock;
use shared::{FleetError, FleetResult, Insight};
use std::collections::HashSet;

/// Append-only advisory list, listed by priority and then insertion order.
pub struct InsightFeed {
    entries: RwLock<Vec<Insight>>,
}

impl InsightFeed {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn append(&self, insight: Insight) -> FleetResult<()> {
        insight.validate()?;
        let mut entries = self.entries.write();
        if entries.iter().any(|existing| existing.id == insight.id) {
            return Err(FleetError::DuplicateId {
                entity: "insight",
                id: insight.id.to_string(),
            });
        }
        tracing::debug!(id = insight.id, priority = ?insight.priority, "Insight appended");
        entries.push(insight);
        Ok(())
    }

    /// Check a batch against itself and the current feed without appending.
    pub fn validate_batch(&self, batch: &[Insight]) -> FleetResult<()> {
        let entries = self.entries.read();
        check_batch(&entries, batch)
    }

    /// Append a whole batch or none of it.
    pub fn extend(&self, batch: Vec<Insight>) -> FleetResult<()> {
        let mut entries = self.entries.write();
        check_batch(&entries, &batch)?;
        tracing::debug!(count = batch.len(), "Insights appended");
        entries.extend(batch);
        Ok(())
    }

    pub fn list(&self) -> Vec<Insight> {
        let mut listed = self.entries.read().clone();
        // Stable sort keeps insertion order within a priority.
        listed.sort_by_key(|insight| insight.priority);
        listed
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

fn check_batch(existing: &[Insight], batch: &[Insight]) -> FleetResult<()> {
    let mut seen: HashSet<u32> = existing.iter().map(|insight| insight.id).collect();
    for insight in batch {
        insight.validate()?;
        if !seen.insert(insight.id) {
            return Err(FleetError::DuplicateId {
                entity: "insight",
                id: insight.id.to_string(),
            });
        }
    }
    Ok(())
}

impl Default for InsightFeed {
    fn default() -> Self {
        Self::new()
    }
}
