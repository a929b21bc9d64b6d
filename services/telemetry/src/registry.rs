use parking_lot::RwLock;
use shared::{Entity, FleetError, FleetResult};
use std::collections::{HashMap, HashSet};

struct RegistryState<T> {
    entities: Vec<T>,
    index: HashMap<String, usize>,
    seeded: bool,
}

/// Owned, id-keyed collection of entities.
///
/// Entities are never removed, so seed-time positions stay valid for the
/// whole session and snapshots come back in seed order.
pub struct Registry<T: Entity> {
    state: RwLock<RegistryState<T>>,
}

pub type VehicleRegistry = Registry<shared::Vehicle>;
pub type DriverRegistry = Registry<shared::Driver>;

impl<T: Entity> Registry<T> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState {
                entities: Vec::new(),
                index: HashMap::new(),
                seeded: false,
            }),
        }
    }

    /// Check a seed batch without committing it: the registry must still be
    /// unseeded, every entity valid and every id unique.
    pub fn validate_batch(&self, batch: &[T]) -> FleetResult<()> {
        if self.is_seeded() {
            return Err(FleetError::AlreadySeeded(T::KIND));
        }
        let mut seen = HashSet::with_capacity(batch.len());
        for entity in batch {
            entity.validate()?;
            if !seen.insert(entity.id()) {
                return Err(FleetError::DuplicateId {
                    entity: T::KIND,
                    id: entity.id().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Load the initial roster. All-or-nothing: one bad entity rejects the
    /// whole batch and leaves the registry empty.
    pub fn seed(&self, initial: Vec<T>) -> FleetResult<()> {
        self.validate_batch(&initial)?;

        let mut state = self.state.write();
        if state.seeded {
            return Err(FleetError::AlreadySeeded(T::KIND));
        }
        state.index = initial
            .iter()
            .enumerate()
            .map(|(pos, e)| (e.id().to_string(), pos))
            .collect();
        state.entities = initial;
        state.seeded = true;

        tracing::info!(kind = T::KIND, count = state.entities.len(), "Registry seeded");
        Ok(())
    }

    pub fn is_seeded(&self) -> bool {
        self.state.read().seeded
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.state.read().entities.clone()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        let state = self.state.read();
        state.index.get(id).map(|&pos| state.entities[pos].clone())
    }

    pub fn ids(&self) -> Vec<String> {
        self.state
            .read()
            .entities
            .iter()
            .map(|e| e.id().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the entity with `f(current)` under the write lock.
    pub fn try_mutate<F>(&self, id: &str, f: F) -> FleetResult<()>
    where
        F: FnOnce(&T) -> T,
    {
        let mut state = self.state.write();
        let pos = match state.index.get(id) {
            Some(&pos) => pos,
            None => {
                return Err(FleetError::LookupMiss {
                    entity: T::KIND,
                    id: id.to_string(),
                })
            }
        };
        let next = f(&state.entities[pos]);
        state.entities[pos] = next;
        Ok(())
    }

    /// Like [`Registry::try_mutate`], but a missing id is logged and
    /// swallowed. Returns whether the mutation was applied.
    pub fn apply_mutation<F>(&self, id: &str, f: F) -> bool
    where
        F: FnOnce(&T) -> T,
    {
        match self.try_mutate(id, f) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(error = %err, "Mutation skipped");
                false
            }
        }
    }
}

impl<T: Entity> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}
