use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::debug;
use serde::Serialize;

use crate::error::ScaleError;
use crate::model::{
    Ingredient, IngredientDraft, IngredientField, IngredientId, PortionContext, Unit,
};
use crate::scaling::{scale, ScaledResult};

#[derive(Debug)]
struct StoreState {
    records: Vec<Ingredient>,
    portions: PortionContext,
    next_id: u64,
}

impl StoreState {
    fn issue_id(&mut self) -> IngredientId {
        self.next_id += 1;
        IngredientId(self.next_id)
    }

    fn position(&self, id: IngredientId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    fn seed(&mut self) {
        let id = self.issue_id();
        self.records = vec![IngredientDraft::new("Flour", 500.0, Unit::Gram).into_ingredient(id)];
        self.portions = PortionContext::default();
    }
}

// Import currently allowed to write into the store, if any
#[derive(Debug, Default)]
struct ImportSlot {
    current: Option<u64>,
    issued: u64,
}

/// Ordered, shared collection of ingredient records plus the portion counts
/// they are measured for.
///
/// All state sits behind a single lock, so a [`Snapshot`] always observes a
/// list and portion context that belong together. At most one import may be
/// pending against a store at a time, whichever importer started it.
#[derive(Debug)]
pub struct IngredientStore {
    state: RwLock<StoreState>,
    import_slot: Mutex<ImportSlot>,
}

impl Default for IngredientStore {
    fn default() -> Self {
        Self::seeded()
    }
}

impl IngredientStore {
    /// An empty store with the default portion context
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState {
                records: Vec::new(),
                portions: PortionContext::default(),
                next_id: 0,
            }),
            import_slot: Mutex::new(ImportSlot::default()),
        }
    }

    /// The calculator's starting state: 500 g of flour for 4 portions, scaled to 6
    pub fn seeded() -> Self {
        let store = Self::new();
        store.write().seed();
        store
    }

    /// Append an empty record and return its id
    pub fn add(&self) -> IngredientId {
        let mut state = self.write();
        let id = state.issue_id();
        state.records.push(Ingredient {
            id,
            name: String::new(),
            quantity: 0.0,
            unit: Unit::default(),
        });
        debug!("Added ingredient {}", id);
        id
    }

    /// Append a filled-in record and return its id
    pub fn push(&self, draft: IngredientDraft) -> IngredientId {
        let mut state = self.write();
        let id = state.issue_id();
        state.records.push(draft.into_ingredient(id));
        debug!("Added ingredient {}", id);
        id
    }

    /// Set one field on the record with `id`.
    ///
    /// Returns false when no such record exists; that is not an error since
    /// the row may already have been removed.
    pub fn update(&self, id: IngredientId, field: IngredientField) -> bool {
        let mut state = self.write();
        match state.position(id) {
            Some(index) => {
                debug!("Updating ingredient {}: {:?}", id, field);
                state.records[index].apply(field);
                true
            }
            None => {
                debug!("Ignoring update for missing ingredient {}", id);
                false
            }
        }
    }

    /// Remove the record with `id` if it is present
    pub fn remove(&self, id: IngredientId) -> bool {
        let mut state = self.write();
        match state.position(id) {
            Some(index) => {
                state.records.remove(index);
                debug!("Removed ingredient {}", id);
                true
            }
            None => false,
        }
    }

    /// Discard every record, install `drafts` in order and set the base
    /// portion count, all under one write lock.
    pub fn replace_all(
        &self,
        drafts: Vec<IngredientDraft>,
        base_portions: f64,
    ) -> Vec<IngredientId> {
        let mut state = self.write();
        let mut records = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = state.issue_id();
            records.push(draft.into_ingredient(id));
        }
        let ids = records.iter().map(|record| record.id).collect();
        debug!(
            "Replacing {} ingredients with {} (base portions {})",
            state.records.len(),
            records.len(),
            base_portions
        );
        state.records = records;
        state.portions.base_portions = base_portions;
        ids
    }

    /// Go back to the seeded starting state
    pub fn reset(&self) {
        self.write().seed();
        debug!("Store reset");
    }

    pub fn get(&self, id: IngredientId) -> Option<Ingredient> {
        let state = self.read();
        state.position(id).map(|index| state.records[index].clone())
    }

    pub fn ids(&self) -> Vec<IngredientId> {
        self.read().records.iter().map(|record| record.id).collect()
    }

    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().records.is_empty()
    }

    pub fn portions(&self) -> PortionContext {
        self.read().portions
    }

    pub fn set_base_portions(&self, base_portions: f64) {
        self.write().portions.base_portions = base_portions;
    }

    pub fn set_desired_portions(&self, desired_portions: f64) {
        self.write().portions.desired_portions = desired_portions;
    }

    /// Copy the current records and portion counts in one read
    pub fn snapshot(&self) -> Snapshot {
        let state = self.read();
        Snapshot {
            ingredients: state.records.clone(),
            portions: state.portions,
        }
    }

    /// Whether an import into this store is pending
    pub fn is_importing(&self) -> bool {
        self.slot().current.is_some()
    }

    /// Claim the import slot, returning the ticket of the new import or
    /// `None` while another import is pending
    pub(crate) fn begin_import(&self) -> Option<u64> {
        let mut slot = self.slot();
        if slot.current.is_some() {
            return None;
        }
        slot.issued += 1;
        slot.current = Some(slot.issued);
        slot.current
    }

    /// Give up the slot if `ticket` still owns it
    pub(crate) fn end_import(&self, ticket: u64) -> bool {
        let mut slot = self.slot();
        if slot.current == Some(ticket) {
            slot.current = None;
            true
        } else {
            false
        }
    }

    /// Release the slot held by `ticket` and run `apply` while still holding
    /// the slot lock. Returns `None` without running `apply` when the import
    /// was abandoned in the meantime.
    pub(crate) fn finish_import<T>(
        &self,
        ticket: u64,
        apply: impl FnOnce(&Self) -> T,
    ) -> Option<T> {
        let mut slot = self.slot();
        if slot.current != Some(ticket) {
            return None;
        }
        slot.current = None;
        Some(apply(self))
    }

    // Every critical section leaves the state consistent, so a poisoned lock
    // is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self) -> MutexGuard<'_, ImportSlot> {
        self.import_slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Immutable point-in-time copy of a store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub ingredients: Vec<Ingredient>,
    pub portions: PortionContext,
}

impl Snapshot {
    /// Scale this snapshot with its own portion counts
    pub fn scale(&self) -> Result<ScaledResult, ScaleError> {
        scale(
            &self.ingredients,
            self.portions.base_portions,
            self.portions.desired_portions,
        )
    }
}
