//! Screen state: a fetched collection, its list state, and the bookkeeping
//! for loads and mutations in flight.
//!
//! A screen owns its copy of the collection for as long as it is active.
//! Loads and mutations are split into a start step that hands out a ticket
//! and a finish step that consumes it, so a response can be matched to the
//! activation it was issued under. Responses for an earlier activation are
//! dropped instead of being applied to a screen the user has left.
//!
//! Successful mutations patch the local collection through a pure
//! `(old collection, result) -> new collection` function; failed ones leave
//! it untouched. Nothing is retried.

pub mod borrows;
pub mod catalog;
pub mod profile;
pub mod users;

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, error};

use crate::api::ApiResult;
use crate::forms::FieldErrors;
use crate::listing::{ListState, ListView, RecordFilter, Searchable};
use crate::models::RecordId;

/// Identifies one activation of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation(u64);

/// Handed out when a mutation starts; marks its record as in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationTicket {
    activation: Activation,
    id: RecordId,
}

impl MutationTicket {
    pub fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    /// Fetch failed; the screen shows whatever it has (usually nothing)
    Failed(String),
    /// Response belonged to an earlier activation and was dropped
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    /// Local validation failed; no request was sent
    Invalid(FieldErrors),
    /// The same record already has a mutation in flight
    Busy,
    /// Destructive action attempted without confirmation; nothing was sent
    Unconfirmed,
    /// Backend rejected the call; message is shown to the user as-is
    Failed(String),
    Stale,
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }
}

#[derive(Debug)]
pub struct Screen<T, F> {
    records: Vec<T>,
    list: ListState<F>,
    loading: bool,
    load_failed: bool,
    in_flight: HashSet<RecordId>,
    activation: u64,
}

impl<T, F> Screen<T, F> {
    pub fn new(list: ListState<F>) -> Self {
        Self {
            records: Vec::new(),
            list,
            loading: false,
            load_failed: false,
            in_flight: HashSet::new(),
            activation: 0,
        }
    }

    /// Enter the screen: discard any previous collection and start loading.
    pub fn activate(&mut self) -> Activation {
        self.activation += 1;
        self.records.clear();
        self.in_flight.clear();
        self.loading = true;
        self.load_failed = false;
        Activation(self.activation)
    }

    /// Leave the screen. Outstanding tickets become stale.
    pub fn deactivate(&mut self) {
        self.activation += 1;
        self.records.clear();
        self.in_flight.clear();
        self.loading = false;
    }

    pub fn is_current(&self, activation: Activation) -> bool {
        activation.0 == self.activation
    }

    pub fn finish_load(&mut self, activation: Activation, result: ApiResult<Vec<T>>) -> LoadOutcome {
        if !self.is_current(activation) {
            debug!("Dropping list response for an inactive screen");
            return LoadOutcome::Stale;
        }

        self.loading = false;
        match result {
            Ok(records) => {
                let count = records.len();
                self.records = records;
                debug!(count, "List loaded");
                LoadOutcome::Loaded(count)
            }
            Err(e) => {
                error!(error = %e, "Failed to load list");
                self.load_failed = true;
                LoadOutcome::Failed(e.message_or("Failed to load data"))
            }
        }
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn list(&self) -> &ListState<F> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListState<F> {
        &mut self.list
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    pub fn view(&mut self, now: DateTime<Utc>) -> ListView<'_, T>
    where
        T: Searchable,
        F: RecordFilter<T>,
    {
        self.list.view(&self.records, now)
    }

    pub fn is_in_flight(&self, id: RecordId) -> bool {
        self.in_flight.contains(&id)
    }

    /// Mark `id` as in flight. `None` if it already is.
    pub fn begin_mutation(&mut self, id: RecordId) -> Option<MutationTicket> {
        if !self.in_flight.insert(id) {
            return None;
        }
        Some(MutationTicket {
            activation: Activation(self.activation),
            id,
        })
    }

    /// Apply a mutation result. On success `patch` turns the old collection
    /// into the new one; on failure the collection is left as it was.
    pub fn finish_mutation<R>(
        &mut self,
        ticket: MutationTicket,
        result: ApiResult<R>,
        fallback: &str,
        patch: impl FnOnce(Vec<T>, R) -> Vec<T>,
    ) -> MutationOutcome {
        if !self.is_current(ticket.activation) {
            debug!(id = ticket.id, "Dropping mutation response for an inactive screen");
            return MutationOutcome::Stale;
        }
        self.in_flight.remove(&ticket.id);

        match result {
            Ok(value) => {
                let records = std::mem::take(&mut self.records);
                self.records = patch(records, value);
                MutationOutcome::Applied
            }
            Err(e) => MutationOutcome::Failed(e.message_or(fallback)),
        }
    }
}

/// Replace the record matching `id` using `update`, keeping order.
pub(crate) fn patch_where<T>(
    records: Vec<T>,
    matches: impl Fn(&T) -> bool,
    update: impl Fn(T) -> T,
) -> Vec<T> {
    records
        .into_iter()
        .map(|r| if matches(&r) { update(r) } else { r })
        .collect()
}
