//! Optimistic mutations over a locally held record list.
//!
//! A mutation is applied to the list immediately and a [`Pending`] ticket is
//! returned. Once the backend answers the ticket is settled: success installs
//! the server's representation, failure restores the snapshot taken before the
//! change. Only one mutation per record may be pending at a time.

use std::collections::HashSet;

use metrics::counter;
use thiserror::Error;

use crate::domain::records::{Record, sort_for_display};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OptimisticError {
    #[error("The {entity} no longer exists.")]
    Missing { entity: &'static str },
    #[error("A change to this {entity} is still in progress.")]
    Busy { entity: &'static str },
}

#[derive(Debug)]
enum Undo<R> {
    Restore(R),
    Reinsert { index: usize, item: R },
}

/// Receipt for an applied but unconfirmed change.
#[derive(Debug)]
#[must_use = "a pending change must be settled"]
pub struct Pending<R> {
    id: String,
    undo: Undo<R>,
}

impl<R> Pending<R> {
    pub fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone)]
pub struct OptimisticList<R: Record> {
    items: Vec<R>,
    in_flight: HashSet<String>,
}

impl<R: Record> Default for OptimisticList<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            in_flight: HashSet::new(),
        }
    }
}

impl<R: Record> OptimisticList<R> {
    pub fn new(mut items: Vec<R>) -> Self {
        sort_for_display(&mut items);
        Self {
            items,
            in_flight: HashSet::new(),
        }
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.in_flight.contains(id)
    }

    /// Replace the whole list, e.g. after a reload. Pending tickets stay valid.
    pub fn reset(&mut self, items: Vec<R>) {
        *self = Self {
            in_flight: std::mem::take(&mut self.in_flight),
            ..Self::new(items)
        };
    }

    /// Add a newly created record ahead of existing ones.
    pub fn prepend(&mut self, item: R) {
        self.items.retain(|existing| existing.id() != item.id());
        self.items.insert(0, item);
    }

    /// Swap in the server's representation of an existing record.
    pub fn replace(&mut self, item: R) -> bool {
        match self.position(item.id()) {
            Some(index) => {
                self.items[index] = item;
                true
            }
            None => false,
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    fn claim(&mut self, id: &str) -> Result<usize, OptimisticError> {
        if self.in_flight.contains(id) {
            return Err(OptimisticError::Busy { entity: R::ENTITY });
        }
        let index = self
            .position(id)
            .ok_or(OptimisticError::Missing { entity: R::ENTITY })?;
        self.in_flight.insert(id.to_string());
        Ok(index)
    }

    /// Reserve a record without changing it, e.g. while a full save is sent.
    /// Other mutations on it are refused until [`OptimisticList::release`].
    pub fn hold(&mut self, id: &str) -> Result<(), OptimisticError> {
        self.claim(id).map(|_| ())
    }

    pub fn release(&mut self, id: &str) {
        self.in_flight.remove(id);
    }

    /// Apply `change` to one record now, remembering its previous state.
    pub fn begin_update(
        &mut self,
        id: &str,
        change: impl FnOnce(&mut R),
    ) -> Result<Pending<R>, OptimisticError> {
        let index = self.claim(id)?;
        let snapshot = self.items[index].clone();
        change(&mut self.items[index]);
        Ok(Pending {
            id: id.to_string(),
            undo: Undo::Restore(snapshot),
        })
    }

    /// Remove one record now, remembering where it was.
    pub fn begin_remove(&mut self, id: &str) -> Result<Pending<R>, OptimisticError> {
        let index = self.claim(id)?;
        let item = self.items.remove(index);
        Ok(Pending {
            id: id.to_string(),
            undo: Undo::Reinsert { index, item },
        })
    }

    /// Confirm a pending change. Updates adopt `confirmed` when the server sent one.
    pub fn commit(&mut self, pending: Pending<R>, confirmed: Option<R>) {
        self.in_flight.remove(&pending.id);
        if let (Undo::Restore(_), Some(server)) = (pending.undo, confirmed) {
            self.replace(server);
        }
    }

    /// Undo a pending change, restoring the pre-change snapshot.
    pub fn rollback(&mut self, pending: Pending<R>) {
        self.in_flight.remove(&pending.id);
        counter!("civitas_optimistic_rollbacks_total", "entity" => R::ENTITY).increment(1);
        match pending.undo {
            Undo::Restore(snapshot) => {
                self.replace(snapshot);
            }
            Undo::Reinsert { index, item } => {
                if self.position(item.id()).is_none() {
                    let index = index.min(self.items.len());
                    self.items.insert(index, item);
                }
            }
        }
    }

    /// Commit on `Ok`, roll back on `Err`, handing the error back to the caller.
    pub fn settle<E>(&mut self, pending: Pending<R>, outcome: Result<Option<R>, E>) -> Result<(), E> {
        match outcome {
            Ok(confirmed) => {
                self.commit(pending, confirmed);
                Ok(())
            }
            Err(err) => {
                self.rollback(pending);
                Err(err)
            }
        }
    }
}
