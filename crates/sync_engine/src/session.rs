//! Scoped ownership of an open container.

use std::ops::{Deref, DerefMut};

use contracts::{AnnotatedStore, ContractError};
use tracing::{error, warn};

/// Guard over an open store that closes it exactly once
///
/// `close` flushes and closes explicitly and reports the outcome. If the guard
/// is dropped first, for example on an early `?` return, the store is closed
/// from `Drop` and any error is logged.
pub struct ContainerSession<'a, S: AnnotatedStore + ?Sized> {
    store: &'a mut S,
    closed: bool,
}

impl<'a, S: AnnotatedStore + ?Sized> ContainerSession<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self {
            store,
            closed: false,
        }
    }

    pub fn close(mut self) -> Result<(), ContractError> {
        self.closed = true;
        self.store.flush_and_close()
    }
}

impl<S: AnnotatedStore + ?Sized> Deref for ContainerSession<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.store
    }
}

impl<S: AnnotatedStore + ?Sized> DerefMut for ContainerSession<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.store
    }
}

impl<S: AnnotatedStore + ?Sized> Drop for ContainerSession<'_, S> {
    fn drop(&mut self) {
        if self.closed || self.store.is_closed() {
            return;
        }
        warn!(container = self.store.name(), "closing container after an aborted conversion");
        if let Err(err) = self.store.flush_and_close() {
            error!(container = self.store.name(), error = %err, "failed to close container");
        }
    }
}
