//! Actor directory: identity to mailbox routing
//!
//! TigerStyle: Mutated only by the runtime at start and stop.

use crate::mailbox::MailboxSender;
use actr_core::error::{Error, Result};
use actr_core::ActorId;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Live actors reachable in this process
#[derive(Debug, Default)]
pub struct Directory {
    mailboxes: RwLock<HashMap<ActorId, MailboxSender>>,
}

impl Directory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Make an actor reachable
    pub fn register(&self, actor_id: ActorId, sender: MailboxSender) -> Result<()> {
        let mut mailboxes = self
            .mailboxes
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if mailboxes.contains_key(&actor_id) {
            return Err(Error::internal(format!(
                "actor {} already registered",
                actor_id
            )));
        }
        mailboxes.insert(actor_id, sender);
        Ok(())
    }

    /// Make an actor unreachable; returns whether it was registered
    pub fn unregister(&self, actor_id: &ActorId) -> bool {
        self.mailboxes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(actor_id)
            .is_some()
    }

    /// Mailbox of a live actor
    pub fn sender(&self, actor_id: &ActorId) -> Option<MailboxSender> {
        self.mailboxes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(actor_id)
            .cloned()
    }

    /// Whether an actor is reachable
    pub fn contains(&self, actor_id: &ActorId) -> bool {
        self.mailboxes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(actor_id)
    }

    /// Number of reachable actors
    pub fn len(&self) -> usize {
        self.mailboxes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no actor is reachable
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::mailbox;
    use actr_core::ServiceType;

    fn id(serial: u64) -> ActorId {
        ActorId::new(1, serial, ServiceType::new("acme", "Test").unwrap())
    }

    #[test]
    fn test_register_unregister() {
        let directory = Directory::new();
        let (tx, _rx) = mailbox(4);

        directory.register(id(1), tx.clone()).unwrap();
        assert!(directory.contains(&id(1)));
        assert!(directory.sender(&id(2)).is_none());
        assert!(directory.register(id(1), tx).is_err());

        assert!(directory.unregister(&id(1)));
        assert!(!directory.unregister(&id(1)));
        assert!(directory.is_empty());
    }
}
