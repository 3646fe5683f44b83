use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::models::Owner;

/// Ticket handed out when a statistics refresh starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshToken {
    owner: Owner,
    seq: u64,
}

impl RefreshToken {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Orders concurrent refreshes per user so that a slow, older fetch cannot
/// overwrite the result of a newer one.
#[derive(Clone, Default)]
pub struct RefreshSequencer {
    latest: Arc<Mutex<HashMap<Owner, u64>>>,
}

impl RefreshSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next token for this owner; it supersedes every earlier one.
    pub async fn issue(&self, owner: Owner) -> RefreshToken {
        let mut latest = self.latest.lock().await;
        let seq = latest.entry(owner).or_insert(0);
        *seq += 1;
        RefreshToken { owner, seq: *seq }
    }

    /// True if no newer token has been issued for the same owner.
    pub async fn is_latest(&self, token: &RefreshToken) -> bool {
        let latest = self.latest.lock().await;
        latest.get(&token.owner).copied() == Some(token.seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_newer_token_supersedes_older() {
        let seq = RefreshSequencer::new();
        let owner = Owner(Uuid::new_v4());

        let first = seq.issue(owner).await;
        assert!(seq.is_latest(&first).await);

        let second = seq.issue(owner).await;
        assert!(second.seq() > first.seq());
        assert!(!seq.is_latest(&first).await);
        assert!(seq.is_latest(&second).await);
    }

    #[tokio::test]
    async fn test_owners_are_independent() {
        let seq = RefreshSequencer::new();
        let alice = Owner(Uuid::new_v4());
        let bob = Owner(Uuid::new_v4());

        let a = seq.issue(alice).await;
        let _b = seq.issue(bob).await;
        assert!(seq.is_latest(&a).await);
    }
}
