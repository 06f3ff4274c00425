use storekeep_auth::Role;
use storekeep_core::{StoreId, UserId};

/// Store context for a request.
///
/// Which store an actor acts on is resolved by the auth boundary (token
/// claims); the ledger trusts it and performs no authorization check itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StoreContext {
    store_id: StoreId,
}

impl StoreContext {
    pub fn new(store_id: StoreId) -> Self {
        Self { store_id }
    }

    pub fn store_id(&self) -> StoreId {
        self.store_id
    }
}

/// Actor context for a request (authenticated identity + role).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ActorContext {
    user_id: UserId,
    role: Role,
}

impl ActorContext {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }
}
