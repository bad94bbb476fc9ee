use async_trait::async_trait;

use super::domain::{Identity, UserRecord};
use super::errors::AuthError;

/// In-place update applied by [`CredentialStore::mutate`]. Returning an error leaves the
/// stored record untouched.
pub type Mutation = Box<dyn FnOnce(&mut UserRecord) -> Result<(), AuthError> + Send>;

/// Storage abstraction for user records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// First record matching the predicate.
    async fn find(&self, predicate: &(dyn for<'r> Fn(&'r UserRecord) -> bool + Send + Sync)) -> Result<Option<UserRecord>, AuthError>;

    /// Insert a new record; fails with `DuplicateIdentity` when the identity is taken.
    /// The uniqueness check and the insert happen atomically.
    async fn insert(&self, user: UserRecord) -> Result<(), AuthError>;

    /// Apply `mutation` to the record keyed by `identity` and return the updated record.
    /// Fails with `NotFound` when absent. Check-and-set runs atomically.
    async fn mutate(&self, identity: &Identity, mutation: Mutation) -> Result<UserRecord, AuthError>;
}

pub mod memory {
    use super::*;
    use tokio::sync::RwLock;

    /// Process-lifetime user table; lookups are linear scans.
    #[derive(Default)]
    pub struct InMemoryCredentialStore {
        users: RwLock<Vec<UserRecord>>,
    }

    impl InMemoryCredentialStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_users(users: Vec<UserRecord>) -> Self {
            Self { users: RwLock::new(users) }
        }

        pub async fn len(&self) -> usize {
            self.users.read().await.len()
        }

        pub async fn is_empty(&self) -> bool {
            self.users.read().await.is_empty()
        }
    }

    #[async_trait]
    impl CredentialStore for InMemoryCredentialStore {
        async fn find(&self, predicate: &(dyn for<'r> Fn(&'r UserRecord) -> bool + Send + Sync)) -> Result<Option<UserRecord>, AuthError> {
            let users = self.users.read().await;
            Ok(users.iter().find(|&u| predicate(u)).cloned())
        }

        async fn insert(&self, user: UserRecord) -> Result<(), AuthError> {
            let mut users = self.users.write().await;
            if users.iter().any(|u| u.identity == user.identity) {
                return Err(AuthError::DuplicateIdentity);
            }
            users.push(user);
            Ok(())
        }

        async fn mutate(&self, identity: &Identity, mutation: Mutation) -> Result<UserRecord, AuthError> {
            let mut users = self.users.write().await;
            let slot = users
                .iter_mut()
                .find(|u| &u.identity == identity)
                .ok_or(AuthError::NotFound)?;
            let mut updated = slot.clone();
            mutation(&mut updated)?;
            *slot = updated.clone();
            Ok(updated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::InMemoryCredentialStore;
    use super::*;
    use crate::auth::domain::Role;

    fn student(email: &str) -> UserRecord {
        UserRecord::pending_student("Ann", email, "hash".into(), "123456".into())
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_email() {
        let store = InMemoryCredentialStore::new();
        store.insert(student("a@x.com")).await.unwrap();
        let err = store.insert(student("a@x.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateIdentity));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn email_and_username_spaces_are_separate() {
        let store = InMemoryCredentialStore::new();
        store.insert(student("admin")).await.unwrap();
        store.insert(UserRecord::admin("admin", "hash".into())).await.unwrap();
        let admin = store.find(&|u: &UserRecord| u.is_admin_with_username("admin")).await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
    }

    #[tokio::test]
    async fn find_returns_none_when_nothing_matches() {
        let store = InMemoryCredentialStore::with_users(vec![student("a@x.com")]);
        assert!(store.find(&|u: &UserRecord| u.is_student_with_email("b@x.com")).await.unwrap().is_none());
        assert!(store.find(&|u: &UserRecord| u.is_student_with_email("a@x.com")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn find_through_shared_trait_object() {
        let store: std::sync::Arc<dyn CredentialStore> =
            std::sync::Arc::new(InMemoryCredentialStore::with_users(vec![student("a@x.com")]));
        let wanted = String::from("a@x.com");
        let found = store.find(&|u: &UserRecord| u.has_email(&wanted)).await.unwrap();
        assert_eq!(found.map(|u| u.identity), Some(Identity::Email("a@x.com".into())));
    }

    #[tokio::test]
    async fn rejected_mutation_leaves_record_untouched() {
        let store = InMemoryCredentialStore::with_users(vec![student("a@x.com")]);
        let id = Identity::Email("a@x.com".into());
        let err = store
            .mutate(
                &id,
                Box::new(|u: &mut UserRecord| -> Result<(), AuthError> {
                    u.is_verified = true;
                    Err(AuthError::InvalidCode)
                }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCode));
        let user = store.find(&|u: &UserRecord| u.is_student_with_email("a@x.com")).await.unwrap().unwrap();
        assert!(!user.is_verified);
    }

    #[tokio::test]
    async fn mutate_missing_identity_is_not_found() {
        let store = InMemoryCredentialStore::new();
        let err = store
            .mutate(&Identity::Email("ghost@x.com".into()), Box::new(|_: &mut UserRecord| -> Result<(), AuthError> { Ok(()) }))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotFound));
    }
}
