use std::sync::Mutex;

use crate::{CoreError, NewUser, User, UserRepository};

/// Simple in-memory repository backed by an append-only vector. Contents live
/// and die with the process.
///
/// The id counter and the vector sit behind one mutex, so assigning an id and
/// appending the user happen atomically and ids stay gapless under concurrent
/// callers.
pub struct InMemoryUserRepo {
    inner: Mutex<Store>,
}

struct Store {
    users: Vec<User>,
    next_id: u64,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Store {
                users: Vec::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for InMemoryUserRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRepository for InMemoryUserRepo {
    fn create(&self, input: NewUser) -> Result<User, CoreError> {
        let mut store = self
            .inner
            .lock()
            .map_err(|_| CoreError::Repository("mutex poisoned".into()))?;
        let user = User {
            id: store.next_id,
            name: input.name,
            email: input.email,
        };
        store.next_id += 1;
        store.users.push(user.clone());
        Ok(user)
    }

    fn list(&self) -> Result<Vec<User>, CoreError> {
        let store = self
            .inner
            .lock()
            .map_err(|_| CoreError::Repository("mutex poisoned".into()))?;
        Ok(store.users.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn create_assigns_sequential_ids_from_one() {
        let repo = InMemoryUserRepo::new();
        for expected in 1..=3u64 {
            let user = repo.create(mk_user("Alice", "alice@example.com")).unwrap();
            assert_eq!(user.id, expected);
        }
    }

    #[test]
    fn identical_inputs_get_distinct_ids() {
        let repo = InMemoryUserRepo::new();
        let a = repo.create(mk_user("Alice", "alice@example.com")).unwrap();
        let b = repo.create(mk_user("Alice", "alice@example.com")).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn list_returns_users_in_creation_order() {
        let repo = InMemoryUserRepo::new();
        let a = repo.create(mk_user("Alice", "alice@example.com")).unwrap();
        let b = repo.create(mk_user("Bob", "bob@example.com")).unwrap();
        let c = repo.create(mk_user("Carol", "carol@example.com")).unwrap();
        assert_eq!(repo.list().unwrap(), vec![a, b, c]);
    }

    #[test]
    fn list_is_empty_on_fresh_repo() {
        let repo = InMemoryUserRepo::new();
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn created_user_round_trips_unchanged() {
        let repo = InMemoryUserRepo::new();
        let created = repo.create(mk_user("Alice", "alice@example.com")).unwrap();
        assert_eq!(created.name, "Alice");
        assert_eq!(created.email, "alice@example.com");
        let listed = repo.list().unwrap();
        assert_eq!(listed, vec![created]);
    }
}
