//! Domain library for the user directory service.
//!
//! This crate holds the domain entities, the repository port (trait), the
//! error definitions, and the user service. Keep network- and file-backed
//! adapters out of this crate; the only adapter bundled here is the
//! in-process store under [`adapters`].

use thiserror::Error;

/// Input data for creating a user. Carries no identity; the repository
/// assigns the id at creation time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// A stored user with its repository-assigned identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

/// Repository port for persisting and loading users.
///
/// Implementations assign ids themselves: sequential, starting at 1, in
/// creation order. `list` returns users in that same order.
pub trait UserRepository: Send + Sync {
    fn create(&self, input: NewUser) -> Result<User, CoreError>;
    fn list(&self) -> Result<Vec<User>, CoreError>;
}

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("repository error: {0}")]
    Repository(String),
}

/// Return a short about/version line for the binary to print.
pub fn about() -> String {
    let pkg = env!("CARGO_PKG_NAME");
    let ver = env!("CARGO_PKG_VERSION");
    format!("{} v{} (user directory domain)", pkg, ver)
}

pub mod adapters;
pub mod service;
