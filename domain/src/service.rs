use std::time::Duration;

use crate::{CoreError, NewUser, User, UserRepository};

/// Application service orchestrating user creation and listing.
///
/// It remains generic over the repository port so the backing store is chosen
/// at assembly time. Every operation first awaits a configurable simulated
/// backend latency (a cooperative sleep standing in for a slow collaborator)
/// and then delegates to the repository unchanged. This keeps the domain
/// testable without external dependencies.
pub struct UserService<R: UserRepository> {
    repo: R,
    simulated_latency: Duration,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R, simulated_latency: Duration) -> Self {
        Self {
            repo,
            simulated_latency,
        }
    }

    /// Create a user. Identity is assigned by the repository.
    pub async fn create_user(&self, input: NewUser) -> Result<User, CoreError> {
        self.wait_for_backend().await;
        self.repo.create(input)
    }

    /// List all users in creation order.
    pub async fn list_users(&self) -> Result<Vec<User>, CoreError> {
        self.wait_for_backend().await;
        self.repo.list()
    }

    // Cooperative sleep; the task yields instead of holding a runtime thread.
    // A zero latency skips the timer entirely.
    async fn wait_for_backend(&self) {
        if !self.simulated_latency.is_zero() {
            tokio::time::sleep(self.simulated_latency).await;
        }
    }
}
