use tracing::instrument;

use super::{Scout, UserSession};
use crate::error::AppError;

impl Scout {
    /// Sessions of the named users, or the caller's own when none are named.
    #[instrument(skip(self))]
    pub async fn stalk(&self, user: &str, users: &[String]) -> Result<Vec<UserSession>, AppError> {
        if users.is_empty() {
            let session = self.store.session(user).await?.unwrap_or_default();
            return Ok(vec![UserSession {
                user: user.to_string(),
                session,
            }]);
        }

        let mut sessions = Vec::with_capacity(users.len());
        for name in users {
            let session = self
                .store
                .session(name)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Stalk: {name} has no session")))?;
            sessions.push(UserSession {
                user: name.clone(),
                session,
            });
        }
        Ok(sessions)
    }
}
