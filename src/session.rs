//! Authentication sessions, and a way to keep them across runs

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TodoResult;

/// Who is logged in
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
}

/// An authenticated session, as handed out by the server at login
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    token: String,
    user: UserProfile,
}

impl Session {
    pub fn new<T: ToString>(token: T, user: UserProfile) -> Self {
        Self { token: token.to_string(), user }
    }

    /// The opaque bearer token
    pub fn token(&self) -> &str { &self.token }
    pub fn user(&self) -> &UserProfile { &self.user }
}

// The token is a credential, it has no business in log files
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Stores a session in a local JSON file
#[derive(Clone, Debug, PartialEq)]
pub struct SessionStore {
    backing_file: PathBuf,
}

impl SessionStore {
    pub fn new(path: &Path) -> Self {
        Self { backing_file: PathBuf::from(path) }
    }

    pub fn path(&self) -> &Path {
        &self.backing_file
    }

    /// Returns the stored session, or `None` in case nobody is logged in.
    ///
    /// A backing file that exists but cannot be read is an error.
    pub fn load(&self) -> TodoResult<Option<Session>> {
        let file = match std::fs::File::open(&self.backing_file) {
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No session file at {:?}", self.backing_file);
                return Ok(None);
            },
            Err(err) => return Err(err.into()),
            Ok(file) => file,
        };

        let session: Session = serde_json::from_reader(file)?;
        log::debug!("Restored session of {}", session.user().email);
        Ok(Some(session))
    }

    /// Store a session to the backing file, replacing any previous one
    pub fn save(&self, session: &Session) -> TodoResult<()> {
        let file = std::fs::File::create(&self.backing_file)?;
        serde_json::to_writer_pretty(file, session)?;
        log::info!("Session of {} saved to {:?}", session.user().email, self.backing_file);
        Ok(())
    }

    /// Forget the stored session (log out)
    pub fn clear(&self) -> TodoResult<()> {
        match std::fs::remove_file(&self.backing_file) {
            Ok(()) => {
                log::info!("Session removed from {:?}", self.backing_file);
                Ok(())
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.load(), Ok(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some_session() -> Session {
        Session::new("secret-token", UserProfile{ name: "Ada".to_string(), email: "ada@example.com".to_string() })
    }

    #[test]
    fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(&dir.path().join("session.json"));

        assert_eq!(store.load().unwrap(), None);
        assert!(store.is_authenticated() == false);

        store.save(&some_session()).unwrap();
        assert_eq!(store.load().unwrap(), Some(some_session()));
        assert!(store.is_authenticated());

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Logging out twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = SessionStore::new(&path);
        assert!(store.load().is_err());
        assert!(store.is_authenticated() == false);
    }

    #[test]
    fn token_is_not_printed() {
        let debug = format!("{:?}", some_session());
        assert!(debug.contains("secret-token") == false);
        assert!(debug.contains("ada@example.com"));
    }
}
