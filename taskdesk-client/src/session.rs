/// Client session and its on-disk lifecycle
///
/// A [`Session`] is the bearer token plus the profile returned at login. It is
/// passed explicitly to every authenticated call. [`SessionFile`] persists one
/// session as JSON: `save` after login, `load` at startup, `clear` on logout.

use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use taskdesk_shared::models::user::{PublicUser, Role};
use taskdesk_shared::services::identity::LoginResponse;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Logged-in user: bearer token and profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: PublicUser,
}

impl Session {
    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn is_admin(&self) -> bool {
        self.user.role.is_admin()
    }

    /// Client-side role guard
    ///
    /// The server enforces the same rule; checking here avoids a round trip
    /// that can only end in 403.
    pub fn require_role(&self, required: Role) -> ClientResult<()> {
        if self.user.role == required {
            Ok(())
        } else {
            Err(ClientError::RoleRequired { required })
        }
    }

    pub(crate) fn bearer(&self) -> &str {
        &self.token
    }
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Self {
            token: response.token,
            user: response.user,
        }
    }
}

/// JSON file holding at most one session
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored session
    ///
    /// # Returns
    ///
    /// `Ok(None)` if no session has been saved (or it was cleared).
    ///
    /// # Errors
    ///
    /// `Io` if the file exists but cannot be read, `InvalidSession` if it does
    /// not hold a session.
    pub fn load(&self) -> ClientResult<Option<Session>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session: Session = serde_json::from_str(&contents)?;
        debug!(path = %self.path.display(), user_id = session.user.id, "Loaded session");
        Ok(Some(session))
    }

    /// Writes the session, replacing any previous one
    ///
    /// Parent directories are created as needed. On Unix the file is
    /// readable by its owner only (mode `0600`), including when it already
    /// existed with wider permissions.
    pub fn save(&self, session: &Session) -> ClientResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(session)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(contents.as_bytes())?;

        debug!(path = %self.path.display(), user_id = session.user.id, "Saved session");
        Ok(())
    }

    /// Removes the stored session; clearing an absent session succeeds
    pub fn clear(&self) -> ClientResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Cleared session");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> Session {
        Session {
            token: "header.payload.signature".to_string(),
            user: PublicUser {
                id: 7,
                name: "Grace Hopper".to_string(),
                email: "grace@example.com".to_string(),
                role,
            },
        }
    }

    #[test]
    fn test_require_role() {
        assert!(session(Role::Admin).require_role(Role::Admin).is_ok());

        let err = session(Role::User).require_role(Role::Admin).unwrap_err();
        assert!(matches!(err, ClientError::RoleRequired { required: Role::Admin }));
    }

    #[test]
    fn test_session_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("nested/session.json"));

        assert_eq!(file.load().unwrap(), None);

        file.save(&session(Role::Admin)).unwrap();
        assert_eq!(file.load().unwrap(), Some(session(Role::Admin)));

        // Saving again replaces the previous session
        file.save(&session(Role::User)).unwrap();
        assert_eq!(file.load().unwrap().map(|s| s.role()), Some(Role::User));

        file.clear().unwrap();
        assert_eq!(file.load().unwrap(), None);
        file.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_session_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let file = SessionFile::new(&path);

        file.save(&session(Role::User)).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        // An existing world-readable file is tightened on save
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        file.save(&session(Role::Admin)).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(file.load().unwrap(), Some(session(Role::Admin)));
    }

    #[test]
    fn test_corrupt_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let err = SessionFile::new(&path).load().unwrap_err();
        assert!(matches!(err, ClientError::InvalidSession(_)));
    }

    #[test]
    fn test_session_json_shape() {
        let json = serde_json::to_value(session(Role::User)).unwrap();
        assert_eq!(json["user"]["role"], "user");
        assert_eq!(json["token"], "header.payload.signature");
    }
}
