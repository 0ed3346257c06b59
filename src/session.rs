use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::User;

/// A logged in session: the bearer token and the user it belongs to.
///
/// Created by a successful login, loaded once at startup, and gone after logout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
	#[serde(rename = "jwtToken")]
	pub token: String,
	pub user: Option<User>,
}

/// The on-disk home of the session, a small JSON file with the `jwtToken` and `user` entries.
pub struct SessionStore {
	path: PathBuf,
}

impl SessionStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Load the stored session, `None` when nobody is logged in.
	///
	/// A file that does not parse counts as logged out, so a new login or a logout can replace it.
	pub fn load(&self) -> Result<Option<Session>, Error> {
		let data = match std::fs::read_to_string(&self.path) {
			Ok(data) => data,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(Error::Local(format!("failed to read session from {}: {}", self.path.display(), e))),
		};

		let session: Session = match serde_json::from_str(&data) {
			Ok(session) => session,
			Err(e) => {
				log::warn!("Ignoring unreadable session in {}: {}", self.path.display(), e);
				return Ok(None);
			},
		};
		if session.token.is_empty() {
			return Ok(None);
		}
		Ok(Some(session))
	}

	pub fn save(&self, session: &Session) -> Result<(), Error> {
		let data = serde_json::to_string_pretty(session)
			.map_err(|e| Error::Local(format!("failed to serialize session: {}", e)))?;
		std::fs::write(&self.path, data)
			.map_err(|e| Error::Local(format!("failed to write session to {}: {}", self.path.display(), e)))?;
		log::debug!("Stored session in {}", self.path.display());
		Ok(())
	}

	/// Forget the stored session. Clearing an already empty store is fine.
	pub fn clear(&self) -> Result<(), Error> {
		match std::fs::remove_file(&self.path) {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(Error::Local(format!("failed to remove session file {}: {}", self.path.display(), e))),
		}
	}
}
