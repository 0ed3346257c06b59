use std::future::Future;

use crate::error::Error;

/// Loading, loaded or failed: the state of one fetched resource.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
	Loading,
	Loaded(T),
	Failed(String),
}

impl<T> Default for LoadState<T> {
	fn default() -> Self {
		Self::Loading
	}
}

impl<T> LoadState<T> {
	/// Run a fetch and record its outcome.
	///
	/// A failure replaces whatever was loaded before with the user facing message.
	pub async fn fetch<F>(&mut self, what: &str, fetch: F)
	where
		F: Future<Output = Result<T, Error>>,
	{
		*self = Self::Loading;
		*self = match fetch.await {
			Ok(value) => Self::Loaded(value),
			Err(e) => {
				log::error!("Failed to fetch {}: {}", what, e);
				Self::Failed(e.user_message(&format!("{}の取得中にエラーが発生しました", what)))
			},
		};
	}

	pub fn get(&self) -> Option<&T> {
		match self {
			Self::Loaded(value) => Some(value),
			_ => None,
		}
	}

	pub fn is_loading(&self) -> bool {
		matches!(self, Self::Loading)
	}

	pub fn error(&self) -> Option<&str> {
		match self {
			Self::Failed(message) => Some(message),
			_ => None,
		}
	}
}
