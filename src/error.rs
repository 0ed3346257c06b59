use reqwest::StatusCode;

/// Everything that can go wrong while talking to the skill viewer API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("not logged in: no session token found")]
	MissingToken,

	#[error("{context}: server responded with status code {status}{}", format_server_message(.message))]
	Http {
		context: String,
		status: StatusCode,
		message: Option<String>,
	},

	#[error("{context}: error sending request: {source}")]
	Transport {
		context: String,
		#[source]
		source: reqwest::Error,
	},

	#[error("{context}: error parsing response: {message}")]
	Parse {
		context: String,
		message: String,
	},

	#[error("{0}")]
	Validation(String),

	#[error("{0}")]
	Local(String),
}

fn format_server_message(message: &Option<String>) -> String {
	match message {
		Some(message) => format!(": {}", message),
		None => String::new(),
	}
}

impl Error {
	/// The message to show to a user.
	///
	/// Server supplied messages win, everything else that is not a validation failure
	/// collapses into a generic fallback.
	pub fn user_message(&self, fallback: &str) -> String {
		match self {
			Self::MissingToken => "トークンがありません".to_string(),
			Self::Http { message: Some(message), .. } => message.clone(),
			Self::Http { message: None, .. } => fallback.to_string(),
			Self::Transport { .. } | Self::Parse { .. } => fallback.to_string(),
			Self::Validation(message) => message.clone(),
			Self::Local(message) => message.clone(),
		}
	}

	pub fn status(&self) -> Option<StatusCode> {
		match self {
			Self::Http { status, .. } => Some(*status),
			_ => None,
		}
	}
}
