use std::future::Future;
use std::time::Duration;

use crate::error::Error;

/// How often and how patiently a request is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Total number of attempts, including the first one.
	pub max_attempts: u32,
	pub initial_delay: Duration,
	/// Multiplier applied to the delay after every failed attempt.
	pub backoff_factor: u32,
}

impl RetryPolicy {
	pub const NONE: Self = Self {
		max_attempts: 1,
		initial_delay: Duration::ZERO,
		backoff_factor: 1,
	};

	/// The delay before attempt `attempt` (counting from 1), `None` for the first attempt.
	pub fn delay_before(&self, attempt: u32) -> Option<Duration> {
		if attempt <= 1 {
			return None;
		}
		let factor = self.backoff_factor.max(1).saturating_pow(attempt - 2);
		Some(self.initial_delay.saturating_mul(factor))
	}

	/// Run `operation` until it succeeds or the attempts run out.
	///
	/// Only server responses with a non-OK status are retried.
	/// Local failures like a missing token or a validation error would fail the same way again.
	pub async fn run<T, F, Fut>(&self, what: &str, mut operation: F) -> Result<T, Error>
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<T, Error>>,
	{
		let mut attempt = 1;
		loop {
			match operation().await {
				Ok(value) => return Ok(value),
				Err(e) if e.status().is_some() && attempt < self.max_attempts => {
					attempt += 1;
					let delay = self.delay_before(attempt).unwrap_or_default();
					log::warn!("{} failed, retrying in {:?} (attempt {} of {}): {}", what, delay, attempt, self.max_attempts, e);
					tokio::time::sleep(delay).await;
				},
				Err(e) => {
					if attempt > 1 {
						log::error!("{} failed after {} attempts: {}", what, attempt, e);
					}
					return Err(e);
				},
			}
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use reqwest::StatusCode;
	use std::cell::Cell;

	fn server_error() -> Error {
		Error::Http {
			context: "failed to put api/tasks/1".into(),
			status: StatusCode::INTERNAL_SERVER_ERROR,
			message: None,
		}
	}

	#[test]
	fn delays_grow_by_backoff_factor() {
		let policy = RetryPolicy {
			max_attempts: 4,
			initial_delay: Duration::from_secs(1),
			backoff_factor: 2,
		};
		assert_eq!(policy.delay_before(1), None);
		assert_eq!(policy.delay_before(2), Some(Duration::from_secs(1)));
		assert_eq!(policy.delay_before(3), Some(Duration::from_secs(2)));
		assert_eq!(policy.delay_before(4), Some(Duration::from_secs(4)));
	}

	#[tokio::test(start_paused = true)]
	async fn retries_server_errors_until_success() {
		let calls = Cell::new(0);
		let policy = RetryPolicy { max_attempts: 2, initial_delay: Duration::from_secs(1), backoff_factor: 2 };
		let result = policy.run("update task", || {
			calls.set(calls.get() + 1);
			let call = calls.get();
			async move {
				if call == 1 {
					Err(server_error())
				} else {
					Ok(call)
				}
			}
		}).await;
		assert_eq!(result.unwrap(), 2);
		assert_eq!(calls.get(), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn gives_up_after_max_attempts() {
		let calls = Cell::new(0);
		let policy = RetryPolicy { max_attempts: 2, initial_delay: Duration::from_secs(1), backoff_factor: 2 };
		let result: Result<(), Error> = policy.run("update task", || {
			calls.set(calls.get() + 1);
			async { Err(server_error()) }
		}).await;
		assert_eq!(result.unwrap_err().status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
		assert_eq!(calls.get(), 2);
	}

	#[tokio::test]
	async fn local_errors_are_not_retried() {
		let calls = Cell::new(0);
		let result: Result<(), Error> = RetryPolicy { max_attempts: 3, ..RetryPolicy::NONE }.run("update task", || {
			calls.set(calls.get() + 1);
			async { Err(Error::MissingToken) }
		}).await;
		assert!(matches!(result, Err(Error::MissingToken)));
		assert_eq!(calls.get(), 1);
	}
}
