use chrono::NaiveDate;

use crate::api_client::ActivityPage;
use crate::status::TASK_ACTIVITY_TYPES;
use crate::types::Activity;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityStats {
	pub total: u64,
	pub task_related: usize,
	pub today: usize,
}

/// Statistics over a page that holds the whole log.
///
/// `total` comes from the server's pagination when present.
pub fn stats(page: &ActivityPage, today: NaiveDate) -> ActivityStats {
	ActivityStats {
		total: page.pagination.map(|pagination| pagination.total).unwrap_or(page.activities.len() as u64),
		task_related: page.activities.iter().filter(|activity| is_task_related(activity)).count(),
		today: page.activities.iter().filter(|activity| activity.created_at.date_naive() == today).count(),
	}
}

pub fn is_task_related(activity: &Activity) -> bool {
	TASK_ACTIVITY_TYPES.contains(&activity.kind.as_str())
}

/// Number of pages, as far as it can be known.
///
/// Without pagination info a full page suggests there is at least one more.
pub fn total_pages(page: &ActivityPage, page_number: u64, page_size: u64) -> u64 {
	match page.pagination {
		Some(pagination) if pagination.limit > 0 => pagination.total.div_ceil(pagination.limit).max(1),
		_ if (page.activities.len() as u64) < page_size => page_number,
		_ => page_number + 1,
	}
}
