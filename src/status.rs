//! Fixed mappings between API enum values and their Japanese display labels.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeStatus {
	Onsite,
	Office,
	Training,
	Searching,
}

impl EmployeeStatus {
	pub const ALL: [Self; 4] = [Self::Onsite, Self::Office, Self::Training, Self::Searching];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Onsite => "ONSITE",
			Self::Office => "OFFICE",
			Self::Training => "TRAINING",
			Self::Searching => "SEARCHING",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::Onsite => "現場",
			Self::Office => "内勤",
			Self::Training => "研修中",
			Self::Searching => "現場探し中",
		}
	}

	pub fn from_label(label: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|status| status.label() == label)
	}
}

impl std::fmt::Display for EmployeeStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.write_str(self.label())
	}
}

/// Accepts either the API value or the display label.
impl std::str::FromStr for EmployeeStatus {
	type Err = String;

	fn from_str(input: &str) -> Result<Self, Self::Err> {
		let input = input.trim();
		Self::ALL.into_iter()
			.find(|status| status.as_str().eq_ignore_ascii_case(input) || status.label() == input)
			.ok_or_else(|| format!("unknown employee status: {}", input))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
	Pending,
	InProgress,
	Completed,
	Cancelled,
}

impl TaskStatus {
	pub const ALL: [Self; 4] = [Self::Pending, Self::InProgress, Self::Completed, Self::Cancelled];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Pending => "PENDING",
			Self::InProgress => "IN_PROGRESS",
			Self::Completed => "COMPLETED",
			Self::Cancelled => "CANCELLED",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::Pending => "未対応",
			Self::InProgress => "進行中",
			Self::Completed => "完了",
			Self::Cancelled => "キャンセル",
		}
	}
}

impl std::fmt::Display for TaskStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.write_str(self.label())
	}
}

impl std::str::FromStr for TaskStatus {
	type Err = String;

	fn from_str(input: &str) -> Result<Self, Self::Err> {
		let input = input.trim();
		Self::ALL.into_iter()
			.find(|status| status.as_str().eq_ignore_ascii_case(input) || status.label() == input)
			.ok_or_else(|| format!("unknown task status: {}", input))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
	Low,
	Medium,
	High,
	Urgent,
}

impl TaskPriority {
	pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Low => "LOW",
			Self::Medium => "MEDIUM",
			Self::High => "HIGH",
			Self::Urgent => "URGENT",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::Low => "低",
			Self::Medium => "中",
			Self::High => "高",
			Self::Urgent => "緊急",
		}
	}
}

impl std::fmt::Display for TaskPriority {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.write_str(self.label())
	}
}

impl std::str::FromStr for TaskPriority {
	type Err = String;

	fn from_str(input: &str) -> Result<Self, Self::Err> {
		let input = input.trim();
		Self::ALL.into_iter()
			.find(|priority| priority.as_str().eq_ignore_ascii_case(input) || priority.label() == input)
			.ok_or_else(|| format!("unknown task priority: {}", input))
	}
}

/// Activity types that count as task related in the activity statistics.
pub const TASK_ACTIVITY_TYPES: [&str; 4] = ["TASK_CREATED", "TASK_UPDATED", "TASK_COMPLETED", "TASK_ASSIGNED"];

/// Display label for an activity type, unknown types show as "other".
pub fn activity_label(kind: &str) -> &'static str {
	match kind {
		"TASK_CREATED" => "タスク作成",
		"TASK_UPDATED" => "タスク更新",
		"TASK_COMPLETED" => "タスク完了",
		"TASK_ASSIGNED" => "タスク割り当て",
		"USER_LOGIN" => "ログイン",
		"USER_LOGOUT" => "ログアウト",
		_ => "その他",
	}
}
