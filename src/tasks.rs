use chrono::{DateTime, Utc};

use crate::api_client::SkillApi;
use crate::employee_detail::EditState;
use crate::error::Error;
use crate::load_state::LoadState;
use crate::status::{TaskPriority, TaskStatus};
use crate::types::{Activity, NewActivity, Tag, Task, TaskInput};
use crate::validate;

/// Enough to get every activity in one page.
const ALL_ACTIVITIES: u64 = 10000;

#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
	pub title: String,
	pub description: String,
	pub priority: TaskPriority,
	pub status: TaskStatus,
	/// RFC 3339 timestamp or `yyyy-mm-dd`.
	pub due_date: String,
	pub related_employee_id: Option<u64>,
	pub assigned_user_ids: Vec<u64>,
	/// Tag names.
	pub tags: Vec<String>,
	pub is_send_mail: bool,
}

impl Default for TaskForm {
	fn default() -> Self {
		Self {
			title: String::new(),
			description: String::new(),
			priority: TaskPriority::Medium,
			status: TaskStatus::Pending,
			due_date: String::new(),
			related_employee_id: None,
			assigned_user_ids: Vec::new(),
			tags: Vec::new(),
			is_send_mail: false,
		}
	}
}

impl TaskForm {
	pub fn from_task(task: &Task) -> Self {
		Self {
			title: task.title.clone(),
			description: task.description.clone(),
			priority: task.priority,
			status: task.status,
			due_date: task.due_date.to_rfc3339(),
			related_employee_id: task.related_employee_id.or(task.related_employee.as_ref().map(|employee| employee.id)),
			assigned_user_ids: task.assignments.iter().map(|assignment| assignment.user.id).collect(),
			tags: task.tags.iter().map(|tag| tag.name.clone()).collect(),
			is_send_mail: task.is_send_mail,
		}
	}

	pub fn to_input(&self) -> Result<TaskInput, Error> {
		validate::required(
			&[("title", self.title.as_str()), ("description", self.description.as_str()), ("dueDate", self.due_date.as_str())],
			"タイトル、説明、期限は必須です",
		)?;
		Ok(TaskInput {
			title: self.title.trim().to_string(),
			description: self.description.trim().to_string(),
			priority: self.priority,
			status: self.status,
			due_date: validate::due_date(&self.due_date)?,
			related_employee_id: self.related_employee_id,
			assigned_user_ids: self.assigned_user_ids.clone(),
			tags: self.tags.clone(),
			is_send_mail: self.is_send_mail,
		})
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskSummary {
	pub total: usize,
	pub pending: usize,
	pub in_progress: usize,
	/// Not completed and past the due date.
	pub overdue: usize,
}

pub fn summarize(tasks: &[Task], now: DateTime<Utc>) -> TaskSummary {
	TaskSummary {
		total: tasks.len(),
		pending: tasks.iter().filter(|task| task.status == TaskStatus::Pending).count(),
		in_progress: tasks.iter().filter(|task| task.status == TaskStatus::InProgress).count(),
		overdue: tasks.iter().filter(|task| task.status != TaskStatus::Completed && task.due_date < now).count(),
	}
}

/// Every tag used by any task, once per tag id.
pub fn tag_options(tasks: &[Task]) -> Vec<&Tag> {
	let mut seen = std::collections::BTreeSet::new();
	tasks.iter()
		.flat_map(|task| &task.tags)
		.filter(|tag| seen.insert(tag.id.as_str()))
		.collect()
}

pub struct TaskDetail<'a, A: SkillApi + ?Sized> {
	api: &'a A,
	task_id: u64,
	pub task: LoadState<Task>,
	pub activities: LoadState<Vec<Activity>>,
	pub edit: EditState<TaskForm>,
}

impl<'a, A: SkillApi + ?Sized> TaskDetail<'a, A> {
	pub fn new(api: &'a A, task_id: u64) -> Self {
		Self {
			api,
			task_id,
			task: LoadState::Loading,
			activities: LoadState::Loading,
			edit: EditState::default(),
		}
	}

	pub async fn load(&mut self) {
		self.refresh_task().await;
		self.refresh_activities().await;
	}

	/// There is no single task endpoint, so the task is picked out of the full list.
	async fn refresh_task(&mut self) {
		let api = self.api;
		let task_id = self.task_id;
		self.task.fetch("タスク", async move {
			api.get_tasks()
				.await?
				.into_iter()
				.find(|task| task.id == task_id)
				.ok_or_else(|| Error::Local(format!("タスクが見つかりません: {}", task_id)))
		}).await;
		if let Some(task) = self.task.get() {
			self.edit = EditState::closed(TaskForm::from_task(task));
		}
	}

	async fn refresh_activities(&mut self) {
		let api = self.api;
		let task_id = self.task_id;
		self.activities.fetch("アクティビティ", async move {
			let page = api.get_activities(1, ALL_ACTIVITIES).await?;
			Ok(page.activities.into_iter().filter(|activity| activity.task_id == Some(task_id)).collect())
		}).await;
	}

	pub fn begin_edit(&mut self) {
		if let Some(task) = self.task.get() {
			self.edit = EditState {
				is_editing: true,
				form: TaskForm::from_task(task),
			};
		}
	}

	/// Send the edit form, record a `TASK_UPDATED` activity, and re-fetch.
	///
	/// The update itself is retried according to the client's task update policy.
	pub async fn save(&mut self) -> Result<(), Error> {
		let input = self.edit.form.to_input()?;

		self.api.update_task(self.task_id, &input).await
			.map_err(|e| {
				log::error!("Task update failed: {}", e);
				e
			})?;
		log::info!("Updated task {}", self.task_id);

		let activity = NewActivity {
			kind: "TASK_UPDATED".to_string(),
			title: format!("タスクを更新しました: {}", input.title),
			description: format!("タスク「{}」が更新されました", input.title),
			task_id: Some(self.task_id),
			employee_id: input.related_employee_id,
			metadata: serde_json::json!({
				"tags": input.tags,
				"assignedUserIds": input.assigned_user_ids,
			}),
		};
		if let Err(e) = self.api.create_activity(&activity).await {
			log::warn!("Failed to record activity for task {}: {}", self.task_id, e);
		}

		self.edit.is_editing = false;
		self.refresh_task().await;
		self.refresh_activities().await;
		Ok(())
	}
}
