use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::status::{EmployeeStatus, TaskPriority, TaskStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
	pub id: u64,
	#[serde(default)]
	pub employee_id: String,
	pub first_name: String,
	pub last_name: String,
	pub email: String,
	pub department: String,
	pub position: String,
	pub status: EmployeeStatus,
	pub hire_date: DateTime<Utc>,
	#[serde(default)]
	pub memo: Option<String>,
	#[serde(default)]
	pub skills: Vec<EmployeeSkillRef>,
	#[serde(default)]
	pub cases: Vec<Case>,
}

impl Employee {
	/// Family name first, the way names are shown everywhere.
	pub fn full_name(&self) -> String {
		format!("{} {}", self.last_name, self.first_name)
	}
}

/// A skill link as embedded in an employee record.
///
/// Only the id is guaranteed, the list endpoint usually embeds the skill itself as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSkillRef {
	pub id: u64,
	#[serde(default)]
	pub skill: Option<Skill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
	pub id: u64,
	pub name: String,
	pub category: String,
	#[serde(default)]
	pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSkill {
	pub id: u64,
	#[serde(default)]
	pub employee_id: Option<u64>,
	#[serde(default)]
	pub skill_id: Option<u64>,
	pub proficiency: u8,
	pub years_of_exp: Option<f64>,
	pub certified: bool,
	pub cert_details: Option<String>,
	pub last_used: Option<DateTime<Utc>>,
	pub skill: Skill,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
	pub id: u64,
	pub name: String,
	pub content: String,
	pub difficulty: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeAssignment {
	pub employee_id: u64,
	pub assignment_id: u64,
	pub start_date: DateTime<Utc>,
	pub end_date: Option<DateTime<Utc>>,
	pub is_completed: bool,
	#[serde(default)]
	pub assigned_at: Option<DateTime<Utc>>,
	#[serde(default)]
	pub assignment: Option<Assignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
	pub id: u64,
	pub company_name: String,
	pub description: String,
	pub start_date: DateTime<Utc>,
	pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	pub id: u64,
	pub name: String,
	pub email: String,
	#[serde(default)]
	pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
	Admin,
	User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignment {
	pub id: u64,
	pub task_id: u64,
	pub user_id: u64,
	pub assigned_at: DateTime<Utc>,
	pub user: User,
}

/// The short employee record embedded in tasks and activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
	pub id: u64,
	pub first_name: String,
	pub last_name: String,
	pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
	pub id: u64,
	pub title: String,
	pub description: String,
	pub status: TaskStatus,
	pub priority: TaskPriority,
	pub due_date: DateTime<Utc>,
	#[serde(default)]
	pub completed_at: Option<DateTime<Utc>>,
	#[serde(default)]
	pub is_send_mail: bool,
	#[serde(default)]
	pub related_employee_id: Option<u64>,
	#[serde(default)]
	pub related_employee: Option<EmployeeSummary>,
	#[serde(default)]
	pub assignments: Vec<TaskAssignment>,
	#[serde(default)]
	pub created_by: Option<User>,
	#[serde(default)]
	pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTask {
	pub id: u64,
	pub title: String,
	pub status: TaskStatus,
	pub priority: TaskPriority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
	pub id: u64,
	#[serde(rename = "type")]
	pub kind: String,
	pub title: String,
	pub description: String,
	#[serde(default)]
	pub metadata: serde_json::Value,
	pub created_at: DateTime<Utc>,
	pub user_id: u64,
	pub task_id: Option<u64>,
	pub employee_id: Option<u64>,
	#[serde(default)]
	pub user: Option<User>,
	#[serde(default)]
	pub task: Option<ActivityTask>,
	#[serde(default)]
	pub employee: Option<EmployeeSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
	pub total: u64,
	pub limit: u64,
	#[serde(default)]
	pub page: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
	pub id: u64,
	pub name: String,
	#[serde(default)]
	pub website: Option<String>,
	#[serde(default)]
	pub industry: Option<String>,
	#[serde(default)]
	pub size: Option<String>,
	#[serde(default)]
	pub address: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub created_at: Option<DateTime<Utc>>,
	#[serde(default)]
	pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
	pub id: u64,
	pub name: String,
	pub email: String,
	#[serde(default)]
	pub phone: Option<String>,
	#[serde(default)]
	pub position: Option<String>,
	#[serde(default)]
	pub department: Option<String>,
	#[serde(default)]
	pub notes: Option<String>,
	pub company: Company,
}

// Request bodies.

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
	/// Assigned by the server when left out.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub employee_id: Option<String>,
	pub first_name: String,
	pub last_name: String,
	pub email: String,
	pub department: String,
	pub position: String,
	pub status: EmployeeStatus,
	pub hire_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
	pub employee_id: String,
	pub first_name: String,
	pub last_name: String,
	pub email: String,
	pub department: String,
	pub position: String,
	pub status: EmployeeStatus,
	pub hire_date: NaiveDate,
	pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployeeSkill {
	pub employee_id: u64,
	pub skill_id: u64,
	pub proficiency: u8,
	pub years_of_exp: Option<f64>,
	pub certified: bool,
	pub cert_details: Option<String>,
	pub last_used: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSkillUpdate {
	pub proficiency: u8,
	pub years_of_exp: Option<f64>,
	pub certified: bool,
	pub cert_details: Option<String>,
	pub last_used: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeAssignmentLink {
	pub employee_id: u64,
	pub assignment_id: u64,
	pub start_date: NaiveDate,
	pub end_date: Option<NaiveDate>,
	pub is_completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeAssignmentKey {
	pub employee_id: u64,
	pub assignment_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseInput {
	pub employee_id: u64,
	pub company_name: String,
	pub description: String,
	pub start_date: NaiveDate,
	pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillInput {
	pub name: String,
	pub category: String,
	pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentInput {
	pub name: String,
	pub content: String,
	pub difficulty: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
	pub title: String,
	pub description: String,
	pub priority: TaskPriority,
	pub status: TaskStatus,
	pub due_date: DateTime<Utc>,
	pub related_employee_id: Option<u64>,
	pub assigned_user_ids: Vec<u64>,
	pub tags: Vec<String>,
	pub is_send_mail: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
	#[serde(rename = "type")]
	pub kind: String,
	pub title: String,
	pub description: String,
	pub task_id: Option<u64>,
	pub employee_id: Option<u64>,
	pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
	pub name: String,
	pub email: String,
	pub phone: String,
	pub position: String,
	pub department: String,
	pub notes: String,
	pub company_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credentials {
	pub email: String,
	pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignupRequest {
	pub name: String,
	pub email: String,
	pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
	pub token: String,
	pub user: User,
}
