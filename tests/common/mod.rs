#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use reqwest::StatusCode;

use skill_viewer::api_client::ActivityPage;
use skill_viewer::status::{EmployeeStatus, TaskPriority, TaskStatus};
use skill_viewer::types::*;
use skill_viewer::{Error, SkillApi};

/// In-memory stand-in for the server.
///
/// Every call is recorded by name.
/// Names added to `fail` answer with a 500 carrying a server message.
#[derive(Default)]
pub struct FakeApi {
	pub state: Mutex<State>,
	pub calls: Mutex<Vec<String>>,
	pub fail: Mutex<BTreeSet<String>>,
	/// Fail `get_employee_assignments` for these employees only.
	pub fail_assignments_of: Mutex<BTreeSet<u64>>,
}

#[derive(Default)]
pub struct State {
	pub employees: Vec<Employee>,
	pub employee_skills: Vec<EmployeeSkill>,
	pub skills: Vec<Skill>,
	pub assignments: Vec<Assignment>,
	pub links: Vec<EmployeeAssignment>,
	pub tasks: Vec<Task>,
	pub activities: Vec<Activity>,
	pub next_id: u64,
}

impl State {
	fn next_id(&mut self) -> u64 {
		self.next_id += 1;
		1000 + self.next_id
	}

	fn employee_mut(&mut self, id: u64) -> Result<&mut Employee, Error> {
		self.employees.iter_mut().find(|employee| employee.id == id).ok_or_else(|| not_found("employee"))
	}
}

pub const SERVER_MESSAGE: &str = "サーバーでエラーが発生しました";

fn not_found(what: &str) -> Error {
	Error::Http {
		context: format!("{} not found", what),
		status: StatusCode::NOT_FOUND,
		message: Some(format!("{}が見つかりません", what)),
	}
}

pub fn at(date: NaiveDate) -> DateTime<Utc> {
	date.and_hms_opt(0, 0, 0).unwrap().and_utc()
}

pub fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
	Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

impl FakeApi {
	pub fn new(state: State) -> Self {
		Self {
			state: Mutex::new(state),
			..Self::default()
		}
	}

	pub fn fail_on(&self, call: &str) {
		self.fail.lock().unwrap().insert(call.to_string());
	}

	pub fn recover(&self, call: &str) {
		self.fail.lock().unwrap().remove(call);
	}

	pub fn calls(&self) -> Vec<String> {
		self.calls.lock().unwrap().clone()
	}

	pub fn count(&self, call: &str) -> usize {
		self.calls.lock().unwrap().iter().filter(|name| *name == call).count()
	}

	pub fn clear_calls(&self) {
		self.calls.lock().unwrap().clear();
	}

	fn enter(&self, call: &str) -> Result<std::sync::MutexGuard<'_, State>, Error> {
		self.calls.lock().unwrap().push(call.to_string());
		if self.fail.lock().unwrap().contains(call) {
			return Err(Error::Http {
				context: format!("failed to {}", call),
				status: StatusCode::INTERNAL_SERVER_ERROR,
				message: Some(SERVER_MESSAGE.to_string()),
			});
		}
		Ok(self.state.lock().unwrap())
	}
}

#[async_trait::async_trait]
impl SkillApi for FakeApi {
	async fn get_employees(&self) -> Result<Vec<Employee>, Error> {
		Ok(self.enter("get_employees")?.employees.clone())
	}

	async fn get_employee(&self, id: u64) -> Result<Employee, Error> {
		let mut state = self.enter("get_employee")?;
		Ok(state.employee_mut(id)?.clone())
	}

	async fn create_employee(&self, new: &NewEmployee) -> Result<(), Error> {
		let mut state = self.enter("create_employee")?;
		let id = state.next_id();
		state.employees.push(Employee {
			id,
			employee_id: new.employee_id.clone().unwrap_or_else(|| format!("E{}", id)),
			first_name: new.first_name.clone(),
			last_name: new.last_name.clone(),
			email: new.email.clone(),
			department: new.department.clone(),
			position: new.position.clone(),
			status: new.status,
			hire_date: at(new.hire_date),
			memo: None,
			skills: Vec::new(),
			cases: Vec::new(),
		});
		Ok(())
	}

	async fn update_employee(&self, id: u64, update: &EmployeeUpdate) -> Result<(), Error> {
		let mut state = self.enter("update_employee")?;
		let employee = state.employee_mut(id)?;
		employee.employee_id = update.employee_id.clone();
		employee.first_name = update.first_name.clone();
		employee.last_name = update.last_name.clone();
		employee.email = update.email.clone();
		employee.department = update.department.clone();
		employee.position = update.position.clone();
		employee.status = update.status;
		employee.hire_date = at(update.hire_date);
		employee.memo = update.memo.clone();
		Ok(())
	}

	async fn delete_employee(&self, id: u64) -> Result<(), Error> {
		let mut state = self.enter("delete_employee")?;
		state.employees.retain(|employee| employee.id != id);
		Ok(())
	}

	async fn get_skills(&self) -> Result<Vec<Skill>, Error> {
		Ok(self.enter("get_skills")?.skills.clone())
	}

	async fn get_employee_skill(&self, id: u64) -> Result<EmployeeSkill, Error> {
		let state = self.enter("get_employee_skill")?;
		state.employee_skills.iter().find(|skill| skill.id == id).cloned().ok_or_else(|| not_found("employee skill"))
	}

	async fn create_employee_skill(&self, new: &NewEmployeeSkill) -> Result<(), Error> {
		let mut state = self.enter("create_employee_skill")?;
		let id = state.next_id();
		let skill = state.skills.iter().find(|skill| skill.id == new.skill_id).cloned().ok_or_else(|| not_found("skill"))?;
		state.employee_skills.push(EmployeeSkill {
			id,
			employee_id: Some(new.employee_id),
			skill_id: Some(new.skill_id),
			proficiency: new.proficiency,
			years_of_exp: new.years_of_exp,
			certified: new.certified,
			cert_details: new.cert_details.clone(),
			last_used: new.last_used.map(at),
			skill: skill.clone(),
		});
		state.employee_mut(new.employee_id)?.skills.push(EmployeeSkillRef { id, skill: Some(skill) });
		Ok(())
	}

	async fn update_employee_skill(&self, id: u64, update: &EmployeeSkillUpdate) -> Result<(), Error> {
		let mut state = self.enter("update_employee_skill")?;
		let skill = state.employee_skills.iter_mut().find(|skill| skill.id == id).ok_or_else(|| not_found("employee skill"))?;
		skill.proficiency = update.proficiency;
		skill.years_of_exp = update.years_of_exp;
		skill.certified = update.certified;
		skill.cert_details = update.cert_details.clone();
		skill.last_used = update.last_used.map(at);
		Ok(())
	}

	async fn delete_employee_skill(&self, id: u64) -> Result<(), Error> {
		let mut state = self.enter("delete_employee_skill")?;
		state.employee_skills.retain(|skill| skill.id != id);
		for employee in &mut state.employees {
			employee.skills.retain(|link| link.id != id);
		}
		Ok(())
	}

	async fn get_assignments(&self) -> Result<Vec<Assignment>, Error> {
		Ok(self.enter("get_assignments")?.assignments.clone())
	}

	async fn get_employee_assignments(&self, employee_id: u64) -> Result<Vec<EmployeeAssignment>, Error> {
		let state = self.enter("get_employee_assignments")?;
		if self.fail_assignments_of.lock().unwrap().contains(&employee_id) {
			return Err(Error::Http {
				context: "failed to get_employee_assignments".to_string(),
				status: StatusCode::BAD_GATEWAY,
				message: None,
			});
		}
		Ok(state.links.iter().filter(|link| link.employee_id == employee_id).cloned().collect())
	}

	async fn create_employee_assignment(&self, link: &EmployeeAssignmentLink) -> Result<(), Error> {
		let mut state = self.enter("create_employee_assignment")?;
		let assignment = state.assignments.iter().find(|assignment| assignment.id == link.assignment_id).cloned();
		state.links.push(EmployeeAssignment {
			employee_id: link.employee_id,
			assignment_id: link.assignment_id,
			start_date: at(link.start_date),
			end_date: link.end_date.map(at),
			is_completed: link.is_completed,
			assigned_at: None,
			assignment,
		});
		Ok(())
	}

	async fn update_employee_assignment(&self, link: &EmployeeAssignmentLink) -> Result<(), Error> {
		let mut state = self.enter("update_employee_assignment")?;
		let existing = state.links.iter_mut()
			.find(|existing| existing.employee_id == link.employee_id && existing.assignment_id == link.assignment_id)
			.ok_or_else(|| not_found("assignment link"))?;
		existing.start_date = at(link.start_date);
		existing.end_date = link.end_date.map(at);
		existing.is_completed = link.is_completed;
		Ok(())
	}

	async fn delete_employee_assignment(&self, key: &EmployeeAssignmentKey) -> Result<(), Error> {
		let mut state = self.enter("delete_employee_assignment")?;
		state.links.retain(|link| !(link.employee_id == key.employee_id && link.assignment_id == key.assignment_id));
		Ok(())
	}

	async fn create_case(&self, case: &CaseInput) -> Result<(), Error> {
		let mut state = self.enter("create_case")?;
		let id = state.next_id();
		state.employee_mut(case.employee_id)?.cases.push(Case {
			id,
			company_name: case.company_name.clone(),
			description: case.description.clone(),
			start_date: at(case.start_date),
			end_date: case.end_date.map(at),
		});
		Ok(())
	}

	async fn update_case(&self, id: u64, input: &CaseInput) -> Result<(), Error> {
		let mut state = self.enter("update_case")?;
		let case = state.employee_mut(input.employee_id)?
			.cases
			.iter_mut()
			.find(|case| case.id == id)
			.ok_or_else(|| not_found("case"))?;
		case.company_name = input.company_name.clone();
		case.description = input.description.clone();
		case.start_date = at(input.start_date);
		case.end_date = input.end_date.map(at);
		Ok(())
	}

	async fn delete_case(&self, id: u64) -> Result<(), Error> {
		let mut state = self.enter("delete_case")?;
		for employee in &mut state.employees {
			employee.cases.retain(|case| case.id != id);
		}
		Ok(())
	}

	async fn get_tasks(&self) -> Result<Vec<Task>, Error> {
		Ok(self.enter("get_tasks")?.tasks.clone())
	}

	async fn update_task(&self, id: u64, input: &TaskInput) -> Result<(), Error> {
		let mut state = self.enter("update_task")?;
		let task = state.tasks.iter_mut().find(|task| task.id == id).ok_or_else(|| not_found("task"))?;
		task.title = input.title.clone();
		task.description = input.description.clone();
		task.status = input.status;
		task.priority = input.priority;
		task.due_date = input.due_date;
		Ok(())
	}

	async fn create_activity(&self, activity: &NewActivity) -> Result<(), Error> {
		let mut state = self.enter("create_activity")?;
		let id = state.next_id();
		state.activities.push(Activity {
			id,
			kind: activity.kind.clone(),
			title: activity.title.clone(),
			description: activity.description.clone(),
			metadata: activity.metadata.clone(),
			created_at: Utc::now(),
			user_id: 1,
			task_id: activity.task_id,
			employee_id: activity.employee_id,
			user: None,
			task: None,
			employee: None,
		});
		Ok(())
	}

	async fn get_activities(&self, _page: u64, _page_size: u64) -> Result<ActivityPage, Error> {
		let state = self.enter("get_activities")?;
		Ok(ActivityPage {
			activities: state.activities.clone(),
			pagination: None,
		})
	}
}

pub fn skill(id: u64, name: &str, category: &str) -> Skill {
	Skill {
		id,
		name: name.to_string(),
		category: category.to_string(),
		description: None,
	}
}

pub fn assignment(id: u64, name: &str) -> Assignment {
	Assignment {
		id,
		name: name.to_string(),
		content: format!("{}の内容", name),
		difficulty: 3,
	}
}

pub fn employee(id: u64, last_name: &str, first_name: &str) -> Employee {
	Employee {
		id,
		employee_id: format!("E{:03}", id),
		first_name: first_name.to_string(),
		last_name: last_name.to_string(),
		email: format!("e{}@example.com", id),
		department: "開発部".to_string(),
		position: "エンジニア".to_string(),
		status: EmployeeStatus::Onsite,
		hire_date: day(2020, 4, 1),
		memo: None,
		skills: Vec::new(),
		cases: Vec::new(),
	}
}

pub fn link(employee_id: u64, assignment: &Assignment, start: DateTime<Utc>, is_completed: bool) -> EmployeeAssignment {
	EmployeeAssignment {
		employee_id,
		assignment_id: assignment.id,
		start_date: start,
		end_date: None,
		is_completed,
		assigned_at: None,
		assignment: Some(assignment.clone()),
	}
}

pub fn task(id: u64, title: &str) -> Task {
	Task {
		id,
		title: title.to_string(),
		description: "説明".to_string(),
		status: TaskStatus::Pending,
		priority: TaskPriority::High,
		due_date: day(2030, 1, 31),
		completed_at: None,
		is_send_mail: false,
		related_employee_id: Some(1),
		related_employee: None,
		assignments: Vec::new(),
		created_by: None,
		tags: vec![Tag { id: "t1".to_string(), name: "急ぎ".to_string(), color: "#f00".to_string() }],
	}
}

/// One employee (id 1) holding Rust and SQL, with Go still available,
/// linked to one of two assignments.
pub fn company() -> State {
	let rust = skill(1, "Rust", "言語");
	let sql = skill(2, "SQL", "データベース");
	let go = skill(3, "Go", "言語");
	let onboarding = assignment(1, "新人研修");
	let review = assignment(2, "コードレビュー");

	let mut yamada = employee(1, "山田", "太郎");
	yamada.skills = vec![
		EmployeeSkillRef { id: 11, skill: Some(rust.clone()) },
		EmployeeSkillRef { id: 12, skill: Some(sql.clone()) },
	];
	yamada.cases = vec![Case {
		id: 21,
		company_name: "株式会社サンプル".to_string(),
		description: "基幹システム刷新".to_string(),
		start_date: day(2022, 1, 1),
		end_date: Some(day(2023, 3, 31)),
	}];

	let employee_skill = |id, skill: &Skill, proficiency| EmployeeSkill {
		id,
		employee_id: Some(1),
		skill_id: Some(skill.id),
		proficiency,
		years_of_exp: Some(2.5),
		certified: false,
		cert_details: None,
		last_used: None,
		skill: skill.clone(),
	};

	State {
		employees: vec![yamada],
		employee_skills: vec![employee_skill(11, &rust, 4), employee_skill(12, &sql, 3)],
		skills: vec![rust, sql, go],
		links: vec![link(1, &onboarding, day(2020, 4, 1), true)],
		assignments: vec![onboarding, review],
		tasks: vec![task(5, "週報の提出")],
		activities: Vec::new(),
		next_id: 0,
	}
}
