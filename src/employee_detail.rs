//! The employee detail view: one employee put together from several resources.
//!
//! The profile, the skill links, the assignment links and the case history are
//! fetched independently and edited independently.
//! A save only touches its own endpoint and re-fetches only its own list.
//! Nothing is rolled back when a neighbouring save fails.

use std::collections::BTreeSet;

use futures::future::try_join_all;

use crate::api_client::SkillApi;
use crate::error::Error;
use crate::load_state::LoadState;
use crate::status::EmployeeStatus;
use crate::types::{
	Assignment,
	Case,
	CaseInput,
	Employee,
	EmployeeAssignment,
	EmployeeAssignmentKey,
	EmployeeAssignmentLink,
	EmployeeSkill,
	EmployeeSkillUpdate,
	EmployeeUpdate,
	NewEmployeeSkill,
	Skill,
};
use crate::validate;

/// Fetch the skill links listed on an employee, one request per link, all at once.
///
/// The first failing request fails the whole batch.
pub async fn fetch_employee_skills<A: SkillApi + ?Sized>(api: &A, employee: &Employee) -> Result<Vec<EmployeeSkill>, Error> {
	let requests = employee.skills.iter().map(|link| api.get_employee_skill(link.id));
	try_join_all(requests).await
}

/// A form and whether it is open.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditState<F> {
	pub is_editing: bool,
	pub form: F,
}

impl<F> EditState<F> {
	pub fn closed(form: F) -> Self {
		Self { is_editing: false, form }
	}
}

/// The editable profile fields, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
	pub employee_id: String,
	pub first_name: String,
	pub last_name: String,
	pub email: String,
	pub department: String,
	pub position: String,
	/// The Japanese display label, translated to the API value on submit.
	pub status_label: String,
	/// `yyyy-mm-dd`
	pub hire_date: String,
	pub memo: String,
}

impl ProfileForm {
	pub fn from_employee(employee: &Employee) -> Self {
		Self {
			employee_id: employee.employee_id.clone(),
			first_name: employee.first_name.clone(),
			last_name: employee.last_name.clone(),
			email: employee.email.clone(),
			department: employee.department.clone(),
			position: employee.position.clone(),
			status_label: employee.status.label().to_string(),
			hire_date: employee.hire_date.date_naive().format("%Y-%m-%d").to_string(),
			memo: employee.memo.clone().unwrap_or_default(),
		}
	}

	pub fn to_update(&self) -> Result<EmployeeUpdate, Error> {
		validate::required(
			&[("firstName", self.first_name.as_str()), ("lastName", self.last_name.as_str()), ("email", self.email.as_str())],
			"氏名とメールアドレスは必須です",
		)?;
		let status = EmployeeStatus::from_label(self.status_label.trim())
			.or_else(|| self.status_label.parse().ok())
			.ok_or_else(|| Error::Validation(format!("不明なステータスです: {}", self.status_label)))?;
		let memo = Some(self.memo.trim()).filter(|memo| !memo.is_empty()).map(String::from);

		Ok(EmployeeUpdate {
			employee_id: self.employee_id.trim().to_string(),
			first_name: self.first_name.trim().to_string(),
			last_name: self.last_name.trim().to_string(),
			email: self.email.trim().to_string(),
			department: self.department.trim().to_string(),
			position: self.position.trim().to_string(),
			status,
			hire_date: validate::date(&self.hire_date)?,
			memo,
		})
	}
}

/// The fields of a skill link form.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillForm {
	/// Only used when adding, an existing link keeps its skill.
	pub skill_id: Option<u64>,
	pub proficiency: u8,
	pub years_of_exp: String,
	pub certified: bool,
	pub cert_details: String,
	/// `yyyy-mm-dd` or empty.
	pub last_used: String,
}

impl Default for SkillForm {
	fn default() -> Self {
		Self {
			skill_id: None,
			proficiency: 1,
			years_of_exp: String::new(),
			certified: false,
			cert_details: String::new(),
			last_used: String::new(),
		}
	}
}

impl SkillForm {
	pub fn from_employee_skill(skill: &EmployeeSkill) -> Self {
		Self {
			skill_id: Some(skill.skill.id),
			proficiency: skill.proficiency,
			years_of_exp: skill.years_of_exp.map(|years| years.to_string()).unwrap_or_default(),
			certified: skill.certified,
			cert_details: skill.cert_details.clone().unwrap_or_default(),
			last_used: skill.last_used.map(|date| date.date_naive().format("%Y-%m-%d").to_string()).unwrap_or_default(),
		}
	}

	pub fn to_update(&self) -> Result<EmployeeSkillUpdate, Error> {
		Ok(EmployeeSkillUpdate {
			proficiency: validate::proficiency(self.proficiency)?,
			years_of_exp: validate::years_of_experience(&self.years_of_exp)?,
			certified: self.certified,
			cert_details: Some(self.cert_details.trim()).filter(|details| !details.is_empty()).map(String::from),
			last_used: validate::optional_date(&self.last_used)?,
		})
	}
}

/// The fields of an assignment link form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentForm {
	pub assignment_id: u64,
	/// `yyyy-mm-dd`
	pub start_date: String,
	/// `yyyy-mm-dd` or empty while ongoing.
	pub end_date: String,
	pub is_completed: bool,
}

impl AssignmentForm {
	pub fn from_link(link: &EmployeeAssignment) -> Self {
		Self {
			assignment_id: link.assignment_id,
			start_date: link.start_date.date_naive().format("%Y-%m-%d").to_string(),
			end_date: link.end_date.map(|date| date.date_naive().format("%Y-%m-%d").to_string()).unwrap_or_default(),
			is_completed: link.is_completed,
		}
	}

	fn to_link(&self, employee_id: u64) -> Result<EmployeeAssignmentLink, Error> {
		let start_date = validate::date(&self.start_date)?;
		let end_date = validate::optional_date(&self.end_date)?;
		if end_date.is_some_and(|end| end < start_date) {
			return Err(Error::Validation("終了日は開始日以降にしてください".to_string()));
		}
		Ok(EmployeeAssignmentLink {
			employee_id,
			assignment_id: self.assignment_id,
			start_date,
			end_date,
			is_completed: self.is_completed,
		})
	}
}

/// A case history entry form, without id for a new case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseForm {
	pub id: Option<u64>,
	pub company_name: String,
	pub description: String,
	pub start_date: String,
	pub end_date: String,
}

impl CaseForm {
	pub fn from_case(case: &Case) -> Self {
		Self {
			id: Some(case.id),
			company_name: case.company_name.clone(),
			description: case.description.clone(),
			start_date: case.start_date.date_naive().format("%Y-%m-%d").to_string(),
			end_date: case.end_date.map(|date| date.date_naive().format("%Y-%m-%d").to_string()).unwrap_or_default(),
		}
	}

	fn to_input(&self, employee_id: u64) -> Result<CaseInput, Error> {
		validate::required(&[("companyName", self.company_name.as_str())], "会社名は必須です")?;
		Ok(CaseInput {
			employee_id,
			company_name: self.company_name.trim().to_string(),
			description: self.description.trim().to_string(),
			start_date: validate::date(&self.start_date)?,
			end_date: validate::optional_date(&self.end_date)?,
		})
	}
}

pub struct EmployeeDetail<'a, A: SkillApi + ?Sized> {
	api: &'a A,
	employee_id: u64,
	pub employee: LoadState<Employee>,
	pub profile: EditState<ProfileForm>,
	pub skills: LoadState<Vec<EmployeeSkill>>,
	/// The skill link being edited and its form.
	pub skill_edit: Option<(u64, SkillForm)>,
	pub assignments: LoadState<Vec<EmployeeAssignment>>,
	/// The assignment link being edited, keyed by assignment id.
	pub assignment_edit: Option<AssignmentForm>,
	pub cases: LoadState<Vec<Case>>,
	pub skill_catalog: LoadState<Vec<Skill>>,
	pub assignment_catalog: LoadState<Vec<Assignment>>,
	/// The message of the last failed action, cleared by the next attempt.
	pub form_error: Option<String>,
}

impl<'a, A: SkillApi + ?Sized> EmployeeDetail<'a, A> {
	pub fn new(api: &'a A, employee_id: u64) -> Self {
		Self {
			api,
			employee_id,
			employee: LoadState::Loading,
			profile: EditState::default(),
			skills: LoadState::Loading,
			skill_edit: None,
			assignments: LoadState::Loading,
			assignment_edit: None,
			cases: LoadState::Loading,
			skill_catalog: LoadState::Loading,
			assignment_catalog: LoadState::Loading,
			form_error: None,
		}
	}

	/// The employee as last confirmed by the server.
	pub fn current_employee(&self) -> Option<&Employee> {
		self.employee.get()
	}

	/// Fetch everything the view shows.
	pub async fn load(&mut self) {
		self.employee.fetch("社員データ", self.api.get_employee(self.employee_id)).await;

		match self.employee.get() {
			Some(employee) => {
				self.profile = EditState::closed(ProfileForm::from_employee(employee));
				self.cases = LoadState::Loaded(employee.cases.clone());
				let employee = employee.clone();
				self.skills.fetch("スキル", fetch_employee_skills(self.api, &employee)).await;
			},
			None => {
				let message = self.employee.error().unwrap_or_default().to_string();
				self.skills = LoadState::Failed(message.clone());
				self.cases = LoadState::Failed(message);
			},
		}

		self.assignments.fetch("課題の割り当て", self.api.get_employee_assignments(self.employee_id)).await;
		self.skill_catalog.fetch("スキル一覧", self.api.get_skills()).await;
		self.assignment_catalog.fetch("課題一覧", self.api.get_assignments()).await;
	}

	/// Skills that can still be added: the catalog minus the skills the employee already has.
	pub fn available_skills(&self) -> Vec<&Skill> {
		let owned: BTreeSet<u64> = self.skills.get()
			.map(|skills| skills.iter().map(|link| link.skill.id).collect())
			.unwrap_or_default();
		self.skill_catalog.get()
			.map(|catalog| catalog.iter().filter(|skill| !owned.contains(&skill.id)).collect())
			.unwrap_or_default()
	}

	/// Assignments that can still be linked: the catalog minus the assignments already linked.
	pub fn available_assignments(&self) -> Vec<&Assignment> {
		let linked: BTreeSet<u64> = self.assignments.get()
			.map(|links| links.iter().map(|link| link.assignment_id).collect())
			.unwrap_or_default();
		self.assignment_catalog.get()
			.map(|catalog| catalog.iter().filter(|assignment| !linked.contains(&assignment.id)).collect())
			.unwrap_or_default()
	}

	/// Assignment links, most recent start first.
	pub fn assignment_history(&self) -> Vec<&EmployeeAssignment> {
		let mut links: Vec<&EmployeeAssignment> = self.assignments.get()
			.map(|links| links.iter().collect())
			.unwrap_or_default();
		links.sort_by(|a, b| b.start_date.cmp(&a.start_date));
		links
	}

	fn surface(&mut self, error: Error, fallback: &str) -> Error {
		log::error!("{}", error);
		self.form_error = Some(error.user_message(fallback));
		error
	}

	async fn refresh_employee(&mut self) {
		self.employee.fetch("社員データ", self.api.get_employee(self.employee_id)).await;
	}

	/// Re-fetch the skill links.
	///
	/// The link ids live on the employee record, so that is fetched too,
	/// but only to learn the ids: the displayed profile is left alone.
	async fn refresh_skills(&mut self) {
		let api = self.api;
		let employee_id = self.employee_id;
		self.skills.fetch("スキル", async move {
			let employee = api.get_employee(employee_id).await?;
			fetch_employee_skills(api, &employee).await
		}).await;
	}

	async fn refresh_assignments(&mut self) {
		self.assignments.fetch("課題の割り当て", self.api.get_employee_assignments(self.employee_id)).await;
	}

	async fn refresh_cases(&mut self) {
		let api = self.api;
		let employee_id = self.employee_id;
		self.cases.fetch("案件", async move {
			Ok(api.get_employee(employee_id).await?.cases)
		}).await;
	}

	pub fn begin_profile_edit(&mut self) {
		if let Some(employee) = self.employee.get() {
			self.profile = EditState {
				is_editing: true,
				form: ProfileForm::from_employee(employee),
			};
		}
	}

	pub fn cancel_profile_edit(&mut self) {
		if let Some(employee) = self.employee.get() {
			self.profile = EditState::closed(ProfileForm::from_employee(employee));
		} else {
			self.profile.is_editing = false;
		}
	}

	/// Send the profile form.
	///
	/// On failure the form stays open and the displayed employee is unchanged.
	pub async fn save_profile(&mut self) -> Result<(), Error> {
		self.form_error = None;
		let update = match self.profile.form.to_update() {
			Ok(update) => update,
			Err(e) => return Err(self.surface(e, "入力内容を確認してください")),
		};

		if let Err(e) = self.api.update_employee(self.employee_id, &update).await {
			return Err(self.surface(e, "社員情報の更新中にエラーが発生しました。"));
		}
		log::info!("Updated employee {}", self.employee_id);

		self.refresh_employee().await;
		self.cancel_profile_edit();
		Ok(())
	}

	pub async fn delete_employee(&mut self) -> Result<(), Error> {
		self.form_error = None;
		if let Err(e) = self.api.delete_employee(self.employee_id).await {
			return Err(self.surface(e, "社員の削除中にエラーが発生しました。"));
		}
		log::info!("Deleted employee {}", self.employee_id);
		Ok(())
	}

	pub async fn add_skill(&mut self, form: &SkillForm) -> Result<(), Error> {
		self.form_error = None;
		let skill = match self.new_employee_skill(form) {
			Ok(skill) => skill,
			Err(e) => return Err(self.surface(e, "入力内容を確認してください")),
		};

		if let Err(e) = self.api.create_employee_skill(&skill).await {
			return Err(self.surface(e, "スキルの追加中にエラーが発生しました。"));
		}
		log::info!("Added skill {} to employee {}", skill.skill_id, self.employee_id);

		self.refresh_skills().await;
		Ok(())
	}

	fn new_employee_skill(&self, form: &SkillForm) -> Result<NewEmployeeSkill, Error> {
		let skill_id = form.skill_id
			.ok_or_else(|| Error::Validation("スキルを選択してください".to_string()))?;
		if !self.available_skills().iter().any(|skill| skill.id == skill_id) {
			return Err(Error::Validation("このスキルは追加できません".to_string()));
		}
		let update = form.to_update()?;
		Ok(NewEmployeeSkill {
			employee_id: self.employee_id,
			skill_id,
			proficiency: update.proficiency,
			years_of_exp: update.years_of_exp,
			certified: update.certified,
			cert_details: update.cert_details,
			last_used: update.last_used,
		})
	}

	pub fn begin_skill_edit(&mut self, employee_skill_id: u64) -> bool {
		let form = self.skills.get()
			.and_then(|skills| skills.iter().find(|skill| skill.id == employee_skill_id))
			.map(SkillForm::from_employee_skill);
		match form {
			Some(form) => {
				self.skill_edit = Some((employee_skill_id, form));
				true
			},
			None => false,
		}
	}

	pub fn cancel_skill_edit(&mut self) {
		self.skill_edit = None;
	}

	pub async fn save_skill_edit(&mut self) -> Result<(), Error> {
		self.form_error = None;
		let (id, update) = match &self.skill_edit {
			None => return Ok(()),
			Some((id, form)) => (*id, form.to_update()),
		};
		let update = match update {
			Ok(update) => update,
			Err(e) => return Err(self.surface(e, "入力内容を確認してください")),
		};

		if let Err(e) = self.api.update_employee_skill(id, &update).await {
			return Err(self.surface(e, "スキルの更新中にエラーが発生しました。"));
		}
		log::info!("Updated employee skill {}", id);

		self.skill_edit = None;
		self.refresh_skills().await;
		Ok(())
	}

	pub async fn remove_skill(&mut self, employee_skill_id: u64) -> Result<(), Error> {
		self.form_error = None;
		if let Err(e) = self.api.delete_employee_skill(employee_skill_id).await {
			return Err(self.surface(e, "スキルの削除中にエラーが発生しました。"));
		}
		log::info!("Removed employee skill {}", employee_skill_id);

		if self.skill_edit.as_ref().is_some_and(|(id, _)| *id == employee_skill_id) {
			self.skill_edit = None;
		}
		self.refresh_skills().await;
		Ok(())
	}

	pub async fn assign(&mut self, form: &AssignmentForm) -> Result<(), Error> {
		self.form_error = None;
		let link = if self.available_assignments().iter().any(|assignment| assignment.id == form.assignment_id) {
			form.to_link(self.employee_id)
		} else {
			Err(Error::Validation("この課題は割り当てできません".to_string()))
		};
		let link = match link {
			Ok(link) => link,
			Err(e) => return Err(self.surface(e, "入力内容を確認してください")),
		};

		if let Err(e) = self.api.create_employee_assignment(&link).await {
			return Err(self.surface(e, "課題の割り当て中にエラーが発生しました。"));
		}
		log::info!("Assigned assignment {} to employee {}", link.assignment_id, self.employee_id);

		self.refresh_assignments().await;
		Ok(())
	}

	pub fn begin_assignment_edit(&mut self, assignment_id: u64) -> bool {
		let form = self.assignments.get()
			.and_then(|links| links.iter().find(|link| link.assignment_id == assignment_id))
			.map(AssignmentForm::from_link);
		let found = form.is_some();
		self.assignment_edit = form;
		found
	}

	pub fn cancel_assignment_edit(&mut self) {
		self.assignment_edit = None;
	}

	pub async fn save_assignment_edit(&mut self) -> Result<(), Error> {
		self.form_error = None;
		let link = match &self.assignment_edit {
			None => return Ok(()),
			Some(form) => form.to_link(self.employee_id),
		};
		let link = match link {
			Ok(link) => link,
			Err(e) => return Err(self.surface(e, "入力内容を確認してください")),
		};

		if let Err(e) = self.api.update_employee_assignment(&link).await {
			return Err(self.surface(e, "課題割り当ての更新中にエラーが発生しました。"));
		}
		log::info!("Updated assignment {} of employee {}", link.assignment_id, self.employee_id);

		self.assignment_edit = None;
		self.refresh_assignments().await;
		Ok(())
	}

	pub async fn unassign(&mut self, assignment_id: u64) -> Result<(), Error> {
		self.form_error = None;
		let key = EmployeeAssignmentKey {
			employee_id: self.employee_id,
			assignment_id,
		};
		if let Err(e) = self.api.delete_employee_assignment(&key).await {
			return Err(self.surface(e, "課題の割り当て解除中にエラーが発生しました。"));
		}
		log::info!("Unassigned assignment {} from employee {}", assignment_id, self.employee_id);

		if self.assignment_edit.as_ref().is_some_and(|form| form.assignment_id == assignment_id) {
			self.assignment_edit = None;
		}
		self.refresh_assignments().await;
		Ok(())
	}

	/// Create the case when the form has no id, update it otherwise.
	pub async fn save_case(&mut self, form: &CaseForm) -> Result<(), Error> {
		self.form_error = None;
		let fallback = match form.id {
			None => "案件の追加中にエラーが発生しました。",
			Some(_) => "案件の更新中にエラーが発生しました。",
		};
		let input = match form.to_input(self.employee_id) {
			Ok(input) => input,
			Err(e) => return Err(self.surface(e, fallback)),
		};

		let result = match form.id {
			None => self.api.create_case(&input).await,
			Some(id) => self.api.update_case(id, &input).await,
		};
		if let Err(e) = result {
			return Err(self.surface(e, fallback));
		}

		self.refresh_cases().await;
		Ok(())
	}

	pub async fn delete_case(&mut self, case_id: u64) -> Result<(), Error> {
		self.form_error = None;
		if let Err(e) = self.api.delete_case(case_id).await {
			return Err(self.surface(e, "案件の削除中にエラーが発生しました。"));
		}
		self.refresh_cases().await;
		Ok(())
	}
}
