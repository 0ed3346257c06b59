//! The employee list: in-memory search and sorting, and adding employees.
//!
//! The whole list is fetched once, searches never go to the server.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::api_client::SkillApi;
use crate::error::Error;
use crate::load_state::LoadState;
use crate::status::EmployeeStatus;
use crate::types::{Employee, NewEmployee};
use crate::validate;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
	pub employee_id: Option<String>,
	pub name: Option<String>,
	pub department: Option<String>,
	pub position: Option<String>,
	pub status: Option<EmployeeStatus>,
	pub skill_name: Option<String>,
	pub hire_date_from: Option<NaiveDate>,
	pub hire_date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortColumn {
	#[default]
	EmployeeId,
	Name,
	Department,
	Position,
	Status,
	HireDate,
	SkillCount,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
	#[default]
	Ascending,
	Descending,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
	pub column: SortColumn,
	pub direction: SortDirection,
}

impl SortState {
	/// A click on a column header.
	///
	/// The current column flips direction, any other column becomes current in ascending order.
	pub fn click(&mut self, column: SortColumn) {
		if self.column == column {
			self.direction = match self.direction {
				SortDirection::Ascending => SortDirection::Descending,
				SortDirection::Descending => SortDirection::Ascending,
			};
		} else {
			self.column = column;
			self.direction = SortDirection::Ascending;
		}
	}

	pub fn compare(&self, a: &Employee, b: &Employee) -> Ordering {
		let ordering = match self.column {
			SortColumn::EmployeeId => cmp_ignore_case(&a.employee_id, &b.employee_id),
			SortColumn::Name => cmp_ignore_case(&a.full_name(), &b.full_name()),
			SortColumn::Department => cmp_ignore_case(&a.department, &b.department),
			SortColumn::Position => cmp_ignore_case(&a.position, &b.position),
			SortColumn::Status => a.status.as_str().cmp(b.status.as_str()),
			SortColumn::HireDate => a.hire_date.cmp(&b.hire_date),
			SortColumn::SkillCount => a.skills.len().cmp(&b.skills.len()),
		};
		match self.direction {
			SortDirection::Ascending => ordering,
			SortDirection::Descending => ordering.reverse(),
		}
	}

	pub fn indicator(&self, column: SortColumn) -> &'static str {
		match (self.column == column, self.direction) {
			(false, _) => "",
			(true, SortDirection::Ascending) => "▲",
			(true, SortDirection::Descending) => "▼",
		}
	}
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
	a.to_lowercase().cmp(&b.to_lowercase())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
	haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Treat blank search fields as "not set".
fn non_blank(value: &Option<String>) -> Option<&str> {
	value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

impl SearchFilters {
	pub fn matches(&self, employee: &Employee) -> bool {
		if let Some(id) = non_blank(&self.employee_id) {
			if !contains_ignore_case(&employee.employee_id, id) {
				return false;
			}
		}

		if let Some(name) = non_blank(&self.name) {
			let matches = contains_ignore_case(&employee.first_name, name)
				|| contains_ignore_case(&employee.last_name, name)
				|| contains_ignore_case(&employee.full_name(), name);
			if !matches {
				return false;
			}
		}

		if let Some(department) = non_blank(&self.department) {
			if employee.department != department {
				return false;
			}
		}

		if let Some(position) = non_blank(&self.position) {
			if employee.position != position {
				return false;
			}
		}

		if let Some(status) = self.status {
			if employee.status != status {
				return false;
			}
		}

		if let Some(skill_name) = non_blank(&self.skill_name) {
			let has_skill = employee.skills.iter()
				.filter_map(|link| link.skill.as_ref())
				.any(|skill| contains_ignore_case(&skill.name, skill_name));
			if !has_skill {
				return false;
			}
		}

		let hire_date = employee.hire_date.date_naive();
		if self.hire_date_from.is_some_and(|from| hire_date < from) {
			return false;
		}
		if self.hire_date_to.is_some_and(|to| hire_date > to) {
			return false;
		}

		true
	}
}

/// Filter and sort, the view shown in the employee table.
pub fn search<'a>(employees: &'a [Employee], filters: &SearchFilters, sort: &SortState) -> Vec<&'a Employee> {
	let mut result: Vec<&Employee> = employees.iter()
		.filter(|employee| filters.matches(employee))
		.collect();
	result.sort_by(|a, b| sort.compare(a, b));
	result
}

/// Distinct values in order of first appearance, for the search form choices.
pub fn distinct<'a, T, F>(employees: &'a [Employee], mut key: F) -> Vec<T>
where
	F: FnMut(&'a Employee) -> T,
	T: PartialEq,
{
	let mut result = Vec::new();
	for employee in employees {
		let value = key(employee);
		if !result.contains(&value) {
			result.push(value);
		}
	}
	result
}

/// The fields of the "add employee" form, as typed by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployeeForm {
	/// Optional, the server assigns one when blank.
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
}

impl Default for NewEmployeeForm {
	fn default() -> Self {
		Self {
			employee_id: String::new(),
			first_name: String::new(),
			last_name: String::new(),
			email: String::new(),
			department: String::new(),
			position: String::new(),
			status_label: EmployeeStatus::Office.label().to_string(),
			hire_date: String::new(),
		}
	}
}

impl NewEmployeeForm {
	/// Check the form against the employees already known.
	///
	/// Every field but the employee number is required, and the email address must not be taken yet.
	pub fn to_new_employee(&self, existing: &[Employee]) -> Result<NewEmployee, Error> {
		validate::required(
			&[
				("firstName", self.first_name.as_str()),
				("lastName", self.last_name.as_str()),
				("email", self.email.as_str()),
				("department", self.department.as_str()),
				("position", self.position.as_str()),
				("status", self.status_label.as_str()),
				("hireDate", self.hire_date.as_str()),
			],
			"すべての項目を入力してください",
		)?;

		let email = self.email.trim();
		if existing.iter().any(|employee| employee.email.eq_ignore_ascii_case(email)) {
			return Err(Error::Validation("このメールアドレスはすでに登録されています".to_string()));
		}

		let status = EmployeeStatus::from_label(self.status_label.trim())
			.or_else(|| self.status_label.parse().ok())
			.ok_or_else(|| Error::Validation(format!("不明なステータスです: {}", self.status_label)))?;
		let employee_id = Some(self.employee_id.trim()).filter(|id| !id.is_empty()).map(String::from);

		Ok(NewEmployee {
			employee_id,
			first_name: self.first_name.trim().to_string(),
			last_name: self.last_name.trim().to_string(),
			email: email.to_string(),
			department: self.department.trim().to_string(),
			position: self.position.trim().to_string(),
			status,
			hire_date: validate::date(&self.hire_date)?,
		})
	}
}

/// The employee list screen.
pub struct EmployeeList<'a, A: SkillApi + ?Sized> {
	api: &'a A,
	pub employees: LoadState<Vec<Employee>>,
}

impl<'a, A: SkillApi + ?Sized> EmployeeList<'a, A> {
	pub fn new(api: &'a A) -> Self {
		Self {
			api,
			employees: LoadState::Loading,
		}
	}

	pub async fn load(&mut self) {
		self.employees.fetch("社員データ", self.api.get_employees()).await;
	}

	/// Add an employee and re-fetch the list.
	///
	/// The form is checked against the loaded list first, a rejected form sends nothing.
	pub async fn create(&mut self, form: &NewEmployeeForm) -> Result<(), Error> {
		let existing = self.employees.get().map(Vec::as_slice).unwrap_or_default();
		let employee = form.to_new_employee(existing)?;

		self.api.create_employee(&employee).await
			.map_err(|e| {
				log::error!("Failed to create employee: {}", e);
				e
			})?;
		log::info!("Created employee {} {} <{}>", employee.last_name, employee.first_name, employee.email);

		self.load().await;
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::types::{EmployeeSkillRef, Skill};
	use chrono::{TimeZone, Utc};

	fn employee(id: u64, employee_id: &str, last: &str, first: &str) -> Employee {
		Employee {
			id,
			employee_id: employee_id.into(),
			first_name: first.into(),
			last_name: last.into(),
			email: format!("{}@example.com", employee_id.to_lowercase()),
			department: "開発部".into(),
			position: "エンジニア".into(),
			status: EmployeeStatus::Office,
			hire_date: Utc.with_ymd_and_hms(2020, 4, 1, 0, 0, 0).unwrap(),
			memo: None,
			skills: Vec::new(),
			cases: Vec::new(),
		}
	}

	fn with_skills(mut employee: Employee, names: &[&str]) -> Employee {
		employee.skills = names.iter().enumerate().map(|(i, name)| EmployeeSkillRef {
			id: employee.id * 100 + i as u64,
			skill: Some(Skill { id: i as u64, name: name.to_string(), category: "言語".into(), description: None }),
		}).collect();
		employee
	}

	fn ids(employees: &[&Employee]) -> Vec<String> {
		employees.iter().map(|e| e.employee_id.clone()).collect()
	}

	#[test]
	fn sort_by_id_then_reverse() {
		let employees = vec![employee(1, "A", "a", "a"), employee(2, "C", "c", "c"), employee(3, "B", "b", "b")];
		let filters = SearchFilters::default();
		let mut sort = SortState::default();

		assert_eq!(ids(&search(&employees, &filters, &sort)), ["A", "B", "C"]);
		sort.click(SortColumn::EmployeeId);
		assert_eq!(sort.direction, SortDirection::Descending);
		assert_eq!(ids(&search(&employees, &filters, &sort)), ["C", "B", "A"]);
	}

	#[test]
	fn other_column_resets_to_ascending() {
		let mut sort = SortState::default();
		sort.click(SortColumn::EmployeeId);
		assert_eq!(sort.direction, SortDirection::Descending);
		sort.click(SortColumn::Department);
		assert_eq!(sort, SortState { column: SortColumn::Department, direction: SortDirection::Ascending });
		assert_eq!(sort.indicator(SortColumn::Department), "▲");
		assert_eq!(sort.indicator(SortColumn::EmployeeId), "");
	}

	#[test]
	fn string_sort_ignores_case() {
		let employees = vec![employee(1, "b-2", "x", "x"), employee(2, "A-1", "x", "x"), employee(3, "a-3", "x", "x")];
		let sorted = search(&employees, &SearchFilters::default(), &SortState::default());
		assert_eq!(ids(&sorted), ["A-1", "a-3", "b-2"]);
	}

	#[test]
	fn sort_by_skill_count_and_hire_date() {
		let mut late = with_skills(employee(1, "E1", "x", "x"), &["Rust", "Go"]);
		late.hire_date = Utc.with_ymd_and_hms(2023, 10, 1, 0, 0, 0).unwrap();
		let early = with_skills(employee(2, "E2", "y", "y"), &["Rust"]);
		let employees = vec![late, early];

		let mut sort = SortState { column: SortColumn::SkillCount, direction: SortDirection::Ascending };
		assert_eq!(ids(&search(&employees, &SearchFilters::default(), &sort)), ["E2", "E1"]);
		sort.click(SortColumn::HireDate);
		assert_eq!(ids(&search(&employees, &SearchFilters::default(), &sort)), ["E2", "E1"]);
		sort.click(SortColumn::HireDate);
		assert_eq!(ids(&search(&employees, &SearchFilters::default(), &sort)), ["E1", "E2"]);
	}

	#[test]
	fn filter_by_name_variants() {
		let employees = vec![employee(1, "E1", "山田", "太郎"), employee(2, "E2", "Smith", "John")];
		let mut filters = SearchFilters { name: Some("山田 太".into()), ..Default::default() };
		assert_eq!(ids(&search(&employees, &filters, &SortState::default())), ["E1"]);

		filters.name = Some("JOHN".into());
		assert_eq!(ids(&search(&employees, &filters, &SortState::default())), ["E2"]);

		filters.name = Some("   ".into());
		assert_eq!(search(&employees, &filters, &SortState::default()).len(), 2);
	}

	#[test]
	fn filter_by_employee_number_ignores_case() {
		let employees = vec![employee(1, "E1", "x", "x"), employee(2, "E2", "y", "y"), employee(3, "E10", "z", "z")];
		let filters = SearchFilters { employee_id: Some("e1".into()), ..Default::default() };
		assert_eq!(ids(&search(&employees, &filters, &SortState::default())), ["E1", "E10"]);
	}

	#[test]
	fn filter_exact_fields_and_skills() {
		let mut sales = with_skills(employee(1, "E1", "x", "x"), &["TypeScript"]);
		sales.department = "営業部".into();
		sales.status = EmployeeStatus::Onsite;
		let dev = with_skills(employee(2, "E2", "y", "y"), &["Rust"]);
		let employees = vec![sales, dev];

		let filters = SearchFilters { department: Some("営業".into()), ..Default::default() };
		assert!(search(&employees, &filters, &SortState::default()).is_empty());

		let filters = SearchFilters { department: Some("営業部".into()), status: Some(EmployeeStatus::Onsite), ..Default::default() };
		assert_eq!(ids(&search(&employees, &filters, &SortState::default())), ["E1"]);

		let filters = SearchFilters { skill_name: Some("rus".into()), ..Default::default() };
		assert_eq!(ids(&search(&employees, &filters, &SortState::default())), ["E2"]);
	}

	#[test]
	fn filter_hire_date_range_is_inclusive() {
		let employees = vec![employee(1, "E1", "x", "x")];
		let day = NaiveDate::from_ymd_opt(2020, 4, 1);

		let filters = SearchFilters { hire_date_from: day, hire_date_to: day, ..Default::default() };
		assert_eq!(search(&employees, &filters, &SortState::default()).len(), 1);

		let filters = SearchFilters { hire_date_from: NaiveDate::from_ymd_opt(2020, 4, 2), ..Default::default() };
		assert!(search(&employees, &filters, &SortState::default()).is_empty());

		let filters = SearchFilters { hire_date_to: NaiveDate::from_ymd_opt(2020, 3, 31), ..Default::default() };
		assert!(search(&employees, &filters, &SortState::default()).is_empty());
	}

	#[test]
	fn new_employee_form_translates_status_and_skips_blank_number() {
		let form = NewEmployeeForm {
			first_name: "花子".into(),
			last_name: "佐藤".into(),
			email: "sato@example.com".into(),
			department: "営業部".into(),
			position: "主任".into(),
			status_label: "研修中".into(),
			hire_date: "2024-04-01".into(),
			..Default::default()
		};
		let employee = form.to_new_employee(&[]).unwrap();
		assert_eq!(employee.status, EmployeeStatus::Training);

		let json = serde_json::to_value(&employee).unwrap();
		assert_eq!(json["status"], "TRAINING");
		assert_eq!(json["hireDate"], "2024-04-01");
		assert!(json.get("employeeId").is_none());
	}

	#[test]
	fn distinct_options_keep_first_order() {
		let mut a = employee(1, "E1", "x", "x");
		a.department = "営業部".into();
		let b = employee(2, "E2", "y", "y");
		let mut c = employee(3, "E3", "z", "z");
		c.department = "営業部".into();
		let employees = vec![a, b, c];
		assert_eq!(distinct(&employees, |e| e.department.as_str()), ["営業部", "開発部"]);
		assert_eq!(distinct(&employees, |e| e.status), [EmployeeStatus::Office]);
	}
}
