mod common;

use assert_matches::assert_matches;

use common::{company, FakeApi};
use skill_viewer::employee_list::{EmployeeList, NewEmployeeForm};
use skill_viewer::status::EmployeeStatus;
use skill_viewer::Error;

fn form(email: &str) -> NewEmployeeForm {
	NewEmployeeForm {
		first_name: "花子".into(),
		last_name: "佐藤".into(),
		email: email.into(),
		department: "営業部".into(),
		position: "主任".into(),
		status_label: "現場".into(),
		hire_date: "2024-04-01".into(),
		..NewEmployeeForm::default()
	}
}

async fn loaded(api: &FakeApi) -> EmployeeList<'_, FakeApi> {
	let mut list = EmployeeList::new(api);
	list.load().await;
	api.clear_calls();
	list
}

#[tokio::test]
async fn create_employee_and_refresh_list() {
	let api = FakeApi::new(company());
	let mut list = loaded(&api).await;

	list.create(&form("sato@example.com")).await.unwrap();

	let employees = list.employees.get().unwrap();
	assert_eq!(employees.len(), 2);
	assert_eq!(employees[1].full_name(), "佐藤 花子");
	assert_eq!(employees[1].status, EmployeeStatus::Onsite);
	assert_eq!(api.calls(), ["create_employee", "get_employees"]);
}

#[tokio::test]
async fn missing_field_is_rejected_without_a_request() {
	let api = FakeApi::new(company());
	let mut list = loaded(&api).await;

	let form = NewEmployeeForm { department: " ".into(), ..form("sato@example.com") };
	let error = list.create(&form).await.unwrap_err();
	assert_eq!(error.user_message(""), "すべての項目を入力してください");
	assert!(api.calls().is_empty());
}

#[tokio::test]
async fn duplicate_email_is_rejected_without_a_request() {
	let api = FakeApi::new(company());
	let mut list = loaded(&api).await;

	let error = list.create(&form("E1@example.com")).await.unwrap_err();
	assert_eq!(error.user_message(""), "このメールアドレスはすでに登録されています");
	assert!(api.calls().is_empty());
	assert_eq!(list.employees.get().unwrap().len(), 1);
}

#[tokio::test]
async fn failed_create_keeps_the_list() {
	let api = FakeApi::new(company());
	let mut list = loaded(&api).await;

	api.fail_on("create_employee");
	assert_matches!(list.create(&form("sato@example.com")).await, Err(Error::Http { .. }));
	assert_eq!(list.employees.get().unwrap().len(), 1);
	assert_eq!(api.count("get_employees"), 0);
}
