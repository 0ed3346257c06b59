use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

use skill_viewer::activities;
use skill_viewer::assignment_detail;
use skill_viewer::config::Config;
use skill_viewer::employee_detail::{AssignmentForm, CaseForm, EmployeeDetail, SkillForm};
use skill_viewer::employee_list::{self, EmployeeList, NewEmployeeForm, SearchFilters, SortColumn, SortState};
use skill_viewer::session::SessionStore;
use skill_viewer::status::{self, EmployeeStatus, TaskPriority, TaskStatus};
use skill_viewer::tasks::{self, TaskDetail, TaskForm};
use skill_viewer::types;
use skill_viewer::validate;
use skill_viewer::{ApiClient, Error, SkillApi};

#[derive(Parser)]
#[command(about = "Manage employees, skills, assignments and tasks of the skill viewer")]
struct Options {
	/// Configuration file.
	#[arg(short, long, value_name = "FILE")]
	config: Option<PathBuf>,

	/// Override the API root from the configuration file.
	#[arg(long, value_name = "URL")]
	api_root: Option<String>,

	/// Log more, repeat for even more.
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbose: u8,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Sign in and store the session.
	Login {
		#[arg(long)]
		email: String,
		#[arg(long)]
		password: String,
	},
	/// Register a new account.
	Signup {
		#[arg(long)]
		name: String,
		#[arg(long)]
		email: String,
		#[arg(long)]
		password: String,
	},
	/// Forget the stored session.
	Logout,
	/// Search, sort or add employees.
	Employees {
		#[command(subcommand)]
		action: Option<EmployeesAction>,
	},
	/// Show or edit one employee.
	Employee {
		id: u64,
		#[command(subcommand)]
		action: Option<EmployeeAction>,
	},
	/// The skill catalog.
	Skills {
		#[command(subcommand)]
		action: Option<SkillAction>,
	},
	/// The assignment catalog.
	Assignments {
		#[command(subcommand)]
		action: Option<AssignmentAction>,
	},
	Tasks {
		#[command(subcommand)]
		action: Option<TaskAction>,
	},
	/// The activity log.
	Activities {
		#[arg(long, default_value_t = 1)]
		page: u64,
		#[arg(long, default_value_t = 20)]
		page_size: u64,
		/// Show statistics instead of a page.
		#[arg(long)]
		stats: bool,
	},
	Companies,
	Customers {
		#[command(subcommand)]
		action: Option<CustomerAction>,
	},
	Users,
}

#[derive(Subcommand)]
enum EmployeesAction {
	/// Search and sort the employee list.
	List(EmployeeSearch),
	/// Add an employee.
	Create(NewEmployeeArgs),
}

#[derive(Args)]
struct NewEmployeeArgs {
	/// Left to the server when not given.
	#[arg(long)]
	employee_number: Option<String>,
	#[arg(long)]
	first_name: String,
	#[arg(long)]
	last_name: String,
	#[arg(long)]
	email: String,
	#[arg(long)]
	department: String,
	#[arg(long)]
	position: String,
	/// Status label (現場, 内勤, 研修中, 現場探し中).
	#[arg(long, default_value = "内勤")]
	status: String,
	/// Defaults to today.
	#[arg(long, value_name = "YYYY-MM-DD")]
	hire_date: Option<String>,
}

#[derive(Args, Default)]
struct EmployeeSearch {
	/// Part of the employee number.
	#[arg(long)]
	id: Option<String>,
	/// Part of the first, last or full name.
	#[arg(long)]
	name: Option<String>,
	#[arg(long)]
	department: Option<String>,
	#[arg(long)]
	position: Option<String>,
	/// Status value or label.
	#[arg(long)]
	status: Option<EmployeeStatus>,
	/// Part of a skill name.
	#[arg(long)]
	skill: Option<String>,
	#[arg(long, value_name = "YYYY-MM-DD")]
	hired_from: Option<NaiveDate>,
	#[arg(long, value_name = "YYYY-MM-DD")]
	hired_to: Option<NaiveDate>,
	/// Column header clicks, in order. Clicking a column twice sorts it descending.
	#[arg(long = "sort", value_enum)]
	sort: Vec<SortColumn>,
}

#[derive(Args)]
struct ProfileArgs {
	#[arg(long)]
	employee_number: Option<String>,
	#[arg(long)]
	first_name: Option<String>,
	#[arg(long)]
	last_name: Option<String>,
	#[arg(long)]
	email: Option<String>,
	#[arg(long)]
	department: Option<String>,
	#[arg(long)]
	position: Option<String>,
	/// Status label (現場, 内勤, 研修中, 現場探し中).
	#[arg(long)]
	status: Option<String>,
	#[arg(long, value_name = "YYYY-MM-DD")]
	hire_date: Option<String>,
	#[arg(long)]
	memo: Option<String>,
}

#[derive(Args)]
struct SkillLinkArgs {
	#[arg(long)]
	proficiency: Option<u8>,
	/// Years of experience, in steps of 0.1.
	#[arg(long)]
	years: Option<String>,
	#[arg(long)]
	certified: Option<bool>,
	#[arg(long)]
	cert_details: Option<String>,
	#[arg(long, value_name = "YYYY-MM-DD")]
	last_used: Option<String>,
}

#[derive(Args)]
struct LinkDates {
	#[arg(long, value_name = "YYYY-MM-DD")]
	start: Option<String>,
	#[arg(long, value_name = "YYYY-MM-DD")]
	end: Option<String>,
	#[arg(long)]
	completed: Option<bool>,
}

#[derive(Args)]
struct CaseArgs {
	#[arg(long)]
	company: String,
	#[arg(long, default_value = "")]
	description: String,
	#[arg(long, value_name = "YYYY-MM-DD")]
	start: String,
	#[arg(long, value_name = "YYYY-MM-DD", default_value = "")]
	end: String,
}

#[derive(Subcommand)]
enum EmployeeAction {
	Show,
	Update(ProfileArgs),
	Delete,
	AddSkill {
		#[arg(long)]
		skill_id: u64,
		#[command(flatten)]
		fields: SkillLinkArgs,
	},
	EditSkill {
		employee_skill_id: u64,
		#[command(flatten)]
		fields: SkillLinkArgs,
	},
	RemoveSkill {
		employee_skill_id: u64,
	},
	Assign {
		#[arg(long)]
		assignment_id: u64,
		#[command(flatten)]
		dates: LinkDates,
	},
	EditAssignment {
		assignment_id: u64,
		#[command(flatten)]
		dates: LinkDates,
	},
	Unassign {
		assignment_id: u64,
	},
	AddCase(CaseArgs),
	EditCase {
		case_id: u64,
		#[command(flatten)]
		fields: CaseArgs,
	},
	DeleteCase {
		case_id: u64,
	},
}

#[derive(Args)]
struct SkillArgs {
	#[arg(long)]
	name: String,
	#[arg(long)]
	category: String,
	#[arg(long, default_value = "")]
	description: String,
}

#[derive(Subcommand)]
enum SkillAction {
	List,
	Create(SkillArgs),
	Update {
		id: u64,
		#[command(flatten)]
		fields: SkillArgs,
	},
	Delete {
		id: u64,
	},
}

#[derive(Args)]
struct AssignmentArgs {
	#[arg(long)]
	name: String,
	#[arg(long)]
	content: String,
	/// 1 to 5.
	#[arg(long)]
	difficulty: String,
}

#[derive(Subcommand)]
enum AssignmentAction {
	List,
	/// Show an assignment and who is working on it.
	Show {
		id: u64,
	},
	Create(AssignmentArgs),
	Update {
		id: u64,
		#[command(flatten)]
		fields: AssignmentArgs,
	},
	Delete {
		id: u64,
	},
}

#[derive(Args)]
struct TaskArgs {
	#[arg(long)]
	title: Option<String>,
	#[arg(long)]
	description: Option<String>,
	/// Priority value or label.
	#[arg(long)]
	priority: Option<TaskPriority>,
	/// Status value or label.
	#[arg(long)]
	status: Option<TaskStatus>,
	/// RFC 3339 timestamp or YYYY-MM-DD.
	#[arg(long)]
	due: Option<String>,
	#[arg(long)]
	employee: Option<u64>,
	/// Assigned user, repeat for more.
	#[arg(long = "user")]
	users: Vec<u64>,
	/// Tag name, repeat for more.
	#[arg(long = "tag")]
	tags: Vec<String>,
	#[arg(long)]
	send_mail: Option<bool>,
}

#[derive(Subcommand)]
enum TaskAction {
	List,
	Show {
		id: u64,
	},
	Create(TaskArgs),
	Update {
		id: u64,
		#[command(flatten)]
		fields: TaskArgs,
	},
	Delete {
		id: u64,
	},
}

#[derive(Subcommand)]
enum CustomerAction {
	List,
	Create {
		#[arg(long)]
		name: String,
		#[arg(long)]
		email: String,
		#[arg(long)]
		company_id: u64,
		#[arg(long, default_value = "")]
		phone: String,
		#[arg(long, default_value = "")]
		position: String,
		#[arg(long, default_value = "")]
		department: String,
		#[arg(long, default_value = "")]
		notes: String,
	},
}

#[tokio::main]
async fn main() {
	let options = Options::parse();

	let log_level = match options.verbose {
		0 => log::LevelFilter::Warn,
		1 => log::LevelFilter::Info,
		2 => log::LevelFilter::Debug,
		_ => log::LevelFilter::Trace,
	};
	env_logger::Builder::new()
		.filter_level(log_level)
		.parse_default_env()
		.init();

	if do_main(options).await.is_err() {
		std::process::exit(1);
	}
}

async fn do_main(options: Options) -> Result<(), ()> {
	let config = match &options.config {
		Some(path) => Config::from_file(path)?,
		None => Config::default(),
	};
	let api_root = options.api_root.as_deref().unwrap_or(config.api_root());
	let store = SessionStore::new(config.session_file());
	let session = store.load()
		.map_err(|e| log::error!("{}", e))?;

	let mut api = ApiClient::new(api_root, session);
	api.task_update_retry = config.task_update_retry();

	match options.command {
		Command::Login { email, password } => login(&api, &store, email, password).await,
		Command::Signup { name, email, password } => signup(&api, name, email, password).await,
		Command::Logout => {
			store.clear().map_err(|e| log::error!("{}", e))?;
			println!("ログアウトしました");
			Ok(())
		},
		Command::Employees { action } => match action.unwrap_or(EmployeesAction::List(EmployeeSearch::default())) {
			EmployeesAction::List(search) => list_employees(&api, search).await,
			EmployeesAction::Create(fields) => create_employee(&api, fields).await,
		},
		Command::Employee { id, action } => employee(&api, id, action.unwrap_or(EmployeeAction::Show)).await,
		Command::Skills { action } => skills(&api, action.unwrap_or(SkillAction::List)).await,
		Command::Assignments { action } => assignments(&api, action.unwrap_or(AssignmentAction::List)).await,
		Command::Tasks { action } => task(&api, action.unwrap_or(TaskAction::List)).await,
		Command::Activities { page, page_size, stats } => list_activities(&api, page, page_size, stats).await,
		Command::Companies => list_companies(&api).await,
		Command::Customers { action } => customers(&api, action.unwrap_or(CustomerAction::List)).await,
		Command::Users => list_users(&api).await,
	}
}

/// Print the user facing message of an error and log the details.
fn report(fallback: &str) -> impl Fn(Error) + '_ {
	move |e| {
		log::debug!("{}", e);
		eprintln!("エラー: {}", e.user_message(fallback));
	}
}

async fn login(api: &ApiClient, store: &SessionStore, email: String, password: String) -> Result<(), ()> {
	let session = api.login(&types::Credentials { email, password })
		.await
		.map_err(report("サインイン中にネットワークエラーが発生しました"))?;
	store.save(&session).map_err(|e| log::error!("{}", e))?;
	match &session.user {
		Some(user) => println!("ログイン成功: {} <{}>", user.name, user.email),
		None => println!("ログイン成功"),
	}
	Ok(())
}

async fn signup(api: &ApiClient, name: String, email: String, password: String) -> Result<(), ()> {
	validate::required(&[("name", name.as_str()), ("email", email.as_str()), ("password", password.as_str())], "名前、メールアドレス、パスワードは必須です")
		.map_err(report(""))?;
	api.signup(&types::SignupRequest { name, email, password })
		.await
		.map_err(report("サインアップ中にエラーが発生しました"))?;
	println!("アカウント登録に成功しました。ログインしてください。");
	Ok(())
}

async fn create_employee(api: &ApiClient, fields: NewEmployeeArgs) -> Result<(), ()> {
	let mut list = EmployeeList::new(api);
	list.load().await;
	if let Some(message) = list.employees.error() {
		eprintln!("エラー: {}", message);
		return Err(());
	}

	let form = NewEmployeeForm {
		employee_id: fields.employee_number.unwrap_or_default(),
		first_name: fields.first_name,
		last_name: fields.last_name,
		email: fields.email,
		department: fields.department,
		position: fields.position,
		status_label: fields.status,
		hire_date: fields.hire_date.unwrap_or_else(|| Utc::now().date_naive().format("%Y-%m-%d").to_string()),
	};
	list.create(&form).await.map_err(report("社員の追加中にエラーが発生しました。"))?;
	println!("社員を追加しました (全{}名)", list.employees.get().map(Vec::len).unwrap_or_default());
	Ok(())
}

async fn list_employees(api: &ApiClient, search: EmployeeSearch) -> Result<(), ()> {
	let mut list = EmployeeList::new(api);
	list.load().await;
	let employees = match (list.employees.get(), list.employees.error()) {
		(Some(employees), _) => employees,
		(None, message) => {
			eprintln!("エラー: {}", message.unwrap_or_default());
			return Err(());
		},
	};

	let filters = SearchFilters {
		employee_id: search.id,
		name: search.name,
		department: search.department,
		position: search.position,
		status: search.status,
		skill_name: search.skill,
		hire_date_from: search.hired_from,
		hire_date_to: search.hired_to,
	};
	let mut sort = SortState::default();
	for column in search.sort {
		sort.click(column);
	}

	let found = employee_list::search(employees, &filters, &sort);
	println!("{} / {} 名 (並び順: {:?} {})", found.len(), employees.len(), sort.column, sort.indicator(sort.column));
	for employee in found {
		println!(
			"{:<10} {:<16} {:<12} {:<12} {:<8} {} スキル{}",
			employee.employee_id,
			employee.full_name(),
			employee.department,
			employee.position,
			employee.status.label(),
			employee.hire_date.format("%Y/%m/%d"),
			employee.skills.len(),
		);
	}

	if filters == SearchFilters::default() {
		let departments = employee_list::distinct(employees, |e| e.department.as_str());
		let positions = employee_list::distinct(employees, |e| e.position.as_str());
		println!("部署: {}", departments.join(", "));
		println!("役職: {}", positions.join(", "));
		let statuses: Vec<&str> = employee_list::distinct(employees, |e| e.status).into_iter().map(EmployeeStatus::label).collect();
		println!("ステータス: {}", statuses.join(", "));
	}
	Ok(())
}

async fn employee(api: &ApiClient, id: u64, action: EmployeeAction) -> Result<(), ()> {
	let mut detail = EmployeeDetail::new(api, id);
	detail.load().await;
	if let Some(message) = detail.employee.error() {
		eprintln!("エラー: {}", message);
		return Err(());
	}

	let result = match action {
		EmployeeAction::Show => Ok(()),
		EmployeeAction::Update(fields) => {
			detail.begin_profile_edit();
			let form = &mut detail.profile.form;
			set_if_some(&mut form.employee_id, fields.employee_number);
			set_if_some(&mut form.first_name, fields.first_name);
			set_if_some(&mut form.last_name, fields.last_name);
			set_if_some(&mut form.email, fields.email);
			set_if_some(&mut form.department, fields.department);
			set_if_some(&mut form.position, fields.position);
			set_if_some(&mut form.status_label, fields.status);
			set_if_some(&mut form.hire_date, fields.hire_date);
			set_if_some(&mut form.memo, fields.memo);
			detail.save_profile().await
		},
		EmployeeAction::Delete => {
			detail.delete_employee().await.map_err(|_| report_form_error(&detail))?;
			println!("社員データを削除しました");
			return Ok(());
		},
		EmployeeAction::AddSkill { skill_id, fields } => {
			let mut form = SkillForm { skill_id: Some(skill_id), ..SkillForm::default() };
			apply_skill_fields(&mut form, fields);
			detail.add_skill(&form).await
		},
		EmployeeAction::EditSkill { employee_skill_id, fields } => {
			if !detail.begin_skill_edit(employee_skill_id) {
				eprintln!("エラー: スキルが見つかりません: {}", employee_skill_id);
				return Err(());
			}
			if let Some((_, form)) = &mut detail.skill_edit {
				apply_skill_fields(form, fields);
			}
			detail.save_skill_edit().await
		},
		EmployeeAction::RemoveSkill { employee_skill_id } => detail.remove_skill(employee_skill_id).await,
		EmployeeAction::Assign { assignment_id, dates } => {
			let mut form = AssignmentForm {
				assignment_id,
				start_date: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
				..AssignmentForm::default()
			};
			apply_link_dates(&mut form, dates);
			detail.assign(&form).await
		},
		EmployeeAction::EditAssignment { assignment_id, dates } => {
			if !detail.begin_assignment_edit(assignment_id) {
				eprintln!("エラー: 課題の割り当てが見つかりません: {}", assignment_id);
				return Err(());
			}
			if let Some(form) = &mut detail.assignment_edit {
				apply_link_dates(form, dates);
			}
			detail.save_assignment_edit().await
		},
		EmployeeAction::Unassign { assignment_id } => detail.unassign(assignment_id).await,
		EmployeeAction::AddCase(fields) => detail.save_case(&case_form(None, fields)).await,
		EmployeeAction::EditCase { case_id, fields } => detail.save_case(&case_form(Some(case_id), fields)).await,
		EmployeeAction::DeleteCase { case_id } => detail.delete_case(case_id).await,
	};

	if result.is_err() {
		report_form_error(&detail);
		return Err(());
	}

	print_employee_detail(&detail);
	Ok(())
}

fn report_form_error<A: SkillApi + ?Sized>(detail: &EmployeeDetail<A>) {
	if let Some(message) = &detail.form_error {
		eprintln!("エラー: {}", message);
	}
}

fn set_if_some(field: &mut String, value: Option<String>) {
	if let Some(value) = value {
		*field = value;
	}
}

fn apply_skill_fields(form: &mut SkillForm, fields: SkillLinkArgs) {
	if let Some(proficiency) = fields.proficiency {
		form.proficiency = proficiency;
	}
	if let Some(certified) = fields.certified {
		form.certified = certified;
	}
	set_if_some(&mut form.years_of_exp, fields.years);
	set_if_some(&mut form.cert_details, fields.cert_details);
	set_if_some(&mut form.last_used, fields.last_used);
}

fn apply_link_dates(form: &mut AssignmentForm, dates: LinkDates) {
	set_if_some(&mut form.start_date, dates.start);
	set_if_some(&mut form.end_date, dates.end);
	if let Some(completed) = dates.completed {
		form.is_completed = completed;
	}
}

fn case_form(id: Option<u64>, fields: CaseArgs) -> CaseForm {
	CaseForm {
		id,
		company_name: fields.company,
		description: fields.description,
		start_date: fields.start,
		end_date: fields.end,
	}
}

fn print_employee_detail<A: SkillApi + ?Sized>(detail: &EmployeeDetail<A>) {
	let employee = match detail.current_employee() {
		Some(employee) => employee,
		None => return,
	};

	println!("{} ({})", employee.full_name(), employee.employee_id);
	println!("  メール:     {}", employee.email);
	println!("  部署:       {}", employee.department);
	println!("  役職:       {}", employee.position);
	println!("  ステータス: {}", employee.status.label());
	println!("  入社日:     {}", employee.hire_date.format("%Y/%m/%d"));
	if let Some(memo) = &employee.memo {
		println!("  メモ:       {}", memo);
	}

	println!("スキル");
	match (detail.skills.get(), detail.skills.error()) {
		(Some(skills), _) => {
			let by_category = index_by(skills.iter(), |link| link.skill.category.clone());
			for (category, links) in by_category {
				println!("  {}", category);
				for link in links {
					let years = link.years_of_exp.map(|years| format!(" 経験{}年", years)).unwrap_or_default();
					let certified = if link.certified { " 資格あり" } else { "" };
					println!("    [{}] {} 習熟度{}{}{}", link.id, link.skill.name, link.proficiency, years, certified);
				}
			}
		},
		(None, Some(message)) => println!("  {}", message),
		(None, None) => (),
	}
	let available: Vec<String> = detail.available_skills().iter().map(|skill| format!("{} ({})", skill.name, skill.id)).collect();
	if !available.is_empty() {
		println!("  追加可能: {}", available.join(", "));
	}

	println!("課題");
	for link in detail.assignment_history() {
		let name = link.assignment.as_ref().map(|assignment| assignment.name.as_str()).unwrap_or("?");
		let end = link.end_date.map(|date| date.format("%Y/%m/%d").to_string()).unwrap_or_default();
		let done = if link.is_completed { "完了" } else { "進行中" };
		println!("  [{}] {} {} - {} {}", link.assignment_id, name, link.start_date.format("%Y/%m/%d"), end, done);
	}
	if let Some(message) = detail.assignments.error() {
		println!("  {}", message);
	}

	if let Some(cases) = detail.cases.get() {
		if !cases.is_empty() {
			println!("案件");
			for case in cases {
				let end = case.end_date.map(|date| date.format("%Y/%m/%d").to_string()).unwrap_or_default();
				println!("  [{}] {} {} - {}: {}", case.id, case.company_name, case.start_date.format("%Y/%m/%d"), end, case.description);
			}
		}
	}
}

async fn skills(api: &ApiClient, action: SkillAction) -> Result<(), ()> {
	match action {
		SkillAction::List => {
			let skills = api.get_skills()
				.await
				.map_err(report("スキルの取得中にエラーが発生しました"))?;
			let by_category = index_by(skills, |skill| skill.category.clone());
			for (category, skills) in by_category {
				println!("{}", category);
				for skill in skills {
					println!("  {} ({}) {}", skill.name, skill.id, skill.description.unwrap_or_default());
				}
			}
		},
		SkillAction::Create(fields) => {
			let input = skill_input(fields)?;
			api.create_skill(&input).await.map_err(report("スキルの追加に失敗しました"))?;
			println!("スキルを追加しました");
		},
		SkillAction::Update { id, fields } => {
			let input = skill_input(fields)?;
			api.update_skill(id, &input).await.map_err(report("更新処理中にエラーが発生しました"))?;
			println!("スキル情報が更新されました");
		},
		SkillAction::Delete { id } => {
			api.delete_skill(id).await.map_err(report("削除処理中にエラーが発生しました"))?;
			println!("スキルを削除しました");
		},
	}
	Ok(())
}

fn skill_input(fields: SkillArgs) -> Result<types::SkillInput, ()> {
	validate::required(&[("name", fields.name.as_str()), ("category", fields.category.as_str())], "スキル名とカテゴリは必須です")
		.map_err(report(""))?;
	Ok(types::SkillInput {
		name: fields.name,
		category: fields.category,
		description: fields.description,
	})
}

async fn assignments(api: &ApiClient, action: AssignmentAction) -> Result<(), ()> {
	match action {
		AssignmentAction::List => {
			let assignments = api.get_assignments()
				.await
				.map_err(report("課題の取得中にエラーが発生しました"))?;
			for assignment in assignments {
				println!("{:>4} {} (難易度{})", assignment.id, assignment.name, assignment.difficulty);
			}
		},
		AssignmentAction::Show { id } => {
			let assignment = api.get_assignment(id)
				.await
				.map_err(report("課題の取得中にエラーが発生しました"))?;
			println!("{} (難易度{})", assignment.name, assignment.difficulty);
			println!("{}", assignment.content);

			let holders = assignment_detail::holders(api, id)
				.await
				.map_err(report("担当者の取得中にエラーが発生しました"))?;
			println!("現在の担当者");
			for (employee, link) in &holders.current {
				println!("  {} {}～", employee.full_name(), link.start_date.format("%Y/%m/%d"));
			}
			println!("過去の担当者");
			for (employee, link) in &holders.past {
				let end = link.end_date.map(|date| date.format("%Y/%m/%d").to_string()).unwrap_or_default();
				println!("  {} {}～{}", employee.full_name(), link.start_date.format("%Y/%m/%d"), end);
			}
		},
		AssignmentAction::Create(fields) => {
			let input = assignment_input(fields)?;
			api.create_assignment(&input).await.map_err(report("課題の追加に失敗しました"))?;
			println!("課題を追加しました");
		},
		AssignmentAction::Update { id, fields } => {
			let input = assignment_input(fields)?;
			api.update_assignment(id, &input).await.map_err(report("更新に失敗しました"))?;
			println!("課題を更新しました");
		},
		AssignmentAction::Delete { id } => {
			api.delete_assignment(id).await.map_err(report("削除に失敗しました"))?;
			println!("課題を削除しました");
		},
	}
	Ok(())
}

fn assignment_input(fields: AssignmentArgs) -> Result<types::AssignmentInput, ()> {
	validate::required(
		&[("name", fields.name.as_str()), ("content", fields.content.as_str()), ("difficulty", fields.difficulty.as_str())],
		"全ての項目を入力してください",
	).map_err(report(""))?;
	let difficulty = validate::difficulty(&fields.difficulty).map_err(report(""))?;
	Ok(types::AssignmentInput {
		name: fields.name,
		content: fields.content,
		difficulty,
	})
}

async fn task(api: &ApiClient, action: TaskAction) -> Result<(), ()> {
	match action {
		TaskAction::List => {
			let tasks = api.get_tasks()
				.await
				.map_err(report("タスクの取得中にエラーが発生しました"))?;
			let summary = tasks::summarize(&tasks, Utc::now());
			println!("全{}件 未対応{} 進行中{} 期限切れ{}", summary.total, summary.pending, summary.in_progress, summary.overdue);
			for task in &tasks {
				println!("{:>4} [{}][{}] {} (期限 {})", task.id, task.status.label(), task.priority.label(), task.title, task.due_date.format("%Y/%m/%d"));
			}
			let tags: Vec<&str> = tasks::tag_options(&tasks).iter().map(|tag| tag.name.as_str()).collect();
			if !tags.is_empty() {
				println!("タグ: {}", tags.join(", "));
			}
		},
		TaskAction::Show { id } => {
			let mut detail = TaskDetail::new(api, id);
			detail.load().await;
			print_task_detail(&detail)?;
		},
		TaskAction::Create(fields) => {
			let mut form = TaskForm::default();
			apply_task_fields(&mut form, fields);
			let input = form.to_input().map_err(report(""))?;
			api.create_task(&input).await.map_err(report("タスク作成に失敗しました"))?;
			println!("タスクを作成しました");
		},
		TaskAction::Update { id, fields } => {
			let mut detail = TaskDetail::new(api, id);
			detail.load().await;
			if let Some(message) = detail.task.error() {
				eprintln!("エラー: {}", message);
				return Err(());
			}
			detail.begin_edit();
			apply_task_fields(&mut detail.edit.form, fields);
			detail.save().await.map_err(report("タスク更新に失敗しました"))?;
			println!("タスクを更新しました");
			print_task_detail(&detail)?;
		},
		TaskAction::Delete { id } => {
			api.delete_task(id).await.map_err(report("タスク削除に失敗しました"))?;
			println!("タスクを削除しました");
		},
	}
	Ok(())
}

fn apply_task_fields(form: &mut TaskForm, fields: TaskArgs) {
	set_if_some(&mut form.title, fields.title);
	set_if_some(&mut form.description, fields.description);
	set_if_some(&mut form.due_date, fields.due);
	if let Some(priority) = fields.priority {
		form.priority = priority;
	}
	if let Some(status) = fields.status {
		form.status = status;
	}
	if fields.employee.is_some() {
		form.related_employee_id = fields.employee;
	}
	if !fields.users.is_empty() {
		form.assigned_user_ids = fields.users;
	}
	if !fields.tags.is_empty() {
		form.tags = fields.tags;
	}
	if let Some(send_mail) = fields.send_mail {
		form.is_send_mail = send_mail;
	}
}

fn print_task_detail<A: SkillApi + ?Sized>(detail: &TaskDetail<A>) -> Result<(), ()> {
	let task = match (detail.task.get(), detail.task.error()) {
		(Some(task), _) => task,
		(None, message) => {
			eprintln!("エラー: {}", message.unwrap_or("タスクが見つかりません"));
			return Err(());
		},
	};

	println!("{} [{}][{}]", task.title, task.status.label(), task.priority.label());
	println!("{}", task.description);
	println!("期限: {}", task.due_date.format("%Y/%m/%d"));
	if let Some(employee) = &task.related_employee {
		println!("関連社員: {} {}", employee.last_name, employee.first_name);
	}
	let users: Vec<&str> = task.assignments.iter().map(|assignment| assignment.user.name.as_str()).collect();
	if !users.is_empty() {
		println!("担当: {}", users.join(", "));
	}
	let tags: Vec<&str> = task.tags.iter().map(|tag| tag.name.as_str()).collect();
	if !tags.is_empty() {
		println!("タグ: {}", tags.join(", "));
	}

	println!("アクティビティ");
	match (detail.activities.get(), detail.activities.error()) {
		(Some(activities), _) => {
			for activity in activities {
				print_activity(activity);
			}
		},
		(None, Some(message)) => println!("  {}", message),
		(None, None) => (),
	}
	Ok(())
}

fn print_activity(activity: &types::Activity) {
	let user = activity.user.as_ref().map(|user| user.name.as_str()).unwrap_or("");
	println!(
		"  {} [{}] {} ({})",
		activity.created_at.format("%Y/%m/%d %H:%M"),
		status::activity_label(&activity.kind),
		activity.title,
		user,
	);
}

async fn list_activities(api: &ApiClient, page_number: u64, page_size: u64, show_stats: bool) -> Result<(), ()> {
	if show_stats {
		let everything = api.get_activities(1, 10000)
			.await
			.map_err(report("アクティビティの取得中にエラーが発生しました"))?;
		let stats = activities::stats(&everything, Utc::now().date_naive());
		println!("総数 {} / タスク関連 {} / 今日 {}", stats.total, stats.task_related, stats.today);
		return Ok(());
	}

	let page = api.get_activities(page_number, page_size)
		.await
		.map_err(report("アクティビティの取得中にエラーが発生しました"))?;
	for activity in &page.activities {
		print_activity(activity);
	}
	println!("{} / {} ページ", page_number, activities::total_pages(&page, page_number, page_size));
	Ok(())
}

async fn list_companies(api: &ApiClient) -> Result<(), ()> {
	let mut companies = api.get_companies()
		.await
		.map_err(report("企業の取得中にエラーが発生しました"))?;
	companies.sort_by(|a, b| a.name.cmp(&b.name));
	for company in companies {
		let industry = company.industry.unwrap_or_default();
		println!("{:>4} {} {}", company.id, company.name, industry);
	}
	Ok(())
}

async fn customers(api: &ApiClient, action: CustomerAction) -> Result<(), ()> {
	match action {
		CustomerAction::List => {
			let customers = api.get_customers()
				.await
				.map_err(report("顧客の取得中にエラーが発生しました"))?;
			let by_company = index_by(customers, |customer| (customer.company.name.clone(), customer.company.id));
			for ((company, company_id), customers) in by_company {
				println!("{} ({})", company, company_id);
				for customer in customers {
					println!("  {} <{}> {}", customer.name, customer.email, customer.position.unwrap_or_default());
				}
			}
		},
		CustomerAction::Create { name, email, company_id, phone, position, department, notes } => {
			validate::required(&[("name", name.as_str()), ("email", email.as_str())], "名前、メールアドレス、企業は必須です")
				.map_err(report(""))?;
			let input = types::CustomerInput { name, email, phone, position, department, notes, company_id };
			api.create_customer(&input).await.map_err(report("顧客の追加に失敗しました"))?;
			println!("顧客を追加しました");
		},
	}
	Ok(())
}

async fn list_users(api: &ApiClient) -> Result<(), ()> {
	let users = api.get_users()
		.await
		.map_err(report("ユーザーの取得中にエラーが発生しました"))?;
	for user in users {
		println!("{:>4} {} <{}>", user.id, user.name, user.email);
	}
	Ok(())
}

fn index_by<I, F, T, K>(input: I, mut key: F) -> BTreeMap<K, Vec<T>>
where
	I: IntoIterator<Item = T>,
	F: FnMut(&T) -> K,
	K: std::cmp::Ord,
{
	use std::collections::btree_map::Entry;
	let mut result = BTreeMap::new();
	for item in input {
		match result.entry(key(&item)) {
			Entry::Vacant(entry) => {
				entry.insert(vec![item]);
			},
			Entry::Occupied(mut entry) => {
				entry.get_mut().push(item);
			},
		}
	}

	result
}
