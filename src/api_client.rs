use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Error;
use crate::retry::RetryPolicy;
use crate::session::Session;
use crate::types;

/// One page of the activity log.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ActivityPage {
	#[serde(default)]
	pub activities: Vec<types::Activity>,
	#[serde(default)]
	pub pagination: Option<types::Pagination>,
}

/// The API operations the aggregating views are built on.
///
/// Implemented by [`ApiClient`] for the real server.
#[async_trait::async_trait]
pub trait SkillApi: Send + Sync {
	async fn get_employees(&self) -> Result<Vec<types::Employee>, Error>;
	async fn get_employee(&self, id: u64) -> Result<types::Employee, Error>;
	async fn create_employee(&self, employee: &types::NewEmployee) -> Result<(), Error>;
	async fn update_employee(&self, id: u64, update: &types::EmployeeUpdate) -> Result<(), Error>;
	async fn delete_employee(&self, id: u64) -> Result<(), Error>;

	async fn get_skills(&self) -> Result<Vec<types::Skill>, Error>;
	async fn get_employee_skill(&self, id: u64) -> Result<types::EmployeeSkill, Error>;
	async fn create_employee_skill(&self, skill: &types::NewEmployeeSkill) -> Result<(), Error>;
	async fn update_employee_skill(&self, id: u64, update: &types::EmployeeSkillUpdate) -> Result<(), Error>;
	async fn delete_employee_skill(&self, id: u64) -> Result<(), Error>;

	async fn get_assignments(&self) -> Result<Vec<types::Assignment>, Error>;
	async fn get_employee_assignments(&self, employee_id: u64) -> Result<Vec<types::EmployeeAssignment>, Error>;
	async fn create_employee_assignment(&self, link: &types::EmployeeAssignmentLink) -> Result<(), Error>;
	async fn update_employee_assignment(&self, link: &types::EmployeeAssignmentLink) -> Result<(), Error>;
	async fn delete_employee_assignment(&self, key: &types::EmployeeAssignmentKey) -> Result<(), Error>;

	async fn create_case(&self, case: &types::CaseInput) -> Result<(), Error>;
	async fn update_case(&self, id: u64, case: &types::CaseInput) -> Result<(), Error>;
	async fn delete_case(&self, id: u64) -> Result<(), Error>;

	async fn get_tasks(&self) -> Result<Vec<types::Task>, Error>;
	async fn update_task(&self, id: u64, task: &types::TaskInput) -> Result<(), Error>;
	async fn create_activity(&self, activity: &types::NewActivity) -> Result<(), Error>;
	async fn get_activities(&self, page: u64, page_size: u64) -> Result<ActivityPage, Error>;
}

pub struct ApiClient {
	pub api_root: String,
	pub session: Option<Session>,
	pub task_update_retry: RetryPolicy,
	client: reqwest::Client,
}

impl ApiClient {
	pub fn new(api_root: impl Into<String>, session: Option<Session>) -> Self {
		Self {
			api_root: api_root.into().trim_end_matches('/').to_string(),
			session,
			task_update_retry: RetryPolicy::NONE,
			client: reqwest::Client::new(),
		}
	}

	fn url(&self, relative_url: &str) -> String {
		format!("{}/{}", self.api_root, relative_url)
	}

	fn token(&self) -> Result<&str, Error> {
		match &self.session {
			Some(session) if !session.token.is_empty() => Ok(&session.token),
			_ => Err(Error::MissingToken),
		}
	}

	pub async fn login(&self, credentials: &types::Credentials) -> Result<Session, Error> {
		let context = "failed to sign in";
		let response = self.client.post(self.url("api/smartphone/auth/signin"))
			.json(credentials)
			.send()
			.await
			.map_err(|e| Error::Transport { context: context.into(), source: e })?;
		let response: types::LoginResponse = parse_response(context, response).await?;
		log::info!("Signed in as {}", response.user.email);
		Ok(Session {
			token: response.token,
			user: Some(response.user),
		})
	}

	pub async fn signup(&self, request: &types::SignupRequest) -> Result<(), Error> {
		let context = "failed to sign up";
		let response = self.client.post(self.url("signup"))
			.json(request)
			.send()
			.await
			.map_err(|e| Error::Transport { context: context.into(), source: e })?;
		check_status(context, response).await?;
		Ok(())
	}

	pub async fn get_users(&self) -> Result<Vec<types::User>, Error> {
		#[derive(serde::Deserialize)]
		struct Response {
			#[serde(default)]
			users: Vec<types::User>,
		}

		let response : Response = self.get_auth("api/users").await?;
		Ok(response.users)
	}

	pub async fn create_skill(&self, skill: &types::SkillInput) -> Result<(), Error> {
		self.send_auth(Method::POST, "api/skills", Some(skill)).await
	}

	pub async fn update_skill(&self, id: u64, skill: &types::SkillInput) -> Result<(), Error> {
		self.send_auth(Method::PUT, &format!("api/skills/{}", id), Some(skill)).await
	}

	pub async fn delete_skill(&self, id: u64) -> Result<(), Error> {
		self.send_auth(Method::DELETE, &format!("api/skills/{}", id), None::<&()>).await
	}

	pub async fn get_assignment(&self, id: u64) -> Result<types::Assignment, Error> {
		self.get_auth(&format!("api/assignments/{}", id)).await
	}

	pub async fn create_assignment(&self, assignment: &types::AssignmentInput) -> Result<(), Error> {
		self.send_auth(Method::POST, "api/assignments", Some(assignment)).await
	}

	pub async fn update_assignment(&self, id: u64, assignment: &types::AssignmentInput) -> Result<(), Error> {
		self.send_auth(Method::PUT, &format!("api/assignments/{}", id), Some(assignment)).await
	}

	pub async fn delete_assignment(&self, id: u64) -> Result<(), Error> {
		self.send_auth(Method::DELETE, &format!("api/assignments/{}", id), None::<&()>).await
	}

	pub async fn create_task(&self, task: &types::TaskInput) -> Result<(), Error> {
		self.send_auth(Method::POST, "api/tasks", Some(task)).await
	}

	pub async fn delete_task(&self, id: u64) -> Result<(), Error> {
		self.send_auth(Method::DELETE, &format!("api/tasks/{}", id), None::<&()>).await
	}

	pub async fn get_companies(&self) -> Result<Vec<types::Company>, Error> {
		self.get_auth("api/companies").await
	}

	pub async fn get_customers(&self) -> Result<Vec<types::Customer>, Error> {
		self.get_auth("api/customers").await
	}

	pub async fn create_customer(&self, customer: &types::CustomerInput) -> Result<(), Error> {
		self.send_auth(Method::POST, "api/customers", Some(customer)).await
	}

	async fn get_auth<T: DeserializeOwned>(&self, relative_url: &str) -> Result<T, Error> {
		let token = self.token()?;
		let context = format!("failed to get {}", relative_url);
		log::debug!("GET {}", relative_url);
		let response = self.client.get(self.url(relative_url))
			.bearer_auth(token)
			.send()
			.await
			.map_err(|e| Error::Transport { context: context.clone(), source: e })?;
		parse_response(&context, response).await
	}

	async fn send_auth<B: Serialize + ?Sized>(&self, method: Method, relative_url: &str, body: Option<&B>) -> Result<(), Error> {
		let token = self.token()?;
		let context = format!("failed to {} {}", method.as_str().to_lowercase(), relative_url);
		log::debug!("{} {}", method, relative_url);
		let mut request = self.client.request(method, self.url(relative_url))
			.bearer_auth(token);
		if let Some(body) = body {
			request = request.json(body);
		}
		let response = request
			.send()
			.await
			.map_err(|e| Error::Transport { context: context.clone(), source: e })?;
		check_status(&context, response).await?;
		Ok(())
	}
}

#[async_trait::async_trait]
impl SkillApi for ApiClient {
	async fn get_employees(&self) -> Result<Vec<types::Employee>, Error> {
		self.get_auth("api/employees").await
	}

	async fn get_employee(&self, id: u64) -> Result<types::Employee, Error> {
		self.get_auth(&format!("api/employees/{}", id)).await
	}

	async fn create_employee(&self, employee: &types::NewEmployee) -> Result<(), Error> {
		self.send_auth(Method::POST, "api/employees", Some(employee)).await
	}

	async fn update_employee(&self, id: u64, update: &types::EmployeeUpdate) -> Result<(), Error> {
		self.send_auth(Method::PUT, &format!("api/employees/{}", id), Some(update)).await
	}

	async fn delete_employee(&self, id: u64) -> Result<(), Error> {
		self.send_auth(Method::DELETE, &format!("api/employees/{}", id), None::<&()>).await
	}

	async fn get_skills(&self) -> Result<Vec<types::Skill>, Error> {
		self.get_auth("api/skills").await
	}

	async fn get_employee_skill(&self, id: u64) -> Result<types::EmployeeSkill, Error> {
		self.get_auth(&format!("api/employee-skills/{}", id)).await
	}

	async fn create_employee_skill(&self, skill: &types::NewEmployeeSkill) -> Result<(), Error> {
		self.send_auth(Method::POST, "api/employee-skills", Some(skill)).await
	}

	async fn update_employee_skill(&self, id: u64, update: &types::EmployeeSkillUpdate) -> Result<(), Error> {
		self.send_auth(Method::PUT, &format!("api/employee-skills/{}", id), Some(update)).await
	}

	async fn delete_employee_skill(&self, id: u64) -> Result<(), Error> {
		self.send_auth(Method::DELETE, &format!("api/employee-skills/{}", id), None::<&()>).await
	}

	async fn get_assignments(&self) -> Result<Vec<types::Assignment>, Error> {
		self.get_auth("api/assignments").await
	}

	async fn get_employee_assignments(&self, employee_id: u64) -> Result<Vec<types::EmployeeAssignment>, Error> {
		self.get_auth(&format!("api/employee-assignments?employeeId={}", employee_id)).await
	}

	async fn create_employee_assignment(&self, link: &types::EmployeeAssignmentLink) -> Result<(), Error> {
		self.send_auth(Method::POST, "api/employee-assignments", Some(link)).await
	}

	async fn update_employee_assignment(&self, link: &types::EmployeeAssignmentLink) -> Result<(), Error> {
		self.send_auth(Method::PUT, "api/employee-assignments", Some(link)).await
	}

	async fn delete_employee_assignment(&self, key: &types::EmployeeAssignmentKey) -> Result<(), Error> {
		self.send_auth(Method::DELETE, "api/employee-assignments", Some(key)).await
	}

	async fn create_case(&self, case: &types::CaseInput) -> Result<(), Error> {
		self.send_auth(Method::POST, "api/cases", Some(case)).await
	}

	async fn update_case(&self, id: u64, case: &types::CaseInput) -> Result<(), Error> {
		self.send_auth(Method::PUT, &format!("api/cases/{}", id), Some(case)).await
	}

	async fn delete_case(&self, id: u64) -> Result<(), Error> {
		self.send_auth(Method::DELETE, &format!("api/cases/{}", id), None::<&()>).await
	}

	async fn get_tasks(&self) -> Result<Vec<types::Task>, Error> {
		#[derive(serde::Deserialize)]
		struct Response {
			#[serde(default)]
			tasks: Vec<types::Task>,
		}

		let response : Response = self.get_auth("api/tasks").await?;
		Ok(response.tasks)
	}

	async fn update_task(&self, id: u64, task: &types::TaskInput) -> Result<(), Error> {
		let relative_url = format!("api/tasks/{}", id);
		self.task_update_retry
			.run("task update", || self.send_auth(Method::PUT, &relative_url, Some(task)))
			.await
	}

	async fn create_activity(&self, activity: &types::NewActivity) -> Result<(), Error> {
		self.send_auth(Method::POST, "api/activities", Some(activity)).await
	}

	async fn get_activities(&self, page: u64, page_size: u64) -> Result<ActivityPage, Error> {
		self.get_auth(&format!("api/activities?page={}&pageSize={}", page, page_size)).await
	}
}

async fn check_status(context: &str, response: reqwest::Response) -> Result<reqwest::Response, Error> {
	let status = response.status();
	if status.is_success() {
		return Ok(response);
	}

	let body = response.text().await.unwrap_or_default();
	log::debug!("{}: status {}: {}", context, status, body);
	Err(Error::Http {
		context: context.to_string(),
		status,
		message: server_message(&body),
	})
}

async fn parse_response<T: DeserializeOwned>(context: &str, response: reqwest::Response) -> Result<T, Error> {
	let response = check_status(context, response).await?;
	let status = response.status();
	let body = response.text()
		.await
		.map_err(|e| Error::Transport { context: context.to_string(), source: e })?;
	if status == StatusCode::NO_CONTENT {
		log::warn!("{}: server sent no content", context);
	}
	serde_json::from_str(&body).map_err(|e| Error::Parse {
		context: context.to_string(),
		message: e.to_string(),
	})
}

/// Dig a human readable message out of an error response body.
///
/// The server uses `{"error": "..."}`, `{"message": "..."}`,
/// or zod style field errors `{"error": {"email": {"_errors": ["..."]}}}`.
pub fn server_message(body: &str) -> Option<String> {
	let value: serde_json::Value = serde_json::from_str(body).ok()?;

	match value.get("error") {
		Some(serde_json::Value::String(message)) => return Some(message.clone()),
		Some(serde_json::Value::Object(fields)) => {
			let messages: Vec<String> = fields.iter()
				.filter_map(|(field, errors)| {
					let first = errors.get("_errors")?.as_array()?.first()?.as_str()?;
					Some(format!("{}: {}", field, first))
				})
				.collect();
			if !messages.is_empty() {
				return Some(messages.join(", "));
			}
		},
		_ => (),
	}

	value.get("message")
		.and_then(|message| message.as_str())
		.map(|message| message.to_string())
}
