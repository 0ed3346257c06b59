use futures::future::join_all;

use crate::api_client::SkillApi;
use crate::error::Error;
use crate::types::{Employee, EmployeeAssignment};

/// Who works, or worked, on one assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentHolders {
	pub current: Vec<(Employee, EmployeeAssignment)>,
	pub past: Vec<(Employee, EmployeeAssignment)>,
}

/// Collect the links to `assignment_id` from every employee.
///
/// The per-employee lookups run concurrently.
/// An employee whose lookup fails is skipped with a warning, the rest still count.
pub async fn holders<A: SkillApi + ?Sized>(api: &A, assignment_id: u64) -> Result<AssignmentHolders, Error> {
	let employees = api.get_employees().await?;

	let lookups = employees.iter().map(|employee| api.get_employee_assignments(employee.id));
	let results = join_all(lookups).await;

	let mut holders = AssignmentHolders::default();
	for (employee, result) in employees.into_iter().zip(results) {
		let links = match result {
			Ok(links) => links,
			Err(e) => {
				log::warn!("Skipping employee {} while collecting assignment holders: {}", employee.id, e);
				continue;
			},
		};

		for link in links.into_iter().filter(|link| link.assignment_id == assignment_id) {
			if link.is_completed {
				holders.past.push((employee.clone(), link));
			} else {
				holders.current.push((employee.clone(), link));
			}
		}
	}

	Ok(holders)
}
