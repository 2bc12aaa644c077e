//! Mutex-serialized in-memory storage.
//!
//! Every operation takes the single table lock once, validates, then writes, so multi-row
//! writes are atomic with respect to each other and to readers.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::domain::{
    Assignment, AssignmentId, CalculationId, CalculationResult, Company, CompanyId, Employee,
    EmployeeId, NewAssignment, NewCompany, NewEmployee, NewTemplate, RecordedResponse,
    ResponseId, SubmissionCommit, Template, TemplateId,
};
use super::repository::{EvaluationRepository, RepositoryError};

#[derive(Default)]
struct Tables {
    companies: BTreeMap<CompanyId, Company>,
    employees: BTreeMap<EmployeeId, Employee>,
    templates: BTreeMap<TemplateId, Template>,
    assignments: BTreeMap<AssignmentId, Assignment>,
    responses: Vec<RecordedResponse>,
    results: BTreeMap<AssignmentId, CalculationResult>,
    sequence: Sequences,
}

#[derive(Default)]
struct Sequences {
    company: i64,
    employee: i64,
    template: i64,
    assignment: i64,
    response: i64,
    calculation: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Tables {
    fn account_taken(&self, username: &str, email: &str) -> bool {
        self.companies
            .values()
            .any(|company| company.username == username || company.email == email)
            || self
                .employees
                .values()
                .any(|employee| employee.username == username || employee.email == email)
    }
}

#[derive(Default)]
pub struct InMemoryEvaluationRepository {
    tables: Mutex<Tables>,
}

impl InMemoryEvaluationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("table lock poisoned".to_string()))
    }

    pub fn response_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.responses.len())
    }

    pub fn result_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.results.len())
    }

    pub fn assignment_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.assignments.len())
    }

    /// Drops an employee account; outstanding tokens for it stop resolving.
    pub fn remove_employee(&self, id: EmployeeId) -> Result<Option<Employee>, RepositoryError> {
        Ok(self.lock()?.employees.remove(&id))
    }
}

impl EvaluationRepository for InMemoryEvaluationRepository {
    fn insert_company(&self, company: NewCompany) -> Result<Company, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.account_taken(&company.username, &company.email) {
            return Err(RepositoryError::Conflict(format!(
                "account {} already registered",
                company.username
            )));
        }
        let id = CompanyId(next(&mut tables.sequence.company));
        let stored = Company {
            id,
            username: company.username,
            email: company.email,
            company_name: company.company_name,
            phone_number: company.phone_number,
            is_active: true,
        };
        tables.companies.insert(id, stored.clone());
        Ok(stored)
    }

    fn insert_employee(&self, employee: NewEmployee) -> Result<Employee, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.companies.contains_key(&employee.company_id) {
            return Err(RepositoryError::NotFound);
        }
        if tables.account_taken(&employee.username, &employee.email) {
            return Err(RepositoryError::Conflict(format!(
                "account {} already registered",
                employee.username
            )));
        }
        let id = EmployeeId(next(&mut tables.sequence.employee));
        let stored = Employee {
            id,
            company_id: employee.company_id,
            username: employee.username,
            email: employee.email,
            first_name: employee.first_name,
            last_name: employee.last_name,
            phone_number: employee.phone_number,
            is_active: true,
        };
        tables.employees.insert(id, stored.clone());
        Ok(stored)
    }

    fn company(&self, id: CompanyId) -> Result<Option<Company>, RepositoryError> {
        Ok(self.lock()?.companies.get(&id).cloned())
    }

    fn employee(&self, id: EmployeeId) -> Result<Option<Employee>, RepositoryError> {
        Ok(self.lock()?.employees.get(&id).cloned())
    }

    fn companies(&self) -> Result<Vec<Company>, RepositoryError> {
        Ok(self.lock()?.companies.values().cloned().collect())
    }

    fn employees_of(&self, company: CompanyId) -> Result<Vec<Employee>, RepositoryError> {
        Ok(self
            .lock()?
            .employees
            .values()
            .filter(|employee| employee.company_id == company)
            .cloned()
            .collect())
    }

    fn account_taken(&self, username: &str, email: &str) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.account_taken(username, email))
    }

    fn insert_template(&self, template: NewTemplate) -> Result<Template, RepositoryError> {
        let mut tables = self.lock()?;
        let duplicate = tables.templates.values().any(|existing| {
            existing.company_id == template.company_id && existing.title == template.title
        });
        if duplicate {
            return Err(RepositoryError::Conflict(format!(
                "template {} already exists",
                template.title
            )));
        }
        let id = TemplateId(next(&mut tables.sequence.template));
        let stored = Template {
            id,
            title: template.title,
            description: template.description,
            created_date: template.created_date,
            company_id: template.company_id,
        };
        tables.templates.insert(id, stored.clone());
        Ok(stored)
    }

    fn template(&self, id: TemplateId) -> Result<Option<Template>, RepositoryError> {
        Ok(self.lock()?.templates.get(&id).cloned())
    }

    fn template_by_title(
        &self,
        company: CompanyId,
        title: &str,
    ) -> Result<Option<Template>, RepositoryError> {
        Ok(self
            .lock()?
            .templates
            .values()
            .find(|template| template.company_id == company && template.title == title)
            .cloned())
    }

    fn templates_of(&self, company: CompanyId) -> Result<Vec<Template>, RepositoryError> {
        Ok(self
            .lock()?
            .templates
            .values()
            .filter(|template| template.company_id == company)
            .cloned()
            .collect())
    }

    fn insert_assignments(
        &self,
        batch: Vec<NewAssignment>,
    ) -> Result<Vec<Assignment>, RepositoryError> {
        let mut tables = self.lock()?;
        for pending in &batch {
            if !tables.templates.contains_key(&pending.template_id)
                || !tables.employees.contains_key(&pending.employee_id)
            {
                return Err(RepositoryError::NotFound);
            }
        }

        let mut stored = Vec::with_capacity(batch.len());
        for pending in batch {
            let id = AssignmentId(next(&mut tables.sequence.assignment));
            let assignment = Assignment {
                id,
                employee_id: pending.employee_id,
                template_id: pending.template_id,
                assigned_date: pending.assigned_date,
                due_date: pending.due_date,
                completion_date: None,
                is_completed: false,
            };
            tables.assignments.insert(id, assignment.clone());
            stored.push(assignment);
        }
        debug!(count = stored.len(), "assignments inserted");
        Ok(stored)
    }

    fn assignment(&self, id: AssignmentId) -> Result<Option<Assignment>, RepositoryError> {
        Ok(self.lock()?.assignments.get(&id).cloned())
    }

    fn assignments_for_employee(
        &self,
        employee: EmployeeId,
    ) -> Result<Vec<Assignment>, RepositoryError> {
        Ok(self
            .lock()?
            .assignments
            .values()
            .filter(|assignment| assignment.employee_id == employee)
            .cloned()
            .collect())
    }

    fn incomplete_for_company(
        &self,
        company: CompanyId,
    ) -> Result<Vec<Assignment>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .assignments
            .values()
            .filter(|assignment| !assignment.is_completed)
            .filter(|assignment| {
                tables
                    .templates
                    .get(&assignment.template_id)
                    .is_some_and(|template| template.company_id == company)
            })
            .cloned()
            .collect())
    }

    fn responses(&self, assignment: AssignmentId) -> Result<Vec<RecordedResponse>, RepositoryError> {
        Ok(self
            .lock()?
            .responses
            .iter()
            .filter(|response| response.assignment_id == assignment)
            .cloned()
            .collect())
    }

    fn commit_submission(
        &self,
        commit: SubmissionCommit,
    ) -> Result<CalculationResult, RepositoryError> {
        let mut tables = self.lock()?;
        let assignment_id = commit.assignment_id;
        match tables.assignments.get(&assignment_id) {
            None => return Err(RepositoryError::NotFound),
            Some(assignment) if assignment.is_completed => {
                return Err(RepositoryError::AlreadyCompleted(assignment_id))
            }
            Some(_) => {}
        }
        if tables.results.contains_key(&assignment_id) {
            return Err(RepositoryError::AlreadyCompleted(assignment_id));
        }

        let mut seen: HashSet<_> = tables
            .responses
            .iter()
            .filter(|response| response.assignment_id == assignment_id)
            .map(|response| response.question_id)
            .collect();
        for response in &commit.responses {
            if !seen.insert(response.question_id) {
                return Err(RepositoryError::DuplicateResponse {
                    assignment_id,
                    question_id: response.question_id,
                });
            }
        }

        for response in commit.responses {
            let id = ResponseId(next(&mut tables.sequence.response));
            tables.responses.push(RecordedResponse {
                id,
                assignment_id,
                question_id: response.question_id,
                score: response.score,
            });
        }

        let result = CalculationResult {
            id: CalculationId(next(&mut tables.sequence.calculation)),
            assignment_id,
            scores: commit.scores,
        };
        tables.results.insert(assignment_id, result.clone());

        if let Some(assignment) = tables.assignments.get_mut(&assignment_id) {
            assignment.is_completed = true;
            assignment.completion_date = Some(commit.completed_at);
        }
        Ok(result)
    }

    fn calculation_result(
        &self,
        assignment: AssignmentId,
    ) -> Result<Option<CalculationResult>, RepositoryError> {
        Ok(self.lock()?.results.get(&assignment).cloned())
    }
}
