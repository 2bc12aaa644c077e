use std::sync::Arc;

use axum::response::Response;
use chrono::{Duration, NaiveDate};
use serde_json::Value;

use crate::evaluation::catalog::Catalog;
use crate::evaluation::domain::{
    AnswerInput, AssignRequest, Assignment, AssignmentId, AssignmentStatus, CalculationResult,
    Company, CompanyId, Employee, EmployeeId, NewAssignment, NewCompany, NewCompanyRequest,
    NewEmployee, NewEmployeeRequest, NewTemplate, NewTemplateRequest, QuestionId,
    RecordedResponse, SubmissionCommit, Template, TemplateId,
};
use crate::evaluation::memory::InMemoryEvaluationRepository;
use crate::evaluation::repository::{EvaluationRepository, RepositoryError};
use crate::evaluation::{evaluation_router, EvaluationService};
use crate::identity::{Principal, TokenAuthority};

pub(super) type MemoryService = EvaluationService<InMemoryEvaluationRepository, TokenAuthority>;

pub(super) struct Fixture {
    pub(super) service: Arc<MemoryService>,
    pub(super) repository: Arc<InMemoryEvaluationRepository>,
    pub(super) authority: Arc<TokenAuthority>,
}

pub(super) fn authority() -> TokenAuthority {
    TokenAuthority::new(b"evaluation-tests".to_vec(), Duration::minutes(30))
}

pub(super) fn fixture() -> Fixture {
    let repository = Arc::new(InMemoryEvaluationRepository::new());
    let authority = Arc::new(authority());
    let service = Arc::new(EvaluationService::new(
        repository.clone(),
        authority.clone(),
        Arc::new(Catalog::standard()),
    ));
    Fixture {
        service,
        repository,
        authority,
    }
}

impl Fixture {
    pub(super) fn company(&self, username: &str) -> Principal {
        let company = self
            .service
            .register_company(NewCompanyRequest {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                company_name: format!("{username} Ltd"),
                phone_number: None,
            })
            .expect("company registers");
        Principal::Company {
            company_id: company.id,
            username: company.username,
        }
    }

    pub(super) fn employee(&self, company: &Principal, username: &str) -> Principal {
        let employee = self
            .service
            .register_employee(
                company,
                NewEmployeeRequest {
                    username: username.to_string(),
                    email: format!("{username}@example.com"),
                    first_name: "Ana".to_string(),
                    last_name: "Ruiz".to_string(),
                    phone_number: None,
                },
            )
            .expect("employee registers");
        Principal::Employee {
            employee_id: employee.id,
            username: employee.username,
        }
    }

    pub(super) fn template(&self, company: &Principal, title: &str) -> Template {
        self.service
            .create_template(
                company,
                NewTemplateRequest {
                    title: title.to_string(),
                    description: Some("Quarterly review".to_string()),
                },
            )
            .expect("template created")
    }

    pub(super) fn assign(
        &self,
        company: &Principal,
        template: &Template,
        employees: &[&Principal],
    ) -> Vec<Assignment> {
        self.service
            .assign(
                company,
                AssignRequest {
                    template_id: template.id,
                    employee_ids: employees.iter().map(|p| employee_id(p)).collect(),
                    due_date: due_date(),
                },
            )
            .expect("assignment succeeds")
    }

    /// Company with one employee holding one open assignment.
    pub(super) fn assigned(&self) -> (Principal, Principal, Assignment) {
        let company = self.company("acme");
        let employee = self.employee(&company, "ana.ruiz");
        let template = self.template(&company, "Q4 review");
        let assignment = self
            .assign(&company, &template, &[&employee])
            .pop()
            .expect("one assignment");
        (company, employee, assignment)
    }

    pub(super) fn bearer(&self, principal: &Principal) -> String {
        let token = self.authority.issue(principal).expect("token issued");
        format!("Bearer {token}")
    }

    pub(super) fn router(&self) -> axum::Router {
        evaluation_router(self.service.clone())
    }

    pub(super) fn counts(&self) -> (usize, usize) {
        (
            self.repository.response_count().expect("responses counted"),
            self.repository.result_count().expect("results counted"),
        )
    }
}

pub(super) fn employee_id(principal: &Principal) -> EmployeeId {
    match principal {
        Principal::Employee { employee_id, .. } => *employee_id,
        Principal::Company { .. } => panic!("expected an employee principal"),
    }
}

pub(super) fn company_id(principal: &Principal) -> CompanyId {
    match principal {
        Principal::Company { company_id, .. } => *company_id,
        Principal::Employee { .. } => panic!("expected a company principal"),
    }
}

pub(super) fn due_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 15).expect("valid date")
}

pub(super) fn question_id(catalog: &Catalog, code: &str) -> QuestionId {
    catalog.question_by_code(code).expect("code in catalog").id
}

pub(super) fn answer(catalog: &Catalog, code: &str, score: i32) -> AnswerInput {
    AnswerInput {
        question_id: question_id(catalog, code),
        score,
    }
}

/// One answer per catalog question, all with the same score.
pub(super) fn uniform_answers(catalog: &Catalog, score: i32) -> Vec<AnswerInput> {
    catalog
        .questions()
        .iter()
        .map(|question| AnswerInput {
            question_id: question.id,
            score,
        })
        .collect()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Accepts a valid credential but fails every storage call.
pub(super) struct UnavailableRepository;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl EvaluationRepository for UnavailableRepository {
    fn insert_company(&self, _company: NewCompany) -> Result<Company, RepositoryError> {
        offline()
    }

    fn insert_employee(&self, _employee: NewEmployee) -> Result<Employee, RepositoryError> {
        offline()
    }

    fn company(&self, id: CompanyId) -> Result<Option<Company>, RepositoryError> {
        Ok(Some(Company {
            id,
            username: "acme".to_string(),
            email: "acme@example.com".to_string(),
            company_name: "Acme".to_string(),
            phone_number: None,
            is_active: true,
        }))
    }

    fn employee(&self, _id: EmployeeId) -> Result<Option<Employee>, RepositoryError> {
        offline()
    }

    fn companies(&self) -> Result<Vec<Company>, RepositoryError> {
        offline()
    }

    fn employees_of(&self, _company: CompanyId) -> Result<Vec<Employee>, RepositoryError> {
        offline()
    }

    fn account_taken(&self, _username: &str, _email: &str) -> Result<bool, RepositoryError> {
        offline()
    }

    fn insert_template(&self, _template: NewTemplate) -> Result<Template, RepositoryError> {
        offline()
    }

    fn template(&self, _id: TemplateId) -> Result<Option<Template>, RepositoryError> {
        offline()
    }

    fn template_by_title(
        &self,
        _company: CompanyId,
        _title: &str,
    ) -> Result<Option<Template>, RepositoryError> {
        offline()
    }

    fn templates_of(&self, _company: CompanyId) -> Result<Vec<Template>, RepositoryError> {
        offline()
    }

    fn insert_assignments(
        &self,
        _batch: Vec<NewAssignment>,
    ) -> Result<Vec<Assignment>, RepositoryError> {
        offline()
    }

    fn assignment(&self, _id: AssignmentId) -> Result<Option<Assignment>, RepositoryError> {
        offline()
    }

    fn assignments_for_employee(
        &self,
        _employee: EmployeeId,
    ) -> Result<Vec<Assignment>, RepositoryError> {
        offline()
    }

    fn incomplete_for_company(
        &self,
        _company: CompanyId,
    ) -> Result<Vec<Assignment>, RepositoryError> {
        offline()
    }

    fn responses(
        &self,
        _assignment: AssignmentId,
    ) -> Result<Vec<RecordedResponse>, RepositoryError> {
        offline()
    }

    fn commit_submission(
        &self,
        _commit: SubmissionCommit,
    ) -> Result<CalculationResult, RepositoryError> {
        offline()
    }

    fn calculation_result(
        &self,
        _assignment: AssignmentId,
    ) -> Result<Option<CalculationResult>, RepositoryError> {
        offline()
    }
}

pub(super) fn assert_open(assignment: &Assignment) {
    assert_eq!(assignment.status(), AssignmentStatus::Assigned);
    assert!(!assignment.is_completed);
    assert!(assignment.completion_date.is_none());
}
