use super::domain::{
    Assignment, AssignmentId, CalculationResult, Company, CompanyId, Employee, EmployeeId,
    NewAssignment, NewCompany, NewEmployee, NewTemplate, QuestionId, RecordedResponse,
    SubmissionCommit, Template, TemplateId,
};

/// Storage abstraction so the service can be exercised in isolation.
///
/// Multi-row writes (`insert_assignments`, `commit_submission`) must be all-or-nothing, and
/// the uniqueness rules (account names, `(company, title)`, `(assignment, question)`) are
/// re-checked by the implementation at write time.
pub trait EvaluationRepository: Send + Sync {
    fn insert_company(&self, company: NewCompany) -> Result<Company, RepositoryError>;
    fn insert_employee(&self, employee: NewEmployee) -> Result<Employee, RepositoryError>;
    fn company(&self, id: CompanyId) -> Result<Option<Company>, RepositoryError>;
    fn employee(&self, id: EmployeeId) -> Result<Option<Employee>, RepositoryError>;
    fn companies(&self) -> Result<Vec<Company>, RepositoryError>;
    fn employees_of(&self, company: CompanyId) -> Result<Vec<Employee>, RepositoryError>;
    /// True when a company or an employee already uses the username or the email.
    fn account_taken(&self, username: &str, email: &str) -> Result<bool, RepositoryError>;

    fn insert_template(&self, template: NewTemplate) -> Result<Template, RepositoryError>;
    fn template(&self, id: TemplateId) -> Result<Option<Template>, RepositoryError>;
    fn template_by_title(
        &self,
        company: CompanyId,
        title: &str,
    ) -> Result<Option<Template>, RepositoryError>;
    fn templates_of(&self, company: CompanyId) -> Result<Vec<Template>, RepositoryError>;

    fn insert_assignments(
        &self,
        batch: Vec<NewAssignment>,
    ) -> Result<Vec<Assignment>, RepositoryError>;
    fn assignment(&self, id: AssignmentId) -> Result<Option<Assignment>, RepositoryError>;
    fn assignments_for_employee(
        &self,
        employee: EmployeeId,
    ) -> Result<Vec<Assignment>, RepositoryError>;
    /// Not-completed assignments under templates owned by `company`.
    fn incomplete_for_company(&self, company: CompanyId)
        -> Result<Vec<Assignment>, RepositoryError>;

    fn responses(&self, assignment: AssignmentId) -> Result<Vec<RecordedResponse>, RepositoryError>;
    /// Writes responses, the calculation result and the completion flip as one unit.
    fn commit_submission(
        &self,
        commit: SubmissionCommit,
    ) -> Result<CalculationResult, RepositoryError>;
    fn calculation_result(
        &self,
        assignment: AssignmentId,
    ) -> Result<Option<CalculationResult>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists: {0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("assignment {0} is already completed")]
    AlreadyCompleted(AssignmentId),
    #[error("assignment {assignment_id} already has a response for question {question_id}")]
    DuplicateResponse {
        assignment_id: AssignmentId,
        question_id: QuestionId,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
