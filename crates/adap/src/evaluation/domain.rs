use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::scoring::ScoreCard;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of a tenant company.
    CompanyId
);
id_type!(
    /// Identifier of an employee account.
    EmployeeId
);
id_type!(CategoryId);
id_type!(QuestionId);
id_type!(
    /// Identifier of a company-owned evaluation template.
    TemplateId
);
id_type!(
    /// Identifier of one employee's evaluation obligation.
    AssignmentId
);
id_type!(ResponseId);
id_type!(CalculationId);

/// Tenant account owning employees and templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub username: String,
    pub email: String,
    pub company_name: String,
    pub phone_number: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompany {
    pub username: String,
    pub email: String,
    pub company_name: String,
    pub phone_number: Option<String>,
}

/// Employee account; always belongs to exactly one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub company_id: CompanyId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub company_id: CompanyId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

/// Named grouping of catalog questions (e.g. group `E1`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub group: String,
}

/// Catalog question. `code` is the stable join key used by scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub code: String,
    pub category_id: CategoryId,
}

/// Company-owned evaluation definition. `(company_id, title)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub title: String,
    pub description: Option<String>,
    pub created_date: DateTime<Utc>,
    pub company_id: CompanyId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTemplate {
    pub company_id: CompanyId,
    pub title: String,
    pub description: Option<String>,
    pub created_date: DateTime<Utc>,
}

/// One employee's obligation to complete one template instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub employee_id: EmployeeId,
    pub template_id: TemplateId,
    pub assigned_date: DateTime<Utc>,
    pub due_date: NaiveDate,
    pub completion_date: Option<DateTime<Utc>>,
    pub is_completed: bool,
}

impl Assignment {
    pub fn status(&self) -> AssignmentStatus {
        if self.is_completed {
            AssignmentStatus::Completed
        } else {
            AssignmentStatus::Assigned
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssignment {
    pub employee_id: EmployeeId,
    pub template_id: TemplateId,
    pub assigned_date: DateTime<Utc>,
    pub due_date: NaiveDate,
}

/// Assignment lifecycle: `Assigned` is initial, `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Assigned,
    Completed,
}

impl AssignmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AssignmentStatus::Assigned => "assigned",
            AssignmentStatus::Completed => "completed",
        }
    }
}

/// Stored answer to one catalog question. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedResponse {
    pub id: ResponseId,
    pub assignment_id: AssignmentId,
    pub question_id: QuestionId,
    pub score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewResponse {
    pub question_id: QuestionId,
    pub score: u8,
}

/// Everything written when an assignment is completed; applied atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionCommit {
    pub assignment_id: AssignmentId,
    pub responses: Vec<NewResponse>,
    pub scores: ScoreCard,
    pub completed_at: DateTime<Utc>,
}

/// Derived scores persisted once per completed assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub id: CalculationId,
    pub assignment_id: AssignmentId,
    #[serde(flatten)]
    pub scores: ScoreCard,
}

/// Body of `POST /auth/company`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCompanyRequest {
    pub username: String,
    pub email: String,
    pub company_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Body of `POST /auth/employee`; the company comes from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployeeRequest {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTemplateRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignRequest {
    pub template_id: TemplateId,
    pub employee_ids: Vec<EmployeeId>,
    pub due_date: NaiveDate,
}

/// One submitted answer. The score stays signed so out-of-range input can be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerInput {
    pub question_id: QuestionId,
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub assignment_id: AssignmentId,
    pub answers: Vec<AnswerInput>,
}
