use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::catalog::Catalog;
use super::domain::{
    Assignment, AssignmentId, AssignRequest, CalculationResult, CompanyId, EmployeeId,
    NewAssignment, NewResponse, NewTemplate, NewTemplateRequest, QuestionId, SubmissionCommit,
    SubmissionRequest, Template, TemplateId,
};
use super::repository::{EvaluationRepository, RepositoryError};
use super::scoring::{AnswerSheet, ScoreCard, ScoringEngine};
use super::views::{
    AssignmentDetail, AssignmentQuestionnaire, AssignmentSummary, CategoryView, QuestionView,
    SubmissionReceipt,
};
use crate::identity::{IdentityError, IdentityProvider, Principal, Role};

pub(crate) const MAX_SCORE: u8 = 5;

/// Service composing the catalog, repository, identity provider, and scoring engine.
pub struct EvaluationService<R, I> {
    pub(super) repository: Arc<R>,
    identity: Arc<I>,
    catalog: Arc<Catalog>,
    engine: ScoringEngine,
}

impl<R, I> EvaluationService<R, I>
where
    R: EvaluationRepository + 'static,
    I: IdentityProvider + 'static,
{
    pub fn new(repository: Arc<R>, identity: Arc<I>, catalog: Arc<Catalog>) -> Self {
        Self::with_engine(repository, identity, catalog, ScoringEngine::default())
    }

    pub fn with_engine(
        repository: Arc<R>,
        identity: Arc<I>,
        catalog: Arc<Catalog>,
        engine: ScoringEngine,
    ) -> Self {
        Self {
            repository,
            identity,
            catalog,
            engine,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Resolve a bearer credential and confirm the account still exists.
    pub fn authenticate(&self, bearer: &str) -> Result<Principal, EvaluationError> {
        let principal = self.identity.authenticate(bearer)?;
        let known = match &principal {
            Principal::Company { company_id, .. } => {
                self.repository.company(*company_id)?.is_some()
            }
            Principal::Employee { employee_id, .. } => {
                self.repository.employee(*employee_id)?.is_some()
            }
        };
        if !known {
            warn!(role = principal.role().label(), "credential for a missing account");
            return Err(IdentityError::UnknownPrincipal(principal.role().label()).into());
        }
        Ok(principal)
    }

    pub fn create_template(
        &self,
        principal: &Principal,
        request: NewTemplateRequest,
    ) -> Result<Template, EvaluationError> {
        let company_id = require_company(principal)?;
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(EvaluationError::InvalidInput {
                field: "title",
                reason: "must not be empty".to_string(),
            });
        }
        if self
            .repository
            .template_by_title(company_id, &title)?
            .is_some()
        {
            return Err(EvaluationError::DuplicateTemplate { title });
        }

        let template = self
            .repository
            .insert_template(NewTemplate {
                company_id,
                title: title.clone(),
                description: request.description,
                created_date: Utc::now(),
            })
            .map_err(|err| match err {
                RepositoryError::Conflict(_) => EvaluationError::DuplicateTemplate { title },
                other => other.into(),
            })?;
        info!(%company_id, template_id = %template.id, "template created");
        Ok(template)
    }

    /// Templates owned by the caller; an empty registry is reported as `NotFound`.
    pub fn list_templates(&self, principal: &Principal) -> Result<Vec<Template>, EvaluationError> {
        let company_id = require_company(principal)?;
        let templates = self.repository.templates_of(company_id)?;
        if templates.is_empty() {
            return Err(EvaluationError::not_found("templates for company", company_id));
        }
        Ok(templates)
    }

    pub fn get_template(
        &self,
        principal: &Principal,
        template_id: TemplateId,
    ) -> Result<Template, EvaluationError> {
        let company_id = require_company(principal)?;
        self.owned_template(company_id, template_id)
    }

    /// Create one assignment per distinct employee, all or none.
    pub fn assign(
        &self,
        principal: &Principal,
        request: AssignRequest,
    ) -> Result<Vec<Assignment>, EvaluationError> {
        let company_id = require_company(principal)?;
        let template = self.owned_template(company_id, request.template_id)?;

        let mut seen = HashSet::new();
        let employees: Vec<EmployeeId> = request
            .employee_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        for employee_id in &employees {
            let owned = self
                .repository
                .employee(*employee_id)?
                .is_some_and(|employee| employee.company_id == company_id);
            if !owned {
                return Err(EvaluationError::not_found("employee", *employee_id));
            }
        }

        let assigned_date = Utc::now();
        let batch = employees
            .into_iter()
            .map(|employee_id| NewAssignment {
                employee_id,
                template_id: template.id,
                assigned_date,
                due_date: request.due_date,
            })
            .collect();
        let assignments = self.repository.insert_assignments(batch)?;
        info!(
            %company_id,
            template_id = %template.id,
            count = assignments.len(),
            "template assigned"
        );
        Ok(assignments)
    }

    pub fn list_assigned_to_employee(
        &self,
        principal: &Principal,
    ) -> Result<Vec<AssignmentSummary>, EvaluationError> {
        let employee_id = require_employee(principal)?;
        self.repository
            .assignments_for_employee(employee_id)?
            .iter()
            .map(|assignment| {
                self.template_of(assignment)
                    .map(|template| AssignmentSummary::new(assignment, &template))
            })
            .collect()
    }

    pub fn list_incomplete(
        &self,
        principal: &Principal,
    ) -> Result<Vec<AssignmentDetail>, EvaluationError> {
        let company_id = require_company(principal)?;
        self.repository
            .incomplete_for_company(company_id)?
            .iter()
            .map(|assignment| {
                self.template_of(assignment)
                    .map(|template| AssignmentDetail::new(assignment, &template))
            })
            .collect()
    }

    /// The questionnaire for an assignment. Every assignment renders the whole catalog.
    pub fn get_assignment_detail(
        &self,
        principal: &Principal,
        assignment_id: AssignmentId,
    ) -> Result<AssignmentQuestionnaire, EvaluationError> {
        let (assignment, template) = self.visible_assignment(principal, assignment_id)?;
        let categories = self
            .catalog
            .categories()
            .iter()
            .map(|category| CategoryView {
                id: category.id,
                name: category.name.clone(),
                group: category.group.clone(),
                questions: self
                    .catalog
                    .questions_in(category.id)
                    .map(|question| QuestionView {
                        id: question.id,
                        text: question.text.clone(),
                        code: question.code.clone(),
                    })
                    .collect(),
            })
            .collect();

        Ok(AssignmentQuestionnaire {
            assignment_id: assignment.id,
            template_title: template.title,
            due_date: assignment.due_date,
            is_completed: assignment.is_completed,
            categories,
        })
    }

    pub fn get_result(
        &self,
        principal: &Principal,
        assignment_id: AssignmentId,
    ) -> Result<CalculationResult, EvaluationError> {
        let (assignment, _) = self.visible_assignment(principal, assignment_id)?;
        self.repository
            .calculation_result(assignment.id)?
            .ok_or_else(|| EvaluationError::not_found("calculation result", assignment.id))
    }

    /// Recompute scores from stored responses without persisting anything.
    pub fn score(
        &self,
        principal: &Principal,
        assignment_id: AssignmentId,
    ) -> Result<ScoreCard, EvaluationError> {
        let (assignment, _) = self.visible_assignment(principal, assignment_id)?;
        let responses = self.repository.responses(assignment.id)?;
        let sheet = AnswerSheet::from_responses(&responses, &self.catalog);
        Ok(self.engine.score(&sheet))
    }

    /// Record a batch of answers, score the assignment, and mark it completed.
    pub fn submit(
        &self,
        principal: &Principal,
        request: SubmissionRequest,
    ) -> Result<SubmissionReceipt, EvaluationError> {
        let employee_id = require_employee(principal)?;
        let assignment = self
            .repository
            .assignment(request.assignment_id)?
            .filter(|assignment| assignment.employee_id == employee_id)
            .ok_or_else(|| EvaluationError::not_found("assignment", request.assignment_id))?;
        if assignment.is_completed {
            return Err(EvaluationError::AlreadyCompleted {
                assignment_id: assignment.id,
            });
        }

        let mut codes = Vec::with_capacity(request.answers.len());
        for answer in &request.answers {
            let question = self.catalog.question(answer.question_id).ok_or(
                EvaluationError::UnknownQuestion {
                    question_id: answer.question_id,
                },
            )?;
            codes.push(question.code.as_str());
        }

        let mut accepted = Vec::with_capacity(request.answers.len());
        for answer in &request.answers {
            let score = u8::try_from(answer.score)
                .ok()
                .filter(|score| *score <= MAX_SCORE)
                .ok_or(EvaluationError::ScoreOutOfRange {
                    question_id: answer.question_id,
                    score: answer.score,
                })?;
            accepted.push(NewResponse {
                question_id: answer.question_id,
                score,
            });
        }

        let existing = self.repository.responses(assignment.id)?;
        let mut answered: HashSet<QuestionId> =
            existing.iter().map(|response| response.question_id).collect();
        for response in &accepted {
            if !answered.insert(response.question_id) {
                return Err(EvaluationError::DuplicateAnswer {
                    question_id: response.question_id,
                });
            }
        }

        let mut sheet = AnswerSheet::from_responses(&existing, &self.catalog);
        for (code, response) in codes.iter().zip(&accepted) {
            sheet.record(code, response.score);
        }
        let scores = self.engine.score(&sheet);

        let result = self.repository.commit_submission(SubmissionCommit {
            assignment_id: assignment.id,
            responses: accepted,
            scores,
            completed_at: Utc::now(),
        })?;
        info!(
            %employee_id,
            assignment_id = %assignment.id,
            answers = request.answers.len(),
            overall_selfleadership = result.scores.overall_selfleadership,
            "assignment completed"
        );
        Ok(SubmissionReceipt::new(assignment.id, &result.scores))
    }

    fn owned_template(
        &self,
        company_id: CompanyId,
        template_id: TemplateId,
    ) -> Result<Template, EvaluationError> {
        self.repository
            .template(template_id)?
            .filter(|template| template.company_id == company_id)
            .ok_or_else(|| EvaluationError::not_found("template", template_id))
    }

    fn template_of(&self, assignment: &Assignment) -> Result<Template, EvaluationError> {
        self.repository
            .template(assignment.template_id)?
            .ok_or_else(|| EvaluationError::not_found("template", assignment.template_id))
    }

    /// Owning employee, or the company owning the template; anyone else sees `NotFound`.
    fn visible_assignment(
        &self,
        principal: &Principal,
        assignment_id: AssignmentId,
    ) -> Result<(Assignment, Template), EvaluationError> {
        let missing = || EvaluationError::not_found("assignment", assignment_id);
        let assignment = self.repository.assignment(assignment_id)?.ok_or_else(missing)?;
        let template = self.template_of(&assignment)?;
        let visible = match principal {
            Principal::Employee { employee_id, .. } => assignment.employee_id == *employee_id,
            Principal::Company { company_id, .. } => template.company_id == *company_id,
        };
        if !visible {
            return Err(missing());
        }
        Ok((assignment, template))
    }
}

pub(crate) fn require_company(principal: &Principal) -> Result<CompanyId, EvaluationError> {
    match principal {
        Principal::Company { company_id, .. } => Ok(*company_id),
        Principal::Employee { .. } => Err(EvaluationError::Forbidden {
            required: Role::Company,
        }),
    }
}

pub(crate) fn require_employee(principal: &Principal) -> Result<EmployeeId, EvaluationError> {
    match principal {
        Principal::Employee { employee_id, .. } => Ok(*employee_id),
        Principal::Company { .. } => Err(EvaluationError::Forbidden {
            required: Role::Employee,
        }),
    }
}

/// Error raised by the evaluation service.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("operation requires the {} role", .required.label())]
    Forbidden { required: Role },
    #[error("template {title:?} already exists")]
    DuplicateTemplate { title: String },
    #[error("assignment {assignment_id} is already completed")]
    AlreadyCompleted { assignment_id: AssignmentId },
    #[error("question {question_id} is already answered")]
    DuplicateAnswer { question_id: QuestionId },
    #[error("question {question_id} is not in the catalog")]
    UnknownQuestion { question_id: QuestionId },
    #[error("score {score} for question {question_id} is outside 0..=5")]
    ScoreOutOfRange { question_id: QuestionId, score: i32 },
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    #[error("username or email already registered for {username:?}")]
    DuplicateAccount { username: String },
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl EvaluationError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        EvaluationError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable name of the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            EvaluationError::NotFound { .. } => "not_found",
            EvaluationError::Forbidden { .. } => "forbidden",
            EvaluationError::DuplicateTemplate { .. } => "duplicate_template",
            EvaluationError::AlreadyCompleted { .. } => "already_completed",
            EvaluationError::DuplicateAnswer { .. } => "duplicate_answer",
            EvaluationError::UnknownQuestion { .. } => "unknown_question",
            EvaluationError::ScoreOutOfRange { .. } => "score_out_of_range",
            EvaluationError::InvalidInput { .. } => "invalid_input",
            EvaluationError::DuplicateAccount { .. } => "duplicate_account",
            EvaluationError::Identity(IdentityError::InvalidCredential) => "invalid_credential",
            EvaluationError::Identity(IdentityError::Expired) => "credential_expired",
            EvaluationError::Identity(IdentityError::UnknownPrincipal(_)) => "unknown_principal",
            EvaluationError::Identity(IdentityError::LifetimeOverflow) => "token_lifetime",
            EvaluationError::Repository(_) => "repository",
        }
    }
}

impl From<RepositoryError> for EvaluationError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::AlreadyCompleted(assignment_id) => {
                EvaluationError::AlreadyCompleted { assignment_id }
            }
            RepositoryError::DuplicateResponse { question_id, .. } => {
                EvaluationError::DuplicateAnswer { question_id }
            }
            other => EvaluationError::Repository(other),
        }
    }
}
