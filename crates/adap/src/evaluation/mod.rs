//! Evaluation templates, assignments, response intake, and weighted scoring.
//!
//! A company owns templates and employees. Assigning a template creates one obligation per
//! employee; the employee answers it once, and the answers are reduced into the fixed
//! self-leadership, performance, and organizational-support hierarchies.

pub mod catalog;
mod directory;
pub mod domain;
pub mod memory;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use catalog::{Catalog, CatalogError, CategorySeed, QuestionSeed};
pub use domain::{
    AnswerInput, AssignRequest, Assignment, AssignmentId, AssignmentStatus, CalculationResult,
    Category, CategoryId, Company, CompanyId, Employee, EmployeeId, NewCompanyRequest,
    NewEmployeeRequest, NewTemplateRequest, Question, QuestionId, RecordedResponse,
    SubmissionRequest, Template, TemplateId,
};
pub use memory::InMemoryEvaluationRepository;
pub use repository::{EvaluationRepository, RepositoryError};
pub use router::evaluation_router;
pub use scoring::{AnswerSheet, ScoreCard, ScoringEngine, WeightTable};
pub use service::{EvaluationError, EvaluationService};
pub use views::{
    AssignmentDetail, AssignmentQuestionnaire, AssignmentReceipt, AssignmentSummary,
    SubmissionReceipt,
};
