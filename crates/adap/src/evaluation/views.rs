use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    Assignment, AssignmentId, AssignmentStatus, CategoryId, EmployeeId, QuestionId, Template,
    TemplateId,
};
use super::scoring::ScoreCard;

/// Row returned to an employee listing their own assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSummary {
    pub assignment_id: AssignmentId,
    pub template_id: TemplateId,
    pub template_title: String,
    pub status: AssignmentStatus,
    pub assigned_date: DateTime<Utc>,
    pub due_date: NaiveDate,
    pub is_completed: bool,
    pub completion_date: Option<DateTime<Utc>>,
}

impl AssignmentSummary {
    pub fn new(assignment: &Assignment, template: &Template) -> Self {
        Self {
            assignment_id: assignment.id,
            template_id: template.id,
            template_title: template.title.clone(),
            status: assignment.status(),
            assigned_date: assignment.assigned_date,
            due_date: assignment.due_date,
            is_completed: assignment.is_completed,
            completion_date: assignment.completion_date,
        }
    }
}

/// Row returned to a company listing outstanding assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDetail {
    pub assignment_id: AssignmentId,
    pub employee_id: EmployeeId,
    pub template_id: TemplateId,
    pub template_title: String,
    pub assigned_date: DateTime<Utc>,
    pub due_date: NaiveDate,
}

impl AssignmentDetail {
    pub fn new(assignment: &Assignment, template: &Template) -> Self {
        Self {
            assignment_id: assignment.id,
            employee_id: assignment.employee_id,
            template_id: template.id,
            template_title: template.title.clone(),
            assigned_date: assignment.assigned_date,
            due_date: assignment.due_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub text: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryView {
    pub id: CategoryId,
    pub name: String,
    pub group: String,
    pub questions: Vec<QuestionView>,
}

/// Questionnaire rendered to the employee for one assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentQuestionnaire {
    pub assignment_id: AssignmentId,
    pub template_title: String,
    pub due_date: NaiveDate,
    pub is_completed: bool,
    pub categories: Vec<CategoryView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedEntry {
    pub assignment_id: AssignmentId,
    pub employee_id: EmployeeId,
}

/// Response to an assignment batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentReceipt {
    pub assigned_count: usize,
    pub assignments: Vec<AssignedEntry>,
}

impl AssignmentReceipt {
    pub fn from_assignments(assignments: &[Assignment]) -> Self {
        Self {
            assigned_count: assignments.len(),
            assignments: assignments
                .iter()
                .map(|assignment| AssignedEntry {
                    assignment_id: assignment.id,
                    employee_id: assignment.employee_id,
                })
                .collect(),
        }
    }
}

/// Headline scores returned after a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub assignment_id: AssignmentId,
    pub overall_selfleadership: f64,
    pub overall_performance_score: f64,
    pub organizational_support_score: f64,
}

impl SubmissionReceipt {
    pub fn new(assignment_id: AssignmentId, scores: &ScoreCard) -> Self {
        Self {
            assignment_id,
            overall_selfleadership: scores.overall_selfleadership,
            overall_performance_score: scores.overall_performance_score,
            organizational_support_score: scores.organizational_support_score,
        }
    }
}
