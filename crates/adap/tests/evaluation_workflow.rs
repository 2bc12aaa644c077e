//! End-to-end checks of the template → assignment → submission → score workflow.
//!
//! Scenarios only use the public service facade, so tenancy, atomicity, and scoring are
//! validated the way the HTTP layer sees them.

mod common {
    use std::sync::Arc;

    use chrono::{Duration, NaiveDate};

    use adap::evaluation::{
        AnswerInput, AssignRequest, Assignment, Catalog, EvaluationService,
        InMemoryEvaluationRepository, NewCompanyRequest, NewEmployeeRequest, NewTemplateRequest,
        Template,
    };
    use adap::identity::{Principal, TokenAuthority};

    pub(super) type Service = EvaluationService<InMemoryEvaluationRepository, TokenAuthority>;

    pub(super) fn build_service() -> (Arc<Service>, Arc<InMemoryEvaluationRepository>) {
        let repository = Arc::new(InMemoryEvaluationRepository::new());
        let service = Arc::new(EvaluationService::new(
            repository.clone(),
            Arc::new(TokenAuthority::new(
                b"workflow-secret".to_vec(),
                Duration::minutes(30),
            )),
            Arc::new(Catalog::standard()),
        ));
        (service, repository)
    }

    pub(super) fn company(service: &Service, username: &str) -> Principal {
        let company = service
            .register_company(NewCompanyRequest {
                username: username.to_string(),
                email: format!("rrhh@{username}.example"),
                company_name: format!("{username} S.A."),
                phone_number: Some("+57 300 000 0000".to_string()),
            })
            .expect("company registers");
        Principal::Company {
            company_id: company.id,
            username: company.username,
        }
    }

    pub(super) fn employee(service: &Service, company: &Principal, username: &str) -> Principal {
        let employee = service
            .register_employee(
                company,
                NewEmployeeRequest {
                    username: username.to_string(),
                    email: format!("{username}@mail.example"),
                    first_name: "Laura".to_string(),
                    last_name: "Gómez".to_string(),
                    phone_number: None,
                },
            )
            .expect("employee registers");
        Principal::Employee {
            employee_id: employee.id,
            username: employee.username,
        }
    }

    pub(super) fn template(service: &Service, company: &Principal, title: &str) -> Template {
        service
            .create_template(
                company,
                NewTemplateRequest {
                    title: title.to_string(),
                    description: None,
                },
            )
            .expect("template created")
    }

    pub(super) fn assign(
        service: &Service,
        company: &Principal,
        template: &Template,
        employees: &[&Principal],
    ) -> Vec<Assignment> {
        let employee_ids = employees
            .iter()
            .map(|principal| match principal {
                Principal::Employee { employee_id, .. } => *employee_id,
                Principal::Company { .. } => panic!("employees only"),
            })
            .collect();
        service
            .assign(
                company,
                AssignRequest {
                    template_id: template.id,
                    employee_ids,
                    due_date: NaiveDate::from_ymd_opt(2025, 1, 31).expect("valid date"),
                },
            )
            .expect("assignment succeeds")
    }

    pub(super) fn answers(catalog: &Catalog, score: i32) -> Vec<AnswerInput> {
        catalog
            .questions()
            .iter()
            .map(|question| AnswerInput {
                question_id: question.id,
                score,
            })
            .collect()
    }
}

use std::sync::Arc;
use std::thread;

use adap::evaluation::{EvaluationError, EvaluationRepository, SubmissionRequest};
use common::*;

#[test]
fn completed_evaluations_produce_one_result_each() {
    let (service, repository) = build_service();
    let acme = company(&service, "acme");
    let laura = employee(&service, &acme, "laura.gomez");
    let pedro = employee(&service, &acme, "pedro.diaz");
    let review = template(&service, &acme, "Evaluación anual");
    let assignments = assign(&service, &acme, &review, &[&laura, &pedro]);
    assert_eq!(assignments.len(), 2);

    let low = service
        .submit(
            &laura,
            SubmissionRequest {
                assignment_id: assignments[0].id,
                answers: answers(service.catalog(), 1),
            },
        )
        .expect("laura submits");
    let high = service
        .submit(
            &pedro,
            SubmissionRequest {
                assignment_id: assignments[1].id,
                answers: answers(service.catalog(), 5),
            },
        )
        .expect("pedro submits");

    assert!((high.overall_selfleadership - 5.0 * low.overall_selfleadership).abs() < 1e-9);
    assert!(
        (high.organizational_support_score - 5.0 * low.organizational_support_score).abs() < 1e-9
    );
    assert_eq!(repository.response_count().unwrap(), 84);
    assert_eq!(repository.result_count().unwrap(), 2);
    assert!(service.list_incomplete(&acme).unwrap().is_empty());

    for assignment in &assignments {
        let stored = repository.assignment(assignment.id).unwrap().unwrap();
        assert!(stored.is_completed);
        assert!(stored.completion_date.is_some());
    }
}

#[test]
fn tenants_cannot_see_each_others_assignments() {
    let (service, _) = build_service();
    let acme = company(&service, "acme");
    let globex = company(&service, "globex");
    let laura = employee(&service, &acme, "laura.gomez");
    let review = template(&service, &acme, "Evaluación anual");
    let assignment = assign(&service, &acme, &review, &[&laura]).remove(0);

    let error = service
        .get_assignment_detail(&globex, assignment.id)
        .expect_err("foreign company");
    assert_eq!(error.kind(), "not_found");

    let error = service
        .assign(
            &globex,
            adap::evaluation::AssignRequest {
                template_id: review.id,
                employee_ids: vec![assignment.employee_id],
                due_date: assignment.due_date,
            },
        )
        .expect_err("foreign template");
    assert_eq!(error.kind(), "not_found");

    let error = service
        .get_template(&globex, review.id)
        .expect_err("foreign template");
    assert_eq!(error.kind(), "not_found");
}

#[test]
fn rejected_resubmission_leaves_the_ledger_untouched() {
    let (service, repository) = build_service();
    let acme = company(&service, "acme");
    let laura = employee(&service, &acme, "laura.gomez");
    let review = template(&service, &acme, "Evaluación anual");
    let assignment = assign(&service, &acme, &review, &[&laura]).remove(0);

    service
        .submit(
            &laura,
            SubmissionRequest {
                assignment_id: assignment.id,
                answers: answers(service.catalog(), 3),
            },
        )
        .expect("first submission");
    let first = service.get_result(&laura, assignment.id).unwrap();

    let error = service
        .submit(
            &laura,
            SubmissionRequest {
                assignment_id: assignment.id,
                answers: answers(service.catalog(), 5),
            },
        )
        .expect_err("already completed");
    assert!(matches!(error, EvaluationError::AlreadyCompleted { .. }));
    assert_eq!(repository.response_count().unwrap(), 42);
    assert_eq!(repository.result_count().unwrap(), 1);
    assert_eq!(service.get_result(&laura, assignment.id).unwrap(), first);
}

#[test]
fn concurrent_submissions_complete_an_assignment_once() {
    let (service, repository) = build_service();
    let acme = company(&service, "acme");
    let laura = employee(&service, &acme, "laura.gomez");
    let review = template(&service, &acme, "Evaluación anual");
    let assignment = assign(&service, &acme, &review, &[&laura]).remove(0);

    let handles: Vec<_> = (0..8)
        .map(|attempt| {
            let service = Arc::clone(&service);
            let laura = laura.clone();
            thread::spawn(move || {
                service.submit(
                    &laura,
                    SubmissionRequest {
                        assignment_id: assignment.id,
                        answers: answers(service.catalog(), attempt % 6),
                    },
                )
            })
        })
        .collect();

    let outcomes: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread completes"))
        .collect();
    let successes = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(outcomes
        .iter()
        .filter_map(|outcome| outcome.as_ref().err())
        .all(|error| matches!(
            error,
            EvaluationError::AlreadyCompleted { .. } | EvaluationError::DuplicateAnswer { .. }
        )));
    assert_eq!(repository.response_count().unwrap(), 42);
    assert_eq!(repository.result_count().unwrap(), 1);
}
