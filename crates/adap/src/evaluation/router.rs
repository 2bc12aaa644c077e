use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use super::domain::{
    AssignRequest, AssignmentId, NewCompanyRequest, NewEmployeeRequest, NewTemplateRequest,
    SubmissionRequest, TemplateId,
};
use super::repository::EvaluationRepository;
use super::service::{EvaluationError, EvaluationService};
use super::views::AssignmentReceipt;
use crate::identity::{bearer_token, IdentityError, IdentityProvider, Principal};

/// Router builder exposing the account, template, assignment, and submission endpoints.
pub fn evaluation_router<R, I>(service: Arc<EvaluationService<R, I>>) -> Router
where
    R: EvaluationRepository + 'static,
    I: IdentityProvider + 'static,
{
    Router::new()
        .route("/auth/company", post(register_company_handler::<R, I>))
        .route("/auth/employee", post(register_employee_handler::<R, I>))
        .route("/user/companies", get(list_companies_handler::<R, I>))
        .route("/user/employees", get(list_employees_handler::<R, I>))
        .route(
            "/evaluation/templates",
            post(create_template_handler::<R, I>).get(list_templates_handler::<R, I>),
        )
        .route(
            "/evaluation/templates/:template_id",
            get(get_template_handler::<R, I>),
        )
        .route("/evaluation/assign", post(assign_handler::<R, I>))
        .route("/evaluation/assigned", get(assigned_handler::<R, I>))
        .route("/evaluation/incomplete", get(incomplete_handler::<R, I>))
        .route("/evaluation/submit", post(submit_handler::<R, I>))
        .route(
            "/evaluation/:assignment_id",
            get(assignment_detail_handler::<R, I>),
        )
        .route(
            "/evaluation/:assignment_id/result",
            get(result_handler::<R, I>),
        )
        .with_state(service)
}

type SharedService<R, I> = State<Arc<EvaluationService<R, I>>>;

fn principal<R, I>(
    service: &EvaluationService<R, I>,
    headers: &HeaderMap,
) -> Result<Principal, EvaluationError>
where
    R: EvaluationRepository + 'static,
    I: IdentityProvider + 'static,
{
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or(IdentityError::InvalidCredential)?;
    service.authenticate(bearer)
}

/// Malformed or mistyped bodies become `invalid_input` with serde's path in the message.
fn json_body<T>(payload: Result<axum::Json<T>, JsonRejection>) -> Result<T, EvaluationError> {
    payload
        .map(|axum::Json(body)| body)
        .map_err(|rejection| EvaluationError::InvalidInput {
            field: "body",
            reason: rejection.body_text(),
        })
}

pub(crate) fn status_for(error: &EvaluationError) -> StatusCode {
    match error {
        EvaluationError::NotFound { .. } | EvaluationError::UnknownQuestion { .. } => {
            StatusCode::NOT_FOUND
        }
        EvaluationError::Forbidden { .. } => StatusCode::FORBIDDEN,
        EvaluationError::Identity(IdentityError::LifetimeOverflow) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EvaluationError::Identity(_) => StatusCode::UNAUTHORIZED,
        EvaluationError::DuplicateTemplate { .. }
        | EvaluationError::AlreadyCompleted { .. }
        | EvaluationError::DuplicateAnswer { .. }
        | EvaluationError::DuplicateAccount { .. } => StatusCode::CONFLICT,
        EvaluationError::ScoreOutOfRange { .. } | EvaluationError::InvalidInput { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EvaluationError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_response(error: EvaluationError) -> Response {
    let status = status_for(&error);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %error, "evaluation request failed");
    }

    let mut payload = json!({
        "error": error.kind(),
        "message": error.to_string(),
    });
    let detail = match &error {
        EvaluationError::NotFound { entity, id } => json!({ "entity": entity, "id": id }),
        EvaluationError::Forbidden { required } => json!({ "required_role": required.label() }),
        EvaluationError::DuplicateTemplate { title } => json!({ "title": title }),
        EvaluationError::AlreadyCompleted { assignment_id } => {
            json!({ "assignment_id": assignment_id })
        }
        EvaluationError::DuplicateAnswer { question_id }
        | EvaluationError::UnknownQuestion { question_id } => {
            json!({ "question_id": question_id })
        }
        EvaluationError::ScoreOutOfRange { question_id, score } => {
            json!({ "question_id": question_id, "score": score })
        }
        EvaluationError::InvalidInput { field, .. } => json!({ "field": field }),
        EvaluationError::DuplicateAccount { username } => json!({ "username": username }),
        EvaluationError::Identity(_) | EvaluationError::Repository(_) => Value::Null,
    };
    if let (Value::Object(body), Value::Object(extra)) = (&mut payload, detail) {
        body.extend(extra);
    }
    (status, axum::Json(payload)).into_response()
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, EvaluationError>) -> Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_company_handler<R, I>(
    State(service): SharedService<R, I>,
    payload: Result<axum::Json<NewCompanyRequest>, JsonRejection>,
) -> Response
where
    R: EvaluationRepository + 'static,
    I: IdentityProvider + 'static,
{
    let result = json_body(payload)
        .and_then(|request| service.register_company(request))
        .map(|company| json!({ "company_id": company.id }));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn register_employee_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
    payload: Result<axum::Json<NewEmployeeRequest>, JsonRejection>,
) -> Response
where
    R: EvaluationRepository + 'static,
    I: IdentityProvider + 'static,
{
    let result = principal(&service, &headers)
        .and_then(|caller| {
            let request = json_body(payload)?;
            service.register_employee(&caller, request)
        })
        .map(|employee| json!({ "employee_id": employee.id }));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn list_companies_handler<R, I>(State(service): SharedService<R, I>) -> Response
where
    R: EvaluationRepository + 'static,
    I: IdentityProvider + 'static,
{
    respond(StatusCode::OK, service.list_companies())
}

pub(crate) async fn list_employees_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
) -> Response
where
    R: EvaluationRepository + 'static,
    I: IdentityProvider + 'static,
{
    let result =
        principal(&service, &headers).and_then(|caller| service.list_employees(&caller));
    respond(StatusCode::OK, result)
}

pub(crate) async fn create_template_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
    payload: Result<axum::Json<NewTemplateRequest>, JsonRejection>,
) -> Response
where
    R: EvaluationRepository + 'static,
    I: IdentityProvider + 'static,
{
    let result = principal(&service, &headers)
        .and_then(|caller| {
            let request = json_body(payload)?;
            service.create_template(&caller, request)
        });
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn list_templates_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
) -> Response
where
    R: EvaluationRepository + 'static,
    I: IdentityProvider + 'static,
{
    let result =
        principal(&service, &headers).and_then(|caller| service.list_templates(&caller));
    respond(StatusCode::OK, result)
}

pub(crate) async fn get_template_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
    Path(template_id): Path<TemplateId>,
) -> Response
where
    R: EvaluationRepository + 'static,
    I: IdentityProvider + 'static,
{
    let result = principal(&service, &headers)
        .and_then(|caller| service.get_template(&caller, template_id));
    respond(StatusCode::OK, result)
}

pub(crate) async fn assign_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
    payload: Result<axum::Json<AssignRequest>, JsonRejection>,
) -> Response
where
    R: EvaluationRepository + 'static,
    I: IdentityProvider + 'static,
{
    let result = principal(&service, &headers)
        .and_then(|caller| {
            let request = json_body(payload)?;
            service.assign(&caller, request)
        })
        .map(|assignments| AssignmentReceipt::from_assignments(&assignments));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn assigned_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
) -> Response
where
    R: EvaluationRepository + 'static,
    I: IdentityProvider + 'static,
{
    let result = principal(&service, &headers)
        .and_then(|caller| service.list_assigned_to_employee(&caller));
    respond(StatusCode::OK, result)
}

pub(crate) async fn incomplete_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
) -> Response
where
    R: EvaluationRepository + 'static,
    I: IdentityProvider + 'static,
{
    let result =
        principal(&service, &headers).and_then(|caller| service.list_incomplete(&caller));
    respond(StatusCode::OK, result)
}

pub(crate) async fn assignment_detail_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
    Path(assignment_id): Path<AssignmentId>,
) -> Response
where
    R: EvaluationRepository + 'static,
    I: IdentityProvider + 'static,
{
    let result = principal(&service, &headers)
        .and_then(|caller| service.get_assignment_detail(&caller, assignment_id));
    respond(StatusCode::OK, result)
}

pub(crate) async fn result_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
    Path(assignment_id): Path<AssignmentId>,
) -> Response
where
    R: EvaluationRepository + 'static,
    I: IdentityProvider + 'static,
{
    let result = principal(&service, &headers)
        .and_then(|caller| service.get_result(&caller, assignment_id));
    respond(StatusCode::OK, result)
}

pub(crate) async fn submit_handler<R, I>(
    State(service): SharedService<R, I>,
    headers: HeaderMap,
    payload: Result<axum::Json<SubmissionRequest>, JsonRejection>,
) -> Response
where
    R: EvaluationRepository + 'static,
    I: IdentityProvider + 'static,
{
    let result = principal(&service, &headers).and_then(|caller| {
        let request = json_body(payload)?;
        service.submit(&caller, request)
    });
    respond(StatusCode::CREATED, result)
}
