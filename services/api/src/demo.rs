use crate::infra::ApiService;
use adap::error::AppError;
use adap::evaluation::scoring::{ScoreComponent, SelfLeadershipFactor};
use adap::evaluation::{
    AnswerInput, AssignRequest, Catalog, EvaluationService, InMemoryEvaluationRepository,
    NewCompanyRequest, NewEmployeeRequest, NewTemplateRequest, Question, ScoreCard,
    SubmissionRequest,
};
use adap::identity::{Principal, TokenAuthority};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Due date for the demo assignments (YYYY-MM-DD). Defaults to two weeks from today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) due_date: Option<NaiveDate>,
    /// Print every sub-factor and factor, not only the overall scores.
    #[arg(long)]
    pub(crate) breakdown: bool,
}

struct DemoEmployee {
    principal: Principal,
    display_name: &'static str,
    answer: fn(&Question) -> i32,
}

fn steady_answer(_question: &Question) -> i32 {
    4
}

/// High self-leadership, lukewarm on organizational support.
fn self_starter_answer(question: &Question) -> i32 {
    if question.code.starts_with("Auto_") {
        5
    } else if question.code.starts_with("Apoyo_") {
        2
    } else {
        3
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        due_date,
        breakdown,
    } = args;
    let due_date = due_date.unwrap_or_else(|| Local::now().date_naive() + Duration::days(14));

    let authority = Arc::new(TokenAuthority::new(
        b"adap-demo".to_vec(),
        Duration::minutes(30),
    ));
    let service: ApiService = EvaluationService::new(
        Arc::new(InMemoryEvaluationRepository::new()),
        authority.clone(),
        Arc::new(Catalog::standard()),
    );

    println!("ADAP evaluation demo");
    let company = service.register_company(NewCompanyRequest {
        username: "andina".to_string(),
        email: "rrhh@andina.example".to_string(),
        company_name: "Comercializadora Andina".to_string(),
        phone_number: None,
    })?;
    let company = Principal::Company {
        company_id: company.id,
        username: company.username,
    };

    let employees = [
        DemoEmployee {
            principal: enroll(&service, &company, "laura.gomez", "Laura", "Gómez")?,
            display_name: "Laura Gómez",
            answer: self_starter_answer,
        },
        DemoEmployee {
            principal: enroll(&service, &company, "pedro.diaz", "Pedro", "Díaz")?,
            display_name: "Pedro Díaz",
            answer: steady_answer,
        },
    ];

    let template = service.create_template(
        &company,
        NewTemplateRequest {
            title: "Evaluación de desempeño 2024".to_string(),
            description: Some("Autoliderazgo, desempeño y apoyo organizacional".to_string()),
        },
    )?;
    let employee_ids = employees
        .iter()
        .filter_map(|employee| match &employee.principal {
            Principal::Employee { employee_id, .. } => Some(*employee_id),
            Principal::Company { .. } => None,
        })
        .collect();
    let assignments = service.assign(
        &company,
        AssignRequest {
            template_id: template.id,
            employee_ids,
            due_date,
        },
    )?;
    println!(
        "- Template '{}' assigned to {} employees (due {})",
        template.title,
        assignments.len(),
        due_date
    );
    println!(
        "- Pending before submissions: {}",
        service.list_incomplete(&company)?.len()
    );

    for (employee, assignment) in employees.iter().zip(&assignments) {
        let token = authority.issue(&employee.principal)?;
        let caller = service.authenticate(&token)?;
        let questionnaire = service.get_assignment_detail(&caller, assignment.id)?;
        let answers: Vec<AnswerInput> = questionnaire
            .categories
            .iter()
            .flat_map(|category| category.questions.iter())
            .filter_map(|view| service.catalog().question(view.id))
            .map(|question| AnswerInput {
                question_id: question.id,
                score: (employee.answer)(question),
            })
            .collect();
        let answered = answers.len();

        let receipt = service.submit(
            &caller,
            SubmissionRequest {
                assignment_id: assignment.id,
                answers,
            },
        )?;
        println!("\n{} ({} answers)", employee.display_name, answered);
        println!(
            "  Self-leadership {:.4} | Performance {:.4} | Organizational support {:.4}",
            receipt.overall_selfleadership,
            receipt.overall_performance_score,
            receipt.organizational_support_score
        );

        if breakdown {
            let result = service.get_result(&company, assignment.id)?;
            render_breakdown(&result.scores);
        }
    }

    println!(
        "\n- Pending after submissions: {}",
        service.list_incomplete(&company)?.len()
    );
    Ok(())
}

fn enroll(
    service: &ApiService,
    company: &Principal,
    username: &str,
    first_name: &str,
    last_name: &str,
) -> Result<Principal, AppError> {
    let employee = service.register_employee(
        company,
        NewEmployeeRequest {
            username: username.to_string(),
            email: format!("{username}@andina.example"),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            phone_number: None,
        },
    )?;
    Ok(Principal::Employee {
        employee_id: employee.id,
        username: employee.username,
    })
}

fn render_breakdown(scores: &ScoreCard) {
    let sub_factors: Vec<String> = ScoreComponent::ALL
        .iter()
        .map(|component| format!("{} {:.4}", component.label(), scores.component(*component)))
        .collect();
    let factors: Vec<String> = SelfLeadershipFactor::ALL
        .iter()
        .map(|factor| format!("{} {:.4}", factor.label(), scores.factor(*factor)))
        .collect();
    println!("  Sub-factors: {}", sub_factors.join(" | "));
    println!("  Factors: {}", factors.join(" | "));
}
