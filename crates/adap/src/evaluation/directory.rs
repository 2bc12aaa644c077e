//! Account registration and listing for companies and their employees.

use std::ops::RangeInclusive;

use tracing::info;

use super::domain::{
    Company, Employee, NewCompany, NewCompanyRequest, NewEmployee, NewEmployeeRequest,
};
use super::repository::{EvaluationRepository, RepositoryError};
use super::service::{require_company, EvaluationError, EvaluationService};
use crate::identity::{IdentityProvider, Principal};

const USERNAME_LENGTH: RangeInclusive<usize> = 3..=50;
const COMPANY_NAME_LENGTH: RangeInclusive<usize> = 2..=100;
const PERSON_NAME_LENGTH: RangeInclusive<usize> = 1..=50;

fn checked_length(
    field: &'static str,
    value: &str,
    bounds: RangeInclusive<usize>,
) -> Result<String, EvaluationError> {
    let value = value.trim();
    let length = value.chars().count();
    if bounds.contains(&length) {
        Ok(value.to_string())
    } else {
        Err(EvaluationError::InvalidInput {
            field,
            reason: format!(
                "must be between {} and {} characters",
                bounds.start(),
                bounds.end()
            ),
        })
    }
}

fn checked_email(email: &str) -> Result<String, EvaluationError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
            Ok(email.to_string())
        }
        _ => Err(EvaluationError::InvalidInput {
            field: "email",
            reason: "must be an email address".to_string(),
        }),
    }
}

/// Digits and spaces with an optional leading `+`. Blank numbers are stored as absent.
fn checked_phone(phone: Option<String>) -> Result<Option<String>, EvaluationError> {
    let Some(phone) = phone else {
        return Ok(None);
    };
    let phone = phone.trim();
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if !digits
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_whitespace())
    {
        return Err(EvaluationError::InvalidInput {
            field: "phone_number",
            reason: "may only contain digits and spaces after an optional leading +".to_string(),
        });
    }
    Ok(Some(phone.to_string()).filter(|phone| !phone.is_empty()))
}

fn account_conflict(username: &str) -> impl FnOnce(RepositoryError) -> EvaluationError + '_ {
    move |err| match err {
        RepositoryError::Conflict(_) => EvaluationError::DuplicateAccount {
            username: username.to_string(),
        },
        other => other.into(),
    }
}

impl<R, I> EvaluationService<R, I>
where
    R: EvaluationRepository + 'static,
    I: IdentityProvider + 'static,
{
    pub fn register_company(&self, request: NewCompanyRequest) -> Result<Company, EvaluationError> {
        let username = checked_length("username", &request.username, USERNAME_LENGTH)?;
        let company_name =
            checked_length("company_name", &request.company_name, COMPANY_NAME_LENGTH)?;
        let email = checked_email(&request.email)?;
        let phone_number = checked_phone(request.phone_number)?;
        self.ensure_account_free(&username, &email)?;

        let company = self
            .repository
            .insert_company(NewCompany {
                username: username.clone(),
                email,
                company_name,
                phone_number,
            })
            .map_err(account_conflict(&username))?;
        info!(company_id = %company.id, "company registered");
        Ok(company)
    }

    /// Onboard an employee into the caller's company.
    pub fn register_employee(
        &self,
        principal: &Principal,
        request: NewEmployeeRequest,
    ) -> Result<Employee, EvaluationError> {
        let company_id = require_company(principal)?;
        let username = checked_length("username", &request.username, USERNAME_LENGTH)?;
        let first_name = checked_length("first_name", &request.first_name, PERSON_NAME_LENGTH)?;
        let last_name = checked_length("last_name", &request.last_name, PERSON_NAME_LENGTH)?;
        let email = checked_email(&request.email)?;
        let phone_number = checked_phone(request.phone_number)?;
        self.ensure_account_free(&username, &email)?;

        let employee = self
            .repository
            .insert_employee(NewEmployee {
                company_id,
                username: username.clone(),
                email,
                first_name,
                last_name,
                phone_number,
            })
            .map_err(account_conflict(&username))?;
        info!(%company_id, employee_id = %employee.id, "employee registered");
        Ok(employee)
    }

    pub fn list_companies(&self) -> Result<Vec<Company>, EvaluationError> {
        let companies = self.repository.companies()?;
        if companies.is_empty() {
            return Err(EvaluationError::not_found("companies", "registered"));
        }
        Ok(companies)
    }

    pub fn list_employees(&self, principal: &Principal) -> Result<Vec<Employee>, EvaluationError> {
        let company_id = require_company(principal)?;
        let employees = self.repository.employees_of(company_id)?;
        if employees.is_empty() {
            return Err(EvaluationError::not_found("employees for company", company_id));
        }
        Ok(employees)
    }

    fn ensure_account_free(&self, username: &str, email: &str) -> Result<(), EvaluationError> {
        if self.repository.account_taken(username, email)? {
            return Err(EvaluationError::DuplicateAccount {
                username: username.to_string(),
            });
        }
        Ok(())
    }
}
