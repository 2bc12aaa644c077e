use crate::demo::{run_demo, DemoArgs};
use crate::server;
use adap::config::AppConfig;
use adap::error::AppError;
use adap::evaluation::{CompanyId, EmployeeId};
use adap::identity::{IdentityError, Principal, TokenAuthority};
use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "adap-api",
    about = "Run the ADAP evaluation service or exercise it from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the evaluation API over HTTP (used when no subcommand is given)
    Serve(ServeArgs),
    /// Mint a bearer token signed with the configured secret
    Token(TokenArgs),
    /// Run the template, assignment, and scoring workflow against in-memory storage
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Bind address, replacing APP_HOST
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Listen port, replacing APP_PORT
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("principal").required(true).args(["company", "employee"])))]
pub(crate) struct TokenArgs {
    /// Issue the token for this company id
    #[arg(long)]
    pub(crate) company: Option<i64>,
    /// Issue the token for this employee id
    #[arg(long)]
    pub(crate) employee: Option<i64>,
    /// Username embedded in the token
    #[arg(long)]
    pub(crate) username: String,
}

impl TokenArgs {
    fn principal(&self) -> Option<Principal> {
        let username = self.username.clone();
        match (self.company, self.employee) {
            (Some(id), _) => Some(Principal::Company {
                company_id: CompanyId(id),
                username,
            }),
            (None, Some(id)) => Some(Principal::Employee {
                employee_id: EmployeeId(id),
                username,
            }),
            (None, None) => None,
        }
    }
}

impl Default for Command {
    fn default() -> Self {
        Command::Serve(ServeArgs::default())
    }
}

fn run_token(args: TokenArgs) -> Result<(), AppError> {
    let principal = args.principal().ok_or(IdentityError::InvalidCredential)?;
    let config = AppConfig::load()?;
    let authority = TokenAuthority::from_config(&config.auth);
    println!("{}", authority.issue(&principal)?);
    Ok(())
}

pub(crate) async fn run() -> Result<(), AppError> {
    match Cli::parse().command.unwrap_or_default() {
        Command::Serve(args) => server::run(args).await,
        Command::Token(args) => run_token(args),
        Command::Demo(args) => run_demo(args),
    }
}
