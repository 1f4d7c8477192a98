mod promote;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

use crate::promote::{CliError, PromoteOutcome, promote_user};

#[derive(Parser, Debug)]
#[command(name = "orgdesk-admin", about = "Administrative tasks against the orgdesk database")]
struct Cli {
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Grant the global admin role to an existing user.
    Promote {
        /// Email address the user signed up with.
        email: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_exit_code(&e));
        }
    };

    match run(cli).await {
        Ok(outcome) => {
            println!("{}", outcome.message());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// `--help` and `--version` exit 0; every other parse failure exits 1.
fn usage_exit_code(err: &clap::Error) -> u8 {
    u8::from(err.use_stderr())
}

async fn run(cli: Cli) -> Result<PromoteOutcome, CliError> {
    match cli.command {
        Command::Promote { email } => {
            let email = promote::normalize_email(&email).ok_or(CliError::InvalidEmail(email))?;
            let pool = PgPoolOptions::new()
                .max_connections(1)
                .connect(&cli.database_url)
                .await?;
            let outcome = promote_user(&pool, &email).await;
            pool.close().await;
            outcome
        }
    }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
