//! Admin CLI for memberships
//!
//! Talks directly to the database configured by DATABASE_URL and prints JSON.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use pass_core::common::MembershipId;
use pass_core::domains::auth::JwtService;
use pass_core::domains::membership::{
    enroll, set_balance, HistoryEntry, Membership, NewMembership, Role,
};
use pass_core::kernel::{BaseAccountStore, PostgresAccountStore};
use pass_core::Config;
use serde::Serialize;
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "pass_admin")]
#[command(about = "Membership administration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enroll a new membership
    Enroll {
        /// Enroll an agent (scanner operator) instead of a member
        #[arg(long)]
        agent: bool,
        /// Initial allotment (defaults to DEFAULT_BALANCE)
        #[arg(long)]
        balance: Option<i32>,
    },

    /// Overwrite a membership's balance
    SetBalance { id: String, balance: i32 },

    /// Show a membership and its history
    Show { id: String },

    /// Print an API bearer token for a membership
    MintJwt { id: String },
}

#[derive(Serialize)]
struct MembershipView {
    id: String,
    role: Role,
    balance: i32,
    has_token: bool,
    token_issued_at: Option<chrono::DateTime<Utc>>,
    history: Vec<HistoryEntry>,
}

impl From<Membership> for MembershipView {
    fn from(m: Membership) -> Self {
        Self {
            id: m.id.to_string(),
            role: m.role,
            balance: m.balance,
            has_token: m.current_token.is_some(),
            token_issued_at: m.token_issued_at,
            history: m.history,
        }
    }
}

fn parse_id(raw: &str) -> Result<MembershipId> {
    MembershipId::parse(raw).with_context(|| format!("'{}' is not a membership id", raw))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    let store = PostgresAccountStore::new(pool);

    match cli.command {
        Commands::Enroll { agent, balance } => {
            let role = if agent { Role::Agent } else { Role::Member };
            let input = NewMembership::builder()
                .role(role)
                .balance(balance.unwrap_or(config.default_balance))
                .build();
            let created = enroll(&store, input, Utc::now()).await?;
            print_json(&MembershipView::from(created))?;
        }
        Commands::SetBalance { id, balance } => {
            let updated = set_balance(&store, parse_id(&id)?, balance, Utc::now()).await?;
            print_json(&MembershipView::from(updated))?;
        }
        Commands::Show { id } => {
            let membership = store
                .get_by_id(parse_id(&id)?)
                .await
                .with_context(|| format!("Membership {} not found", id))?;
            print_json(&MembershipView::from(membership))?;
        }
        Commands::MintJwt { id } => {
            let membership = store
                .get_by_id(parse_id(&id)?)
                .await
                .with_context(|| format!("Membership {} not found", id))?;
            let jwt = JwtService::new(&config.jwt_secret, config.jwt_issuer.clone());
            println!("{}", jwt.create_token(membership.id, membership.role)?);
        }
    }

    Ok(())
}
