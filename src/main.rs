//! roster command line entry point.
//!
//! Loads the directory or authenticates an email against it, using the
//! endpoints from the environment.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use roster::auth::{AuthService, AuthSession};
use roster::config::RosterConfig;
use roster::control::Either;
use roster::error::ServiceError;
use roster::event_bus::{EventBus, listener};
use roster::events::{ErrorOccurred, UserLoggedIn};
use roster::fetch::{HttpTransport, ReqwestTransport};
use roster::geo::GeoService;
use roster::telemetry;
use roster::users::{User, UserService, UsersController};

#[derive(Debug, Parser)]
#[command(name = "roster", version, about = "Browse the user directory")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load, geocode and validate every user, then print them.
    Users,
    /// Authenticate a user by email.
    Login {
        /// Email address to look up.
        email: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(error) = telemetry::init_tracing() {
        eprintln!("tracing already initialized: {error}");
    }

    let cli = Cli::parse();

    let config = match RosterConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::warn!("Failed to load configuration from environment: {error}");
            tracing::info!("Using default configuration");
            RosterConfig::default()
        }
    };
    tracing::debug!(
        users_url = %config.users_url,
        geocode_url = %config.reverse_geocode_url,
        scope = %config.event_scope,
        "configuration loaded"
    );

    let transport: Arc<dyn HttpTransport> =
        match ReqwestTransport::new(&config.user_agent, config.request_timeout) {
            Ok(transport) => Arc::new(transport),
            Err(error) => {
                tracing::error!(%error, "failed to build HTTP client");
                return ExitCode::FAILURE;
            }
        };

    let bus = EventBus::new(config.event_scope.clone());
    bus.on::<ErrorOccurred>(listener(|error: &ServiceError| {
        tracing::error!(%error, "operation failed");
    }));

    match cli.command {
        Command::Users => {
            let geo = Arc::new(GeoService::new(
                Arc::clone(&transport),
                config.reverse_geocode_url.clone(),
            ));
            let service = UserService::new(transport, config.users_url.clone(), geo);
            let controller = UsersController::new(service, bus);

            match controller.refresh().await {
                Either::Right(users) => {
                    print_users(&users);
                    ExitCode::SUCCESS
                }
                Either::Left(_) => ExitCode::FAILURE,
            }
        }
        Command::Login { email } => {
            bus.on::<UserLoggedIn>(listener(|event: &roster::events::UserSessionEvent| {
                tracing::info!(user_id = event.user_id, "session started");
            }));
            let session = AuthSession::new(AuthService::new(transport, config.users_url.clone()), bus);

            match session.login(&email).await {
                Either::Right(response) => {
                    if let Some(user) = response.user {
                        println!("Logged in as #{} <{}>", user.id, user.email);
                    }
                    ExitCode::SUCCESS
                }
                Either::Left(_) => ExitCode::FAILURE,
            }
        }
    }
}

fn print_users(users: &[User]) {
    println!("{:>3}  {:<26} {:<28} {:<16} COUNTRY", "ID", "NAME", "EMAIL", "CITY");
    for user in users {
        println!(
            "{:>3}  {:<26} {:<28} {:<16} {}",
            user.id,
            user.name,
            user.email,
            user.address.city,
            user.address.country.as_deref().unwrap_or("-")
        );
    }
}
