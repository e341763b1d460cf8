use anyhow::Context;
use chorely_auth::{FirebaseTokens, Session, SessionCodec, UserRole};
use chorely_config::load as load_config;
use chorely_gateway::build_router;
use chorely_runtime::{telemetry, BackendServices};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "chorely-server")]
#[command(about = "Chorely backend (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Load and validate the configuration, then print a summary
    CheckConfig,
    /// Print a signed session token for local testing
    MintSession {
        /// Firebase uid to embed
        #[arg(long)]
        uid: String,
        /// `parent` or `child`
        #[arg(long, default_value = "parent")]
        role: String,
        #[arg(long)]
        email: Option<String>,
        /// Treat the email as verified by Firebase
        #[arg(long)]
        email_verified: bool,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        id_token: String,
        #[arg(long)]
        refresh_token: String,
        /// Lifetime in seconds; defaults to the configured session ttl
        #[arg(long)]
        ttl_seconds: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::CheckConfig => check_config(),
        Commands::MintSession {
            uid,
            role,
            email,
            email_verified,
            name,
            id_token,
            refresh_token,
            ttl_seconds,
        } => {
            let role = UserRole::parse(&role)
                .with_context(|| format!("unknown role {role}, expected parent or child"))?;
            let session = Session {
                uid,
                role,
                email,
                email_verified,
                name,
                picture: None,
                firebase: FirebaseTokens {
                    id_token,
                    refresh_token,
                },
                expires_at: None,
            };
            mint_session(&session, ttl_seconds)
        }
    }
}

async fn run_server() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("starting Chorely backend");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .context("failed to initialise backend services")?;
    let app = build_router(services.app_state());

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(chorely_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

fn check_config() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    BackendServices::initialise(&config).context("failed to initialise backend services")?;

    println!("http:     {}:{}", config.http.address, config.http.port);
    println!(
        "firebase: {}",
        match config.firebase.project_id.as_deref() {
            Some(project) if config.firebase.is_configured() => project,
            _ => "not configured",
        }
    );
    println!(
        "session:  cookie {} (secure: {}), ttl {}s",
        config.session.cookie_name, config.session.secure_cookie, config.session.ttl_seconds
    );
    Ok(())
}

fn mint_session(session: &Session, ttl_seconds: Option<i64>) -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    let codec =
        SessionCodec::from_config(&config.session).context("invalid session configuration")?;

    let ttl = match ttl_seconds {
        Some(seconds) => Duration::try_seconds(seconds)
            .with_context(|| format!("ttl of {seconds}s is out of range"))?,
        None => codec.ttl(),
    };
    let expires_at = expiry_after(Utc::now(), ttl)?;
    let token = codec
        .encode_with_expiry(session, expires_at)
        .context("failed to sign session")?;

    println!("{token}");
    Ok(())
}

fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> anyhow::Result<DateTime<Utc>> {
    now.checked_add_signed(ttl)
        .with_context(|| format!("session expiry {}s from now is out of range", ttl.num_seconds()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_after_adds_ttl() {
        let now = Utc::now();
        let expires_at = expiry_after(now, Duration::hours(2)).unwrap();
        assert_eq!(expires_at - now, Duration::hours(2));
    }

    #[test]
    fn huge_ttl_is_an_error_not_a_panic() {
        assert!(Duration::try_seconds(i64::MAX).is_none());

        let ttl = Duration::try_seconds(20_000_000_000_000).expect("within chrono range");
        assert!(expiry_after(Utc::now(), ttl).is_err());
    }

    #[test]
    fn mint_session_parses_flags() {
        let cli = Cli::try_parse_from([
            "chorely-server",
            "mint-session",
            "--uid",
            "pat",
            "--id-token",
            "id",
            "--refresh-token",
            "refresh",
            "--email-verified",
            "--ttl-seconds",
            "60",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::MintSession {
                uid,
                role,
                email_verified,
                ttl_seconds,
                ..
            }) => {
                assert_eq!(uid, "pat");
                assert_eq!(role, "parent");
                assert!(email_verified);
                assert_eq!(ttl_seconds, Some(60));
            }
            _ => panic!("expected mint-session"),
        }
    }
}
