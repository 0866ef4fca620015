//! services/client/src/bin/brochura.rs

use brochura_core::domain::{GenerationRequest, Layout, NewAccount};
use brochura_core::ports::{
    AuthService, BrochureGenerationService, HistoryService, PortError, SessionStore,
};
use clap::{Parser, Subcommand};
use client_lib::{
    adapters::{AuthBackend, Backend, BrochureBackend, HistoryBackend, NlpBackend},
    config::Config,
    error::AppError,
    flow::{run_job, JobSettings, Orchestrator},
    session::FileSessionStore,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "brochura", version, about = "Brochura hotel brochure client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Log in by exchanging a Google identity credential
    LoginGoogle {
        /// The credential string issued by Google Sign-In
        credential: String,
    },

    /// Log in by exchanging a Facebook access token
    LoginFacebook {
        /// The access token issued by Facebook Login
        access_token: String,
    },

    /// Discard the stored session
    Logout,

    /// Show the logged-in account
    Whoami,

    /// Generate a brochure from a free-text prompt
    Generate {
        /// e.g. "Generate a brochure for Sunset Paradise Resort in Maldives"
        prompt: String,
        #[arg(short, long, default_value = "trifold")]
        layout: Layout,
        /// Download the generated PDF to this path
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },

    /// Generate through the job queue, polling until it finishes
    Job {
        hotel_name: String,
        location: String,
        #[arg(short, long, default_value = "full_bleed")]
        layout: Layout,
    },

    /// List recently generated brochures
    Recent {
        #[arg(short, long)]
        limit: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // --- 2. Open the Session Store & Build the HTTP Client ---
    let session: Arc<dyn SessionStore> = Arc::new(FileSessionStore::open(config.session_path.clone()));
    let http_client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // --- 3. Initialize the Backend Adapters ---
    let auth = AuthBackend::new(
        Backend::new(
            http_client.clone(),
            config.auth_base_url.clone(),
            Arc::clone(&session),
        ),
        Arc::clone(&session),
    );
    let brochures = Arc::new(BrochureBackend::new(Backend::new(
        http_client.clone(),
        config.brochure_base_url.clone(),
        Arc::clone(&session),
    )));
    let nlp = Arc::new(NlpBackend::new(Backend::new(
        http_client.clone(),
        config.nlp_base_url.clone(),
        Arc::clone(&session),
    )));
    let history = Arc::new(HistoryBackend::new(
        Backend::new(
            http_client,
            config.auth_base_url.clone(),
            Arc::clone(&session),
        ),
        config.brochure_base_url.clone(),
    ));

    let outcome = run_command(cli.command, &config, &session, &auth, brochures, nlp, history).await;

    if let Err(AppError::Port(PortError::AuthExpired)) = &outcome {
        eprintln!("Session expired. Please log in again.");
        std::process::exit(1);
    }
    outcome
}

async fn run_command(
    command: Commands,
    config: &Config,
    session: &Arc<dyn SessionStore>,
    auth: &AuthBackend,
    brochures: Arc<BrochureBackend>,
    nlp: Arc<NlpBackend>,
    history: Arc<HistoryBackend>,
) -> Result<(), AppError> {
    match command {
        Commands::Signup {
            name,
            email,
            password,
        } => {
            auth.signup(&NewAccount {
                name,
                email: email.clone(),
                password,
            })
            .await?;
            println!("Account created for {}. You can now log in.", email);
        }

        Commands::Login { email, password } => {
            let session = auth.login(&email, &password).await?;
            println!("Logged in as {} ({})", session.user.name, session.user.email);
        }

        Commands::LoginGoogle { credential } => {
            let session = auth.login_with_google(&credential).await?;
            println!("Logged in as {} ({})", session.user.name, session.user.email);
        }

        Commands::LoginFacebook { access_token } => {
            let session = auth.login_with_facebook(&access_token).await?;
            println!("Logged in as {} ({})", session.user.name, session.user.email);
        }

        Commands::Logout => {
            session.clear()?;
            println!("Logged out.");
        }

        Commands::Whoami => match session.current() {
            None => println!("Not logged in."),
            Some(current) => {
                // Prefer a fresh profile; fall back to the stored record.
                match auth.profile().await {
                    Ok(profile) => println!("{} ({})", profile.name, profile.email),
                    Err(PortError::AuthExpired) => return Err(PortError::AuthExpired.into()),
                    Err(_) => println!("{} ({})", current.user.name, current.user.email),
                }
            }
        },

        Commands::Generate {
            prompt,
            layout,
            output,
        } => {
            let orchestrator = Orchestrator::new(
                nlp,
                Arc::clone(&brochures) as Arc<dyn BrochureGenerationService>,
                history,
            );
            let request = GenerationRequest {
                raw_prompt: prompt,
                layout,
            };
            info!("Starting brochure generation...");
            let result = orchestrator.generate(&request).await?;

            println!("Brochure generated successfully!");
            println!("Document: {}", result.document_url);
            for (role, url) in &result.asset_urls {
                println!("{:>12}: {}", role.to_string(), url);
            }

            if let Some(path) = output {
                let bytes = brochures.download(&result.document_url).await?;
                std::fs::write(&path, bytes)?;
                println!("Saved to {}", path.display());
            }
        }

        Commands::Job {
            hotel_name,
            location,
            layout,
        } => {
            let settings = JobSettings {
                interval: config.poll_interval,
                max_attempts: config.poll_max_attempts,
            };
            let result = run_job(
                brochures.as_ref(),
                &config.brochure_base_url,
                &hotel_name,
                &location,
                layout,
                &settings,
                &CancellationToken::new(),
            )
            .await?;

            println!("Brochure generated successfully!");
            println!("Document: {}", result.document_url);
            for (role, url) in &result.asset_urls {
                println!("{:>12}: {}", role.to_string(), url);
            }
        }

        Commands::Recent { limit } => {
            let records = history.recent(limit).await?;
            if records.is_empty() {
                println!("No brochures yet.");
            }
            for record in records {
                let created = record
                    .created_at
                    .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {} ({})  {}",
                    created, record.hotel_name, record.location, record.file_path
                );
            }
        }
    }

    Ok(())
}
