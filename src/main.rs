mod cli;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use launchpad::app::{AppConfig, AppState, ProviderKind};
use launchpad::platform::{AppPaths, SecureStorageManager};
use launchpad::resources::{Mentor, Resource, StartupField, StartupProfile};

/// Install the subscriber. The chat screen logs to a daily file so the terminal stays clean.
fn init_logging(paths: &AppPaths, debug: bool, to_file: bool) -> Result<Option<WorkerGuard>> {
    let filter = log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), debug)?;

    if to_file {
        let appender = tracing_appender::rolling::daily(paths.logs_dir(), "launchpad.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
        Ok(Some(guard))
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        Ok(None)
    }
}

/// `RUST_LOG` when set, else `launchpad=info`. `--debug` raises launchpad to debug either way.
fn log_filter(rust_log: Option<&str>, debug: bool) -> Result<EnvFilter> {
    let filter = match rust_log {
        Some(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives)?,
        _ if debug => return Ok(EnvFilter::new("launchpad=debug")),
        _ => return Ok(EnvFilter::new("launchpad=info")),
    };

    if debug {
        Ok(filter.add_directive("launchpad=debug".parse()?))
    } else {
        Ok(filter)
    }
}

fn parse_provider(provider: Option<String>) -> Result<Option<ProviderKind>> {
    Ok(provider
        .as_deref()
        .map(ProviderKind::from_str)
        .transpose()?)
}

async fn init_app_state(paths: &AppPaths, model: Option<String>) -> Result<AppState> {
    let mut config = AppConfig::load(paths).await?;
    info!("Configuration loaded from {}", paths.config_file().display());

    if let Some(model) = model {
        config.gemini.model = model;
        config.validate()?;
    }

    let secure_storage = SecureStorageManager::new()?;
    Ok(AppState::new(config, secure_storage))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or_default();

    let mut paths = AppPaths::new()?;
    if let Some(config_file) = cli.config {
        paths = paths.with_config_file(config_file);
    }
    paths.ensure_dirs_exist()?;

    let is_chat = matches!(command, Commands::Chat { .. });
    let _log_guard = init_logging(&paths, cli.debug, is_chat)?;
    info!("Starting launchpad {}", env!("CARGO_PKG_VERSION"));

    match command {
        Commands::Chat { provider, model } => {
            let kind = parse_provider(provider)?;
            let state = init_app_state(&paths, model).await?;
            let config = state.get_config();

            let provider = state.reply_provider(kind).await?;
            let manager = state.chat_session(provider);

            tui::run(
                manager,
                tui::Theme::from_name(&config.ui.theme),
                Duration::from_millis(config.ui.tick_rate_ms),
            )
            .await?;
        }
        Commands::Ask { text, provider } => {
            let kind = parse_provider(provider)?;
            let state = init_app_state(&paths, None).await?;

            let provider = state.reply_provider(kind).await?;
            let manager = state.chat_session(provider);

            let before = manager.session().messages.len();
            manager.send(&text)?;
            let session = manager.settled().await;

            if session.messages.len() == before {
                println!("Nothing to ask.");
            } else if let Some(reply) = session.last_message() {
                println!("{}", reply.text);
            }
        }
        Commands::Mentors { idea, field, location } => {
            let profile = StartupProfile::new(field.parse::<StartupField>()?, idea)?;
            let state = init_app_state(&paths, None).await?;
            let client = state.resource_client()?;

            let mentors = client.find_mentors(&profile.mentor_query(location)).await?;
            print_mentors(&profile, &mentors);
        }
        Commands::Market { idea, field } => {
            let profile = StartupProfile::new(field.parse::<StartupField>()?, idea)?;
            let state = init_app_state(&paths, None).await?;
            let client = state.resource_client()?;

            let report = client.find_competitors(profile.business_idea()).await?;
            println!("Market Analysis ({})", profile.field);
            println!();
            println!("Feasibility Report");
            println!("{}", report.feasibility_report);
        }
        Commands::Resources => {
            println!("Founder Resources");
            println!();
            for resource in Resource::ALL {
                println!("{}", resource.title());
                println!("  {}", resource.description());
                match resource.command() {
                    Some(command) => println!("  launchpad {}", command),
                    None => println!("  Coming soon"),
                }
            }
        }
        Commands::ApiKey { provider, set, remove, status } => {
            let provider = provider.trim().to_ascii_lowercase();
            let state = init_app_state(&paths, None).await?;

            if let Some(key) = set {
                state
                    .set_api_key(&provider, &key)
                    .await
                    .with_context(|| format!("Failed to store API key for {}", provider))?;
                println!("API key for {} stored", provider);
            } else if remove {
                state.remove_api_key(&provider).await?;
                println!("API key for {} removed", provider);
            } else if status {
                let configured = state.get_api_key(&provider).await?.is_some();
                println!(
                    "{}: {}",
                    provider,
                    if configured { "configured" } else { "not configured" }
                );
            } else {
                println!("Nothing to do. Use --set, --remove or --status.");
            }
        }
    }

    Ok(())
}

fn print_mentors(profile: &StartupProfile, mentors: &[Mentor]) {
    println!("Mentors for your {} startup", profile.field);
    println!();

    if mentors.is_empty() {
        println!("No mentors found.");
        return;
    }

    for mentor in mentors {
        match &mentor.title {
            Some(title) => println!("{} ({})", mentor.name, title),
            None => println!("{}", mentor.name),
        }
        if !mentor.summary.is_empty() {
            println!("  {}", mentor.summary);
        }
        if !mentor.expertise.is_empty() {
            println!("  Expertise: {}", mentor.expertise.join(", "));
        }
        if let Some(years) = mentor.experience_years {
            println!("  Experience: {} years", years);
        }
        if !mentor.source.is_empty() {
            println!("  Source: {}", mentor.source);
        }
        if let Some(link) = mentor.profile_link() {
            println!("  {}", link);
        }
        println!();
    }
}
