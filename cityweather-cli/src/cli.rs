use std::sync::Arc;

use anyhow::{Context, bail};
use cityweather_core::{
    Config, HttpGateway, JsonCodec, ProviderId, RequestLifecycleController, ResponseViewModel,
    SubmitOutcome, provider::default_provider_from_config, service, view,
};
use clap::{Parser, Subcommand};
use inquire::{Confirm, InquireError, Password, PasswordDisplayMode, Text};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "City weather lookup client and service")]
pub struct Cli {
    /// Log at info level instead of warn.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "weatherapi" or "openweather".
        provider: String,
    },

    /// Run the weather service backed by the default provider.
    Serve {
        /// Address to bind, e.g. 0.0.0.0:8000. Defaults to `[server] listen`.
        #[arg(long)]
        listen: Option<String>,
    },

    /// Look up the weather for one city.
    Show {
        /// City name.
        city: String,

        /// Weather service URL. Defaults to `[client] server_url`.
        #[arg(long)]
        server: Option<String>,

        /// Print the record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Prompt for city names until `quit`.
    Interactive {
        /// Weather service URL. Defaults to `[client] server_url`.
        #[arg(long)]
        server: Option<String>,
    },
}

impl Cli {
    pub fn default_log_level(&self) -> &'static str {
        if self.verbose || matches!(self.command, Command::Serve { .. }) { "info" } else { "warn" }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Serve { listen } => serve(listen).await,
            Command::Show { city, server, json } => show(&city, server, json).await,
            Command::Interactive { server } => interactive(server).await,
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;

    // Read the stored file only, so an environment override is never persisted.
    let path = Config::config_file_path()?;
    let mut cfg = Config::load_from(&path)?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("API key cannot be empty");
    }

    cfg.upsert_provider_api_key(id, api_key.to_string());

    if cfg.default_provider_id().ok() != Some(id) {
        let make_default = Confirm::new(&format!("Make {id} the default provider?"))
            .with_default(true)
            .prompt()
            .context("Failed to read answer")?;
        if make_default {
            cfg.set_default_provider(id);
        }
    }

    cfg.save_to(&path)?;
    println!("Saved {id} configuration to {}", path.display());
    Ok(())
}

async fn serve(listen: Option<String>) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let provider = default_provider_from_config(&cfg)?;
    let listen = listen.unwrap_or(cfg.server.listen);
    tracing::info!(%listen, provider = ?cfg.default_provider, "starting weather service");

    service::serve(&listen, Arc::from(provider)).await
}

async fn show(city: &str, server: Option<String>, json: bool) -> anyhow::Result<()> {
    if city.trim().is_empty() {
        bail!("City name cannot be empty");
    }

    let cfg = Config::load()?;
    let mut controller = build_controller(&cfg, server)?;

    match lookup(&mut controller, city).await {
        ResponseViewModel::WeatherRecord(record) if json => {
            let out = serde_json::to_string_pretty(&record).context("Failed to serialize weather record")?;
            println!("{out}");
            Ok(())
        }
        ResponseViewModel::ErrorMessage(message) => bail!("{message}"),
        other => {
            println!("{}", view::render(&other));
            Ok(())
        }
    }
}

async fn interactive(server: Option<String>) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let mut controller = build_controller(&cfg, server)?;

    println!("Type city names to get weather, or 'quit' to exit");

    loop {
        let input = match Text::new("Enter city name:").prompt() {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read city name"),
        };

        let city = input.trim();
        if matches!(city.to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }

        if city.is_empty() {
            println!("Please enter a valid city name");
            continue;
        }

        let outcome = lookup(&mut controller, city).await;
        println!("{}", view::render(&outcome));
    }

    println!("Goodbye!");
    Ok(())
}

fn build_controller(cfg: &Config, server: Option<String>) -> anyhow::Result<RequestLifecycleController> {
    let server_url = server.unwrap_or_else(|| cfg.client.server_url.clone());
    let gateway = HttpGateway::new(server_url, cfg.client.timeout())?;

    Ok(RequestLifecycleController::new(Arc::new(gateway), Arc::new(JsonCodec)))
}

/// Run one lookup through the controller and wait for it to resolve.
async fn lookup(controller: &mut RequestLifecycleController, city: &str) -> ResponseViewModel {
    controller.update_query_text(city);

    match controller.submit() {
        SubmitOutcome::Dispatched(_) => controller.next_completion().await.cloned().unwrap_or_default(),
        SubmitOutcome::NotAllowed | SubmitOutcome::InFlight(_) | SubmitOutcome::ClientError => {
            controller.view_model().clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_logs_at_info_by_default() {
        let cli = Cli::parse_from(["cityweather", "serve"]);
        assert_eq!(cli.default_log_level(), "info");
    }

    #[test]
    fn show_is_quiet_unless_verbose() {
        let cli = Cli::parse_from(["cityweather", "show", "Paris"]);
        assert_eq!(cli.default_log_level(), "warn");

        let cli = Cli::parse_from(["cityweather", "show", "Paris", "-v"]);
        assert_eq!(cli.default_log_level(), "info");
    }

    #[test]
    fn show_accepts_server_and_json() {
        let cli = Cli::parse_from(["cityweather", "show", "New York", "--server", "http://host:9000", "--json"]);
        match cli.command {
            Command::Show { city, server, json } => {
                assert_eq!(city, "New York");
                assert_eq!(server.as_deref(), Some("http://host:9000"));
                assert!(json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
