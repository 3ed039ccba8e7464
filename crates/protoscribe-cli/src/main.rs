//! Protoscribe - clinical-trial protocol section generator

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use protoscribe_config::{
    resolve_config, ConfigError, ProtoscribeConfig, ResolvedConfig, API_KEY_ENV,
};
use protoscribe_providers::{CompletionClient, OpenAIClient, ProviderConfig};
use protoscribe_session::{export, Generator};
use protoscribe_telemetry::TelemetryConfig;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

use protoscribe_cli::{AuthCommands, Cli, Commands, ConfigCommands, GenerateArgs};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let resolved = resolve_config(cli.config.as_deref())?;
    resolved.config.validate()?;
    let telemetry = TelemetryConfig::from(&resolved.config.telemetry).verbose(cli.verbose);

    match &cli.command {
        Some(Commands::Generate(args)) => {
            protoscribe_telemetry::init_subscriber(&telemetry)?;
            run_generate(&resolved.config, args).await
        }
        Some(Commands::Config { command }) => run_config(command, &resolved),
        Some(Commands::Auth { command }) => run_auth(command, &resolved.config),
        None => run_interactive(&resolved.config, &telemetry).await,
    }
}

/// Fails with [`ConfigError::MissingCredential`] before anything is shown
fn create_client(config: &ProtoscribeConfig) -> Result<Arc<dyn CompletionClient>> {
    let api_key = config.resolve_api_key()?;

    let provider_config = ProviderConfig::default()
        .with_api_key(api_key)
        .with_base_url(config.provider.base_url.clone())
        .with_timeout(config.provider.timeout_secs);

    let client = OpenAIClient::new(provider_config)?;
    Ok(Arc::new(client))
}

async fn run_generate(config: &ProtoscribeConfig, args: &GenerateArgs) -> Result<()> {
    let client = create_client(config)?;
    let mut generator = Generator::from_config(client, config);
    if let Some(model) = &args.model {
        generator.set_generation_model(model);
    }

    let params = args.parameters(config.generation.initial_parameters());

    if !args.json {
        eprintln!(
            "{} {} {}",
            "Generating".cyan().bold(),
            params.section_request.yellow(),
            format!("({} → {})", generator.models().generation, generator.models().refinement)
                .dimmed()
        );
    }

    let text = match generator.generate(&params).await {
        Ok(text) => text,
        Err(e) => bail!("{}", e.user_message()),
    };

    if args.json {
        println!("{}", export::to_json(generator.session())?);
    } else {
        println!("{}", text);
    }

    if let Some(path) = &args.out {
        export::write_markdown(path, &params.section_request, &text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !args.json {
            eprintln!("{} {}", "Saved to".green(), path.display());
        }
    }

    if args.copy {
        if !args.json && cfg!(target_os = "linux") {
            eprintln!(
                "{}",
                "Holding the clipboard until something else is copied...".dimmed()
            );
        }
        let copied = text.clone();
        tokio::task::spawn_blocking(move || protoscribe_tui::copy_and_wait(&copied)).await??;
        if !args.json {
            eprintln!("{}", "Text copied to clipboard!".green());
        }
    }

    Ok(())
}

fn run_config(command: &ConfigCommands, resolved: &ResolvedConfig) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let mut config = resolved.config.clone();
            if config.provider.api_key.is_some() {
                config.provider.api_key = Some("<redacted>".to_string());
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommands::Path => match &resolved.path {
            Some(path) => println!("{}", path.display()),
            None => println!("{}", "No config file found; using defaults".dimmed()),
        },
    }
    Ok(())
}

fn run_auth(command: &AuthCommands, config: &ProtoscribeConfig) -> Result<()> {
    match command {
        AuthCommands::Status => {
            println!("{}", "Authentication Status".cyan().bold());
            println!("{}", "─".repeat(40).dimmed());

            match config.resolve_api_key() {
                Ok(key) => {
                    let source = if config
                        .provider
                        .api_key
                        .as_deref()
                        .is_some_and(|k| k.trim() == key.expose_secret())
                    {
                        "config file"
                    } else {
                        API_KEY_ENV
                    };
                    println!(
                        "  {} {} {}",
                        "openai".green(),
                        mask_key(&key).dimmed(),
                        format!("(from {})", source).dimmed()
                    );
                    println!("  {} {}", "endpoint".dimmed(), config.provider.base_url);
                }
                Err(ConfigError::MissingCredential { env }) => {
                    println!(
                        "  {} {}",
                        "openai".red(),
                        format!("not configured (set provider.api_key or {})", env).dimmed()
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}

fn mask_key(key: &SecretString) -> String {
    let key = key.expose_secret();
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

async fn run_interactive(config: &ProtoscribeConfig, telemetry: &TelemetryConfig) -> Result<()> {
    use crossterm::{
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    };
    use ratatui::backend::CrosstermBackend;
    use ratatui::Terminal;
    use std::io::stdout;

    // fail fast on a missing key before taking over the terminal
    let client = create_client(config)?;
    let log_rx = protoscribe_telemetry::init_tui_subscriber(telemetry)?;
    let generator = Generator::from_config(client, config);
    let mut app = protoscribe_tui::App::new(generator, config.generation.initial_parameters())
        .with_log_receiver(log_rx);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.map_err(Into::into)
}
