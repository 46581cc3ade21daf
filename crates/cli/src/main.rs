//! CLI entrypoint and subcommand orchestration.

mod config;
mod docs;
mod prompt;
#[cfg(test)]
mod test_support;
mod tui;

use clap::{Parser, Subcommand};
use portal::Testimonial;
use proto::{MessageContent, ModelCategory, SentimentSummary};

#[cfg(not(test))]
use std::sync::Arc;

#[cfg(not(test))]
use config::Config;
#[cfg(not(test))]
use inference::{HttpInferenceClient, InferenceBackend};
#[cfg(not(test))]
use portal::{
    AuthClient, AuthSession, NewTestimonial, OAuthIntent, OAuthProvider, Registration,
    SessionStore, TestimonialFeed, TestimonialsClient,
};
#[cfg(not(test))]
use proto::{MessageState, PortalError};
#[cfg(not(test))]
use session::{
    ApiKeyStore, DashboardController, DemoController, FileStorage, LocalStorage, TourGuide,
};
#[cfg(not(test))]
use tracing::{info, warn};
#[cfg(not(test))]
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};
#[cfg(not(test))]
use tui::app::{Surface, TuiApp};

/// Top-level command-line arguments for the genai client.
#[derive(Parser)]
#[command(name = "genai")]
#[command(about = "Terminal client for the GenAI chat demo and dashboard", version)]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable debug logging to ~/.genai/logs/debug.log
    #[arg(long, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// CLI subcommands available in the application.
#[derive(Subcommand)]
enum Commands {
    /// Start the demo chat TUI (default when no subcommand is given)
    Demo,

    /// Start the multi-chat dashboard TUI
    Dashboard,

    /// Send one message and print the reply
    Send {
        /// Message to send
        message: String,

        /// Model category (conversation, creative, sentiment)
        #[arg(short = 'k', long)]
        category: Option<ModelCategory>,

        /// Model id; defaults to the first model of the category
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },

    /// List the model catalog
    Models {
        /// Only show one category
        #[arg(short = 'k', long)]
        category: Option<ModelCategory>,
    },

    /// Sign in, register or inspect the current account
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Browse or submit testimonials
    Testimonials {
        #[command(subcommand)]
        command: TestimonialCommands,
    },

    /// Inspect or initialise the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Read the built-in documentation
    Docs {
        /// Page or section id (e.g. `api-key`, `resources`)
        topic: Option<String>,
    },
}

#[derive(Subcommand)]
enum KeyCommands {
    /// Validate and store an API key
    Set { key: String },
    /// Print the stored key, masked
    Show,
    /// Remove the stored key
    Clear,
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: String,

        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create an account; a verification email is sent
    Register {
        name: String,
        email: String,

        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,

        /// Prompted for when omitted
        #[arg(long)]
        confirm: Option<String>,
    },

    /// Confirm an email address with the token from the verification link
    Verify { token: String },

    /// Show the signed-in account
    Status,

    /// Forget the stored session
    Logout,

    /// Sign in through Google or GitHub in the browser
    Oauth {
        /// google or github
        provider: String,

        /// Create an account instead of signing in
        #[arg(long, default_value_t = false)]
        register: bool,

        /// Token or redirect URL from the browser; prompted for when omitted
        #[arg(long)]
        token: Option<String>,
    },
}

#[derive(Subcommand)]
enum TestimonialCommands {
    /// Show one page of approved testimonials
    List {
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        #[arg(short, long, default_value_t = portal::DEFAULT_PAGE_LIMIT)]
        limit: u32,
    },

    /// Show every approved testimonial, page by page
    More {
        #[arg(short, long, default_value_t = portal::DEFAULT_PAGE_LIMIT)]
        limit: u32,
    },

    /// Show the most recent testimonials
    Recent,

    /// Submit a testimonial (requires sign-in)
    Submit {
        content: String,

        /// 1 to 5
        #[arg(short, long)]
        rating: u8,

        #[arg(long)]
        position: Option<String>,

        #[arg(long)]
        company: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write a default config to ~/.genai/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[cfg(not(test))]
#[tokio::main]
/// Program entrypoint.
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::Demo);
    let is_tui = matches!(command, Commands::Demo | Commands::Dashboard);

    // Console output is suppressed in TUI mode so it cannot corrupt the display.
    // --debug adds a daily-rolling file log under ~/.genai/logs/ (or $GENAI_HOME/logs/).
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    // WorkerGuard must outlive main() so buffered file writes are flushed on exit.
    let _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>;

    let debug_writer = if cli.debug {
        let log_dir = config::genai_home().join("logs");
        std::fs::create_dir_all(&log_dir).ok();
        let appender = tracing_appender::rolling::daily(&log_dir, "debug.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        _file_guard = Some(guard);
        Some(writer)
    } else {
        _file_guard = None;
        None
    };

    match (is_tui, debug_writer) {
        (true, Some(writer)) => {
            let console = fmt::layer()
                .with_writer(std::io::sink)
                .with_target(false)
                .with_filter(console_filter);
            let file = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .with_filter(EnvFilter::new("debug,hyper_util=info,rustls=info,reqwest=info"));
            tracing_subscriber::registry()
                .with(console)
                .with(file)
                .init();
        }
        (true, None) => {
            fmt()
                .with_env_filter(console_filter)
                .with_writer(std::io::sink)
                .with_target(false)
                .init();
        }
        (false, Some(writer)) => {
            let console = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(console_filter);
            let file = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .with_filter(EnvFilter::new("debug,hyper_util=info,rustls=info,reqwest=info"));
            tracing_subscriber::registry()
                .with(console)
                .with(file)
                .init();
        }
        (false, None) => {
            fmt()
                .with_env_filter(console_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
    }

    if cli.debug {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            command = command_label(&command),
            log_level = %cli.log_level,
            "========== genai session start =========="
        );
    }

    let config = Config::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!("Failed to load config ({e}), using defaults");
        Config::from_env()
    });

    match command {
        Commands::Demo => cmd_tui(config, false).await,
        Commands::Dashboard => cmd_tui(config, true).await,
        Commands::Send {
            message,
            category,
            model,
        } => cmd_send(config, message, category, model).await,
        Commands::Key { command } => cmd_key(&config, command),
        Commands::Models { category } => {
            print!("{}", format_catalog(category));
            Ok(())
        }
        Commands::Auth { command } => cmd_auth(&config, command).await,
        Commands::Testimonials { command } => cmd_testimonials(&config, command).await,
        Commands::Config { command } => cmd_config(&config, command),
        Commands::Docs { topic } => {
            print!("{}", docs_output(topic.as_deref())?);
            Ok(())
        }
    }
}

// ── Wiring ───────────────────────────────────────────────────

#[cfg(not(test))]
fn local_storage(config: &Config) -> Arc<dyn LocalStorage> {
    Arc::new(FileStorage::in_dir(&config.storage.effective_dir()))
}

#[cfg(not(test))]
fn session_store(config: &Config) -> SessionStore {
    SessionStore::in_dir(&config.storage.effective_dir())
}

#[cfg(not(test))]
fn inference_backend(config: &Config) -> anyhow::Result<Arc<dyn InferenceBackend>> {
    let client = HttpInferenceClient::with_timeout(&config.api.base_url, config.api.request_timeout())?;
    Ok(Arc::new(client))
}

// ── Commands ─────────────────────────────────────────────────

#[cfg(not(test))]
/// Starts the full-screen demo or dashboard.
async fn cmd_tui(config: Config, dashboard: bool) -> anyhow::Result<()> {
    let storage = local_storage(&config);
    let key_store = ApiKeyStore::new(storage.clone());
    let settings = config.chat.settings();
    let signed_in_as = session_store(&config)
        .load()
        .map(|s| session_label(&s));
    let override_key = config.api_key_override.clone();

    let app = if dashboard {
        let mut dash = DashboardController::new(key_store, settings);
        if let Some(key) = override_key {
            dash.set_api_key(key);
        }
        TuiApp::new(Surface::Dashboard(dash), None, signed_in_as)
    } else {
        let mut demo = DemoController::new(key_store, settings);
        if let Some(key) = override_key {
            demo.set_api_key(key);
        }
        let tour = TourGuide::new(storage);
        TuiApp::new(Surface::Demo(demo), Some(tour), signed_in_as)
    };

    tui::run_tui(app, inference_backend(&config)?).await
}

#[cfg(not(test))]
/// Runs one demo send and prints the assistant reply.
async fn cmd_send(
    config: Config,
    message: String,
    category: Option<ModelCategory>,
    model: Option<String>,
) -> anyhow::Result<()> {
    let backend = inference_backend(&config)?;
    let storage = local_storage(&config);
    let mut demo = DemoController::new(ApiKeyStore::new(storage.clone()), config.chat.settings())
        .with_persisted_sends(storage);
    if session_store(&config).load().is_some() {
        demo.set_authenticated(true);
    }

    let key = config
        .api_key_override
        .clone()
        .unwrap_or_else(|| demo.api_key().to_string());
    if key.is_empty() {
        anyhow::bail!("No API key stored. Run `genai key set <key>` or set GENAI_API_KEY.");
    }
    // GENAI_API_KEY is used for this run only and never written to storage.
    if !demo.use_api_key(&key) {
        anyhow::bail!("Please enter a valid API key (more than 10 characters).");
    }

    if let Some(category) = category {
        demo.set_model_category(category);
    }
    let model_id = match model {
        Some(id) => id,
        None => demo
            .filtered_models()
            .first()
            .map(|m| m.id.to_string())
            .ok_or_else(|| anyhow::anyhow!("No models in category {}", demo.category()))?,
    };
    demo.set_model(&model_id)?;

    if let Err(reason) = demo.send_message(backend.as_ref(), &message).await {
        let text = tui::app::blocked_message(reason).unwrap_or("Nothing to send.");
        anyhow::bail!("{text}");
    }
    match demo.messages().last().map(|m| &m.state) {
        Some(MessageState::Resolved(content)) => println!("{}", format_content(content)),
        Some(MessageState::Failed(error)) => anyhow::bail!("{error}"),
        _ => {}
    }
    Ok(())
}

#[cfg(not(test))]
fn cmd_key(config: &Config, command: KeyCommands) -> anyhow::Result<()> {
    let mut store = ApiKeyStore::new(local_storage(config));
    match command {
        KeyCommands::Set { key } => {
            let key = key.trim();
            if !session::is_plausible_api_key(key) {
                anyhow::bail!("Please enter a valid API key (more than 10 characters).");
            }
            if !key.starts_with("hf") {
                warn!("API key does not look like a Hugging Face token; storing anyway");
            }
            store.save(key)?;
            println!("API key saved.");
        }
        KeyCommands::Show => {
            let key = store.load();
            if key.is_empty() {
                println!("No API key stored. Run `genai key set <key>` to add one.");
            } else {
                println!("{}", mask_key(&key));
            }
        }
        KeyCommands::Clear => {
            let had_key = store.has_existing_key();
            store.clear()?;
            if had_key {
                println!("API key removed.");
            } else {
                println!("No API key stored.");
            }
        }
    }
    Ok(())
}

#[cfg(not(test))]
async fn cmd_auth(config: &Config, command: AuthCommands) -> anyhow::Result<()> {
    let client = AuthClient::with_base_url(&config.api.base_url);
    let store = session_store(config);
    match command {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt::read_secret("Password: ")?,
            };
            let login = client.login(&email, &password).await?;
            let session = AuthSession::from(login);
            store.save(&session)?;
            println!("Signed in as {}.", session_label(&session));
        }
        AuthCommands::Register {
            name,
            email,
            password,
            confirm,
        } => {
            let password = match password {
                Some(p) => p,
                None => prompt::read_secret("Password: ")?,
            };
            let confirm = match confirm {
                Some(c) => c,
                None => prompt::read_secret("Confirm password: ")?,
            };
            if password != confirm {
                anyhow::bail!("Passwords do not match");
            }
            let message = client
                .register(&Registration {
                    name,
                    email,
                    password,
                })
                .await?;
            println!("{message}");
        }
        AuthCommands::Verify { token } => {
            let message = client.verify_email(&token).await?;
            println!("{message}");
        }
        AuthCommands::Status => {
            let Some(mut session) = store.load() else {
                println!("Not signed in. Run `genai auth login` to sign in.");
                return Ok(());
            };
            match client.fetch_profile(&session.token).await {
                Ok(user) => {
                    session.user = Some(user);
                    store.save(&session)?;
                    println!("Signed in as {}.", session_label(&session));
                }
                Err(PortalError::Unauthorized) => {
                    store.clear()?;
                    println!("{}", PortalError::Unauthorized);
                }
                Err(e) => {
                    warn!(error = %e, "Profile refresh failed");
                    println!(
                        "Signed in as {} (saved {}; account API unreachable).",
                        session_label(&session),
                        session.saved_at.format("%Y-%m-%d %H:%M UTC")
                    );
                }
            }
        }
        AuthCommands::Logout => {
            if store.clear()? {
                println!("Signed out.");
            } else {
                println!("Not signed in.");
            }
        }
        AuthCommands::Oauth {
            provider,
            register,
            token,
        } => {
            let provider: OAuthProvider = provider.parse()?;
            let intent = if register {
                OAuthIntent::Register
            } else {
                OAuthIntent::Login
            };
            let raw = match token {
                Some(t) => t,
                None => {
                    println!("Open this URL in your browser:\n\n  {}\n", client.oauth_url(provider, intent));
                    prompt::read_line("Paste the redirect URL or token: ")?
                }
            };
            let Some(token) = portal::token_from_redirect(&raw) else {
                anyhow::bail!("No token found in the pasted value.");
            };
            let user = client.fetch_profile(&token).await?;
            let session = AuthSession::new(token, Some(user));
            store.save(&session)?;
            println!("Signed in as {}.", session_label(&session));
        }
    }
    Ok(())
}

#[cfg(not(test))]
async fn cmd_testimonials(config: &Config, command: TestimonialCommands) -> anyhow::Result<()> {
    let client = TestimonialsClient::with_base_url(&config.api.testimonials_url);
    match command {
        TestimonialCommands::List { page, limit } => {
            let mut feed = TestimonialFeed::new(client);
            feed.load(page, limit).await;
            if let Some(error) = feed.error {
                anyhow::bail!(error);
            }
            println!("Page {} of {}\n", feed.current_page, feed.total_pages);
            print_testimonials(&feed.testimonials);
        }
        TestimonialCommands::More { limit } => {
            let mut feed = TestimonialFeed::new(client);
            feed.load(1, limit).await;
            while feed.error.is_none() && feed.load_more().await {}
            print_testimonials(&feed.testimonials);
            if let Some(error) = feed.error {
                anyhow::bail!(error);
            }
        }
        TestimonialCommands::Recent => {
            let mut feed = TestimonialFeed::new(client);
            feed.load_recent().await;
            if let Some(error) = feed.recent_error {
                anyhow::bail!(error);
            }
            print_testimonials(&feed.recent);
        }
        TestimonialCommands::Submit {
            content,
            rating,
            position,
            company,
        } => {
            let Some(session) = session_store(config).load() else {
                anyhow::bail!("Sign in with `genai auth login` to share your experience.");
            };
            let draft = NewTestimonial {
                content,
                rating,
                position,
                company,
            };
            let message = client.submit(&session.token, &draft).await?;
            println!("{message}");
        }
    }
    Ok(())
}

#[cfg(not(test))]
fn cmd_config(config: &Config, command: ConfigCommands) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Show => {
            print!("{}", toml::to_string_pretty(config)?);
            if config.api_key_override.is_some() {
                println!("# API key supplied by GENAI_API_KEY");
            }
        }
        ConfigCommands::Init { force } => {
            let path = Config::default_path();
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            let path = Config::default().save()?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

#[cfg(not(test))]
fn print_testimonials(testimonials: &[Testimonial]) {
    if testimonials.is_empty() {
        println!("No testimonials yet.");
        return;
    }
    for t in testimonials {
        println!("{}\n", format_testimonial(t));
    }
}

// ── Formatting ───────────────────────────────────────────────

#[cfg(not(test))]
fn command_label(command: &Commands) -> &'static str {
    match command {
        Commands::Demo => "demo",
        Commands::Dashboard => "dashboard",
        Commands::Send { .. } => "send",
        Commands::Key { .. } => "key",
        Commands::Models { .. } => "models",
        Commands::Auth { .. } => "auth",
        Commands::Testimonials { .. } => "testimonials",
        Commands::Config { .. } => "config",
        Commands::Docs { .. } => "docs",
    }
}

/// Navigation plus the default page, a single page, or a section's page list.
fn docs_output(topic: Option<&str>) -> anyhow::Result<String> {
    let Some(topic) = topic else {
        let page = docs::find_page(docs::DEFAULT_DOC_PAGE)
            .ok_or_else(|| anyhow::anyhow!("Default documentation page is missing"))?;
        return Ok(format!(
            "{}\n{}",
            docs::render_navigation(Some(page.id)),
            docs::render_page(page)
        ));
    };
    match docs::resolve_topic(topic) {
        Some(docs::DocTopic::Page(page)) => Ok(docs::render_page(page)),
        Some(docs::DocTopic::Section(section)) => Ok(docs::render_section(section)),
        None => anyhow::bail!(
            "Unknown documentation topic '{topic}'.\n\n{}",
            docs::render_navigation(None)
        ),
    }
}

#[cfg(not(test))]
fn session_label(session: &portal::AuthSession) -> String {
    session
        .user
        .as_ref()
        .map(|u| u.display_name().to_string())
        .unwrap_or_else(|| "signed-in user".to_string())
}

/// Shows the first 3 and last 4 characters; short keys are fully hidden.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "•".repeat(chars.len());
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}{}{tail}", "•".repeat(chars.len() - 7))
}

/// Plain-text rendering of an assistant reply.
fn format_content(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(text) | MessageContent::Markdown(text) => text.clone(),
        MessageContent::Sentiment(summary) => format_sentiment(summary),
    }
}

fn format_sentiment(summary: &SentimentSummary) -> String {
    let primary = &summary.primary_sentiment;
    let mut out = format!("Sentiment: {} ({})\n", primary.label, primary.confidence);
    for score in &summary.all_sentiments {
        out.push_str(&format!("  ▸ {:<12}{}\n", score.label, score.confidence));
    }
    out.push_str(&summary.interpretation);
    out
}

fn format_catalog(category: Option<ModelCategory>) -> String {
    let categories: Vec<ModelCategory> = match category {
        Some(c) => vec![c],
        None => ModelCategory::ALL.to_vec(),
    };
    let mut out = String::new();
    for category in categories {
        out.push_str(&format!("{} ({})\n", category.label(), category.as_str()));
        for model in proto::models_for(category) {
            out.push_str(&format!("  {:<50} {}\n", model.id, model.name));
            out.push_str(&format!("      {}\n", model.description));
        }
        out.push('\n');
    }
    out
}

fn format_testimonial(t: &Testimonial) -> String {
    let rating = usize::from(t.rating.min(5));
    let stars = format!("{}{}", "★".repeat(rating), "☆".repeat(5 - rating));
    let mut byline = t.user.name.clone();
    match (&t.position, &t.company) {
        (Some(p), Some(c)) => byline.push_str(&format!(", {p} at {c}")),
        (Some(p), None) => byline.push_str(&format!(", {p}")),
        (None, Some(c)) => byline.push_str(&format!(", {c}")),
        (None, None) => {}
    }
    format!("{stars}  {}\n  - {byline}", t.content)
}

#[cfg(test)]
mod tests {
    use portal::testimonials::TestimonialAuthor;
    use proto::SentimentScore;

    use super::*;

    #[test]
    fn docs_without_topic_shows_navigation_and_first_page() {
        let out = docs_output(None).expect("docs");
        assert!(out.starts_with("Documentation"));
        assert!(out.contains("▸ how-it-works"));
        assert!(out.contains("How It Works\n────"));
    }

    #[test]
    fn docs_topic_selects_page_or_section() {
        let cli = Cli::try_parse_from(["genai", "docs", "api-key"]).expect("parse");
        let topic = match cli.command {
            Some(Commands::Docs { topic }) => topic,
            _ => panic!("expected docs"),
        };
        let page = docs_output(topic.as_deref()).expect("page");
        assert!(page.starts_with("Getting a Hugging Face API Key"));

        let section = docs_output(Some("development")).expect("section");
        assert!(section.contains("source-code"));
        assert!(section.contains("architecture"));

        let err = docs_output(Some("pricing")).expect_err("unknown topic");
        assert!(err.to_string().contains("Unknown documentation topic 'pricing'"));
    }

    #[test]
    fn cli_defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["genai"]).expect("parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn send_parses_category_and_model() {
        let cli = Cli::try_parse_from([
            "genai", "send", "I love it", "--category", "sentiment", "--model", "facebook/opt-1.3b",
        ])
        .expect("parse");
        match cli.command {
            Some(Commands::Send {
                message,
                category,
                model,
            }) => {
                assert_eq!(message, "I love it");
                assert_eq!(category, Some(ModelCategory::Sentiment));
                assert_eq!(model.as_deref(), Some("facebook/opt-1.3b"));
            }
            _ => panic!("expected send"),
        }
        assert!(Cli::try_parse_from(["genai", "send", "x", "--category", "poetry"]).is_err());
    }

    #[test]
    fn mask_key_keeps_only_edges() {
        assert_eq!(mask_key("hf_1234567890abcd"), "hf_••••••••••abcd");
        assert_eq!(mask_key("short"), "•••••");
    }

    #[test]
    fn sentiment_card_lists_scores_then_interpretation() {
        let summary = SentimentSummary {
            primary_sentiment: SentimentScore {
                label: "NEGATIVE".to_string(),
                confidence: "87.50%".to_string(),
            },
            all_sentiments: vec![SentimentScore {
                label: "NEGATIVE".to_string(),
                confidence: "87.50%".to_string(),
            }],
            interpretation: "The text expresses a negative sentiment.".to_string(),
        };
        let text = format_content(&MessageContent::Sentiment(summary));
        assert!(text.starts_with("Sentiment: NEGATIVE (87.50%)"));
        assert!(text.ends_with("negative sentiment."));
    }

    #[test]
    fn catalog_filters_by_category() {
        let out = format_catalog(Some(ModelCategory::Sentiment));
        assert!(out.contains("Sentiment Analysis"));
        assert!(out.contains("DistilBERT Sentiment"));
        assert!(!out.contains("Zephyr"));
        assert!(format_catalog(None).contains("Zephyr 7B Beta"));
    }

    #[test]
    fn testimonial_byline_includes_role() {
        let t = Testimonial {
            id: "t1".to_string(),
            user: TestimonialAuthor {
                id: "u1".to_string(),
                name: "Ada".to_string(),
                avatar: None,
            },
            content: "Great demo".to_string(),
            rating: 4,
            position: Some("Engineer".to_string()),
            company: Some("Acme".to_string()),
        };
        let text = format_testimonial(&t);
        assert!(text.starts_with("★★★★☆  Great demo"));
        assert!(text.contains("Ada, Engineer at Acme"));
    }
}
