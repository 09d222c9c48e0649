use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::Path;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use mailfront::app::App;
use mailfront::config::Config;
use mailfront::constants::READER_WRAP_WIDTH;
use mailfront::html::linkify;
use mailfront::mail::{Content, DraftMessage, RenderedContent, render_content, to_text};
use mailfront::ui::theme::init_theme;

/// Logs to `mailfront.log` in the config directory so the TUI stays clean.
fn setup_logging() {
    use std::fs::OpenOptions;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mailfront=debug"));

    let log_file = Config::config_dir()
        .ok()
        .and_then(|dir| fs::create_dir_all(&dir).ok().map(|_| dir))
        .map(|dir| dir.join("mailfront.log"))
        .and_then(|path| {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)
                .ok()
        });

    if let Some(file) = log_file {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        setup_stderr_logging();
    }
}

/// One-shot commands log warnings to stderr, away from their output.
fn setup_stderr_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_usage() {
    eprintln!(
        r#"mailfront - Terminal front end for a JSON mail API

Usage: mailfront [command]

Commands:
    (none)            Start the mail client
    sanitize <file>   Print the sanitized form of an HTML file
    linkify <file>    Print a text file as HTML with its links made clickable
    render <file>     Print a message body as it appears in the reader
    init              Write a default configuration file
    help              Show this help message

Configuration file: ~/.config/mailfront/config.toml
"#
    );
}

fn read_input(args: &[String]) -> Result<(String, String)> {
    let path = args.get(2).context("Missing file argument")?;
    let body = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    Ok((path.clone(), body))
}

/// Renders a local file the way the reader renders a message body.
fn render_file(body: String, content_type: &str) -> Result<RenderedContent> {
    let config = Config::load()?;
    // A local draft resolves no cid: or attachment URLs
    let draft = DraftMessage::with_body(content_type, String::new());
    let content = Content {
        content_type: content_type.to_string(),
        content: body,
        attachment: Vec::new(),
    };
    Ok(render_content(&draft, &content, &config.sanitizer.policy()))
}

fn run_sanitize(args: &[String]) -> Result<()> {
    let (_, body) = read_input(args)?;
    println!("{}", render_file(body, "text/html")?.html);
    Ok(())
}

fn run_linkify(args: &[String]) -> Result<()> {
    let (_, body) = read_input(args)?;
    println!("{}", linkify(&body));
    Ok(())
}

fn run_render(args: &[String]) -> Result<()> {
    let (path, body) = read_input(args)?;
    let is_html = Path::new(&path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));
    let content_type = if is_html { "text/html" } else { "text/plain" };
    tracing::debug!("Rendering {} as {}", path, content_type);

    let rendered = render_file(body, content_type)?;
    print!("{}", to_text(&rendered, READER_WRAP_WIDTH));
    Ok(())
}

fn run_init() -> Result<()> {
    let path = Config::config_path()?;
    if path.exists() {
        println!("Configuration already exists at {}", path.display());
        return Ok(());
    }
    Config::default().save()?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("help") | Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        Some("sanitize") => {
            setup_stderr_logging();
            run_sanitize(&args)
        }
        Some("linkify") => {
            setup_stderr_logging();
            run_linkify(&args)
        }
        Some("render") => {
            setup_stderr_logging();
            run_render(&args)
        }
        Some("init") => {
            setup_stderr_logging();
            run_init()
        }
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            std::process::exit(1);
        }
        None => {
            setup_logging();

            let config = Config::load()?;
            init_theme(config.ui.theme);
            tracing::info!("Using mail API at {}", config.api.base_url);

            let mut app = App::new(config)?;
            app.run().await
        }
    }
}
