//! llmstxt CLI - run the reader proxy or turn a page into markdown

mod serve;

use clap::{Parser, Subcommand, ValueEnum};
use llmstxt::{
    FetchController, LifecycleState, MarkdownClient, Phase, RouteParam, ServerConfig,
    DOWNLOAD_FILENAME,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Output format for fetch subcommand
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Markdown with YAML frontmatter
    #[default]
    Md,
    /// JSON format
    Json,
}

/// llmstxt - turn any web page into markdown
#[derive(Parser, Debug)]
#[command(name = "llmstxt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the reader proxy server
    Serve {
        #[command(flatten)]
        config: ServerConfig,
    },
    /// Fetch a page as markdown through a running reader proxy
    Fetch {
        /// URL to fetch; anything from `example.com` to a pasted address works
        target: String,

        /// Treat the target as a path embedded in the app address, e.g. `https:/example.com/docs`
        #[arg(long)]
        route: bool,

        /// Base address of the reader proxy
        #[arg(long, env = "LLMSTXT_PROXY", default_value = "http://127.0.0.1:3000")]
        proxy: String,

        /// Output format
        #[arg(long, short, default_value = "md")]
        output: OutputFormat,

        /// Also save the markdown to a file
        #[arg(long, num_args = 0..=1, default_missing_value = DOWNLOAD_FILENAME)]
        save: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "llmstxt=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            if let Err(e) = serve::run(config).await {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Fetch {
            target,
            route,
            proxy,
            output,
            save,
        } => {
            run_fetch(&target, route, &proxy, output, save).await;
        }
    }
}

async fn run_fetch(
    target: &str,
    route: bool,
    proxy: &str,
    output: OutputFormat,
    save: Option<PathBuf>,
) {
    let client = match MarkdownClient::new(proxy) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut controller = FetchController::new(Arc::new(client));
    let mut updates = controller.subscribe();

    let submitted = if route {
        controller.open_route(&RouteParam::from_path(target))
    } else {
        controller.submit(target)
    };

    match submitted {
        Ok(submission) if submission.normalized => {
            eprintln!("URL normalized: {}", submission.url);
        }
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    // Echo status lines until the attempt settles
    let mut shown = None;
    let state = loop {
        let state = (*updates.borrow_and_update()).clone();
        if !state.is_loading() {
            break state;
        }
        if shown != Some(state.loading_message_index) {
            if let Some(message) = state.loading_message() {
                eprintln!("{}", message);
            }
            shown = Some(state.loading_message_index);
        }
        if updates.changed().await.is_err() {
            break controller.state();
        }
    };

    if let (Phase::Success, Some(path), Some(markdown)) = (state.phase, &save, &state.markdown) {
        if let Err(e) = std::fs::write(path, markdown) {
            eprintln!("Error saving {}: {}", path.display(), e);
            std::process::exit(1);
        }
        eprintln!("Saved as {}", path.display());
    }

    match output {
        OutputFormat::Md => writeln_safe(&format_md_with_frontmatter(&state)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonOutput::from(&state)).unwrap_or_else(|e| {
                eprintln!("Error serializing response: {}", e);
                std::process::exit(1);
            });
            writeln_safe(&json);
        }
    }

    if state.phase != Phase::Success {
        std::process::exit(1);
    }
}

/// JSON shape of a settled fetch
#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<'a> From<&'a LifecycleState> for JsonOutput<'a> {
    fn from(state: &'a LifecycleState) -> Self {
        Self {
            url: &state.url,
            text: state.markdown.as_deref(),
            error: state.error.as_deref(),
        }
    }
}

/// Format a settled fetch as markdown with YAML frontmatter
fn format_md_with_frontmatter(state: &LifecycleState) -> String {
    let mut output = String::new();

    output.push_str("---\n");
    output.push_str(&format!("url: {}\n", state.url));
    output.push_str("source: reader proxy\n");
    output.push_str("---\n");

    // Error goes in the body, where a reader will see it
    if let Some(ref markdown) = state.markdown {
        output.push_str(markdown);
    } else if let Some(ref err) = state.error {
        output.push_str(err);
    }

    output
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settled(markdown: Option<&str>, error: Option<&str>) -> LifecycleState {
        let mut state = LifecycleState::default();
        state.phase = if markdown.is_some() {
            Phase::Success
        } else {
            Phase::Error
        };
        state.url = "https://example.com".to_string();
        state.markdown = markdown.map(str::to_string);
        state.error = error.map(str::to_string);
        state
    }

    #[test]
    fn test_format_md_basic() {
        let output = format_md_with_frontmatter(&settled(Some("# Hello World"), None));

        assert!(output.starts_with("---\n"));
        assert!(output.contains("url: https://example.com\n"));
        assert!(output.contains("---\n# Hello World"));
    }

    #[test]
    fn test_format_md_error_as_body() {
        let output = format_md_with_frontmatter(&settled(None, Some("not found")));

        assert!(!output.contains("error:"));
        assert!(output.ends_with("---\nnot found"));
    }

    #[test]
    fn test_json_output_skips_missing_fields() {
        let state = settled(Some("# Hi"), None);
        let json = serde_json::to_string(&JsonOutput::from(&state)).unwrap();

        assert!(json.contains("\"text\":\"# Hi\""));
        assert!(!json.contains("error"));
    }

    #[test]
    fn test_parse_fetch_save_default() {
        let cli = Cli::try_parse_from(["llmstxt", "fetch", "example.com", "--save"]).unwrap();
        match cli.command {
            Commands::Fetch { save, route, .. } => {
                assert_eq!(save, Some(PathBuf::from("llms.md")));
                assert!(!route);
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_parse_fetch_save_path() {
        let cli = Cli::try_parse_from([
            "llmstxt",
            "fetch",
            "example.com",
            "--save",
            "out.md",
            "--output",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Fetch { save, output, .. } => {
                assert_eq!(save, Some(PathBuf::from("out.md")));
                assert!(matches!(output, OutputFormat::Json));
            }
            _ => panic!("expected fetch"),
        }
    }
}
