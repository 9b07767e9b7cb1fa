//! oraql: reconstruct a GraphQL schema from a server that disabled
//! introspection, by harvesting its validation error messages.
//!
//! All of the interesting work lives in `oraql-oracle`; this binary
//! only parses arguments, loads the wordlist and optional seed schema,
//! wires up logging, and writes the schema snapshot the discovery loop
//! emits after every iteration.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use oraql_oracle::{
    discover, DiscoverOptions, HttpCommand, HttpTransport, Transport, TransportConfig,
    DEFAULT_BUCKET_SIZE, DEFAULT_DOCUMENT,
};

/// HTTP command used for every probe request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RequestCommand {
    Get,
    Post,
}

/// Reconstruct a GraphQL schema from a server with introspection disabled.
#[derive(Parser)]
#[command(
    name = "oraql",
    version,
    about = "Reconstruct a GraphQL schema by probing a server's error messages"
)]
struct Cli {
    /// Target GraphQL endpoint URL
    url: String,

    /// Wordlist used for all brute-force probes (fields, arguments, input members)
    #[arg(short, long, value_name = "file")]
    wordlist: PathBuf,

    /// Introspection JSON to resume from and supplement
    #[arg(short, long, value_name = "file")]
    input: Option<PathBuf>,

    /// Write the schema JSON here instead of stdout
    #[arg(short, long, value_name = "file")]
    output: Option<PathBuf>,

    /// Start with this context document
    #[arg(short, long, value_name = "string", default_value = DEFAULT_DOCUMENT)]
    document: String,

    /// Per-request timeout, in seconds
    #[arg(short, long, value_name = "seconds", default_value_t = 5)]
    timeout: u64,

    /// Disable server certificate verification
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Route requests through this proxy
    #[arg(short = 'x', long, value_name = "[protocol://]host[:port]")]
    proxy: Option<String>,

    /// HTTP command to use
    #[arg(short = 'X', long = "request", value_enum, default_value = "post")]
    request: RequestCommand,

    /// Custom header, e.g. "Authorization: Bearer token" (repeatable)
    #[arg(short = 'H', long = "header", value_name = "header")]
    headers: Vec<String>,

    /// Custom URL parameter, e.g. "env: prod" (repeatable)
    #[arg(short = 'P', long = "param", value_name = "param")]
    params: Vec<String>,

    /// Negotiate HTTP/2 instead of forcing HTTP/1.1
    #[arg(long)]
    http2: bool,

    /// Max number of candidate names per request
    #[arg(long, value_name = "n", default_value_t = DEFAULT_BUCKET_SIZE)]
    bucket_size: usize,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(message) = run(&cli) {
        eprintln!("error: {message}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let wordlist = load_wordlist(&cli.wordlist)?;
    if wordlist.is_empty() {
        return Err(format!(
            "wordlist '{}' contains no usable entries",
            cli.wordlist.display()
        ));
    }

    let seed = match &cli.input {
        Some(path) => Some(load_seed(path)?),
        None => None,
    };

    let config = TransportConfig {
        url: cli.url.clone(),
        command: match cli.request {
            RequestCommand::Get => HttpCommand::Get,
            RequestCommand::Post => HttpCommand::Post,
        },
        headers: parse_pairs(&cli.headers, "header")?,
        params: parse_pairs(&cli.params, "param")?,
        timeout: Duration::from_secs(cli.timeout),
        verify_tls: !cli.insecure,
        http2: cli.http2,
        proxy: cli.proxy.clone(),
    };
    let transport = HttpTransport::new(config).map_err(|e| e.to_string())?;

    preflight(&transport);

    let options = DiscoverOptions {
        wordlist,
        bucket_size: cli.bucket_size,
        seed,
        document: Some(cli.document.clone()),
    };

    discover(&transport, &options, |schema| {
        if let Err(message) = write_snapshot(cli.output.as_deref(), schema) {
            tracing::warn!("could not write schema snapshot: {message}");
        }
    })
    .map_err(|e| e.to_string())?;

    Ok(())
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    // Logs go to stderr; stdout is reserved for the schema JSON.
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Confirm connectivity and log the negotiated HTTP version, so proxy
/// and HTTP/2 plumbing can be checked before the long probe run.
fn preflight(transport: &HttpTransport) {
    match transport.send("{__schema{types{name}}}") {
        Ok(response) => {
            if let Some(version) = response.version {
                tracing::info!("target server is using {version}");
            }
        }
        Err(err) => tracing::warn!("preflight request failed: {err}"),
    }
}

/// One candidate name per line; surrounding whitespace is trimmed and
/// empty lines are dropped.
fn load_wordlist(path: &Path) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("could not read wordlist '{}': {}", path.display(), e))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

fn load_seed(path: &Path) -> Result<serde_json::Value, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("could not read seed schema '{}': {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| format!("seed schema '{}' is not valid JSON: {}", path.display(), e))
}

/// Parse repeated `"Name: value"` flags; the value may or may not have
/// a space after the colon.
fn parse_pairs(raw: &[String], what: &str) -> Result<Vec<(String, String)>, String> {
    raw.iter()
        .map(|entry| {
            let (name, value) = entry
                .split_once(':')
                .ok_or_else(|| format!("invalid {what} '{entry}': expected \"Name: value\""))?;
            Ok((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Write the current schema snapshot, overwriting the previous one so
/// an interrupted run still leaves the latest state behind.
fn write_snapshot(output: Option<&Path>, schema: &serde_json::Value) -> Result<(), String> {
    let pretty = serde_json::to_string_pretty(schema)
        .map_err(|e| format!("could not serialize schema: {e}"))?;
    match output {
        Some(path) => fs::write(path, pretty + "\n")
            .map_err(|e| format!("could not write '{}': {}", path.display(), e)),
        None => {
            println!("{pretty}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let pairs = parse_pairs(
            &["Authorization: Bearer token".to_string(), "X-Env:prod".to_string()],
            "header",
        )
        .unwrap();
        assert_eq!(
            pairs,
            vec![
                ("Authorization".to_string(), "Bearer token".to_string()),
                ("X-Env".to_string(), "prod".to_string()),
            ]
        );

        let err = parse_pairs(&["no-colon".to_string()], "header").unwrap_err();
        assert!(err.contains("invalid header"));
    }

    #[test]
    fn test_load_wordlist_trims_and_drops_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        std::fs::write(&path, "user\n\n  post  \n\nid\n").unwrap();

        let words = load_wordlist(&path).unwrap();
        assert_eq!(words, vec!["user", "post", "id"]);
    }

    #[test]
    fn test_cli_parses_the_full_flag_surface() {
        use clap::Parser;

        let cli = Cli::parse_from([
            "oraql",
            "-w", "words.txt",
            "-o", "schema.json",
            "-d", "query { FUZZ }",
            "-t", "10",
            "-k",
            "-x", "http://127.0.0.1:8080",
            "-X", "get",
            "-H", "Authorization: Bearer t",
            "-P", "env: prod",
            "--http2",
            "--bucket-size", "64",
            "-vv",
            "https://target/graphql",
        ]);

        assert_eq!(cli.url, "https://target/graphql");
        assert_eq!(cli.request, RequestCommand::Get);
        assert_eq!(cli.timeout, 10);
        assert!(cli.insecure);
        assert!(cli.http2);
        assert_eq!(cli.bucket_size, 64);
        assert_eq!(cli.verbose, 2);
    }
}
