// Command-line front end for the Vimeo Simple API client.
// Builds a call from positional namespaces and prints the URL or response.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use vimeo_simple::cache::default_cache_dir;
use vimeo_simple::config::{DEFAULT_API_VERSION, DEFAULT_CACHE_TTL, DEFAULT_HOSTNAME};
use vimeo_simple::{Args, Body, CacheConfig, Format, Reply, Vimeo, VimeoCache, XmlElement};

/// Query the Vimeo Simple API, e.g. `vimeo-simple videos search -p query=cats`
#[derive(Parser, Debug)]
#[command(name = "vimeo-simple")]
#[command(version)]
struct Cli {
    /// Namespaces followed by the method name, e.g. `user info`
    #[arg(required = true, value_name = "SEGMENT")]
    path: Vec<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Request JSON instead of XML
    #[arg(long)]
    json: bool,

    /// Print XML responses as a JSON tree instead of an outline
    #[arg(long)]
    tree: bool,

    /// Cache successful responses (implies --json)
    #[arg(long)]
    cache: bool,

    /// Cache directory (defaults to the platform cache dir)
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Cache TTL in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_CACHE_TTL.as_secs())]
    ttl: u64,

    /// Include response headers; with --json or --cache they go under `_header`
    #[arg(long)]
    header: bool,

    /// Print the request URL without sending it
    #[arg(long)]
    test: bool,

    /// API version
    #[arg(long, default_value = DEFAULT_API_VERSION)]
    api_version: String,

    /// Alternate API hostname
    #[arg(long, default_value = DEFAULT_HOSTNAME)]
    hostname: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn args(&self) -> Args {
        self.params.iter().cloned().collect()
    }

    /// Namespaces and method name.
    fn split_path(&self) -> (&[String], &str) {
        match self.path.split_last() {
            Some((method, namespaces)) => (namespaces, method.as_str()),
            None => (&[], ""),
        }
    }
}

fn parse_param(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("vimeo_simple=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vimeo_simple=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn print_xml(element: &XmlElement, depth: usize) {
    let indent = "  ".repeat(depth);
    let attributes: String = element
        .attributes
        .iter()
        .map(|(key, value)| format!(" {}=\"{}\"", key, value))
        .collect();

    if element.text.is_empty() {
        println!("{}{}{}", indent, element.name, attributes);
    } else {
        println!("{}{}{}: {}", indent, element.name, attributes, element.text);
    }

    for child in &element.children {
        print_xml(child, depth + 1);
    }
}

fn run_cached(cli: &Cli) -> Result<()> {
    let mut vimeo = VimeoCache::new()?
        .api_version(cli.api_version.as_str())
        .hostname(cli.hostname.as_str())
        .test_mode(cli.test)
        .header_mode(cli.header);

    if cli.cache && !cli.test {
        let dir = match &cli.cache_dir {
            Some(dir) => dir.clone(),
            None => {
                let dir = default_cache_dir().context("No cache directory available")?;
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create {:?}", dir))?;
                dir
            }
        };
        vimeo = vimeo.cache(CacheConfig::enabled(dir, Duration::from_secs(cli.ttl))?);
    }

    let (namespaces, method) = cli.split_path();
    let vimeo = namespaces
        .iter()
        .fold(vimeo, |client, name| client.namespace(name));

    match vimeo.call(method, &cli.args())? {
        Reply::Url(url) => println!("{}", url),
        Reply::Response(response) => {
            match response.status {
                Some(status) => eprintln!("HTTP {}", status),
                None => eprintln!("(cached)"),
            }
            println!("{}", serde_json::to_string_pretty(&response.body)?);
        }
    }

    Ok(())
}

fn run_plain(cli: &Cli) -> Result<()> {
    let format = if cli.json { Format::Json } else { Format::Xml };
    let vimeo = Vimeo::new()?
        .api_version(cli.api_version.as_str())
        .hostname(cli.hostname.as_str())
        .format(format)
        .test_mode(cli.test);

    let (namespaces, method) = cli.split_path();
    let vimeo = namespaces
        .iter()
        .fold(vimeo, |client, name| client.namespace(name));

    match vimeo.call(method, &cli.args())? {
        Reply::Url(url) => println!("{}", url),
        Reply::Response(response) => {
            eprintln!("HTTP {}", response.status);
            if cli.header {
                eprint!("{}", response.header);
            }
            match &response.body {
                Body::Xml(root) if cli.tree => println!("{}", serde_json::to_string_pretty(root)?),
                Body::Xml(root) => print_xml(root, 0),
                Body::Json(value) => println!("{}", serde_json::to_string_pretty(value)?),
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    tracing::debug!("Parsed arguments: {:?}", cli);

    if cli.path.iter().any(|segment| segment.is_empty()) {
        bail!("Empty namespace or method name");
    }

    if cli.cache || (cli.json && cli.header) {
        run_cached(&cli)
    } else {
        run_plain(&cli)
    }
}
