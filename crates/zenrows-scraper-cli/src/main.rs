//! ZenRows scraper CLI - scrape pages from the shell or serve the tool over MCP

mod mcp;

use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use zenrows_scraper::{ResponseType, ScrapeOutput, ScrapeRequest, Scraper, TOOL_LLMTXT};

/// Output format accepted on the command line
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    #[default]
    Raw,
    Markdown,
    Plaintext,
    Pdf,
}

impl From<Format> for ResponseType {
    fn from(format: Format) -> Self {
        match format {
            Format::Raw => ResponseType::Raw,
            Format::Markdown => ResponseType::Markdown,
            Format::Plaintext => ResponseType::Plaintext,
            Format::Pdf => ResponseType::Pdf,
        }
    }
}

/// ZenRows scraper - web scraping tool for LLM agents
#[derive(Parser, Debug)]
#[command(name = "zenrows-scraper")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// API key (defaults to the ZENROWS_API_KEY environment variable)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Print full help with examples (llmtxt)
    #[arg(long)]
    llmtxt: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as MCP (Model Context Protocol) server over stdio
    Mcp,
    /// Scrape a URL and print the result
    Scrape(ScrapeArgs),
}

#[derive(clap::Args, Debug)]
struct ScrapeArgs {
    /// URL to scrape
    url: String,

    /// Render JavaScript in a headless browser
    #[arg(long)]
    js_render: bool,

    /// JSON array of browser actions
    #[arg(long)]
    js_instructions: Option<String>,

    /// Use residential proxies
    #[arg(long)]
    premium_proxy: bool,

    /// Two-letter proxy country code
    #[arg(long)]
    proxy_country: Option<String>,

    /// Sticky session id
    #[arg(long)]
    session_id: Option<u64>,

    /// CSS selector to wait for
    #[arg(long)]
    wait_for: Option<String>,

    /// Milliseconds to wait before returning
    #[arg(long)]
    wait: Option<u64>,

    /// Comma-separated resource types to block
    #[arg(long)]
    block_resources: Option<String>,

    /// Output format
    #[arg(long, short = 't', value_enum, default_value = "raw")]
    response_type: Format,

    /// JSON object of field name to CSS selector
    #[arg(long)]
    css_extractor: Option<String>,

    /// Automatic structured extraction
    #[arg(long)]
    autoparse: bool,

    /// Comma-separated extraction categories (tables, links, headings, ...)
    #[arg(long)]
    outputs: Option<String>,

    /// Return captured network requests as JSON
    #[arg(long)]
    json_response: bool,

    /// Capture a viewport screenshot
    #[arg(long)]
    screenshot: bool,

    /// Capture a full-page screenshot
    #[arg(long)]
    screenshot_fullpage: bool,

    /// Capture a screenshot of one element
    #[arg(long)]
    screenshot_selector: Option<String>,

    /// Screenshot format (png or jpeg)
    #[arg(long)]
    screenshot_format: Option<String>,

    /// JPEG quality 1-100
    #[arg(long)]
    screenshot_quality: Option<u32>,

    /// Header forwarded to the target, as NAME:VALUE (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Write the result to a file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl ScrapeArgs {
    fn to_request(&self) -> ScrapeRequest {
        let mut req = ScrapeRequest::new(&self.url).response_type(self.response_type.into());
        req.js_render = self.js_render;
        req.premium_proxy = self.premium_proxy;
        req.js_instructions = self.js_instructions.clone();
        req.proxy_country = self.proxy_country.clone();
        req.session_id = self.session_id;
        req.wait_for = self.wait_for.clone();
        req.wait = self.wait;
        req.block_resources = self.block_resources.clone();
        req.css_extractor = self.css_extractor.clone();
        req.autoparse = self.autoparse.then_some(true);
        req.outputs = self.outputs.clone();
        req.json_response = self.json_response.then_some(true);
        req.screenshot = self.screenshot.then_some(true);
        req.screenshot_fullpage = self.screenshot_fullpage.then_some(true);
        req.screenshot_selector = self.screenshot_selector.clone();
        req.screenshot_format = self.screenshot_format.clone();
        req.screenshot_quality = self.screenshot_quality;
        req.custom_headers = self.headers.iter().cloned().collect();
        req
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:VALUE, got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in {raw:?}"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries results and MCP frames
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // Handle --llmtxt flag
    if cli.llmtxt {
        writeln_safe(TOOL_LLMTXT);
        std::process::exit(0);
    }

    let command = match cli.command {
        Some(command) => command,
        None => {
            eprintln!("Usage: zenrows-scraper scrape <URL>");
            eprintln!("   or: zenrows-scraper mcp");
            eprintln!("   or: zenrows-scraper --help");
            std::process::exit(1);
        }
    };

    let mut builder = Scraper::builder();
    if let Some(key) = cli.api_key {
        builder = builder.api_key(key);
    }
    let scraper = match builder.build() {
        Ok(scraper) => scraper,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match command {
        Commands::Mcp => mcp::run_server(scraper).await,
        Commands::Scrape(args) => run_scrape(&scraper, &args).await,
    }
}

async fn run_scrape(scraper: &Scraper, args: &ScrapeArgs) {
    let request = args.to_request();

    let output = match scraper.scrape(&request).await {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(path) = &args.output {
        if let Err(e) = std::fs::write(path, output.as_bytes()) {
            eprintln!("Error writing {}: {}", path.display(), e);
            std::process::exit(1);
        }
        eprintln!("Saved {} bytes to {}", output.as_bytes().len(), path.display());
        return;
    }

    match output {
        ScrapeOutput::Text(text) => writeln_safe(&text),
        ScrapeOutput::Binary { data, .. } => write_bytes_safe(&data),
    }
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        exit_on_write_error(e);
    }
}

fn write_bytes_safe(data: &[u8]) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = handle.write_all(data).and_then(|_| handle.flush()) {
        exit_on_write_error(e);
    }
}

fn exit_on_write_error(e: io::Error) -> ! {
    if e.kind() == io::ErrorKind::BrokenPipe {
        std::process::exit(0);
    }
    eprintln!("Error writing to stdout: {}", e);
    std::process::exit(1);
}
