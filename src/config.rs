use clap::Parser;
use std::time::Duration;
use url::Url;

/// Settings for a commander's runtime and HTTP client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackConfig {
    pub attackers: usize,
    pub threads: usize, // tokio worker threads
    pub timeout: Option<Duration>, // whole request/response cycle, none by default
    pub connect_timeout: Option<Duration>, // establishing the connection only
}

// Default values, one worker thread per core
impl Default for AttackConfig {
    fn default() -> Self {
        AttackConfig {
            attackers: 10,
            threads: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            timeout: None,
            connect_timeout: None,
        }
    }
}

/// Barrage a target URL with requests from a pool of concurrent attackers.
#[derive(Parser, Debug)]
#[command(name = "volley", author, version, about, long_about = None)]
#[command(after_help = "Durations can be specified like: 500ms, 10s, 2m")]
pub struct Cli {
    /// Number of concurrent attackers
    #[arg(short = 'c', long = "concurrency", default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub concurrency: u64,

    /// Target URL to load test
    #[arg(short = 'u', long = "url", value_parser = parse_url)]
    pub url: String,

    /// Delay between two requests of one attacker (default: none)
    #[arg(short = 'r', long = "rate")]
    pub rate: Option<String>,

    /// How long to run; runs until Ctrl+C when omitted
    #[arg(short = 't', long = "time-span")]
    pub time_span: Option<String>,

    /// Request timeout
    #[arg(short = 'T', long = "timeout", value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Connection timeout
    #[arg(short = 'C', long = "connect-timeout", value_parser = humantime::parse_duration)]
    pub connect_timeout: Option<Duration>,

    /// Number of runtime worker threads (default: one per core)
    #[arg(long = "threads", value_parser = clap::value_parser!(u64).range(1..))]
    pub threads: Option<u64>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Runtime and client settings carried by the arguments
    pub fn attack_config(&self) -> AttackConfig {
        let defaults = AttackConfig::default();
        AttackConfig {
            attackers: self.concurrency as usize,
            threads: self.threads.map(|t| t as usize).unwrap_or(defaults.threads),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
        }
    }
}

// Check if the url is correct
fn parse_url(url: &str) -> Result<String, String> {
    let parsed = Url::parse(url).map_err(|e| format!("invalid URL: {}", e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(url.to_string()),
        other => Err(format!("unsupported scheme \"{}\"", other)),
    }
}
