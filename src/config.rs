use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::info;

pub const BOOTSTRAP_SERVERS: &str = "bootstrap.servers";
pub const DEFAULT_BOOTSTRAP_SERVERS: &str = "localhost:9091";

/// Command-line options. Long flag names keep the dotted client-property
/// spelling so they read the same as the config file keys.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ksend",
    about = "Publishes a paced sequence of numbered test messages to a Kafka topic"
)]
pub struct Args {
    /// Bootstrap servers. Overrides the setting in the client config file
    #[arg(short = 'b', long = "bootstrap.servers", value_name = "SERVERS")]
    pub bootstrap_servers: Option<String>,

    /// Client configuration file (flat key=value lines)
    #[arg(short = 'c', long = "client.config", value_name = "FILE", default_value = "")]
    pub client_config: String,

    /// Test message text
    #[arg(short = 'm', long, default_value = "Message is")]
    pub message: String,

    /// Delay between messages in milliseconds
    #[arg(short = 'd', long, default_value_t = 2000)]
    pub delay: u64,

    /// Number of messages to send
    #[arg(short = 'n', long = "num-mesg", default_value_t = 10)]
    pub num_mesg: i32,

    /// Start sequence number
    #[arg(short = 's', long = "start-seq", default_value_t = 0)]
    pub start_seq: i32,

    /// Sequence increment
    #[arg(short = 'i', long, default_value_t = 1)]
    pub increment: i32,

    /// Use user data for the message (reserved, currently a no-op)
    #[arg(short = 'u', long)]
    pub user: bool,

    /// Topic name
    #[arg(short = 't', long, default_value = "")]
    pub topic: String,

    /// Generate a client config template with defaults and exit
    #[arg(short = 'g', long)]
    pub generate: bool,
}

/// Fully resolved settings for one run: send-loop knobs as typed fields,
/// everything destined for the Kafka client as a property map.
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    pub topic: String,
    pub message: String,
    pub delay: Duration,
    pub num_mesg: i32,
    pub start_seq: i32,
    pub increment: i32,
    pub user: bool,
    pub properties: HashMap<String, String>,
}

impl ProducerConfig {
    /// Merges the optional client config file with the command line.
    /// The broker address resolves as: non-empty `-b` value, else the file's
    /// `bootstrap.servers`, else the built-in default. All other knobs come
    /// from the command line only.
    pub fn resolve(args: Args) -> anyhow::Result<Self> {
        let mut properties = if args.client_config.is_empty() {
            HashMap::new()
        } else {
            load_properties(&args.client_config)?
        };

        match &args.bootstrap_servers {
            Some(servers) if !servers.is_empty() => {
                info!("Using {}={} from command line", BOOTSTRAP_SERVERS, servers);
                properties.insert(BOOTSTRAP_SERVERS.to_string(), servers.clone());
            }
            _ => {
                if !properties.contains_key(BOOTSTRAP_SERVERS) {
                    properties.insert(
                        BOOTSTRAP_SERVERS.to_string(),
                        DEFAULT_BOOTSTRAP_SERVERS.to_string(),
                    );
                }
                info!("Using {}={}", BOOTSTRAP_SERVERS, properties[BOOTSTRAP_SERVERS]);
            }
        }

        Ok(Self {
            topic: args.topic,
            message: args.message,
            delay: Duration::from_millis(args.delay),
            num_mesg: args.num_mesg,
            start_seq: args.start_seq,
            increment: args.increment,
            user: args.user,
            properties,
        })
    }

    /// Returns the first required field that is missing, topic before broker.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.topic.is_empty() {
            return Some("topic");
        }
        match self.properties.get(BOOTSTRAP_SERVERS) {
            Some(servers) if !servers.is_empty() => None,
            _ => Some(BOOTSTRAP_SERVERS),
        }
    }
}

/// Loads a flat key=value property file. Blank lines and `#`/`!` comment
/// lines are skipped; a line without `=` becomes a key with an empty value.
pub fn load_properties(path: &str) -> anyhow::Result<HashMap<String, String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read client config file {}", path))?;
    let mut properties = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let (key, value) = line.split_once('=').unwrap_or((line, ""));
        properties.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("ksend").chain(args.iter().copied())).unwrap()
    }

    fn write_temp_properties(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("ksend-test-{}-{}", std::process::id(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.bootstrap_servers, None);
        assert_eq!(args.client_config, "");
        assert_eq!(args.message, "Message is");
        assert_eq!(args.delay, 2000);
        assert_eq!(args.num_mesg, 10);
        assert_eq!(args.start_seq, 0);
        assert_eq!(args.increment, 1);
        assert!(!args.user);
        assert_eq!(args.topic, "");
        assert!(!args.generate);
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let args = parse(&["-d", "100", "--num-mesg", "3", "-s", "5", "-i", "2", "-u", "-t", "t1"]);
        assert_eq!(args.delay, 100);
        assert_eq!(args.num_mesg, 3);
        assert_eq!(args.start_seq, 5);
        assert_eq!(args.increment, 2);
        assert!(args.user);
        assert_eq!(args.topic, "t1");
    }

    #[test]
    fn test_long_flags_use_dotted_names() {
        let args = parse(&["--bootstrap.servers", "b1:9092", "--client.config", "c.properties"]);
        assert_eq!(args.bootstrap_servers.as_deref(), Some("b1:9092"));
        assert_eq!(args.client_config, "c.properties");
    }

    #[test]
    fn test_non_integer_value_is_a_parse_error() {
        let result = Args::try_parse_from(["ksend", "-n", "ten"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_defaults_bootstrap_when_nothing_supplied() {
        let config = ProducerConfig::resolve(parse(&["-t", "t1"])).unwrap();
        assert_eq!(config.properties[BOOTSTRAP_SERVERS], DEFAULT_BOOTSTRAP_SERVERS);
        assert_eq!(config.delay, Duration::from_millis(2000));
        assert!(config.missing_field().is_none());
    }

    #[test]
    fn test_resolve_keeps_file_bootstrap_when_flag_absent() {
        let path = write_temp_properties("file-wins", "bootstrap.servers=foo:9092\n");
        let config =
            ProducerConfig::resolve(parse(&["-t", "t1", "-c", path.to_str().unwrap()])).unwrap();
        assert_eq!(config.properties[BOOTSTRAP_SERVERS], "foo:9092");
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_resolve_command_line_bootstrap_wins_over_file() {
        let path = write_temp_properties("cli-wins", "bootstrap.servers=foo:9092\n");
        let config = ProducerConfig::resolve(parse(&[
            "-t", "t1", "-b", "bar:9093", "-c", path.to_str().unwrap(),
        ]))
        .unwrap();
        assert_eq!(config.properties[BOOTSTRAP_SERVERS], "bar:9093");
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_resolve_unreadable_file_is_fatal() {
        let result = ProducerConfig::resolve(parse(&["-t", "t1", "-c", "/no/such/file.properties"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_topic_is_reported_before_bootstrap() {
        let mut config = ProducerConfig::resolve(parse(&[])).unwrap();
        config.properties.remove(BOOTSTRAP_SERVERS);
        assert_eq!(config.missing_field(), Some("topic"));
    }

    #[test]
    fn test_empty_bootstrap_from_file_fails_validation() {
        let path = write_temp_properties("empty-bootstrap", "bootstrap.servers=\n");
        let config =
            ProducerConfig::resolve(parse(&["-t", "t1", "-c", path.to_str().unwrap()])).unwrap();
        assert_eq!(config.missing_field(), Some(BOOTSTRAP_SERVERS));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_load_properties_skips_comments_and_blanks() {
        let path = write_temp_properties(
            "comments",
            "# a comment\n\nacks=1\n! another comment\n  linger.ms = 10 \nflag-only\n",
        );
        let properties = load_properties(path.to_str().unwrap()).unwrap();
        assert_eq!(properties.len(), 3);
        assert_eq!(properties["acks"], "1");
        assert_eq!(properties["linger.ms"], "10");
        assert_eq!(properties["flag-only"], "");
        fs::remove_file(path).unwrap();
    }
}
