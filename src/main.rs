use clap::{Arg, Command};
use log::LevelFilter;
use mailsweep::{Message, Scanner, ScannerConfig};
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    let matches = Command::new("mailsweep")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Email threat scanner: spam, phishing, malware, and homograph detection")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path (YAML)"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("message")
                .short('m')
                .long("message")
                .value_name("FILE")
                .help("Parsed message as JSON to scan"),
        )
        .arg(
            Arg::new("feed-stats")
                .long("feed-stats")
                .help("Print loaded feed entry count and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new().filter_level(level).init();

    if let Some(path) = matches.get_one::<String>("generate-config") {
        if let Err(e) = ScannerConfig::write_default(Path::new(path)) {
            eprintln!("Failed to generate config: {}", e);
            process::exit(1);
        }
        println!("Wrote default configuration to {}", path);
        return;
    }

    let config = match matches.get_one::<String>("config") {
        Some(path) => match ScannerConfig::from_file(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path, e);
                process::exit(1);
            }
        },
        None => ScannerConfig::default(),
    };

    if let Err(e) = run(config, &matches).await {
        eprintln!("{:#}", e);
        process::exit(1);
    }
}

async fn run(config: ScannerConfig, matches: &clap::ArgMatches) -> anyhow::Result<()> {
    let scanner = Scanner::new(config);
    let warnings = scanner.load().await?;
    for warning in &warnings {
        log::warn!("{}", warning);
    }

    if matches.get_flag("feed-stats") {
        println!("{} feed entries loaded", scanner.feed_entries().len());
        return Ok(());
    }

    let Some(message_path) = matches.get_one::<String>("message") else {
        anyhow::bail!("nothing to do: pass --message FILE or --feed-stats");
    };

    let raw = std::fs::read_to_string(message_path)?;
    let message: Message = serde_json::from_str(&raw)?;
    let result = scanner.scan(&message)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
