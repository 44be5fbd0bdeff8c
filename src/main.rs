use campus_assistant::cli::commands::{Cli, Commands};
use campus_assistant::config::Config;
use campus_assistant::domain::entities::answer::AnswerSource;
use campus_assistant::infrastructure::knowledge::sample::write_sample;
use campus_assistant::CampusAssistant;
use clap::Parser;
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(config, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(config: Config, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    if let Commands::InitSample = cmd {
        let written = write_sample(&config.knowledge_path, &config.institution)?;
        println!("Wrote {written} rows to {}", config.knowledge_path.display());
        return Ok(());
    }

    let assistant = CampusAssistant::new(&config)?;
    match cmd {
        Commands::InitSample => {}
        Commands::Build => {
            let report = assistant.build().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Retrieve { query, k } => {
            let hits = assistant.retrieve(&query, k).await?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Commands::Ask { query, plain } => {
            let answer = assistant.answer(&query).await?;
            if plain {
                println!("{}", answer.text);
            } else {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            }
        }
        Commands::Chat => {
            assistant.load().await?;
            println!("Ask about {} (empty line or `exit` to quit)", config.institution.name);
            let stdin = io::stdin();
            loop {
                print!("> ");
                io::stdout().flush()?;
                let mut line = String::new();
                if stdin.lock().read_line(&mut line)? == 0 {
                    break;
                }
                let line = line.trim();
                if line.is_empty() || line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
                    break;
                }
                let answer = assistant.answer(line).await?;
                let marker = match (answer.source, answer.degraded) {
                    (_, true) => "[degraded]",
                    (AnswerSource::KnowledgeBase, false) => "[kb]",
                    (AnswerSource::GenerativeFallback, false) => "[ai]",
                };
                println!("{marker} {}", answer.text);
            }
        }
        Commands::Info => {
            let info = assistant.info().await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }
    Ok(())
}
