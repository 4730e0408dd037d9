use std::{path::PathBuf, process::ExitCode};

use agent::{
    arena,
    client::Client,
    strategy::{BeatLast, Constant, CopyLast, Cycle, RandomMove, Strategy},
    Engine, EngineConfig, Error, Result,
};
use clap::{Parser, Subcommand, ValueEnum};
use common::{
    message::game_server::ClientResponse, model::game::Move, utility::create_shutdown_channel,
};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn, Level};

#[derive(Parser)]
#[command(name = "agent", about = "Rock/paper/scissors prediction agent")]
struct Cli {
    /// JSON engine configuration; environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer game server messages read line by line from stdin.
    Play,
    /// Play against a scripted opponent and print the summary.
    Simulate {
        #[arg(long, value_enum, default_value = "cycle")]
        opponent: Opponent,
        #[arg(long, default_value_t = 1000)]
        rounds: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Opponent {
    Rock,
    Paper,
    Scissors,
    Cycle,
    BeatLast,
    CopyLast,
    Random,
}

impl Opponent {
    fn strategy(self, seed: u64) -> Box<dyn Strategy> {
        match self {
            Opponent::Rock => Box::new(Constant(Move::Rock)),
            Opponent::Paper => Box::new(Constant(Move::Paper)),
            Opponent::Scissors => Box::new(Constant(Move::Scissors)),
            Opponent::Cycle => Box::new(Cycle),
            Opponent::BeatLast => Box::new(BeatLast),
            Opponent::CopyLast => Box::new(CopyLast),
            Opponent::Random => Box::new(RandomMove::new(seed)),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_line_number(true)
        .with_file(true)
        .with_max_level(Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    }
    .with_env_overrides()?;

    match cli.command {
        Command::Play => play(Engine::new(config)?).await,
        Command::Simulate {
            opponent,
            rounds,
            seed,
        } => {
            let config = match seed {
                Some(seed) => config.with_seed(seed),
                None => config,
            };
            let opponent_seed = config.seed.unwrap_or_default().wrapping_add(1);
            let mut engine = Engine::new(config)?;
            let mut strategy = opponent.strategy(opponent_seed);
            let summary = arena::simulate(&mut engine, strategy.as_mut(), rounds)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
    }
}

async fn play(engine: Engine) -> Result<()> {
    let mut client = Client::new(engine);
    let mut shutdown_receiver = create_shutdown_channel().await;
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();
    info!("Waiting for server messages on stdin");
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = line.map_err(|source| Error::Io {
                    operation: "read stdin".to_string(),
                    source,
                })?;
                let Some(line) = line else {
                    info!("stdin closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let response: ClientResponse = match serde_json::from_str(&line) {
                    Ok(response) => response,
                    Err(e) => {
                        warn!("Failed to parse server message {:?}: {}", line, e);
                        continue;
                    }
                };
                if let Some(request) = client.handle(response) {
                    let mut body = serde_json::to_string(&request)?;
                    body.push('\n');
                    write_line(&mut stdout, &body).await.map_err(|source| Error::Io {
                        operation: "write stdout".to_string(),
                        source,
                    })?;
                }
            }
            _ = shutdown_receiver.recv() => {
                break;
            }
        };
    }
    info!("Exited after {} rounds", client.engine().history().len());
    Ok(())
}

async fn write_line(stdout: &mut io::Stdout, body: &str) -> std::io::Result<()> {
    stdout.write_all(body.as_bytes()).await?;
    stdout.flush().await
}
