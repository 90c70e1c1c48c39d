use std::process::ExitCode;

use morphy::config::EngineConfig;
use morphy::engine::{ChessError, Game};

fn main() -> ExitCode {
    let config = EngineConfig::from_env();

    // Initialize tracing (structured logging) on stderr so stdout carries only the FEN.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match replay(&config, std::env::args().skip(1)) {
        Ok(fen) => {
            println!("{fen}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Play each coordinate move from the configured start position and return
/// the resulting FEN.
fn replay(config: &EngineConfig, moves: impl Iterator<Item = String>) -> Result<String, ChessError> {
    let mut game = Game::from_config(config)?;
    tracing::info!(
        "morphy v{} starting from {}",
        env!("CARGO_PKG_VERSION"),
        config.start_fen
    );
    for arg in moves {
        let (from, to) = split_move(&arg)?;
        game.do_move(from, to)?;
    }
    Ok(game.to_fen())
}

/// Split `e2e4` or `e2-e4` into its two squares.
fn split_move(arg: &str) -> Result<(&str, &str), ChessError> {
    if let Some((from, to)) = arg.split_once('-') {
        return Ok((from, to));
    }
    match (arg.len(), arg.get(..2), arg.get(2..)) {
        (4, Some(from), Some(to)) => Ok((from, to)),
        _ => Err(ChessError::InvalidSquare(arg.to_string())),
    }
}
