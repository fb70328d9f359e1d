//! Binance futures testnet order-entry terminal

use std::process::ExitCode;

use anyhow::Context;
use trader_cli::{
    bootstrap_from_env, CommandLoop, ConnectionStatus, OperationLog, OrderGateway, Session, Settings,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    println!("=== Binance Futures Trading Bot ===\n");

    // Credentials are checked before the log file or network are touched
    let (settings, log) = match bootstrap_from_env() {
        Ok(ready) => ready,
        Err(e) if e.is_fatal() => {
            eprintln!("{}. Please check your .env file.", e);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(settings, log).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: Settings, log: OperationLog) -> anyhow::Result<()> {
    let mut session =
        Session::connect(&settings, log).context("Failed to create exchange client")?;

    match session.start().await {
        ConnectionStatus::Connected(_) => {
            println!("Connected successfully to Binance Futures Testnet!")
        }
        ConnectionStatus::Degraded(reason) => println!("Connection failed: {}", reason),
    }

    let gateway = OrderGateway::new(&session);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut terminal = CommandLoop::new(gateway, stdin, std::io::stdout());
    terminal.run().await.context("Terminal I/O failed")?;

    Ok(())
}
