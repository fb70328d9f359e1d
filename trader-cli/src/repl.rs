//! Line-oriented command loop

use std::io::{self, Write};
use std::str::FromStr;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use trader_core::{ExchangeApi, OrderKind};

use crate::gateway::{BalanceOutcome, OrderGateway, OrderOutcome, BALANCE_ASSET};

pub const COMMANDS_HELP: &str = "Available commands: balance | buy | sell | limit | stop-limit | exit";

const SYMBOL_PROMPT: &str = "Enter symbol (e.g., BTCUSDT): ";
const SIDE_PROMPT: &str = "Buy or Sell? ";
const QUANTITY_PROMPT: &str = "Enter quantity: ";

/// Commands accepted at the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Balance,
    Buy,
    Sell,
    Limit,
    StopLimit,
    Exit,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown command '{0}'")]
pub struct UnknownCommand(pub String);

/// Parses the first whitespace-separated token, case-insensitively
impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.split_whitespace().next().unwrap_or("").to_lowercase();
        match token.as_str() {
            "balance" => Ok(Command::Balance),
            "buy" => Ok(Command::Buy),
            "sell" => Ok(Command::Sell),
            "limit" => Ok(Command::Limit),
            "stop-limit" => Ok(Command::StopLimit),
            "exit" => Ok(Command::Exit),
            _ => Err(UnknownCommand(token)),
        }
    }
}

/// Reads commands from `input` until `exit` or end of input.
///
/// Each remote call finishes before the next prompt is written.
pub struct CommandLoop<'s, A, R, W> {
    gateway: OrderGateway<'s, A>,
    lines: Lines<R>,
    out: W,
}

impl<'s, A, R, W> CommandLoop<'s, A, R, W>
where
    A: ExchangeApi,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(gateway: OrderGateway<'s, A>, input: R, out: W) -> Self {
        Self {
            gateway,
            lines: input.lines(),
            out,
        }
    }

    /// Give back the output sink, e.g. to inspect a captured transcript
    pub fn into_output(self) -> W {
        self.out
    }

    pub async fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.out)?;
            writeln!(self.out, "{}", COMMANDS_HELP)?;

            let Some(line) = self.prompt("Enter command: ").await? else {
                break;
            };

            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(_) => {
                    writeln!(self.out, "Invalid command. Try again.")?;
                    continue;
                }
            };

            if command == Command::Exit || !self.dispatch(command).await? {
                break;
            }
        }

        writeln!(self.out, "Exiting bot.")?;
        self.out.flush()
    }

    /// Returns `false` when input ended part-way through the command.
    async fn dispatch(&mut self, command: Command) -> io::Result<bool> {
        match command {
            Command::Balance => {
                let outcome = self.gateway.get_balance().await;
                self.render_balance(&outcome)?;
            }
            Command::Buy | Command::Sell => {
                let Some(symbol) = self.prompt(SYMBOL_PROMPT).await? else {
                    return Ok(false);
                };
                let Some(quantity) = self.prompt(QUANTITY_PROMPT).await? else {
                    return Ok(false);
                };
                let side = if command == Command::Buy { "buy" } else { "sell" };
                let outcome = self
                    .gateway
                    .place_market_order(&symbol, side, &quantity)
                    .await;
                self.render_order(&outcome)?;
            }
            Command::Limit => {
                let Some(symbol) = self.prompt(SYMBOL_PROMPT).await? else {
                    return Ok(false);
                };
                let Some(side) = self.prompt(SIDE_PROMPT).await? else {
                    return Ok(false);
                };
                let Some(quantity) = self.prompt(QUANTITY_PROMPT).await? else {
                    return Ok(false);
                };
                let Some(price) = self.prompt("Enter limit price: ").await? else {
                    return Ok(false);
                };
                let outcome = self
                    .gateway
                    .place_limit_order(&symbol, &side, &quantity, &price)
                    .await;
                self.render_order(&outcome)?;
            }
            Command::StopLimit => {
                let Some(symbol) = self.prompt(SYMBOL_PROMPT).await? else {
                    return Ok(false);
                };
                let Some(side) = self.prompt(SIDE_PROMPT).await? else {
                    return Ok(false);
                };
                let Some(quantity) = self.prompt(QUANTITY_PROMPT).await? else {
                    return Ok(false);
                };
                let Some(stop_price) = self.prompt("Enter stop (trigger) price: ").await? else {
                    return Ok(false);
                };
                let Some(limit_price) = self.prompt("Enter limit (execution) price: ").await? else {
                    return Ok(false);
                };
                let outcome = self
                    .gateway
                    .place_stop_limit_order(&symbol, &side, &quantity, &stop_price, &limit_price)
                    .await;
                self.render_order(&outcome)?;
            }
            Command::Exit => return Ok(false),
        }
        Ok(true)
    }

    async fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.out, "{}", text)?;
        self.out.flush()?;
        let line = self.lines.next_line().await?;
        Ok(line.map(|l| l.trim().to_string()))
    }

    fn render_balance(&mut self, outcome: &BalanceOutcome) -> io::Result<()> {
        match outcome {
            BalanceOutcome::Found(entry) => writeln!(
                self.out,
                "Balance: {} {} (available: {})",
                entry.balance, BALANCE_ASSET, entry.available_balance
            ),
            BalanceOutcome::NotFound => writeln!(self.out, "No {} balance found.", BALANCE_ASSET),
            BalanceOutcome::Failed { reason } => {
                writeln!(self.out, "Error fetching balance: {}", reason)
            }
        }
    }

    fn render_order(&mut self, outcome: &OrderOutcome) -> io::Result<()> {
        match outcome {
            OrderOutcome::Placed { order, ack } => {
                match &order.kind {
                    OrderKind::Market => writeln!(
                        self.out,
                        "Market {} order placed successfully!",
                        order.side
                    )?,
                    OrderKind::Limit { price, .. } => {
                        writeln!(self.out, "Limit {} order placed at {}!", order.side, price)?
                    }
                    OrderKind::StopLimit {
                        stop_price,
                        limit_price,
                        ..
                    } => {
                        writeln!(
                            self.out,
                            "Stop-Limit {} order placed successfully!",
                            order.side
                        )?;
                        writeln!(
                            self.out,
                            "Trigger (Stop): {} | Limit: {}",
                            stop_price, limit_price
                        )?;
                    }
                }
                writeln!(self.out, "Order ID: {}", ack.order_id)
            }
            OrderOutcome::Rejected { label, reason } => {
                writeln!(self.out, "{} order not submitted. {}", label, reason)
            }
            OrderOutcome::Failed { label, reason } => writeln!(
                self.out,
                "Error placing {} order: {}",
                label.to_lowercase(),
                reason
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_parse_case_insensitively() {
        assert_eq!("BALANCE".parse::<Command>(), Ok(Command::Balance));
        assert_eq!("  Buy ".parse::<Command>(), Ok(Command::Buy));
        assert_eq!("sell".parse::<Command>(), Ok(Command::Sell));
        assert_eq!("Stop-Limit".parse::<Command>(), Ok(Command::StopLimit));
        assert_eq!("exit now".parse::<Command>(), Ok(Command::Exit));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            "foo".parse::<Command>(),
            Err(UnknownCommand("foo".to_string()))
        );
        assert!("".parse::<Command>().is_err());
        assert!("stoplimit".parse::<Command>().is_err());
    }
}
