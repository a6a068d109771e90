use super::env::CliArgs;
use super::probe::cmd_probe;
use super::replay::cmd_replay;
use super::selectors::cmd_selectors;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::{bail, Result};

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Probe(args) => cmd_probe(args, ctx.config(), &cli.output),
        Commands::Selectors => cmd_selectors(ctx.config(), &cli.output),
        Commands::Replay(args) => {
            let outcome = cmd_replay(args, ctx.config()).await?;
            if !outcome.alerts.is_empty() {
                bail!("{}", outcome.alerts.join("; "));
            }
            println!("{}", outcome.compose_text);
            Ok(())
        }
    }
}
