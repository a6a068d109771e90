use clap::Subcommand;

use super::probe::ProbeArgs;
use super::replay::ReplayArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Extract reply context from a page fixture
    Probe(ProbeArgs),

    /// Show the effective selector catalog
    Selectors,

    /// Run the full reply flow against a page fixture
    Replay(ReplayArgs),
}
