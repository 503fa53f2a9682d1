//! Competitor roster arguments shared by every command

use anyhow::Result;
use clap::Args;

use league_core::DEFAULT_ROSTER;

#[derive(Args, Clone, Debug)]
pub struct RosterArgs {
    /// Comma separated team names, in schedule order
    #[arg(long, value_delimiter = ',', default_values = DEFAULT_ROSTER)]
    pub teams: Vec<String>,
}

impl RosterArgs {
    /// Trimmed team names, checked for blanks and duplicates
    pub fn names(&self) -> Result<Vec<String>> {
        let names: Vec<String> = self.teams.iter().map(|t| t.trim().to_string()).collect();

        if names.len() < 2 {
            anyhow::bail!("A league needs at least two teams, got {}", names.len());
        }
        if let Some(blank) = names.iter().position(|n| n.is_empty()) {
            anyhow::bail!("Team name {} is empty", blank + 1);
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                anyhow::bail!("Team '{}' listed twice", name);
            }
        }

        Ok(names)
    }
}
