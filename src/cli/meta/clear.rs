use std::path::PathBuf;

use codestamp::domain::metadata;
use dialoguer::Confirm;
use tracing::instrument;
use uuid::Uuid;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Path to the document, relative to the workspace root
    document: PathBuf,

    /// The id of the tag to remove
    id: Uuid,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut context = super::Context::load(root, &self.document)?;

        if !self.yes {
            let confirmed = Confirm::new()
                .with_prompt(format!("Remove metadata {}?", self.id))
                .default(false)
                .interact()?;
            if !confirmed {
                println!("Cancelled");
                return Ok(());
            }
        }

        let record = metadata::clear(&mut context.file, &mut context.settings, self.id)?;
        context.save(&self.document)?;

        if record.is_some() {
            println!("{}", format!("✅ Cleared metadata {}", self.id).success());
        } else {
            println!(
                "{}",
                format!("✅ Removed tag {} (it had no stored record)", self.id).success()
            );
        }
        Ok(())
    }
}
