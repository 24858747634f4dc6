use std::path::PathBuf;

use clap::Parser;
use codestamp::Stamper;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Generate a code that does not yet occur in a document")]
pub struct Generate {
    /// Path to the document, relative to the workspace root
    document: PathBuf,

    /// Print only the code
    #[arg(long, short)]
    quiet: bool,
}

impl Generate {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let (workspace, file) = super::open_document(root, &self.document)?;
        let mut session = workspace.load_session(&self.document)?;
        let previous = session.pending().map(|pending| pending.code);

        let mut stamper = Stamper::new(workspace.config());
        let code = stamper.request_unique_code(&file, &mut session)?;
        workspace.save_session(&self.document, &session)?;

        if self.quiet {
            println!("{code}");
            return Ok(());
        }

        if let Some(previous) = previous {
            println!(
                "{}",
                format!("Discarded previously pending code {previous}").dim()
            );
        }
        println!(
            "{} {}",
            "✓ Generated unique code:".success(),
            code.to_string().code()
        );
        println!(
            "{}",
            format!(
                "Insert it with 'codestamp insert {}'",
                self.document.display()
            )
            .dim()
        );
        Ok(())
    }
}
