use std::path::PathBuf;

use clap::Parser;
use codestamp::{domain::corpus::scan_corpus, Session};
use tracing::instrument;

use super::terminal::{Colorize, is_narrow};

#[derive(Debug, Parser)]
#[command(about = "Show the pending code and code counts of a document")]
pub struct Status {
    /// Path to the document, relative to the workspace root
    document: PathBuf,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Status {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let (workspace, file) = super::open_document(root, &self.document)?;
        let session = workspace.load_session(&self.document)?;
        let existing = scan_corpus(&file)?.len();

        match self.output {
            OutputFormat::Json => Self::output_json(&session, existing)?,
            OutputFormat::Table => self.output_table(&session, existing),
        }
        Ok(())
    }

    fn output_json(session: &Session, existing: usize) -> anyhow::Result<()> {
        use serde_json::json;

        let pending = session.pending().map(|pending| {
            json!({
                "code": pending.code,
                "generated_at": pending.generated_at,
            })
        });
        let output = json!({
            "pending": pending,
            "generated": session.generated(),
            "existing_codes": existing,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_table(&self, session: &Session, existing: usize) {
        let pending = session.pending().map_or_else(
            || "none".dim(),
            |pending| pending.code.to_string().code(),
        );

        if is_narrow() {
            println!("Pending: {pending}");
            println!("Generated: {}", session.generated());
            println!("Existing: {existing}");
            return;
        }

        println!("{}", self.document.display());
        println!("{}", "──────────────────".dim());
        println!("{:<16} {pending}", "Pending code");
        if let Some(pending) = session.pending() {
            println!(
                "{:<16} {}",
                "Generated at",
                pending.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        println!("{:<16} {}", "Generated", session.generated());
        println!("{:<16} {existing}", "Codes in document");
    }
}
