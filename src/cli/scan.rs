use std::path::PathBuf;

use clap::Parser;
use codestamp::{Code, domain::corpus::scan_corpus};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "List the code-shaped strings found in a document")]
pub struct Scan {
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

impl Scan {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let (_, file) = super::open_document(root, &self.document)?;
        let codes = scan_corpus(&file)?;

        match self.output {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "document": self.document,
                    "count": codes.len(),
                    "codes": codes,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                if codes.is_empty() {
                    println!("{}", "No codes found.".dim());
                    return Ok(());
                }
                for code in &codes {
                    // Matches with a leading zero group are never generated
                    if code.parse::<Code>().is_ok() {
                        println!("{code}");
                    } else {
                        println!("{code}  {}", "(not generated)".dim());
                    }
                }
                println!("{}", format!("{} code(s)", codes.len()).dim());
            }
        }

        Ok(())
    }
}
