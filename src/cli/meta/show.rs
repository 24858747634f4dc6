use std::path::PathBuf;

use codestamp::domain::metadata;
use tracing::instrument;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Path to the document, relative to the workspace root
    document: PathBuf,

    /// A byte offset inside the tagged span
    #[arg(long, value_name = "OFFSET")]
    at: usize,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let context = super::Context::load(root, &self.document)?;

        let Some(attached) = metadata::load(&context.file, &context.settings, self.at)? else {
            println!("{}", "No metadata found for this location".dim());
            return Ok(());
        };
        let text = &context.file.text()[attached.control.inner.range()];

        match self.output {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "id": attached.control.id,
                    "text": text,
                    "record": attached.record,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Pretty => {
                println!("{} {}", attached.control.id, format!("\"{text}\"").dim());
                match attached.record {
                    Some(record) => super::print_record(record),
                    None => println!(
                        "{}",
                        "  ⚠️  No record stored for this tag".warning()
                    ),
                }
            }
        }
        Ok(())
    }
}
