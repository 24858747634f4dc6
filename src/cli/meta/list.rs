use std::path::PathBuf;

use codestamp::domain::metadata;
use tracing::instrument;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Path to the document, relative to the workspace root
    document: PathBuf,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let context = super::Context::load(root, &self.document)?;
        let attached = metadata::list(&context.file, &context.settings)?;

        if attached.is_empty() {
            println!("{}", "No tagged spans.".dim());
        }

        let mut orphans = 0;
        for entry in &attached {
            let control = entry.control;
            let text = &context.file.text()[control.inner.range()];
            println!("{} {} {}", control.id, control.inner, format!("\"{text}\"").dim());
            match entry.record {
                Some(record) => super::print_record(record),
                None => {
                    orphans += 1;
                    println!("{}", "  ⚠️  No record stored for this tag".warning());
                }
            }
        }

        // Records whose tag was removed from the document by hand
        let stale = context
            .settings
            .iter()
            .filter(|(id, _)| !attached.iter().any(|entry| entry.control.id == **id))
            .count();

        if orphans > 0 || stale > 0 {
            println!();
            println!(
                "{}",
                format!("⚠️  {orphans} tag(s) without a record, {stale} record(s) without a tag")
                    .warning()
            );
        }
        Ok(())
    }
}
