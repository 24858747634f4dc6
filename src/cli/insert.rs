use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use codestamp::{Document, Selection, Session, Stamper, TextFile, Workspace};
use tracing::instrument;

use super::{Location, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Insert the pending code into a document")]
pub struct Insert {
    /// Path to the document, relative to the workspace root
    document: PathBuf,

    /// Where to insert: 'end', a byte offset, or a byte range to replace
    #[arg(long, value_name = "LOCATION", default_value_t = Location::End, conflicts_with = "placeholder")]
    at: Location,

    /// Replace the first occurrence of this text instead
    #[arg(long, value_name = "TEXT")]
    placeholder: Option<String>,
}

impl Insert {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let (workspace, mut file) = super::open_document(root, &self.document)?;
        let mut session = workspace.load_session(&self.document)?;
        session.require_pending()?;
        let before = session.clone();

        let location = self.location(&file)?;
        tracing::debug!(%location, "resolved insertion point");

        let stamper = Stamper::new(workspace.config());
        let code = stamper.insert_pending_code(&mut file, &mut session, location)?;
        commit(&workspace, &self.document, &mut file, &session, &before)?;

        println!(
            "{}",
            format!("✓ Code {code} inserted successfully!").success()
        );
        Ok(())
    }

    fn location(&self, document: &impl Document) -> anyhow::Result<Selection> {
        let text = document.body_text()?;
        match &self.placeholder {
            Some(placeholder) => {
                let start = text.find(placeholder.as_str()).with_context(|| {
                    format!(
                        "placeholder '{placeholder}' not found in {}",
                        self.document.display()
                    )
                })?;
                Ok(Selection::new(start, start + placeholder.len()))
            }
            None => Ok(self.at.resolve(&text)),
        }
    }
}

/// Persists the cleared session, then the edited document.
///
/// If the document cannot be written the session is restored to `before`, so
/// the code stays pending and is never in the file twice.
fn commit(
    workspace: &Workspace,
    document: &Path,
    file: &mut TextFile,
    session: &Session,
    before: &Session,
) -> anyhow::Result<()> {
    workspace.save_session(document, session)?;

    if let Err(error) = file.save() {
        if let Err(rollback) = workspace.save_session(document, before) {
            tracing::error!(%rollback, "failed to restore the pending code");
        }
        return Err(anyhow::Error::new(error)
            .context(format!("failed to save {}", file.path().display())));
    }
    Ok(())
}
