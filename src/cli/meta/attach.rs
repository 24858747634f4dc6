use std::path::PathBuf;

use codestamp::{
    domain::{metadata, Target},
    MetadataRecord,
};
use tracing::instrument;

use crate::cli::{Location, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Path to the document, relative to the workspace root
    document: PathBuf,

    /// The byte range to tag (N..M)
    #[arg(long, value_name = "RANGE")]
    at: Location,

    /// The kind of content being tagged
    #[arg(long, value_enum, default_value = "text")]
    target: TargetArg,

    /// A link for the span
    #[arg(long)]
    link: Option<String>,

    /// A reference (repeatable)
    #[arg(long = "reference", value_name = "TEXT")]
    references: Vec<String>,

    /// An alternative tag (repeatable, or comma separated)
    #[arg(long = "alt-tag", value_name = "TAG", value_delimiter = ',')]
    alt_tags: Vec<String>,

    /// Notes on the functionality the span describes
    #[arg(long)]
    functionality: Option<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum TargetArg {
    Text,
    Image,
    TableCell,
}

impl From<TargetArg> for Target {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Text => Self::Text,
            TargetArg::Image => Self::Image,
            TargetArg::TableCell => Self::TableCell,
        }
    }
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut context = super::Context::load(root, &self.document)?;

        let record = MetadataRecord {
            link: self.link,
            references: self.references,
            alt_tags: self
                .alt_tags
                .into_iter()
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
            functionality: self.functionality,
            ..MetadataRecord::new(self.target.into())
        };
        if record.is_empty() {
            tracing::warn!("attaching an empty metadata record");
        }

        let selection = self.at.resolve(context.file.text());
        let id = metadata::attach(&mut context.file, &mut context.settings, selection, record)?;
        context.save(&self.document)?;

        println!("{}", format!("✅ Metadata saved as {id}").success());
        Ok(())
    }
}
