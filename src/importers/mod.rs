use std::path::Path;

use anyhow::Result;
use log::{info, warn};

pub mod cmd;
pub mod config;
mod importer;
mod monzo;

#[cfg(test)]
mod testutil;

use config::{Config, ImporterConfig};
use importer::StatementImporter;

/// The configured importers, in the order they are offered each file.
pub struct Importers(Vec<Box<dyn StatementImporter>>);

impl Importers {
    pub fn from_config(config: Config) -> Result<Self> {
        config
            .importers
            .into_iter()
            .map(Self::make_importer)
            .collect::<Result<Vec<_>>>()
            .map(Importers)
    }

    fn make_importer(config: ImporterConfig) -> Result<Box<dyn StatementImporter>> {
        Ok(Box::new(monzo::Importer::from_config(config)?))
    }

    /// Returns the first importer that identifies the file at `path`, or
    /// `None` if none of them do.
    pub fn find(&self, path: &Path) -> Result<Option<&dyn StatementImporter>> {
        for importer in &self.0 {
            if importer.identify(path)? {
                info!("{:?} identified as {}", path, importer.file_account());
                return Ok(Some(importer.as_ref()));
            }
        }
        warn!("{:?} not identified by any importer, skipping", path);
        Ok(None)
    }
}
