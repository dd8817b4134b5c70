use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use log::info;

use crate::archive;
use crate::filespec::{self, FileSpec};
use crate::importers::config::{Config, ImporterConfig, DEFAULT_CURRENCY, DEFAULT_PREFIX};
use crate::importers::Importers;
use crate::rules::RulesSource;

/// Selects the importers to use, either from a config file or for a single
/// account given by flags.
#[derive(Debug, Args)]
pub struct ImporterOpts {
    /// RON file configuring the importers for one or more accounts.
    #[arg(long = "config")]
    config: Option<PathBuf>,
    /// Ledger account to post transactions to, e.g. "Assets:Monzo:Current".
    #[arg(long = "account")]
    account: Option<String>,
    /// The bank's id for the account, e.g. "acc_00009xxxxxxxxxxxxxxxxx".
    #[arg(long = "account-id")]
    account_id: Option<String>,
    /// Currency of the account.
    #[arg(long = "currency", default_value = DEFAULT_CURRENCY)]
    currency: String,
    /// Prefix for the names of archived statements.
    #[arg(long = "prefix", default_value = DEFAULT_PREFIX)]
    prefix: String,
    /// RON rules table to categorize the account's transactions with.
    #[arg(long = "rules-table")]
    rules_table: Option<PathBuf>,
    /// Rhai script to categorize the account's transactions with.
    #[arg(long = "rules-rhai")]
    rules_rhai: Option<PathBuf>,
}

impl ImporterOpts {
    fn importers(&self) -> Result<Importers> {
        Importers::from_config(self.config()?)
    }

    fn config(&self) -> Result<Config> {
        let single_account =
            self.account.is_some() || self.account_id.is_some() || self.rules().is_some();
        match &self.config {
            Some(_) if single_account => {
                bail!("--config cannot be combined with --account, --account-id or rules flags")
            }
            Some(path) => Config::from_path(path),
            None => {
                let (account, account_id) = match (&self.account, &self.account_id) {
                    (Some(account), Some(account_id)) => (account, account_id),
                    _ => bail!("either --config, or both --account and --account-id are required"),
                };
                if self.rules_table.is_some() && self.rules_rhai.is_some() {
                    bail!("--rules-table and --rules-rhai cannot be combined");
                }
                let mut imp = ImporterConfig::new(account, account_id);
                imp.currency = self.currency.clone();
                imp.prefix = self.prefix.clone();
                imp.rules = self.rules();
                Ok(Config {
                    importers: vec![imp],
                })
            }
        }
    }

    fn rules(&self) -> Option<RulesSource> {
        self.rules_table
            .clone()
            .map(RulesSource::Table)
            .or_else(|| self.rules_rhai.clone().map(RulesSource::Rhai))
    }
}

/// Expands each glob pattern into the paths it matches. A pattern that
/// matches nothing is an error.
fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let before = paths.len();
        for path in glob::glob(pattern).with_context(|| format!("bad pattern {:?}", pattern))? {
            let path = path.with_context(|| format!("expanding {:?}", pattern))?;
            if path.is_file() {
                paths.push(path);
            }
        }
        if paths.len() == before {
            bail!("no files match {:?}", pattern);
        }
    }
    Ok(paths)
}

#[derive(Debug, Args)]
pub struct IdentifyCmd {
    #[command(flatten)]
    opts: ImporterOpts,
    /// Statement files, or glob patterns matching them.
    inputs: Vec<String>,
}

impl IdentifyCmd {
    pub fn run(&self) -> Result<()> {
        let importers = self.opts.importers()?;
        for path in expand_inputs(&self.inputs)? {
            if let Some(importer) = importers.find(&path)? {
                println!("{}\t{}", path.display(), importer.file_account());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct FileDateCmd {
    #[command(flatten)]
    opts: ImporterOpts,
    /// Statement files, or glob patterns matching them.
    inputs: Vec<String>,
}

impl FileDateCmd {
    pub fn run(&self) -> Result<()> {
        let importers = self.opts.importers()?;
        for path in expand_inputs(&self.inputs)? {
            if let Some(importer) = importers.find(&path)? {
                if let Some(date) = importer.file_date(&path)? {
                    println!("{}\t{}", path.display(), date.format("%Y-%m-%d"));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct ExtractCmd {
    #[command(flatten)]
    opts: ImporterOpts,
    /// The journal file to write to (overwrites any existing file). "-"
    /// writes to stdout.
    #[arg(short = 'o', long = "output", default_value = "-")]
    output: FileSpec,
    /// Statement files, or glob patterns matching them.
    inputs: Vec<String>,
}

impl ExtractCmd {
    pub fn run(&self) -> Result<()> {
        let importers = self.opts.importers()?;
        let mut entries = Vec::new();
        for path in expand_inputs(&self.inputs)? {
            if let Some(importer) = importers.find(&path)? {
                let extracted = importer.extract(&path)?;
                info!("{:?}: extracted {} entries", path, extracted.len());
                entries.extend(extracted);
            }
        }
        filespec::write_journal(&self.output, &entries)
    }
}

#[derive(Debug, Args)]
pub struct ArchiveCmd {
    #[command(flatten)]
    opts: ImporterOpts,
    /// Root of the documents tree to move statements into.
    #[arg(long = "destination")]
    destination: PathBuf,
    /// Print the moves without making them.
    #[arg(long = "dry-run")]
    dry_run: bool,
    /// Statement files, or glob patterns matching them.
    inputs: Vec<String>,
}

impl ArchiveCmd {
    pub fn run(&self) -> Result<()> {
        let importers = self.opts.importers()?;
        for path in expand_inputs(&self.inputs)? {
            let importer = match importers.find(&path)? {
                Some(importer) => importer,
                None => continue,
            };
            let date = importer
                .file_date(&path)?
                .ok_or_else(|| anyhow!("{:?} has no statement date", path))?;
            let dest = archive::archive_path(
                &self.destination,
                importer.file_account(),
                date,
                &importer.file_name(&path)?,
            );
            println!("{} -> {}", path.display(), dest.display());
            if !self.dry_run {
                archive::move_file(&path, &dest)?;
            }
        }
        Ok(())
    }
}
