//! Importer configuration, given either on the command line or as a RON
//! file listing several accounts:
//!
//! ```ron
//! Config(
//!     importers: [
//!         (
//!             account: "Assets:Monzo:Current",
//!             account_id: "acc_00009xxxxxxxxxxxxxxxxx",
//!             rules: Some(Table("monzo-rules.ron")),
//!         ),
//!         (
//!             account: "Assets:Monzo:Prepaid",
//!             account_id: "acc_00009yyyyyyyyyyyyyyyyy",
//!         ),
//!     ],
//! )
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_derive::Deserialize;

use crate::rules::RulesSource;

pub const DEFAULT_CURRENCY: &str = "GBP";
pub const DEFAULT_PREFIX: &str = "monzo";

/// Fixed settings of one importer instance.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ImporterConfig {
    /// Ledger account that imported transactions are posted to, e.g.
    /// `Assets:Monzo:Current`.
    pub account: String,
    /// The bank's id for the account, which every transaction carries.
    pub account_id: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Prepended to the names of archived statements.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub rules: Option<RulesSource>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

impl ImporterConfig {
    pub fn new<A: Into<String>, I: Into<String>>(account: A, account_id: I) -> Self {
        ImporterConfig {
            account: account.into(),
            account_id: account_id.into(),
            currency: default_currency(),
            prefix: default_prefix(),
            rules: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub importers: Vec<ImporterConfig>,
}

impl Config {
    /// Reads a configuration file. Rules paths within it are taken as
    /// relative to the file's directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        let config = Self::from_str(&content).with_context(|| format!("parsing config {:?}", path))?;
        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(dir))
    }

    fn from_str(s: &str) -> Result<Self> {
        let config: Config = ron::de::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn relative_to(self, dir: &Path) -> Self {
        Config {
            importers: self
                .importers
                .into_iter()
                .map(|imp| ImporterConfig {
                    rules: imp.rules.map(|rules| rules.relative_to(dir)),
                    ..imp
                })
                .collect(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.importers.is_empty() {
            bail!("no importers configured");
        }
        for imp in &self.importers {
            if imp.account.is_empty() {
                bail!("importer for account id {:?} has no account", imp.account_id);
            }
            if imp.account_id.is_empty() {
                bail!("importer for {} has no account_id", imp.account);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    #[test]
    fn defaults() {
        let config = Config::from_str(
            r#"Config(importers: [(account: "Assets:Monzo:Current", account_id: "acc_X")])"#,
        )
        .expect("parse");
        assert_eq!(
            vec![ImporterConfig::new("Assets:Monzo:Current", "acc_X")],
            config.importers
        );
    }

    #[test]
    fn all_fields() {
        let config = Config::from_str(
            r#"
            Config(
                importers: [
                    ImporterConfig(
                        account: "Assets:Monzo:Euro",
                        account_id: "acc_Y",
                        currency: "EUR",
                        prefix: "monzo-eur",
                        rules: Some(Rhai("rules.rhai")),
                    ),
                ],
            )
            "#,
        )
        .expect("parse");
        let imp = &config.importers[0];
        assert_eq!("EUR", imp.currency);
        assert_eq!("monzo-eur", imp.prefix);
        assert_eq!(Some(RulesSource::Rhai(PathBuf::from("rules.rhai"))), imp.rules);
    }

    #[test]
    fn rules_relative_to_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.ron");
        std::fs::write(
            &path,
            r#"Config(importers: [(
                account: "Assets:Monzo:Current",
                account_id: "acc_X",
                rules: Some(Table("rules/monzo.ron")),
            )])"#,
        )
        .expect("write");
        let config = Config::from_path(&path).expect("from_path");
        assert_eq!(
            Some(RulesSource::Table(dir.path().join("rules/monzo.ron"))),
            config.importers[0].rules
        );
    }

    #[test]
    fn empty_config_rejected() {
        Config::from_str("Config(importers: [])").expect_err("should fail");
    }

    #[test]
    fn empty_account_id_rejected() {
        Config::from_str(r#"Config(importers: [(account: "Assets:Monzo", account_id: "")])"#)
            .expect_err("should fail");
    }
}
