use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{anyhow, bail, Result};
use itertools::Itertools;
use rust_decimal::Decimal;
use serde_derive::Deserialize;

use crate::entry::{Flag, LedgerEntry, Posting};
use crate::money::Units;
use crate::rules::processor::Categorizer;
use crate::tags::ID_KEY;

mod predicate;
mod source;

use predicate::Predicate;

const START_CHAIN: &str = "start";

#[derive(Debug, Default)]
pub struct Table {
    chains: HashMap<String, Chain>,
}

impl Table {
    pub fn new(chains: HashMap<String, Chain>) -> Self {
        Self { chains }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        source::load_from_path(path)
    }

    fn get_chain(&self, name: &str) -> Result<&Chain> {
        self.chains
            .get(name)
            .ok_or_else(|| anyhow!("chain {:?} not found", name))
    }

    fn validate(&self) -> Result<()> {
        self.get_chain(START_CHAIN)?;
        for chain in self.chains.values() {
            chain.validate(self)?;
        }
        let mut acyclic = HashSet::new();
        for name in self.chains.keys() {
            self.check_jumps(name, &mut Vec::new(), &mut acyclic)?;
        }
        Ok(())
    }

    /// Fails if any chain can jump, directly or not, back into a chain on
    /// `path`. Chains in `acyclic` have already been checked.
    fn check_jumps<'a>(
        &'a self,
        name: &'a str,
        path: &mut Vec<&'a str>,
        acyclic: &mut HashSet<&'a str>,
    ) -> Result<()> {
        if acyclic.contains(name) {
            return Ok(());
        }
        if path.contains(&name) {
            bail!(
                "chains jump in a cycle: {} -> {}",
                path.iter().join(" -> "),
                name
            );
        }
        path.push(name);
        let mut targets = Vec::new();
        self.get_chain(name)?.jump_targets(&mut targets);
        for target in targets {
            self.check_jumps(target, path, acyclic)?;
        }
        path.pop();
        acyclic.insert(name);
        Ok(())
    }
}

impl Categorizer for Table {
    fn categorize(&self, mut entry: LedgerEntry) -> Result<LedgerEntry> {
        self.get_chain(START_CHAIN)?.apply(self, &mut entry)?;
        Ok(entry)
    }
}

#[derive(Debug, Default)]
pub struct Chain(Vec<Rule>);

impl Chain {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self(rules)
    }

    fn apply(&self, table: &Table, entry: &mut LedgerEntry) -> Result<()> {
        for rule in &self.0 {
            match rule.apply(table, entry)? {
                RuleResult::Continue => {}
                RuleResult::Return => break,
            }
        }
        Ok(())
    }

    fn validate(&self, table: &Table) -> Result<()> {
        for r in &self.0 {
            r.validate(table)?;
        }
        Ok(())
    }

    fn jump_targets<'a>(&'a self, targets: &mut Vec<&'a str>) {
        for r in &self.0 {
            r.action.jump_targets(targets);
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Rule {
    predicate: Predicate,
    action: Action,
    result: RuleResult,
}

impl Rule {
    fn apply(&self, table: &Table, entry: &mut LedgerEntry) -> Result<RuleResult> {
        if self.predicate.is_match(entry) {
            self.action.apply(table, entry)?;
            Ok(self.result)
        } else {
            Ok(RuleResult::Continue)
        }
    }

    fn validate(&self, table: &Table) -> Result<()> {
        self.action.validate(table)
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
enum RuleResult {
    Continue,
    Return,
}

/// Changes to make to a matching entry. There is deliberately no action that
/// removes tags.
#[derive(Debug, Deserialize)]
enum Action {
    AddBalancingPosting(String),
    AddTag(String),
    All(Vec<Action>),
    JumpChain(String),
    Noop,
    SetFlag(Flag),
    SetMeta(String, String),
    SetPayee(String),
}

impl Action {
    fn apply(&self, table: &Table, entry: &mut LedgerEntry) -> Result<()> {
        use Action::*;

        match self {
            AddBalancingPosting(account) => {
                let units = balancing_units(entry)?;
                entry.postings.push(Posting {
                    account: account.clone(),
                    units: Some(units),
                });
            }
            AddTag(name) => {
                entry.tags.insert(name.clone());
            }
            All(actions) => {
                for action in actions {
                    action.apply(table, entry)?;
                }
            }
            JumpChain(name) => {
                table.get_chain(name)?.apply(table, entry)?;
            }
            Noop => {}
            SetFlag(flag) => {
                entry.flag = *flag;
            }
            SetMeta(key, value) => {
                entry.metadata.insert(key.clone(), value.clone());
            }
            SetPayee(payee) => {
                entry.payee = payee.clone();
            }
        }

        Ok(())
    }

    fn validate(&self, table: &Table) -> Result<()> {
        use Action::*;

        match self {
            All(actions) => actions.iter().try_for_each(|action| action.validate(table)),
            JumpChain(name) => table.get_chain(name).map(|_| ()),
            SetMeta(key, _) if key == ID_KEY => {
                bail!("rules may not set the {:?} metadata", ID_KEY)
            }
            _ => Ok(()),
        }
    }

    fn jump_targets<'a>(&'a self, targets: &mut Vec<&'a str>) {
        match self {
            Action::All(actions) => actions.iter().for_each(|a| a.jump_targets(targets)),
            Action::JumpChain(name) => targets.push(name),
            _ => {}
        }
    }
}

/// Returns the amount that balances the postings already on `entry`.
fn balancing_units(entry: &LedgerEntry) -> Result<Units> {
    let currency = entry.currency().ok_or_else(|| {
        anyhow!(
            "cannot balance entry {:?} as it has no posting amounts",
            entry.metadata.get(ID_KEY)
        )
    })?;
    let mut sum = Decimal::ZERO;
    for units in entry.postings.iter().filter_map(|post| post.units.as_ref()) {
        if units.currency != currency {
            bail!(
                "cannot balance entry {:?} with mixed currencies {} and {}",
                entry.metadata.get(ID_KEY),
                currency,
                units.currency
            );
        }
        sum += units.quantity;
    }
    Ok(Units::new(-sum, currency))
}
