use anyhow::{bail, Context, Result};
use rhai::{Engine, AST};

use crate::entry::LedgerEntry;
use crate::rules::processor::Categorizer;
use crate::tags::ID_KEY;

mod types;

/// Name of the script function called once per entry.
const CATEGORIZE_FN: &str = "categorize";

pub struct Rhai {
    engine: Engine,
    ast: AST,
}

impl Rhai {
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let engine = Engine::new();
        let ast = engine.compile_file(path.into())?;
        Ok(Rhai { engine, ast })
    }

    #[cfg(test)]
    pub fn from_str(script: &str) -> Result<Self> {
        let engine = Engine::new();
        let ast = engine.compile(script)?;
        Ok(Rhai { engine, ast })
    }
}

impl Categorizer for Rhai {
    fn categorize(&self, entry: LedgerEntry) -> Result<LedgerEntry> {
        let provenance = entry.provenance.clone();
        let id = entry.metadata.get(ID_KEY).cloned();
        let tags = entry.tags.clone();
        let mut scope = rhai::Scope::new();
        let entry_obj: types::Map = entry.into();
        let result: rhai::Map = self
            .engine
            .call_fn(&mut scope, &self.ast, CATEGORIZE_FN, (entry_obj.0,))
            .with_context(|| {
                format!(
                    "calling {}() for record #{} of {}",
                    CATEGORIZE_FN, provenance.index, provenance.source
                )
            })?;
        let mut new_entry: LedgerEntry = types::Map(result).try_into().with_context(|| {
            format!(
                "converting return value from {}() into an entry",
                CATEGORIZE_FN
            )
        })?;
        if new_entry.metadata.get(ID_KEY) != id.as_ref() {
            bail!(
                "{}() changed the {:?} metadata of record #{} of {} from {:?} to {:?}",
                CATEGORIZE_FN,
                ID_KEY,
                provenance.index,
                provenance.source,
                id,
                new_entry.metadata.get(ID_KEY)
            );
        }
        // Scripts may add tags but not remove them.
        new_entry.tags.extend(tags);
        new_entry.provenance = provenance;
        Ok(new_entry)
    }
}
