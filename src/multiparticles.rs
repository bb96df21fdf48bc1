use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{
    card::Card,
    registry::{InvisibleSet, ParticleRegistry},
    CardError, CardResult, PdgId,
};

/// User-defined labels standing for sets of model particles (`define p = u d u~ d~`).
///
/// Each label maps to a sorted, duplicate-free list of identifiers. Labels keep the order in
/// which they were declared.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiparticleTable {
    definitions: IndexMap<String, Vec<PdgId>>,
}

impl MultiparticleTable {
    /// Read every `define <label> = <particles...>` line of a generation history.
    ///
    /// Particles may themselves be labels defined earlier in the history, in which case their
    /// identifiers are inlined. Lines without the `define` keyword are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::MultiParts`] if a particle cannot be resolved or if a line has no
    /// label.
    pub fn build<I, S>(history: I, registry: &ParticleRegistry) -> CardResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::default();
        for line in history {
            let line = line.as_ref();
            if !line.contains("define") {
                continue;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let Some(label) = tokens.get(1) else {
                error!("Cannot read the multiparticle definition \"{}\"", line);
                return Err(CardError::MultiParts {
                    particles: line.to_string(),
                });
            };
            let particles: &[&str] = match tokens.get(2) {
                Some(&"=") => &tokens[3..],
                Some(_) => &tokens[2..],
                None => &[],
            };
            debug!("pdgs = {:?}", particles);
            let mut pdg_codes = Vec::new();
            for particle in particles {
                pdg_codes.extend(registry.resolve_identifiers(particle, &table)?);
            }
            table.insert(label, pdg_codes);
        }
        debug!("multiparticles: {:?}", table.definitions);
        Ok(table)
    }

    /// Add (or replace) a label. The identifiers are sorted and deduplicated.
    pub fn insert<I>(&mut self, label: &str, pdg_codes: I)
    where
        I: IntoIterator<Item = PdgId>,
    {
        let mut pdg_codes: Vec<PdgId> = pdg_codes.into_iter().collect();
        pdg_codes.sort_unstable();
        pdg_codes.dedup();
        self.definitions.insert(label.to_string(), pdg_codes);
    }

    /// Get the identifiers behind a label.
    pub fn get(&self, label: &str) -> Option<&[PdgId]> {
        self.definitions.get(label).map(Vec::as_slice)
    }

    /// Find the label whose identifiers are exactly the given sorted list.
    pub fn label_for(&self, sorted_pdg_codes: &[PdgId]) -> Option<&str> {
        self.definitions
            .iter()
            .find(|(_, pdg_codes)| pdg_codes.as_slice() == sorted_pdg_codes)
            .map(|(label, _)| label.as_str())
    }

    /// The number of labels.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns `true` if no label is defined.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Iterate over labels and identifiers in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PdgId])> {
        self.definitions
            .iter()
            .map(|(label, pdg_codes)| (label.as_str(), pdg_codes.as_slice()))
    }

    /// Mark as invisible every label made exclusively of invisible model particles.
    pub fn propagate_invisibility(
        &self,
        registry: &ParticleRegistry,
        invisible: &mut InvisibleSet,
    ) {
        let invisible_codes: HashSet<PdgId> = invisible
            .iter()
            .filter_map(|name| registry.pdg_code(name))
            .collect();
        for (label, pdg_codes) in self.iter() {
            if pdg_codes.iter().all(|pdg_code| invisible_codes.contains(pdg_code)) {
                invisible.insert(label);
            }
        }
    }

    /// Write one `define <label> = <ids...>` line per label to the card if
    /// `include_definitions` is set. Invisibility is propagated to the labels either way.
    pub fn emit(
        &self,
        card: &mut Card,
        include_definitions: bool,
        registry: &ParticleRegistry,
        invisible: &mut InvisibleSet,
    ) {
        self.propagate_invisibility(registry, invisible);
        if include_definitions {
            for (label, pdg_codes) in self.iter() {
                let pdg_codes: Vec<String> = pdg_codes.iter().map(|id| id.to_string()).collect();
                card.push(format!("define {} = {}", label, pdg_codes.join(" ")));
            }
        }
    }
}
