use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{multiparticles::MultiparticleTable, CardError, CardResult, PdgId};

/// The model name of the photon, which is never considered invisible.
pub const PHOTON_NAME: &str = "a";
/// The width parameter used by models for particles with vanishing width.
pub const ZERO_WIDTH: &str = "ZERO";

/// A single entry of the external physics model.
///
/// Models list each particle/antiparticle pair under both identifiers, with
/// [`is_part`](ParticleRecord::is_part) telling which of the two the entry describes. The
/// `width` is the name of the model parameter holding the width of the particle, so a
/// vanishing width is spelled [`ZERO_WIDTH`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    /// The signed identifier of this entry.
    pub pdg_code: PdgId,
    /// The name of the particle.
    pub name: String,
    /// The name of the antiparticle (equal to `name` for self-conjugate particles).
    pub antiname: String,
    /// Whether this entry is the particle (`true`) or the antiparticle (`false`).
    pub is_part: bool,
    /// The name of the width parameter.
    pub width: String,
    /// The dimension of the color representation (`1` for a color singlet).
    pub color: i32,
    /// The electric charge of the particle in units of the positron charge.
    pub charge: f64,
}

impl ParticleRecord {
    /// Create the particle entry of a particle/antiparticle pair.
    pub fn new(
        pdg_code: PdgId,
        name: &str,
        antiname: &str,
        width: &str,
        color: i32,
        charge: f64,
    ) -> Self {
        Self {
            pdg_code,
            name: name.to_string(),
            antiname: antiname.to_string(),
            is_part: true,
            width: width.to_string(),
            color,
            charge,
        }
    }

    /// The name under which this entry appears in processes and cards.
    pub fn display_name(&self) -> &str {
        if self.is_part {
            &self.name
        } else {
            &self.antiname
        }
    }

    /// Returns `true` if the particle is its own antiparticle.
    pub fn is_self_conjugate(&self) -> bool {
        self.name == self.antiname
    }

    /// Returns `true` for chargeless, colorless, zero-width particles other than the photon.
    /// Such particles escape the detector and show up as missing energy.
    pub fn is_invisible(&self) -> bool {
        self.width == ZERO_WIDTH
            && self.color == 1
            && self.charge == 0.0
            && self.name != PHOTON_NAME
    }

    fn conjugate(&self) -> Self {
        Self {
            pdg_code: -self.pdg_code,
            is_part: !self.is_part,
            ..self.clone()
        }
    }
}

/// The set of names of invisible particles.
///
/// The set starts out with every invisible model particle and antiparticle and grows as
/// multiparticle labels made exclusively of invisible particles are discovered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvisibleSet {
    names: IndexSet<String>,
}

impl InvisibleSet {
    /// Check if the given name is invisible.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
    /// Mark a name as invisible. Returns `false` if it was already present.
    pub fn insert(&mut self, name: &str) -> bool {
        self.names.insert(name.to_string())
    }
    /// The number of invisible names.
    pub fn len(&self) -> usize {
        self.names.len()
    }
    /// Returns `true` if there are no invisible names.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
    /// Iterate over the names in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
    /// The `define invisible = ...` card line, or `None` if the set is empty.
    pub fn declaration(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(format!(
                "define invisible = {}",
                self.iter().collect::<Vec<_>>().join(" ")
            ))
        }
    }
}

/// Read-only lookups into the external physics model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleRegistry {
    particles: IndexMap<PdgId, ParticleRecord>,
}

impl ParticleRegistry {
    /// Build a registry from particle entries. The antiparticle entry of every
    /// non-self-conjugate particle is added automatically unless it is given explicitly.
    pub fn new<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ParticleRecord>,
    {
        let mut particles = IndexMap::new();
        for record in records {
            if !record.is_self_conjugate() {
                let conjugate = record.conjugate();
                particles.entry(conjugate.pdg_code).or_insert(conjugate);
            }
            particles.insert(record.pdg_code, record);
        }
        Self { particles }
    }

    /// Build a registry from a complete model dictionary, taken as is.
    pub fn from_dict(particles: IndexMap<PdgId, ParticleRecord>) -> Self {
        Self { particles }
    }

    /// Get the model entry for an identifier.
    pub fn get(&self, pdg_code: PdgId) -> Option<&ParticleRecord> {
        self.particles.get(&pdg_code)
    }

    /// The number of model entries (particles and antiparticles are counted separately).
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Returns `true` if the model has no entries.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Iterate over all model entries.
    pub fn iter(&self) -> impl Iterator<Item = &ParticleRecord> {
        self.particles.values()
    }

    /// Find the identifier of a single model particle by its name (or antiname, for
    /// antiparticles).
    pub fn pdg_code(&self, name: &str) -> Option<PdgId> {
        self.particles.iter().find_map(|(pdg_code, record)| {
            let matches = if record.is_part {
                record.name == name
            } else {
                record.antiname == name
            };
            if matches {
                Some(*pdg_code)
            } else {
                None
            }
        })
    }

    /// Get the name of a set of candidate identifiers.
    ///
    /// A single identifier resolves to its model name (or antiname). Several identifiers
    /// resolve to the label of the multiparticle with exactly the same (sorted) identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::MultiParts`] if no name matches.
    pub fn resolve_name(
        &self,
        pdg_codes: &[PdgId],
        multiparticles: &MultiparticleTable,
    ) -> CardResult<String> {
        let mut sorted = pdg_codes.to_vec();
        sorted.sort_unstable();
        let name = match sorted.as_slice() {
            [pdg_code] => self
                .get(*pdg_code)
                .map(|record| record.display_name().to_string()),
            [] => None,
            _ => multiparticles.label_for(&sorted).map(str::to_string),
        };
        name.ok_or_else(|| {
            error!("Cannot find the name associated with the pdg code list {:?}", sorted);
            CardError::multiparts_from_ids(&sorted)
        })
    }

    /// Get the identifiers behind a name, which is either a model particle or a multiparticle
    /// label.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::MultiParts`] if the name is unknown to both sources.
    pub fn resolve_identifiers(
        &self,
        name: &str,
        multiparticles: &MultiparticleTable,
    ) -> CardResult<Vec<PdgId>> {
        if let Some(pdg_code) = self.pdg_code(name) {
            return Ok(vec![pdg_code]);
        }
        if let Some(pdg_codes) = multiparticles.get(name) {
            return Ok(pdg_codes.to_vec());
        }
        error!("Cannot find the pdg codes associated with the name {}", name);
        Err(CardError::MultiParts {
            particles: name.to_string(),
        })
    }

    /// Names of all invisible model particles and antiparticles, in model order.
    pub fn invisible_particles(&self) -> InvisibleSet {
        let mut invisible = InvisibleSet::default();
        for record in self.iter().filter(|record| record.is_invisible()) {
            invisible.insert(&record.name);
            invisible.insert(&record.antiname);
        }
        invisible
    }
}

/// A small Standard-Model-like registry used throughout the tests.
#[cfg(test)]
pub(crate) fn test_registry() -> ParticleRegistry {
    ParticleRegistry::new([
        ParticleRecord::new(1, "d", "d~", ZERO_WIDTH, 3, -1.0 / 3.0),
        ParticleRecord::new(2, "u", "u~", ZERO_WIDTH, 3, 2.0 / 3.0),
        ParticleRecord::new(3, "s", "s~", ZERO_WIDTH, 3, -1.0 / 3.0),
        ParticleRecord::new(4, "c", "c~", ZERO_WIDTH, 3, 2.0 / 3.0),
        ParticleRecord::new(5, "b", "b~", ZERO_WIDTH, 3, -1.0 / 3.0),
        ParticleRecord::new(6, "t", "t~", "WT", 3, 2.0 / 3.0),
        ParticleRecord::new(11, "e-", "e+", ZERO_WIDTH, 1, -1.0),
        ParticleRecord::new(12, "ve", "ve~", ZERO_WIDTH, 1, 0.0),
        ParticleRecord::new(13, "mu-", "mu+", ZERO_WIDTH, 1, -1.0),
        ParticleRecord::new(14, "vm", "vm~", ZERO_WIDTH, 1, 0.0),
        ParticleRecord::new(15, "ta-", "ta+", ZERO_WIDTH, 1, -1.0),
        ParticleRecord::new(16, "vt", "vt~", ZERO_WIDTH, 1, 0.0),
        ParticleRecord::new(21, "g", "g", ZERO_WIDTH, 8, 0.0),
        ParticleRecord::new(22, "a", "a", ZERO_WIDTH, 1, 0.0),
        ParticleRecord::new(23, "z", "z", "WZ", 1, 0.0),
        ParticleRecord::new(24, "w+", "w-", "WW", 1, 1.0),
        ParticleRecord::new(25, "h", "h", "WH", 1, 0.0),
    ])
}
