use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    multiparticles::MultiparticleTable,
    registry::{InvisibleSet, ParticleRegistry},
    CardResult, PdgId,
};

/// One external line of a process.
pub trait Leg {
    /// The candidate identifiers of the particle on this line (several for a multiparticle).
    fn ids(&self) -> &[PdgId];
    /// Returns `true` for outgoing particles and `false` for incoming ones.
    fn is_final_state(&self) -> bool;
}

/// A process as produced by the matrix-element generator.
///
/// Only the shape of the process tree matters here: its external legs and, for every leg
/// which decays further, a child process whose first leg is the decaying particle.
pub trait Process: Sized {
    /// The leg type of this process.
    type Leg: Leg;
    /// The external legs of the process.
    fn legs(&self) -> &[Self::Leg];
    /// The decay chains attached to the legs of this process.
    fn decay_chains(&self) -> &[Self];
}

/// A plain [`Leg`] implementation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegDefinition {
    /// Candidate identifiers.
    pub ids: Vec<PdgId>,
    /// `true` for final-state legs.
    pub state: bool,
}

impl LegDefinition {
    /// An incoming leg.
    pub fn initial<I: IntoIterator<Item = PdgId>>(ids: I) -> Self {
        Self {
            ids: ids.into_iter().collect(),
            state: false,
        }
    }
    /// An outgoing leg.
    pub fn final_state<I: IntoIterator<Item = PdgId>>(ids: I) -> Self {
        Self {
            ids: ids.into_iter().collect(),
            state: true,
        }
    }
}

impl Leg for LegDefinition {
    fn ids(&self) -> &[PdgId] {
        &self.ids
    }
    fn is_final_state(&self) -> bool {
        self.state
    }
}

/// A plain [`Process`] implementation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDefinition {
    /// External legs.
    pub legs: Vec<LegDefinition>,
    /// Decay chains, one per decaying leg.
    pub decay_chains: Vec<ProcessDefinition>,
}

impl ProcessDefinition {
    /// A process without decays.
    pub fn new(legs: Vec<LegDefinition>) -> Self {
        Self {
            legs,
            decay_chains: Vec::new(),
        }
    }
    /// Attach a decay chain. The first leg of `chain` must be the decaying particle.
    pub fn with_decay(mut self, chain: ProcessDefinition) -> Self {
        self.decay_chains.push(chain);
        self
    }
}

impl Process for ProcessDefinition {
    type Leg = LegDefinition;
    fn legs(&self) -> &[LegDefinition] {
        &self.legs
    }
    fn decay_chains(&self) -> &[ProcessDefinition] {
        &self.decay_chains
    }
}

/// A particle of a process: its card name together with its sorted candidate identifiers.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Particle {
    /// Model name or multiparticle label.
    pub name: String,
    /// Sorted candidate identifiers.
    pub pdg_codes: Vec<PdgId>,
}

impl Display for Particle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn names(particles: &[Particle]) -> Vec<&str> {
    particles.iter().map(|p| p.name.as_str()).collect()
}

/// The particles of a process at one stage of its decay history. Each list is a multiset:
/// repeated particles appear several times.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedState {
    /// Particles which decay further.
    pub intermediate: Vec<Particle>,
    /// Visible final-state particles.
    pub final_state: Vec<Particle>,
    /// Invisible final-state particles.
    pub invisible: Vec<Particle>,
}

impl ResolvedState {
    fn absorb(&mut self, other: &ResolvedState) {
        self.intermediate.extend(other.intermediate.iter().cloned());
        self.final_state.extend(other.final_state.iter().cloned());
        self.invisible.extend(other.invisible.iter().cloned());
    }
}

/// The result of splitting the legs of a single process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Decomposition {
    /// Incoming particles.
    pub initial: Vec<Particle>,
    /// Outgoing particles.
    pub state: ResolvedState,
}

/// Splits processes into initial, intermediate, and final particles and follows their decay
/// chains.
#[derive(Clone, Copy, Debug)]
pub struct ProcessDecomposer<'a> {
    registry: &'a ParticleRegistry,
    multiparticles: &'a MultiparticleTable,
    invisible: &'a InvisibleSet,
}

impl<'a> ProcessDecomposer<'a> {
    /// Create a decomposer which names particles through `registry` and `multiparticles` and
    /// separates out the names found in `invisible`.
    pub fn new(
        registry: &'a ParticleRegistry,
        multiparticles: &'a MultiparticleTable,
        invisible: &'a InvisibleSet,
    ) -> Self {
        Self {
            registry,
            multiparticles,
            invisible,
        }
    }

    /// Name a set of candidate identifiers.
    pub fn particle(&self, ids: &[PdgId]) -> CardResult<Particle> {
        let mut pdg_codes = ids.to_vec();
        pdg_codes.sort_unstable();
        let name = self.registry.resolve_name(&pdg_codes, self.multiparticles)?;
        Ok(Particle { name, pdg_codes })
    }

    /// Split the legs of a process.
    ///
    /// Incoming legs are initial particles. An outgoing leg is intermediate if some decay chain
    /// of the process starts with exactly the same identifiers, and final otherwise. Final
    /// particles whose name is invisible are then moved to the invisible list.
    pub fn decompose<P: Process>(&self, process: &P) -> CardResult<Decomposition> {
        let decaying: Vec<Vec<PdgId>> = process
            .decay_chains()
            .iter()
            .filter_map(|chain| chain.legs().first())
            .map(|leg| {
                let mut ids = leg.ids().to_vec();
                ids.sort_unstable();
                ids
            })
            .collect();

        let mut decomposition = Decomposition::default();
        let mut outgoing = Vec::new();
        for leg in process.legs() {
            let particle = self.particle(leg.ids())?;
            if !leg.is_final_state() {
                decomposition.initial.push(particle);
            } else if decaying.contains(&particle.pdg_codes) {
                decomposition.state.intermediate.push(particle);
            } else {
                outgoing.push(particle);
            }
        }
        let (invisible, visible): (Vec<Particle>, Vec<Particle>) = outgoing
            .into_iter()
            .partition(|particle| self.invisible.contains(&particle.name));
        decomposition.state.final_state = visible;
        decomposition.state.invisible = invisible;
        Ok(decomposition)
    }

    /// Replace intermediate particles by the products of their decay chains.
    ///
    /// Each chain consumes one occurrence of its decaying particle from
    /// `state.intermediate` and contributes its own intermediate, final, and invisible
    /// particles. A chain whose decaying particle is not (or no longer) among the intermediate
    /// particles contributes nothing. While intermediate particles remain, the decay chains
    /// of each processed chain are followed recursively.
    pub fn resolve<P: Process>(
        &self,
        chains: &[P],
        mut state: ResolvedState,
    ) -> CardResult<ResolvedState> {
        for chain in chains {
            let decay = self.decompose(chain)?;
            for parent in &decay.initial {
                match state
                    .intermediate
                    .iter()
                    .position(|particle| particle.pdg_codes == parent.pdg_codes)
                {
                    Some(index) => {
                        state.intermediate.remove(index);
                        state.absorb(&decay.state);
                    }
                    // TODO: surface unmatched chains to the caller, their products are dropped.
                    None => debug!("    >> no intermediate {} to decay", parent),
                }
            }
            if !state.intermediate.is_empty() {
                state = self.resolve(chain.decay_chains(), state)?;
            }
        }
        Ok(state)
    }

    /// Decompose a process and follow all of its decays.
    pub fn resolve_process<P: Process>(&self, process: &P) -> CardResult<ResolvedState> {
        let state = self.decompose(process)?.state;
        if state.intermediate.is_empty() {
            Ok(state)
        } else {
            self.resolve(process.decay_chains(), state)
        }
    }

    /// The identifiers of the visible final-state particles of a process after all decays.
    pub fn final_state_identifiers<P: Process>(
        &self,
        process: &P,
    ) -> CardResult<Vec<Vec<PdgId>>> {
        let state = self.resolve_process(process)?;
        debug!("    >> final state: {:?}", names(&state.final_state));
        Ok(state
            .final_state
            .into_iter()
            .map(|particle| particle.pdg_codes)
            .collect())
    }
}
