use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    multiparticles::MultiparticleTable,
    plots::{combinations, generate_plots},
    process::{Process, ProcessDecomposer},
    registry::ParticleRegistry,
    utils::enums::CardType,
    CardResult, PdgId,
};

/// An analysis card: an append-only list of lines.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    lines: Vec<String>,
}

impl Card {
    /// Append a line.
    pub fn push<S: Into<String>>(&mut self, line: S) {
        self.lines.push(line.into());
    }
    /// All lines written so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
    /// The number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }
    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Extend<String> for Card {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.lines.extend(iter);
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

/// A class of reconstructed objects in a hadron-level card.
struct ObjectSlot {
    label: &'static str,
    pdg_codes: &'static [PdgId],
}

const JETS: ObjectSlot = ObjectSlot {
    label: "j",
    pdg_codes: &[4, 3, 2, 1, -1, -2, -3, -4, 21],
};
const BJETS: ObjectSlot = ObjectSlot {
    label: "b",
    pdg_codes: &[5, -5],
};
const ELECTRONS: ObjectSlot = ObjectSlot {
    label: "e",
    pdg_codes: &[11, -11],
};
const MUONS: ObjectSlot = ObjectSlot {
    label: "mu",
    pdg_codes: &[13, -13],
};
const TAUS: ObjectSlot = ObjectSlot {
    label: "ta",
    pdg_codes: &[15, -15],
};
const PHOTONS: ObjectSlot = ObjectSlot {
    label: "a",
    pdg_codes: &[22],
};

impl ObjectSlot {
    /// Count the particles which can be reconstructed as this object.
    fn count(&self, final_state: &[Vec<PdgId>]) -> usize {
        final_state
            .iter()
            .filter(|pdg_codes| pdg_codes.iter().any(|id| self.pdg_codes.contains(id)))
            .count()
    }

    fn plots(&self, multiplicity: usize, card: &mut Card, labels: &mut Vec<String>) {
        for i in 1..=multiplicity {
            let label = format!("{}[{}]", self.label, i);
            card.push(format!("plot PT({}) 40 0 500 [logY]", label));
            card.push(format!("plot ETA({}) 40 -10 10 [logY]", label));
            card.push(format!("plot MT_MET({}) 40 0 500 [logY]", label));
            labels.push(label);
        }
    }
}

const HADRON_TEMPLATE: &[&str] = &[
    "# Reconstruction using FastJet",
    "@MG5aMC reconstruction_name = BasicReco",
    "@MG5aMC inputs = *.hepmc, *.hep, *.stdhep",
    "set main.fastsim.package = fastjet",
    "set main.fastsim.algorithm = antikt",
    "set main.fastsim.radius = 0.4",
    "set main.fastsim.ptmin = 5.0",
    "# b-tagging",
    "set main.fastsim.bjet_id.matching_dr = 0.4",
    "set main.fastsim.bjet_id.efficiency = 1.0",
    "set main.fastsim.bjet_id.misid_cjet = 0.0",
    "set main.fastsim.bjet_id.misid_ljet = 0.0",
    "# tau-tagging",
    "set main.fastsim.tau_id.efficiency = 1.0",
    "set main.fastsim.tau_id.misid_ljet = 0.0",
    "",
    "# Reconstruction using Delphes",
    "@MG5aMC reconstruction_name = CMSReco",
    "@MG5aMC inputs = *.hepmc, *.hep, *.stdhep",
    "set main.fastsim.package  = delphes",
    "set main.fastsim.detector = cms-ma5tune",
    "",
    "# Analysis using both reco",
    "@MG5aMC analysis_name = analysis1",
    "@MG5aMC inputs = *.lhe, *.root",
    "@MG5aMC set_reconstructions = ['BasicReco', 'CMSReco']",
    "# object definition",
    "select (j)  PT > 20",
    "select (b)  PT > 20",
    "select (e)  PT > 10",
    "select (mu) PT > 10",
    "select (j)  ABSETA < 2.5",
    "select (b)  ABSETA < 2.5",
    "select (e)  ABSETA < 2.5",
    "select (mu) ABSETA < 2.5",
    "# Basic plots",
    "plot MET 40 0 500",
    "plot THT 40 0 500",
];

const PARTON_TEMPLATE: &[&str] = &[
    "@MG5aMC inputs = *.lhe",
    "# Global event variables",
    "plot THT   40 0 500 [logY]",
    "plot MET   40 0 500 [logY]",
    "plot SQRTS 40 0 500 [logY]",
];

/// Builds analysis cards from a generation history and a list of processes.
///
/// Every call to [`CardGenerator::generate`] starts from an empty card and rebuilds the
/// multiparticle definitions and invisible particles, so identical inputs always give
/// identical cards.
#[derive(Clone, Copy, Debug)]
pub struct CardGenerator<'a> {
    registry: &'a ParticleRegistry,
}

impl<'a> CardGenerator<'a> {
    /// Create a generator which looks particles up in `registry`.
    pub fn new(registry: &'a ParticleRegistry) -> Self {
        Self { registry }
    }

    /// Same as [`CardGenerator::generate`], with the card type given by name and the card
    /// returned as text.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::InvalidCard`](crate::CardError::InvalidCard) if `card_type` is not
    /// `parton` or `hadron`, and [`CardError::MultiParts`](crate::CardError::MultiParts) if a
    /// particle cannot be named.
    pub fn generate_card<S, P>(
        &self,
        history: &[S],
        processes: &[P],
        card_type: &str,
    ) -> CardResult<String>
    where
        S: AsRef<str>,
        P: Process,
    {
        let card_type = card_type.parse::<CardType>().map_err(|err| {
            error!("Unknown card type");
            err
        })?;
        Ok(self.generate(history, processes, card_type)?.to_string())
    }

    /// Build the card for the given processes.
    ///
    /// The card starts with the invisible particles of the model and, for parton-level cards,
    /// the multiparticle definitions found in `history`.
    pub fn generate<S, P>(
        &self,
        history: &[S],
        processes: &[P],
        card_type: CardType,
    ) -> CardResult<Card>
    where
        S: AsRef<str>,
        P: Process,
    {
        info!("Creating an MA5 card for the mode: {}", card_type);
        let mut card = Card::default();

        let mut invisible = self.registry.invisible_particles();
        if let Some(declaration) = invisible.declaration() {
            card.push("# Multiparticle definition");
            card.push(declaration);
        }

        info!("Getting the multiparticle definitions");
        let multiparticles = MultiparticleTable::build(history, self.registry)?;
        multiparticles.emit(
            &mut card,
            card_type == CardType::Parton,
            self.registry,
            &mut invisible,
        );
        debug!("  >> invisible: {:?}", invisible.iter().collect::<Vec<_>>());

        let decomposer = ProcessDecomposer::new(self.registry, &multiparticles, &invisible);
        match card_type {
            CardType::Parton => Self::parton_card(&decomposer, processes, &mut card)?,
            CardType::Hadron => Self::hadron_card(&decomposer, processes, &mut card)?,
        }
        Ok(card)
    }

    fn parton_card<P: Process>(
        decomposer: &ProcessDecomposer,
        processes: &[P],
        card: &mut Card,
    ) -> CardResult<()> {
        card.extend(PARTON_TEMPLATE.iter().map(|line| line.to_string()));
        info!("Decoding the considered process");
        for process in processes {
            debug!("  >> new process");
            let state = decomposer.decompose(process)?.state;
            debug!("    >> visible inter state particles: {:?}", state.intermediate);
            debug!("    >> visible final state particles: {:?}", state.final_state);
            debug!("    >> invisible final state particles: {:?}", state.invisible);
            card.extend(generate_plots(
                &state.intermediate,
                &state.final_state,
                &state.invisible,
            ));
            if !state.intermediate.is_empty() {
                let state = decomposer.resolve(process.decay_chains(), state)?;
                debug!(
                    "    >> visible final state particles after decay: {:?}",
                    state.final_state
                );
                debug!(
                    "    >> invisible final state particles after decay: {:?}",
                    state.invisible
                );
                card.extend(generate_plots(
                    &state.intermediate,
                    &state.final_state,
                    &state.invisible,
                ));
            }
        }
        Ok(())
    }

    fn hadron_card<P: Process>(
        decomposer: &ProcessDecomposer,
        processes: &[P],
        card: &mut Card,
    ) -> CardResult<()> {
        card.extend(HADRON_TEMPLATE.iter().map(|line| line.to_string()));

        let slots = [&JETS, &BJETS, &ELECTRONS, &MUONS, &TAUS, &PHOTONS];
        let mut multiplicities = [0usize; 6];
        for process in processes {
            let final_state = decomposer.final_state_identifiers(process)?;
            for (multiplicity, slot) in multiplicities.iter_mut().zip(slots) {
                *multiplicity = (*multiplicity).max(slot.count(&final_state));
            }
        }
        let [nj, nb, ne, nmu, ntau, na] = multiplicities;
        debug!("  >> multiplicities: j={nj} b={nb} e={ne} mu={nmu} ta={ntau} a={na}");

        let mut labels = Vec::new();
        card.push("# basic properties of the non-b-tagged jets");
        JETS.plots(nj.max(2), card, &mut labels);
        if nb != 0 {
            card.push("# basic properties of the b-tagged jets");
            BJETS.plots(nb, card, &mut labels);
        }
        card.push("# basic properties of the leptons");
        ELECTRONS.plots(ne, card, &mut labels);
        MUONS.plots(nmu, card, &mut labels);
        TAUS.plots(ntau, card, &mut labels);
        card.push("# basic properties of the photons");
        PHOTONS.plots(na, card, &mut labels);

        let combos = combinations(&labels);
        if !combos.is_empty() {
            card.push("# Invariant-mass distributions");
            for combination in &combos {
                card.push(format!("plot M({}) 40 0  500 [logY]", combination.join(" ")));
            }
            card.push("# Angular distance distributions");
            for pair in combos.iter().filter(|c| c.len() == 2) {
                card.push(format!("plot DELTAR({}) 40 0 10 [logY]", pair.join(",")));
            }
        }
        Ok(())
    }
}
