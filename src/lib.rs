//! # ma5card
//!
//! `ma5card` turns the processes requested from a matrix-element generator into an analysis
//! card: a list of `define`, `select`, and `plot` directives which ask for the transverse
//! momentum, pseudorapidity, invariant mass, angular separation, and transverse mass of every
//! distinguishable combination of particles in the event.
//!
//! The crate never computes any observable. It only decides which plots to request by walking
//! the process tree (including decay chains), tagging repeated species as `j[1]`, `j[2]`, ...,
//! and enumerating the combinations of those tagged particles.
//!
//! ```
//! use ma5card::{
//!     CardGenerator, CardType, LegDefinition, ParticleRecord, ParticleRegistry, ProcessDefinition,
//! };
//!
//! let registry = ParticleRegistry::new([
//!     ParticleRecord::new(11, "e-", "e+", "ZERO", 1, -1.0),
//!     ParticleRecord::new(12, "ve", "ve~", "ZERO", 1, 0.0),
//! ]);
//! let process = ProcessDefinition::new(vec![
//!     LegDefinition::initial([11]),
//!     LegDefinition::initial([-11]),
//!     LegDefinition::final_state([11]),
//!     LegDefinition::final_state([-12]),
//! ]);
//! let card = CardGenerator::new(&registry)
//!     .generate(&["import model sm"], &[process], CardType::Parton)
//!     .unwrap();
//! assert!(card.to_string().contains("plot MT_MET(e-[1]) 40 0  500 [logY]"));
//! ```
#![warn(clippy::perf, clippy::style)]
#![warn(missing_docs)]

use thiserror::Error;

/// Assembly of full parton- and hadron-level [`Card`]s.
pub mod card;
/// User-defined multiparticle labels.
pub mod multiparticles;
/// Plot directives for a set of resolved particles.
pub mod plots;
/// Process trees, their decomposition into initial/intermediate/final particles, and decay
/// resolution.
pub mod process;
/// Particle lookups backed by an external physics model.
pub mod registry;
/// Utility enums.
pub mod utils;

pub use crate::card::{Card, CardGenerator};
pub use crate::multiparticles::MultiparticleTable;
pub use crate::plots::{combinations, generate_plots, tally};
pub use crate::process::{
    Leg, LegDefinition, Particle, Process, ProcessDecomposer, ProcessDefinition, ResolvedState,
};
pub use crate::registry::{InvisibleSet, ParticleRecord, ParticleRegistry};
pub use crate::utils::enums::{CardType, PlotTag};

/// A signed particle identifier as used by the PDG numbering scheme (the sign distinguishes a
/// particle from its antiparticle).
pub type PdgId = i32;

/// Shorthand for results returned by this crate.
pub type CardResult<T> = Result<T, CardError>;

/// The error type used by all `ma5card` methods
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CardError {
    /// An error which occurs when the requested card type is neither `parton` nor `hadron`.
    #[error("Unknown card type \"{name}\"! Expected \"parton\" or \"hadron\"")]
    InvalidCard {
        /// The requested card type
        name: String,
    },
    /// An error which occurs when a particle name or a list of identifiers cannot be resolved
    /// through the model or the multiparticle definitions.
    #[error("Problem with the multiparticle definitions: cannot resolve \"{particles}\"")]
    MultiParts {
        /// The name or identifier list which failed lookup
        particles: String,
    },
}

impl CardError {
    pub(crate) fn multiparts_from_ids(ids: &[PdgId]) -> Self {
        CardError::MultiParts {
            particles: format!("{:?}", ids),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let err = CardError::InvalidCard {
            name: "detector".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown card type \"detector\"! Expected \"parton\" or \"hadron\""
        );
        let err = CardError::multiparts_from_ids(&[1, 2]);
        assert_eq!(
            err.to_string(),
            "Problem with the multiparticle definitions: cannot resolve \"[1, 2]\""
        );
    }
}
