use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::CardError;

/// The kind of analysis card to produce.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    /// A card for parton-level events (`*.lhe`), with plots for every particle of every process,
    /// before and after decays.
    Parton,
    /// A card for hadron-level events (`*.hepmc`, `*.hep`, `*.stdhep`) which are first run
    /// through a jet clustering or detector simulation, with plots for reconstructed objects.
    Hadron,
}

impl Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardType::Parton => write!(f, "parton"),
            CardType::Hadron => write!(f, "hadron"),
        }
    }
}

impl FromStr for CardType {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parton" => Ok(Self::Parton),
            "hadron" => Ok(Self::Hadron),
            _ => Err(CardError::InvalidCard {
                name: s.to_string(),
            }),
        }
    }
}

/// The flag attached to a plot which tells the analysis which particles to consider.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlotTag {
    /// No flag: the plot uses final-state particles.
    Final,
    /// The plot uses intermediate-state particles (which decay later in the event).
    InterState,
    /// The plot uses particles from any stage of the event.
    AllState,
}

impl Display for PlotTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlotTag::Final => write!(f, ""),
            PlotTag::InterState => write!(f, "interstate"),
            PlotTag::AllState => write!(f, "allstate"),
        }
    }
}
