//! Fases del cuestionario.
//!
//! Una `Phase` es un token opaco: sólo tiene orden dentro de una
//! `FlowTopology`, nunca globalmente (por eso no deriva `Ord`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Saludo inicial; toda topología empieza aquí.
    Initial,
    Briefing,
    /// Aviso de que el asistente usa IA.
    Disclosure,
    /// Muestra de valor antes de pedir esfuerzo al usuario.
    ProofOfValue,
    /// Mini-juego de habilidades (admite salida anticipada).
    SkillPuzzle,
    /// Pregunta de disposición a pagar.
    CompensationOffer,
    Debrief,
    /// Fase terminal; toda topología termina aquí.
    Completed,
}

impl Phase {
    pub const ALL: [Phase; 8] = [Phase::Initial,
                                 Phase::Briefing,
                                 Phase::Disclosure,
                                 Phase::ProofOfValue,
                                 Phase::SkillPuzzle,
                                 Phase::CompensationOffer,
                                 Phase::Debrief,
                                 Phase::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Initial => "INITIAL",
            Phase::Briefing => "BRIEFING",
            Phase::Disclosure => "DISCLOSURE",
            Phase::ProofOfValue => "PROOF_OF_VALUE",
            Phase::SkillPuzzle => "SKILL_PUZZLE",
            Phase::CompensationOffer => "COMPENSATION_OFFER",
            Phase::Debrief => "DEBRIEF",
            Phase::Completed => "COMPLETED",
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL.iter()
                  .copied()
                  .find(|p| p.as_str() == s)
                  .ok_or_else(|| format!("unknown phase: {s}"))
    }
}
