//! Grupos de experimento.
//!
//! El sistema remoto asigna un grupo una sola vez por sesión. El cliente
//! nunca lo cambia; sólo lo usa para elegir topología y comportamiento del
//! cierre.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigurationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentGroup {
    Control,
    DisclosureOnly,
    ProofOfValue,
    FullTreatment,
}

impl ExperimentGroup {
    pub const ALL: [ExperimentGroup; 4] = [ExperimentGroup::Control,
                                           ExperimentGroup::DisclosureOnly,
                                           ExperimentGroup::ProofOfValue,
                                           ExperimentGroup::FullTreatment];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperimentGroup::Control => "control",
            ExperimentGroup::DisclosureOnly => "disclosure_only",
            ExperimentGroup::ProofOfValue => "proof_of_value",
            ExperimentGroup::FullTreatment => "full_treatment",
        }
    }
}

impl fmt::Display for ExperimentGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperimentGroup {
    type Err = ConfigurationError;

    /// Rechaza cualquier string fuera del conjunto conocido en lugar de
    /// mapearlo a un grupo por defecto.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExperimentGroup::ALL.iter()
                            .copied()
                            .find(|g| g.as_str() == s)
                            .ok_or_else(|| ConfigurationError::UnknownExperimentGroup(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_unknown_group() {
        assert_eq!("control".parse::<ExperimentGroup>(), Ok(ExperimentGroup::Control));
        assert_eq!("Control".parse::<ExperimentGroup>(),
                   Err(ConfigurationError::UnknownExperimentGroup("Control".into())));
    }
}
