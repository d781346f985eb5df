//! quest-adapters: contenido concreto del cuestionario.
//!
//! El core sólo conoce `PhaseFactory`; aquí viven las factories de cada fase
//! (qué se pregunta y con qué widget) y el mapa estándar que cubre todas las
//! topologías de `TopologyRegistry::standard()`.
//!
//! Cada factory emite a lo sumo un mensaje visible, opcionalmente precedido
//! de un indicador de escritura.

pub mod content;
pub mod phases;

use quest_core::{FlowCopy, PhaseFactoryMap};

use phases::closing::{CompletionFactory, DebriefFactory};
use phases::intro::{BriefingFactory, IntroFactory};
use phases::puzzle::SkillPuzzleFactory;
use phases::treatment::{CompensationOfferFactory, DisclosureFactory, ProofOfValueFactory};

/// Mapa con una factory por cada fase conocida.
pub fn standard_factories(copy: &FlowCopy) -> PhaseFactoryMap {
    PhaseFactoryMap::new().with(IntroFactory::new())
                          .with(BriefingFactory::new())
                          .with(DisclosureFactory::new())
                          .with(ProofOfValueFactory::new())
                          .with(SkillPuzzleFactory::new())
                          .with(CompensationOfferFactory::new(copy.clone()))
                          .with(DebriefFactory::new())
                          .with(CompletionFactory::new(copy.clone()))
}
