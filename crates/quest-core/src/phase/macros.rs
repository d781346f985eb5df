//! Macro utilitaria para reducir boilerplate al definir factories de fase.
//!
//! Exportada en la raíz del crate:
//!   use quest_core::phase_factory;
//!
//! Formas soportadas:
//! - con fields (ctor `new` generado con los fields en orden);
//! - unit (sin fields, `new()` sin argumentos).
//!
//! El cuerpo puede devolver cualquier cosa convertible a `FactoryOutput`
//! (`ChatMessage`, `Vec<ChatMessage>`, `Option<ChatMessage>`).

#[macro_export]
macro_rules! phase_factory {
    // ---------------- Factory con fields ----------------
    (
        $name:ident {
            phase: $phase:expr,
            fields { $($fname:ident : $fty:ty),+ $(,)? }
            , build($self_ident:ident, $state_ident:ident, $cont_ident:ident) $body:block
        }
    ) => {
        #[derive(Clone, Debug)]
        pub struct $name { $(pub $fname: $fty),+ }
        impl $name { pub fn new($($fname : $fty),+) -> Self { Self { $($fname),+ } } }
        impl $crate::phase::PhaseFactory for $name {
            fn phase(&self) -> $crate::model::Phase { $phase }
            fn build(&self,
                     $state_ident: &$crate::model::FlowState,
                     $cont_ident: $crate::engine::Continuation)
                     -> $crate::phase::FactoryOutput {
                let $self_ident = self;
                $crate::phase::FactoryOutput::from($body)
            }
        }
    };

    // ---------------- Factory unit (sin fields) ----------------
    (
        $name:ident {
            phase: $phase:expr,
            build($state_ident:ident, $cont_ident:ident) $body:block
        }
    ) => {
        #[derive(Clone, Debug, Default)]
        pub struct $name;
        impl $name { pub fn new() -> Self { Self } }
        impl $crate::phase::PhaseFactory for $name {
            fn phase(&self) -> $crate::model::Phase { $phase }
            fn build(&self,
                     $state_ident: &$crate::model::FlowState,
                     $cont_ident: $crate::engine::Continuation)
                     -> $crate::phase::FactoryOutput {
                $crate::phase::FactoryOutput::from($body)
            }
        }
    };
}
