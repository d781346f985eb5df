//! Argumentos de línea de comandos de `main-core`.
use quest_core::ExperimentGroup;

use crate::errors::AppError;

pub const USAGE: &str = "usage: main-core [--session <id>] [--group <control|disclosure_only|proof_of_value|full_treatment>] [--instant]";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub session: Option<String>,
    /// Grupo fijo para sesiones nuevas (si no, asignación por hash).
    pub group: Option<ExperimentGroup>,
    /// Sin pausas de presentación.
    pub instant: bool,
    pub help: bool,
}

impl CliArgs {
    pub fn parse<I>(args: I) -> Result<Self, AppError>
        where I: IntoIterator<Item = String>
    {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--session" => parsed.session = Some(value_for(&arg, args.next())?),
                "--group" => {
                    let raw = value_for(&arg, args.next())?;
                    parsed.group = Some(raw.parse().map_err(|e| AppError::Usage(format!("{e}")))?);
                }
                "--instant" => parsed.instant = true,
                "-h" | "--help" => parsed.help = true,
                other => return Err(AppError::Usage(format!("unexpected argument {other:?}"))),
            }
        }
        Ok(parsed)
    }
}

fn value_for(flag: &str, value: Option<String>) -> Result<String, AppError> {
    value.filter(|v| !v.starts_with("--"))
         .ok_or_else(|| AppError::Usage(format!("{flag} needs a value")))
}
