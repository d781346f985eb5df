//! `main-core`: cuestionario de chat en la terminal.
//!
//! Reanuda (o crea) una sesión en el backend configurado, pinta los mensajes
//! y contesta cada paso con una línea de stdin. `stop` termina antes la fase
//! que lo admite; EOF cierra la sesión sin avanzar.
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use env_logger::{Builder, Env, Target};
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};

use quest_adapters::standard_factories;
use quest_core::{FinishReason, FlowOrchestrator, FlowProgress, GroupAssignment, InstantScheduler, PresentationConfig,
                 TopologyRegistry};
use quest_persistence::build_gateway;
use questflow_rust::cli::{CliArgs, USAGE};
use questflow_rust::config::CONFIG;
use questflow_rust::console::{parse_answer, ConsoleSurface};
use questflow_rust::errors::AppError;

#[tokio::main]
async fn main() {
    Builder::from_env(Env::default().default_filter_or("warn")).target(Target::Stderr)
                                                               .init();
    match run().await {
        Ok(Some(FinishReason::Aborted(_))) => std::process::exit(2),
        Ok(_) => {}
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<Option<FinishReason>, AppError> {
    let args = CliArgs::parse(std::env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(None);
    }
    let config = &*CONFIG;
    let session = args.session
                      .clone()
                      .or_else(|| config.session_id.clone())
                      .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
    let assignment = args.group.map(GroupAssignment::Pinned).unwrap_or_default();
    let registry = TopologyRegistry::standard();
    let gateway = build_gateway(&config.store, registry.clone(), assignment)?;
    let surface = Arc::new(ConsoleSurface::stdout());
    let finished: Arc<Mutex<Option<FinishReason>>> = Arc::default();
    let sink = finished.clone();

    let mut builder = FlowOrchestrator::builder(gateway, surface.clone()).registry(registry)
                                                                         .factories(standard_factories(&config.flow.copy))
                                                                         .session(session.clone())
                                                                         .config(&config.flow)
                                                                         .on_finish(move |reason| {
                                                                             *sink.lock().unwrap_or_else(PoisonError::into_inner) = Some(reason);
                                                                         });
    if args.instant {
        builder = builder.presentation(PresentationConfig::instant())
                         .scheduler(Arc::new(InstantScheduler::new()));
    }
    let orchestrator = builder.build()?;
    info!("main:start session={session}");
    println!("session: {session}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut progress = orchestrator.start().await;
    loop {
        match &progress {
            p if p.is_terminal() => break,
            FlowProgress::Cancelled | FlowProgress::Detached => break,
            FlowProgress::Failed(err) => println!("(could not save your answer: {err}; try again)"),
            FlowProgress::Busy => println!("(still saving, one moment)"),
            _ => {}
        }
        let Some(message) = surface.pending() else {
            break;
        };
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            orchestrator.cleanup();
            println!();
            break;
        };
        progress = message.continuation().invoke(parse_answer(&line, &message)).await;
    }

    let reason = finished.lock().unwrap_or_else(PoisonError::into_inner).clone();
    match &reason {
        Some(FinishReason::Completed) => println!("flow completed"),
        Some(FinishReason::Aborted(err)) => eprintln!("flow aborted: {err}"),
        None => println!("session {session} paused; run again with --session {session} to resume"),
    }
    Ok(reason)
}
