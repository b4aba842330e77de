use anyhow::{Context, Result};
use lucid::config::{Config, ConfigStore};
use lucid::response::{ResponseCommand, ResponseEvent, ResponsePipeline};
use lucid::session::{Reveal, SessionRegistry};
use std::io::Write;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Console front-end over the core: reads prompts from stdin, streams
/// replies through the typewriter, persists sessions on exit. The tray UI is
/// a separate presentation layer over the same pipelines.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lucid=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Lucid assistant");

    let config = Arc::new(ConfigStore::open(Config::default_path()));
    let mut sessions = SessionRegistry::open(SessionRegistry::default_path());
    if sessions.is_empty() {
        sessions.create(&config.get());
    }
    let active = sessions.sessions()[0].id;

    let pipeline = ResponsePipeline::new(Arc::clone(&config));
    let command_tx = pipeline.command_sender();
    let event_rx = pipeline.event_receiver();
    pipeline.start_worker()?;

    println!("Lucid ({}). Type a prompt, or /quit to exit.", config.get().selected_model);

    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }
        if prompt == "/quit" {
            break;
        }

        let (model, log) = {
            let session = sessions
                .get(active)
                .context("active session missing from registry")?;
            (session.model_name.clone(), session.log.clone())
        };

        command_tx.send(ResponseCommand::Generate {
            session_id: active,
            model,
            log,
            prompt: prompt.to_string(),
            request_id: Uuid::new_v4(),
        })?;

        // Block until this request completes; the worker enforces the
        // generation timeout.
        let text = loop {
            match event_rx.recv()? {
                ResponseEvent::Started { .. } => continue,
                ResponseEvent::Complete { text, .. } => break text,
                ResponseEvent::Shutdown => return Ok(()),
            }
        };

        let speed = config.get().text_speed;
        let session = sessions
            .get_mut(active)
            .context("active session missing from registry")?;
        match session.typewriter.begin(&text, speed) {
            Reveal::Instant => println!("AI: {}", session.typewriter.visible()),
            Reveal::Timed { interval, ticket } => {
                print!("AI: ");
                std::io::stdout().flush()?;
                let mut shown = 0;
                loop {
                    std::thread::sleep(interval);
                    let Some(more) = session.typewriter.tick(ticket) else {
                        break;
                    };
                    let visible = session.typewriter.visible();
                    for c in visible.chars().skip(shown) {
                        print!("{}", c);
                    }
                    std::io::stdout().flush()?;
                    shown = visible.chars().count();
                    if !more {
                        break;
                    }
                }
                println!();
            }
        }

        sessions.persist_all()?;
    }

    let _ = command_tx.send(ResponseCommand::Shutdown);
    sessions.persist_all()?;
    info!("Sessions saved, exiting");
    Ok(())
}
