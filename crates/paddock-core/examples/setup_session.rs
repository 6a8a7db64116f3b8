//! Walk through an edit session against the JSON file backend.
//!
//! Usage: cargo run --example setup_session [data-dir]

use std::sync::Arc;
use std::time::Duration;

use paddock_core::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let mut config = PaddockConfig::default();
    if let Some(dir) = std::env::args().nth(1) {
        config.data_dir = Some(dir.into());
    }

    let backend = Arc::new(JsonFileStore::open(config.data_dir()?)?);
    let store = Arc::new(SetupStore::with_config(backend, &config));
    let validator = Arc::new(RangeValidator::from_config(&config)?);
    let id = EventCarId::new("demo-event-car");

    let mut editor = SetupEditor::open(Arc::clone(&store), Arc::clone(&validator), &config, id.clone())?;
    println!("Front-left pressure range: {}", editor.hint("front.fl.pressure"));

    // A burst of edits coalesces into one autosave
    for pressure in [1.85, 1.9, 2.6] {
        let stored = editor.set_extra("front.fl.pressure", pressure)?;
        println!("front.fl.pressure {} -> stored {}", pressure, stored);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    editor.set_field(SetupField::WingAngle, Some(11.5))?;
    tokio::time::sleep(config.autosave_delay() + Duration::from_millis(100)).await;

    for event in editor.poll_autosave() {
        match event {
            AutosaveEvent::Saved(record) => println!("Autosaved at {:?}", record.updated_at),
            AutosaveEvent::Failed { error, .. } => println!("Autosave failed: {}", error),
        }
    }

    editor.set_notes("Dry baseline");
    let saved = editor.save()?;
    println!("Saved setup: {}", serde_json::to_string_pretty(&saved)?);

    println!("Recent versions:");
    for entry in store.history().recent(&id, None)? {
        println!("  {} {}", entry.created_at, entry.id);
    }

    println!("Change log:");
    for entry in store.changelog().recent(&id, None)? {
        println!(
            "  {} {} {}",
            entry.created_at,
            entry.action,
            entry.details.unwrap_or_default()
        );
    }

    editor.close()?;
    Ok(())
}
