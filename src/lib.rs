// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod io;
pub mod logging;
pub mod message;
pub mod store;
pub mod timers;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::config::loader::load_and_validate;
use crate::engine::{EntryTable, Runtime, SystemClock, TriggerCore, TriggerEvent};
use crate::io::{StdoutSink, spawn_line_reader};
use crate::message::{ContextResolver, MessageBuilder};
use crate::store::open_store;
use crate::timers::{TimerManager, TokioTimerBackend};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the persisted entry table
/// - the trigger core, Tokio timers and the runtime loop
/// - stdin input, stdout output
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    // Runtime event channel: inputs, timer fires and shutdown.
    let (rt_tx, rt_rx) = mpsc::channel::<TriggerEvent>(256);

    let table = EntryTable::load(open_store(&cfg.store), cfg.settings.store_key());
    let timers = TimerManager::new(TokioTimerBackend::new(rt_tx.clone()));
    let resolver = ContextResolver::from_config(&cfg.context)?;
    let builder = MessageBuilder::new(Arc::new(resolver));

    let core = TriggerCore::new(
        cfg.settings.clone(),
        table,
        timers,
        builder,
        Arc::new(SystemClock),
    );

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        let remove = args.remove_on_exit;
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(TriggerEvent::Shutdown { remove }).await;
        });
    }

    info!(id = %cfg.settings.id, "reading events from stdin");
    let _reader = spawn_line_reader(tokio::io::stdin(), rt_tx.clone(), args.remove_on_exit);

    let runtime = Runtime::new(core, rt_rx, StdoutSink::new());
    runtime.run().await?;
    Ok(())
}

/// Simple dry-run output: print settings and the persisted entries.
fn print_dry_run(cfg: &ConfigFile) {
    let s = &cfg.settings;
    println!("persistrig dry-run");
    println!("  id = {}", s.id);
    println!("  store key = {}", s.store_key());
    println!("  mode = {:?}", s.mode);
    println!("  delay_ms = {}", s.delay_ms);
    println!("  keying = {:?}", s.keying);
    println!("  extend = {}, override_delay = {}", s.extend, s.override_delay);
    if let Some(ref reset) = s.reset_match {
        println!("  reset = {reset:?}");
    }
    println!("  second_output = {}", s.second_output);
    println!("  expired = {:?}", s.expiry_policy);
    println!("  op1 = {:?}", s.op1);
    println!("  op2 = {:?}", s.op2);
    println!("  store = {:?} {}", cfg.store.kind, cfg.store.path.display());
    println!();

    let table = EntryTable::load(open_store(&cfg.store), s.store_key());
    println!("persisted entries ({}):", table.len());
    for (key, entry) in table.iter() {
        println!("  - {key}: {:?}", entry.timing);
    }

    debug!("dry-run complete (nothing restored or emitted)");
}
