use futures_util::future::join_all;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use building_telemetry_sim::config::SimulationConfig;
use building_telemetry_sim::occupancy::{run_occupancy, Ledger, OccupancyMachine};
use building_telemetry_sim::query::{describe_latest, person_data};
use building_telemetry_sim::registry;
use building_telemetry_sim::storage::Pipeline;
use building_telemetry_sim::telemetry::run_generator;

fn log_summary(pipeline: &Pipeline, machine: &OccupancyMachine) {
    for (room, kind) in registry::channels() {
        let location = registry::lookup(&registry::sensor_id(room, kind))
            .map(|m| m.location)
            .unwrap_or("Unknown");
        let key = registry::channel_key(room, kind);
        info!(
            "[{}] {} ({} pending)",
            location,
            describe_latest(pipeline, room, kind),
            pipeline.pending(&key).unwrap_or(0)
        );
    }

    for (room, snapshot) in person_data(machine) {
        match snapshot.time {
            Some(t) => info!(
                "{} is {} with {}: drive {}, load {}, idle {}",
                room, snapshot.status, snapshot.person, t.drive_time, t.load_time, t.idle_time
            ),
            None => warn!("{} occupant {} has no ledger entry", room, snapshot.person),
        }
    }
}

async fn main_loop(
    config: SimulationConfig,
    cancel: CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting building telemetry simulation");

    let ledger = Arc::new(Ledger::load_csv(&config.person_times_path)?);
    let machine = Arc::new(OccupancyMachine::with_default_rooms(
        Arc::clone(&ledger),
        config.credit_policy,
    )?);
    let pipeline = Arc::new(Pipeline::for_registry());

    let mut handles = Vec::new();
    for (room, kind) in registry::channels() {
        handles.push(tokio::spawn(run_generator(
            room.to_string(),
            kind,
            Arc::clone(&pipeline),
            config.reading_interval,
            cancel.child_token(),
        )));
    }
    handles.push(tokio::spawn(run_occupancy(
        Arc::clone(&machine),
        config.occupancy_tick,
        cancel.child_token(),
    )));

    let mut summary = interval(config.summary_interval);
    summary.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Consume the immediate first tick; nothing has been aggregated yet.
    summary.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = summary.tick() => log_summary(&pipeline, &machine),
        }
    }

    info!("Waiting for {} tasks to stop", handles.len());
    for result in join_all(handles).await {
        if let Err(e) = result {
            error!("Task ended abnormally: {}", e);
        }
    }

    for (name, times) in ledger.all() {
        info!(
            "Final totals for {}: drive {}, load {}, idle {}",
            name, times.drive_time, times.load_time, times.idle_time
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match SimulationConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    // Handle Ctrl+C gracefully
    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Program terminated by user. Stopping tasks.");
                shutdown.cancel();
            }
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    if let Err(e) = main_loop(config, cancel).await {
        error!("Fatal error: {}", e);
        return Err(e);
    }

    info!("All tasks stopped. Exiting gracefully.");
    Ok(())
}
