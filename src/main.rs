/* 3rd party libraries */
use clap::Arg;
use crossbeam_channel as cbc;
use log::error;
use log::info;
use std::thread::Builder;
use std::thread::*;

/* Custom libraries */
use controller::Controller;
use shared::Command;
use shared::Event;
use telemetry::SnapshotRequest;
use telemetry::TelemetryPublisher;

/* Modules */
mod config;
mod controller;
mod dispatch;
mod emitter;
mod scheduler;
mod shared;
mod telemetry;

/* Main */
fn main() -> std::io::Result<()> {
    env_logger::init();

    // Parse the command line
    let matches = clap::Command::new("lift-dispatch")
        .about("Multi-elevator dispatch controller core")
        .arg(
            Arg::new("config")
                .long("config")
                .takes_value(true)
                .default_value("config.toml"),
        )
        .get_matches();

    // Load the configuration
    let config_path = matches.value_of("config").unwrap_or("config.toml");
    let config = config::load_config(config_path);
    info!(
        "building: {} floors, {} cars, capacity {}",
        config.building.n_floors, config.building.n_cars, config.building.capacity
    );

    // Initialize channels
    // The plant/simulation adapter owns event_tx and command_rx; the
    // visualization adapter owns the telemetry publisher.
    let (_event_tx, event_rx) = cbc::unbounded::<Event>();
    let (command_tx, _command_rx) = cbc::unbounded::<Command>();
    let (snapshot_request_tx, snapshot_request_rx) = cbc::unbounded::<SnapshotRequest>();
    let (_terminate_tx, terminate_rx) = cbc::unbounded::<()>();

    let _telemetry = TelemetryPublisher::new(snapshot_request_tx);

    // Start the controller module
    let controller = Controller::new(
        &config,
        event_rx,
        command_tx,
        snapshot_request_rx,
        terminate_rx,
    );

    let controller_thread = Builder::new().name("controller".into());
    unwrap_or_exit!(controller_thread.spawn(move || controller.run()));

    loop {
        sleep(std::time::Duration::from_secs(1));
    }
}
