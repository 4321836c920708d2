//! # climate-groupd — climate group daemon
//!
//! Composition root that wires the virtual host and the climate groups
//! together and keeps them running.
//!
//! ## Responsibilities
//! - Load configuration (file, env vars)
//! - Initialise `tracing`
//! - Build the virtual host with the configured thermostats
//! - Start one `ClimateGroup` per configured group and log its state
//! - Drive the temperature simulation
//! - Read `<service> [json]` commands from stdin and send them to every group
//! - Stop the groups on Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::AsyncBufReadExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use climate_group_adapter_virtual::VirtualHost;
use climate_group_app::climate_group::ClimateGroup;
use climate_group_app::dispatcher::DispatchOutcome;
use climate_group_domain::climate::CompositeState;

use crate::config::Config;

type Group = ClimateGroup<Arc<VirtualHost>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.logging.filter);

    let host = Arc::new(
        VirtualHost::from_configs(&config.thermostats)
            .context("invalid thermostat configuration")?,
    );

    let mut groups: Vec<Arc<Group>> = Vec::with_capacity(config.groups.len());
    let mut tasks: Vec<JoinHandle<()>> = Vec::new();
    for group_config in &config.groups {
        let definition = group_config
            .to_definition()
            .with_context(|| format!("invalid group {:?}", group_config.name))?;
        for member in &definition.entities {
            if host.thermostat(member).is_none() {
                tracing::warn!(
                    group = %definition.name,
                    %member,
                    "member has no virtual thermostat"
                );
            }
        }
        let group = Arc::new(ClimateGroup::new(definition, Arc::clone(&host)));
        tasks.push(
            group
                .start()
                .with_context(|| format!("failed to start group {:?}", group_config.name))?,
        );
        tasks.push(tokio::spawn(log_state_changes(group.watch())));
        groups.push(group);
    }

    if config.simulation.enabled {
        tasks.push(tokio::spawn(run_simulation(
            Arc::clone(&host),
            config.tick(),
            config.simulation.step_degrees,
        )));
    }
    tasks.push(tokio::spawn(read_commands(groups.clone())));

    tracing::info!(
        groups = groups.len(),
        thermostats = host.entity_ids().len(),
        "climate-groupd running, press Ctrl-C to stop"
    );
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    tracing::info!("shutting down");
    for group in &groups {
        group.stop();
    }
    for task in tasks {
        task.abort();
    }
    Ok(())
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {filter:?} ({err}), falling back to info");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn log_state_changes(mut state: watch::Receiver<CompositeState>) {
    while state.changed().await.is_ok() {
        let current = state.borrow_and_update().clone();
        tracing::info!(available = current.available, "{current}");
    }
}

async fn run_simulation(host: Arc<VirtualHost>, tick: Duration, step_degrees: f64) {
    let mut interval = tokio::time::interval(tick);
    // The first tick completes immediately.
    interval.tick().await;
    loop {
        interval.tick().await;
        host.step(step_degrees);
    }
}

/// Each stdin line is `<service> [json payload]`, e.g.
/// `set_temperature {"temperature": 22}`.
async fn read_commands(groups: Vec<Arc<Group>>) {
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read command from stdin");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (service, payload) = line.split_once(' ').unwrap_or((line, ""));
        let data = if payload.trim().is_empty() {
            serde_json::Value::Null
        } else {
            match serde_json::from_str(payload) {
                Ok(data) => data,
                Err(err) => {
                    tracing::warn!(error = %err, "command payload is not valid JSON");
                    continue;
                }
            }
        };
        for group in &groups {
            let name = &group.definition().name;
            match group.handle_service_call(service, &data).await {
                Ok(DispatchOutcome::Sent(call)) => {
                    tracing::info!(group = %name, %call, "command sent");
                }
                Ok(DispatchOutcome::Skipped) => {
                    tracing::info!(group = %name, service, "command had nothing to send");
                }
                Err(err) => {
                    tracing::warn!(
                        group = %name,
                        service,
                        error = %describe(&err),
                        "command rejected"
                    );
                }
            }
        }
    }
    tracing::debug!("command input closed");
}

fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
