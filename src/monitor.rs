//! Long-running monitor: sampler → tracker, with live config reload.
//!
//! All tracker and store access happens on this one loop, so samples are
//! processed strictly one after another.

use anyhow::Result;
use hb_config::{ConfigWatcher, HeyBatteryConfig, MonitorConfig};
use hb_core::{BatterySample, Message};
use hb_system::{spawn_sampler, SamplerSettings};
use hb_tracker::{Tracker, Transition};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Start the monitor.  Returns after Ctrl-C.
pub fn run(config_path: PathBuf, config: HeyBatteryConfig, data_dir: PathBuf) -> Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(event_loop(config_path, config, data_dir));
    Ok(())
}

async fn event_loop(config_path: PathBuf, mut config: HeyBatteryConfig, data_dir: PathBuf) {
    let tracker = Tracker::open(&data_dir);
    let (_watcher, mut config_rx) = ConfigWatcher::spawn(&config_path);
    let mut samples = start_sampler(&config.monitor);

    info!(
        "heybattery v{} monitoring; history in '{}'",
        env!("CARGO_PKG_VERSION"),
        data_dir.display()
    );

    loop {
        let message = tokio::select! {
            Some(sample) = samples.recv() => Message::Sample(sample),
            Some(()) = config_rx.recv() => Message::ConfigReloaded,
            _ = tokio::signal::ctrl_c() => Message::Shutdown,
        };

        match message {
            Message::Sample(sample) => handle_sample(&tracker, &sample),
            Message::ConfigReloaded => {
                if let Some(fresh) = reload(&config_path, &config) {
                    if fresh.monitor != config.monitor {
                        samples = start_sampler(&fresh.monitor);
                    }
                    config = fresh;
                }
            }
            Message::Shutdown => {
                info!("Shutting down");
                break;
            }
        }
    }
}

fn start_sampler(monitor: &MonitorConfig) -> mpsc::Receiver<BatterySample> {
    info!(
        "Sampling {} every {}s",
        monitor.supply.as_deref().unwrap_or("first battery"),
        monitor.poll_interval().as_secs()
    );
    spawn_sampler(SamplerSettings {
        interval:   monitor.poll_interval(),
        sysfs_root: monitor.sysfs_root.clone(),
        supply:     monitor.supply.clone(),
    })
}

fn handle_sample(tracker: &Tracker, sample: &BatterySample) {
    let outcome = match tracker.on_sample(sample) {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("Ignoring sample: {e}");
            return;
        }
    };

    if let Transition::CycleStarted(cycle) = outcome.transition {
        info!("Cycle opened at {}%", cycle.start_level);
    }
    debug!(
        level = sample.level,
        charging = sample.charging,
        remaining = %tracker.projection(sample),
        "Sample processed"
    );
}

/// Re-read the config file.  On error the previous config stays in effect.
fn reload(path: &std::path::Path, current: &HeyBatteryConfig) -> Option<HeyBatteryConfig> {
    match hb_config::load(path) {
        Ok(fresh) if fresh == *current => None,
        Ok(fresh) => {
            info!("Config reloaded from '{}'", path.display());
            if fresh.storage != current.storage {
                warn!("storage.data_dir changes take effect after restart");
            }
            Some(fresh)
        }
        Err(e) => {
            warn!("Keeping previous config: {e}");
            None
        }
    }
}
