use crate::state::BatterySample;

/// All messages that can flow through the monitor's event loop.
///
/// Sources:
/// - Sampler task        → `Sample`
/// - Config watcher task → `ConfigReloaded`
/// - Signal handler      → `Shutdown`
#[derive(Debug, Clone)]
pub enum Message {
    /// Fresh battery observation from the sampler.
    Sample(BatterySample),
    /// Config file changed on disk; triggers a live reload.
    ConfigReloaded,
    /// Graceful shutdown requested.
    Shutdown,
}
