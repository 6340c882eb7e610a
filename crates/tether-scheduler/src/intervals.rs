use std::time::Duration;

use tether_core::{Result, SchedulerConfig, TetherConfig};

/// Supplies the three scheduler intervals.
///
/// Read once when a check loop starts and again each time a schedule is
/// (re)started, so a reloading source picks up changes between restarts.
pub trait IntervalSource: Send + Sync {
    fn check_interval(&self) -> Result<Duration>;
    fn heartbeat_interval(&self) -> Result<Duration>;
    fn snapshot_interval(&self) -> Result<Duration>;
}

/// A loaded config is a static source.
impl IntervalSource for SchedulerConfig {
    fn check_interval(&self) -> Result<Duration> {
        SchedulerConfig::check_interval(self)
    }

    fn heartbeat_interval(&self) -> Result<Duration> {
        SchedulerConfig::heartbeat_interval(self)
    }

    fn snapshot_interval(&self) -> Result<Duration> {
        SchedulerConfig::snapshot_interval(self)
    }
}

/// Re-reads the config file (and TETHER_* env) on every read.
#[derive(Debug, Clone, Default)]
pub struct ConfigFileIntervals {
    path: Option<String>,
}

impl ConfigFileIntervals {
    /// `None` falls back to the default lookup of [`TetherConfig::load`].
    pub fn new(path: Option<String>) -> Self {
        Self { path }
    }

    /// The whole `[scheduler]` section must be valid, not just the interval asked for.
    fn scheduler(&self) -> Result<SchedulerConfig> {
        let scheduler = TetherConfig::load(self.path.as_deref())?.scheduler;
        scheduler.validate()?;
        Ok(scheduler)
    }
}

impl IntervalSource for ConfigFileIntervals {
    fn check_interval(&self) -> Result<Duration> {
        self.scheduler()?.check_interval()
    }

    fn heartbeat_interval(&self) -> Result<Duration> {
        self.scheduler()?.heartbeat_interval()
    }

    fn snapshot_interval(&self) -> Result<Duration> {
        self.scheduler()?.snapshot_interval()
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;
    use tether_core::TetherError;

    use super::*;

    #[test]
    fn config_file_is_reread_on_every_call() {
        Jail::expect_with(|jail| {
            jail.create_file("tether.toml", "[scheduler]\nheartbeat_interval_ms = 1500\n")?;
            let source = ConfigFileIntervals::new(Some("tether.toml".into()));
            let heartbeat = source.heartbeat_interval().map_err(|e| e.to_string())?;
            assert_eq!(heartbeat, Duration::from_millis(1500));

            jail.create_file("tether.toml", "[scheduler]\nheartbeat_interval_ms = 2500\n")?;
            let heartbeat = source.heartbeat_interval().map_err(|e| e.to_string())?;
            assert_eq!(heartbeat, Duration::from_millis(2500));
            Ok(())
        });
    }

    #[test]
    fn any_zero_interval_fails_every_read() {
        Jail::expect_with(|jail| {
            jail.create_file("tether.toml", "[scheduler]\nheartbeat_interval_ms = 0\n")?;
            let source = ConfigFileIntervals::new(Some("tether.toml".into()));

            for read in [
                source.check_interval(),
                source.heartbeat_interval(),
                source.snapshot_interval(),
            ] {
                match read {
                    Err(TetherError::InvalidInterval { name }) => {
                        assert_eq!(name, "heartbeat_interval_ms")
                    }
                    other => panic!("expected InvalidInterval, got {other:?}"),
                }
            }
            Ok(())
        });
    }

    #[test]
    fn env_override_is_picked_up_between_reads() {
        Jail::expect_with(|jail| {
            let source = ConfigFileIntervals::new(Some("missing.toml".into()));
            let snapshot = source.snapshot_interval().map_err(|e| e.to_string())?;
            assert_eq!(snapshot, Duration::from_millis(200));

            jail.set_env("TETHER_SCHEDULER__SNAPSHOT_INTERVAL_MS", "40");
            let snapshot = source.snapshot_interval().map_err(|e| e.to_string())?;
            assert_eq!(snapshot, Duration::from_millis(40));
            Ok(())
        });
    }
}
