//! Tree configuration structures and loaders.
use std::env;
use std::time::Duration;

/// Settings for one [`BehaviorTree`](crate::BehaviorTree).
#[derive(Clone, Debug)]
pub struct TreeConfig {
    /// Name used in log spans and snapshots.
    pub name: String,
    /// Deepest tree `bind()` accepts; a lone leaf has depth 1.
    pub max_depth: usize,
    /// Ticks slower than this are logged at warn level.
    pub slow_tick_threshold: Option<Duration>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            name: "tree".to_owned(),
            max_depth: 64,
            slow_tick_threshold: None,
        }
    }
}

impl TreeConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BT_TREE_NAME` - Tree name for logs (default: "tree")
    /// - `BT_MAX_DEPTH` - Maximum accepted tree depth (default: 64)
    /// - `BT_SLOW_TICK_MS` - Warn when a tick takes longer (default: off)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(name) = env::var("BT_TREE_NAME") {
            config.name = name;
        }

        if let Some(depth) = read_env::<usize>("BT_MAX_DEPTH") {
            config.max_depth = depth.max(1);
        }

        config.slow_tick_threshold = read_env::<u64>("BT_SLOW_TICK_MS").map(Duration::from_millis);

        config
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn with_slow_tick_threshold(mut self, threshold: Duration) -> Self {
        self.slow_tick_threshold = Some(threshold);
        self
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TreeConfig::default();
        assert_eq!(config.name, "tree");
        assert_eq!(config.max_depth, 64);
        assert!(config.slow_tick_threshold.is_none());
    }

    #[test]
    fn builders_clamp_depth() {
        let config = TreeConfig::new("guard")
            .with_max_depth(0)
            .with_slow_tick_threshold(Duration::from_millis(5));
        assert_eq!(config.name, "guard");
        assert_eq!(config.max_depth, 1);
        assert_eq!(config.slow_tick_threshold, Some(Duration::from_millis(5)));
    }
}
