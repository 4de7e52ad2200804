use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_STATIC_DIR: &str = "client/dist";
pub const DEFAULT_SNAPSHOT_RELOAD_SECS: u64 = 15;

/// Matches the client's 15 s cache-bust bucket.
pub const LEADERBOARD_CACHE_CONTROL: &str = "public, max-age=15";
pub const DATA_FILE_CACHE_CONTROL: &str = "public, max-age=15";

pub fn server_port() -> u16 {
    std::env::var("SERVER_PORT")
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

/// Directory holding `leaderboard-{period}.json` snapshot files.
pub fn data_dir() -> PathBuf {
    dir_from_env("PODIUM_DATA_DIR", DEFAULT_DATA_DIR)
}

/// Directory holding the built client (`index.html`, wasm bundle, styles).
pub fn static_dir() -> PathBuf {
    dir_from_env("PODIUM_STATIC_DIR", DEFAULT_STATIC_DIR)
}

pub fn snapshot_reload_interval() -> Duration {
    std::env::var("SNAPSHOT_RELOAD_SECS")
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_SNAPSHOT_RELOAD_SECS))
}

fn dir_from_env(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_when_unset_or_invalid() {
        temp_env::with_var_unset("SERVER_PORT", || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
        temp_env::with_var("SERVER_PORT", Some("not-a-port"), || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
        temp_env::with_var("SERVER_PORT", Some("0"), || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
    }

    #[test]
    fn port_reads_env() {
        temp_env::with_var("SERVER_PORT", Some(" 8080 "), || {
            assert_eq!(server_port(), 8080);
        });
    }

    #[test]
    fn blank_dirs_fall_back_to_defaults() {
        temp_env::with_vars(
            [("PODIUM_DATA_DIR", Some("  ")), ("PODIUM_STATIC_DIR", None::<&str>)],
            || {
                assert_eq!(data_dir(), PathBuf::from(DEFAULT_DATA_DIR));
                assert_eq!(static_dir(), PathBuf::from(DEFAULT_STATIC_DIR));
            },
        );
    }

    #[test]
    fn dirs_read_env() {
        temp_env::with_vars(
            [
                ("PODIUM_DATA_DIR", Some("/srv/podium/data")),
                ("PODIUM_STATIC_DIR", Some("/srv/podium/www")),
            ],
            || {
                assert_eq!(data_dir(), PathBuf::from("/srv/podium/data"));
                assert_eq!(static_dir(), PathBuf::from("/srv/podium/www"));
            },
        );
    }

    #[test]
    fn reload_interval_rejects_zero() {
        temp_env::with_var("SNAPSHOT_RELOAD_SECS", Some("0"), || {
            assert_eq!(
                snapshot_reload_interval(),
                Duration::from_secs(DEFAULT_SNAPSHOT_RELOAD_SECS)
            );
        });
        temp_env::with_var("SNAPSHOT_RELOAD_SECS", Some("60"), || {
            assert_eq!(snapshot_reload_interval(), Duration::from_secs(60));
        });
    }
}
