use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::{
    error::{config::ConfigError, AppError},
    util::parse::{parse_env_value, parse_snowflake},
};

const DEFAULT_SERVER_JAR: &str = "server.jar";
const DEFAULT_JAVA_PATH: &str = "java";
const DEFAULT_JAVA_XMS: &str = "1G";
const DEFAULT_JAVA_XMX: &str = "4G";
const DEFAULT_WORLD_FOLDER: &str = "world";
const DEFAULT_TMUX_SESSION: &str = "minecraft";
const DEFAULT_STATE_FILE: &str = "server_state.json";
const DEFAULT_RCON_HOST: &str = "127.0.0.1";
const DEFAULT_RCON_PORT: u16 = 25575;
const DEFAULT_STARTUP_GRACE_S: u64 = 10;
const DEFAULT_SHUTDOWN_GRACE_S: u64 = 60;
const DEFAULT_PROBE_INTERVAL_MS: u64 = 2000;
const DEFAULT_LOCK_WAIT_S: u64 = 5;
const DEFAULT_RESTART_DELAY_S: u64 = 5;
const DEFAULT_CRASH_CHECK_INTERVAL_S: u64 = 30;
const DEFAULT_MAX_RESTART_ATTEMPTS: u32 = 3;
const DEFAULT_BACKUP_CRON: &str = "0 0 22 * * *";
const DEFAULT_RESTART_CRON: &str = "0 0 5 * * *";
const DEFAULT_BACKUP_RETENTION_DAYS: u64 = 7;
const DEFAULT_BOT_LOG_DIR: &str = "logs";

/// Which implementation drives the Minecraft server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Real Java process inside a detached tmux session.
    Tmux,
    /// In-memory simulation, no processes or files touched.
    Simulated,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "tmux" => Ok(BackendKind::Tmux),
            "simulated" | "mock" => Ok(BackendKind::Simulated),
            other => Err(format!("unknown backend '{}', expected tmux or simulated", other)),
        }
    }
}

pub struct Config {
    pub discord_bot_token: String,
    pub discord_guild_id: u64,
    pub log_channel_id: Option<u64>,
    pub debug_channel_id: Option<u64>,
    pub admin_role_id: Option<u64>,

    pub backend: BackendKind,
    pub server_dir: PathBuf,
    pub server_jar: String,
    pub java_path: String,
    pub java_xms: String,
    pub java_xmx: String,
    pub world_folder: String,
    pub tmux_session: String,
    pub state_file: PathBuf,

    pub rcon_host: String,
    pub rcon_port: u16,
    pub rcon_password: String,

    pub startup_grace: Duration,
    pub shutdown_grace: Duration,
    pub probe_interval: Duration,
    pub lock_wait: Duration,
    pub restart_delay: Duration,
    pub crash_check_interval: Duration,
    pub max_restart_attempts: u32,

    pub backup_cron: String,
    pub restart_cron: String,
    pub backup_retention_days: u64,

    pub bot_log_dir: PathBuf,

    /// Mirror server console lines into the log channel.
    pub log_mirror: bool,
    /// Console lines containing any of these substrings are not mirrored.
    pub log_blacklist: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset so `.env` files may keep blank placeholders.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };

        Ok(Self {
            discord_bot_token: env.required("DISCORD_BOT_TOKEN")?,
            discord_guild_id: parse_snowflake(
                "DISCORD_GUILD_ID",
                &env.required("DISCORD_GUILD_ID")?,
            )?,
            log_channel_id: env.snowflake("DISCORD_LOG_CHANNEL_ID")?,
            debug_channel_id: env.snowflake("DISCORD_DEBUG_CHANNEL_ID")?,
            admin_role_id: env.snowflake("DISCORD_ADMIN_ROLE_ID")?,

            backend: env.parsed_or("SERVER_BACKEND", BackendKind::Tmux)?,
            server_dir: PathBuf::from(env.required("SERVER_DIR")?),
            server_jar: env.string_or("SERVER_JAR", DEFAULT_SERVER_JAR),
            java_path: env.string_or("JAVA_PATH", DEFAULT_JAVA_PATH),
            java_xms: env.string_or("JAVA_XMS", DEFAULT_JAVA_XMS),
            java_xmx: env.string_or("JAVA_XMX", DEFAULT_JAVA_XMX),
            world_folder: env.string_or("WORLD_FOLDER", DEFAULT_WORLD_FOLDER),
            tmux_session: env.string_or("TMUX_SESSION", DEFAULT_TMUX_SESSION),
            state_file: PathBuf::from(env.string_or("STATE_FILE", DEFAULT_STATE_FILE)),

            rcon_host: env.string_or("RCON_HOST", DEFAULT_RCON_HOST),
            rcon_port: env.parsed_or("RCON_PORT", DEFAULT_RCON_PORT)?,
            rcon_password: env.string_or("RCON_PASSWORD", ""),

            startup_grace: Duration::from_secs(
                env.parsed_or("STARTUP_GRACE_S", DEFAULT_STARTUP_GRACE_S)?,
            ),
            shutdown_grace: Duration::from_secs(
                env.parsed_or("SHUTDOWN_GRACE_S", DEFAULT_SHUTDOWN_GRACE_S)?,
            ),
            probe_interval: Duration::from_millis(
                env.positive_or("PROBE_INTERVAL_MS", DEFAULT_PROBE_INTERVAL_MS)?,
            ),
            lock_wait: Duration::from_secs(env.parsed_or("LOCK_WAIT_S", DEFAULT_LOCK_WAIT_S)?),
            restart_delay: Duration::from_secs(
                env.parsed_or("RESTART_DELAY_S", DEFAULT_RESTART_DELAY_S)?,
            ),
            crash_check_interval: Duration::from_secs(
                env.positive_or("CRASH_CHECK_INTERVAL_S", DEFAULT_CRASH_CHECK_INTERVAL_S)?,
            ),
            max_restart_attempts: env
                .parsed_or("MAX_RESTART_ATTEMPTS", DEFAULT_MAX_RESTART_ATTEMPTS)?,

            backup_cron: env.string_or("BACKUP_CRON", DEFAULT_BACKUP_CRON),
            restart_cron: env.string_or("RESTART_CRON", DEFAULT_RESTART_CRON),
            backup_retention_days: env
                .parsed_or("BACKUP_RETENTION_DAYS", DEFAULT_BACKUP_RETENTION_DAYS)?,

            bot_log_dir: PathBuf::from(env.string_or("BOT_LOG_DIR", DEFAULT_BOT_LOG_DIR)),

            log_mirror: env.parsed_or("LOG_MIRROR", true)?,
            log_blacklist: env.list("LOG_BLACKLIST"),
        })
    }

    /// Absolute or relative path of the world folder inside the server directory.
    pub fn world_dir(&self) -> PathBuf {
        self.server_dir.join(&self.world_folder)
    }

    /// Path of the server jar inside the server directory.
    pub fn jar_path(&self) -> PathBuf {
        self.server_dir.join(&self.server_jar)
    }

    /// Path of the live server log.
    pub fn latest_log(&self) -> PathBuf {
        self.server_dir.join("logs").join("latest.log")
    }
}

/// Typed access to a key lookup, mapping failures to `ConfigError`.
struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, name: &str) -> Result<String, ConfigError> {
        self.get(name)
            .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
    }

    fn string_or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    fn parsed_or<T>(&self, name: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(name) {
            Some(value) => parse_env_value(name, &value),
            None => Ok(default),
        }
    }

    /// Like `parsed_or`, but zero is rejected (used for intervals that drive `tokio::time::interval`).
    fn positive_or(&self, name: &str, default: u64) -> Result<u64, ConfigError> {
        let value = self.parsed_or(name, default)?;
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                name: name.to_string(),
                value: value.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(value)
    }

    /// Comma-separated values; blank entries are dropped.
    fn list(&self, name: &str) -> Vec<String> {
        self.get(name)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn snowflake(&self, name: &str) -> Result<Option<u64>, ConfigError> {
        self.get(name)
            .map(|value| parse_snowflake(name, &value))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("DISCORD_BOT_TOKEN", "token"),
        ("DISCORD_GUILD_ID", "42"),
        ("SERVER_DIR", "/srv/minecraft"),
    ];

    /// Tests that only the required variables are needed.
    ///
    /// Expected: Ok with defaults for everything optional
    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.discord_guild_id, 42);
        assert_eq!(config.backend, BackendKind::Tmux);
        assert_eq!(config.server_jar, "server.jar");
        assert_eq!(config.rcon_port, 25575);
        assert_eq!(config.startup_grace, Duration::from_secs(10));
        assert_eq!(config.shutdown_grace, Duration::from_secs(60));
        assert_eq!(config.probe_interval, Duration::from_millis(2000));
        assert_eq!(config.max_restart_attempts, 3);
        assert_eq!(config.log_channel_id, None);
        assert!(config.log_mirror);
        assert!(config.log_blacklist.is_empty());
        assert_eq!(config.jar_path(), PathBuf::from("/srv/minecraft/server.jar"));
        assert_eq!(
            config.latest_log(),
            PathBuf::from("/srv/minecraft/logs/latest.log")
        );
    }

    /// Tests that a missing token is reported by name.
    ///
    /// Expected: Err(MissingEnvVar("DISCORD_BOT_TOKEN"))
    #[test]
    fn reports_missing_variable() {
        let err = Config::from_lookup(lookup(&REQUIRED[1..])).err().unwrap();

        assert!(matches!(
            err,
            AppError::ConfigErr(ConfigError::MissingEnvVar(ref name)) if name == "DISCORD_BOT_TOKEN"
        ));
    }

    /// Tests that blank values count as unset.
    ///
    /// Expected: Err for blank required value, default for blank optional value
    #[test]
    fn blank_values_are_unset() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SERVER_JAR", "  "));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.server_jar, "server.jar");

        pairs[2] = ("SERVER_DIR", "");
        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }

    /// Tests parsing of optional typed values.
    ///
    /// Expected: Ok with overrides applied
    #[test]
    fn parses_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("SERVER_BACKEND", "Simulated"),
            ("DISCORD_DEBUG_CHANNEL_ID", "1001"),
            ("MAX_RESTART_ATTEMPTS", "5"),
            ("PROBE_INTERVAL_MS", "250"),
            ("LOG_MIRROR", "false"),
            ("LOG_BLACKLIST", "Can't keep up!, ,moved too quickly"),
        ]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();

        assert!(!config.log_mirror);
        assert_eq!(
            config.log_blacklist,
            vec!["Can't keep up!".to_string(), "moved too quickly".to_string()]
        );

        assert_eq!(config.backend, BackendKind::Simulated);
        assert_eq!(config.debug_channel_id, Some(1001));
        assert_eq!(config.max_restart_attempts, 5);
        assert_eq!(config.probe_interval, Duration::from_millis(250));
    }

    /// Tests that invalid values fail startup instead of silently defaulting.
    ///
    /// Expected: Err(InvalidEnvVar) for each bad value
    #[test]
    fn rejects_invalid_values() {
        for bad in [
            ("SERVER_BACKEND", "docker"),
            ("RCON_PORT", "70000"),
            ("CRASH_CHECK_INTERVAL_S", "0"),
            ("DISCORD_LOG_CHANNEL_ID", "general"),
        ] {
            let mut pairs = REQUIRED.to_vec();
            pairs.push(bad);
            let err = Config::from_lookup(lookup(&pairs)).err().unwrap();
            assert!(
                matches!(err, AppError::ConfigErr(ConfigError::InvalidEnvVar { .. })),
                "{} should be rejected",
                bad.0
            );
        }
    }
}
