//! Runner configuration: command-line flags with environment fallbacks.
//!
//! Flags win over environment variables; both are validated, and anything
//! unrecognized is an error rather than silently ignored.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::types::GameMode;

pub const ENV_MODE: &str = "CIRCLE_POP_MODE";
pub const ENV_SEED: &str = "CIRCLE_POP_SEED";
pub const ENV_SCORES: &str = "CIRCLE_POP_SCORES";
pub const ENV_LOG: &str = "CIRCLE_POP_LOG";

pub const USAGE: &str = "\
usage: circle-pop [--mode classic|chaos] [--seed N] [--scores PATH] [--log PATH]

  --mode     board and hand size (env CIRCLE_POP_MODE, default classic)
  --seed     RNG seed for a reproducible game (env CIRCLE_POP_SEED)
  --scores   JSON file to keep high scores in (env CIRCLE_POP_SCORES)
  --log      write tracing output to this file (env CIRCLE_POP_LOG)
";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub mode: GameMode,
    /// None means derive one from the clock.
    pub seed: Option<u32>,
    pub scores_path: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
}

impl AppConfig {
    /// Read the process arguments and environment.
    ///
    /// Returns `Ok(None)` when help was requested.
    pub fn load() -> Result<Option<Self>> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    /// Build a config from explicit arguments and an environment lookup.
    pub fn from_sources(
        args: &[String],
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>> {
        let mut config = Self::from_env(env)?;

        let mut i = 0usize;
        while i < args.len() {
            let flag = args[i].as_str();
            match flag {
                "-h" | "--help" => return Ok(None),
                "--mode" | "--seed" | "--scores" | "--log" => {
                    i += 1;
                    let v = args
                        .get(i)
                        .ok_or_else(|| anyhow!("missing value for {}", flag))?;
                    config.apply(flag, v)?;
                }
                other => {
                    return Err(anyhow!("unknown argument: {}", other));
                }
            }
            i += 1;
        }

        Ok(Some(config))
    }

    fn from_env(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        for (key, flag) in [
            (ENV_MODE, "--mode"),
            (ENV_SEED, "--seed"),
            (ENV_SCORES, "--scores"),
            (ENV_LOG, "--log"),
        ] {
            let Some(value) = env(key) else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            config.apply(flag, value).with_context(|| format!("from {}", key))?;
        }
        Ok(config)
    }

    fn apply(&mut self, flag: &str, value: &str) -> Result<()> {
        match flag {
            "--mode" => {
                self.mode = GameMode::from_str(value).ok_or_else(|| {
                    anyhow!(
                        "invalid {} value: {} (expected classic or chaos)",
                        flag,
                        value
                    )
                })?;
            }
            "--seed" => {
                let seed = value
                    .parse::<u32>()
                    .map_err(|_| anyhow!("invalid {} value: {}", flag, value))?;
                self.seed = Some(seed);
            }
            "--scores" => self.scores_path = Some(PathBuf::from(value)),
            "--log" => self.log_path = Some(PathBuf::from(value)),
            other => return Err(anyhow!("unknown argument: {}", other)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_args() {
        let cfg = AppConfig::from_sources(&[], no_env).unwrap().unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.mode, GameMode::Classic);
    }

    #[test]
    fn parses_all_flags() {
        let cfg = AppConfig::from_sources(
            &args(&["--mode", "chaos", "--seed", "42", "--scores", "s.json", "--log", "x.log"]),
            no_env,
        )
        .unwrap()
        .unwrap();
        assert_eq!(cfg.mode, GameMode::Chaos);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.scores_path, Some(PathBuf::from("s.json")));
        assert_eq!(cfg.log_path, Some(PathBuf::from("x.log")));
    }

    #[test]
    fn env_is_fallback_and_flags_win() {
        let env = |key: &str| match key {
            ENV_MODE => Some("chaos".to_string()),
            ENV_SEED => Some("7".to_string()),
            ENV_LOG => Some("   ".to_string()),
            _ => None,
        };
        let cfg = AppConfig::from_sources(&args(&["--seed", "9"]), env)
            .unwrap()
            .unwrap();
        assert_eq!(cfg.mode, GameMode::Chaos);
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.log_path, None);
    }

    #[test]
    fn rejects_bad_values() {
        let err = AppConfig::from_sources(&args(&["--mode", "zen"]), no_env).unwrap_err();
        assert!(err.to_string().contains("invalid --mode value"));

        assert!(AppConfig::from_sources(&args(&["--seed", "-1"]), no_env).is_err());
        assert!(AppConfig::from_sources(&args(&["--seed"]), no_env).is_err());
        assert!(AppConfig::from_sources(&args(&["--fast"]), no_env).is_err());

        let env = |key: &str| (key == ENV_SEED).then(|| "abc".to_string());
        let err = AppConfig::from_sources(&[], env).unwrap_err();
        assert!(format!("{:#}", err).contains(ENV_SEED));
    }

    #[test]
    fn help_returns_none() {
        assert!(AppConfig::from_sources(&args(&["--help"]), no_env)
            .unwrap()
            .is_none());
    }
}
