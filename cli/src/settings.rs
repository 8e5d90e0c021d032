//! Layers the configuration sources for one invocation:
//! defaults < `--config` file < environment < command-line flags.

use config::{DialogueConfig, load_from_env, load_from_file, merge_configs};
use errors::DialogueError;

use crate::commands::GlobalArgs;

pub fn resolve(args: &GlobalArgs) -> Result<DialogueConfig, DialogueError> {
    let mut sources = Vec::new();
    if let Some(path) = &args.config {
        sources.push((load_from_file(path)?, "file"));
    }
    sources.push((load_from_env()?, "env"));

    let mut config = merge_configs(sources);
    apply_flags(&mut config, args);
    Ok(config)
}

/// Flags are explicit, so they win even when they restate a default.
fn apply_flags(config: &mut DialogueConfig, args: &GlobalArgs) {
    if let Some(timeout_ms) = args.timeout_ms {
        config.session.connect_timeout_ms = timeout_ms;
    }
    if let Some(retries) = args.retries {
        config.retry.max_retries = retries;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    fn clear_env() {
        for var in ["GUIDE_HOST", "GUIDE_CONNECT_TIMEOUT_MS", "GUIDE_RETRY_MAX"] {
            unsafe {
                env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn test_flags_override_file_and_env() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("guide.toml");
        fs::write(
            &path,
            "[session]\nconnect_timeout_ms = 3000\n\n[retry]\nmax_retries = 4\n"
        )
        .unwrap();
        unsafe {
            env::set_var("GUIDE_CONNECT_TIMEOUT_MS", "4000");
        }

        let args = GlobalArgs {
            config: Some(path),
            retries: Some(0),
            ..GlobalArgs::default()
        };
        let config = resolve(&args).unwrap();

        assert_eq!(config.session.connect_timeout_ms, 4000);
        assert_eq!(config.retry.max_retries, 0);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("guide.yaml");
        fs::write(&path, "endpoint:\n  host: file-host\n").unwrap();
        unsafe {
            env::set_var("GUIDE_HOST", "env-host");
        }

        let args = GlobalArgs {
            config: Some(path),
            ..GlobalArgs::default()
        };
        assert_eq!(resolve(&args).unwrap().endpoint.host, "env-host");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_config_file_is_configuration_error() {
        clear_env();
        let args = GlobalArgs {
            config: Some("/nonexistent/guide.toml".into()),
            ..GlobalArgs::default()
        };
        let err = resolve(&args).unwrap_err();
        assert_eq!(err.kind(), errors::ErrorKind::ConfigurationError);
    }
}
