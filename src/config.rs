use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;

pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

// Registrar configuration sourced from environment variables, with an
// optional YAML override file. The Ed25519 token seed has no default:
// startup fails without it.
#[derive(Clone)]
pub struct RegistrarConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub token_seed: [u8; 32],
    pub token_ttl_secs: u64,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
struct RegistrarConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    token_seed: Option<String>,
    token_ttl_secs: Option<u64>,
    admin_email: Option<String>,
    admin_password: Option<String>,
}

impl RegistrarConfig {
    pub fn from_env() -> Result<Self> {
        Self::build(RegistrarConfigOverride::default())
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let override_cfg = match std::env::var("REGISTRAR_CONFIG") {
            Ok(path) => {
                let contents = fs::read_to_string(&path)
                    .with_context(|| format!("read REGISTRAR_CONFIG: {path}"))?;
                serde_yaml::from_str(&contents).with_context(|| "parse registrar config yaml")?
            }
            Err(_) => RegistrarConfigOverride::default(),
        };
        Self::build(override_cfg)
    }

    // File values win over environment values, which win over defaults.
    fn build(override_cfg: RegistrarConfigOverride) -> Result<Self> {
        let bind_addr = override_cfg
            .bind_addr
            .or_else(|| std::env::var("REGISTRAR_BIND").ok())
            .unwrap_or_else(|| "0.0.0.0:8443".to_string())
            .parse()
            .with_context(|| "parse REGISTRAR_BIND")?;
        let metrics_bind = override_cfg
            .metrics_bind
            .or_else(|| std::env::var("REGISTRAR_METRICS_BIND").ok())
            .unwrap_or_else(|| "0.0.0.0:9102".to_string())
            .parse()
            .with_context(|| "parse REGISTRAR_METRICS_BIND")?;
        let seed_raw = override_cfg
            .token_seed
            .or_else(|| std::env::var("REGISTRAR_TOKEN_SEED").ok())
            .context("REGISTRAR_TOKEN_SEED is required")?;
        let token_seed = decode_seed(&seed_raw)?;
        let token_ttl_secs = match override_cfg.token_ttl_secs {
            Some(value) => value,
            None => std::env::var("REGISTRAR_TOKEN_TTL_SECS")
                .ok()
                .map(|value| value.parse().with_context(|| "parse REGISTRAR_TOKEN_TTL_SECS"))
                .transpose()?
                .unwrap_or(DEFAULT_TOKEN_TTL_SECS),
        };
        let admin_email = override_cfg
            .admin_email
            .or_else(|| std::env::var("REGISTRAR_ADMIN_EMAIL").ok());
        let admin_password = override_cfg
            .admin_password
            .or_else(|| std::env::var("REGISTRAR_ADMIN_PASSWORD").ok());
        let bootstrap_admin = match (admin_email, admin_password) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            _ => bail!("REGISTRAR_ADMIN_EMAIL and REGISTRAR_ADMIN_PASSWORD must be set together"),
        };
        Ok(Self {
            bind_addr,
            metrics_bind,
            token_seed,
            token_ttl_secs,
            bootstrap_admin,
        })
    }
}

fn decode_seed(raw: &str) -> Result<[u8; 32]> {
    let bytes = STANDARD
        .decode(raw.trim())
        .with_context(|| "decode REGISTRAR_TOKEN_SEED as base64")?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| anyhow::anyhow!("REGISTRAR_TOKEN_SEED must decode to exactly 32 bytes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    struct EnvGuard {
        key: &'static str,
        prev: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe {
                std::env::set_var(key, value);
            }
            Self { key, prev }
        }

        fn unset(key: &'static str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe {
                std::env::remove_var(key);
            }
            Self { key, prev }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.prev {
                Some(value) => unsafe {
                    std::env::set_var(self.key, value);
                },
                None => unsafe {
                    std::env::remove_var(self.key);
                },
            }
        }
    }

    fn seed_b64() -> String {
        STANDARD.encode([7u8; 32])
    }

    #[test]
    #[serial]
    fn missing_token_seed_is_fatal() {
        let _g1 = EnvGuard::unset("REGISTRAR_TOKEN_SEED");
        let _g2 = EnvGuard::unset("REGISTRAR_CONFIG");
        let err = RegistrarConfig::from_env().err().expect("missing seed");
        assert!(err.to_string().contains("REGISTRAR_TOKEN_SEED"));
    }

    #[test]
    #[serial]
    fn defaults_apply_when_only_seed_is_set() {
        let seed = seed_b64();
        let _g1 = EnvGuard::set("REGISTRAR_TOKEN_SEED", &seed);
        let _g2 = EnvGuard::unset("REGISTRAR_BIND");
        let _g3 = EnvGuard::unset("REGISTRAR_METRICS_BIND");
        let _g4 = EnvGuard::unset("REGISTRAR_TOKEN_TTL_SECS");
        let _g5 = EnvGuard::unset("REGISTRAR_ADMIN_EMAIL");
        let _g6 = EnvGuard::unset("REGISTRAR_ADMIN_PASSWORD");
        let config = RegistrarConfig::from_env().expect("config");
        assert_eq!(config.bind_addr.port(), 8443);
        assert_eq!(config.metrics_bind.port(), 9102);
        assert_eq!(config.token_ttl_secs, DEFAULT_TOKEN_TTL_SECS);
        assert_eq!(config.token_seed, [7u8; 32]);
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    #[serial]
    fn malformed_seed_is_rejected() {
        let _g1 = EnvGuard::set("REGISTRAR_TOKEN_SEED", "too-short");
        let err = RegistrarConfig::from_env().err().expect("bad seed");
        assert!(err.to_string().contains("REGISTRAR_TOKEN_SEED"));
    }

    #[test]
    #[serial]
    fn half_configured_admin_is_rejected() {
        let seed = seed_b64();
        let _g1 = EnvGuard::set("REGISTRAR_TOKEN_SEED", &seed);
        let _g2 = EnvGuard::set("REGISTRAR_ADMIN_EMAIL", "admin@example.edu");
        let _g3 = EnvGuard::unset("REGISTRAR_ADMIN_PASSWORD");
        let err = RegistrarConfig::from_env().err().expect("half admin");
        assert!(err.to_string().contains("must be set together"));
    }

    #[test]
    #[serial]
    fn yaml_override_wins_over_env() {
        let seed = seed_b64();
        let _g1 = EnvGuard::set("REGISTRAR_TOKEN_SEED", &seed);
        let _g2 = EnvGuard::set("REGISTRAR_BIND", "127.0.0.1:1111");
        let dir = std::env::temp_dir().join("registrar-config-test");
        std::fs::create_dir_all(&dir).expect("tempdir");
        let path = dir.join("override.yaml");
        std::fs::write(&path, "bind_addr: \"127.0.0.1:2222\"\ntoken_ttl_secs: 60\n")
            .expect("write yaml");
        let _g3 = EnvGuard::set("REGISTRAR_CONFIG", path.to_str().expect("utf8 path"));
        let config = RegistrarConfig::from_env_or_yaml().expect("config");
        assert_eq!(config.bind_addr.port(), 2222);
        assert_eq!(config.token_ttl_secs, 60);
    }
}
