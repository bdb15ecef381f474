use std::{env, time::Duration};

use crate::controller::{PollPolicy, DEFAULT_POLL_INTERVAL};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

/// Configuración del cliente, leída de variables de entorno:
/// - `BACKEND_URL` (default http://127.0.0.1:5000)
/// - `POLL_INTERVAL_MS` (default 2000)
/// - `MAX_POLL_FAILURES` (sin definir = reintentar siempre)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub backend_url: String,
    pub poll: PollPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            poll: PollPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con otra fuente de valores (tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let backend_url = lookup("BACKEND_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        // 0 no es un intervalo válido
        let interval = lookup("POLL_INTERVAL_MS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        let max_failures = lookup("MAX_POLL_FAILURES")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|n| *n > 0);

        Self {
            backend_url,
            poll: PollPolicy {
                interval,
                max_failures,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(pairs: &[(&str, &str)]) -> ClientConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_sin_variables() {
        assert_eq!(from(&[]), ClientConfig::default());
        assert_eq!(from(&[]).poll.interval, Duration::from_millis(2000));
        assert_eq!(from(&[]).poll.max_failures, None);
    }

    #[test]
    fn lee_las_tres_variables() {
        let cfg = from(&[
            ("BACKEND_URL", "http://backend:5000"),
            ("POLL_INTERVAL_MS", "250"),
            ("MAX_POLL_FAILURES", "5"),
        ]);
        assert_eq!(cfg.backend_url, "http://backend:5000");
        assert_eq!(cfg.poll.interval, Duration::from_millis(250));
        assert_eq!(cfg.poll.max_failures, Some(5));
    }

    #[test]
    fn valores_invalidos_caen_al_default() {
        let cfg = from(&[("POLL_INTERVAL_MS", "0"), ("MAX_POLL_FAILURES", "nunca")]);
        assert_eq!(cfg.poll.interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(cfg.poll.max_failures, None);
    }
}
