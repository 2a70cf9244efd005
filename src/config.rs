use serde::{Deserialize, Serialize};

/// Configuración global de la aplicación
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub enable_logging: bool,
    pub poll_config: PollConfig,
    pub notifier_config: NotifierConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            enable_logging: true,
            poll_config: PollConfig::default(),
            notifier_config: NotifierConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Espera fija tras un fallo de long-poll (ms)
    pub retry_backoff_ms: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            retry_backoff_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Ventana mínima entre dos sonidos de aviso (ms)
    pub sound_throttle_ms: i64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            sound_throttle_ms: 1_200,
        }
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno en tiempo de compilación
    pub fn from_env() -> Self {
        Self {
            environment: option_env!("ENVIRONMENT").unwrap_or("development").to_string(),
            enable_logging: option_env!("ENABLE_LOGGING")
                .unwrap_or("true")
                .parse()
                .unwrap_or(true),
            poll_config: PollConfig {
                retry_backoff_ms: option_env!("POLL_RETRY_BACKOFF_MS")
                    .unwrap_or("2000")
                    .parse()
                    .unwrap_or(2_000),
            },
            notifier_config: NotifierConfig {
                sound_throttle_ms: option_env!("SOUND_THROTTLE_MS")
                    .unwrap_or("1200")
                    .parse()
                    .unwrap_or(1_200),
            },
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backoff_and_throttle() {
        let config = AppConfig::default();
        assert_eq!(config.poll_config.retry_backoff_ms, 2_000);
        assert_eq!(config.notifier_config.sound_throttle_ms, 1_200);
        assert!(!config.is_production());
    }
}
