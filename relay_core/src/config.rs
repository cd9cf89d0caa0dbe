// Configuration for the relay's media transport

#[derive(Clone)]
pub struct RelayConfig {
    pub stun_servers: Vec<String>,
    pub track_id: String,
    pub stream_id: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            stun_servers: vec!["stun:stun.l.google.com:19302".to_string()],
            track_id: "audio".to_string(),
            stream_id: "tts-stream".to_string(),
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let stun_servers = std::env::var("RELAY_STUN_SERVERS")
            .ok()
            .map(|servers| {
                servers
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<String>>()
            })
            .filter(|servers| !servers.is_empty())
            .unwrap_or(defaults.stun_servers);

        Self {
            stun_servers,
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert_eq!(config.track_id, "audio");
        assert_eq!(config.stream_id, "tts-stream");
        assert!(!config.stun_servers.is_empty());
    }
}
