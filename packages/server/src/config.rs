//! Server configuration.
//!
//! Every option can be given on the command line or through a `HIROBA_*`
//! environment variable.

use clap::Parser;

/// Realtime chat room server
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "hiroba-server")]
#[command(about = "Realtime chat room server: room membership and message fan-out over WebSocket")]
#[command(version)]
pub struct ServerConfig {
    /// Host to bind to
    #[arg(long, env = "HIROBA_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "HIROBA_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "HIROBA_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Room to create at startup, used as both id and name (repeatable)
    #[arg(
        long = "room",
        env = "HIROBA_ROOMS",
        value_delimiter = ',',
        default_value = "general"
    )]
    pub rooms: Vec<String>,

    /// User to create at startup, used as both id and name (repeatable)
    #[arg(long = "user", env = "HIROBA_USERS", value_delimiter = ',')]
    pub users: Vec<String>,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            rooms: vec!["general".to_string()],
            users: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repeated_rooms() {
        // テスト項目: --room を繰り返し指定できる
        // when (操作):
        let config = ServerConfig::try_parse_from([
            "hiroba-server",
            "--port",
            "9000",
            "--room",
            "lobby",
            "--room",
            "random",
            "--user",
            "alice",
        ])
        .unwrap();

        // then (期待する結果):
        assert_eq!(config.addr(), "127.0.0.1:9000");
        assert_eq!(config.rooms, vec!["lobby", "random"]);
        assert_eq!(config.users, vec!["alice"]);
    }

    #[test]
    fn test_rejects_invalid_port() {
        // テスト項目: 不正なポート番号はパースエラー
        // when (操作):
        let result = ServerConfig::try_parse_from(["hiroba-server", "--port", "http"]);

        // then (期待する結果):
        assert!(result.is_err());
    }
}
