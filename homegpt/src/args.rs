use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Home inference gateway
#[derive(Debug, Parser)]
#[command(name = "homegpt", about = "HTTP gateway in front of a local Ollama backend")]
pub struct Args {
    /// Path to configuration file; built-in defaults apply when it does not exist
    #[arg(short, long, default_value = "homegpt.toml", env = "HOMEGPT_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "HOMEGPT_LISTEN")]
    pub listen: Option<SocketAddr>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_local_config_file() {
        let args = Args::try_parse_from(["homegpt"]).unwrap();
        assert_eq!(args.config, PathBuf::from("homegpt.toml"));
        assert!(args.listen.is_none());
    }

    #[test]
    fn listen_override_parses() {
        let args = Args::try_parse_from(["homegpt", "--listen", "127.0.0.1:8080", "-c", "/etc/homegpt.toml"]).unwrap();
        assert_eq!(args.listen, Some("127.0.0.1:8080".parse().unwrap()));
        assert_eq!(args.config, PathBuf::from("/etc/homegpt.toml"));
    }
}
