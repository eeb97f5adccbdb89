//! Command-line configuration and backend base-URL construction.
//!
//! The backend host can be overridden on the command line (the same role the
//! `ip` query parameter played in the browser panel). The heuristic for
//! deciding whether to append the plugin port is deliberately narrow: it is a
//! convenience for operators switching between a LAN IP and a reverse-proxied
//! domain, not a URL parser.

use clap::Parser;

/// Default port the plugin backend listens on when addressed by IP.
pub const DEFAULT_PORT: u16 = 8021;

/// Default mount path of the attitude plugin on the backend.
pub const DEFAULT_BASE_PATH: &str = "/plugins/attitude";

#[derive(Parser, Clone, Debug)]
#[command(name = "attitude-manager", version, about = "TUI admin panel for chat-bot attitude records")]
pub struct Cli {
    /// Backend host override: an IP address or a domain name.
    #[arg(long, env = "ATTITUDE_HOST")]
    pub host: Option<String>,

    /// Port appended when the host is a bare IPv4 address.
    #[arg(long, env = "ATTITUDE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Path the plugin API is mounted under.
    #[arg(long, env = "ATTITUDE_BASE_PATH", default_value = DEFAULT_BASE_PATH)]
    pub base_path: String,

    /// Surface raw response payloads in a dedicated pane.
    #[arg(long)]
    pub dev: bool,
}

impl Cli {
    /// Full base URL for the plugin API, heuristic applied.
    pub fn base_url(&self) -> String {
        match &self.host {
            Some(host) => base_url_for_host(host, self.port, &self.base_path),
            None => format!("http://localhost:{}{}", self.port, self.base_path),
        }
    }
}

/// Build the backend base URL for an operator-supplied host.
///
/// A bare IPv4 dotted-quad gets `:port` appended; anything starting with a
/// letter, or a dotted string that is not IPv4-shaped, is treated as a domain
/// served on the default HTTP port.
pub fn base_url_for_host(host: &str, port: u16, base_path: &str) -> String {
    if is_domain(host) {
        format!("http://{}{}", host, base_path)
    } else {
        format!("http://{}:{}{}", host, port, base_path)
    }
}

fn is_domain(host: &str) -> bool {
    host.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        || (host.contains('.') && !is_ipv4_shaped(host))
}

fn is_ipv4_shaped(host: &str) -> bool {
    let parts: Vec<&str> = host.split('.').collect();
    parts.len() == 4
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_host_gets_plugin_port() {
        assert_eq!(
            base_url_for_host("192.168.1.10", 8021, "/plugins/attitude"),
            "http://192.168.1.10:8021/plugins/attitude"
        );
    }

    #[test]
    fn domain_host_uses_implicit_http_port() {
        assert_eq!(
            base_url_for_host("attitude.example.com", 8021, "/plugins/attitude"),
            "http://attitude.example.com/plugins/attitude"
        );
        // Leading letter is enough, dots or not.
        assert_eq!(
            base_url_for_host("myhost", 8021, "/p"),
            "http://myhost/p"
        );
    }

    #[test]
    fn non_ipv4_dotted_string_is_a_domain() {
        assert_eq!(base_url_for_host("8.8.8", 8021, "/p"), "http://8.8.8/p");
        assert_eq!(
            base_url_for_host("1.2.3.4.5", 8021, "/p"),
            "http://1.2.3.4.5/p"
        );
    }

    #[test]
    fn numeric_host_without_dots_gets_port() {
        assert_eq!(base_url_for_host("12345", 9000, "/p"), "http://12345:9000/p");
    }

    #[test]
    fn default_base_url_targets_localhost() {
        let cli = Cli {
            host: None,
            port: DEFAULT_PORT,
            base_path: DEFAULT_BASE_PATH.to_string(),
            dev: false,
        };
        assert_eq!(cli.base_url(), "http://localhost:8021/plugins/attitude");
    }
}
