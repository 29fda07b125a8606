use std::net::{Ipv4Addr, SocketAddr};

use anyhow::{Context, Result};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

/// Binds the HTTP listener. `host` may be an IPv4 or IPv6 literal or a
/// hostname.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))
}

/// Best guess at this machine's LAN-facing IPv4 address.
///
/// Connecting a UDP socket sends nothing; it only makes the OS pick the
/// outbound interface, whose address we then read back.
pub fn local_ipv4() -> Option<Ipv4Addr> {
    let sock = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP)).ok()?;
    let probe: SocketAddr = (Ipv4Addr::new(192, 0, 2, 1), 9).into();
    sock.connect(&probe.into()).ok()?;

    let addr = sock.local_addr().ok()?.as_socket_ipv4()?;
    let ip = *addr.ip();
    if ip.is_loopback() || ip.is_unspecified() {
        return None;
    }
    Some(ip)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_ip_literals_and_hostnames() {
        for host in ["127.0.0.1", "localhost", "0.0.0.0"] {
            let listener = bind(host, 0).await.unwrap();
            assert_ne!(listener.local_addr().unwrap().port(), 0);
        }
    }

    #[tokio::test]
    async fn binds_bracketed_ipv6_when_available() {
        // Hosts without IPv6 cannot bind at all; only check the address form.
        if std::net::TcpListener::bind("[::1]:0").is_err() {
            return;
        }
        let listener = bind("[::1]", 0).await.unwrap();
        assert!(listener.local_addr().unwrap().is_ipv6());
        let listener = bind("::1", 0).await.unwrap();
        assert!(listener.local_addr().unwrap().is_ipv6());
    }
}
