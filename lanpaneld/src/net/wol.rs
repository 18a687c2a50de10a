use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tokio::net::UdpSocket;

/// Magic packet layout: 6 bytes of 0xFF, then the address repeated 16 times.
const SYNC_LEN: usize = 6;
const REPEATS: usize = 16;
pub const MAGIC_PACKET_LEN: usize = SYNC_LEN + REPEATS * 6;

#[derive(Debug, Error)]
pub enum WakeError {
    #[error("hardware address must be 12 hexadecimal digits")]
    InvalidAddress,
    #[error("failed to send wake datagram: {0}")]
    Transport(#[from] std::io::Error),
}

/// A 6-octet hardware (MAC) address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddr([u8; 6]);

impl FromStr for MacAddr {
    type Err = WakeError;

    /// Accepts colon- or hyphen-delimited hex as well as a bare 12-digit
    /// string. Anything that does not normalize to 12 hex digits is invalid.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s.chars().filter(|c| *c != ':' && *c != '-').collect();

        if normalized.len() != 12 || !normalized.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(WakeError::InvalidAddress);
        }

        let mut octets = [0u8; 6];
        for (i, octet) in octets.iter_mut().enumerate() {
            *octet = u8::from_str_radix(&normalized[i * 2..i * 2 + 2], 16)
                .map_err(|_| WakeError::InvalidAddress)?;
        }

        Ok(Self(octets))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            a, b, c, d, e, g
        )
    }
}

/// Build the wake-on-LAN magic packet for an address.
pub fn magic_packet(mac: &MacAddr) -> [u8; MAGIC_PACKET_LEN] {
    let mut packet = [0xFFu8; MAGIC_PACKET_LEN];
    for i in 0..REPEATS {
        packet[SYNC_LEN + i * 6..SYNC_LEN + (i + 1) * 6].copy_from_slice(&mac.0);
    }
    packet
}

/// Broadcast a single wake datagram. Fire-and-forget: success means the
/// packet was handed to the network stack, not that the host woke up.
/// Callers verify wake-up separately via the prober.
pub async fn send_wake(mac: &MacAddr, broadcast: &str) -> Result<(), WakeError> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.set_broadcast(true)?;
    socket.send_to(&magic_packet(mac), broadcast).await?;

    tracing::info!("Magic packet sent to {} via {}", mac, broadcast);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_separator_forms_are_equivalent() {
        let colon: MacAddr = "AA:BB:CC:DD:EE:FF".parse().unwrap();
        let hyphen: MacAddr = "AA-BB-CC-DD-EE-FF".parse().unwrap();
        let bare: MacAddr = "AABBCCDDEEFF".parse().unwrap();

        assert_eq!(colon, hyphen);
        assert_eq!(colon, bare);
        assert_eq!(colon.to_string(), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn test_mac_case_insensitive() {
        let lower: MacAddr = "d8:cb:8a:40:15:e5".parse().unwrap();
        let upper: MacAddr = "D8:CB:8A:40:15:E5".parse().unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_short_mac_rejected() {
        let result = "AA:BB:CC".parse::<MacAddr>();
        assert!(matches!(result, Err(WakeError::InvalidAddress)));
    }

    #[test]
    fn test_non_hex_mac_rejected() {
        let result = "GG:BB:CC:DD:EE:FF".parse::<MacAddr>();
        assert!(matches!(result, Err(WakeError::InvalidAddress)));
    }

    #[test]
    fn test_magic_packet_layout() {
        let mac: MacAddr = "01:02:03:04:05:06".parse().unwrap();
        let packet = magic_packet(&mac);

        assert_eq!(packet.len(), 102);
        assert!(packet[..6].iter().all(|&b| b == 0xFF));
        for i in 0..16 {
            assert_eq!(&packet[6 + i * 6..6 + (i + 1) * 6], &[1, 2, 3, 4, 5, 6]);
        }
    }

    #[tokio::test]
    async fn test_send_wake_to_loopback() {
        // Loopback destination exercises the socket path without requiring
        // broadcast reachability. Nothing needs to listen on the port.
        let mac: MacAddr = "AA:BB:CC:DD:EE:FF".parse().unwrap();
        send_wake(&mac, "127.0.0.1:9").await.unwrap();
    }
}
