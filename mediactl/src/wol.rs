//! Wake-on-LAN magic packets

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};

use crate::error::{DeviceError, Result};

/// Broadcast target of a wake request
pub const BROADCAST: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::BROADCAST, 9);

/// Packet length: six sync bytes plus sixteen copies of the address
pub const PACKET_LEN: usize = 6 + 16 * 6;

/// A wake request for one hardware address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagicPacket {
    mac: [u8; 6],
}

impl MagicPacket {
    /// Parse `aa:bb:cc:dd:ee:ff` or `aa-bb-cc-dd-ee-ff`
    pub fn parse(mac: &str) -> Result<Self> {
        let invalid = || DeviceError::WakeOnLan(format!("invalid hardware address '{}'", mac));

        let parts: Vec<&str> = mac.trim().split([':', '-']).collect();
        if parts.len() != 6 {
            return Err(invalid());
        }

        let mut bytes = [0u8; 6];
        for (byte, part) in bytes.iter_mut().zip(parts) {
            if part.len() != 2 {
                return Err(invalid());
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }

        Ok(Self { mac: bytes })
    }

    pub fn mac(&self) -> [u8; 6] {
        self.mac
    }

    pub fn to_bytes(&self) -> [u8; PACKET_LEN] {
        let mut packet = [0xFF; PACKET_LEN];
        for chunk in packet[6..].chunks_exact_mut(6) {
            chunk.copy_from_slice(&self.mac);
        }
        packet
    }

    /// Send the packet to `target` from an ephemeral broadcast-enabled socket
    pub fn send_to(&self, target: SocketAddr) -> Result<()> {
        let io_error = |e: std::io::Error| DeviceError::WakeOnLan(e.to_string());

        let socket = UdpSocket::bind("0.0.0.0:0").map_err(io_error)?;
        socket.set_broadcast(true).map_err(io_error)?;
        socket.send_to(&self.to_bytes(), target).map_err(io_error)?;

        tracing::debug!(%target, "magic packet sent");
        Ok(())
    }

    /// Broadcast the packet on the local network
    pub fn send(&self) -> Result<()> {
        self.send_to(SocketAddr::V4(BROADCAST))
    }
}

/// Wake the device with hardware address `mac`
pub fn wake(mac: &str) -> Result<()> {
    tracing::info!(mac, "sending wake-on-lan");
    MagicPacket::parse(mac)?.send()
}
