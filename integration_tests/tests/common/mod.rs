#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use meshmap_common::identity::IdentityMap;

const MAGIC_USEC: u32 = 0xa1b2_c3d4;
const IPPROTO_TCP: u8 = 6;
const ETHERTYPE_IPV4: u16 = 0x0800;

/// An Ethernet frame carrying a minimal IPv4 TCP segment.
pub fn tcp_frame(src: [u8; 4], dst: [u8; 4]) -> Vec<u8> {
    let mut frame = vec![0u8; 12];
    frame.extend_from_slice(&ETHERTYPE_IPV4.to_be_bytes());

    let mut packet = vec![0u8; 20];
    packet[0] = 0x45;
    packet[8] = 64;
    packet[9] = IPPROTO_TCP;
    packet[12..16].copy_from_slice(&src);
    packet[16..20].copy_from_slice(&dst);
    packet.extend_from_slice(&[0u8; 20]);

    frame.extend_from_slice(&packet);
    frame
}

/// An Ethernet frame carrying a UDP datagram (never contributes an edge).
pub fn udp_frame(src: [u8; 4], dst: [u8; 4]) -> Vec<u8> {
    let mut frame = tcp_frame(src, dst);
    frame[14 + 9] = 17;
    frame
}

/// A classic little-endian microsecond pcap container around `frames`.
pub fn pcap(frames: &[Vec<u8>]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&MAGIC_USEC.to_le_bytes());
    data.extend_from_slice(&2u16.to_le_bytes());
    data.extend_from_slice(&4u16.to_le_bytes());
    data.extend_from_slice(&[0u8; 8]);
    data.extend_from_slice(&65535u32.to_le_bytes());
    data.extend_from_slice(&1u32.to_le_bytes());
    for frame in frames {
        data.extend_from_slice(&[0u8; 8]);
        data.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        data.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        data.extend_from_slice(frame);
    }
    data
}

pub fn write_capture(dir: &tempfile::TempDir, name: &str, frames: &[Vec<u8>]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, pcap(frames)).unwrap();
    path
}

/// The identity map from the reference scenario: three known entities.
pub fn scenario_identity() -> Arc<IdentityMap> {
    Arc::new(
        [
            ("10.0.0.1", "A"),
            ("10.0.0.2", "B"),
            ("10.0.0.3", "C"),
        ]
        .into_iter()
        .collect(),
    )
}
