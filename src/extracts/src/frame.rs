//! Frame decoding: link header down to transport-layer endpoints.
//!
//! The pipeline only cares about established data-stream traffic, so a
//! frame contributes endpoints exactly when it carries a TCP segment over
//! IPv4 or IPv6. Everything else (ARP, ICMP, UDP, unknown link types,
//! truncated headers) yields `None` and is counted as skipped by the
//! caller.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::pcap::LinkType;

const ETHERTYPE_IPV4: u16 = 0x0800;
const ETHERTYPE_IPV6: u16 = 0x86dd;
const ETHERTYPE_VLAN: u16 = 0x8100;
const ETHERTYPE_QINQ: u16 = 0x88a8;

const IPPROTO_TCP: u8 = 6;

const IPV6_HEADER_LEN: usize = 40;
const TCP_MIN_HEADER_LEN: usize = 20;

/// Extracts the `(source, destination)` network addresses of a frame,
/// provided it carries a TCP segment.
pub fn endpoints(link_type: LinkType, frame: &[u8]) -> Option<(IpAddr, IpAddr)> {
    match link_type {
        LinkType::Ethernet => ethernet(frame),
        LinkType::LinuxSll => linux_sll(frame),
        LinkType::Raw => raw_ip(frame),
        LinkType::Null => null_loopback(frame),
        LinkType::Other(_) => None,
    }
}

fn ethernet(frame: &[u8]) -> Option<(IpAddr, IpAddr)> {
    if frame.len() < 14 {
        return None;
    }

    let mut ethertype = u16::from_be_bytes([frame[12], frame[13]]);
    let mut offset = 14;

    // unwrap at most an outer and an inner VLAN tag
    let mut tags = 0;
    while (ethertype == ETHERTYPE_VLAN || ethertype == ETHERTYPE_QINQ) && tags < 2 {
        if frame.len() < offset + 4 {
            return None;
        }
        ethertype = u16::from_be_bytes([frame[offset + 2], frame[offset + 3]]);
        offset += 4;
        tags += 1;
    }

    network_layer(ethertype, &frame[offset..])
}

fn linux_sll(frame: &[u8]) -> Option<(IpAddr, IpAddr)> {
    if frame.len() < 16 {
        return None;
    }
    let protocol = u16::from_be_bytes([frame[14], frame[15]]);
    network_layer(protocol, &frame[16..])
}

fn raw_ip(frame: &[u8]) -> Option<(IpAddr, IpAddr)> {
    match frame.first()? >> 4 {
        4 => ipv4(frame),
        6 => ipv6(frame),
        _ => None,
    }
}

fn null_loopback(frame: &[u8]) -> Option<(IpAddr, IpAddr)> {
    if frame.len() < 4 {
        return None;
    }
    // the address family is written in the capturing host's byte order
    let mut family = u32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]);
    if family > 0xff {
        family = family.swap_bytes();
    }
    match family {
        2 => ipv4(&frame[4..]),
        // AF_INET6 differs per BSD flavour
        24 | 28 | 30 => ipv6(&frame[4..]),
        _ => None,
    }
}

fn network_layer(ethertype: u16, packet: &[u8]) -> Option<(IpAddr, IpAddr)> {
    match ethertype {
        ETHERTYPE_IPV4 => ipv4(packet),
        ETHERTYPE_IPV6 => ipv6(packet),
        _ => None,
    }
}

fn ipv4(packet: &[u8]) -> Option<(IpAddr, IpAddr)> {
    if packet.len() < 20 || packet[0] >> 4 != 4 {
        return None;
    }

    let header_len = ((packet[0] & 0x0f) as usize) * 4;
    if header_len < 20 || packet.len() < header_len + TCP_MIN_HEADER_LEN {
        return None;
    }

    // non-initial fragments carry no TCP header
    let fragment_offset = u16::from_be_bytes([packet[6] & 0x1f, packet[7]]);
    if fragment_offset != 0 {
        return None;
    }

    if packet[9] != IPPROTO_TCP {
        return None;
    }

    let src = Ipv4Addr::new(packet[12], packet[13], packet[14], packet[15]);
    let dst = Ipv4Addr::new(packet[16], packet[17], packet[18], packet[19]);
    Some((IpAddr::V4(src), IpAddr::V4(dst)))
}

fn ipv6(packet: &[u8]) -> Option<(IpAddr, IpAddr)> {
    if packet.len() < IPV6_HEADER_LEN || packet[0] >> 4 != 6 {
        return None;
    }

    let mut next_header = packet[6];
    let mut offset = IPV6_HEADER_LEN;

    // walk the extension header chain looking for the transport header
    for _ in 0..8 {
        match next_header {
            n if n == IPPROTO_TCP => break,
            // hop-by-hop, routing, destination options
            0 | 43 | 60 => {
                if packet.len() < offset + 8 {
                    return None;
                }
                next_header = packet[offset];
                offset += (packet[offset + 1] as usize + 1) * 8;
            }
            // fragment header: fixed 8 bytes; non-initial fragments carry
            // no TCP header
            44 => {
                if packet.len() < offset + 8 {
                    return None;
                }
                let fragment_offset =
                    u16::from_be_bytes([packet[offset + 2], packet[offset + 3]]) >> 3;
                if fragment_offset != 0 {
                    return None;
                }
                next_header = packet[offset];
                offset += 8;
            }
            _ => return None,
        }
    }

    if next_header != IPPROTO_TCP || packet.len() < offset + TCP_MIN_HEADER_LEN {
        return None;
    }

    let src: [u8; 16] = packet[8..24].try_into().ok()?;
    let dst: [u8; 16] = packet[24..40].try_into().ok()?;
    Some((
        IpAddr::V6(Ipv6Addr::from(src)),
        IpAddr::V6(Ipv6Addr::from(dst)),
    ))
}
