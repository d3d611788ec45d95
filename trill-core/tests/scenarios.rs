//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

//! End-to-end scenarios against the fake bridge device, covering the six
//! named cases and the boundary conditions from spec.md §8.

use std::sync::Arc;

use bytes::BytesMut;
use trill_core::bridge::fake::FakeBridge;
use trill_core::bridge::BridgeDevice;
use trill_core::control;
use trill_core::neighbor::NeighborInfo;
use trill_core::nickname::Nickname;
use trill_core::packet::header::Header;
use trill_core::packet::Frame;
use trill_core::state::Bridge;
use trill_core::types::{FdbEntry, PortId, Vid};
use trill_core::{CoreConfig, Disposition};
use trill_utils::mac_addr::MacAddr;

const VID: Vid = Vid(10);

fn end_station_frame(dst: MacAddr, src: MacAddr) -> Frame {
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&dst.as_bytes());
    buf.extend_from_slice(&src.as_bytes());
    buf.extend_from_slice(&[0x08, 0x00]);
    Frame::new(buf)
}

fn trill_frame(
    outer_dst: MacAddr,
    outer_src: MacAddr,
    header: Header,
    inner_dst: MacAddr,
    inner_src: MacAddr,
) -> Frame {
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&outer_dst.as_bytes());
    buf.extend_from_slice(&outer_src.as_bytes());
    buf.extend_from_slice(&[0x22, 0xf3]);
    header.encode(&mut buf);
    buf.extend_from_slice(&inner_dst.as_bytes());
    buf.extend_from_slice(&inner_src.as_bytes());
    buf.extend_from_slice(&[0x08, 0x00]);
    Frame::new(buf)
}

fn unicast_header(egress: Nickname, ingress: Nickname, hop_count: u8) -> Header {
    Header {
        version: 0,
        multi_destination: false,
        opt_len: 0,
        hop_count,
        egress,
        ingress,
    }
}

#[test]
fn scenario_1_unicast_encap() {
    let ma = MacAddr::from([0x0a; 6]);
    let mb = MacAddr::from([0x0b; 6]);
    let es1 = MacAddr::from([0xe5, 1, 0, 0, 0, 0]);
    let es2 = MacAddr::from([0xe5, 2, 0, 0, 0, 0]);
    let guest_port = PortId(1);

    let device = Arc::new(FakeBridge::new(ma));
    let bridge = Bridge::new(device.clone());
    bridge.enable();
    let state = bridge.rbr_state().unwrap();
    control::set_local_nick(&state, Nickname::new(1)).unwrap(); // A
    control::install_neighbor(&state, Nickname::new(2), NeighborInfo::new(mb)).unwrap(); // B

    device.set_trill_flag(guest_port, true);
    device.set_nick_resolution(guest_port, es2, VID, Nickname::new(2));

    let config = CoreConfig::default();
    let frame = end_station_frame(es2, es1);
    let disposition = trill_core::receive(&bridge, &config, None, guest_port, frame, false);
    assert!(matches!(disposition, Disposition::Consumed));

    let flooded = device.trill_flooded();
    assert_eq!(flooded.len(), 1);
    assert_eq!(flooded[0].outer_dst(), Some(mb));
    assert_eq!(flooded[0].outer_src(), Some(ma));
    let header = flooded[0].trill_header().unwrap();
    assert!(!header.multi_destination);
    assert_eq!(header.egress, Nickname::new(2));
    assert_eq!(header.ingress, Nickname::new(1));
    // The Forwarder decrements in place per spec.md §4.5 step 2 even on the
    // first hop out of the ingress bridge, so the wire value is one less
    // than the configured initial hop count.
    assert_eq!(header.hop_count, config.initial_hop_count - 1);

    let offset = flooded[0].trill_payload_offset(header.trh_size());
    let inner = flooded[0].as_bytes();
    assert_eq!(&inner[offset..offset + 6], es2.as_bytes());
    assert_eq!(&inner[offset + 6..offset + 12], es1.as_bytes());
}

#[test]
fn scenario_2_unicast_transit() {
    let mb = MacAddr::from([0x0b; 6]);
    let ma = MacAddr::from([0x0a; 6]);
    let mc = MacAddr::from([0x0c; 6]);
    let fabric_port = PortId(2);

    let device = Arc::new(FakeBridge::new(mb));
    let bridge = Bridge::new(device.clone());
    bridge.enable();
    let state = bridge.rbr_state().unwrap();
    control::set_local_nick(&state, Nickname::new(2)).unwrap(); // B
    control::install_neighbor(&state, Nickname::new(3), NeighborInfo::new(mc)).unwrap(); // C
    device.set_trill_flag(fabric_port, false);

    let config = CoreConfig::default();
    let header = unicast_header(Nickname::new(3), Nickname::new(1), 5);
    let frame = trill_frame(
        mb,
        ma,
        header,
        MacAddr::from([0xe5, 2, 0, 0, 0, 0]),
        MacAddr::from([0xe5, 1, 0, 0, 0, 0]),
    );
    let disposition = trill_core::receive(&bridge, &config, None, fabric_port, frame, false);
    assert!(matches!(disposition, Disposition::Consumed));

    let flooded = device.trill_flooded();
    assert_eq!(flooded.len(), 1);
    assert_eq!(flooded[0].outer_dst(), Some(mc));
    assert_eq!(flooded[0].outer_src(), Some(mb));
    assert_eq!(flooded[0].trill_header().unwrap().hop_count, 4);
}

#[test]
fn scenario_3_decap() {
    let mc = MacAddr::from([0x0c; 6]);
    let ma = MacAddr::from([0x0a; 6]);
    let es1 = MacAddr::from([0xe5, 1, 0, 0, 0, 0]);
    let es2 = MacAddr::from([0xe5, 2, 0, 0, 0, 0]);
    let fabric_port = PortId(3);
    let dest_port = PortId(9);

    let device = Arc::new(FakeBridge::new(mc));
    let bridge = Bridge::new(device.clone());
    bridge.enable();
    let state = bridge.rbr_state().unwrap();
    control::set_local_nick(&state, Nickname::new(3)).unwrap(); // C
    device.set_trill_flag(fabric_port, false);
    device.set_fdb(es2, VID, FdbEntry { port: dest_port, vni: None });

    let config = CoreConfig::default();
    let header = unicast_header(Nickname::new(3), Nickname::new(1), 3);
    let frame = trill_frame(mc, ma, header, es2, es1);
    let disposition = trill_core::receive(&bridge, &config, None, fabric_port, frame, false);
    assert!(matches!(disposition, Disposition::Consumed));

    assert_eq!(
        device.fdb_learned(),
        vec![(fabric_port, es1, VID, Some(Nickname::new(1)))]
    );
    let delivered = device.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, dest_port);
    assert_eq!(delivered[0].1.outer_dst(), Some(es2));
    assert_eq!(delivered[0].1.outer_src(), Some(es1));
}

#[test]
fn scenario_4_multi_destination_prunes_arrival_link() {
    let mr = MacAddr::from([0x0a; 6]);
    let mb = MacAddr::from([0x0b; 6]);
    let md = MacAddr::from([0x0d; 6]);
    let fabric_port = PortId(4);

    let device = Arc::new(FakeBridge::new(mr));
    let bridge = Bridge::new(device.clone());
    bridge.enable();
    let state = bridge.rbr_state().unwrap();
    let a = Nickname::new(1);
    let b = Nickname::new(2);
    let d = Nickname::new(3);
    let z = Nickname::new(99);
    control::set_local_nick(&state, a).unwrap();
    control::set_tree_root(&state, a).unwrap();
    let mut root_info = NeighborInfo::new(MacAddr::ZERO);
    root_info.adjacencies = vec![b, d];
    control::install_neighbor(&state, a, root_info).unwrap();
    control::install_neighbor(&state, b, NeighborInfo::new(mb)).unwrap();
    control::install_neighbor(&state, d, NeighborInfo::new(md)).unwrap();
    device.set_trill_flag(fabric_port, false);

    let config = CoreConfig::default();
    let header = Header {
        version: 0,
        multi_destination: true,
        opt_len: 0,
        hop_count: 5,
        egress: a,
        ingress: z,
    };
    let frame = trill_frame(
        mr,
        mb,
        header,
        MacAddr::from([0xe5, 2, 0, 0, 0, 0]),
        MacAddr::from([0xe5, 1, 0, 0, 0, 0]),
    );
    let disposition = trill_core::receive(&bridge, &config, None, fabric_port, frame, false);
    assert!(matches!(disposition, Disposition::Consumed));

    let flooded = device.trill_flooded();
    assert_eq!(flooded.len(), 1);
    assert_eq!(flooded[0].outer_dst(), Some(md));
    assert_eq!(flooded[0].outer_src(), Some(mr));
    assert_eq!(flooded[0].trill_header().unwrap().hop_count, 4);

    // Local decapsulation also happened: no fdb entry for ES2 means the
    // fake bridge records it as an end-station flood.
    assert_eq!(device.endstation_delivered().len(), 1);
}

#[test]
fn scenario_5_rpf_failure() {
    let mr = MacAddr::from([0x0a; 6]);
    let mb = MacAddr::from([0x0b; 6]);
    let md = MacAddr::from([0x0d; 6]);
    let fabric_port = PortId(4);

    let device = Arc::new(FakeBridge::new(mr));
    let bridge = Bridge::new(device.clone());
    bridge.enable();
    let state = bridge.rbr_state().unwrap();
    let a = Nickname::new(1);
    let b = Nickname::new(2);
    let d = Nickname::new(3);
    let w = Nickname::new(4);
    let z = Nickname::new(99);
    control::set_local_nick(&state, a).unwrap();
    control::set_tree_root(&state, a).unwrap();
    let mut root_info = NeighborInfo::new(MacAddr::ZERO);
    root_info.adjacencies = vec![b, d];
    control::install_neighbor(&state, a, root_info).unwrap();
    control::install_neighbor(&state, b, NeighborInfo::new(mb)).unwrap();
    control::install_neighbor(&state, d, NeighborInfo::new(md)).unwrap();
    let mut z_info = NeighborInfo::new(MacAddr::ZERO);
    z_info.dt_roots = vec![w];
    control::install_neighbor(&state, z, z_info).unwrap();
    device.set_trill_flag(fabric_port, false);

    let config = CoreConfig::default();
    let header = Header {
        version: 0,
        multi_destination: true,
        opt_len: 0,
        hop_count: 5,
        egress: a,
        ingress: z,
    };
    let frame = trill_frame(
        mr,
        mb,
        header,
        MacAddr::from([0xe5, 2, 0, 0, 0, 0]),
        MacAddr::from([0xe5, 1, 0, 0, 0, 0]),
    );
    trill_core::receive(&bridge, &config, None, fabric_port, frame, false);

    assert!(device.trill_flooded().is_empty());
    assert!(device.endstation_delivered().is_empty());
    assert_eq!(device.counters().rx_dropped.load(std::sync::atomic::Ordering::Relaxed), 1);
}

#[test]
fn scenario_6_loop_guard() {
    let ma = MacAddr::from([0x0a; 6]);
    let mz = MacAddr::from([0x99; 6]);
    let fabric_port = PortId(5);

    let device = Arc::new(FakeBridge::new(ma));
    let bridge = Bridge::new(device.clone());
    bridge.enable();
    let state = bridge.rbr_state().unwrap();
    control::set_local_nick(&state, Nickname::new(1)).unwrap();
    device.set_trill_flag(fabric_port, false);

    let config = CoreConfig::default();
    let header = unicast_header(Nickname::new(2), Nickname::new(1), 5);
    let frame = trill_frame(
        ma,
        mz,
        header,
        MacAddr::from([0xe5, 2, 0, 0, 0, 0]),
        MacAddr::from([0xe5, 1, 0, 0, 0, 0]),
    );
    trill_core::receive(&bridge, &config, None, fabric_port, frame, false);

    assert!(device.trill_flooded().is_empty());
    assert!(device.delivered().is_empty());
    assert!(device.endstation_delivered().is_empty());
}

#[test]
fn boundary_hop_count_zero_transit_drops() {
    let mb = MacAddr::from([0x0b; 6]);
    let ma = MacAddr::from([0x0a; 6]);
    let mc = MacAddr::from([0x0c; 6]);
    let fabric_port = PortId(2);

    let device = Arc::new(FakeBridge::new(mb));
    let bridge = Bridge::new(device.clone());
    bridge.enable();
    let state = bridge.rbr_state().unwrap();
    control::set_local_nick(&state, Nickname::new(2)).unwrap();
    control::install_neighbor(&state, Nickname::new(3), NeighborInfo::new(mc)).unwrap();
    device.set_trill_flag(fabric_port, false);

    let config = CoreConfig::default();
    let header = unicast_header(Nickname::new(3), Nickname::new(1), 0);
    let frame = trill_frame(
        mb,
        ma,
        header,
        MacAddr::from([0xe5, 2, 0, 0, 0, 0]),
        MacAddr::from([0xe5, 1, 0, 0, 0, 0]),
    );
    trill_core::receive(&bridge, &config, None, fabric_port, frame, false);

    assert!(device.trill_flooded().is_empty());
}

#[test]
fn boundary_hop_count_one_transit_drops() {
    // Arriving hop_count=1 on a bridge that must still transit the frame is
    // dropped outright — forwarding it would require decrementing hop_count
    // to 0 and emitting a frame that has already exhausted its TTL.
    let mb = MacAddr::from([0x0b; 6]);
    let ma = MacAddr::from([0x0a; 6]);
    let mc = MacAddr::from([0x0c; 6]);
    let fabric_port = PortId(2);

    let device = Arc::new(FakeBridge::new(mb));
    let bridge = Bridge::new(device.clone());
    bridge.enable();
    let state = bridge.rbr_state().unwrap();
    control::set_local_nick(&state, Nickname::new(2)).unwrap();
    control::install_neighbor(&state, Nickname::new(3), NeighborInfo::new(mc)).unwrap();
    device.set_trill_flag(fabric_port, false);

    let config = CoreConfig::default();
    let header = unicast_header(Nickname::new(3), Nickname::new(1), 1);
    let frame = trill_frame(
        mb,
        ma,
        header,
        MacAddr::from([0xe5, 2, 0, 0, 0, 0]),
        MacAddr::from([0xe5, 1, 0, 0, 0, 0]),
    );
    trill_core::receive(&bridge, &config, None, fabric_port, frame, false);

    assert!(device.trill_flooded().is_empty());
    assert_eq!(device.counters().rx_dropped.load(std::sync::atomic::Ordering::Relaxed), 1);
}

#[test]
fn boundary_decap_succeeds_even_at_hop_count_zero() {
    let mc = MacAddr::from([0x0c; 6]);
    let ma = MacAddr::from([0x0a; 6]);
    let fabric_port = PortId(3);

    let device = Arc::new(FakeBridge::new(mc));
    let bridge = Bridge::new(device.clone());
    bridge.enable();
    let state = bridge.rbr_state().unwrap();
    control::set_local_nick(&state, Nickname::new(3)).unwrap();
    device.set_trill_flag(fabric_port, false);

    let config = CoreConfig::default();
    let header = unicast_header(Nickname::new(3), Nickname::new(1), 0);
    let frame = trill_frame(
        mc,
        ma,
        header,
        MacAddr::from([0xe5, 2, 0, 0, 0, 0]),
        MacAddr::from([0xe5, 1, 0, 0, 0, 0]),
    );
    trill_core::receive(&bridge, &config, None, fabric_port, frame, false);

    assert_eq!(device.endstation_delivered().len(), 1);
}

#[test]
fn boundary_opt_len_nonzero_without_vnt_drops() {
    let mc = MacAddr::from([0x0c; 6]);
    let ma = MacAddr::from([0x0a; 6]);
    let fabric_port = PortId(3);

    let device = Arc::new(FakeBridge::new(mc));
    let bridge = Bridge::new(device.clone());
    bridge.enable();
    let state = bridge.rbr_state().unwrap();
    control::set_local_nick(&state, Nickname::new(3)).unwrap();
    device.set_trill_flag(fabric_port, false);

    let config = CoreConfig::default();
    let header = Header {
        version: 0,
        multi_destination: false,
        opt_len: 3,
        hop_count: 3,
        egress: Nickname::new(3),
        ingress: Nickname::new(1),
    };
    // vni=None passed to receive(), so opt_len != 0 is unsupported here.
    let frame = trill_frame(
        mc,
        ma,
        header,
        MacAddr::from([0xe5, 2, 0, 0, 0, 0]),
        MacAddr::from([0xe5, 1, 0, 0, 0, 0]),
    );
    trill_core::receive(&bridge, &config, None, fabric_port, frame, false);

    assert!(device.endstation_delivered().is_empty());
    assert!(device.delivered().is_empty());
    assert_eq!(device.counters().rx_dropped.load(std::sync::atomic::Ordering::Relaxed), 1);
}

#[test]
fn boundary_short_buffer_drops() {
    let mc = MacAddr::from([0x0c; 6]);
    let fabric_port = PortId(3);

    let device = Arc::new(FakeBridge::new(mc));
    let bridge = Bridge::new(device.clone());
    bridge.enable();
    let state = bridge.rbr_state().unwrap();
    control::set_local_nick(&state, Nickname::new(3)).unwrap();
    device.set_trill_flag(fabric_port, false);

    let config = CoreConfig::default();
    // Outer header plus TRILL ethertype, but no TRILL shim header bytes.
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&mc.as_bytes());
    buf.extend_from_slice(&MacAddr::from([0x0a; 6]).as_bytes());
    buf.extend_from_slice(&[0x22, 0xf3]);
    let frame = Frame::new(buf);

    trill_core::receive(&bridge, &config, None, fabric_port, frame, false);

    assert!(device.endstation_delivered().is_empty());
    assert_eq!(device.counters().rx_dropped.load(std::sync::atomic::Ordering::Relaxed), 1);
}

#[test]
fn round_trip_encap_then_decap_yields_original_inner_frame() {
    let ma = MacAddr::from([0x0a; 6]);
    let mb = MacAddr::from([0x0b; 6]);
    let es1 = MacAddr::from([0xe5, 1, 0, 0, 0, 0]);
    let es2 = MacAddr::from([0xe5, 2, 0, 0, 0, 0]);
    let guest_port = PortId(1);
    let dest_port = PortId(9);

    // Bridge A encapsulates...
    let device_a = Arc::new(FakeBridge::new(ma));
    let bridge_a = Bridge::new(device_a.clone());
    bridge_a.enable();
    let state_a = bridge_a.rbr_state().unwrap();
    control::set_local_nick(&state_a, Nickname::new(1)).unwrap();
    control::install_neighbor(&state_a, Nickname::new(2), NeighborInfo::new(mb)).unwrap();
    device_a.set_trill_flag(guest_port, true);
    device_a.set_nick_resolution(guest_port, es2, VID, Nickname::new(2));

    let config = CoreConfig::default();
    let original = end_station_frame(es2, es1);
    let original_bytes = original.as_bytes().to_vec();
    trill_core::receive(&bridge_a, &config, None, guest_port, original, false);
    let encapsulated = device_a.trill_flooded().remove(0);

    // ... bridge B (=egress) decapsulates it back to the original bytes.
    let device_b = Arc::new(FakeBridge::new(mb));
    let bridge_b = Bridge::new(device_b.clone());
    bridge_b.enable();
    let state_b = bridge_b.rbr_state().unwrap();
    control::set_local_nick(&state_b, Nickname::new(2)).unwrap();
    let fabric_port = PortId(2);
    device_b.set_trill_flag(fabric_port, false);
    device_b.set_fdb(es2, VID, FdbEntry { port: dest_port, vni: None });

    trill_core::receive(&bridge_b, &config, None, fabric_port, encapsulated, false);

    assert_eq!(
        device_b.fdb_learned(),
        vec![(fabric_port, es1, VID, Some(Nickname::new(1)))]
    );
    let delivered = device_b.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].1.as_bytes(), &original_bytes[..]);
}
