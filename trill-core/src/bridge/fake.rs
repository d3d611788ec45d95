//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

//! In-memory `BridgeDevice` used by the test suite, in the same spirit as
//! `holo_isis::network::socket`'s `cfg(feature = "testing")` fake socket:
//! no real device I/O, just enough state to assert on what the core did.

use std::collections::HashMap;
use std::sync::Mutex;

use trill_utils::mac_addr::MacAddr;

use super::{BridgeForward, BridgePort, Counters, Fdb, NickResolution, Stp, Vni};
use crate::nickname::Nickname;
use crate::packet::Frame;
use crate::types::{FdbEntry, PortId, Vid, VniHandle};

#[derive(Default)]
struct State {
    fdb: HashMap<(MacAddr, u16), FdbEntry>,
    fdb_learned: Vec<(PortId, MacAddr, Vid, Option<Nickname>)>,
    local_guest_ports: HashMap<(PortId, MacAddr, u16), bool>,
    trill_flag: HashMap<u32, bool>,
    port_vni: HashMap<u32, u32>,
    nick_resolution: HashMap<(u32, MacAddr, u16), Nickname>,
    stp_stopped: bool,

    forwarded: Vec<(PortId, Frame)>,
    delivered: Vec<(PortId, Frame)>,
    endstation_delivered: Vec<Frame>,
    trill_flooded: Vec<Frame>,
    vni_flooded: Vec<(VniHandle, Frame, bool)>,
}

/// Fake bridge device: configurable fdb/port-classification tables, and a
/// record of every outbound call so tests can assert on exactly what was
/// forwarded, delivered, or flooded.
pub struct FakeBridge {
    own_mac: MacAddr,
    counters: Counters,
    vnis: Mutex<HashMap<u32, VniHandle>>,
    state: Mutex<State>,
}

impl FakeBridge {
    pub fn new(own_mac: MacAddr) -> FakeBridge {
        FakeBridge {
            own_mac,
            counters: Counters::default(),
            vnis: Mutex::new(HashMap::new()),
            state: Mutex::new(State::default()),
        }
    }

    pub fn set_fdb(&self, mac: MacAddr, vid: Vid, entry: FdbEntry) {
        self.state.lock().unwrap().fdb.insert((mac, vid.0), entry);
    }

    pub fn set_local_guest_port(&self, port: PortId, mac: MacAddr, vid: Vid, present: bool) {
        self.state
            .lock()
            .unwrap()
            .local_guest_ports
            .insert((port, mac, vid.0), present);
    }

    pub fn set_trill_flag(&self, port: PortId, enabled: bool) {
        self.state.lock().unwrap().trill_flag.insert(port.0, enabled);
    }

    pub fn set_port_vni(&self, port: PortId, vni: u32) {
        self.state.lock().unwrap().port_vni.insert(port.0, vni);
    }

    pub fn set_nick_resolution(&self, port: PortId, mac: MacAddr, vid: Vid, nick: Nickname) {
        self.state
            .lock()
            .unwrap()
            .nick_resolution
            .insert((port.0, mac, vid.0), nick);
    }

    pub fn register_vni(&self, vni_id: u32, handle: VniHandle) {
        self.vnis.lock().unwrap().insert(vni_id, handle);
    }

    pub fn stp_stopped(&self) -> bool {
        self.state.lock().unwrap().stp_stopped
    }

    pub fn forwarded(&self) -> Vec<(PortId, Frame)> {
        self.state.lock().unwrap().forwarded.clone()
    }

    pub fn delivered(&self) -> Vec<(PortId, Frame)> {
        self.state.lock().unwrap().delivered.clone()
    }

    pub fn endstation_delivered(&self) -> Vec<Frame> {
        self.state.lock().unwrap().endstation_delivered.clone()
    }

    pub fn trill_flooded(&self) -> Vec<Frame> {
        self.state.lock().unwrap().trill_flooded.clone()
    }

    pub fn fdb_learned(&self) -> Vec<(PortId, MacAddr, Vid, Option<Nickname>)> {
        self.state.lock().unwrap().fdb_learned.clone()
    }
}

impl Fdb for FakeBridge {
    fn get(&self, mac: MacAddr, vid: Vid) -> Option<FdbEntry> {
        self.state.lock().unwrap().fdb.get(&(mac, vid.0)).copied()
    }

    fn update(&self, port: PortId, mac: MacAddr, vid: Vid) {
        self.state
            .lock()
            .unwrap()
            .fdb_learned
            .push((port, mac, vid, None));
    }

    fn update_with_nick(&self, port: PortId, mac: MacAddr, vid: Vid, ingress_nick: Nickname) {
        self.state
            .lock()
            .unwrap()
            .fdb_learned
            .push((port, mac, vid, Some(ingress_nick)));
    }
}

impl BridgeForward for FakeBridge {
    fn forward(&self, port: PortId, frame: Frame) {
        self.state.lock().unwrap().forwarded.push((port, frame));
    }

    fn deliver(&self, port: PortId, frame: Frame) {
        self.state.lock().unwrap().delivered.push((port, frame));
    }

    fn endstation_deliver(&self, frame: Frame) {
        self.state.lock().unwrap().endstation_delivered.push(frame);
    }

    fn trill_flood_forward(&self, frame: Frame) {
        self.state.lock().unwrap().trill_flooded.push(frame);
    }

    fn handle_frame_finish(&self, _frame: Frame) {}

    fn allowed_ingress(&self, _port: PortId, _frame: &Frame) -> Option<Vid> {
        Some(Vid(1))
    }
}

impl BridgePort for FakeBridge {
    fn port_of(&self, _frame: &Frame) -> Option<PortId> {
        None
    }

    fn is_local_guest_port(&self, port: PortId, mac: MacAddr, vid: Vid) -> bool {
        *self
            .state
            .lock()
            .unwrap()
            .local_guest_ports
            .get(&(port, mac, vid.0))
            .unwrap_or(&false)
    }

    fn trill_flag(&self, port: PortId) -> bool {
        *self
            .state
            .lock()
            .unwrap()
            .trill_flag
            .get(&port.0)
            .unwrap_or(&false)
    }

    fn port_vni_id(&self, port: PortId) -> Option<u32> {
        self.state.lock().unwrap().port_vni.get(&port.0).copied()
    }
}

impl Stp for FakeBridge {
    fn stop(&self) {
        self.state.lock().unwrap().stp_stopped = true;
    }
}

impl NickResolution for FakeBridge {
    fn lookup_nick_from_mac(&self, port: PortId, mac: MacAddr, vid: Vid) -> Nickname {
        *self
            .state
            .lock()
            .unwrap()
            .nick_resolution
            .get(&(port.0, mac, vid.0))
            .unwrap_or(&Nickname::NONE)
    }
}

impl Vni for FakeBridge {
    fn find_vni(&self, vni_id: u32) -> Option<VniHandle> {
        self.vnis.lock().unwrap().get(&vni_id).copied()
    }

    fn vni_flood_deliver(&self, vni: VniHandle, frame: Frame, free_on_exhaustion: bool) {
        self.state
            .lock()
            .unwrap()
            .vni_flooded
            .push((vni, frame, free_on_exhaustion));
    }
}

impl super::BridgeDevice for FakeBridge {
    fn own_mac(&self) -> MacAddr {
        self.own_mac
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }
}
