//! Fixtures shared by the unit tests of this crate.

use spt_core::address::witness_script;
use spt_core::types::{
    AddressDescriptor, AllocationEvent, AllocationReceiver, AssetEvent, AssetGuid, Hash256, Visit,
    WitnessAddress,
};

pub fn addr(seed: u8) -> WitnessAddress {
    WitnessAddress::new(0, vec![seed; 20])
}

pub fn desc(seed: u8) -> AddressDescriptor {
    AddressDescriptor::from(witness_script(&addr(seed)))
}

pub fn visit(vout: u32) -> Visit {
    Visit { txid: Hash256([0x5a; 32]), vout }
}

pub fn asset_event(guid: AssetGuid, owner: u8, amount: u64, transfer_to: Option<u8>) -> AssetEvent {
    AssetEvent {
        guid,
        owner: addr(owner),
        amount,
        transfer_to: transfer_to.map(addr).unwrap_or_default(),
    }
}

pub fn allocation_event(guid: AssetGuid, sender: u8, receivers: &[(u8, u64)]) -> AllocationEvent {
    AllocationEvent {
        guid,
        sender: addr(sender),
        receivers: receivers
            .iter()
            .map(|&(seed, amount)| AllocationReceiver { address: addr(seed), amount })
            .collect(),
    }
}
