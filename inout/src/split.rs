use std::collections::{BTreeMap, BTreeSet};

use padmap_yosys_json::{Bit, BitVector, Module, NetDetails, PortDetails, PortDirection};

use crate::{split_name, Error, NetAllocator, NetMap, SplitDirection, SplitNet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitResult {
    pub net_map: NetMap,
    /// `(inout port, new port)` for every port created, in creation order.
    pub port_map: Vec<(String, String)>,
}

fn module_nets(module: &Module) -> BTreeSet<usize> {
    let mut nets = BTreeSet::new();
    for port in module.ports.values() {
        nets.extend(port.bits.nets());
    }
    for cell in module.cells.values() {
        for bits in cell.connections.values() {
            nets.extend(bits.nets());
        }
    }
    for net_details in module.netnames.values() {
        nets.extend(net_details.bits.nets());
    }
    nets
}

/// Replaces every inout port of `module` with an input port and an output port, each bound to fresh nets.
///
/// New nets are allocated past every id the module already uses. Netnames are kept consistent with the new
/// ports: the netname of a removed port is dropped, bits naming a replaced net become undefined, a netname left
/// without any net is dropped, and every new port gets a netname of its own. A module without inout ports is
/// left untouched. Cell connections are left alone; see [`crate::remap_connections`].
pub fn split_inout_ports(module: &mut Module) -> Result<SplitResult, Error> {
    let inouts = Vec::from_iter(
        module.ports.iter().filter(|(_, port)| port.direction == PortDirection::Inout).map(|(name, _)| name.clone()),
    );
    if inouts.is_empty() {
        return Ok(SplitResult::default());
    }

    // Ids of the removed ports stay occupied.
    let mut allocator = NetAllocator::new(module_nets(module));
    let mut halves: BTreeMap<usize, BTreeMap<SplitDirection, usize>> = BTreeMap::new();
    let mut new_ports = vec![];
    let mut port_map = vec![];
    for name in &inouts {
        let Some(port) = module.ports.remove(name) else { continue };

        for direction in SplitDirection::ALL {
            let new_name = split_name(name, direction);
            log::info!("mapping port '{}' to '{}'", name, new_name);
            let mut bits = vec![];
            for &bit in port.bits.iter() {
                match bit {
                    Bit::Net(net) => {
                        let new_net = allocator.allocate()?;
                        log::debug!("mapping net {} to {} ({})", net, new_net, direction);
                        halves.entry(net).or_default().insert(direction, new_net);
                        bits.push(Bit::Net(new_net));
                    }
                    constant => bits.push(constant),
                }
            }
            let new_port = PortDetails {
                direction: direction.port_direction(),
                bits: BitVector(bits),
                offset: port.offset,
                upto: port.upto,
                signed: port.signed,
            };
            port_map.push((name.clone(), new_name.clone()));
            new_ports.push((new_name, new_port));
        }
    }

    let net_map = NetMap::from_iter(halves.into_iter().filter_map(|(net, halves)| {
        let input = *halves.get(&SplitDirection::Input)?;
        let output = *halves.get(&SplitDirection::Output)?;
        Some((net, SplitNet { input, output }))
    }));

    for (name, port) in &new_ports {
        module.ports.add(name, port.clone());
    }

    for name in &inouts {
        if module.netnames.remove(name).is_some() {
            log::info!("removing netname '{}'", name);
        }
    }
    module.netnames.retain(|name, net_details| {
        for bit in net_details.bits.0.iter_mut() {
            if bit.as_net().is_some_and(|net| net_map.contains(net)) {
                *bit = Bit::Undef;
            }
        }
        if !net_details.bits.iter().any(|bit| bit.is_net()) {
            log::info!("removing netname '{}'", name);
            return false;
        }
        true
    });
    for (name, port) in new_ports {
        let mut net_details = NetDetails::new(port.bits);
        net_details.offset = port.offset;
        net_details.upto = port.upto;
        net_details.signed = port.signed;
        module.netnames.add(&name, net_details);
    }

    Ok(SplitResult { net_map, port_map })
}
