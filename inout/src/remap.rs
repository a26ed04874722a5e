use padmap_yosys_json::{Bit, BitVector, Module};

use crate::{split_name, NetMap, SplitDirection};

/// Splits every cell connection that touches a net in `net_map` into an input and an output connection.
///
/// At each bit position, a replaced net becomes its split net for that direction; any other bit becomes
/// undefined. Connections that touch no replaced net are kept as they are, so a second run
/// changes nothing.
/// Returns the number of connections split.
pub fn remap_connections(module: &mut Module, net_map: &NetMap) -> usize {
    let mut count = 0;
    for (cell_name, cell) in module.cells.iter_mut() {
        let ports = Vec::from_iter(
            cell.connections
                .iter()
                .filter(|(_, bits)| bits.nets().any(|net| net_map.contains(net)))
                .map(|(port_name, _)| port_name.clone()),
        );
        if ports.is_empty() {
            continue;
        }
        log::info!("processing cell '{}' of type '{}'", cell_name, cell.type_);

        for port_name in ports {
            let Some(bits) = cell.connections.remove(&port_name) else { continue };
            cell.port_directions.remove(&port_name);
            for direction in SplitDirection::ALL {
                let new_port_name = split_name(&port_name, direction);
                log::debug!("mapping cell port '{}' to '{}'", port_name, new_port_name);
                let new_bits = BitVector::from_iter(bits.iter().map(|bit| {
                    match bit.as_net().and_then(|net| net_map.net(net, direction)) {
                        Some(new_net) => Bit::Net(new_net),
                        None => Bit::Undef,
                    }
                }));
                cell.connections.add(&new_port_name, new_bits);
                cell.port_directions.add(&new_port_name, direction.port_direction());
            }
            count += 1;
        }
    }
    count
}
