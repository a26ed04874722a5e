use padmap_yosys_json::Design;

mod naming;
mod allocate;
mod net_map;
mod split;
mod remap;

pub use naming::{split_name, SplitDirection};
pub use allocate::{free_net, NetAllocator};
pub use net_map::{NetMap, SplitNet};
pub use split::{split_inout_ports, SplitResult};
pub use remap::remap_connections;

#[derive(Debug)]
pub enum Error {
    Schema(String),
    NetCollision(usize),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Schema(message) => write!(f, "schema error: {}", message),
            Error::NetCollision(net) => write!(f, "allocated net {} is already in use", net),
        }
    }
}

impl std::error::Error for Error {}

pub use Error as SplitError;

/// Returns the name of the only module with a true `top` attribute.
pub fn find_top_module(design: &Design) -> Result<String, Error> {
    let tops = Vec::from_iter(design.modules.iter().filter(|(_, module)| module.is_top()).map(|(name, _)| name));
    match &tops[..] {
        [] => Err(Error::Schema("no top module found".into())),
        [name] => Ok((*name).clone()),
        names => Err(Error::Schema(format!(
            "multiple top modules: {}",
            names.iter().map(|name| name.as_str()).collect::<Vec<_>>().join(", ")
        ))),
    }
}

/// Removes every inout port from the top module of `design`, rewriting cell connections to match.
pub fn desugar(design: &mut Design) -> Result<SplitResult, Error> {
    let top_name = find_top_module(design)?;
    let Some(module) = design.modules.get_mut(&top_name) else {
        return Err(Error::Schema(format!("top module '{}' not found", top_name)));
    };
    let result = split_inout_ports(module)?;
    let count = remap_connections(module, &result.net_map);
    log::info!("split {} ports and {} cell connections in module '{}'", result.port_map.len(), count, top_name);
    Ok(result)
}
