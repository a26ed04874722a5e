use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;

use padmap_inout::{split_name, SplitDirection};

use crate::IoList;

/// Maps every top-level port name of a desugared netlist back to the net name it had before inout splitting.
///
/// `C_$inp` and `C_$out` both map to `C`, and `B_$inp[2]` maps to `B[2]`; all other names map to themselves.
#[derive(Debug, Clone)]
pub struct NetAliasResolver {
    inputs: BTreeSet<String>,
    outputs: BTreeSet<String>,
    aliases: BTreeMap<String, String>,
    nets: BTreeSet<String>,
    inout_nets: BTreeSet<String>,
    index_pattern: Regex,
}

impl NetAliasResolver {
    pub fn new(io_list: &IoList) -> NetAliasResolver {
        let inout_pattern = Regex::new(&format!(
            r"^(.+)({}|{})(.*)$",
            regex::escape(SplitDirection::Input.suffix()),
            regex::escape(SplitDirection::Output.suffix())
        ))
        .expect("split suffix pattern should be valid");
        let index_pattern = Regex::new(r"^(.+?)(\[[0-9]+\])?$").expect("bus index pattern should be valid");

        let mut aliases = BTreeMap::new();
        let mut inout_nets = BTreeSet::new();
        for name in io_list.inputs.iter().chain(io_list.outputs.iter()) {
            let alias = match inout_pattern.captures(name) {
                Some(captures) => {
                    let alias = format!("{}{}", &captures[1], &captures[3]);
                    log::debug!("net '{}' is part of inout '{}'", name, alias);
                    inout_nets.insert(alias.clone());
                    alias
                }
                None => name.clone(),
            };
            aliases.insert(name.clone(), alias);
        }
        let nets = BTreeSet::from_iter(aliases.values().cloned());

        NetAliasResolver {
            inputs: io_list.inputs.clone(),
            outputs: io_list.outputs.clone(),
            aliases,
            nets,
            inout_nets,
            index_pattern,
        }
    }

    /// The pre-split name of the port `name`, if `name` is a port.
    pub fn alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(|alias| alias.as_str())
    }

    /// Whether `name` can be constrained, i.e. is a pre-split net name.
    pub fn is_net(&self, name: &str) -> bool {
        self.nets.contains(name)
    }

    pub fn is_input(&self, name: &str) -> bool {
        self.inputs.contains(name)
    }

    pub fn is_output(&self, name: &str) -> bool {
        self.outputs.contains(name)
    }

    /// Whether `name` is an inout net that was split into a pair of ports.
    pub fn is_inout(&self, name: &str) -> bool {
        self.inout_nets.contains(name)
    }

    /// Every constrainable net: the aliases of the inputs followed by those of the outputs.
    pub fn nets(&self) -> impl Iterator<Item = &str> + '_ {
        self.inputs.iter().chain(self.outputs.iter()).filter_map(|name| self.alias(name))
    }

    /// Names of the two ports the inout net `name` was split into. A bus index stays at the end of the name.
    pub fn split_names(&self, name: &str) -> [(SplitDirection, String); 2] {
        let (base, index) = match self.index_pattern.captures(name) {
            Some(captures) => (
                captures.get(1).map_or(name, |base| base.as_str()),
                captures.get(2).map_or("", |index| index.as_str()),
            ),
            None => (name, ""),
        };
        SplitDirection::ALL.map(|direction| (direction, format!("{}{}", split_name(base, direction), index)))
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use padmap_inout::SplitDirection;

    use super::NetAliasResolver;
    use crate::IoList;

    fn resolver(inputs: &[&str], outputs: &[&str]) -> NetAliasResolver {
        NetAliasResolver::new(&IoList {
            inputs: BTreeSet::from_iter(inputs.iter().map(|name| name.to_string())),
            outputs: BTreeSet::from_iter(outputs.iter().map(|name| name.to_string())),
        })
    }

    #[test]
    fn test_identity_alias() {
        let resolver = resolver(&["A"], &["Y"]);
        assert_eq!(resolver.alias("A"), Some("A"));
        assert_eq!(resolver.alias("Y"), Some("Y"));
        assert!(resolver.is_net("A"));
        assert!(!resolver.is_inout("A"));
        assert_eq!(resolver.alias("Q"), None);
    }

    #[test]
    fn test_inout_alias() {
        let resolver = resolver(&["C_$inp", "B_$inp[2]"], &["C_$out", "B_$out[2]"]);
        assert_eq!(resolver.alias("C_$inp"), Some("C"));
        assert_eq!(resolver.alias("C_$out"), Some("C"));
        assert_eq!(resolver.alias("B_$out[2]"), Some("B[2]"));
        assert!(resolver.is_inout("C"));
        assert!(resolver.is_inout("B[2]"));
        assert!(resolver.is_net("C"));
        assert!(!resolver.is_net("C_$inp"));
        assert_eq!(Vec::from_iter(resolver.nets()), vec!["B[2]", "C", "B[2]", "C"]);
    }

    #[test]
    fn test_split_names() {
        let resolver = resolver(&[], &[]);
        assert_eq!(
            resolver.split_names("B[2]"),
            [(SplitDirection::Input, "B_$inp[2]".to_owned()), (SplitDirection::Output, "B_$out[2]".to_owned())]
        );
        assert_eq!(
            resolver.split_names("C"),
            [(SplitDirection::Input, "C_$inp".to_owned()), (SplitDirection::Output, "C_$out".to_owned())]
        );
    }
}
