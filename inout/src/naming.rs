/// Direction of one half of a split inout signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SplitDirection {
    Input,
    Output,
}

impl SplitDirection {
    /// Order in which the halves of a split signal are created.
    pub const ALL: [SplitDirection; 2] = [SplitDirection::Input, SplitDirection::Output];

    pub fn suffix(self) -> &'static str {
        match self {
            SplitDirection::Input => "_$inp",
            SplitDirection::Output => "_$out",
        }
    }

    pub fn port_direction(self) -> padmap_yosys_json::PortDirection {
        match self {
            SplitDirection::Input => padmap_yosys_json::PortDirection::Input,
            SplitDirection::Output => padmap_yosys_json::PortDirection::Output,
        }
    }
}

impl std::fmt::Display for SplitDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SplitDirection::Input => write!(f, "input"),
            SplitDirection::Output => write!(f, "output"),
        }
    }
}

/// Name of the `direction` half of the port (or cell port) `name`.
pub fn split_name(name: &str, direction: SplitDirection) -> String {
    format!("{}{}", name, direction.suffix())
}

#[cfg(test)]
mod test {
    use super::{split_name, SplitDirection};

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("C", SplitDirection::Input), "C_$inp");
        assert_eq!(split_name("C", SplitDirection::Output), "C_$out");
        assert_ne!(SplitDirection::Input.suffix(), SplitDirection::Output.suffix());
    }
}
