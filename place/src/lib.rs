use std::fmt::Display;

pub mod xml;
mod eblif;
mod alias;
mod block;
mod constraint;
mod pcf;
mod place_constraints;

pub use xml::{Document, Element, ElementIndex};
pub use eblif::IoList;
pub use alias::NetAliasResolver;
pub use block::{root_cluster, BlockResolver, INPUT_PAD, OUTPUT_PAD};
pub use constraint::{Constraint, ConstraintBuilder, ConstraintTable};
pub use pcf::{parse_pcf, PcfConstraint, PinMap};
pub use place_constraints::{parse_block_list, PlaceConstraints};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    format: &'static str,
    offset: usize,
    context: String,
}

impl ParseError {
    pub(crate) fn new(format: &'static str, source: &str, offset: usize) -> ParseError {
        let context = source.get(offset..).unwrap_or_default().chars().take(40).collect();
        ParseError { format, offset, context }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to parse {} near offset {}: {:?}", self.format, self.offset, self.context)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug)]
pub enum Error {
    Parse(ParseError),
    UnknownNet(String),
    DuplicateConstraint(String),
    ConflictingConstraint { block: String, existing: Constraint, conflicting: Constraint },
    MalformedHierarchy(String),
    UnknownBlock(String),
    UnknownPad { net: String, pad: String },
}

impl From<ParseError> for Error {
    fn from(error: ParseError) -> Self {
        Self::Parse(error)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Parse(error) => write!(f, "{}", error),
            Error::UnknownNet(net) => write!(f, "net '{}' is not a top-level port", net),
            Error::DuplicateConstraint(name) => write!(f, "'{}' is already constrained", name),
            Error::ConflictingConstraint { block, existing, conflicting } => {
                write!(f, "block '{}' has conflicting constraints: {} and {}", block, existing, conflicting)
            }
            Error::MalformedHierarchy(message) => write!(f, "malformed block hierarchy: {}", message),
            Error::UnknownBlock(block) => write!(f, "block '{}' is not in the packed netlist", block),
            Error::UnknownPad { net, pad } => write!(f, "pad '{}' of net '{}' is not in the pin map", pad, net),
        }
    }
}

impl std::error::Error for Error {}

pub use Error as PlaceError;
