mod yosys;

pub use yosys::{
    Bit, BitVector, CellDetails, Design, Map, MemoryDetails, Metadata, MetadataTypeError, MetadataValue, Module,
    NetDetails, PortDetails, PortDirection, SyntaxError,
};

use std::io::BufWriter;

use jzon::JsonValue;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(jzon::Error),
    Syntax(SyntaxError),
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<jzon::Error> for Error {
    fn from(error: jzon::Error) -> Self {
        Self::Json(error)
    }
}

impl From<SyntaxError> for Error {
    fn from(error: SyntaxError) -> Self {
        Self::Syntax(error)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Io(error) => write!(f, "I/O error: {}", error),
            Error::Json(error) => write!(f, "JSON parse error: {}", error),
            Error::Syntax(error) => write!(f, "{}", error),
        }
    }
}

impl std::error::Error for Error {}

pub use Error as ReadError;

pub fn parse(text: &str) -> Result<Design, Error> {
    let json = jzon::parse(text)?;
    Ok(Design::try_from(json)?)
}

pub fn read(reader: &mut impl std::io::Read) -> Result<Design, Error> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse(&text)
}

// Keys come out sorted: sections are `BTreeMap`s and records list their members alphabetically.
pub fn write(writer: &mut impl std::io::Write, design: Design) -> std::io::Result<()> {
    let json = JsonValue::from(design);
    json.write_pretty(&mut BufWriter::new(writer), /*spaces=*/ 2)
}

pub fn to_string(design: Design) -> String {
    JsonValue::from(design).pretty(2)
}
