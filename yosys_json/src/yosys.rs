use jzon::{object, JsonValue};
use std::collections::{btree_map, BTreeMap};

#[derive(Debug)]
pub struct SyntaxError(pub JsonValue);

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "syntax error near: {}", self.0)
    }
}

impl std::error::Error for SyntaxError {}

#[derive(Debug)]
pub struct MetadataTypeError;

impl std::fmt::Display for MetadataTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "unexpected metadata type")
    }
}

impl std::error::Error for MetadataTypeError {}

// Missing members read as `Null`; optional sections of the document default to empty.
fn take_optional<T>(value: &mut JsonValue, key: &str) -> Result<T, SyntaxError>
where
    T: TryFrom<JsonValue, Error = SyntaxError> + Default,
{
    if value.has_key(key) {
        T::try_from(value[key].take())
    } else {
        Ok(T::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bit {
    Zero,
    One,
    Undef,
    HiZ,
    Net(usize),
}

impl Bit {
    pub fn as_net(self) -> Option<usize> {
        match self {
            Bit::Net(index) => Some(index),
            _ => None,
        }
    }

    pub fn is_net(self) -> bool {
        matches!(self, Bit::Net(_))
    }
}

impl TryFrom<JsonValue> for Bit {
    type Error = SyntaxError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        match value.as_str() {
            Some("0") => Ok(Self::Zero),
            Some("1") => Ok(Self::One),
            Some("x") => Ok(Self::Undef),
            Some("z") => Ok(Self::HiZ),
            Some(_) => Err(SyntaxError(value)),
            None => match value.as_usize() {
                Some(index) => Ok(Bit::Net(index)),
                None => Err(SyntaxError(value)),
            },
        }
    }
}

impl From<Bit> for JsonValue {
    fn from(value: Bit) -> Self {
        match value {
            Bit::Zero => "0".into(),
            Bit::One => "1".into(),
            Bit::Undef => "x".into(),
            Bit::HiZ => "z".into(),
            Bit::Net(index) => index.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitVector(pub Vec<Bit>);

impl BitVector {
    pub fn iter(&self) -> std::slice::Iter<Bit> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn nets(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().filter_map(|bit| bit.as_net())
    }
}

impl From<Bit> for BitVector {
    fn from(value: Bit) -> Self {
        BitVector(vec![value])
    }
}

impl From<Vec<Bit>> for BitVector {
    fn from(value: Vec<Bit>) -> Self {
        BitVector(value)
    }
}

impl FromIterator<Bit> for BitVector {
    fn from_iter<T: IntoIterator<Item = Bit>>(iter: T) -> Self {
        BitVector(iter.into_iter().collect())
    }
}

impl TryFrom<JsonValue> for BitVector {
    type Error = SyntaxError;

    fn try_from(mut value: JsonValue) -> Result<Self, Self::Error> {
        if value.is_array() {
            let mut bits = vec![];
            for bit_value in value.members_mut() {
                bits.push(Bit::try_from(bit_value.take())?);
            }
            Ok(BitVector(bits))
        } else {
            Err(SyntaxError(value))
        }
    }
}

impl From<BitVector> for JsonValue {
    fn from(value: BitVector) -> JsonValue {
        JsonValue::Array(value.0.iter().copied().map(JsonValue::from).collect::<Vec<_>>())
    }
}

/// Attribute or parameter value.
///
/// Yosys writes integers as bit strings (most significant bit first) and appends a space to string values that
/// would otherwise be mistaken for a bit string; older versions write plain JSON integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    Int(i64),
    Bits(String),
    String(String),
}

impl MetadataValue {
    pub fn as_i64(&self) -> Result<i64, MetadataTypeError> {
        match self {
            Self::Int(value) => Ok(*value),
            Self::Bits(bits) => {
                let mut value = 0i64;
                for char in bits.chars() {
                    let bit = match char {
                        '0' => 0,
                        '1' => 1,
                        _ => return Err(MetadataTypeError),
                    };
                    value = value.checked_mul(2).and_then(|value| value.checked_add(bit)).ok_or(MetadataTypeError)?;
                }
                Ok(value)
            }
            Self::String(_) => Err(MetadataTypeError),
        }
    }

    pub fn as_bool(&self) -> Result<bool, MetadataTypeError> {
        match self.as_i64() {
            Ok(0) => Ok(false),
            Ok(1) => Ok(true),
            _ => Err(MetadataTypeError),
        }
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Int(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Int(value as i64)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_owned())
    }
}

enum MetadataValueClass {
    Bits,
    BitsAndSpaces,
    Other,
}

impl MetadataValueClass {
    fn compute(value: &str) -> MetadataValueClass {
        let mut class = MetadataValueClass::Bits;
        for char in value.chars() {
            match (&class, char) {
                (MetadataValueClass::Bits, '0' | '1' | 'x' | 'z') => (),
                (MetadataValueClass::BitsAndSpaces, ' ') => (),
                (MetadataValueClass::Bits, ' ') => class = MetadataValueClass::BitsAndSpaces,
                _ => class = MetadataValueClass::Other,
            }
        }
        class
    }
}

impl TryFrom<JsonValue> for MetadataValue {
    type Error = SyntaxError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        if let Some(string) = value.as_str() {
            Ok(match MetadataValueClass::compute(string) {
                MetadataValueClass::Bits => MetadataValue::Bits(string.to_owned()),
                MetadataValueClass::BitsAndSpaces => {
                    MetadataValue::String(string.strip_suffix(' ').unwrap_or(string).to_owned())
                }
                MetadataValueClass::Other => MetadataValue::String(string.to_owned()),
            })
        } else if let Some(int) = value.as_i64() {
            Ok(MetadataValue::Int(int))
        } else {
            Err(SyntaxError(value))
        }
    }
}

impl From<MetadataValue> for JsonValue {
    fn from(value: MetadataValue) -> JsonValue {
        match value {
            MetadataValue::Int(value) => value.into(),
            MetadataValue::Bits(value) => value.into(),
            MetadataValue::String(value) => match MetadataValueClass::compute(&value) {
                MetadataValueClass::Bits | MetadataValueClass::BitsAndSpaces => (value + " ").into(),
                MetadataValueClass::Other => value.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata(pub BTreeMap<String, MetadataValue>);

impl Metadata {
    pub fn new() -> Metadata {
        Metadata(BTreeMap::new())
    }

    pub fn iter(&self) -> btree_map::Iter<String, MetadataValue> {
        self.0.iter()
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.0.get(key)
    }

    pub fn add<V: Into<MetadataValue>>(&mut self, key: &str, value: V) {
        self.0.insert(key.to_owned(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<JsonValue> for Metadata {
    type Error = SyntaxError;

    fn try_from(mut value: JsonValue) -> Result<Self, Self::Error> {
        if value.is_object() {
            let mut entries = BTreeMap::new();
            for (name, value) in value.entries_mut() {
                entries.insert(name.to_owned(), value.take().try_into()?);
            }
            Ok(Metadata(entries))
        } else {
            Err(SyntaxError(value))
        }
    }
}

impl From<Metadata> for JsonValue {
    fn from(value: Metadata) -> JsonValue {
        value.0.into()
    }
}

/// Name-keyed section of a module. Iteration is in key order, which is also the order entries are written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map<V>(pub BTreeMap<String, V>);

impl<V> Map<V> {
    pub fn new() -> Map<V> {
        Map(BTreeMap::new())
    }

    pub fn iter(&self) -> btree_map::Iter<String, V> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> btree_map::IterMut<String, V> {
        self.0.iter_mut()
    }

    pub fn keys(&self) -> btree_map::Keys<String, V> {
        self.0.keys()
    }

    pub fn values(&self) -> btree_map::Values<String, V> {
        self.0.values()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.0.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn add(&mut self, key: &str, value: V) {
        self.0.insert(key.to_owned(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.0.remove(key)
    }

    pub fn retain(&mut self, f: impl FnMut(&String, &mut V) -> bool) {
        self.0.retain(f)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> Default for Map<V> {
    fn default() -> Self {
        Map::new()
    }
}

impl<V> From<BTreeMap<String, V>> for Map<V> {
    fn from(value: BTreeMap<String, V>) -> Self {
        Map(value)
    }
}

impl<V: TryFrom<JsonValue, Error = SyntaxError>> TryFrom<JsonValue> for Map<V> {
    type Error = SyntaxError;

    fn try_from(mut value: JsonValue) -> Result<Self, Self::Error> {
        if value.is_object() {
            let mut entries = BTreeMap::new();
            for (name, value) in value.entries_mut() {
                entries.insert(name.to_owned(), value.take().try_into()?);
            }
            Ok(Map(entries))
        } else {
            Err(SyntaxError(value))
        }
    }
}

impl<V: Into<JsonValue>> From<Map<V>> for JsonValue {
    fn from(value: Map<V>) -> JsonValue {
        value.0.into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
    Inout,
}

impl TryFrom<JsonValue> for PortDirection {
    type Error = SyntaxError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        match value.as_str() {
            Some("input") => Ok(PortDirection::Input),
            Some("output") => Ok(PortDirection::Output),
            Some("inout") => Ok(PortDirection::Inout),
            _ => Err(SyntaxError(value)),
        }
    }
}

impl From<PortDirection> for JsonValue {
    fn from(value: PortDirection) -> JsonValue {
        match value {
            PortDirection::Input => "input".into(),
            PortDirection::Output => "output".into(),
            PortDirection::Inout => "inout".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDetails {
    pub direction: PortDirection,
    pub bits: BitVector,
    pub offset: usize,
    pub upto: bool,
    pub signed: bool,
}

impl PortDetails {
    pub fn new<B: Into<BitVector>>(direction: PortDirection, bits: B) -> PortDetails {
        PortDetails { direction, bits: bits.into(), offset: 0, upto: false, signed: false }
    }
}

impl TryFrom<JsonValue> for PortDetails {
    type Error = SyntaxError;

    fn try_from(mut value: JsonValue) -> Result<Self, Self::Error> {
        let direction = PortDirection::try_from(value["direction"].take())?;
        let bits = BitVector::try_from(value["bits"].take())?;
        let offset = value["offset"].as_usize().unwrap_or(0);
        let upto = value["upto"].as_usize().unwrap_or(0) != 0;
        let signed = value["signed"].as_usize().unwrap_or(0) != 0;
        Ok(PortDetails { direction, bits, offset, upto, signed })
    }
}

impl From<PortDetails> for JsonValue {
    fn from(value: PortDetails) -> JsonValue {
        let mut json = object! {
            bits: value.bits,
            direction: value.direction,
        };
        if value.offset != 0 {
            json["offset"] = value.offset.into();
        }
        if value.signed {
            json["signed"] = 1.into();
        }
        if value.upto {
            json["upto"] = 1.into();
        }
        json
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellDetails {
    pub hide_name: bool,
    pub type_: String,
    pub parameters: Metadata,
    pub attributes: Metadata,
    pub port_directions: Map<PortDirection>,
    pub connections: Map<BitVector>,
}

impl CellDetails {
    pub fn new(type_: &str) -> CellDetails {
        CellDetails {
            hide_name: false,
            type_: type_.into(),
            parameters: Metadata::new(),
            attributes: Metadata::new(),
            port_directions: Map::new(),
            connections: Map::new(),
        }
    }

    pub fn port<C: Into<BitVector>>(mut self, name: &str, port_direction: PortDirection, connection: C) -> CellDetails {
        self.port_directions.add(name, port_direction);
        self.connections.add(name, connection.into());
        self
    }

    pub fn input<C: Into<BitVector>>(self, name: &str, connection: C) -> CellDetails {
        self.port(name, PortDirection::Input, connection)
    }

    pub fn output<C: Into<BitVector>>(self, name: &str, connection: C) -> CellDetails {
        self.port(name, PortDirection::Output, connection)
    }

    pub fn inout<C: Into<BitVector>>(self, name: &str, connection: C) -> CellDetails {
        self.port(name, PortDirection::Inout, connection)
    }

    pub fn add_to(mut self, name: &str, module: &mut Module) {
        self.hide_name = name.starts_with('$');
        module.cells.add(name, self)
    }
}

impl TryFrom<JsonValue> for CellDetails {
    type Error = SyntaxError;

    fn try_from(mut value: JsonValue) -> Result<Self, Self::Error> {
        let hide_name = value["hide_name"].as_usize().unwrap_or(0) != 0;
        let type_ = value["type"].as_str().map(|s| s.to_owned()).ok_or(SyntaxError(value["type"].take()))?;
        let parameters = take_optional::<Metadata>(&mut value, "parameters")?;
        let attributes = take_optional::<Metadata>(&mut value, "attributes")?;
        let port_directions = take_optional::<Map<PortDirection>>(&mut value, "port_directions")?;
        let connections = Map::<BitVector>::try_from(value["connections"].take())?;
        Ok(CellDetails { hide_name, type_, parameters, attributes, port_directions, connections })
    }
}

impl From<CellDetails> for JsonValue {
    fn from(value: CellDetails) -> JsonValue {
        let mut json = object! {
            attributes: value.attributes,
            connections: value.connections,
            hide_name: if value.hide_name { 1 } else { 0 },
            parameters: value.parameters,
        };
        // Yosys only writes port directions for cells of a known type.
        if !value.port_directions.is_empty() {
            json["port_directions"] = value.port_directions.into();
        }
        json["type"] = value.type_.into();
        json
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDetails {
    pub hide_name: bool,
    pub attributes: Metadata,
    pub width: usize,
    pub start_offset: usize,
    pub size: usize,
}

impl TryFrom<JsonValue> for MemoryDetails {
    type Error = SyntaxError;

    fn try_from(mut value: JsonValue) -> Result<Self, Self::Error> {
        let hide_name = value["hide_name"].as_usize().unwrap_or(0) != 0;
        let attributes = take_optional::<Metadata>(&mut value, "attributes")?;
        let width = value["width"].as_usize().ok_or(SyntaxError(value["width"].take()))?;
        let start_offset = value["start_offset"].as_usize().ok_or(SyntaxError(value["start_offset"].take()))?;
        let size = value["size"].as_usize().ok_or(SyntaxError(value["size"].take()))?;
        Ok(MemoryDetails { hide_name, attributes, width, start_offset, size })
    }
}

impl From<MemoryDetails> for JsonValue {
    fn from(value: MemoryDetails) -> JsonValue {
        object! {
            attributes: value.attributes,
            hide_name: if value.hide_name { 1 } else { 0 },
            size: value.size,
            start_offset: value.start_offset,
            width: value.width,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetDetails {
    pub hide_name: bool,
    pub attributes: Metadata,
    pub bits: BitVector,
    pub offset: usize,
    pub upto: bool,
    pub signed: bool,
}

impl NetDetails {
    pub fn new<B: Into<BitVector>>(bits: B) -> NetDetails {
        NetDetails {
            hide_name: false,
            attributes: Metadata::new(),
            bits: bits.into(),
            offset: 0,
            upto: false,
            signed: false,
        }
    }

    pub fn attr<V: Into<MetadataValue>>(mut self, name: &str, value: V) -> NetDetails {
        self.attributes.add(name, value);
        self
    }

    pub fn add_to(mut self, name: &str, module: &mut Module) {
        self.hide_name = name.starts_with('$');
        module.netnames.add(name, self)
    }
}

impl TryFrom<JsonValue> for NetDetails {
    type Error = SyntaxError;

    fn try_from(mut value: JsonValue) -> Result<Self, Self::Error> {
        let hide_name = value["hide_name"].as_usize().unwrap_or(0) != 0;
        let attributes = take_optional::<Metadata>(&mut value, "attributes")?;
        let bits = BitVector::try_from(value["bits"].take())?;
        let offset = value["offset"].as_usize().unwrap_or(0);
        let upto = value["upto"].as_usize().unwrap_or(0) != 0;
        let signed = value["signed"].as_usize().unwrap_or(0) != 0;
        Ok(NetDetails { hide_name, attributes, bits, offset, upto, signed })
    }
}

impl From<NetDetails> for JsonValue {
    fn from(value: NetDetails) -> JsonValue {
        let mut json = object! {
            attributes: value.attributes,
            bits: value.bits,
            hide_name: if value.hide_name { 1 } else { 0 },
        };
        if value.offset != 0 {
            json["offset"] = value.offset.into();
        }
        if value.signed {
            json["signed"] = 1.into();
        }
        if value.upto {
            json["upto"] = 1.into();
        }
        json
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    pub attributes: Metadata,
    pub parameter_default_values: Metadata,
    pub ports: Map<PortDetails>,
    pub cells: Map<CellDetails>,
    pub memories: Map<MemoryDetails>,
    pub netnames: Map<NetDetails>,
}

impl Module {
    pub fn new() -> Module {
        Module::default()
    }

    /// Whether the module carries a true `top` attribute.
    pub fn is_top(&self) -> bool {
        match self.attributes.get("top") {
            Some(value) => value.as_bool().unwrap_or(false),
            None => false,
        }
    }
}

impl TryFrom<JsonValue> for Module {
    type Error = SyntaxError;

    fn try_from(mut value: JsonValue) -> Result<Self, Self::Error> {
        let attributes = take_optional::<Metadata>(&mut value, "attributes")?;
        let parameter_default_values = take_optional::<Metadata>(&mut value, "parameter_default_values")?;
        let ports = take_optional::<Map<PortDetails>>(&mut value, "ports")?;
        let cells = take_optional::<Map<CellDetails>>(&mut value, "cells")?;
        let memories = take_optional::<Map<MemoryDetails>>(&mut value, "memories")?;
        let netnames = take_optional::<Map<NetDetails>>(&mut value, "netnames")?;
        Ok(Module { attributes, parameter_default_values, ports, cells, memories, netnames })
    }
}

impl From<Module> for JsonValue {
    fn from(value: Module) -> JsonValue {
        let mut json = object! {
            attributes: value.attributes,
            cells: value.cells,
        };
        if !value.memories.is_empty() {
            json["memories"] = value.memories.into();
        }
        json["netnames"] = value.netnames.into();
        if !value.parameter_default_values.is_empty() {
            json["parameter_default_values"] = value.parameter_default_values.into();
        }
        json["ports"] = value.ports.into();
        json
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    pub creator: String,
    pub modules: Map<Module>,
    // AIG models are carried through untouched.
    pub models: Option<JsonValue>,
}

impl Design {
    pub fn new(creator: &str) -> Design {
        Design { creator: creator.to_owned(), modules: Map::new(), models: None }
    }
}

impl TryFrom<JsonValue> for Design {
    type Error = SyntaxError;

    fn try_from(mut value: JsonValue) -> Result<Self, Self::Error> {
        let creator = value["creator"].as_str().map(|s| s.to_owned()).unwrap_or_default();
        let modules = Map::<Module>::try_from(value["modules"].take())?;
        let models = if value.has_key("models") { Some(value["models"].take()) } else { None };
        Ok(Design { creator, modules, models })
    }
}

impl From<Design> for JsonValue {
    fn from(value: Design) -> JsonValue {
        let mut json = object! {
            creator: value.creator,
        };
        if let Some(models) = value.models {
            json["models"] = models;
        }
        json["modules"] = value.modules.into();
        json
    }
}
