use padmap_yosys_json::{Bit, CellDetails, Design, Module, NetDetails, PortDetails, PortDirection};

const NETLIST: &str = r#"{
  "creator": "Yosys 0.38",
  "modules": {
    "top": {
      "attributes": {
        "top": "00000000000000000000000000000001",
        "src": "top.v:1.1-12.10"
      },
      "ports": {
        "A": { "direction": "input", "bits": [ 2 ] },
        "B": { "direction": "output", "bits": [ 3 ] },
        "C": { "direction": "inout", "bits": [ 4, "1" ] }
      },
      "cells": {
        "iobuf": {
          "hide_name": 0,
          "type": "IOBUF",
          "parameters": { },
          "attributes": { "keep": 1 },
          "port_directions": { "I": "input", "O": "output", "IO": "inout" },
          "connections": { "I": [ 2 ], "O": [ 3 ], "IO": [ 4 ] }
        }
      },
      "netnames": {
        "A": { "hide_name": 0, "bits": [ 2 ], "attributes": { } },
        "C": { "hide_name": 0, "bits": [ 4, "1" ], "attributes": { } }
      }
    }
  }
}"#;

#[test]
fn test_parse_netlist() {
    let design = padmap_yosys_json::parse(NETLIST).unwrap();
    assert_eq!(design.creator, "Yosys 0.38");
    let top = design.modules.get("top").unwrap();
    assert!(top.is_top());
    assert_eq!(top.ports.get("C").unwrap().direction, PortDirection::Inout);
    assert_eq!(top.ports.get("C").unwrap().bits.0, vec![Bit::Net(4), Bit::One]);
    let cell = top.cells.get("iobuf").unwrap();
    assert_eq!(cell.type_, "IOBUF");
    assert_eq!(cell.connections.get("IO").unwrap().0, vec![Bit::Net(4)]);
    assert_eq!(cell.port_directions.get("IO"), Some(&PortDirection::Inout));
}

#[test]
fn test_write_is_stable() {
    let design = padmap_yosys_json::parse(NETLIST).unwrap();
    let text = padmap_yosys_json::to_string(design.clone());
    let reparsed = padmap_yosys_json::parse(&text).unwrap();
    assert_eq!(reparsed, design);
    assert_eq!(padmap_yosys_json::to_string(reparsed), text);
}

#[test]
fn test_write_sorts_keys() {
    let mut module = Module::new();
    module.attributes.add("top", 1i64);
    module.ports.add("z", PortDetails::new(PortDirection::Input, Bit::Net(2)));
    module.ports.add("a", PortDetails::new(PortDirection::Output, Bit::Net(3)));
    CellDetails::new("BUF").input("I", Bit::Net(2)).output("O", Bit::Net(3)).add_to("buf", &mut module);
    NetDetails::new(Bit::Net(2)).add_to("z", &mut module);
    let mut design = Design::new("padmap");
    design.modules.add("top", module);

    let text = padmap_yosys_json::to_string(design);
    let position = |needle: &str| text.find(needle).unwrap();
    assert!(position("\"creator\"") < position("\"modules\""));
    assert!(position("\"attributes\"") < position("\"cells\""));
    assert!(position("\"cells\"") < position("\"netnames\""));
    assert!(position("\"netnames\"") < position("\"ports\""));
    let ports = &text[position("\"ports\"")..];
    assert!(ports.find("\"a\"").unwrap() < ports.find("\"z\"").unwrap());
    assert!(position("\"connections\"") < position("\"port_directions\""));
    assert!(position("\"port_directions\"") < position("\"type\""));
}

#[test]
fn test_reject_bad_bit() {
    let text = r#"{ "creator": "", "modules": { "m": { "ports": { "a": { "direction": "input", "bits": [ "q" ] } } } } }"#;
    assert!(matches!(padmap_yosys_json::parse(text), Err(padmap_yosys_json::Error::Syntax(_))));
}

#[test]
fn test_reject_bad_json() {
    assert!(matches!(padmap_yosys_json::parse("{"), Err(padmap_yosys_json::Error::Json(_))));
}
