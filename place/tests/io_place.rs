use padmap_place::{parse_pcf, BlockResolver, ConstraintBuilder, Error, IoList, NetAliasResolver, PinMap};

const EBLIF: &str = r#"
.model top
.inputs clk sel unplaced B_$inp[2] C_$inp
.outputs led done B_$out[2] C_$out
.end
"#;

const PACKED: &str = r#"<?xml version="1.0"?>
<block name="top.net" instance="FPGA_packed_netlist[0]">
    <inputs>clk sel B_$inp[2] C_$inp</inputs>
    <block name="clk" instance="io[0]" mode="io">
        <block name="clk" instance="io_pb[0]" mode="inpad">
            <block name="clk" instance="inpad[0]"/>
        </block>
    </block>
    <block name="out:led" instance="io[1]" mode="io">
        <block name="out:led" instance="io_pb[0]" mode="outpad">
            <block name="out:led" instance="outpad[0]"/>
        </block>
    </block>
    <block name="B_$inp[2]" instance="io[2]" mode="io">
        <block name="B_$inp[2]" instance="io_pb[0]" mode="inout">
            <block name="B_$inp[2]" instance="inpad[0]"/>
            <block name="out:B_$out[2]" instance="outpad[0]"/>
        </block>
    </block>
    <block name="C_$inp" instance="io[3]" mode="io">
        <block name="C_$inp" instance="io_pb[0]" mode="inpad">
            <block name="C_$inp" instance="inpad[0]"/>
        </block>
    </block>
    <block name="out:C_$out" instance="io[4]" mode="io">
        <block name="out:C_$out" instance="io_pb[0]" mode="outpad">
            <block name="out:C_$out" instance="outpad[0]"/>
        </block>
    </block>
    <block name="shared" instance="io[5]" mode="io">
        <block name="shared" instance="io_pb[0]" mode="inout">
            <block name="sel" instance="inpad[0]"/>
            <block name="out:done" instance="outpad[0]"/>
        </block>
    </block>
</block>
"#;

fn builder() -> ConstraintBuilder {
    let aliases = NetAliasResolver::new(&IoList::parse(EBLIF).unwrap());
    ConstraintBuilder::new(aliases).with_blocks(BlockResolver::parse(PACKED).unwrap())
}

#[test]
fn test_io_place_table() {
    let mut builder = builder();
    let pin_map = PinMap::parse("name,x,y,z\n35,1,2,0\n12,3,0,1\n20,5,0,0\n").unwrap();
    let pcf = parse_pcf("set_io clk 35\nset_io led 12 # user led\nset_io B[2] 20\n").unwrap();
    builder.constrain_pcf(&pcf, &pin_map).unwrap();
    assert_eq!(builder.constraints().len(), 4);
    assert_eq!(
        builder.emit().unwrap().to_string(),
        concat!(
            "#Block Name    x   y   z    pcf_line\n",
            "#------------- --  --  -    ----\n",
            "clk             1   2  0  # set_io clk 35\n",
            "out:led         3   0  1  # set_io led 12\n",
            "B_$inp[2]       5   0  0  # set_io B[2] 20\n",
        )
    );
}

#[test]
fn test_inout_pair_in_separate_blocks() {
    let mut builder = builder();
    builder.constrain("C", (7, 1, 0), "").unwrap();
    let table = builder.emit().unwrap();
    assert_eq!(Vec::from_iter(table.rows().map(|(block, constraint)| (block, constraint.location()))), vec![
        ("C_$inp", (7, 1, 0)),
        ("out:C_$out", (7, 1, 0))
    ]);
}

#[test]
fn test_conflicting_constraints() {
    let mut builder = builder();
    builder.constrain("sel", (1, 2, 0), "").unwrap();
    builder.constrain("done", (1, 2, 1), "").unwrap();
    match builder.emit() {
        Err(Error::ConflictingConstraint { block, existing, conflicting }) => {
            assert_eq!(block, "shared");
            assert_eq!(existing.name, "sel");
            assert_eq!(existing.location(), (1, 2, 0));
            assert_eq!(conflicting.name, "out:done");
            assert_eq!(conflicting.location(), (1, 2, 1));
        }
        result => panic!("unexpected {:?}", result),
    }
}

#[test]
fn test_same_block_same_location() {
    let mut builder = builder();
    builder.constrain("sel", (1, 2, 0), "first").unwrap();
    builder.constrain("done", (1, 2, 0), "second").unwrap();
    let table = builder.emit().unwrap();
    assert_eq!(table.len(), 1);
    let (block, constraint) = table.rows().next().unwrap();
    assert_eq!(block, "shared");
    assert_eq!(constraint.comment, "first");
}

#[test]
fn test_unknown_net() {
    let mut builder = builder();
    assert!(matches!(builder.constrain("nope", (0, 0, 0), ""), Err(Error::UnknownNet(net)) if net == "nope"));
    assert!(matches!(builder.constrain("B_$inp[2]", (0, 0, 0), ""), Err(Error::UnknownNet(_))));
}

#[test]
fn test_duplicate_constraint() {
    let mut builder = builder();
    builder.constrain("clk", (1, 2, 0), "").unwrap();
    assert!(matches!(builder.constrain("clk", (1, 2, 0), ""), Err(Error::DuplicateConstraint(net)) if net == "clk"));
}

#[test]
fn test_net_without_block() {
    let mut builder = builder();
    builder.constrain("unplaced", (9, 9, 0), "").unwrap();
    builder.constrain("clk", (1, 2, 0), "").unwrap();
    let table = builder.emit().unwrap();
    assert_eq!(Vec::from_iter(table.rows().map(|(block, _)| block)), vec!["clk"]);
}

#[test]
fn test_without_blocks() {
    let mut builder = ConstraintBuilder::new(NetAliasResolver::new(&IoList::parse(EBLIF).unwrap()));
    builder.constrain("led", (3, 0, 1), "").unwrap();
    builder.constrain("B[2]", (5, 0, 0), "").unwrap();
    let table = builder.emit().unwrap();
    assert_eq!(Vec::from_iter(table.rows().map(|(block, _)| block)), vec!["out:led", "B_$inp[2]", "out:B_$out[2]"]);
}

#[test]
fn test_unknown_pad() {
    let mut builder = builder();
    let pin_map = PinMap::parse("name,x,y,z\n35,1,2,0\n").unwrap();
    let pcf = parse_pcf("set_io clk 36\n").unwrap();
    assert!(matches!(
        builder.constrain_pcf(&pcf, &pin_map),
        Err(Error::UnknownPad { net, pad }) if net == "clk" && pad == "36"
    ));
}

#[test]
fn test_nets() {
    let builder = builder();
    let nets = Vec::from_iter(builder.nets());
    for net in ["clk", "sel", "unplaced", "B[2]", "C", "led", "done"] {
        assert!(nets.contains(&net), "missing {}", net);
    }
}
