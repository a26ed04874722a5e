use std::{error::Error, fs::File, io::Write, path::Path};

use argparse::{ArgumentParser, List, Store, StoreOption, StoreTrue};

use padmap_place::{
    parse_block_list, parse_pcf, BlockResolver, ConstraintBuilder, IoList, NetAliasResolver, PinMap, PlaceConstraints,
};

fn parse_subcommand(parser: &ArgumentParser, command: &str, mut args: Vec<String>) {
    args.insert(0, format!("padmap {}", command));
    if let Err(code) = parser.parse(args, &mut std::io::stdout(), &mut std::io::stderr()) {
        std::process::exit(code);
    }
}

fn read_to_string(name: &str) -> Result<String, Box<dyn Error>> {
    std::fs::read_to_string(name).map_err(|error| format!("cannot read {name:?}: {error}").into())
}

fn write_output(name: Option<String>, text: &str) -> Result<(), Box<dyn Error>> {
    match name {
        Some(name) => File::create(name)?.write_all(text.as_bytes())?,
        None => std::io::stdout().write_all(text.as_bytes())?,
    }
    Ok(())
}

fn split_inouts(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let mut input = String::new();
    let mut output = None::<String>;
    {
        let mut parser = ArgumentParser::new();
        parser.set_description("Replace the inout ports of the top module by input/output port pairs");
        parser.refer(&mut input).add_option(&["-i"], Store, "Input Yosys JSON").required();
        parser.refer(&mut output).add_option(&["-o"], StoreOption, "Output Yosys JSON");
        parse_subcommand(&parser, "split-inouts", args);
    }
    let output = output.unwrap_or_else(|| {
        let stem = Path::new(&input).with_extension("");
        format!("{}_out.json", stem.display())
    });

    let mut design = padmap_yosys_json::read(&mut File::open(&input)?)?;
    let result = padmap_inout::desugar(&mut design)?;
    for (old_name, new_name) in &result.port_map {
        log::info!("port '{}' is now '{}'", old_name, new_name);
    }
    write_output(Some(output), &padmap_yosys_json::to_string(design))
}

fn io_place(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let mut eblif = String::new();
    let mut net = None::<String>;
    let mut pcf = None::<String>;
    let mut map = None::<String>;
    let mut output = None::<String>;
    {
        let mut parser = ArgumentParser::new();
        parser.set_description("Convert IO pad locations to VPR placement constraints");
        parser.refer(&mut eblif).add_option(&["--eblif"], Store, "Top-level ports from this BLIF netlist").required();
        parser.refer(&mut net).add_option(&["--net"], StoreOption, "Packed netlist to resolve block names from");
        parser.refer(&mut pcf).add_option(&["--pcf"], StoreOption, "Pad assignments (set_io)");
        parser.refer(&mut map).add_option(&["--map"], StoreOption, "Pad locations (CSV: name,x,y,z)");
        parser.refer(&mut output).add_option(&["--output"], StoreOption, "Output placement constraints");
        parse_subcommand(&parser, "io-place", args);
    }

    let io_list = IoList::parse(&read_to_string(&eblif)?)?;
    let mut builder = ConstraintBuilder::new(NetAliasResolver::new(&io_list));
    if let Some(net) = net {
        let blocks = BlockResolver::parse(&read_to_string(&net)?)?;
        log::info!("found {} pads in {:?}", blocks.len(), net);
        builder = builder.with_blocks(blocks);
    }
    match (pcf, map) {
        (Some(pcf), Some(map)) => {
            let pin_map = PinMap::parse(&read_to_string(&map)?)?;
            builder.constrain_pcf(&parse_pcf(&read_to_string(&pcf)?)?, &pin_map)?;
        }
        (None, None) => (),
        _ => return Err("--pcf and --map must be given together".into()),
    }
    write_output(output, &builder.emit()?.to_string())
}

fn place_constraints(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let mut net = String::new();
    let mut blocks = String::new();
    let mut output = None::<String>;
    {
        let mut parser = ArgumentParser::new();
        parser.set_description("Convert block locations to VPR placement constraints");
        parser.refer(&mut net).add_option(&["--net"], Store, "Packed netlist").required();
        parser.refer(&mut blocks).add_option(&["--blocks"], Store, "Block locations (<block> <x> <y> <z>)").required();
        parser.refer(&mut output).add_option(&["--output"], StoreOption, "Output placement constraints");
        parse_subcommand(&parser, "place-constraints", args);
    }

    let mut place_constraints = PlaceConstraints::parse(&read_to_string(&net)?)?;
    for (cluster, site) in place_constraints.loc_sites() {
        log::info!("block '{}' is at site '{}'", cluster, site);
    }
    for constraint in parse_block_list(&read_to_string(&blocks)?)? {
        place_constraints.constrain_block(&constraint.name, constraint.location(), &constraint.comment)?;
    }
    let text = match place_constraints.emit()? {
        Some(table) => table.to_string(),
        None => String::new(),
    };
    write_output(output, &text)
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut version = false;
    let mut command = String::new();
    let mut args = Vec::<String>::new();
    {
        let mut parser = ArgumentParser::new();
        parser.set_description("Prepare netlists with inout ports for VPR, and fix their IO pad placement");
        parser.refer(&mut version).add_option(&["--version"], StoreTrue, "Display version");
        parser.refer(&mut command).add_argument("COMMAND", Store, "split-inouts, io-place or place-constraints");
        parser.refer(&mut args).add_argument("ARGS", List, "Arguments of the command");
        parser.stop_on_first_argument(true);
        parser.parse_args_or_exit();
    }

    if version {
        println!("padmap {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    match command.as_str() {
        "split-inouts" => split_inouts(args),
        "io-place" => io_place(args),
        "place-constraints" => place_constraints(args),
        "" => Err("no command provided".into()),
        _ => Err(format!("unknown command {command:?}").into()),
    }
}

fn main() {
    env_logger::init();
    if let Err(error) = run() {
        eprintln!("error: {}", error);
        std::process::exit(1)
    }
}
