use std::collections::BTreeMap;

use crate::{ConstraintBuilder, Error, ParseError};

/// One `set_io` command of a physical constraints file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcfConstraint {
    pub net: String,
    pub pad: String,
    /// The command as written, without its comment.
    pub line: String,
    pub line_number: usize,
}

fn lines_with_offsets(source: &str) -> impl Iterator<Item = (usize, usize, &str)> {
    let mut offset = 0;
    source.split('\n').enumerate().map(move |(index, line)| {
        let line_offset = offset;
        offset += line.len() + 1;
        (index + 1, line_offset, line)
    })
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(index) => line[..index].trim(),
        None => line.trim(),
    }
}

/// Reads the `set_io [-option [value]]... <net> <pad>` commands of a PCF file. Other commands are skipped.
pub fn parse_pcf(source: &str) -> Result<Vec<PcfConstraint>, ParseError> {
    let mut constraints = vec![];
    for (line_number, offset, line) in lines_with_offsets(source) {
        let command = strip_comment(line);
        let mut words = command.split_whitespace();
        match words.next() {
            None => continue,
            Some("set_io") => {
                let args = Vec::from_iter(words.filter(|word| !word.starts_with('-')));
                // Option values are not marked; the net and pad are always the last two words.
                let [.., net, pad] = args[..] else {
                    return Err(ParseError::new("PCF", source, offset));
                };
                constraints.push(PcfConstraint {
                    net: net.to_owned(),
                    pad: pad.to_owned(),
                    line: command.to_owned(),
                    line_number,
                });
            }
            Some(other) => log::warn!("line {}: ignoring PCF command '{}'", line_number, other),
        }
    }
    Ok(constraints)
}

/// Pad name to (x, y, z) location, read from a CSV file with a `name,x,y,z` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinMap {
    pads: BTreeMap<String, (i32, i32, i32)>,
}

impl PinMap {
    pub fn parse(source: &str) -> Result<PinMap, ParseError> {
        let error = |position: Option<&csv::Position>| {
            ParseError::new("pin map", source, position.map_or(0, |position| position.byte() as usize))
        };
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .flexible(true)
            .from_reader(source.as_bytes());

        let headers = reader.headers().map_err(|e| error(e.position()))?.clone();
        let find = |column: &str| headers.iter().position(|header| header == column);
        let (Some(name), Some(x), Some(y), Some(z)) = (find("name"), find("x"), find("y"), find("z")) else {
            return Err(error(headers.position()));
        };

        let mut pads = BTreeMap::new();
        for record in reader.records() {
            let record = record.map_err(|e| error(e.position()))?;
            let field = |index: usize| record.get(index).ok_or_else(|| error(record.position()));
            let number = |index: usize| field(index)?.parse::<i32>().map_err(|_| error(record.position()));
            pads.insert(field(name)?.to_owned(), (number(x)?, number(y)?, number(z)?));
        }
        Ok(PinMap { pads })
    }

    pub fn location(&self, pad: &str) -> Option<(i32, i32, i32)> {
        self.pads.get(pad).copied()
    }

    pub fn len(&self) -> usize {
        self.pads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pads.is_empty()
    }
}

impl ConstraintBuilder {
    /// Constrains every `set_io` net to the location of its pad, with the command as the comment.
    pub fn constrain_pcf(&mut self, constraints: &[PcfConstraint], pin_map: &PinMap) -> Result<(), Error> {
        for constraint in constraints {
            let Some(location) = pin_map.location(&constraint.pad) else {
                return Err(Error::UnknownPad { net: constraint.net.clone(), pad: constraint.pad.clone() });
            };
            self.constrain(&constraint.net, location, &constraint.line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{parse_pcf, PinMap};

    #[test]
    fn test_parse_pcf() {
        let constraints = parse_pcf(concat!(
            "# board pins\n",
            "set_io clk 35\n",
            "set_io -nowarning -pullup yes btn[0] 10 # button\n",
            "set_frequency clk 12\n",
            "\n",
        ))
        .unwrap();
        assert_eq!(constraints.len(), 2);
        assert_eq!(constraints[0].net, "clk");
        assert_eq!(constraints[0].pad, "35");
        assert_eq!(constraints[0].line, "set_io clk 35");
        assert_eq!(constraints[0].line_number, 2);
        assert_eq!(constraints[1].net, "btn[0]");
        assert_eq!(constraints[1].pad, "10");
        assert_eq!(constraints[1].line, "set_io -nowarning -pullup yes btn[0] 10");
    }

    #[test]
    fn test_parse_pcf_missing_pad() {
        assert!(parse_pcf("set_io clk\n").is_err());
    }

    #[test]
    fn test_parse_pin_map() {
        let pin_map = PinMap::parse("name,x,y,z,type\n35,1,2,0,GPIO\n10, 3 ,0,1,GPIO\n").unwrap();
        assert_eq!(pin_map.len(), 2);
        assert_eq!(pin_map.location("35"), Some((1, 2, 0)));
        assert_eq!(pin_map.location("10"), Some((3, 0, 1)));
        assert_eq!(pin_map.location("11"), None);
    }

    #[test]
    fn test_parse_pin_map_errors() {
        assert!(PinMap::parse("pin,x,y\n").is_err());
        assert!(PinMap::parse("name,x,y,z\nA,1,two,0\n").is_err());
        assert!(PinMap::parse("name,x,y,z\nA,1\n").is_err());
        assert_eq!(PinMap::parse("name,x,y,z\nA,1,2,0\nB,1,q,0\n").unwrap_err().offset(), 19);
    }

    #[test]
    fn test_parse_pin_map_quoted() {
        let pin_map = PinMap::parse(concat!(
            "\"name\",\"x\",\"y\",\"z\",\"description\"\n",
            "# bank 0\n",
            "\"35\",1,2,0,\"GPIO, bank 0\"\n",
            "\n",
            "\"IOB_1a\", 4 , 0 , 1,\"\"\n",
        ))
        .unwrap();
        assert_eq!(pin_map.len(), 2);
        assert_eq!(pin_map.location("35"), Some((1, 2, 0)));
        assert_eq!(pin_map.location("IOB_1a"), Some((4, 0, 1)));
    }
}
