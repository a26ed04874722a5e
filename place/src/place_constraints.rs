use std::collections::BTreeMap;

use crate::block::{cluster_subtrees, root_cluster};
use crate::constraint::{Constraint, ConstraintTable};
use crate::xml::Document;
use crate::{Error, ParseError};

/// Placement constraints for arbitrary blocks of a packed netlist, keyed by the top-level cluster containing them.
#[derive(Debug, Clone, Default)]
pub struct PlaceConstraints {
    block_to_cluster: BTreeMap<String, String>,
    cluster_to_loc: BTreeMap<String, String>,
    constraints: Vec<Constraint>,
}

impl PlaceConstraints {
    pub fn new() -> PlaceConstraints {
        PlaceConstraints::default()
    }

    /// Records the top-level cluster of every named block, and the `LOC` attribute of every cluster that has one.
    pub fn load_hierarchy(&mut self, document: &Document) -> Result<(), Error> {
        for index in document.iter() {
            let element = &document[index];
            if element.name != "block" {
                continue;
            }
            let Some(cluster) = root_cluster(document, index) else { continue };
            let (Some(name), Some(cluster_name)) = (element.attr("name"), document[cluster].attr("name")) else {
                continue;
            };
            self.block_to_cluster.insert(name.to_owned(), cluster_name.to_owned());
        }

        for index in cluster_subtrees(document) {
            let element = &document[index];
            if element.name != "attribute" || element.attr("name") != Some("LOC") {
                continue;
            }
            let cluster_name = root_cluster(document, index).and_then(|cluster| document[cluster].attr("name"));
            let Some(cluster_name) = cluster_name else {
                return Err(Error::MalformedHierarchy("LOC attribute outside of a named top-level block".into()));
            };
            log::debug!("block '{}' is at site '{}'", cluster_name, element.text());
            self.cluster_to_loc.insert(cluster_name.to_owned(), element.text().to_owned());
        }
        Ok(())
    }

    pub fn parse(source: &str) -> Result<PlaceConstraints, Error> {
        let mut place_constraints = PlaceConstraints::new();
        place_constraints.load_hierarchy(&Document::parse(source)?)?;
        Ok(place_constraints)
    }

    /// The top-level cluster containing `block`.
    pub fn cluster(&self, block: &str) -> Option<&str> {
        self.block_to_cluster.get(block).map(|cluster| cluster.as_str())
    }

    pub fn constrain_block(&mut self, block: &str, location: (i32, i32, i32), comment: &str) -> Result<(), Error> {
        if self.constraints.iter().any(|constraint| constraint.name == block) {
            return Err(Error::DuplicateConstraint(block.to_owned()));
        }
        if !self.block_to_cluster.contains_key(block) {
            return Err(Error::UnknownBlock(block.to_owned()));
        }
        self.constraints.push(Constraint::new(block, location, comment));
        Ok(())
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// `(cluster, site)` pairs for every cluster with a `LOC` attribute.
    pub fn loc_sites(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cluster_to_loc.iter().map(|(cluster, site)| (cluster.as_str(), site.as_str()))
    }

    /// Resolves the constraints to their clusters, in the same table layout as pad constraints (header included).
    /// Returns `None` if nothing was constrained.
    pub fn emit(&self) -> Result<Option<ConstraintTable>, Error> {
        if self.constraints.is_empty() {
            return Ok(None);
        }
        let table = ConstraintTable::resolve(&self.constraints, |block| self.cluster(block).map(str::to_owned))?;
        Ok(Some(table))
    }
}

/// Reads a block location list: one `<block> <x> <y> <z> [# comment]` per line.
pub fn parse_block_list(source: &str) -> Result<Vec<Constraint>, ParseError> {
    let mut constraints = vec![];
    let mut offset = 0;
    for line in source.split('\n') {
        let line_offset = offset;
        offset += line.len() + 1;
        let (fields, comment) = match line.split_once('#') {
            Some((fields, comment)) => (fields, comment.trim()),
            None => (line, ""),
        };
        let words = Vec::from_iter(fields.split_whitespace());
        let [name, x, y, z] = words[..] else {
            if words.is_empty() {
                continue;
            }
            return Err(ParseError::new("block list", source, line_offset));
        };
        let number = |word: &str| word.parse::<i32>().map_err(|_| ParseError::new("block list", source, line_offset));
        constraints.push(Constraint::new(name, (number(x)?, number(y)?, number(z)?), comment));
    }
    Ok(constraints)
}

#[cfg(test)]
mod test {
    use super::{parse_block_list, PlaceConstraints};
    use crate::Error;

    const PACKED: &str = r#"
        <block name="top.net" instance="FPGA_packed_netlist[0]">
            <block name="cnt[0]" instance="clb[0]" mode="default">
                <block name="cnt[0]" instance="ble[0]">
                    <block name="lut_cnt[0]" instance="lut[0]"/>
                    <block name="ff_cnt[0]" instance="ff[0]">
                        <attributes>
                            <attribute name="LOC">SLICE_X2Y3</attribute>
                        </attributes>
                    </block>
                </block>
            </block>
            <block name="cnt[1]" instance="clb[1]" mode="default">
                <block name="lut_cnt[1]" instance="lut[0]"/>
            </block>
        </block>
    "#;

    #[test]
    fn test_load_hierarchy() {
        let place_constraints = PlaceConstraints::parse(PACKED).unwrap();
        assert_eq!(place_constraints.cluster("ff_cnt[0]"), Some("cnt[0]"));
        assert_eq!(place_constraints.cluster("lut_cnt[1]"), Some("cnt[1]"));
        assert_eq!(place_constraints.cluster("cnt[1]"), Some("cnt[1]"));
        assert_eq!(place_constraints.cluster("top.net"), None);
        assert_eq!(Vec::from_iter(place_constraints.loc_sites()), vec![("cnt[0]", "SLICE_X2Y3")]);
    }

    #[test]
    fn test_constrain_block() {
        let mut place_constraints = PlaceConstraints::parse(PACKED).unwrap();
        place_constraints.constrain_block("lut_cnt[0]", (2, 3, 0), "").unwrap();
        place_constraints.constrain_block("ff_cnt[0]", (2, 3, 0), "").unwrap();
        place_constraints.constrain_block("lut_cnt[1]", (4, 3, 0), "fixed").unwrap();
        assert!(matches!(
            place_constraints.constrain_block("lut_cnt[1]", (4, 3, 0), ""),
            Err(Error::DuplicateConstraint(_))
        ));
        assert!(matches!(place_constraints.constrain_block("nope", (0, 0, 0), ""), Err(Error::UnknownBlock(_))));

        let table = place_constraints.emit().unwrap().unwrap();
        assert_eq!(Vec::from_iter(table.rows().map(|(block, constraint)| (block, constraint.location()))), vec![
            ("cnt[0]", (2, 3, 0)),
            ("cnt[1]", (4, 3, 0))
        ]);
        assert_eq!(
            table.to_string(),
            concat!(
                "#Block Name x   y   z    pcf_line\n",
                "#---------- --  --  -    ----\n",
                "cnt[0]       2   3  0  # \n",
                "cnt[1]       4   3  0  # fixed\n",
            )
        );
    }

    #[test]
    fn test_conflicting_blocks() {
        let mut place_constraints = PlaceConstraints::parse(PACKED).unwrap();
        place_constraints.constrain_block("lut_cnt[0]", (2, 3, 0), "").unwrap();
        place_constraints.constrain_block("ff_cnt[0]", (2, 3, 1), "").unwrap();
        match place_constraints.emit() {
            Err(Error::ConflictingConstraint { block, existing, conflicting }) => {
                assert_eq!(block, "cnt[0]");
                assert_eq!(existing.name, "lut_cnt[0]");
                assert_eq!(conflicting.name, "ff_cnt[0]");
            }
            result => panic!("unexpected {:?}", result),
        }
    }

    #[test]
    fn test_emit_nothing() {
        let place_constraints = PlaceConstraints::parse(PACKED).unwrap();
        assert!(place_constraints.emit().unwrap().is_none());
    }

    #[test]
    fn test_parse_block_list() {
        let constraints = parse_block_list("lut_cnt[0] 2 3 0 # pinned\n\n# none\nff_cnt[0] 2 -3 1\n").unwrap();
        assert_eq!(constraints.len(), 2);
        assert_eq!(constraints[0].name, "lut_cnt[0]");
        assert_eq!(constraints[0].comment, "pinned");
        assert_eq!(constraints[1].location(), (2, -3, 1));
        assert!(parse_block_list("a 1 2\n").is_err());
        assert!(parse_block_list("a 1 2 z\n").is_err());
    }
}
