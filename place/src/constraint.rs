use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use crate::{BlockResolver, Error, NetAliasResolver};

/// Fixed location of one placer-visible block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub comment: String,
}

impl Constraint {
    pub fn new(name: impl Into<String>, (x, y, z): (i32, i32, i32), comment: impl Into<String>) -> Constraint {
        Constraint { name: name.into(), x, y, z, comment: comment.into() }
    }

    pub fn location(&self) -> (i32, i32, i32) {
        (self.x, self.y, self.z)
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' at ({}, {}, {})", self.name, self.x, self.y, self.z)?;
        if !self.comment.is_empty() {
            write!(f, " ({})", self.comment)?;
        }
        Ok(())
    }
}

/// Resolved constraints, ready to be written out as a placement file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintTable {
    width: usize,
    rows: Vec<(String, Constraint)>,
}

impl ConstraintTable {
    /// Resolves `constraints` to block names in order.
    ///
    /// A constraint whose block is unknown (`resolve` returns `None`) is dropped. The first constraint for
    /// a block wins; a later one at the same location is dropped and one at a different location is an error.
    pub fn resolve<'a>(
        constraints: impl IntoIterator<Item = &'a Constraint>,
        resolve: impl Fn(&str) -> Option<String>,
    ) -> Result<ConstraintTable, Error> {
        let mut width = 0;
        let mut constrained: BTreeMap<String, &Constraint> = BTreeMap::new();
        let mut rows = vec![];
        for constraint in constraints {
            width = width.max(constraint.name.len());
            let Some(block) = resolve(&constraint.name) else {
                log::debug!("omitting {}: no block", constraint);
                continue;
            };
            if let Some(existing) = constrained.get(&block) {
                if existing.location() != constraint.location() {
                    return Err(Error::ConflictingConstraint {
                        block,
                        existing: (*existing).clone(),
                        conflicting: constraint.clone(),
                    });
                }
                continue;
            }
            constrained.insert(block.clone(), constraint);
            rows.push((block, constraint.clone()));
        }
        Ok(ConstraintTable { width, rows })
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &Constraint)> {
        self.rows.iter().map(|(block, constraint)| (block.as_str(), constraint))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// Right-aligned, with a space where a minus sign would go.
fn space_signed(value: i32, width: usize) -> String {
    let text = if value < 0 { value.to_string() } else { format!(" {}", value) };
    format!("{:>width$}", text)
}

impl Display for ConstraintTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self.width;
        writeln!(f, "#{:<width$} x   y   z    pcf_line", "Block Name")?;
        writeln!(f, "#{:-^width$} --  --  -    ----", "")?;
        for (block, constraint) in &self.rows {
            writeln!(
                f,
                "{:<width$} {} {} {}  # {}",
                block,
                space_signed(constraint.x, 3),
                space_signed(constraint.y, 3),
                space_signed(constraint.z, 2),
                constraint.comment
            )?;
        }
        Ok(())
    }
}

// The placer names the pad of an output net `out:<net>`.
const OUTPUT_PREFIX: &str = "out:";

/// Collects IO pad locations by net name and resolves them to placer block names.
#[derive(Debug, Clone)]
pub struct ConstraintBuilder {
    aliases: NetAliasResolver,
    blocks: Option<BlockResolver>,
    constraints: Vec<Constraint>,
    names: BTreeSet<String>,
}

impl ConstraintBuilder {
    pub fn new(aliases: NetAliasResolver) -> ConstraintBuilder {
        ConstraintBuilder { aliases, blocks: None, constraints: vec![], names: BTreeSet::new() }
    }

    /// Without a block resolver, constraints are emitted under their net names.
    pub fn with_blocks(mut self, blocks: BlockResolver) -> ConstraintBuilder {
        self.blocks = Some(blocks);
        self
    }

    pub fn nets(&self) -> impl Iterator<Item = &str> + '_ {
        self.aliases.nets()
    }

    /// Fixes the pad of `net` at `location`. An inout net fixes both of its halves.
    pub fn constrain(&mut self, net: &str, location: (i32, i32, i32), comment: &str) -> Result<(), Error> {
        if !self.aliases.is_net(net) {
            return Err(Error::UnknownNet(net.to_owned()));
        }

        let names = if self.aliases.is_output(net) {
            vec![format!("{}{}", OUTPUT_PREFIX, net)]
        } else if self.aliases.is_inout(net) {
            let [(_, input), (_, output)] = self.aliases.split_names(net);
            vec![input, format!("{}{}", OUTPUT_PREFIX, output)]
        } else {
            vec![net.to_owned()]
        };
        if self.names.contains(net) || names.iter().any(|name| self.names.contains(name)) {
            return Err(Error::DuplicateConstraint(net.to_owned()));
        }

        self.names.insert(net.to_owned());
        for name in names {
            log::debug!("constraining '{}' as '{}' at {:?}", net, name, location);
            self.names.insert(name.clone());
            self.constraints.push(Constraint::new(name, location, comment));
        }
        Ok(())
    }

    /// Constraints in the order they were added, under their placer net names.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn emit(&self) -> Result<ConstraintTable, Error> {
        ConstraintTable::resolve(&self.constraints, |name| match &self.blocks {
            Some(blocks) => blocks.block(name).map(|block| block.to_owned()),
            None => Some(name.to_owned()),
        })
    }
}
