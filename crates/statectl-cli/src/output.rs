use std::io::{self, Write};

use colored::{ColoredString, Colorize};
use statectl_diff::{DiffBlock, DiffSink};

/// Text sink for terminals: same layout as the plain text sink, with the
/// header and each diff line coloured.
pub struct ColorSink<W> {
    out: W,
}

impl<W: Write> ColorSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

fn paint(line: &str) -> ColoredString {
    if line.starts_with("---") || line.starts_with("+++") {
        line.bold()
    } else if line.starts_with("@@") {
        line.cyan()
    } else if line.starts_with('-') {
        line.red()
    } else if line.starts_with('+') {
        line.green()
    } else {
        line.normal()
    }
}

impl<W: Write> DiffSink for ColorSink<W> {
    fn emit(&mut self, block: &DiffBlock) -> io::Result<()> {
        writeln!(self.out, "{}", block.header().bold())?;
        for line in block.body().lines() {
            writeln!(self.out, "{}", paint(line))?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statectl_diff::{Side, TextSink};
    use statectl_types::{Cluster, PlacementKey, Ref};

    #[test]
    fn uncoloured_output_matches_text_sink() {
        colored::control::set_override(false);

        let block = DiffBlock::compute(
            PlacementKey {
                service: "svc-A".into(),
                cluster: Cluster::new("prod", "production"),
            },
            Some((Side::new(Ref::new("v1"), "deploy.yaml"), "a\nkeep\n")),
            Some((Side::new(Ref::new("v2"), "deploy.yaml"), "b\nkeep\n")),
        );

        let mut color = ColorSink::new(Vec::new());
        color.emit(&block).unwrap();
        let mut plain = TextSink::new(Vec::new());
        plain.emit(&block).unwrap();

        assert_eq!(color.into_inner(), plain.into_inner());
        colored::control::unset_override();
    }
}
