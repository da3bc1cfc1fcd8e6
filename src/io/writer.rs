//! Edge-list writers.
//!
//! Two text layouts:
//!
//! ```text
//! ncol (0-based)        pajek (1-based)
//! 0 1 0.5               *Vertices 4
//! 2 3 0.5               1 "0"
//!                       2 "1"
//!                       3 "2"
//!                       4 "3"
//!                       *Edges
//!                       1 2 0.5
//!                       3 4 0.5
//! ```
//!
//! ncol lists edges only, so isolated vertices do not appear in it. Pajek
//! declares every vertex up front.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::{MknnError, Result};

/// Output layout of a graph file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphFormat {
    #[default]
    Ncol,
    Pajek,
}

impl GraphFormat {
    /// File extension, without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            GraphFormat::Ncol => "ncol",
            GraphFormat::Pajek => "pajek",
        }
    }
}

impl fmt::Display for GraphFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for GraphFormat {
    type Err = MknnError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ncol" => Ok(GraphFormat::Ncol),
            "pajek" | "net" => Ok(GraphFormat::Pajek),
            other => Err(MknnError::InvalidParameter(format!(
                "unknown graph format '{other}' (expected ncol or pajek)"
            ))),
        }
    }
}

/// Write `graph` to `out` in `format`.
pub fn write_graph<W: Write>(out: &mut W, graph: &Graph, format: GraphFormat) -> Result<()> {
    match format {
        GraphFormat::Ncol => write_ncol(out, graph),
        GraphFormat::Pajek => write_pajek(out, graph),
    }
}

fn write_ncol<W: Write>(out: &mut W, graph: &Graph) -> Result<()> {
    for e in graph.edges() {
        writeln!(out, "{} {} {}", e.source, e.target, e.weight)?;
    }
    Ok(())
}

fn write_pajek<W: Write>(out: &mut W, graph: &Graph) -> Result<()> {
    writeln!(out, "*Vertices {}", graph.num_vertices())?;
    for v in graph.vertices() {
        writeln!(out, "{} \"{v}\"", u64::from(v) + 1)?;
    }
    writeln!(out, "*Edges")?;
    for e in graph.edges() {
        writeln!(
            out,
            "{} {} {}",
            u64::from(e.source) + 1,
            u64::from(e.target) + 1,
            e.weight
        )?;
    }
    Ok(())
}

/// Create (or truncate) `path` and write `graph` to it.
pub fn write_graph_file(path: impl AsRef<Path>, graph: &Graph, format: GraphFormat) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_graph(&mut writer, graph, format)?;
    writer.flush()?;
    Ok(())
}

/// `<dir>/<input stem>-mknn<k>.<format>`. `dir` defaults to the input's
/// parent directory.
#[must_use]
pub fn default_output_path(input: &Path, dir: Option<&Path>, k: usize, format: GraphFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "points".into(), |s| s.to_string_lossy());
    let name = format!("{stem}-mknn{k}.{}", format.extension());
    match dir.or_else(|| input.parent()) {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{assemble, Edge};

    fn sample() -> Graph {
        assemble(4, vec![Edge::new(1, 0, 0.5), Edge::new(2, 3, 0.25)]).unwrap()
    }

    fn render(graph: &Graph, format: GraphFormat) -> String {
        let mut buf = Vec::new();
        write_graph(&mut buf, graph, format).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn ncol_layout() {
        assert_eq!(render(&sample(), GraphFormat::Ncol), "0 1 0.5\n2 3 0.25\n");
    }

    #[test]
    fn pajek_layout() {
        let expected = "*Vertices 4\n1 \"0\"\n2 \"1\"\n3 \"2\"\n4 \"3\"\n*Edges\n1 2 0.5\n3 4 0.25\n";
        assert_eq!(render(&sample(), GraphFormat::Pajek), expected);
    }

    #[test]
    fn pajek_lists_isolated_vertices() {
        let graph = assemble(3, Vec::new()).unwrap();
        assert_eq!(
            render(&graph, GraphFormat::Pajek),
            "*Vertices 3\n1 \"0\"\n2 \"1\"\n3 \"2\"\n*Edges\n"
        );
        assert_eq!(render(&graph, GraphFormat::Ncol), "");
    }

    #[test]
    fn output_path_naming() {
        let input = Path::new("data/iris.csv");
        assert_eq!(
            default_output_path(input, None, 5, GraphFormat::Pajek),
            PathBuf::from("data/iris-mknn5.pajek")
        );
        assert_eq!(
            default_output_path(input, Some(Path::new("out")), 3, GraphFormat::Ncol),
            PathBuf::from("out/iris-mknn3.ncol")
        );
    }

    #[test]
    fn format_from_str() {
        assert_eq!("PAJEK".parse::<GraphFormat>().unwrap(), GraphFormat::Pajek);
        assert!("graphml".parse::<GraphFormat>().is_err());
    }
}
