//! File collaborators: delimited point tables in, edge lists out.
//!
//! The graph core never sees files. [`reader`] turns a text table into a
//! [`PointSet`](crate::PointSet), [`writer`] serializes a finished
//! [`Graph`](crate::Graph).

pub mod reader;
pub mod writer;

pub use reader::{parse_points, read_points, Delimiter, ReadOptions};
pub use writer::{default_output_path, write_graph, write_graph_file, GraphFormat};
