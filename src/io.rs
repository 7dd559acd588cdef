//! Edge-list and membership file formats.
//!
//! All I/O here is single-threaded and runs strictly before (graph load) or
//! after (membership write) the concurrent phase.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::renumber;

/// Read an undirected edge list: one edge per line, two integers separated by
/// a single tab, 1-based ids.
///
/// No sortedness is required, and nothing is de-duplicated or filtered;
/// range checking happens in [`Graph::build`]. A malformed line (wrong token
/// count or non-integer field) is an [`Error::Parse`] naming the file and
/// line number.
pub fn read_edge_list(path: impl AsRef<Path>) -> Result<Vec<(u32, u32)>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let reader = BufReader::new(file);

    let mut edges = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::io(path, e))?;
        let pair = parse_pair(&line, '\t').map_err(|msg| Error::parse(path, index + 1, msg))?;
        edges.push(pair);
    }
    Ok(edges)
}

/// Write the membership file: `"<id> <label>"` per node for ids
/// `0..=num_nodes`, the reserved node 0 included.
pub fn write_membership(path: impl AsRef<Path>, graph: &Graph) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut out = BufWriter::new(file);

    for (id, label) in graph.labels().iter().enumerate() {
        writeln!(out, "{id} {label}").map_err(|e| Error::io(path, e))?;
    }
    out.flush().map_err(|e| Error::io(path, e))
}

/// Load a membership file, overriding the singleton initialization
/// (resume/seed). Same `"<id> <label>"` format as [`write_membership`].
pub fn read_membership(path: impl AsRef<Path>, graph: &Graph) -> Result<()> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let reader = BufReader::new(file);

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::io(path, e))?;
        let (id, label) =
            parse_pair(&line, ' ').map_err(|msg| Error::parse(path, index + 1, msg))?;
        graph.seed_labels([(id, label)])?;
    }
    Ok(())
}

/// Write the renumbered membership file: `"<id> <dense>"` per node with dense
/// community ids `1..=K` assigned by first appearance. Returns `K`.
pub fn write_renumbered(path: impl AsRef<Path>, graph: &Graph) -> Result<usize> {
    let path = path.as_ref();
    let (dense, communities) = renumber::dense_labels(&graph.labels());

    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut out = BufWriter::new(file);
    for (id, label) in dense.iter().enumerate() {
        writeln!(out, "{id} {label}").map_err(|e| Error::io(path, e))?;
    }
    out.flush().map_err(|e| Error::io(path, e))?;
    Ok(communities)
}

/// Split `line` on `sep` into exactly two integers.
fn parse_pair(line: &str, sep: char) -> std::result::Result<(u32, u32), String> {
    let mut tokens = line.split(sep);
    let (Some(first), Some(second), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(format!("expected two fields separated by {sep:?}"));
    };
    let first = first
        .parse::<u32>()
        .map_err(|_| format!("invalid integer {first:?}"))?;
    let second = second
        .parse::<u32>()
        .map_err(|_| format!("invalid integer {second:?}"))?;
    Ok((first, second))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_edge_list() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("edges.txt");
        fs::write(&path, "1\t2\n2\t3\n4\t5\n").unwrap();

        let edges = read_edge_list(&path).unwrap();
        assert_eq!(edges, vec![(1, 2), (2, 3), (4, 5)]);
    }

    #[test]
    fn test_parse_error_names_file_and_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("edges.txt");
        fs::write(&path, "1\t2\n1\t2\t3\n").unwrap();

        match read_edge_list(&path).unwrap_err() {
            Error::Parse { file, line, .. } => {
                assert!(file.ends_with("edges.txt"));
                assert_eq!(line, 2);
            }
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_integer_field_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("edges.txt");
        fs::write(&path, "1\tx\n").unwrap();
        assert!(matches!(
            read_edge_list(&path),
            Err(Error::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.txt");
        assert!(matches!(read_edge_list(&path), Err(Error::Io { .. })));
    }

    #[test]
    fn test_membership_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("membership.txt");

        let graph = Graph::build(3, &[(1, 2), (2, 3)]).unwrap();
        graph.set_label(3, 1);
        write_membership(&path, &graph).unwrap();

        // Node 0 is present and the format is space-separated.
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "0 0\n1 1\n2 2\n3 1\n");

        let other = Graph::build(3, &[(1, 2), (2, 3)]).unwrap();
        read_membership(&path, &other).unwrap();
        assert_eq!(other.labels(), graph.labels());
    }

    #[test]
    fn test_membership_out_of_range_id() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("membership.txt");
        fs::write(&path, "7 1\n").unwrap();

        let graph = Graph::build(3, &[(1, 2)]).unwrap();
        assert!(matches!(
            read_membership(&path, &graph),
            Err(Error::Range { id: 7, max: 3 })
        ));
    }

    #[test]
    fn test_write_renumbered_dense() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("renumbered.txt");

        let graph = Graph::build(5, &[(1, 2), (2, 3), (4, 5)]).unwrap();
        graph.seed_labels([(2, 1), (3, 1), (5, 4)]).unwrap();

        let communities = write_renumbered(&path, &graph).unwrap();
        // Raw labels are {0, 1, 4}.
        assert_eq!(communities, 3);
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "0 1\n1 2\n2 2\n3 2\n4 3\n5 3\n");
    }
}
