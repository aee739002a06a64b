//! ASCII OBJ mesh loading
//!
//! Parsing is pure and GPU-free: `parse` handles the extension check and file
//! I/O, then hands the text to `parse_str`, which does all the real work.
//! The output is one flattened `Vertex` per face-corner reference; shared
//! corners are duplicated rather than deduplicated, so the result is drawn
//! non-indexed.

use crate::backend::types::Vertex;
use glam::{Vec2, Vec3};
use std::path::Path;
use thiserror::Error;

/// Mesh loading error type
#[derive(Error, Debug)]
pub enum ObjError {
    #[error("unsupported model format (expected .obj)")]
    UnsupportedFormat,
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed directive at line {line}")]
    MalformedLine { line: usize },
    #[error("face index {index} out of range for pool of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Load a mesh from an OBJ file on disk.
///
/// Fails with `UnsupportedFormat` before touching the filesystem when the
/// path does not end in `.obj`.
pub fn parse(path: impl AsRef<Path>) -> Result<Vec<Vertex>, ObjError> {
    let path = path.as_ref();

    let supported = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("obj"));
    if !supported {
        return Err(ObjError::UnsupportedFormat);
    }

    let text = std::fs::read_to_string(path)?;
    let vertices = parse_str(&text)?;
    log::info!(
        "Loaded {} ({} vertices, {} triangles)",
        path.display(),
        vertices.len(),
        vertices.len() / 3
    );
    Ok(vertices)
}

/// Parse OBJ text into a flattened vertex sequence.
///
/// Recognized directives are `v`, `vt`, `vn` and `f`; anything else is
/// ignored. Numeric fields may be missing from the tail of a `v`/`vt`/`vn`
/// line (the absent components default to zero), but a field that is present
/// and non-numeric is an error.
pub fn parse_str(text: &str) -> Result<Vec<Vertex>, ObjError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut texcoords: Vec<Vec2> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();

    let mut position_indices: Vec<usize> = Vec::new();
    let mut texcoord_indices: Vec<usize> = Vec::new();
    let mut normal_indices: Vec<usize> = Vec::new();

    for (line_idx, line) in text.lines().enumerate() {
        let line_no = line_idx + 1;
        let mut tokens = line.split_whitespace();
        let Some(directive) = tokens.next() else {
            continue;
        };

        match directive {
            "v" => {
                let v = read_floats::<3>(&mut tokens, line_no)?;
                positions.push(Vec3::from_array(v));
            }
            "vt" => {
                let v = read_floats::<2>(&mut tokens, line_no)?;
                texcoords.push(Vec2::from_array(v));
            }
            "vn" => {
                let v = read_floats::<3>(&mut tokens, line_no)?;
                normals.push(Vec3::from_array(v).normalize_or_zero());
            }
            "f" => {
                for corner in tokens {
                    // p/t/n with empty parts kept, e.g. "3//7" -> ["3", "", "7"]
                    let mut parts = corner.split('/');
                    for list in [
                        &mut position_indices,
                        &mut texcoord_indices,
                        &mut normal_indices,
                    ] {
                        match parts.next() {
                            Some("") | None => {}
                            Some(part) => {
                                let index: usize = part
                                    .parse()
                                    .map_err(|_| ObjError::MalformedLine { line: line_no })?;
                                list.push(index);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    reduce(
        &positions,
        &texcoords,
        &normals,
        &position_indices,
        &texcoord_indices,
        &normal_indices,
    )
}

/// Read up to N whitespace-separated floats; missing trailing fields stay
/// zero, present non-numeric fields fail.
fn read_floats<'a, const N: usize>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line_no: usize,
) -> Result<[f32; N], ObjError> {
    let mut out = [0.0f32; N];
    for slot in out.iter_mut() {
        let Some(token) = tokens.next() else {
            break;
        };
        *slot = token
            .parse()
            .map_err(|_| ObjError::MalformedLine { line: line_no })?;
    }
    Ok(out)
}

/// Resolve the recorded 1-based index lists against the attribute pools,
/// producing one output vertex per position reference.
fn reduce(
    positions: &[Vec3],
    texcoords: &[Vec2],
    normals: &[Vec3],
    position_indices: &[usize],
    texcoord_indices: &[usize],
    normal_indices: &[usize],
) -> Result<Vec<Vertex>, ObjError> {
    let mut vertices = Vec::with_capacity(position_indices.len());

    for i in 0..position_indices.len() {
        let mut vertex = Vertex::new(Vec3::ZERO, Vec3::ZERO, Vec2::ZERO);

        if !positions.is_empty() {
            vertex.position = *lookup(positions, position_indices[i])?;
        }
        if !normals.is_empty() {
            if let Some(&index) = normal_indices.get(i) {
                vertex.normal = *lookup(normals, index)?;
            }
        }
        if !texcoords.is_empty() {
            if let Some(&index) = texcoord_indices.get(i) {
                vertex.uv = *lookup(texcoords, index)?;
            }
        }

        vertices.push(vertex);
    }

    Ok(vertices)
}

/// Convert a 1-based index and bounds-check it against the pool.
fn lookup<T>(pool: &[T], one_based: usize) -> Result<&T, ObjError> {
    let index = one_based
        .checked_sub(1)
        .ok_or(ObjError::IndexOutOfRange {
            index: one_based,
            len: pool.len(),
        })?;
    pool.get(index).ok_or(ObjError::IndexOutOfRange {
        index,
        len: pool.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_count_matches_face_corner_count() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
f 1 2 3
f 2 4 3
";
        let vertices = parse_str(src).unwrap();
        assert_eq!(vertices.len(), 6);
    }

    #[test]
    fn positions_only_model_zero_fills_normals_and_uvs() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
";
        let vertices = parse_str(src).unwrap();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[0].position, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(vertices[1].position, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(vertices[2].position, Vec3::new(0.0, 1.0, 0.0));
        for v in &vertices {
            assert_eq!(v.normal, Vec3::ZERO);
            assert_eq!(v.uv, Vec2::ZERO);
        }
    }

    #[test]
    fn normals_are_stored_normalized() {
        let src = "\
v 0 0 0
vn 0 10 0
f 1//1 1//1 1//1
";
        let vertices = parse_str(src).unwrap();
        for v in &vertices {
            assert!((v.normal.length() - 1.0).abs() < 1e-6);
            assert_eq!(v.normal, Vec3::Y);
        }
    }

    #[test]
    fn one_based_indices_resolve_to_first_entry() {
        let src = "\
v 1 2 3
vt 0.5 0.25
vn 0 0 1
f 1/1/1 1/1/1 1/1/1
";
        let vertices = parse_str(src).unwrap();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[0].position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(vertices[0].uv, Vec2::new(0.5, 0.25));
        assert_eq!(vertices[0].normal, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn out_of_range_position_index_fails() {
        let src = "\
v 0 0 0
v 1 1 1
f 1 2 5
";
        let err = parse_str(src).unwrap_err();
        assert!(matches!(err, ObjError::IndexOutOfRange { index: 4, len: 2 }));
    }

    #[test]
    fn zero_index_fails_instead_of_wrapping() {
        let src = "\
v 0 0 0
f 0 1 1
";
        let err = parse_str(src).unwrap_err();
        assert!(matches!(err, ObjError::IndexOutOfRange { .. }));
    }

    #[test]
    fn partial_position_defaults_missing_component_to_zero() {
        let src = "\
v 1 2
f 1 1 1
";
        let vertices = parse_str(src).unwrap();
        assert_eq!(vertices[0].position, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn face_token_with_empty_texcoord_part_skips_uv() {
        let src = "\
v 1 0 0
vn 0 1 0
f 1//1 1//1 1//1
";
        let vertices = parse_str(src).unwrap();
        assert_eq!(vertices[0].position, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(vertices[0].normal, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(vertices[0].uv, Vec2::ZERO);
    }

    #[test]
    fn unknown_directives_are_ignored() {
        let src = "\
# comment line
o my_object
g group1
s off
v 0 0 0
v 1 0 0
v 0 1 0
usemtl whatever
f 1 2 3
";
        let vertices = parse_str(src).unwrap();
        assert_eq!(vertices.len(), 3);
    }

    #[test]
    fn malformed_float_reports_line_number() {
        let src = "\
v 0 0 0
v abc 0 0
";
        let err = parse_str(src).unwrap_err();
        assert!(matches!(err, ObjError::MalformedLine { line: 2 }));
    }

    #[test]
    fn malformed_face_index_reports_line_number() {
        let src = "\
v 0 0 0
f 1 x 1
";
        let err = parse_str(src).unwrap_err();
        assert!(matches!(err, ObjError::MalformedLine { line: 2 }));
    }

    #[test]
    fn empty_input_yields_no_vertices() {
        let vertices = parse_str("").unwrap();
        assert!(vertices.is_empty());
    }

    #[test]
    fn wrong_extension_is_rejected_before_io() {
        let err = parse("model.stl").unwrap_err();
        assert!(matches!(err, ObjError::UnsupportedFormat));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = parse("definitely_not_here.obj").unwrap_err();
        assert!(matches!(err, ObjError::Io(_)));
    }
}
