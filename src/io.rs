// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::io::Write;
use std::path::Path;

use ndarray::{Array2, ArrayD, Ix2, IxDyn, ShapeBuilder};

use crate::error::{MigrationError, Result};
use crate::section::RadarSection;

/// Supported file formats for section I/O.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    /// NumPy .npy format.
    Npy,
    /// MATLAB .mat format (Level 5).
    Mat,
}

/// Infer file format from extension.
pub fn infer_format(path: &Path) -> Result<FileFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("npy") => Ok(FileFormat::Npy),
        Some("mat") => Ok(FileFormat::Mat),
        Some(ext) => Err(MigrationError::UnsupportedFileFormat(ext.to_string())),
        None => Err(MigrationError::UnsupportedFileFormat(
            "(no extension)".to_string(),
        )),
    }
}

/// Read a .npy array of f64, promoting f32 if necessary.
pub fn read_npy(path: &Path) -> Result<ArrayD<f64>> {
    match ndarray_npy::read_npy::<_, ArrayD<f64>>(path) {
        Ok(a) => Ok(a),
        Err(_) => {
            let arr32: ArrayD<f32> = ndarray_npy::read_npy(path)
                .map_err(|e| MigrationError::UnsupportedDtype(format!("{}", e)))?;
            Ok(arr32.mapv(|v| v as f64))
        }
    }
}

/// Read a named variable from a .mat file in row-major order.
///
/// MATLAB stores arrays column-major; the result has the variable's MATLAB
/// shape with standard (C) layout.
pub fn read_mat_variable(path: &Path, name: &str) -> Result<ArrayD<f64>> {
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    let mat = matfile::MatFile::parse(&mut reader)
        .map_err(|e| MigrationError::Other(format!("MAT parse error: {}", e)))?;

    let array = mat
        .find_by_name(name)
        .ok_or_else(|| MigrationError::MatVariableNotFound {
            expected: name.to_string(),
            available: mat.arrays().iter().map(|a| a.name().to_string()).collect(),
        })?;

    let values: Vec<f64> = match array.data() {
        matfile::NumericData::Double { real, imag: _ } => real.clone(),
        matfile::NumericData::Single { real, imag: _ } => real.iter().map(|&v| v as f64).collect(),
        _ => {
            return Err(MigrationError::UnsupportedDtype(format!(
                "MAT variable '{}' is not f64 or f32",
                name
            )))
        }
    };

    let shape: Vec<usize> = array.size().to_vec();
    let arr = ArrayD::from_shape_vec(IxDyn(&shape).f(), values)
        .map_err(|e| MigrationError::Other(format!("shape error: {}", e)))?;
    Ok(arr.as_standard_layout().into_owned())
}

/// View an array as a matrix, failing for any other rank.
pub fn into_matrix(arr: ArrayD<f64>) -> Result<Array2<f64>> {
    let shape = arr.shape().to_vec();
    arr.into_dimensionality::<Ix2>().map_err(|_| {
        MigrationError::Other(format!("expected a 2-D array, got shape {:?}", shape))
    })
}

/// Flatten an array that has at most one non-singleton axis (a plain
/// vector, or a 1 x n / n x 1 matrix).
pub fn into_vector(arr: ArrayD<f64>) -> Result<Vec<f64>> {
    let long_axes = arr.shape().iter().filter(|&&d| d != 1).count();
    if long_axes > 1 {
        return Err(MigrationError::ShapeMismatch {
            expected: vec![arr.len()],
            got: arr.shape().to_vec(),
        });
    }
    Ok(arr.iter().cloned().collect())
}

/// Load a section stored as three .npy files: the `snum x tnum` data, the
/// two-way time axis in microseconds and the trace positions in kilometres.
pub fn load_section_npy(data: &Path, travel_time: &Path, dist: &Path) -> Result<RadarSection> {
    let data = into_matrix(read_npy(data)?)?;
    let travel_time = into_vector(read_npy(travel_time)?)?;
    let dist = into_vector(read_npy(dist)?)?;
    RadarSection::new(data, travel_time, dist)
}

/// Load a section from a .mat file holding `data`, `travel_time` and `dist`.
pub fn load_section_mat(path: &Path) -> Result<RadarSection> {
    let data = into_matrix(read_mat_variable(path, "data")?)?;
    let travel_time = into_vector(read_mat_variable(path, "travel_time")?)?;
    let dist = into_vector(read_mat_variable(path, "dist")?)?;
    RadarSection::new(data, travel_time, dist)
}

/// Save a section (data and both axes) to a .mat file.
pub fn save_section_mat(section: &RadarSection, path: &Path) -> Result<()> {
    let data = column_major(section.data());
    let (snum, tnum) = section.data().dim();
    write_mat_level5(
        path,
        &[
            MatVariable {
                name: "data",
                dims: &[snum, tnum],
                values: &data,
            },
            MatVariable {
                name: "travel_time",
                dims: &[snum, 1],
                values: section.travel_time_us(),
            },
            MatVariable {
                name: "dist",
                dims: &[1, tnum],
                values: section.dist_km(),
            },
        ],
    )
}

/// Save a migrated image, inferring the format from the extension. In .mat
/// files the image is stored as `migdata`.
pub fn save_image(image: &Array2<f64>, path: &Path) -> Result<()> {
    match infer_format(path)? {
        FileFormat::Npy => ndarray_npy::write_npy(path, image)
            .map_err(|e| MigrationError::Other(format!("npy write error: {}", e))),
        FileFormat::Mat => {
            let values = column_major(image);
            let (rows, cols) = image.dim();
            write_mat_level5(
                path,
                &[MatVariable {
                    name: "migdata",
                    dims: &[rows, cols],
                    values: &values,
                }],
            )
        }
    }
}

fn column_major(arr: &Array2<f64>) -> Vec<f64> {
    arr.t().iter().cloned().collect()
}

/// A real double array to be written to a MAT file. `values` are in
/// column-major order for `dims`.
struct MatVariable<'a> {
    name: &'a str,
    dims: &'a [usize],
    values: &'a [f64],
}

// MAT-File Level 5 data types and array classes.
const MI_INT8: u32 = 1;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_DOUBLE: u32 = 9;
const MI_MATRIX: u32 = 14;
const MX_DOUBLE_CLASS: u32 = 6;

/// Minimal MAT-File Level 5 writer for uncompressed real double arrays.
///
/// `matfile` only reads, so writing is done by hand: a 128-byte header
/// (116 bytes of text, 8 bytes of subsystem offset, version 0x0100, "IM"
/// little-endian marker) followed by one miMATRIX element per variable.
/// Each miMATRIX holds array flags, dimensions, name and real part, every
/// sub-element padded to 8 bytes.
///
/// Reference: <https://www.mathworks.com/help/pdf_doc/matlab/matfile_format.pdf>
fn write_mat_level5(path: &Path, variables: &[MatVariable<'_>]) -> Result<()> {
    let mut elements = Vec::new();
    for var in variables {
        let expected: usize = var.dims.iter().product();
        if var.values.len() != expected {
            return Err(MigrationError::ShapeMismatch {
                expected: var.dims.to_vec(),
                got: vec![var.values.len()],
            });
        }

        let mut flags = Vec::with_capacity(8);
        flags.extend_from_slice(&MX_DOUBLE_CLASS.to_le_bytes());
        flags.extend_from_slice(&0u32.to_le_bytes());

        let mut dims = Vec::with_capacity(4 * var.dims.len());
        for &d in var.dims {
            let d = i32::try_from(d)
                .map_err(|_| MigrationError::Other(format!("dimension {} too large for MAT", d)))?;
            dims.extend_from_slice(&d.to_le_bytes());
        }

        let mut real = Vec::with_capacity(8 * var.values.len());
        for v in var.values {
            real.extend_from_slice(&v.to_le_bytes());
        }

        let mut body = Vec::new();
        push_element(&mut body, MI_UINT32, &flags)?;
        push_element(&mut body, MI_INT32, &dims)?;
        push_element(&mut body, MI_INT8, var.name.as_bytes())?;
        push_element(&mut body, MI_DOUBLE, &real)?;
        push_element(&mut elements, MI_MATRIX, &body)?;
    }

    let file = std::fs::File::create(path)?;
    let mut w = std::io::BufWriter::new(file);

    let desc = b"MATLAB 5.0 MAT-file, created by kirchhoff-mig";
    let mut text = [b' '; 116];
    text[..desc.len()].copy_from_slice(desc);
    w.write_all(&text)?;
    w.write_all(&[0u8; 8])?;
    w.write_all(&0x0100u16.to_le_bytes())?;
    w.write_all(b"IM")?;
    w.write_all(&elements)?;
    w.flush()?;
    Ok(())
}

/// Append a tagged data element, zero-padded to an 8-byte boundary.
fn push_element(buf: &mut Vec<u8>, kind: u32, payload: &[u8]) -> Result<()> {
    let len = u32::try_from(payload.len())
        .map_err(|_| MigrationError::Other("MAT element exceeds 4 GiB".to_string()))?;
    buf.extend_from_slice(&kind.to_le_bytes());
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(payload);
    let padded = payload.len().div_ceil(8) * 8;
    buf.resize(buf.len() + padded - payload.len(), 0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("kirchhoff_mig_{}", name))
    }

    fn sample_image() -> Array2<f64> {
        Array2::from_shape_fn((3, 5), |(i, j)| (i * 5 + j) as f64 * 0.5)
    }

    #[test]
    fn npy_image_roundtrip() {
        let image = sample_image();
        let tmp = temp("image_roundtrip.npy");
        save_image(&image, &tmp).unwrap();
        let loaded = into_matrix(read_npy(&tmp).unwrap()).unwrap();
        assert_eq!(loaded, image);
        std::fs::remove_file(&tmp).ok();
    }

    #[test]
    fn mat_image_keeps_orientation() {
        let image = sample_image();
        let tmp = temp("image_orientation.mat");
        save_image(&image, &tmp).unwrap();
        let loaded = into_matrix(read_mat_variable(&tmp, "migdata").unwrap()).unwrap();
        assert_eq!(loaded.dim(), (3, 5));
        assert_eq!(loaded, image);
        std::fs::remove_file(&tmp).ok();
    }

    #[test]
    fn mat_section_roundtrip() {
        let section = RadarSection::new(
            sample_image(),
            vec![0.0, 0.01, 0.02],
            vec![0.0, 0.1, 0.2, 0.3, 0.4],
        )
        .unwrap();
        let tmp = temp("section_roundtrip.mat");
        save_section_mat(&section, &tmp).unwrap();
        let loaded = load_section_mat(&tmp).unwrap();
        assert_eq!(loaded.data(), section.data());
        assert_eq!(loaded.travel_time_us(), section.travel_time_us());
        assert_eq!(loaded.dist_km(), section.dist_km());
        std::fs::remove_file(&tmp).ok();
    }

    #[test]
    fn npy_section_from_three_files() {
        let data = temp("section_data.npy");
        let tt = temp("section_tt.npy");
        let dist = temp("section_dist.npy");
        ndarray_npy::write_npy(&data, &sample_image()).unwrap();
        ndarray_npy::write_npy(&tt, &ndarray::arr1(&[0.0f32, 0.5, 1.0])).unwrap();
        ndarray_npy::write_npy(&dist, &ndarray::arr2(&[[0.0, 1.0, 2.0, 3.0, 4.0]])).unwrap();

        let section = load_section_npy(&data, &tt, &dist).unwrap();
        assert_eq!(section.snum(), 3);
        assert_eq!(section.tnum(), 5);
        assert_eq!(section.travel_time_us(), &[0.0, 0.5, 1.0]);

        for p in [&data, &tt, &dist] {
            std::fs::remove_file(p).ok();
        }
    }

    #[test]
    fn missing_mat_variable_lists_available() {
        let tmp = temp("missing_variable.mat");
        save_image(&sample_image(), &tmp).unwrap();
        let result = read_mat_variable(&tmp, "travel_time");
        match result {
            Err(MigrationError::MatVariableNotFound {
                expected,
                available,
            }) => {
                assert_eq!(expected, "travel_time");
                assert_eq!(available, vec!["migdata".to_string()]);
            }
            other => panic!("expected MatVariableNotFound, got {:?}", other.map(|a| a.shape().to_vec())),
        }
        std::fs::remove_file(&tmp).ok();
    }

    #[test]
    fn vector_rejects_matrix() {
        let arr = ArrayD::<f64>::zeros(IxDyn(&[2, 3]));
        assert!(matches!(
            into_vector(arr),
            Err(MigrationError::ShapeMismatch { .. })
        ));
        let column = ArrayD::<f64>::zeros(IxDyn(&[4, 1]));
        assert_eq!(into_vector(column).unwrap().len(), 4);
    }

    #[test]
    fn unsupported_format() {
        assert!(matches!(
            infer_format(Path::new("section.sgy")),
            Err(MigrationError::UnsupportedFileFormat(_))
        ));
        assert!(matches!(
            infer_format(Path::new("section")),
            Err(MigrationError::UnsupportedFileFormat(_))
        ));
        assert_eq!(infer_format(Path::new("a.mat")).unwrap(), FileFormat::Mat);
    }
}
