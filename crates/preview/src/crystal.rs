//! VASP `POSCAR`/`CONTCAR` support.
//!
//! Structure viewers take CIF rather than VASP input, so these files are
//! routed through a generated `<name>.cif` companion holding a supercell of
//! the structure. The companion is written once and never overwritten.

use std::{
    collections::BTreeMap,
    fmt::Write as _,
    fs, io,
    io::Write as _,
    path::{Path, PathBuf},
};

use log::{debug, info};
use sttree_runtime::{CRYSTAL_BASENAMES, CRYSTAL_COMPANION_EXT};
use tempfile::NamedTempFile;

use crate::error::PreviewError;

type Vec3 = [f64; 3];

/// Periodic structure: lattice rows are the a, b, c vectors in Ångström.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub comment: String,
    pub lattice: [Vec3; 3],
    /// Element symbol per site
    pub species: Vec<String>,
    /// Fractional coordinates per site
    pub frac_coords: Vec<Vec3>,
}

pub fn is_crystal_basename(name: &str) -> bool {
    CRYSTAL_BASENAMES.contains(&name)
}

/// `.../POSCAR` → `.../POSCAR.cif`
pub fn companion_path(source: &Path) -> PathBuf {
    let mut name = source.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(CRYSTAL_COMPANION_EXT);
    source.with_file_name(name)
}

/// Make sure the CIF companion of `source` exists, generating it with the
/// given supercell expansion if absent. Returns the companion path.
pub fn ensure_companion(source: &Path, supercell: [u32; 3]) -> Result<PathBuf, PreviewError> {
    let target = companion_path(source);
    if target.exists() {
        debug!("[crystal] companion {:?} already present", target);
        return Ok(target);
    }

    let text = fs::read_to_string(source).map_err(|e| io_err(source, e))?;
    let cif = Structure::parse_poscar(&text)
        .map_err(|reason| PreviewError::Structure {
            path: source.to_path_buf(),
            reason,
        })?
        .supercell(supercell)
        .to_cif();

    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| io_err(&target, e))?;
    tmp.write_all(cif.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| io_err(&target, e))?;

    match tmp.persist_noclobber(&target) {
        Ok(_) => info!("[crystal] wrote {:?}", target),
        // Lost a race with another writer; theirs is equivalent.
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {}
        Err(e) => return Err(io_err(&target, e.error)),
    }

    Ok(target)
}

fn io_err(path: &Path, source: io::Error) -> PreviewError {
    PreviewError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn parse_floats(line: &str, n: usize) -> Result<Vec<f64>, String> {
    let values: Vec<f64> = line
        .split_whitespace()
        .take(n)
        .map(str::parse::<f64>)
        .collect::<Result<_, _>>()
        .map_err(|e| format!("bad number in {line:?}: {e}"))?;
    if values.len() < n {
        return Err(format!("expected {n} numbers in {line:?}"));
    }
    Ok(values)
}

fn det(m: &[Vec3; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

fn inverse(m: &[Vec3; 3]) -> Option<[Vec3; 3]> {
    let d = det(m);
    if d.abs() < 1e-12 {
        return None;
    }
    let mut inv = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            let (r0, r1) = ((j + 1) % 3, (j + 2) % 3);
            let (c0, c1) = ((i + 1) % 3, (i + 2) % 3);
            inv[i][j] = (m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0]) / d;
        }
    }
    Some(inv)
}

fn norm(v: &Vec3) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn angle_deg(u: &Vec3, v: &Vec3) -> f64 {
    let dot: f64 = u.iter().zip(v).map(|(a, b)| a * b).sum();
    (dot / (norm(u) * norm(v))).clamp(-1.0, 1.0).acos().to_degrees()
}

impl Structure {
    /// Parse VASP 4 or 5 POSCAR text.
    ///
    /// VASP 4 files carry no species line; symbols are then taken from the
    /// comment line when it lists exactly one token per species.
    pub fn parse_poscar(text: &str) -> Result<Structure, String> {
        let mut lines = text.lines();
        let mut next = |what: &str| lines.next().ok_or_else(|| format!("missing {what}"));

        let comment = next("comment line")?.trim().to_owned();

        let scale_line = next("scale line")?;
        let scale: Vec<f64> = scale_line
            .split_whitespace()
            .map(str::parse::<f64>)
            .collect::<Result<_, _>>()
            .map_err(|e| format!("bad scale {scale_line:?}: {e}"))?;

        let mut lattice = [[0.0; 3]; 3];
        for row in &mut lattice {
            let v = parse_floats(next("lattice vector")?, 3)?;
            row.copy_from_slice(&v);
        }

        let line = next("species or counts line")?;
        let (names, counts_line) = if line
            .split_whitespace()
            .next()
            .is_some_and(|t| t.parse::<usize>().is_ok())
        {
            (None, line)
        } else {
            let names: Vec<String> = line.split_whitespace().map(str::to_owned).collect();
            (Some(names), next("counts line")?)
        };

        let counts: Vec<usize> = counts_line
            .split_whitespace()
            .map(str::parse::<usize>)
            .collect::<Result<_, _>>()
            .map_err(|e| format!("bad counts {counts_line:?}: {e}"))?;
        if counts.is_empty() {
            return Err("no species counts".into());
        }

        let names = match names {
            Some(n) if n.len() == counts.len() => n,
            Some(n) => {
                return Err(format!(
                    "{} species names for {} counts",
                    n.len(),
                    counts.len()
                ));
            }
            None => {
                let from_comment: Vec<String> =
                    comment.split_whitespace().map(str::to_owned).collect();
                if from_comment.len() == counts.len() {
                    from_comment
                } else {
                    (1..=counts.len()).map(|i| format!("X{i}")).collect()
                }
            }
        };

        let mut mode = next("coordinate mode line")?.trim();
        if mode.starts_with(['s', 'S']) {
            mode = next("coordinate mode line")?.trim();
        }
        let cartesian = mode.starts_with(['c', 'C', 'k', 'K']);

        // Per-axis multipliers applied to lattice and cartesian coordinates.
        let axis_scale: Vec3 = match scale.as_slice() {
            [s] if *s < 0.0 => {
                let volume = det(&lattice).abs();
                if volume < 1e-12 {
                    return Err("degenerate lattice".into());
                }
                let f = (-s / volume).cbrt();
                [f, f, f]
            }
            [s] => [*s, *s, *s],
            [x, y, z] => [*x, *y, *z],
            _ => return Err(format!("bad scale {scale_line:?}")),
        };
        for row in &mut lattice {
            for (c, k) in row.iter_mut().zip(axis_scale) {
                *c *= k;
            }
        }

        let inv = if cartesian {
            Some(inverse(&lattice).ok_or("degenerate lattice")?)
        } else {
            None
        };

        let total: usize = counts.iter().sum();
        let mut species = Vec::with_capacity(total);
        let mut frac_coords = Vec::with_capacity(total);

        for (name, count) in names.iter().zip(&counts) {
            for _ in 0..*count {
                let v = parse_floats(next("atom coordinates")?, 3)?;
                let mut p = [v[0], v[1], v[2]];
                if let Some(inv) = &inv {
                    let cart = [p[0] * axis_scale[0], p[1] * axis_scale[1], p[2] * axis_scale[2]];
                    for (j, out) in p.iter_mut().enumerate() {
                        *out = (0..3).map(|i| cart[i] * inv[i][j]).sum();
                    }
                }
                species.push(name.clone());
                frac_coords.push(p);
            }
        }

        Ok(Structure {
            comment,
            lattice,
            species,
            frac_coords,
        })
    }

    /// Repeat the cell `n[0] × n[1] × n[2]` times. Zero factors count as 1.
    pub fn supercell(&self, n: [u32; 3]) -> Structure {
        let n = n.map(|k| k.max(1));
        let nf = n.map(f64::from);

        let mut lattice = self.lattice;
        for (row, k) in lattice.iter_mut().zip(nf) {
            for c in row.iter_mut() {
                *c *= k;
            }
        }

        let mut species = Vec::new();
        let mut frac_coords = Vec::new();
        for (name, f) in self.species.iter().zip(&self.frac_coords) {
            let f = (*f).map(|x| x.rem_euclid(1.0));
            for i in 0..n[0] {
                for j in 0..n[1] {
                    for k in 0..n[2] {
                        let shift = [f64::from(i), f64::from(j), f64::from(k)];
                        species.push(name.clone());
                        frac_coords.push([
                            (f[0] + shift[0]) / nf[0],
                            (f[1] + shift[1]) / nf[1],
                            (f[2] + shift[2]) / nf[2],
                        ]);
                    }
                }
            }
        }

        Structure {
            comment: self.comment.clone(),
            lattice,
            species,
            frac_coords,
        }
    }

    /// Element counts in order of first appearance, e.g. `Si16O32`.
    pub fn formula(&self) -> String {
        let mut order: Vec<&str> = Vec::new();
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for s in &self.species {
            let c = counts.entry(s.as_str()).or_insert(0);
            if *c == 0 {
                order.push(s.as_str());
            }
            *c += 1;
        }
        order.iter().map(|s| format!("{s}{}", counts[s])).collect()
    }

    /// Render as a P1 CIF.
    pub fn to_cif(&self) -> String {
        let [a, b, c] = &self.lattice;
        let mut out = String::new();

        let _ = writeln!(out, "# generated by {}", sttree_runtime::PROGRAM_NAME);
        let _ = writeln!(out, "data_{}", self.formula());
        let _ = writeln!(out, "_symmetry_space_group_name_H-M   'P 1'");
        let _ = writeln!(out, "_cell_length_a   {:.8}", norm(a));
        let _ = writeln!(out, "_cell_length_b   {:.8}", norm(b));
        let _ = writeln!(out, "_cell_length_c   {:.8}", norm(c));
        let _ = writeln!(out, "_cell_angle_alpha   {:.8}", angle_deg(b, c));
        let _ = writeln!(out, "_cell_angle_beta   {:.8}", angle_deg(a, c));
        let _ = writeln!(out, "_cell_angle_gamma   {:.8}", angle_deg(a, b));
        let _ = writeln!(out, "_symmetry_Int_Tables_number   1");
        let _ = writeln!(out, "_chemical_formula_sum   '{}'", self.formula());
        let _ = writeln!(out, "_cell_volume   {:.8}", det(&self.lattice).abs());
        out.push_str("loop_\n _symmetry_equiv_pos_site_id\n _symmetry_equiv_pos_as_xyz\n  1  'x, y, z'\n");
        out.push_str("loop_\n _atom_site_type_symbol\n _atom_site_label\n _atom_site_fract_x\n _atom_site_fract_y\n _atom_site_fract_z\n _atom_site_occupancy\n");

        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        for (name, f) in self.species.iter().zip(&self.frac_coords) {
            let idx = seen.entry(name.as_str()).or_insert(0);
            let _ = writeln!(
                out,
                "  {name}  {name}{idx}  {:.8}  {:.8}  {:.8}  1",
                f[0], f[1], f[2]
            );
            *idx += 1;
        }

        out
    }
}

#[cfg(test)]
#[path = "crystal_tests.rs"]
mod tests;
