//! Wavefront OBJ and MTL export.
//!
//! Meshes are generated Z-up and written Y-up, the OBJ convention:
//! `(x, y, z)` becomes `(x, z, -y)`. That is a proper rotation, so winding
//! and normals stay consistent.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crater_core::{CraterMesh, MaterialZone, ZoneMaterial, ZoneMaterials};
use glam::Vec3;

use crate::error::CliError;

/// One named mesh placed at `offset` (generator space, Z up).
pub struct ObjObject<'a> {
    pub name: String,
    pub mesh: &'a CraterMesh,
    pub offset: Vec3,
}

/// Paths written by [`write_files`].
#[derive(Debug)]
pub struct ExportedFiles {
    pub obj: PathBuf,
    pub mtl: Option<PathBuf>,
}

fn to_y_up(p: Vec3) -> Vec3 {
    Vec3::new(p.x, p.z, -p.y)
}

/// Write all `objects` into `<dir>/<stem>.obj`, plus `<stem>.mtl` when
/// `materials` is given.
pub fn write_files(
    dir: &Path,
    stem: &str,
    objects: &[ObjObject<'_>],
    materials: Option<&ZoneMaterials>,
) -> Result<ExportedFiles, CliError> {
    std::fs::create_dir_all(dir).map_err(|e| CliError::io(dir, e))?;

    let mtl = match materials {
        Some(materials) => {
            let path = dir.join(format!("{stem}.mtl"));
            let file = File::create(&path).map_err(|e| CliError::io(&path, e))?;
            let mut out = BufWriter::new(file);
            write_mtl(&mut out, materials)
                .and_then(|()| out.flush())
                .map_err(|e| CliError::io(&path, e))?;
            Some(path)
        }
        None => None,
    };

    let obj = dir.join(format!("{stem}.obj"));
    let file = File::create(&obj).map_err(|e| CliError::io(&obj, e))?;
    let mut out = BufWriter::new(file);
    let mtllib = mtl
        .as_ref()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str());
    write_obj(&mut out, objects, mtllib, materials)
        .and_then(|()| out.flush())
        .map_err(|e| CliError::io(&obj, e))?;

    Ok(ExportedFiles { obj, mtl })
}

/// Write OBJ text. Face groups switch `usemtl` whenever the zone changes.
pub fn write_obj<W: Write>(
    out: &mut W,
    objects: &[ObjObject<'_>],
    mtllib: Option<&str>,
    materials: Option<&ZoneMaterials>,
) -> std::io::Result<()> {
    writeln!(out, "# crater-forge")?;
    if let Some(lib) = mtllib {
        writeln!(out, "mtllib {lib}")?;
    }

    // OBJ indices are 1-based and global across objects.
    let mut v_base = 1usize;
    let mut vt_base = 1usize;

    for object in objects {
        let mesh = object.mesh;
        writeln!(out, "o {}", object.name)?;

        for p in &mesh.positions {
            let p = to_y_up(Vec3::from_array(*p) + object.offset);
            writeln!(out, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z)?;
        }
        for corners in &mesh.uvs {
            for [u, v] in corners {
                writeln!(out, "vt {u:.6} {v:.6}")?;
            }
        }
        for n in mesh.vertex_normals() {
            let n = to_y_up(Vec3::from_array(n));
            writeln!(out, "vn {:.6} {:.6} {:.6}", n.x, n.y, n.z)?;
        }

        let has_uvs = mesh.uvs.len() == mesh.faces.len();
        let mut current: Option<MaterialZone> = None;
        for (i, face) in mesh.faces.iter().enumerate() {
            if let (Some(materials), Some(&zone)) = (materials, mesh.zones.get(i))
                && current != Some(zone)
            {
                writeln!(out, "usemtl {}", materials.get(zone).name)?;
                current = Some(zone);
            }
            write!(out, "f")?;
            for (corner, &index) in face.iter().enumerate() {
                let v = v_base + index as usize;
                if has_uvs {
                    let vt = vt_base + i * 3 + corner;
                    write!(out, " {v}/{vt}/{v}")?;
                } else {
                    write!(out, " {v}//{v}")?;
                }
            }
            writeln!(out)?;
        }

        v_base += mesh.positions.len();
        vt_base += mesh.uvs.len() * 3;
    }
    Ok(())
}

/// Write one `newmtl` block per zone, with the PBR extension keys.
pub fn write_mtl<W: Write>(out: &mut W, materials: &ZoneMaterials) -> std::io::Result<()> {
    writeln!(out, "# crater-forge")?;
    for material in materials.slots() {
        write_material(out, material)?;
    }
    Ok(())
}

fn write_material<W: Write>(out: &mut W, material: &ZoneMaterial) -> std::io::Result<()> {
    let [r, g, b, a] = material.albedo;
    // Blinn-Phong exponent approximating the roughness.
    let shininess = (1.0 - material.roughness).powi(2) * 1000.0;
    writeln!(out)?;
    writeln!(out, "newmtl {}", material.name)?;
    writeln!(out, "Kd {r:.4} {g:.4} {b:.4}")?;
    writeln!(out, "Ka 0.0000 0.0000 0.0000")?;
    writeln!(out, "Ns {shininess:.4}")?;
    writeln!(out, "d {a:.4}")?;
    writeln!(out, "Pr {:.4}", material.roughness)?;
    writeln!(out, "Pm {:.4}", material.metallic)?;
    writeln!(out, "illum 2")?;
    Ok(())
}
