//! Raw binary dumps and GrADS visualization files.
//!
//! `dump2db` appends arrays in the build precision with native byte order,
//! which is what the generated `.ctl` descriptors tell GrADS to read.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::field::Real;

/// Append the centred `dst_nx × dst_ny` crop of a row-major `src_nx × src_ny`
/// array to `path`, creating the file if needed.
pub fn dump2db(
    path: &Path,
    dst_nx: usize,
    dst_ny: usize,
    src: &[Real],
    src_nx: usize,
    src_ny: usize,
) -> io::Result<()> {
    if dst_nx > src_nx || dst_ny > src_ny {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("crop {dst_nx}x{dst_ny} does not fit in {src_nx}x{src_ny}"),
        ));
    }
    if src.len() < src_nx * src_ny {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "source holds {} values, expected {src_nx}x{src_ny}",
                src.len()
            ),
        ));
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    let offset_x = (src_nx - dst_nx) / 2;
    let offset_y = (src_ny - dst_ny) / 2;
    for j in 0..dst_ny {
        let start = (offset_y + j) * src_nx + offset_x;
        for value in &src[start..start + dst_nx] {
            writer.write_all(&value.to_ne_bytes())?;
        }
    }
    writer.flush()
}

/// Truncate `path` and write the full array, as a fresh single-record dump.
pub fn dump_fresh(path: &Path, data: &[Real], nx: usize, ny: usize) -> io::Result<()> {
    File::create(path)?;
    dump2db(path, nx, ny, data, nx, ny)
}

fn sibling(dir: &Path, name: &str, ext: &str) -> PathBuf {
    dir.join(format!("{name}.{ext}"))
}

/// GrADS data descriptor for `{name}.bin`.
pub fn write_grads_ctl(dir: &Path, name: &str, nx: usize, ny: usize) -> io::Result<PathBuf> {
    let path = sibling(dir, name, "ctl");
    let body = format!(
        "DSET {name}.bin\n\
         XDEF {nx} LINEAR 0 1\n\
         YDEF {ny} LINEAR 0 1\n\
         ZDEF 1 LINEAR 0 1\n\
         EDEF 1 NAMES c\n\
         TDEF 4001 LINEAR 18:00Z04jul2000 1hr\n\
         UNDEF 1E+300\n\
         VARS 1\n\
         c 1 -1 source\n\
         ENDVARS\n"
    );
    fs::write(&path, body)?;
    Ok(path)
}

/// GrADS script rendering `nt` time steps to `{name}_NNNN.png`.
pub fn write_grads_gs(
    dir: &Path,
    name: &str,
    nx: usize,
    ny: usize,
    nt: usize,
) -> io::Result<PathBuf> {
    let path = sibling(dir, name, "gs");
    let mut out = format!("'open '\"{name}.ctl\"\n");
    for step in 0..nt {
        out.push_str("'set parea '0.5' '10.5' '1.5' '7.5\n");
        out.push_str(&format!("'set xaxis '0' '{nx}' '{}\n", nx / 16));
        out.push_str(&format!("'set yaxis '0' '{ny}' '{}\n", ny / 16));
        out.push_str("'set mproj 'off\n");
        out.push_str("'set mpdraw 'off\n");
        out.push_str("'set gxout 'shaded\n");
        out.push_str(&format!(
            "'set clevs -'{:.6}' -'{:.6}' -'{:.6}' -'{:.6}' -'{:.6}'",
            1.0, 0.8, 0.6, 0.4, 0.2
        ));
        out.push_str(&format!(
            "'{:.6}' '{:.6}' '{:.6}' '{:.6}' '{:.6}' '{:.6}\n",
            0.0, 0.2, 0.4, 0.6, 0.8, 1.0
        ));
        out.push_str(&format!("'set t '{}\n", step + 1));
        out.push_str("'display 'c\n");
        out.push_str(&format!(
            "'draw title '\"Source in {name} flow - step {step:04}\"\n"
        ));
        out.push_str("'run 'cbarm.gs\n");
        out.push_str(&format!(
            "'printim '\"{name}_{step:04}.png\"' 'png' 'x800' 'y1024\n"
        ));
        out.push_str("'clear 'graphics\n");
    }
    fs::write(&path, out)?;
    Ok(path)
}

/// Perl launcher running the `.gs` script in batch GrADS.
pub fn write_grads_pl(dir: &Path, name: &str) -> io::Result<PathBuf> {
    let path = sibling(dir, name, "pl");
    let body = format!("#!/usr/bin/perl -w\nsystem(\"grads -lbxc \\\"run {name}.gs\\\"\");\n");
    fs::write(&path, body)?;
    Ok(path)
}

/// Descriptor, script and launcher for a single-step `nx × ny` dump.
pub fn write_grads_bundle(dir: &Path, name: &str, nx: usize, ny: usize) -> io::Result<()> {
    write_grads_ctl(dir, name, nx, ny)?;
    write_grads_gs(dir, name, nx, ny, 1)?;
    write_grads_pl(dir, name)?;
    Ok(())
}
