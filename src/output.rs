use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Writes the three per-refinement output files into one directory.
///
/// Each refinement rewrites all three, so the files always describe the most
/// recent refinement: `wl_dos_bins.dat` (B+1 bin edges), `wl_dos.dat`
/// (stitched global log-DoS, B values), `wl_hist.dat` (root histogram
/// snapshot, B values). One value per line.
pub struct DosWriter {
    dir: PathBuf,
}

impl DosWriter {
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn write_bins(&self, edges: &[f64]) -> io::Result<()> {
        self.write_array("wl_dos_bins.dat", edges)
    }

    pub fn write_dos(&self, dos: &[f64]) -> io::Result<()> {
        self.write_array("wl_dos.dat", dos)
    }

    pub fn write_hist(&self, hist: &[f64]) -> io::Result<()> {
        self.write_array("wl_hist.dat", hist)
    }

    fn write_array(&self, name: &str, values: &[f64]) -> io::Result<()> {
        let mut w = BufWriter::new(File::create(self.dir.join(name))?);
        for v in values {
            writeln!(w, "{v:.12e}")?;
        }
        w.flush()
    }
}
