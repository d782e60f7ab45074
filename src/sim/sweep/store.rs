use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use crate::sim::reactor::ProductivityRecord;
use crate::sim::solar::Site;

/// Durable storage for per-(site, tilt) productivity time series.
///
/// One CSV artifact per configuration. Writes go through a temporary file
/// followed by an atomic rename, so an interrupted run never corrupts an
/// already-completed artifact.
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create artifact directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Artifact path for one (site, tilt) configuration.
    pub fn path_for(&self, site: &Site, tilt_angle: f64) -> PathBuf {
        self.dir
            .join(format!("{}_{}deg_results.csv", site.slug(), format_angle(tilt_angle)))
    }

    pub fn exists(&self, site: &Site, tilt_angle: f64) -> bool {
        self.path_for(site, tilt_angle).exists()
    }

    pub fn write(&self, site: &Site, tilt_angle: f64, records: &[ProductivityRecord]) -> Result<()> {
        let path = self.path_for(site, tilt_angle);
        let tmp = path.with_extension("csv.tmp");

        {
            let mut writer = csv::Writer::from_path(&tmp)
                .with_context(|| format!("cannot open {}", tmp.display()))?;
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }

        fs::rename(&tmp, &path)
            .with_context(|| format!("cannot persist artifact {}", path.display()))?;
        debug!("wrote {} records to {}", records.len(), path.display());
        Ok(())
    }

    pub fn read(&self, site: &Site, tilt_angle: f64) -> Result<Vec<ProductivityRecord>> {
        let path = self.path_for(site, tilt_angle);
        let mut reader = csv::Reader::from_path(&path)
            .with_context(|| format!("cannot open artifact {}", path.display()))?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: ProductivityRecord =
                row.with_context(|| format!("malformed row in {}", path.display()))?;
            records.push(record);
        }
        Ok(records)
    }
}

/// Angle as it appears in artifact names: integral angles bare, fractional
/// ones with the dot replaced.
fn format_angle(tilt_angle: f64) -> String {
    if tilt_angle.fract() == 0.0 {
        format!("{tilt_angle:.0}")
    } else {
        format!("{tilt_angle}").replace('.', "p")
    }
}
