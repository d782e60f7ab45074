use anyhow::{Context, Result, ensure};
use chrono::{DateTime, Utc};
use log::info;

use crate::sim::engine::TransportEngine;
use crate::sim::reactor::runner::RunnerConfig;
use crate::sim::reactor::{ProductivityRecord, evaluate_time_point};
use crate::sim::solar::{Site, SpectralModel, solar_data_for_place_and_time};
use crate::sim::sweep::store::RecordStore;

/// Relative tolerance when deciding which angles share the maximum yearly
/// productivity.
pub const MAX_REL_TOLERANCE: f64 = 1e-6;

/// Configuration of one sweep, assembled once at startup.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub site: Site,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Sampling interval of the time series, seconds.
    pub time_resolution_s: u32,
    /// Photon trials per Monte Carlo run.
    pub num_photons: usize,
    /// Worker count of the inner simulation runner.
    pub workers: usize,
    pub include_dye: bool,
    /// Base RNG seed; worker `i` derives its own stream from `seed + i`.
    pub seed: Option<u64>,
}

impl SweepConfig {
    fn runner_config(&self) -> Result<RunnerConfig> {
        RunnerConfig::new(self.num_photons, self.workers, false, self.seed)
    }
}

/// Evaluates a full time series for one tilt angle and persists it.
///
/// If the artifact for this (site, tilt) pair already exists, the stored
/// series is returned without re-running any simulation, which makes long
/// sweeps resumable at artifact granularity.
pub fn evaluate_tilt_angle(
    tilt_angle: f64,
    config: &SweepConfig,
    model: &dyn SpectralModel,
    engine: &dyn TransportEngine,
    store: &RecordStore,
) -> Result<Vec<ProductivityRecord>> {
    if store.exists(&config.site, tilt_angle) {
        info!(
            "{} at {tilt_angle} deg: artifact exists, resuming from disk",
            config.site.name
        );
        return store.read(&config.site, tilt_angle);
    }

    let runner_config = config.runner_config()?;
    let points = solar_data_for_place_and_time(
        &config.site,
        model,
        tilt_angle,
        config.start,
        config.end,
        config.time_resolution_s,
    )?;

    info!(
        "{} at {tilt_angle} deg: simulating {} daytime points",
        config.site.name,
        points.len()
    );

    let mut records = Vec::with_capacity(points.len());
    for tp in &points {
        let record = evaluate_time_point(tp, tilt_angle, config.include_dye, engine, &runner_config)
            .with_context(|| {
                format!(
                    "tilt {tilt_angle} deg at {} for {}",
                    tp.time, config.site.name
                )
            })?;
        records.push(record);
    }

    // Keep the persisted series chronological even if a future driver
    // completes time points out of order
    records.sort_by_key(|r| r.time);
    store.write(&config.site, tilt_angle, &records)?;
    Ok(records)
}

/// Yearly productivity per tilt angle, normalized against the best angle.
#[derive(Debug, Clone)]
pub struct AngleProductivityCurve {
    pub angles: Vec<f64>,
    /// Yearly sums of `direct_reacted + diffuse_reacted` per angle.
    pub yearly_totals: Vec<f64>,
    /// Totals divided by the maximum (1.0 at the best angle).
    pub normalized: Vec<f64>,
    /// All angles within `MAX_REL_TOLERANCE` of the maximum.
    pub best_angles: Vec<f64>,
}

impl AngleProductivityCurve {
    fn from_totals(angles: Vec<f64>, yearly_totals: Vec<f64>) -> Self {
        let max = yearly_totals.iter().cloned().fold(f64::MIN, f64::max);
        let normalized = if max > 0.0 {
            yearly_totals.iter().map(|&t| t / max).collect()
        } else {
            vec![0.0; yearly_totals.len()]
        };
        let best_angles = angles
            .iter()
            .zip(&yearly_totals)
            .filter(|(_, &t)| max > 0.0 && t >= max * (1.0 - MAX_REL_TOLERANCE))
            .map(|(&a, _)| a)
            .collect();
        Self {
            angles,
            yearly_totals,
            normalized,
            best_angles,
        }
    }
}

/// Sweeps a list of tilt angles and reports the productivity-maximizing
/// one(s).
pub fn sweep_tilt_angles(
    tilt_angles: &[f64],
    config: &SweepConfig,
    model: &dyn SpectralModel,
    engine: &dyn TransportEngine,
    store: &RecordStore,
) -> Result<AngleProductivityCurve> {
    ensure!(!tilt_angles.is_empty(), "no tilt angles to sweep");

    let mut yearly_totals = Vec::with_capacity(tilt_angles.len());
    for &tilt_angle in tilt_angles {
        let records = evaluate_tilt_angle(tilt_angle, config, model, engine, store)?;
        let total: f64 = records
            .iter()
            .map(|r| r.direct_reacted + r.diffuse_reacted)
            .sum();
        info!(
            "{} at {tilt_angle} deg: yearly total {total:.6e} mol/m2",
            config.site.name
        );
        yearly_totals.push(total);
    }

    Ok(AngleProductivityCurve::from_totals(
        tilt_angles.to_vec(),
        yearly_totals,
    ))
}
