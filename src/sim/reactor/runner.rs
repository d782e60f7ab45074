use anyhow::{Result, ensure};
use log::debug;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;

use crate::sim::engine::{TerminalEvent, TransportEngine};
use crate::sim::reactor::scene::Scene;

/// Validated Monte Carlo run configuration.
///
/// Invalid combinations are rejected at construction time, before any
/// simulation starts.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    num_photons: usize,
    workers: usize,
    render: bool,
    seed: Option<u64>,
}

impl RunnerConfig {
    pub fn new(num_photons: usize, workers: usize, render: bool, seed: Option<u64>) -> Result<Self> {
        ensure!(num_photons > 0, "num_photons must be positive");
        ensure!(workers >= 1, "at least one worker is required");
        ensure!(
            !(render && workers > 1),
            "rendering is incompatible with {workers} workers; use workers = 1"
        );
        Ok(Self {
            num_photons,
            workers,
            render,
            seed,
        })
    }

    pub fn num_photons(&self) -> usize {
        self.num_photons
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Same run parameters with `salt` mixed into the seed.
    ///
    /// Callers executing many simulations off one config derive a distinct
    /// stream per run this way instead of replaying the base seed. A salt of
    /// zero leaves the seed unchanged; an unseeded config stays unseeded.
    pub fn with_seed_salt(&self, salt: u64) -> Self {
        let mut config = self.clone();
        config.seed = self.seed.map(|s| s ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        config
    }
}

/// Terminal-event tally across one run. Always present in the result, even
/// when every count except one is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventCounts {
    counts: [usize; TerminalEvent::ALL.len()],
}

impl EventCounts {
    fn record(&mut self, event: TerminalEvent) {
        self.counts[event.index()] += 1;
    }

    pub fn get(&self, event: TerminalEvent) -> usize {
        self.counts[event.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Result of one Monte Carlo run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// `count(REACT) / num_photons`, in [0, 1].
    pub reacted_fraction: f64,
    pub num_photons: usize,
    pub event_counts: EventCounts,
}

impl SimulationResult {
    fn from_events(events: &[TerminalEvent], num_photons: usize) -> Self {
        let mut event_counts = EventCounts::default();
        for &event in events {
            event_counts.record(event);
        }
        Self {
            reacted_fraction: event_counts.get(TerminalEvent::React) as f64 / num_photons as f64,
            num_photons,
            event_counts,
        }
    }
}

/// Executes `num_photons` independent photon trials against the scene and
/// reduces them to a reacted-fraction estimate.
///
/// The estimator is unbiased with standard error O(1/sqrt(num_photons)).
/// With `workers > 1` the trials are partitioned across a rayon pool; every
/// worker draws from its own RNG stream (`seed + worker index` when a seed
/// is configured, an entropy-seeded stream otherwise), so sibling workers
/// never share generator state.
pub fn run(scene: &Scene, engine: &dyn TransportEngine, config: &RunnerConfig) -> SimulationResult {
    let events = if config.workers == 1 {
        let mut rng = worker_rng(config.seed, 0);
        run_worker(scene, engine, &mut rng, config.num_photons, config.render)
    } else {
        let counts = partition(config.num_photons, config.workers);
        (0..config.workers)
            .into_par_iter()
            .flat_map(|i| {
                let mut rng = worker_rng(config.seed, i as u64);
                run_worker(scene, engine, &mut rng, counts[i], false)
            })
            .collect()
    };

    SimulationResult::from_events(&events, config.num_photons)
}

fn worker_rng(seed: Option<u64>, worker_index: u64) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s.wrapping_add(worker_index)),
        None => StdRng::from_entropy(),
    }
}

fn run_worker(
    scene: &Scene,
    engine: &dyn TransportEngine,
    rng: &mut dyn RngCore,
    num_photons: usize,
    render: bool,
) -> Vec<TerminalEvent> {
    let mut events = Vec::with_capacity(num_photons);
    for i in 0..num_photons {
        let photon = scene.sampler().sample(rng);
        let event = engine.trace(scene, &photon, rng);
        if render {
            debug!(
                "photon {i}: {:.1} nm from {} -> {:?}",
                photon.wavelength, photon.position, event
            );
        }
        events.push(event);
    }
    events
}

/// Splits `total` trials across `workers` as evenly as possible.
fn partition(total: usize, workers: usize) -> Vec<usize> {
    let base = total / workers;
    let extra = total % workers;
    (0..workers)
        .map(|i| if i < extra { base + 1 } else { base })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::engine::slab::SlabEngine;
    use crate::sim::reactor::samplers::FixedDirectSampler;
    use crate::sim::solar::spectral::wavelength_grid;
    use crate::sim::spectrum::SpectralDistribution;

    fn scene(include_dye: bool) -> Scene {
        let grid = wavelength_grid();
        let intensities = grid.iter().map(|_| 1.0).collect();
        let spectrum = SpectralDistribution::new(grid, intensities).unwrap();
        let sampler = FixedDirectSampler::new(spectrum, 60.0, 180.0, 30.0).unwrap();
        Scene::build(30.0, Box::new(sampler), include_dye, true).unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(RunnerConfig::new(0, 1, false, None).is_err());
        assert!(RunnerConfig::new(100, 0, false, None).is_err());
        assert!(RunnerConfig::new(100, 2, true, None).is_err());
        assert!(RunnerConfig::new(100, 1, true, None).is_ok());
        assert!(RunnerConfig::new(100, 4, false, Some(7)).is_ok());
    }

    #[test]
    fn test_partition_covers_all_photons() {
        assert_eq!(partition(10, 3), vec![4, 3, 3]);
        assert_eq!(partition(9, 3), vec![3, 3, 3]);
        assert_eq!(partition(2, 4), vec![1, 1, 0, 0]);
        for (total, workers) in [(1, 1), (1000, 7), (5, 8)] {
            assert_eq!(partition(total, workers).iter().sum::<usize>(), total);
        }
    }

    #[test]
    fn test_fraction_bounds() {
        let s = scene(true);
        let engine = SlabEngine::new();
        for n in [1, 10, 500] {
            let config = RunnerConfig::new(n, 1, false, Some(1)).unwrap();
            let result = run(&s, &engine, &config);
            assert!((0.0..=1.0).contains(&result.reacted_fraction));
            assert_eq!(result.event_counts.total(), n);
        }
    }

    #[test]
    fn test_seeded_run_is_reproducible() {
        let s = scene(true);
        let engine = SlabEngine::new();
        let config = RunnerConfig::new(2000, 1, false, Some(99)).unwrap();
        let a = run(&s, &engine, &config);
        let b = run(&s, &engine, &config);
        assert_eq!(a.reacted_fraction, b.reacted_fraction);
        assert_eq!(
            a.event_counts.get(TerminalEvent::Transmit),
            b.event_counts.get(TerminalEvent::Transmit)
        );
    }

    #[test]
    fn test_seed_salt_derives_distinct_streams() {
        let base = RunnerConfig::new(100, 1, false, Some(7)).unwrap();
        let a = base.with_seed_salt(1);
        let b = base.with_seed_salt(2);
        assert_ne!(a.seed(), b.seed());
        assert_ne!(a.seed(), base.seed());
        // Zero salt and unseeded configs are passthroughs
        assert_eq!(base.with_seed_salt(0).seed(), Some(7));
        let unseeded = RunnerConfig::new(100, 1, false, None).unwrap();
        assert_eq!(unseeded.with_seed_salt(9).seed(), None);
    }

    #[test]
    fn test_worker_streams_are_independent() {
        // Adjacent worker seeds must not replay the same draws
        let mut a = worker_rng(Some(5), 0);
        let mut b = worker_rng(Some(5), 1);
        let draws_a: Vec<u32> = (0..8).map(|_| a.next_u32()).collect();
        let draws_b: Vec<u32> = (0..8).map(|_| b.next_u32()).collect();
        assert_ne!(draws_a, draws_b);
    }

    #[test]
    fn test_parallel_matches_sequential_statistically() {
        let s = scene(true);
        let engine = SlabEngine::new();
        let seq = run(&s, &engine, &RunnerConfig::new(5000, 1, false, Some(1)).unwrap());
        let par = run(&s, &engine, &RunnerConfig::new(5000, 4, false, Some(2)).unwrap());
        assert!(
            (seq.reacted_fraction - par.reacted_fraction).abs() < 0.05,
            "sequential {} vs parallel {}",
            seq.reacted_fraction,
            par.reacted_fraction
        );
    }

    #[test]
    fn test_convergence_between_runs() {
        let s = scene(true);
        let engine = SlabEngine::new();
        let a = run(&s, &engine, &RunnerConfig::new(5000, 1, false, None).unwrap());
        let b = run(&s, &engine, &RunnerConfig::new(5000, 1, false, None).unwrap());
        assert!(
            (a.reacted_fraction - b.reacted_fraction).abs() < 0.05,
            "runs differ too much: {} vs {}",
            a.reacted_fraction,
            b.reacted_fraction
        );
    }

    #[test]
    fn test_dye_scene_beats_no_dye() {
        let engine = SlabEngine::new();
        let config = RunnerConfig::new(5000, 1, false, Some(3)).unwrap();
        let with_dye = run(&scene(true), &engine, &config);
        let without = run(&scene(false), &engine, &config);
        assert!(with_dye.reacted_fraction > without.reacted_fraction);
    }
}
