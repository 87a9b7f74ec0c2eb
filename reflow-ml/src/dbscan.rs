//! Density-based clustering and the cluster-distance scorer
//!
//! DBSCAN groups points that have at least `min_samples` neighbours (self
//! included) within `eps`. Points reachable from no core point are noise.
//! The scorer keeps one centroid per cluster and flags a query whose distance
//! to the nearest centroid exceeds a fixed threshold. All distances are in the
//! standardized space fitted on the training corpus.
//!
//! A corpus with no dense region cannot be scored this way, so fitting fails
//! instead of inventing a centroid.

use std::collections::VecDeque;

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use reflow_core::constants::thresholds::{CLUSTER_DISTANCE_THRESHOLD, DBSCAN_EPS, DBSCAN_MIN_SAMPLES};

use crate::errors::{matrix_width, MlError, MlResult};
use crate::scaler::StandardScaler;
use crate::stats::{column, euclidean, mean};

/// DBSCAN and distance-threshold settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Neighbourhood radius
    pub eps: f64,
    /// Neighbourhood size for a core point, self included
    pub min_samples: usize,
    /// Centroid distance above which a query is anomalous
    pub distance_threshold: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            eps: DBSCAN_EPS,
            min_samples: DBSCAN_MIN_SAMPLES,
            distance_threshold: CLUSTER_DISTANCE_THRESHOLD,
        }
    }
}

/// Cluster label per point; `None` is noise
pub fn dbscan(points: &[Vec<f64>], eps: f64, min_samples: usize) -> Vec<Option<usize>> {
    let neighbours: Vec<Vec<usize>> = points
        .par_iter()
        .map(|p| {
            points
                .iter()
                .enumerate()
                .filter(|(_, q)| euclidean(p, q) <= eps)
                .map(|(j, _)| j)
                .collect()
        })
        .collect();

    let is_core = |i: usize| neighbours[i].len() >= min_samples;
    let mut labels: Vec<Option<usize>> = vec![None; points.len()];
    let mut cluster = 0;

    for start in 0..points.len() {
        if labels[start].is_some() || !is_core(start) {
            continue;
        }

        labels[start] = Some(cluster);
        let mut queue: VecDeque<usize> = neighbours[start].iter().copied().collect();
        while let Some(i) = queue.pop_front() {
            if labels[i].is_some() {
                continue;
            }
            labels[i] = Some(cluster);
            if is_core(i) {
                queue.extend(neighbours[i].iter().copied().filter(|&j| labels[j].is_none()));
            }
        }
        cluster += 1;
    }

    labels
}

/// Centroid-distance anomaly scorer
#[derive(Debug, Clone)]
pub struct ClusterScorer {
    scaler: StandardScaler,
    centroids: Vec<Vec<f64>>,
    config: ClusterConfig,
}

impl ClusterScorer {
    /// Cluster the standardized corpus and keep the non-noise centroids
    ///
    /// Fails with [`MlError::NoDenseCluster`] when every point is noise.
    pub fn fit(rows: &[Vec<f64>], scaler: StandardScaler, config: ClusterConfig) -> MlResult<Self> {
        let width = matrix_width(rows)?;
        if width != scaler.width() {
            return Err(MlError::DimensionMismatch {
                expected: scaler.width(),
                actual: width,
            });
        }

        let scaled = scaler.transform_all(rows)?;
        let labels = dbscan(&scaled, config.eps, config.min_samples);
        let clusters = labels.iter().flatten().max().map_or(0, |m| m + 1);

        let centroids: Vec<Vec<f64>> = (0..clusters)
            .map(|c| {
                let members: Vec<Vec<f64>> = scaled
                    .iter()
                    .zip(&labels)
                    .filter(|(_, l)| **l == Some(c))
                    .map(|(p, _)| p.clone())
                    .collect();
                (0..width).map(|j| mean(&column(&members, j))).collect()
            })
            .collect();

        if centroids.is_empty() {
            return Err(MlError::NoDenseCluster {
                samples: rows.len(),
                eps: config.eps,
                min_samples: config.min_samples,
            });
        }
        debug!(
            "DBSCAN: {} clusters, {} noise points of {}",
            centroids.len(),
            labels.iter().filter(|l| l.is_none()).count(),
            rows.len()
        );

        Ok(Self {
            scaler,
            centroids,
            config,
        })
    }

    /// Distance from a raw row to the nearest centroid
    pub fn distance(&self, row: &[f64]) -> MlResult<f64> {
        let scaled = self.scaler.transform(row)?;
        Ok(self
            .centroids
            .iter()
            .map(|c| euclidean(&scaled, c))
            .fold(f64::INFINITY, f64::min))
    }

    /// True when the nearest centroid is farther than the threshold
    pub fn is_anomaly(&self, distance: f64) -> bool {
        distance > self.config.distance_threshold
    }

    /// Centroids in standardized space
    pub fn centroids(&self) -> &[Vec<f64>] {
        &self.centroids
    }

    /// Frozen training scaler
    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }
}
