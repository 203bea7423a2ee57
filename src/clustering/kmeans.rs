//! Basic k-means over dense embeddings

use crate::HelpdeskError;
use crate::Result;

/// Cluster labels plus the final centroids
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansResult {
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f32>>,
    pub iterations: usize,
}

/// Lloyd's k-means with Euclidean distance.
///
/// Seeding is farthest-first from the first point, so the result is
/// deterministic for a given input order.
pub fn k_means(points: &[Vec<f32>], k: usize, max_iterations: usize) -> Result<KMeansResult> {
    if k == 0 {
        return Err(HelpdeskError::ClusteringError(
            "k must be at least 1".to_string(),
        ));
    }
    if points.len() < k {
        return Err(HelpdeskError::ClusteringError(format!(
            "Need at least {k} points, got {}",
            points.len()
        )));
    }

    let dim = points[0].len();
    if points.iter().any(|p| p.len() != dim) {
        return Err(HelpdeskError::ClusteringError(
            "All points must have the same dimension".to_string(),
        ));
    }

    let mut centroids = farthest_first_seeds(points, k);
    let mut labels: Vec<usize> = vec![usize::MAX; points.len()];
    let mut iterations = 0;

    for _ in 0..max_iterations.max(1) {
        iterations += 1;

        let mut changed = false;
        for (i, point) in points.iter().enumerate() {
            let best = nearest_centroid(point, &centroids);
            if labels[i] != best {
                labels[i] = best;
                changed = true;
            }
        }

        if !changed {
            break;
        }

        let mut sums: Vec<Vec<f32>> = vec![vec![0.0; dim]; k];
        let mut counts: Vec<usize> = vec![0; k];
        for (point, &label) in points.iter().zip(&labels) {
            counts[label] += 1;
            for (sum, value) in sums[label].iter_mut().zip(point) {
                *sum += value;
            }
        }

        for c in 0..k {
            if counts[c] > 0 {
                for (centroid, sum) in centroids[c].iter_mut().zip(&sums[c]) {
                    *centroid = sum / counts[c] as f32;
                }
            }
            // An emptied cluster keeps its previous centroid
        }
    }

    Ok(KMeansResult {
        labels,
        centroids,
        iterations,
    })
}

fn farthest_first_seeds(points: &[Vec<f32>], k: usize) -> Vec<Vec<f32>> {
    let mut seeds = vec![points[0].clone()];
    let mut nearest: Vec<f32> = points
        .iter()
        .map(|p| squared_distance(p, &points[0]))
        .collect();

    while seeds.len() < k {
        let next = nearest
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1).then(b.0.cmp(&a.0)))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let seed = points[next].clone();
        for (d, p) in nearest.iter_mut().zip(points) {
            *d = d.min(squared_distance(p, &seed));
        }
        seeds.push(seed);
    }

    seeds
}

fn nearest_centroid(point: &[f32], centroids: &[Vec<f32>]) -> usize {
    centroids
        .iter()
        .enumerate()
        .map(|(ci, c)| (ci, squared_distance(point, c)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(ci, _)| ci)
        .unwrap_or(0)
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
