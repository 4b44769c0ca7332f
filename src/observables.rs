//! Physical observables of a solved model
//!
//! Every quantity is an expectation value in the solved relaxation, so
//! evaluating one solves the model first if needed.

use crate::algebra::{Monomial, Operator, Polynomial};
use crate::error::{SdpError, SdpResult};
use crate::model::LatticeModel;
use std::f64::consts::PI;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// A quantity reported by `write_data`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observable {
    Gtwo,
    DensityDensity,
    MomentumDistribution,
    ParticleNumber,
    Magnetization,
    Primal,
    Dual,
}

impl Observable {
    /// File name stem of the output file
    pub fn stem(&self) -> &'static str {
        match self {
            Self::Gtwo => "gtwo",
            Self::DensityDensity => "density_density_corr",
            Self::MomentumDistribution => "momentum_distr",
            Self::ParticleNumber => "particle_number",
            Self::Magnetization => "magnetization",
            Self::Primal => "primal",
            Self::Dual => "dual",
        }
    }
}

impl fmt::Display for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stem())
    }
}

fn require_chain(model: &LatticeModel, what: &str) -> SdpResult<()> {
    if model.lattice().is_one_dimensional() {
        Ok(())
    } else {
        Err(SdpError::unsupported(format!(
            "{} beyond one dimension",
            what
        )))
    }
}

/// Connected correlation `<n_a n_b> - <n_a><n_b>`
fn connected(model: &mut LatticeModel, a: usize, b: usize) -> SdpResult<f64> {
    let lattice = model.lattice().clone();
    let n_a = model.strategy().site_density(&lattice, a);
    let n_b = model.strategy().site_density(&lattice, b);
    let joint = model.expectation(&(&n_a * &n_b))?;
    Ok(joint - model.expectation(&n_a)? * model.expectation(&n_b)?)
}

/// Density-density correlation averaged over the chain, for every distance
pub fn density_density_correlations(model: &mut LatticeModel) -> SdpResult<Vec<f64>> {
    require_chain(model, "density-density correlations")?;
    let length = model.lattice().length();
    let closed = !model.lattice().boundary().is_open();

    let mut values = Vec::with_capacity(length);
    for r in 0..length {
        let mut sum = 0.0;
        for l in 0..length {
            if !closed && l + r >= length {
                break;
            }
            sum += connected(model, (l + r) % length, l)?;
        }
        values.push(sum / length as f64);
    }
    Ok(values)
}

/// Density correlation of every site with the first one
pub fn gtwo(model: &mut LatticeModel) -> SdpResult<Vec<f64>> {
    require_chain(model, "g2")?;
    let length = model.lattice().length();
    (0..length).map(|r| connected(model, r, 0)).collect()
}

/// Occupation of the momenta `2 pi m / L`, `m` from `-L/2` to `L/2`
pub fn momentum_distribution(model: &mut LatticeModel) -> SdpResult<Vec<f64>> {
    require_chain(model, "momentum distribution")?;
    let length = model.lattice().length();
    let half = (length / 2) as i64;

    let mut correlations = vec![vec![0.0; length]; length];
    for (j, row) in correlations.iter_mut().enumerate() {
        for (l, value) in row.iter_mut().enumerate() {
            let hop = Monomial::new(vec![Operator::creator(j), Operator::annihilator(l)]);
            *value = model.expectation(&hop.into())?;
        }
    }

    let values = (-half..=half)
        .map(|m| {
            let k = 2.0 * PI * m as f64 / length as f64;
            let mut sum = 0.0;
            for (j, row) in correlations.iter().enumerate() {
                for (l, value) in row.iter().enumerate() {
                    sum += (k * (j as f64 - l as f64)).cos() * value;
                }
            }
            sum / length as f64
        })
        .collect();
    Ok(values)
}

pub fn particle_number(model: &mut LatticeModel) -> SdpResult<f64> {
    let lattice = model.lattice().clone();
    let total: Polynomial = (0..lattice.sites())
        .map(|site| model.strategy().site_density(&lattice, site))
        .sum();
    model.expectation(&total)
}

pub fn magnetization(model: &mut LatticeModel) -> SdpResult<f64> {
    let lattice = model.lattice().clone();
    let polarization = model.strategy().spin_polarization(&lattice)?;
    model.expectation(&polarization)
}

/// Values of one observable as a CSV row
pub fn evaluate(model: &mut LatticeModel, observable: Observable) -> SdpResult<Vec<f64>> {
    match observable {
        Observable::Gtwo => gtwo(model),
        Observable::DensityDensity => density_density_correlations(model),
        Observable::MomentumDistribution => momentum_distribution(model),
        Observable::ParticleNumber => Ok(vec![particle_number(model)?]),
        Observable::Magnetization => Ok(vec![magnetization(model)?]),
        Observable::Primal => Ok(vec![model.primal()?]),
        Observable::Dual => Ok(vec![model.dual()?]),
    }
}

/// Path of the CSV file for `observable`
pub fn data_path(dir: &Path, observable: Observable, full_fingerprint: &str) -> PathBuf {
    dir.join(format!("{}{}.csv", observable.stem(), full_fingerprint))
}

/// Write every observable the model declares, one CSV row per file
pub fn write_data(model: &mut LatticeModel, dir: &Path) -> SdpResult<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| SdpError::io(format!("creating {}", dir.display()), e))?;
    let full = model.fingerprints().full;

    let mut written = Vec::new();
    for &observable in model.strategy().observables() {
        let values = evaluate(model, observable)?;
        let path = data_path(dir, observable, &full);

        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(values.iter().map(f64::to_string))?;
        writer
            .flush()
            .map_err(|e| SdpError::io(format!("writing {}", path.display()), e))?;

        info!("Wrote {} to {}", observable, path.display());
        written.push(path);
    }
    Ok(written)
}
