//! Zheng et al. (2007) halo occupation model
//!
//! Centrals: `<Ncen> = 0.5 * (1 + erf((log10 M - logMmin) / sigma_logM))`,
//! drawn per halo as a Bernoulli trial and placed at the halo center.
//!
//! Satellites: `<Nsat> = ((M - M0) / M1)^alpha * <Ncen>` for `M > M0`,
//! drawn per halo from a Poisson distribution and placed on an NFW profile
//! inside the halo boundary radius.
//!
//! The galaxy table lists every central before any satellite.

use crate::error::{ModelError, ModelResult};
use crate::halo::HaloTable;
use crate::provider::{ModelAttrs, ModelProvider, OccupationModel, PopulateRequest};
use crate::sampling::{erf, nfw_radius_fraction, poisson, standard_normal, unit_vector};
use hodmock_core::{Column, ColumnData, ModelParameters, RowSet, Value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::iter;
use tracing::debug;

/// Model name
pub const MODEL_NAME: &str = "zheng07";

/// Recognized parameters, all required
pub const PARAMETER_NAMES: &[&str] = &["logMmin", "sigma_logM", "alpha", "logM0", "logM1"];

const DEFAULTS: [(&str, f64); 5] = [
    ("logMmin", 13.031),
    ("sigma_logM", 0.38),
    ("alpha", 0.76),
    ("logM0", 13.27),
    ("logM1", 14.08),
];

/// Most galaxies a single population call may produce
pub const MAX_GALAXIES: usize = 1 << 27;

/// Halo column holding the NFW concentration, used when present
pub const NFW_CONCENTRATION: &str = "halo_nfw_conc";
/// Halo column holding the particle count, used for the minimum-particle cut
pub const NUM_PARTICLES: &str = "halo_num_ptcl";
/// Halo column holding the 3D velocity dispersion
pub const VELOCITY_DISPERSION: &str = "halo_vrms";

const POSITION_KEYS: [&str; 3] = ["halo_x", "halo_y", "halo_z"];
const VELOCITY_KEYS: [&str; 3] = ["halo_vx", "halo_vy", "halo_vz"];
const GALAXY_POSITION: [&str; 3] = ["x", "y", "z"];
const GALAXY_VELOCITY: [&str; 3] = ["vx", "vy", "vz"];

/// Galaxy type column
pub const GAL_TYPE: &str = "gal_type";
/// `gal_type` label for centrals
pub const CENTRALS: &str = "centrals";
/// `gal_type` label for satellites
pub const SATELLITES: &str = "satellites";

/// Builds [`Zheng07`] models
#[derive(Debug, Clone, Copy, Default)]
pub struct Zheng07Provider;

impl ModelProvider for Zheng07Provider {
    fn name(&self) -> &str {
        MODEL_NAME
    }

    fn parameter_names(&self) -> &[&'static str] {
        PARAMETER_NAMES
    }

    fn default_parameters(&self) -> ModelParameters {
        DEFAULTS.iter().copied().collect()
    }

    fn make_model(&self, attrs: &ModelAttrs) -> ModelResult<Box<dyn OccupationModel>> {
        Ok(Box::new(Zheng07::new(attrs.clone())))
    }
}

/// Dutton & Maccio (2014) concentration-mass relation
///
/// `mass` in Msun/h.
pub fn dutton_maccio14(mass: f64, redshift: f64) -> f64 {
    let a = 0.520 + (0.905 - 0.520) * (-0.617 * redshift.powf(1.21)).exp();
    let b = -0.101 + 0.026 * redshift;
    10f64.powf(a + b * (mass / 1e12).log10())
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Occupation {
    log_mmin: f64,
    sigma_log_m: f64,
    alpha: f64,
    log_m0: f64,
    log_m1: f64,
}

impl Occupation {
    fn from_store(store: &ModelParameters) -> ModelResult<Self> {
        let get = |name: &str| {
            store.get(name).ok_or_else(|| ModelError::UnboundParameter {
                model: MODEL_NAME.to_string(),
                name: name.to_string(),
            })
        };
        let occupation = Self {
            log_mmin: get("logMmin")?,
            sigma_log_m: get("sigma_logM")?,
            alpha: get("alpha")?,
            log_m0: get("logM0")?,
            log_m1: get("logM1")?,
        };
        let values = [
            ("logMmin", occupation.log_mmin),
            ("sigma_logM", occupation.sigma_log_m),
            ("alpha", occupation.alpha),
            ("logM0", occupation.log_m0),
            ("logM1", occupation.log_m1),
        ];
        if let Some((name, value)) = values.into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(ModelError::InvalidParameter {
                name: name.to_string(),
                value,
                reason: "must be finite".to_string(),
            });
        }
        if !(occupation.sigma_log_m > 0.0) {
            return Err(ModelError::InvalidParameter {
                name: "sigma_logM".to_string(),
                value: occupation.sigma_log_m,
                reason: "must be positive".to_string(),
            });
        }
        Ok(occupation)
    }

    fn mean_centrals(&self, mass: f64) -> f64 {
        if !(mass > 0.0) {
            return 0.0;
        }
        0.5 * (1.0 + erf((mass.log10() - self.log_mmin) / self.sigma_log_m))
    }

    fn mean_satellites(&self, mass: f64) -> f64 {
        let m0 = 10f64.powf(self.log_m0);
        if !(mass > m0) {
            return 0.0;
        }
        ((mass - m0) / 10f64.powf(self.log_m1)).powf(self.alpha) * self.mean_centrals(mass)
    }
}

/// Zheng07 occupation model bound to one catalog
#[derive(Debug, Clone)]
pub struct Zheng07 {
    attrs: ModelAttrs,
    params: ModelParameters,
}

impl Zheng07 {
    /// Model with an empty parameter store
    pub fn new(attrs: ModelAttrs) -> Self {
        Self {
            attrs,
            params: ModelParameters::new(),
        }
    }

    /// Currently bound parameters
    pub fn parameters(&self) -> &ModelParameters {
        &self.params
    }

    /// Expected number of centrals in a halo of mass `mass`
    pub fn mean_centrals(&self, mass: f64) -> ModelResult<f64> {
        Ok(Occupation::from_store(&self.params)?.mean_centrals(mass))
    }

    /// Expected number of satellites in a halo of mass `mass`
    pub fn mean_satellites(&self, mass: f64) -> ModelResult<f64> {
        Ok(Occupation::from_store(&self.params)?.mean_satellites(mass))
    }

    fn inherited(&self, halos: &HaloTable) -> Vec<String> {
        if self.attrs.inherited_columns.is_empty() {
            halos
                .rows()
                .column_names()
                .into_iter()
                .map(String::from)
                .collect()
        } else {
            self.attrs.inherited_columns.clone()
        }
    }

    fn assemble(
        &self,
        halos: &HaloTable,
        hosts: &[usize],
        num_centrals: usize,
        position: [Vec<f64>; 3],
        velocity: [Vec<f64>; 3],
    ) -> ModelResult<RowSet> {
        let gal_type = iter::repeat(Value::from(CENTRALS))
            .take(num_centrals)
            .chain(iter::repeat(Value::from(SATELLITES)).take(hosts.len() - num_centrals))
            .collect();

        let mut columns = vec![Column::new(GAL_TYPE, ColumnData::Variant(gal_type))];
        for (name, values) in GALAXY_POSITION.iter().zip(position) {
            columns.push(Column::new(*name, ColumnData::Float64(values)));
        }
        for (name, values) in GALAXY_VELOCITY.iter().zip(velocity) {
            columns.push(Column::new(*name, ColumnData::Float64(values)));
        }

        for name in self.inherited(halos) {
            let column = match halos.rows().column(&name) {
                Some(column) => column,
                // an empty table may arrive without a schema
                None if halos.is_empty() => continue,
                None => return Err(ModelError::MissingHaloProperty { column: name }),
            };
            let galaxy_name = if name.starts_with("halo_") {
                name.clone()
            } else {
                format!("halo_{}", name)
            };
            columns.push(Column::new(galaxy_name, column.data().take(hosts)));
        }

        RowSet::new(columns).map_err(|e| ModelError::Population(e.to_string()))
    }
}

fn reserve<T>(values: &mut Vec<T>, total: usize) -> ModelResult<()> {
    let additional = total.saturating_sub(values.len());
    values
        .try_reserve(additional)
        .map_err(|e| ModelError::Population(format!("cannot allocate {} galaxies: {}", total, e)))
}

impl OccupationModel for Zheng07 {
    fn name(&self) -> &str {
        MODEL_NAME
    }

    fn parameter_names(&self) -> &[&'static str] {
        PARAMETER_NAMES
    }

    fn bind_parameters(&mut self, params: &ModelParameters) -> ModelResult<()> {
        if let Some(name) = params.names().find(|n| !PARAMETER_NAMES.contains(n)) {
            return Err(ModelError::UnknownParameter {
                model: MODEL_NAME.to_string(),
                name: name.to_string(),
                valid: PARAMETER_NAMES.iter().map(|s| s.to_string()).collect(),
            });
        }
        self.params.merge(params);
        Ok(())
    }

    fn clear_parameters(&mut self) {
        self.params = ModelParameters::new();
    }

    fn populate(&mut self, halos: &HaloTable, request: PopulateRequest<'_>) -> ModelResult<RowSet> {
        let occupation = Occupation::from_store(&self.params)?;

        if halos.is_empty() {
            return self.assemble(halos, &[], 0, Default::default(), Default::default());
        }

        let mut rng = match request.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mass = halos.property(request.mass_key)?;
        let halo_position = POSITION_KEYS
            .iter()
            .map(|k| halos.property(k))
            .collect::<ModelResult<Vec<_>>>()?;
        let halo_velocity = VELOCITY_KEYS
            .iter()
            .map(|k| halos.property(k))
            .collect::<ModelResult<Vec<_>>>()?;

        let eligible: Vec<bool> = match halos.optional_property(NUM_PARTICLES)? {
            Some(counts) => counts
                .iter()
                .map(|&c| c >= request.min_particles as f64)
                .collect(),
            None => vec![true; halos.len()],
        };

        let mut hosts = Vec::new();
        for (i, &m) in mass.iter().enumerate() {
            if eligible[i] && rng.gen::<f64>() < occupation.mean_centrals(m) {
                hosts.push(i);
            }
        }
        let num_centrals = hosts.len();

        let mut satellites = vec![0usize; halos.len()];
        let mut total = num_centrals;
        for (i, &m) in mass.iter().enumerate() {
            if !eligible[i] {
                continue;
            }
            let mean = occupation.mean_satellites(m);
            if !(mean <= MAX_GALAXIES as f64) {
                return Err(ModelError::Population(format!(
                    "mean satellite occupation {} of halo {} (mass {:e}) is out of range",
                    mean, i, m
                )));
            }
            let n = poisson(&mut rng, mean)
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| {
                    ModelError::Population(format!(
                        "no satellite count for mean occupation {} of halo {}",
                        mean, i
                    ))
                })?;
            total = total
                .checked_add(n)
                .filter(|&t| t <= MAX_GALAXIES)
                .ok_or_else(|| {
                    ModelError::Population(format!(
                        "more than {} galaxies requested",
                        MAX_GALAXIES
                    ))
                })?;
            satellites[i] = n;
        }

        reserve(&mut hosts, total)?;
        for (i, &n) in satellites.iter().enumerate() {
            hosts.extend(iter::repeat(i).take(n));
        }

        let box_size = self.attrs.box_size;
        let mut position: [Vec<f64>; 3] = Default::default();
        let mut velocity: [Vec<f64>; 3] = Default::default();
        for values in position.iter_mut().chain(velocity.iter_mut()) {
            reserve(values, total)?;
        }
        for &h in &hosts[..num_centrals] {
            for d in 0..3 {
                position[d].push(halo_position[d][h].rem_euclid(box_size[d]));
                velocity[d].push(halo_velocity[d][h]);
            }
        }

        if hosts.len() > num_centrals {
            let radius = halos.property(&self.attrs.mass_def.radius_key())?;
            let concentration = halos.optional_property(NFW_CONCENTRATION)?;
            let dispersion = halos.optional_property(VELOCITY_DISPERSION)?;

            for &h in &hosts[num_centrals..] {
                let conc = match &concentration {
                    Some(c) => c[h],
                    None => dutton_maccio14(mass[h], self.attrs.redshift),
                };
                let r = radius[h] * nfw_radius_fraction(&mut rng, conc);
                let direction = unit_vector(&mut rng);
                let sigma = dispersion.as_ref().map_or(0.0, |v| v[h] / 3f64.sqrt());
                for d in 0..3 {
                    let x = halo_position[d][h] + r * direction[d];
                    position[d].push(x.rem_euclid(box_size[d]));
                    velocity[d].push(halo_velocity[d][h] + sigma * standard_normal(&mut rng));
                }
            }
        }

        debug!(
            target: "hodmock::populate",
            halos = halos.len(),
            centrals = num_centrals,
            satellites = hosts.len() - num_centrals,
            "populated halos"
        );

        self.assemble(halos, &hosts, num_centrals, position, velocity)
    }
}
