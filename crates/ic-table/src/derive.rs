//! Derived meteorological fields.
//!
//! Each helper reads existing columns and returns a table with the new
//! columns added. A missing input cell gives a missing output cell.

use ic_core::Real;

use crate::table::Table;
use crate::{TableError, TableResult};

/// Reference pressure for potential temperature, in mbar.
pub const P0_MBAR: Real = 1000.0;

/// R/cp for dry air.
pub const KAPPA: Real = 0.286;

/// Wind speed and meteorological direction (degrees, direction the wind blows
/// from) from velocity components.
pub fn wind_from_uv(u: Real, v: Real) -> (Real, Real) {
    let wspd = (u * u + v * v).sqrt();
    let wdir = 180.0 + u.atan2(v).to_degrees();
    (wspd, wdir)
}

/// Velocity components from wind speed and meteorological direction.
pub fn uv_from_wind(wspd: Real, wdir: Real) -> (Real, Real) {
    let ang = (270.0 - wdir).to_radians();
    (wspd * ang.cos(), wspd * ang.sin())
}

/// Potential temperature from temperature [K] and pressure [mbar].
pub fn theta(temperature: Real, pressure: Real, p0: Real) -> Real {
    temperature * (p0 / pressure).powf(KAPPA)
}

fn require<'t, T: Table>(table: &'t T, name: &str) -> TableResult<&'t [Option<Real>]> {
    table.column(name).ok_or_else(|| TableError::MissingColumn {
        name: name.to_string(),
    })
}

fn zip_map<F>(a: &[Option<Real>], b: &[Option<Real>], f: F) -> (Vec<Option<Real>>, Vec<Option<Real>>)
where
    F: Fn(Real, Real) -> (Real, Real),
{
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => {
                let (p, q) = f(*x, *y);
                (Some(p), Some(q))
            }
            _ => (None, None),
        })
        .unzip()
}

/// Add `wspd`/`wdir` columns computed from `u`/`v`.
pub fn add_wind_speed_direction<T: Table>(
    table: &T,
    u: &str,
    v: &str,
    wspd: &str,
    wdir: &str,
) -> TableResult<T> {
    let (speed, direction) = zip_map(require(table, u)?, require(table, v)?, wind_from_uv);
    table.with_column(wspd, speed)?.with_column(wdir, direction)
}

/// Add `u`/`v` columns computed from `wspd`/`wdir`.
pub fn add_velocity_components<T: Table>(
    table: &T,
    wspd: &str,
    wdir: &str,
    u: &str,
    v: &str,
) -> TableResult<T> {
    let (east, north) = zip_map(require(table, wspd)?, require(table, wdir)?, uv_from_wind);
    table.with_column(u, east)?.with_column(v, north)
}

/// Add a potential temperature column.
pub fn add_potential_temperature<T: Table>(
    table: &T,
    temperature: &str,
    pressure: &str,
    p0: Real,
    output: &str,
) -> TableResult<T> {
    let values = require(table, temperature)?
        .iter()
        .zip(require(table, pressure)?)
        .map(|(t, p)| Some(theta((*t)?, (*p)?, p0)))
        .collect();
    table.with_column(output, values)
}
