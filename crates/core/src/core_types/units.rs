//! Physical constants and unit conversions for glacier flow
//!
//! All solver arithmetic runs in SI units: meters, seconds, kilograms.
//! Mass balance is carried as meters of ice equivalent per second. The
//! helpers here convert from the units glaciologists usually quote
//! (mm water equivalent per year, meters of ice per year).
//!
//! # Usage
//! ```
//! use glacier_flow_core::core_types::units::{m_ice_per_year_to_per_second, SEC_IN_YEAR};
//!
//! let rate = m_ice_per_year_to_per_second(1.0);
//! assert!((rate * SEC_IN_YEAR - 1.0).abs() < 1e-12);
//! ```

/// Seconds in one day
pub const SEC_IN_DAY: f64 = 24.0 * 3600.0;

/// Seconds in one (365-day) model year
pub const SEC_IN_YEAR: f64 = 365.0 * SEC_IN_DAY;

/// Seconds in one model month (a twelfth of a model year)
pub const SEC_IN_MONTH: f64 = SEC_IN_YEAR / 12.0;

/// Density of glacier ice (kg/m³)
pub const ICE_DENSITY: f64 = 900.0;

/// Density of liquid water (kg/m³)
pub const WATER_DENSITY: f64 = 1000.0;

/// Gravitational acceleration (m/s²)
pub const GRAVITY: f64 = 9.81;

/// Glen's flow-law rate factor for temperate ice (Pa⁻³ s⁻¹), Cuffey & Paterson (2010)
pub const GLEN_A: f64 = 2.4e-24;

/// Glen's flow-law exponent
pub const GLEN_N: f64 = 3.0;

/// Square meters per square kilometer
pub const M2_IN_KM2: f64 = 1e6;

/// Cubic meters per cubic kilometer
pub const M3_IN_KM3: f64 = 1e9;

/// Convert a rate in meters of ice per year to meters of ice per second
#[inline]
#[must_use]
pub fn m_ice_per_year_to_per_second(rate: f64) -> f64 {
    rate / SEC_IN_YEAR
}

/// Convert a rate in meters of ice per second to meters of ice per year
#[inline]
#[must_use]
pub fn m_ice_per_second_to_per_year(rate: f64) -> f64 {
    rate * SEC_IN_YEAR
}

/// Convert millimeters of water equivalent to meters of ice
///
/// 1 mm w.e. is 1 kg/m²; dividing by ice density gives the ice column height.
#[inline]
#[must_use]
pub fn mm_we_to_m_ice(mm_we: f64) -> f64 {
    mm_we / ICE_DENSITY
}

/// Convert model years to seconds
#[inline]
#[must_use]
pub fn years_to_seconds(years: f64) -> f64 {
    years * SEC_IN_YEAR
}

/// Convert seconds to model years
#[inline]
#[must_use]
pub fn seconds_to_years(seconds: f64) -> f64 {
    seconds / SEC_IN_YEAR
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_year_month_day_consistency() {
        assert_eq!(SEC_IN_YEAR, 31_536_000.0);
        assert_relative_eq!(SEC_IN_MONTH * 12.0, SEC_IN_YEAR);
    }

    #[test]
    fn test_rate_conversions_invert() {
        let per_s = m_ice_per_year_to_per_second(-2.5);
        assert_relative_eq!(m_ice_per_second_to_per_year(per_s), -2.5);
        assert_relative_eq!(seconds_to_years(years_to_seconds(42.0)), 42.0);
    }

    #[test]
    fn test_water_equivalent_to_ice() {
        // 900 mm w.e. melts down from exactly one meter of ice
        assert_relative_eq!(mm_we_to_m_ice(900.0), 1.0);
    }
}
