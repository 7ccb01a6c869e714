//! CoolProp integration tests.
//!
//! Broad tolerances keep these independent of the backend version while still
//! checking physical plausibility.

use pstate_fluids::{EPSILON, Measured, Substance, Unit, create_state_class};

#[test]
fn air_at_0c_1bar() {
    let air = create_state_class(Substance::fluid("Air"), false, None).unwrap();
    let p = air.state([("T", 273.15), ("P", 1e5)]).unwrap();

    let rho = p.get("D").unwrap();
    // Ideal gas: 1e5 / (287 * 273.15) ≈ 1.276 kg/m³
    assert!(rho > 1.2 && rho < 1.35, "rho = {} kg/m³", rho);

    let z = p.get("Z").unwrap();
    assert!((z - 1.0).abs() < 0.01, "Z = {}", z);
}

#[test]
fn water_at_1atm_300k() {
    let water = create_state_class("steam".parse().unwrap(), false, None).unwrap();
    let p = water.state([("P", 101_325.0), ("T", 300.0)]).unwrap();
    let rho = p.density().unwrap();
    assert!(
        rho.value > 900.0 && rho.value < 1100.0,
        "rho = {} kg/m³",
        rho.value
    );
}

#[test]
fn nitrogen_density_increases_with_pressure() {
    let n2 = create_state_class("N2".parse().unwrap(), false, None).unwrap();
    let rho: Vec<f64> = [1e5, 2e5, 5e5]
        .into_iter()
        .map(|p| n2.state([("T", 300.0), ("P", p)]).unwrap().get("D").unwrap())
        .collect();
    assert!(rho[0] < rho[1] && rho[1] < rho[2]);
    let ratio = rho[1] / rho[0];
    assert!(ratio > 1.8 && ratio < 2.2, "density ratio = {}", ratio);
}

#[test]
fn unknown_input_pair_fails_without_caching() {
    let air = create_state_class(Substance::fluid("Air"), false, None).unwrap();
    let p = air.state([("T", 300.0), ("P", -5.0)]).unwrap();
    assert!(p.get("H").unwrap_err().is_resolution());
    assert!(!p.is_resolved("H"));
}

#[test]
fn humid_air_at_20c_50_percent() {
    let ha = create_state_class(Substance::HumidAir, false, None).unwrap();
    let p = ha.state([("T", 293.15), ("R", 0.5)]).unwrap();

    // Psychrometric chart: W ≈ 7.3 g/kg, dew point ≈ 9.3 °C
    let w = p.get("W").unwrap();
    assert!(w > 0.006 && w < 0.0085, "W = {}", w);
    let d = p.get("D").unwrap();
    assert!(d > 280.0 && d < 285.0, "D = {} K", d);

    let dew = p.dew_point(None).unwrap();
    let w_dew = dew.get("W").unwrap();
    assert!((w_dew - w).abs() / w < 0.02, "W at dew point = {}", w_dew);
}

#[test]
fn humid_air_dew_point_with_relative_humidity() {
    let ha = create_state_class(Substance::HumidAir, false, None).unwrap();
    let p = ha.state([("D", 283.15), ("R", 0.6)]).unwrap();

    let psi_w = p.get("psi_w").unwrap();
    let w = p.get("W").unwrap();
    assert!((w - EPSILON * psi_w / (1.0 - psi_w)).abs() < 1e-12);

    // A dew point of 10 °C at 60 % relative humidity puts T near 17.6 °C
    let t = p.get("T").unwrap();
    assert!(t > 288.0 && t < 293.0, "T = {} K", t);
}

#[test]
fn humid_air_mixing_stays_between_inlets() {
    let ha = create_state_class(Substance::HumidAir, true, None).unwrap();
    let cold = ha
        .unit_state(
            Some("outdoor"),
            [
                ("T", Measured::new(0.0, Unit::Celsius)),
                ("R", Measured::new(80.0, Unit::Percent)),
            ],
        )
        .unwrap();
    let warm = ha
        .unit_state(
            Some("return"),
            [
                ("T", Measured::new(24.0, Unit::Celsius)),
                ("R", Measured::new(40.0, Unit::Percent)),
            ],
        )
        .unwrap();

    let mixed = cold.mix(&warm, 0.5, Some("mixed")).unwrap();
    let t = mixed.get("T").unwrap().magnitude_as(Unit::Celsius).unwrap();
    assert!(t > 8.0 && t < 16.0, "T = {} degC", t);
}
