use crs::{CrsConfig, CrsError, CrsRegistry, GlobeContext};
use foundation::math::GeoPoint;

#[test]
fn switching_to_a_configured_projection_keeps_the_body() {
    let mut ctx = GlobeContext::new(CrsRegistry::with_defaults(), "EPSG:4326").expect("context");
    assert!(!ctx.crs().is_flat());

    let config = CrsConfig::from_json_str(
        r#"{"name": "Mars_flat", "geoide": {"radius": 3396190.0}, "projection": {"type": "plate_carree"}}"#,
    )
    .expect("config");
    ctx.set_crs_from_config(&config).expect("switch");

    assert_eq!(ctx.crs().name(), "Mars_flat");
    assert!(ctx.crs().is_flat());
    assert!(ctx.crs().wraps_longitude());
    assert!(ctx.registry().contains("Mars_flat"));

    let p = ctx.crs().from_geo_to_3d(GeoPoint::new(180.0, 0.0));
    assert!((p.x - std::f64::consts::PI * 3_396_190.0).abs() < 1e-3);
}

#[test]
fn failed_switch_keeps_previous_crs() {
    let mut ctx = GlobeContext::new(CrsRegistry::with_defaults(), "Galactic").expect("context");
    assert_eq!(
        ctx.set_crs("EPSG:999999"),
        Err(CrsError::UnknownCrs("EPSG:999999".into()))
    );
    assert_eq!(ctx.crs().name(), "Galactic");

    // The galactic pole seen from the equatorial frame.
    let eq = ctx
        .registry()
        .convert(GeoPoint::new(0.0, 90.0), "Galactic", "Equatorial")
        .expect("convert");
    assert!((eq.lon.rem_euclid(360.0) - 192.859_5).abs() < 1e-3);
    assert!((eq.lat - 27.128_3).abs() < 1e-3);
}
