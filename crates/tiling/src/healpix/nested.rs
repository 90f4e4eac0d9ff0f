//! Nested HEALPix pixel arithmetic.
//!
//! Face coordinates `(x, y)` are normalized to `[0, 1]` inside a base face;
//! `x + y` grows towards the face's northern corner. Pixel `(ix, iy)` of
//! order `o` covers `[ix, ix + 1] / 2^o × [iy, iy + 1] / 2^o`.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use foundation::math::normalize_lon;

/// Deepest order whose face coordinates fit in 32 bits per axis.
pub const MAX_ORDER: u8 = 29;

/// Ring index (in units of nside) of each base face's southern corner.
const JRLL: [i64; 12] = [2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4];
/// Longitude (in units of π/4) of each base face's center meridian.
const JPLL: [i64; 12] = [1, 3, 5, 7, 0, 2, 4, 6, 1, 3, 5, 7];

pub fn nside(order: u8) -> u64 {
    1u64 << order
}

pub fn npix(order: u8) -> u64 {
    12 * nside(order) * nside(order)
}

/// Spread the bits of `v` onto the even bit positions of a `u64`.
pub fn spread_bits(v: u32) -> u64 {
    let mut x = v as u64;
    x = (x | (x << 16)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x << 8)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333_3333_3333;
    x = (x | (x << 1)) & 0x5555_5555_5555_5555;
    x
}

/// Gather the even bits of `v`; inverse of [`spread_bits`].
pub fn compress_bits(v: u64) -> u32 {
    let mut x = v & 0x5555_5555_5555_5555;
    x = (x | (x >> 1)) & 0x3333_3333_3333_3333;
    x = (x | (x >> 2)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x >> 4)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x >> 8)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x >> 16)) & 0x0000_0000_FFFF_FFFF;
    x as u32
}

pub fn xyf_to_nest(order: u8, ix: u32, iy: u32, face: u8) -> u64 {
    ((face as u64) << (2 * order as u32)) + spread_bits(ix) + (spread_bits(iy) << 1)
}

/// `(ix, iy, face)` of a nested pixel.
pub fn nest_to_xyf(order: u8, pix: u64) -> (u32, u32, u8) {
    let shift = 2 * order as u32;
    let face = (pix >> shift) as u8;
    let rem = pix & ((1u64 << shift) - 1);
    (compress_bits(rem), compress_bits(rem >> 1), face)
}

/// Nested pixel containing `(lon, lat)` (degrees).
pub fn lon_lat_to_pix(order: u8, lon: f64, lat: f64) -> u64 {
    let ns = 1i64 << order;
    let nsf = ns as f64;
    let z = lat.to_radians().sin();
    let za = z.abs();
    let tt = (lon.to_radians() / FRAC_PI_2).rem_euclid(4.0);

    let (face, ix, iy) = if za <= 2.0 / 3.0 {
        let temp1 = nsf * (0.5 + tt);
        let temp2 = nsf * (z * 0.75);
        let jp = (temp1 - temp2) as i64;
        let jm = (temp1 + temp2) as i64;
        let ifp = jp >> order;
        let ifm = jm >> order;
        let face = if ifp == ifm {
            ifp | 4
        } else if ifp < ifm {
            ifp
        } else {
            ifm + 8
        };
        (face, jm & (ns - 1), ns - (jp & (ns - 1)) - 1)
    } else {
        let ntt = (tt as i64).min(3);
        let tp = tt - ntt as f64;
        let tmp = nsf * (3.0 * (1.0 - za)).sqrt();
        let jp = ((tp * tmp) as i64).min(ns - 1);
        let jm = (((1.0 - tp) * tmp) as i64).min(ns - 1);
        if z >= 0.0 {
            (ntt, ns - jm - 1, ns - jp - 1)
        } else {
            (ntt + 8, jp, jm)
        }
    };

    xyf_to_nest(order, ix as u32, iy as u32, face as u8)
}

/// Geographic position `(lon, lat)` of continuous face coordinates.
pub fn face_xy_to_lon_lat(face: u8, x: f64, y: f64) -> (f64, f64) {
    let f = face as usize;
    let jr = JRLL[f] as f64 - x - y;

    // z = sin(lat); `sth` = cos(lat), computed from 1 - |z| near the poles.
    let (z, sth, nr) = if jr < 1.0 {
        let nr = jr;
        let t = nr * nr / 3.0;
        (1.0 - t, (t * (2.0 - t)).max(0.0).sqrt(), nr)
    } else if jr > 3.0 {
        let nr = 4.0 - jr;
        let t = nr * nr / 3.0;
        (t - 1.0, (t * (2.0 - t)).max(0.0).sqrt(), nr)
    } else {
        let z = (2.0 - jr) * 2.0 / 3.0;
        (z, ((1.0 - z) * (1.0 + z)).sqrt(), 1.0)
    };

    let mut tmp = JPLL[f] as f64 * nr + x - y;
    if tmp < 0.0 {
        tmp += 8.0;
    }
    if tmp >= 8.0 {
        tmp -= 8.0;
    }
    let phi = if nr < 1e-15 { 0.0 } else { FRAC_PI_4 * tmp / nr };

    (normalize_lon(phi.to_degrees()), z.atan2(sth).to_degrees())
}

/// Continuous face coordinates of `(lon, lat)` relative to `face`.
///
/// Exact inverse of [`face_xy_to_lon_lat`] inside the face; outside it the
/// result extends smoothly past `[0, 1]`, with longitudes taken on the side
/// of the face's center meridian.
pub fn lon_lat_to_face_xy(face: u8, lon: f64, lat: f64) -> (f64, f64) {
    let f = face as usize;
    let z = lat.to_radians().sin();

    let d = (lon.to_radians() / FRAC_PI_4 - JPLL[f] as f64 + 4.0).rem_euclid(8.0) - 4.0;

    let (jr, nr) = if z > 2.0 / 3.0 {
        let nr = (3.0 * (1.0 - z)).max(0.0).sqrt();
        (nr, nr)
    } else if z < -2.0 / 3.0 {
        let nr = (3.0 * (1.0 + z)).max(0.0).sqrt();
        (4.0 - nr, nr)
    } else {
        (2.0 - 1.5 * z, 1.0)
    };

    let sum = JRLL[f] as f64 - jr;
    let diff = d * nr;
    ((sum + diff) * 0.5, (sum - diff) * 0.5)
}

/// Center of a nested pixel.
pub fn pix_to_lon_lat(order: u8, pix: u64) -> (f64, f64) {
    let (ix, iy, face) = nest_to_xyf(order, pix);
    let ns = nside(order) as f64;
    face_xy_to_lon_lat(face, (ix as f64 + 0.5) / ns, (iy as f64 + 0.5) / ns)
}

#[cfg(test)]
mod tests {
    use super::{
        compress_bits, face_xy_to_lon_lat, lon_lat_to_face_xy, lon_lat_to_pix, nest_to_xyf,
        npix, pix_to_lon_lat, spread_bits, xyf_to_nest,
    };
    use proptest::prelude::*;

    #[test]
    fn spread_and_compress_are_inverse() {
        for v in [0u32, 1, 2, 3, 0xFFFF, 0x1234_5678, u32::MAX] {
            assert_eq!(compress_bits(spread_bits(v)), v);
        }
        assert_eq!(spread_bits(0b11), 0b0101);
    }

    #[test]
    fn xyf_round_trip() {
        let order = 5;
        for pix in (0..npix(order)).step_by(37) {
            let (ix, iy, face) = nest_to_xyf(order, pix);
            assert_eq!(xyf_to_nest(order, ix, iy, face), pix);
        }
    }

    #[test]
    fn poles_and_equator_at_order_zero() {
        assert_eq!(lon_lat_to_pix(0, 45.0, 90.0), 0);
        assert_eq!(lon_lat_to_pix(0, 45.0, -90.0), 8);
        assert_eq!(lon_lat_to_pix(0, 0.0, 0.0), 4);
        assert_eq!(lon_lat_to_pix(0, 90.0, 0.0), 5);
        assert_eq!(lon_lat_to_pix(0, -90.0, 0.0), 7);
    }

    #[test]
    fn face_corners() {
        let (_, lat) = face_xy_to_lon_lat(0, 1.0, 1.0);
        assert!((lat - 90.0).abs() < 1e-12);
        let (lon, lat) = face_xy_to_lon_lat(4, 0.5, 0.5);
        assert!(lon.abs() < 1e-12 && lat.abs() < 1e-12);
    }

    #[test]
    fn centers_locate_back_for_every_face_and_order() {
        for order in 0..=6u8 {
            for pix in (0..npix(order)).step_by(7) {
                let (lon, lat) = pix_to_lon_lat(order, pix);
                assert_eq!(lon_lat_to_pix(order, lon, lat), pix, "order {order}");
            }
        }
    }

    proptest! {
        #[test]
        fn face_inverse_round_trips(face in 0u8..12, x in 0.01f64..0.99, y in 0.01f64..0.99) {
            let (lon, lat) = face_xy_to_lon_lat(face, x, y);
            let (rx, ry) = lon_lat_to_face_xy(face, lon, lat);
            prop_assert!((rx - x).abs() < 1e-9, "x {} vs {}", rx, x);
            prop_assert!((ry - y).abs() < 1e-9, "y {} vs {}", ry, y);
        }

        #[test]
        fn located_pixel_center_locates_back(order in 0u8..=6, lon in -180.0f64..180.0, lat in -89.9f64..89.9) {
            let pix = lon_lat_to_pix(order, lon, lat);
            prop_assert!(pix < npix(order));
            let (clon, clat) = pix_to_lon_lat(order, pix);
            prop_assert_eq!(lon_lat_to_pix(order, clon, clat), pix);
        }
    }
}
