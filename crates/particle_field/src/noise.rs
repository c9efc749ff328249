//! Deterministic value noise and fractal Brownian motion over 2D coordinates.
//!
//! Lattice values come from a sine hash, so the same coordinates always give
//! the same output. All functions return values in `[0, 1]`.

/// Hash an integer lattice point to a pseudo-random value in `[0, 1)`.
fn hash(ix: f32, iy: f32) -> f32 {
    let h = (ix * 127.1 + iy * 311.7).sin() * 43_758.547;
    h - h.floor()
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Value noise: bilinear blend of hashed corner values with smoothstep easing.
pub fn value_noise(x: f32, y: f32) -> f32 {
    let ix = x.floor();
    let iy = y.floor();
    let fx = fade(x - ix);
    let fy = fade(y - iy);

    let a = hash(ix, iy);
    let b = hash(ix + 1.0, iy);
    let c = hash(ix, iy + 1.0);
    let d = hash(ix + 1.0, iy + 1.0);

    lerp(lerp(a, b, fx), lerp(c, d, fx), fy)
}

/// Multi-octave value noise normalized by the total amplitude.
///
/// Each octave doubles the frequency and halves the amplitude. Zero octaves
/// yields `0.0`.
pub fn fbm(x: f32, y: f32, octaves: u32) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut frequency = 1.0;
    let mut total = 0.0;

    for _ in 0..octaves {
        value += value_noise(x * frequency, y * frequency) * amplitude;
        total += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }

    if total > 0.0 { value / total } else { 0.0 }
}
