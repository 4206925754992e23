//! Integer-only math used by the extended opcodes.
//!
//! Angles are tenths of a degree, amplitudes are thousandths. The trig functions
//! are piecewise-linear through the quadrant anchors, not real trigonometry:
//!
//! ```text
//! angle   0    900   1800   2700   3600
//! sin     0   1000      0  -1000      0
//! cos  1000      0  -1000      0   1000
//! ```

pub const PI_MILLI: i128 = 3141;
pub const E_MILLI: i128 = 2718;

pub const FULL_TURN: i128 = 3600;
pub const QUARTER_TURN: i128 = 900;
pub const AMPLITUDE: i128 = 1000;

/// Reduce any angle into `[0, 3600)`.
#[inline]
pub fn normalize_angle(angle: i128) -> i128 {
    angle.rem_euclid(FULL_TURN)
}

pub fn sin(angle: i128) -> i128 {
    let a = normalize_angle(angle);
    let quadrant = a / QUARTER_TURN;
    let within = a % QUARTER_TURN;
    let ramp = within * AMPLITUDE / QUARTER_TURN;
    match quadrant {
        0 => ramp,
        1 => AMPLITUDE - ramp,
        2 => -ramp,
        _ => -(AMPLITUDE - ramp),
    }
}

pub fn cos(angle: i128) -> i128 {
    sin(normalize_angle(angle) + QUARTER_TURN)
}

/// Floor square root by Newton iteration. Negative input yields 0.
pub fn sqrt(x: i128) -> i128 {
    if x <= 0 {
        return 0;
    }
    let x = x as u128;
    let mut z = (x + 1) / 2;
    let mut y = x;
    while z < y {
        y = z;
        z = (x / z + z) / 2;
    }
    y as i128
}

/// `base ** exp` with wrapping multiplication. A negative exponent yields 0.
pub fn pow(base: i128, exp: i128) -> i128 {
    if exp < 0 {
        return 0;
    }
    let mut result: i128 = 1;
    let mut b = base;
    let mut e = exp as u128;
    while e > 0 {
        if e & 1 == 1 {
            result = result.wrapping_mul(b);
        }
        e >>= 1;
        if e > 0 {
            b = b.wrapping_mul(b);
        }
    }
    result
}

/// Truncating remainder; a zero divisor yields 0.
pub fn modulo(a: i128, b: i128) -> i128 {
    if b == 0 {
        return 0;
    }
    a.wrapping_rem(b)
}
