/// `x * y / 255`, rounded.
pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

/// True when every component of the matrix is finite.
pub(crate) fn affine_is_finite(a: kurbo::Affine) -> bool {
    a.as_coeffs().iter().all(|c| c.is_finite())
}

/// True when the transform collapses area (determinant ~ 0).
pub(crate) fn affine_is_singular(a: kurbo::Affine) -> bool {
    !affine_is_finite(a) || a.determinant().abs() < 1e-12
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
