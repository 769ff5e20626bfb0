use super::*;

/// Pad block heights (and event ids) to 20 digits so lexicographic key order
/// matches numeric order across the full u64 range.
pub fn pad_height(height: u64) -> String {
    format!("{height:020}")
}

/// `value * numerator / denominator` without intermediate overflow panics.
/// Returns an error when the product overflows u128 or the denominator is
/// zero; pool balances are 1e8 fixed point, so honest values never get close.
pub fn mul_div(value: u128, numerator: u128, denominator: u128) -> Result<u128, Report> {
    if denominator == 0 {
        bail!("division by zero in pool arithmetic");
    }
    value
        .checked_mul(numerator)
        .map(|product| product / denominator)
        .ok_or_eyre("overflow in pool arithmetic")
}
