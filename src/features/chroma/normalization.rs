//! Chroma normalization strategies

/// Below this norm a vector is considered silent and left untouched
const EPSILON: f32 = 1e-10;

/// Scale a chroma vector so its largest entry is 1 (L-infinity norm)
///
/// Returns `false` and leaves the vector unchanged if it is (near) zero.
pub fn normalize_max(chroma: &mut [f32]) -> bool {
    let max = chroma.iter().fold(0.0f32, |m, &x| m.max(x.abs()));
    if max <= EPSILON {
        return false;
    }
    for x in chroma.iter_mut() {
        *x /= max;
    }
    true
}

/// Scale a chroma vector so its entries sum to 1 (L1 norm)
///
/// Returns `false` and leaves the vector unchanged if it is (near) zero.
pub fn normalize_l1(chroma: &mut [f32]) -> bool {
    let sum: f32 = chroma.iter().map(|x| x.abs()).sum();
    if sum <= EPSILON {
        return false;
    }
    for x in chroma.iter_mut() {
        *x /= sum;
    }
    true
}
