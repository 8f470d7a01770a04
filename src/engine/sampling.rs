//! Stochastic choice helpers shared by the bot strategies.

use rand::Rng;

/// Highest-scoring item; ties broken uniformly at random.
pub fn argmax_random<T: Copy, R: Rng + ?Sized>(items: &[(T, f64)], rng: &mut R) -> Option<T> {
    let best = items.iter().map(|(_, s)| *s).fold(f64::NEG_INFINITY, f64::max);
    let ties: Vec<T> = items.iter().filter(|(_, s)| *s == best).map(|(t, _)| *t).collect();
    if ties.is_empty() {
        return None;
    }
    Some(ties[rng.gen_range(0..ties.len())])
}

/// Sample proportionally to `exp(score / temperature)`.
///
/// Lower temperature approaches arg-max. Scores are shifted by their max
/// before exponentiation so large values cannot overflow.
pub fn softmax_sample<T: Copy, R: Rng + ?Sized>(
    items: &[(T, f64)],
    temperature: f64,
    rng: &mut R,
) -> Option<T> {
    let (last, _) = items.last()?;
    let max = items.iter().map(|(_, s)| *s).fold(f64::NEG_INFINITY, f64::max);
    let t = temperature.max(1e-4);
    let exps: Vec<f64> = items.iter().map(|(_, s)| ((s - max) / t).exp()).collect();
    let sum: f64 = exps.iter().sum();

    let mut r = rng.gen::<f64>() * sum;
    for ((item, _), e) in items.iter().zip(&exps) {
        r -= e;
        if r <= 0.0 {
            return Some(*item);
        }
    }
    Some(*last)
}
