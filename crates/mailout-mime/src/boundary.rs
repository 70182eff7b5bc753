//! Multipart boundary generation.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of the random portion of a generated boundary.
const BOUNDARY_LEN: usize = 30;

/// Generates a random multipart boundary token.
#[must_use]
pub fn generate_boundary() -> String {
    let mut rng = rand::rng();
    let token: String = (&mut rng)
        .sample_iter(Alphanumeric)
        .take(BOUNDARY_LEN)
        .map(char::from)
        .collect();
    format!("----=_Part_{token}")
}

/// Generates a boundary that does not appear verbatim in any of the given
/// part payloads. The multipart framing is silently corrupted by a
/// colliding boundary, so regenerate until clear.
#[must_use]
pub fn unique_boundary(payloads: &[&str]) -> String {
    loop {
        let boundary = generate_boundary();
        if !payloads.iter().any(|p| p.contains(&boundary)) {
            return boundary;
        }
    }
}
