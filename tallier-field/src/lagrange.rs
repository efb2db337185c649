//! Coefficients (ascending powers) of the unique degree-`(n-1)` polynomial through `n` given
//! points. Used to build the fan-in-OR polynomial: the degree-`n` polynomial mapping `1 -> 0`
//! and `2..=n+1 -> 1`.

use crate::{Elem, Field};

/// Given `points = [(x_0, y_0), .., (x_{n-1}, y_{n-1})]` with distinct `x_i`, return the `n`
/// monomial coefficients `[c_0, .., c_{n-1}]` of the interpolating polynomial, ascending powers
/// (`c_0` is the constant term).
pub fn lagrange_poly(field: &Field, points: &[(Elem, Elem)]) -> Vec<Elem> {
    let n = points.len();
    let mut coeffs = vec![field.zero(); n];

    for (i, &(xi, yi)) in points.iter().enumerate() {
        // build the numerator polynomial prod_{j != i} (x - x_j), as coefficients ascending
        let mut basis = vec![field.one()];
        let mut denom = field.one();
        for &(xj, _) in points.iter().enumerate().filter(|(j, _)| *j != i).map(|(_, p)| p) {
            // multiply basis by (x - xj)
            let mut next = vec![field.zero(); basis.len() + 1];
            for (k, &c) in basis.iter().enumerate() {
                next[k + 1] = field.add(next[k + 1], c);
                next[k] = field.sub(next[k], field.mul(c, xj));
            }
            basis = next;
            denom = field.mul(denom, field.sub(xi, xj));
        }

        let scale = field
            .inverse(denom)
            .map(|inv| field.mul(yi, inv))
            .unwrap_or(field.zero());

        for (k, c) in basis.into_iter().enumerate() {
            coeffs[k] = field.add(coeffs[k], field.mul(c, scale));
        }
    }

    coeffs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(field: &Field, coeffs: &[Elem], x: Elem) -> Elem {
        let mut acc = field.zero();
        let mut power = field.one();
        for c in coeffs {
            acc = field.add(acc, field.mul(*c, power));
            power = field.mul(power, x);
        }
        acc
    }

    #[test]
    fn interpolates_through_given_points() {
        let field = Field::new(2_147_483_647).unwrap();
        let points = vec![(1, 5), (2, 9), (3, 2)];
        let coeffs = lagrange_poly(&field, &points);
        for (x, y) in points {
            assert_eq!(eval(&field, &coeffs, x), y);
        }
    }

    #[test]
    fn builds_fan_in_or_polynomial() {
        let field = Field::new(2_147_483_647).unwrap();
        let n = 4usize;
        let points: Vec<(Elem, Elem)> = (1..=n as u32 + 1)
            .map(|x| (x, if x == 1 { 0 } else { 1 }))
            .collect();
        let coeffs = lagrange_poly(&field, &points);
        assert_eq!(eval(&field, &coeffs, 1), 0);
        for x in 2..=n as u32 + 1 {
            assert_eq!(eval(&field, &coeffs, x), 1);
        }
    }
}
