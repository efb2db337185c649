//! Gauss-Jordan matrix inversion mod p, used once per clique to precompute the first row of the
//! inverse Vandermonde matrix (the degree-reduction coefficients `lambda_i` in `bgw_multiply`).

use crate::{Elem, Field, FieldError};

/// Invert a square matrix over `Z_p` via Gauss-Jordan elimination with partial pivoting.
///
/// Fails with [`FieldError::SingularMatrix`] if no nonzero pivot can be found in some column;
/// per spec this should not occur for the primes elections are actually created with.
pub fn inverse(field: &Field, matrix: &[Vec<Elem>]) -> Result<Vec<Vec<Elem>>, FieldError> {
    let n = matrix.len();
    for row in matrix {
        if row.len() != n {
            return Err(FieldError::NotSquare {
                rows: n,
                cols: row.len(),
            });
        }
    }

    // augmented matrix [A | I]
    let mut aug: Vec<Vec<Elem>> = matrix
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut r = row.clone();
            r.extend((0..n).map(|j| if i == j { field.one() } else { field.zero() }));
            r
        })
        .collect();

    for col in 0..n {
        let pivot_row = (col..n).find(|&r| aug[r][col] != 0);
        let pivot_row = pivot_row.ok_or(FieldError::SingularMatrix { column: col })?;
        aug.swap(col, pivot_row);

        let pivot_inv = field.inverse(aug[col][col])?;
        for value in aug[col].iter_mut() {
            *value = field.mul(*value, pivot_inv);
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[row][col];
            if factor == 0 {
                continue;
            }
            for c in 0..2 * n {
                let sub = field.mul(factor, aug[col][c]);
                aug[row][c] = field.sub(aug[row][c], sub);
            }
        }
    }

    Ok(aug.into_iter().map(|row| row[n..].to_vec()).collect())
}

/// Build the Vandermonde matrix `V[i][j] = (j+1)^i` for evaluation points `1..=n` (the points
/// Shamir shares are always taken at), suitable for inversion via [`inverse`].
pub fn vandermonde(field: &Field, n: usize) -> Vec<Vec<Elem>> {
    (0..n)
        .map(|i| {
            (1..=n as u32)
                .map(|x| field.pow(x, i as u64))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverts_identity() {
        let field = Field::new(101).unwrap();
        let id = vec![vec![1, 0, 0], vec![0, 1, 0], vec![0, 0, 1]];
        assert_eq!(inverse(&field, &id).unwrap(), id);
    }

    #[test]
    fn inverts_vandermonde() {
        let field = Field::new(2_147_483_647).unwrap();
        let v = vandermonde(&field, 4);
        let inv = inverse(&field, &v).unwrap();

        // V * V^-1 == I
        let n = v.len();
        for i in 0..n {
            for j in 0..n {
                let mut acc = field.zero();
                for k in 0..n {
                    acc = field.add(acc, field.mul(v[i][k], inv[k][j]));
                }
                let expected = if i == j { field.one() } else { field.zero() };
                assert_eq!(acc, expected, "entry ({i},{j})");
            }
        }
    }

    #[test]
    fn rejects_singular_matrix() {
        let field = Field::new(101).unwrap();
        let singular = vec![vec![1, 2], vec![2, 4]];
        assert!(matches!(
            inverse(&field, &singular),
            Err(FieldError::SingularMatrix { .. })
        ));
    }
}
