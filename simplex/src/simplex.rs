//! Revised simplex solver with a Big-M phase-1/2 merge, driven entirely by
//! the on-disk extended matrix and its transpose plus an in-memory sparse
//! basis inverse updated by product-form (E-matrix) pivots.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;

use crate::error::{Error, Result};
use crate::matrix::DiskMatrix;

const EPS: f64 = 1e-8;
const SPARSE_ZERO: f64 = 1e-12;
const BIG_M_FACTOR: f64 = 200.0;

/// A revised-simplex solver instance bound to one problem.
///
/// Constructed from a path to an on-disk matrix holding `A` plus dense `b`
/// and `c`; owns the two side-effect files it creates during
/// initialization (`<original>_extended` and `<original>_t`) for its
/// lifetime.
pub struct Solver {
    a_ext_t: DiskMatrix<f64>,
    b: Vec<f64>,
    c_ext: Vec<f64>,
    base: Vec<usize>,
    nonbase: Vec<usize>,
    b_inv: HashMap<(usize, usize), f64>,
    n: usize,
    m: usize,
    max_iterations: usize,
}

impl Solver {
    /// Initialize a solver for `maximize c.x subject to A x = b, x >= 0`,
    /// where `A` is the `m x n` matrix on disk at `a_path`.
    ///
    /// Builds `<a_path>_extended` (the `[A | I_m]` extended matrix) and
    /// `<a_path>_t` (its transpose) as a side effect; cleanup of those
    /// files is the caller's responsibility.
    pub fn new<P: AsRef<Path>>(a_path: P, b: &[f64], c: &[f64]) -> Result<Self> {
        let a_path = a_path.as_ref();
        let mut a = DiskMatrix::<f64>::open(a_path)?;
        let m = a.rows() as usize;
        let n = a.cols() as usize;

        if n < m || a.rows() as usize != b.len() || a.cols() as usize != c.len() {
            return Err(Error::InvalidProblem);
        }

        let extended_path = append_suffix(a_path, "_extended");
        let transpose_path = append_suffix(a_path, "_t");

        println!("building extended matrix [A | I] ({m} x {})...", n + m);
        let mut a_ext = DiskMatrix::<f64>::create(&extended_path, m as i32, (n + m) as i32)?;
        for i in 0..m {
            let mut row = a.read_row(i as i32)?;
            row.resize(n + m, 0.0);
            row[n + i] = 1.0;
            a_ext.write_row(&row, i as i32)?;
        }

        println!("transposing extended matrix...");
        let a_ext_t = a_ext.generate_transpose(&transpose_path)?;

        let max_abs_c = c.iter().fold(0.0_f64, |acc, &v| acc.max(v.abs()));
        let big_m = BIG_M_FACTOR * max_abs_c;
        let mut c_ext = vec![0.0; n + m];
        c_ext[..n].copy_from_slice(c);
        for i in 0..m {
            c_ext[n + i] = -big_m;
        }

        let base: Vec<usize> = (n..n + m).collect();
        let nonbase: Vec<usize> = (0..n).collect();
        let mut b_inv = HashMap::new();
        for i in 0..m {
            b_inv.insert((i, i), 1.0);
        }

        Ok(Solver {
            a_ext_t,
            b: b.to_vec(),
            c_ext,
            base,
            nonbase,
            b_inv,
            n,
            m,
            max_iterations: 100 * (n + m),
        })
    }

    /// Override the default iteration cap of `100 * (n + m)`.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Number of original (non-artificial) variables, `n`.
    pub fn variable_count(&self) -> usize {
        self.n
    }

    /// Number of constraints / artificial variables, `m`.
    pub fn constraint_count(&self) -> usize {
        self.m
    }

    /// Big-M derived value (`-c_ext[n]`), i.e. the penalty coefficient
    /// attached to the artificial variables, `200 * max_j |c_j|`.
    pub fn big_m(&self) -> f64 {
        -self.c_ext[self.n]
    }

    /// Run the revised simplex iteration to a terminal state.
    ///
    /// Returns a map from basic variable index to its value (exactly `m`
    /// entries; non-basic variables are implicitly zero) and the optimal
    /// objective value.
    pub fn solve(&mut self) -> Result<(BTreeMap<usize, f64>, f64)> {
        let mut iterations = 0usize;
        loop {
            if iterations >= self.max_iterations {
                return Err(Error::IterationLimit);
            }
            iterations += 1;

            let c_b: Vec<f64> = self.base.iter().map(|&idx| self.c_ext[idx]).collect();
            let pi = vec_mat(&c_b, &self.b_inv, self.m);

            let mut sigma = Vec::with_capacity(self.nonbase.len());
            for &j in &self.nonbase {
                let a_j = self.a_ext_t.read_row(j as i32)?;
                let dot: f64 = pi.iter().zip(a_j.iter()).map(|(p, a)| p * a).sum();
                sigma.push(self.c_ext[j] - dot);
            }

            let mut in_pos = 0usize;
            let mut best_sigma = sigma[0];
            for (k, &s) in sigma.iter().enumerate().skip(1) {
                if s > best_sigma {
                    best_sigma = s;
                    in_pos = k;
                }
            }

            if best_sigma <= EPS {
                let x_b = mat_vec(&self.b_inv, &self.b, self.m);
                let artificial_basic = self
                    .base
                    .iter()
                    .zip(x_b.iter())
                    .any(|(&idx, &val)| idx >= self.n && val > EPS);
                if artificial_basic {
                    return Err(Error::NoSolution);
                }

                let solution: BTreeMap<usize, f64> = self
                    .base
                    .iter()
                    .zip(x_b.iter())
                    .map(|(&idx, &val)| (idx, val))
                    .collect();
                let objective: f64 = c_b.iter().zip(x_b.iter()).map(|(c, x)| c * x).sum();
                return Ok((solution, objective));
            }

            let entering = self.nonbase[in_pos];
            let p_k = self.a_ext_t.read_row(entering as i32)?;

            if p_k.iter().all(|&v| v <= EPS) {
                return Err(Error::InfiniteSolutions);
            }

            let y_k = mat_vec(&self.b_inv, &p_k, self.m);
            let x_b = mat_vec(&self.b_inv, &self.b, self.m);

            let mut out_pos: Option<usize> = None;
            let mut best_ratio = f64::INFINITY;
            for i in 0..self.m {
                if y_k[i] < EPS {
                    continue;
                }
                let ratio = x_b[i] / y_k[i];
                if ratio < best_ratio {
                    best_ratio = ratio;
                    out_pos = Some(i);
                }
            }
            let out_pos = out_pos.ok_or(Error::InfiniteSolutions)?;

            let alpha = y_k[out_pos];
            self.pivot(out_pos, &y_k, alpha);

            let leaving = self.base[out_pos];
            self.base[out_pos] = entering;
            self.nonbase[in_pos] = leaving;
        }
    }

    /// Apply the product-form update `B_inv <- E . B_inv` for a pivot on
    /// row `out_pos` with ratio-test column `y` and pivot value `alpha`.
    fn pivot(&mut self, out_pos: usize, y: &[f64], alpha: f64) {
        let pivot_row: Vec<f64> = (0..self.m)
            .map(|j| self.b_inv.get(&(out_pos, j)).copied().unwrap_or(0.0) / alpha)
            .collect();

        for (j, &val) in pivot_row.iter().enumerate() {
            set_sparse(&mut self.b_inv, out_pos, j, val);
        }

        for i in 0..self.m {
            if i == out_pos || y[i] == 0.0 {
                continue;
            }
            for j in 0..self.m {
                let old = self.b_inv.get(&(i, j)).copied().unwrap_or(0.0);
                set_sparse(&mut self.b_inv, i, j, old - y[i] * pivot_row[j]);
            }
        }
    }
}

/// Solve `maximize c.x subject to A x = b, x >= 0` in one call, creating
/// and leaving behind the two side-effect matrix files described in
/// [`Solver::new`].
pub fn solve_problem<P: AsRef<Path>>(
    a_path: P,
    b: &[f64],
    c: &[f64],
) -> Result<(BTreeMap<usize, f64>, f64)> {
    Solver::new(a_path, b, c)?.solve()
}

fn mat_vec(b_inv: &HashMap<(usize, usize), f64>, v: &[f64], m: usize) -> Vec<f64> {
    let mut out = vec![0.0; m];
    for (&(i, j), &val) in b_inv.iter() {
        out[i] += val * v[j];
    }
    out
}

fn vec_mat(c_b: &[f64], b_inv: &HashMap<(usize, usize), f64>, m: usize) -> Vec<f64> {
    let mut out = vec![0.0; m];
    for (&(i, j), &val) in b_inv.iter() {
        out[j] += c_b[i] * val;
    }
    out
}

fn set_sparse(map: &mut HashMap<(usize, usize), f64>, i: usize, j: usize, value: f64) {
    if value.abs() <= SPARSE_ZERO {
        map.remove(&(i, j));
    } else {
        map.insert((i, j), value);
    }
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os: OsString = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    fn scratch_path(name: &str) -> PathBuf {
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "simplex-solver-test-{name}-{}-{}.mat",
            std::process::id(),
            id
        ))
    }

    fn write_problem(path: &Path, rows: &[Vec<f64>]) {
        let m = rows.len() as i32;
        let n = rows[0].len() as i32;
        let mut a = DiskMatrix::<f64>::create(path, m, n).unwrap();
        for (i, row) in rows.iter().enumerate() {
            a.write_row(row, i as i32).unwrap();
        }
    }

    fn cleanup(path: &Path) {
        for suffix in ["", "_extended", "_t"] {
            std::fs::remove_file(append_suffix(path, suffix)).ok();
        }
    }

    #[test]
    fn trivial_identity_problem() {
        let path = scratch_path("identity");
        write_problem(&path, &[vec![1.0, 0.0], vec![0.0, 1.0]]);

        let (solution, objective) = solve_problem(&path, &[1.0, 1.0], &[1.0, 1.0]).unwrap();
        assert!((solution.get(&0).copied().unwrap_or(0.0) - 1.0).abs() < 1e-6);
        assert!((solution.get(&1).copied().unwrap_or(0.0) - 1.0).abs() < 1e-6);
        assert!((objective - 2.0).abs() < 1e-6);

        cleanup(&path);
    }

    #[test]
    fn reference_example_reaches_optimal() {
        let path = scratch_path("reference");
        write_problem(
            &path,
            &[
                vec![1.0, -2.0, 1.0, 1.0, 0.0],
                vec![-4.0, 1.0, 2.0, 0.0, -1.0],
                vec![-2.0, 0.0, 1.0, 0.0, 0.0],
            ],
        );
        let b = [11.0, 3.0, 1.0];
        let c = [3.0, -1.0, -1.0, 0.0, 0.0];

        let (solution, _objective) = solve_problem(&path, &b, &c).unwrap();

        // Ax = b over the returned basic solution (non-basic vars are 0).
        let a = [
            [1.0, -2.0, 1.0, 1.0, 0.0],
            [-4.0, 1.0, 2.0, 0.0, -1.0],
            [-2.0, 0.0, 1.0, 0.0, 0.0],
        ];
        for row in a.iter() {
            let lhs: f64 = row
                .iter()
                .enumerate()
                .map(|(j, &a_ij)| a_ij * solution.get(&j).copied().unwrap_or(0.0))
                .sum();
            let rhs = match row[..] {
                [1.0, -2.0, 1.0, 1.0, 0.0] => 11.0,
                [-4.0, 1.0, 2.0, 0.0, -1.0] => 3.0,
                _ => 1.0,
            };
            assert!((lhs - rhs).abs() < 1e-4);
        }

        cleanup(&path);
    }

    #[test]
    fn infeasible_problem_is_no_solution() {
        let path = scratch_path("infeasible");
        write_problem(&path, &[vec![1.0, 1.0], vec![-1.0, -1.0]]);

        let err = solve_problem(&path, &[1.0, -1.0], &[1.0, 1.0]).unwrap_err();
        assert!(matches!(err, Error::NoSolution));

        cleanup(&path);
    }

    #[test]
    fn unbounded_problem_is_infinite_solutions() {
        let path = scratch_path("unbounded");
        write_problem(&path, &[vec![1.0, -1.0]]);

        let err = solve_problem(&path, &[0.0], &[1.0, 0.0]).unwrap_err();
        assert!(matches!(err, Error::InfiniteSolutions));

        cleanup(&path);
    }

    #[test]
    fn big_m_selection_matches_reference() {
        let path = scratch_path("big-m");
        write_problem(&path, &[vec![1.0, 1.0, 1.0]]);

        let zero_m = Solver::new(&path, &[1.0], &[0.0, 0.0, 0.0]).unwrap();
        assert_eq!(zero_m.big_m(), 0.0);
        cleanup(&path);

        write_problem(&path, &[vec![1.0, 1.0, 1.0]]);
        let nonzero_m = Solver::new(&path, &[1.0], &[1.0, -2.0, 3.0]).unwrap();
        assert_eq!(nonzero_m.big_m(), 600.0);
        cleanup(&path);
    }
}
