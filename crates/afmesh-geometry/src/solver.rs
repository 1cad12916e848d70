// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scalar solvers on a bounded interval
//!
//! Brent's bracketed root finder and Brent's bounded minimizer. Both run a
//! bounded number of function evaluations and never fail once started; the
//! root finder only refuses an interval without a sign change.

/// Tolerances for [`find_root`]
#[derive(Debug, Clone, Copy)]
pub struct RootOptions {
    /// Absolute tolerance on the root location
    pub xtol: f64,
    /// Relative tolerance on the root location
    pub rtol: f64,
    /// Maximum number of iterations
    pub max_iter: usize,
}

impl Default for RootOptions {
    fn default() -> Self {
        Self {
            xtol: 2e-12,
            rtol: 4.0 * f64::EPSILON,
            max_iter: 100,
        }
    }
}

/// Tolerances for [`minimize_bounded`]
#[derive(Debug, Clone, Copy)]
pub struct MinimizeOptions {
    /// Absolute tolerance on the minimizer location
    pub xatol: f64,
    /// Maximum number of function evaluations
    pub max_eval: usize,
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            xatol: 1e-5,
            max_eval: 500,
        }
    }
}

/// Result of a bounded minimization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum {
    pub x: f64,
    pub value: f64,
}

/// Find a root of `f` in `[a, b]` with Brent's method
///
/// Returns `None` when `f(a)` and `f(b)` have the same sign. When the
/// iteration budget runs out the best estimate is returned.
pub fn find_root<F>(mut f: F, a: f64, b: f64, options: RootOptions) -> Option<f64>
where
    F: FnMut(f64) -> f64,
{
    let (mut xpre, mut xcur) = (a, b);
    let (mut fpre, mut fcur) = (f(xpre), f(xcur));

    if fpre == 0.0 {
        return Some(xpre);
    }
    if fcur == 0.0 {
        return Some(xcur);
    }
    if !(fpre.is_finite() && fcur.is_finite()) || fpre.signum() == fcur.signum() {
        return None;
    }

    let (mut xblk, mut fblk) = (0.0, 0.0);
    let (mut spre, mut scur) = (0.0, 0.0);

    for _ in 0..options.max_iter {
        if fpre != 0.0 && fcur != 0.0 && fpre.is_sign_negative() != fcur.is_sign_negative() {
            xblk = xpre;
            fblk = fpre;
            spre = xcur - xpre;
            scur = spre;
        }
        if fblk.abs() < fcur.abs() {
            xpre = xcur;
            xcur = xblk;
            xblk = xpre;

            fpre = fcur;
            fcur = fblk;
            fblk = fpre;
        }

        let delta = (options.xtol + options.rtol * xcur.abs()) / 2.0;
        let sbis = (xblk - xcur) / 2.0;
        if fcur == 0.0 || sbis.abs() < delta {
            return Some(xcur);
        }

        if spre.abs() > delta && fcur.abs() < fpre.abs() {
            let stry = if xpre == xblk {
                // secant
                -fcur * (xcur - xpre) / (fcur - fpre)
            } else {
                // inverse quadratic
                let dpre = (fpre - fcur) / (xpre - xcur);
                let dblk = (fblk - fcur) / (xblk - xcur);
                -fcur * (fblk * dblk - fpre * dpre) / (dblk * dpre * (fblk - fpre))
            };
            if 2.0 * stry.abs() < spre.abs().min(3.0 * sbis.abs() - delta) {
                spre = scur;
                scur = stry;
            } else {
                spre = sbis;
                scur = sbis;
            }
        } else {
            spre = sbis;
            scur = sbis;
        }

        xpre = xcur;
        fpre = fcur;
        if scur.abs() > delta {
            xcur += scur;
        } else {
            xcur += if sbis > 0.0 { delta } else { -delta };
        }
        fcur = f(xcur);
    }

    log::debug!("Root search on [{}, {}] hit the iteration limit", a, b);
    Some(xcur)
}

/// Minimize `f` over `[a, b]` with Brent's bounded method
///
/// Combines golden-section steps with parabolic interpolation. The result is
/// within `xatol` of the interval.
pub fn minimize_bounded<F>(mut f: F, a: f64, b: f64, options: MinimizeOptions) -> Minimum
where
    F: FnMut(f64) -> f64,
{
    let sqrt_eps = f64::EPSILON.sqrt();
    let golden_mean = 0.5 * (3.0 - 5.0_f64.sqrt());
    let (mut a, mut b) = if a <= b { (a, b) } else { (b, a) };

    let mut fulc = a + golden_mean * (b - a);
    let mut nfc = fulc;
    let mut xf = fulc;
    let mut rat: f64 = 0.0;
    let mut e: f64 = 0.0;
    let mut fx = f(xf);
    let mut evaluations = 1;

    let mut ffulc = fx;
    let mut fnfc = fx;
    let mut xm = 0.5 * (a + b);
    let mut tol1 = sqrt_eps * xf.abs() + options.xatol / 3.0;
    let mut tol2 = 2.0 * tol1;

    while (xf - xm).abs() > tol2 - 0.5 * (b - a) {
        let mut golden = true;

        if e.abs() > tol1 {
            golden = false;
            let mut r = (xf - nfc) * (fx - ffulc);
            let mut q = (xf - fulc) * (fx - fnfc);
            let mut p = (xf - fulc) * q - (xf - nfc) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            r = e;
            e = rat;

            if p.abs() < (0.5 * q * r).abs() && p > q * (a - xf) && p < q * (b - xf) {
                rat = p / q;
                let x = xf + rat;
                if (x - a) < tol2 || (b - x) < tol2 {
                    rat = tol1 * step_sign(xm - xf);
                }
            } else {
                golden = true;
            }
        }

        if golden {
            e = if xf >= xm { a - xf } else { b - xf };
            rat = golden_mean * e;
        }

        let x = xf + step_sign(rat) * rat.abs().max(tol1);
        let fu = f(x);
        evaluations += 1;

        if fu <= fx {
            if x >= xf {
                a = xf;
            } else {
                b = xf;
            }
            fulc = nfc;
            ffulc = fnfc;
            nfc = xf;
            fnfc = fx;
            xf = x;
            fx = fu;
        } else {
            if x < xf {
                a = x;
            } else {
                b = x;
            }
            if fu <= fnfc || nfc == xf {
                fulc = nfc;
                ffulc = fnfc;
                nfc = x;
                fnfc = fu;
            } else if fu <= ffulc || fulc == xf || fulc == nfc {
                fulc = x;
                ffulc = fu;
            }
        }

        xm = 0.5 * (a + b);
        tol1 = sqrt_eps * xf.abs() + options.xatol / 3.0;
        tol2 = 2.0 * tol1;

        if evaluations >= options.max_eval {
            log::debug!("Bounded minimization hit the evaluation limit");
            break;
        }
    }

    Minimum { x: xf, value: fx }
}

/// Sign used for step directions: zero counts as positive
#[inline]
fn step_sign(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_root_of_polynomial() {
        let root = find_root(|x| x * x - 2.0, 0.0, 2.0, RootOptions::default()).unwrap();
        assert_relative_eq!(root, 2.0_f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn test_root_on_reversed_bracket() {
        let root = find_root(|x| x.cos(), 2.0, 1.0, RootOptions::default()).unwrap();
        assert_relative_eq!(root, std::f64::consts::FRAC_PI_2, epsilon = 1e-10);
    }

    #[test]
    fn test_root_at_endpoint() {
        assert_eq!(find_root(|x| x - 1.0, 1.0, 3.0, RootOptions::default()), Some(1.0));
    }

    #[test]
    fn test_no_sign_change() {
        assert_eq!(find_root(|x| x * x + 1.0, -1.0, 1.0, RootOptions::default()), None);
    }

    #[test]
    fn test_minimize_parabola() {
        let parabola = |x: f64| (x - 0.3) * (x - 0.3) + 1.0;
        let min = minimize_bounded(parabola, 0.0, 0.5, MinimizeOptions::default());
        assert_relative_eq!(min.x, 0.3, epsilon = 1e-4);
        assert_relative_eq!(min.value, 1.0, epsilon = 1e-8);
    }

    #[test]
    fn test_minimize_monotone_goes_to_bound() {
        let min = minimize_bounded(|x| -x, 0.0, 0.5, MinimizeOptions::default());
        assert!(min.x > 0.5 - 1e-4 && min.x < 0.5 + 1e-5);
    }

    #[test]
    fn test_minimize_absolute_value_kink() {
        let min = minimize_bounded(|x| (x - 0.75).abs(), 0.5, 1.0, MinimizeOptions::default());
        assert_relative_eq!(min.x, 0.75, epsilon = 1e-4);
    }
}
