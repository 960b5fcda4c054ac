use polars::prelude::{Expr, lit};

/// Basis points per whole unit: a rate of `1.0` is `10_000` bps.
pub const BPS_SCALE: f64 = 10_000.0;

/// Relative width of a price range, measured against its midpoint.
///
/// ```text
/// volatility = (max_ep - min_ep) / ((max_ep + min_ep) / 2)
/// ```
///
/// # Precondition
/// `min_ep + max_ep` must be non-zero; a degenerate pair summing to zero
/// divides by zero. Callers own that guarantee.
pub fn volatility(min_ep: f64, max_ep: f64) -> f64 {
    (max_ep - min_ep) / ((max_ep + min_ep) / 2.0)
}

/// Loss-versus-rebalancing in basis points for one price range.
///
/// ```text
/// lvr_bps = volatility^2 / 8 * 10000
/// ```
///
/// Deterministic and side-effect free; non-negative whenever the
/// [`volatility`] precondition holds.
pub fn lvr_bps(min_ep: f64, max_ep: f64) -> f64 {
    let v = volatility(min_ep, max_ep);
    v * v / 8.0 * BPS_SCALE
}

/// Column form of [`lvr_bps`], applied per row during load.
///
/// Must stay in lockstep with the scalar form; the unit tests pin their
/// agreement.
pub fn lvr_bps_expr(min_ep: Expr, max_ep: Expr) -> Expr {
    let midpoint = (min_ep.clone() + max_ep.clone()) / lit(2.0);
    let volatility = (max_ep - min_ep) / midpoint;
    volatility.clone() * volatility / lit(8.0) * lit(BPS_SCALE)
}

#[cfg(test)]
mod tests {
    use polars::{df, prelude::{IntoLazy, col}};

    use crate::report::ledger::LedgerCol;

    use super::*;

    const EPS: f64 = 1e-12;

    // ============================================================================================
    // Scalar Contract
    // ============================================================================================

    #[test]
    fn test_lvr_is_zero_for_a_degenerate_range() {
        assert_eq!(lvr_bps(100.0, 100.0), 0.0);
    }

    #[test]
    fn test_lvr_known_value() {
        // Width 2 around midpoint 100: volatility = 0.02, so
        // lvr = 0.0004 / 8 * 10_000 = 0.5 bps.
        let have = lvr_bps(99.0, 101.0);
        assert!((have - 0.5).abs() < EPS, "have {have}");
    }

    #[test]
    fn test_lvr_is_non_negative_and_pure() {
        let samples = [
            (0.5, 1.5),
            (1.0, 1.0),
            (99.0, 101.0),
            (1500.0, 2500.0),
            (0.0001, 0.0002),
            // Inverted range still squares to a non-negative value
            (101.0, 99.0),
        ];

        for (min_ep, max_ep) in samples {
            let first = lvr_bps(min_ep, max_ep);
            let second = lvr_bps(min_ep, max_ep);
            assert!(first >= 0.0, "lvr_bps({min_ep}, {max_ep}) = {first}");
            assert_eq!(first, second, "repeated evaluation must agree");
        }
    }

    // ============================================================================================
    // Expr Agreement
    // ============================================================================================

    #[test]
    fn test_expr_matches_scalar_form() {
        let min_eps = vec![99.0, 0.5, 1500.0, 10.0];
        let max_eps = vec![101.0, 1.5, 2500.0, 10.0];

        let df = df![
            LedgerCol::MinEp.to_string() => &min_eps,
            LedgerCol::MaxEp.to_string() => &max_eps,
        ]
        .expect("failed to create input frame");

        let out = df
            .lazy()
            .with_column(
                lvr_bps_expr(col(LedgerCol::MinEp), col(LedgerCol::MaxEp))
                    .alias(LedgerCol::LvrBps),
            )
            .collect()
            .expect("failed to evaluate lvr expression");

        let have = out
            .column(LedgerCol::LvrBps.as_str())
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect::<Vec<_>>();

        for (i, (&min_ep, &max_ep)) in min_eps.iter().zip(&max_eps).enumerate() {
            let want = lvr_bps(min_ep, max_ep);
            assert!(
                (have[i] - want).abs() < EPS,
                "row {i}: expr {} vs scalar {want}",
                have[i]
            );
        }
    }
}
