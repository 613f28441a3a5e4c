//! Property tests for the metric formulas and the weighted average.

use nesteval::eval::metrics::{category_weights, f1, precision, recall, weighted_average, Counts, Metrics};
use nesteval::eval::{score_by_length, SpanTag, LENGTH_BUCKETS};
use proptest::prelude::*;

fn unit() -> impl Strategy<Value = f64> {
    0.0f64..=1.0
}

proptest! {
    #[test]
    fn test_metrics_bounded(tp in 0usize..1000, fp in 0usize..1000, fn_count in 0usize..1000) {
        let c = Counts::new(tp, fp, fn_count);
        for v in [c.precision(), c.recall(), c.f1()] {
            prop_assert!((0.0..=1.0).contains(&v), "{} out of range for {:?}", v, c);
            prop_assert!(!v.is_nan());
        }
    }

    #[test]
    fn test_f1_zero_rule(p in unit(), r in unit()) {
        let f = f1(p, r);
        if p == 0.0 || r == 0.0 {
            prop_assert_eq!(f, 0.0);
        } else {
            prop_assert!(f >= 0.0);
            prop_assert!(f <= p.max(r) + 1e-12);
            prop_assert!(f >= p.min(r) - 1e-12);
        }
    }

    #[test]
    fn test_guards_never_divide_by_zero(fp in 0usize..100, fn_count in 0usize..100) {
        prop_assert_eq!(precision(0, fp), 0.0);
        prop_assert_eq!(recall(0, fn_count), 0.0);
    }

    #[test]
    fn test_weighted_average_in_convex_hull(
        entries in prop::collection::vec((unit(), unit(), 0usize..50), 1..8)
    ) {
        let metrics: Vec<Metrics> = entries.iter().map(|&(p, r, _)| Metrics::new(p, r)).collect();
        let gold: Vec<usize> = entries.iter().map(|&(_, _, g)| g).collect();
        let weights = category_weights(&gold);
        let avg = weighted_average(&metrics, &weights);

        if gold.iter().sum::<usize>() == 0 {
            prop_assert!(weights.iter().all(|&w| w == 0.0));
            prop_assert_eq!(avg, Metrics::default());
        } else {
            prop_assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            let weighted: Vec<&Metrics> = metrics.iter().zip(&weights).filter(|(_, w)| **w > 0.0).map(|(m, _)| m).collect();
            let lo = weighted.iter().map(|m| m.f1).fold(f64::INFINITY, f64::min);
            let hi = weighted.iter().map(|m| m.f1).fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(avg.f1 >= lo - 1e-9 && avg.f1 <= hi + 1e-9);
            let lo = weighted.iter().map(|m| m.precision).fold(f64::INFINITY, f64::min);
            let hi = weighted.iter().map(|m| m.precision).fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(avg.precision >= lo - 1e-9 && avg.precision <= hi + 1e-9);
        }
    }

    #[test]
    fn test_length_buckets_partition_gold(
        spans in prop::collection::vec((0usize..400, 1usize..400), 0..30)
    ) {
        let gold: Vec<SpanTag> = spans.iter().map(|&(s, l)| SpanTag::new("per", s, s + l)).collect();
        let result = score_by_length(&gold, &gold, &["per"]);
        let counted: usize = result["per"].values().map(|b| b.count).sum();
        let in_range = gold.iter().filter(|t| t.len() <= LENGTH_BUCKETS[LENGTH_BUCKETS.len() - 1]).count();
        prop_assert_eq!(counted, in_range);
        // identical inputs: every non-empty bucket is perfect
        for b in result["per"].values().filter(|b| b.count > 0) {
            prop_assert_eq!(b.f1, 1.0);
        }
    }
}
