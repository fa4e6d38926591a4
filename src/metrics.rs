use crate::runner::SweepReport;
use crate::types::ClassName;

/// Aggregate skew metrics for per-class descriptor emission.
#[derive(Clone, Debug, PartialEq)]
pub struct EmissionSkew {
    pub total: usize,
    pub classes: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    pub max_share: f64,
    pub ratio: f64,
    pub per_class: Vec<ClassShare>,
}

/// Per-class share of the emitted descriptors.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassShare {
    pub class_name: ClassName,
    pub count: usize,
    pub share: f64,
}

/// Compute emission skew from a finished report.
///
/// Returns `None` when the report covers no classes.
pub fn emission_skew(report: &SweepReport) -> Option<EmissionSkew> {
    if report.classes.is_empty() {
        return None;
    }
    let total: usize = report.classes.iter().map(|stats| stats.emitted).sum();
    let classes = report.classes.len();
    let min = report
        .classes
        .iter()
        .map(|stats| stats.emitted)
        .min()
        .expect("classes non-empty");
    let max = report
        .classes
        .iter()
        .map(|stats| stats.emitted)
        .max()
        .expect("classes non-empty");
    let mean = total as f64 / classes as f64;
    let max_share = if total == 0 {
        0.0
    } else {
        max as f64 / total as f64
    };
    let ratio = if min == 0 {
        f64::INFINITY
    } else {
        max as f64 / min as f64
    };
    let mut per_class: Vec<ClassShare> = report
        .classes
        .iter()
        .map(|stats| ClassShare {
            class_name: stats.class_name.clone(),
            count: stats.emitted,
            share: if total == 0 {
                0.0
            } else {
                stats.emitted as f64 / total as f64
            },
        })
        .collect();
    per_class.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.class_name.cmp(&b.class_name))
    });
    Some(EmissionSkew {
        total,
        classes,
        min,
        max,
        mean,
        max_share,
        ratio,
        per_class,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ClassSweepStats;

    fn stats(class_name: &str, emitted: usize) -> ClassSweepStats {
        ClassSweepStats {
            class_name: class_name.to_string(),
            pages: 1,
            records: emitted,
            emitted,
            dropped: 0,
            last_cursor: None,
            last_error: None,
            duration_ms: 0,
        }
    }

    #[test]
    fn empty_report_yields_no_skew() {
        let report = SweepReport { classes: Vec::new() };
        assert!(emission_skew(&report).is_none());
    }

    #[test]
    fn shares_are_ordered_by_count_then_name() {
        let report = SweepReport {
            classes: vec![stats("Post", 6), stats("Doc", 2), stats("Note", 2)],
        };
        let skew = emission_skew(&report).expect("non-empty report");
        assert_eq!(skew.total, 10);
        assert_eq!(skew.max, 6);
        assert_eq!(skew.min, 2);
        assert_eq!(skew.ratio, 3.0);
        let order: Vec<&str> = skew
            .per_class
            .iter()
            .map(|share| share.class_name.as_str())
            .collect();
        assert_eq!(order, vec!["Post", "Doc", "Note"]);
        assert!((skew.per_class[0].share - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_emission_class_drives_ratio_to_infinity() {
        let report = SweepReport {
            classes: vec![stats("Post", 4), stats("Empty", 0)],
        };
        let skew = emission_skew(&report).expect("non-empty report");
        assert!(skew.ratio.is_infinite());
    }
}
