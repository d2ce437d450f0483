// Held-out evaluation: accuracy plus per-class precision, recall and F1.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    /// Index 0 is "fighter2 wins", index 1 is "fighter1 wins".
    pub classes: [ClassMetrics; 2],
    /// Unweighted mean over both classes.
    pub macro_avg: ClassMetrics,
    /// Mean weighted by each class's support.
    pub weighted_avg: ClassMetrics,
    pub accuracy: f64,
    pub samples: usize,
}

pub fn accuracy(truth: &[usize], pred: &[usize]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let hits = truth.iter().zip(pred).filter(|(t, p)| t == p).count();
    hits as f64 / truth.len() as f64
}

fn ratio_or_zero(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

pub fn classification_report(truth: &[usize], pred: &[usize]) -> ClassificationReport {
    let class = |label: usize| {
        let tp = truth.iter().zip(pred).filter(|(t, p)| **t == label && **p == label).count();
        let predicted = pred.iter().filter(|p| **p == label).count();
        let support = truth.iter().filter(|t| **t == label).count();
        let precision = ratio_or_zero(tp, predicted);
        let recall = ratio_or_zero(tp, support);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        ClassMetrics { precision, recall, f1, support }
    };

    let classes = [class(0), class(1)];
    let samples = truth.len();
    ClassificationReport {
        macro_avg: averaged(&classes, [1.0, 1.0], samples),
        weighted_avg: averaged(&classes, classes.map(|m| m.support as f64), samples),
        classes,
        accuracy: accuracy(truth, pred),
        samples,
    }
}

fn averaged(classes: &[ClassMetrics; 2], weights: [f64; 2], support: usize) -> ClassMetrics {
    let total: f64 = weights.iter().sum();
    let avg = |field: fn(&ClassMetrics) -> f64| {
        if total > 0.0 {
            classes.iter().zip(weights).map(|(m, w)| field(m) * w).sum::<f64>() / total
        } else {
            0.0
        }
    };
    ClassMetrics {
        precision: avg(|m| m.precision),
        recall: avg(|m| m.recall),
        f1: avg(|m| m.f1),
        support,
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<16} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        for (name, m) in ["fighter2 wins", "fighter1 wins"].iter().zip(&self.classes) {
            writeln!(
                f,
                "{:<16} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{:<16} {:>9} {:>9} {:>9.2} {:>9}", "accuracy", "", "", self.accuracy, self.samples)?;
        for (name, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:<16} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_each_class() {
        let truth = [1, 1, 1, 0, 0];
        let pred = [1, 1, 0, 0, 1];
        let r = classification_report(&truth, &pred);
        assert!((r.accuracy - 0.6).abs() < 1e-12);
        assert_eq!(r.classes[1].support, 3);
        assert!((r.classes[1].precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((r.classes[1].recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((r.classes[0].precision - 0.5).abs() < 1e-12);
        assert!((r.classes[0].f1 - 0.5).abs() < 1e-12);
        assert!(r.to_string().contains("fighter1 wins"));
    }

    #[test]
    fn empty_and_absent_classes_score_zero() {
        assert_eq!(accuracy(&[], &[]), 0.0);
        let r = classification_report(&[1, 1], &[1, 1]);
        assert_eq!(r.classes[0], ClassMetrics { precision: 0.0, recall: 0.0, f1: 0.0, support: 0 });
        assert_eq!(r.classes[1].f1, 1.0);
        assert_eq!(r.macro_avg.f1, 0.5);
        assert_eq!(r.weighted_avg.f1, 1.0);
    }

    #[test]
    fn averages_weigh_classes_equally_or_by_support() {
        // class 0: precision 1/2, recall 1/1; class 1: precision 2/2, recall 2/3
        let truth = [1, 1, 1, 0];
        let pred = [1, 1, 0, 0];
        let r = classification_report(&truth, &pred);
        assert!((r.macro_avg.precision - 0.75).abs() < 1e-12);
        assert!((r.macro_avg.recall - (1.0 + 2.0 / 3.0) / 2.0).abs() < 1e-12);
        assert!((r.weighted_avg.precision - (0.5 * 1.0 + 1.0 * 3.0) / 4.0).abs() < 1e-12);
        assert!((r.weighted_avg.recall - 0.75).abs() < 1e-12);
        assert_eq!(r.macro_avg.support, 4);
        assert_eq!(r.weighted_avg.support, 4);

        let table = r.to_string();
        assert!(table.contains("macro avg"));
        assert!(table.contains("weighted avg"));
    }
}
