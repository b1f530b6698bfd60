/// Fixed head-count ranges a company size pair can fall into.
///
/// Only exact `(low, high)` matches are recognised. Any other pair has no
/// bucket and is left out of the size dimension entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SizeBucket {
    One,
    TwoToTen,
    ElevenToFifty,
    FiftyOneToTwoHundred,
    TwoHundredOneToFiveHundred,
    FiveHundredOneToOneThousand,
    OneThousandOneToFiveThousand,
    FiveThousandOneToTenThousand,
    TenThousandOnePlus,
}

impl SizeBucket {
    pub const ALL: [SizeBucket; 9] = [
        SizeBucket::One,
        SizeBucket::TwoToTen,
        SizeBucket::ElevenToFifty,
        SizeBucket::FiftyOneToTwoHundred,
        SizeBucket::TwoHundredOneToFiveHundred,
        SizeBucket::FiveHundredOneToOneThousand,
        SizeBucket::OneThousandOneToFiveThousand,
        SizeBucket::FiveThousandOneToTenThousand,
        SizeBucket::TenThousandOnePlus,
    ];

    /// Inclusive bounds; `None` as the upper bound means open-ended.
    pub fn bounds(self) -> (i64, Option<i64>) {
        match self {
            SizeBucket::One => (1, Some(1)),
            SizeBucket::TwoToTen => (2, Some(10)),
            SizeBucket::ElevenToFifty => (11, Some(50)),
            SizeBucket::FiftyOneToTwoHundred => (51, Some(200)),
            SizeBucket::TwoHundredOneToFiveHundred => (201, Some(500)),
            SizeBucket::FiveHundredOneToOneThousand => (501, Some(1000)),
            SizeBucket::OneThousandOneToFiveThousand => (1001, Some(5000)),
            SizeBucket::FiveThousandOneToTenThousand => (5001, Some(10000)),
            SizeBucket::TenThousandOnePlus => (10001, None),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SizeBucket::One => "1",
            SizeBucket::TwoToTen => "2-10",
            SizeBucket::ElevenToFifty => "11-50",
            SizeBucket::FiftyOneToTwoHundred => "51-200",
            SizeBucket::TwoHundredOneToFiveHundred => "201-500",
            SizeBucket::FiveHundredOneToOneThousand => "501-1000",
            SizeBucket::OneThousandOneToFiveThousand => "1001-5000",
            SizeBucket::FiveThousandOneToTenThousand => "5001-10000",
            SizeBucket::TenThousandOnePlus => "10001+",
        }
    }

    pub fn from_bounds(low: i64, high: Option<i64>) -> Option<SizeBucket> {
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.bounds() == (low, high))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_pair_resolves_to_label() {
        let bucket = SizeBucket::from_bounds(11, Some(50)).unwrap();
        assert_eq!(bucket.label(), "11-50");
    }

    #[test]
    fn test_unlisted_pair_has_no_bucket() {
        assert_eq!(SizeBucket::from_bounds(7, Some(9)), None);
        assert_eq!(SizeBucket::from_bounds(11, Some(51)), None);
        assert_eq!(SizeBucket::from_bounds(11, None), None);
    }

    #[test]
    fn test_open_ended_bucket() {
        assert_eq!(
            SizeBucket::from_bounds(10001, None),
            Some(SizeBucket::TenThousandOnePlus)
        );
        assert_eq!(SizeBucket::from_bounds(10001, Some(20000)), None);
    }

    #[test]
    fn test_labels_are_distinct() {
        let mut labels: Vec<&str> = SizeBucket::ALL.iter().map(|b| b.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), SizeBucket::ALL.len());
    }
}
