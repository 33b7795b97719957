//! Normalization of rating conventions to a popularity fraction.
//!
//! Taggers disagree on how ratings are stored. MediaMonkey and MusicBee style freeform rating
//! atoms hold a percentage from 0 to 100, APE tags hold discrete half star steps from 0 to 10.
//! All of them are mapped onto a fraction in `0.0..=1.0` where 1.0 means five stars.

/// Converts a stored percentage (0..=100) to a popularity fraction.
pub(crate) fn from_percent(percent: u8) -> f32 {
    (percent.min(100) as f32 / 100.0).clamp(0.0, 1.0)
}

/// Converts a popularity fraction to a stored percentage.
pub(crate) fn to_percent(popularity: f32) -> u8 {
    (popularity.clamp(0.0, 1.0) * 100.0).round() as u8
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn percent_star_grid() {
        // 0, 0.5, 1, .., 5 stars in percent steps of 10
        for steps in 0..=10u8 {
            let percent = steps * 10;
            let stars = steps as f32 / 2.0;
            let popularity = from_percent(percent);
            assert!((popularity - stars / 5.0).abs() < f32::EPSILON);
            assert_eq!(to_percent(popularity), percent);
        }
    }

    #[test]
    fn clamping() {
        assert_eq!(from_percent(255), 1.0);
        assert_eq!(to_percent(2.0), 100);
        assert_eq!(to_percent(-1.0), 0);
    }
}
