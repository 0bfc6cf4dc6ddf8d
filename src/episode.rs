use regex::Regex;

/// Numbers that show up in release names as codec or resolution tags.
const BLACKLISTED_NUMBERS: [u32; 4] = [264, 265, 720, 480];

/// Pulls an episode number out of a loosely named filename stem.
#[derive(Debug, Clone)]
pub struct EpisodeExtractor {
    marker_pattern: Regex,
    digits_pattern: Regex,
}

impl EpisodeExtractor {
    pub fn new() -> Self {
        let marker_pattern =
            Regex::new(r"(?i)(?:e|ep|第)\s*([0-9]+)").expect("episode marker pattern compiles");
        let digits_pattern = Regex::new(r"[0-9]+").expect("digit run pattern compiles");

        Self {
            marker_pattern,
            digits_pattern,
        }
    }

    /// Returns the inferred episode, or `None` when nothing in the stem looks like one.
    ///
    /// An explicit marker (`E07`, `EP 12`, `第3集`) wins. Otherwise the last
    /// digit run below 1000 that is not a codec/resolution tag is taken.
    ///
    /// Full-width digits (`第３集`, `０５`) count the same as ASCII ones.
    pub fn extract(&self, stem: &str) -> Option<u32> {
        let stem = normalize_digits(stem);
        if let Some(episode) = self.from_marker(&stem) {
            return Some(episode);
        }
        self.from_trailing_number(&stem)
    }

    fn from_marker(&self, stem: &str) -> Option<u32> {
        let captures = self.marker_pattern.captures(stem)?;
        captures.get(1)?.as_str().parse().ok()
    }

    fn from_trailing_number(&self, stem: &str) -> Option<u32> {
        self.digits_pattern
            .find_iter(stem)
            .filter_map(|run| run.as_str().parse::<u32>().ok())
            .filter(|value| *value < 1000 && !BLACKLISTED_NUMBERS.contains(value))
            .last()
    }
}

fn normalize_digits(stem: &str) -> String {
    stem.chars()
        .map(|c| match c {
            '\u{FF10}'..='\u{FF19}' => char::from(b'0' + (c as u32 - 0xFF10) as u8),
            _ => c,
        })
        .collect()
}

impl Default for EpisodeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_takes_priority() {
        let extractor = EpisodeExtractor::new();
        assert_eq!(extractor.extract("Show.S01E07.1080p"), Some(7));
        assert_eq!(extractor.extract("show ep 12 720p"), Some(12));
        assert_eq!(extractor.extract("猪猪侠 第3集"), Some(3));
    }

    #[test]
    fn test_last_surviving_number() {
        let extractor = EpisodeExtractor::new();
        assert_eq!(extractor.extract("Show.1080p.03"), Some(3));
        assert_eq!(extractor.extract("[Group] 05 [x264]"), Some(5));
        assert_eq!(extractor.extract("Show 480"), None);
    }

    #[test]
    fn test_full_width_digits() {
        let extractor = EpisodeExtractor::new();
        assert_eq!(extractor.extract("猪猪侠 第３集"), Some(3));
        assert_eq!(extractor.extract("猪猪侠 ０５"), Some(5));
        assert_eq!(extractor.extract("猪猪侠 第１２集 ７２０"), Some(12));
    }

    #[test]
    fn test_no_digits() {
        let extractor = EpisodeExtractor::new();
        assert_eq!(extractor.extract("Show.Special"), None);
    }
}
