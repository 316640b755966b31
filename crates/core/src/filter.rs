use std::cmp::Ordering;

use crate::VideoProgress;

/// Result of filtering a snapshot for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilteredVideos {
    /// The collection itself is empty.
    NoVideos,
    /// The collection has records but none match the search term.
    NoMatches,
    Matches(Vec<VideoProgress>),
}

impl FilteredVideos {
    /// Matching records, empty for both empty states.
    #[must_use]
    pub fn into_vec(self) -> Vec<VideoProgress> {
        match self {
            Self::Matches(videos) => videos,
            Self::NoVideos | Self::NoMatches => Vec::new(),
        }
    }
}

/// Case-insensitive substring search, sorted by name.
#[must_use]
pub fn filter_videos(videos: &[VideoProgress], search: &str) -> FilteredVideos {
    if videos.is_empty() {
        return FilteredVideos::NoVideos;
    }
    let needle = search.trim().to_lowercase();
    let mut matches: Vec<VideoProgress> = videos
        .iter()
        .filter(|v| needle.is_empty() || v.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    if matches.is_empty() {
        return FilteredVideos::NoMatches;
    }
    matches.sort_by(|a, b| compare_names(&a.name, &b.name));
    FilteredVideos::Matches(matches)
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewVideo;

    fn videos(names: &[&str]) -> Vec<VideoProgress> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| NewVideo::new(n, 1, "u").unwrap().into_video(format!("id-{i}")))
            .collect()
    }

    fn names(filtered: FilteredVideos) -> Vec<String> {
        filtered.into_vec().into_iter().map(|v| v.name).collect()
    }

    #[test]
    fn sorts_case_insensitively() {
        let all = videos(&["dark", "Arcane", "Blue Eye Samurai"]);
        assert_eq!(names(filter_videos(&all, "")), vec!["Arcane", "Blue Eye Samurai", "dark"]);
    }

    #[test]
    fn search_matches_substring_ignoring_case() {
        let all = videos(&["Arcane", "The Bear", "Bear Grylls"]);
        assert_eq!(names(filter_videos(&all, "BEAR")), vec!["Bear Grylls", "The Bear"]);
    }

    #[test]
    fn distinguishes_empty_states() {
        assert_eq!(filter_videos(&[], "x"), FilteredVideos::NoVideos);
        assert_eq!(filter_videos(&videos(&["Arcane"]), "zzz"), FilteredVideos::NoMatches);
    }
}
