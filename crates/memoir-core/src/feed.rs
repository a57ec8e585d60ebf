//! Grouping of stories into the calendar-day feed.

use serde::Serialize;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::Story;

/// One calendar-day bucket of the feed. The date is the story instant
/// rendered in the observer's zone.
#[derive(Debug, Clone, Serialize)]
pub struct DayGroup {
    pub date: Date,
    pub stories: Vec<Story>,
}

/// The grouped feed, newest day first.
pub type Feed = Vec<DayGroup>;

/// Sort stories newest-first and bucket them by local calendar date.
/// Buckets inherit the order of their most recent member.
pub fn group_stories(mut stories: Vec<Story>, zone: UtcOffset) -> Feed {
    stories.sort_by(|a, b| b.date.cmp(&a.date));

    let mut groups: Feed = Vec::new();
    for story in stories {
        let day = story.date.to_offset(zone).date();
        match groups.last_mut() {
            Some(group) if group.date == day => group.stories.push(story),
            _ => groups.push(DayGroup {
                date: day,
                stories: vec![story],
            }),
        }
    }
    groups
}

/// The `[midnight, next midnight)` window of `date` in `zone`, as instants.
pub fn day_window(date: Date, zone: UtcOffset) -> (OffsetDateTime, OffsetDateTime) {
    let next = date.next_day().unwrap_or(Date::MAX);
    (
        date.midnight().assume_offset(zone),
        next.midnight().assume_offset(zone),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mood;
    use time::macros::{date, datetime};

    fn story_at(date: OffsetDateTime) -> Story {
        Story::new("t", "d", Mood::Neutral).with_date(date)
    }

    #[test]
    fn test_groups_days_and_stories_newest_first() {
        let stories = vec![
            story_at(datetime!(2024-01-02 10:00 UTC)),
            story_at(datetime!(2024-01-02 18:00 UTC)),
            story_at(datetime!(2024-01-01 09:00 UTC)),
        ];

        let feed = group_stories(stories, UtcOffset::UTC);

        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].date, date!(2024-01-02));
        assert_eq!(feed[0].stories.len(), 2);
        assert_eq!(feed[0].stories[0].date, datetime!(2024-01-02 18:00 UTC));
        assert_eq!(feed[0].stories[1].date, datetime!(2024-01-02 10:00 UTC));
        assert_eq!(feed[1].date, date!(2024-01-01));
        assert_eq!(feed[1].stories[0].date, datetime!(2024-01-01 09:00 UTC));
    }

    #[test]
    fn test_grouping_respects_zone_offset() {
        // 23:30 UTC on Jan 1 is already Jan 2 at +02:00.
        let stories = vec![story_at(datetime!(2024-01-01 23:30 UTC))];

        let feed = group_stories(stories, UtcOffset::from_hms(2, 0, 0).unwrap());

        assert_eq!(feed[0].date, date!(2024-01-02));
    }

    #[test]
    fn test_day_window_is_half_open() {
        let (start, end) = day_window(date!(2024-01-02), UtcOffset::UTC);

        assert_eq!(start, datetime!(2024-01-02 00:00 UTC));
        assert_eq!(end, datetime!(2024-01-03 00:00 UTC));
    }
}
