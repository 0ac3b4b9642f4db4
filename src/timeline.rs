use chrono::NaiveTime;

use crate::models::SetlistEntry;
use crate::timecode::seconds_between;

/// One timed entry as shown on the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEvent {
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// The song name.
    pub headline: String,
    /// Transition, duration and footnote joined with ` / `.
    pub body: String,
    /// Set number; events are grouped by it.
    pub group: u32,
}

impl TimelineEvent {
    pub fn seconds(&self) -> i64 {
        seconds_between(self.start, self.end)
    }
}

/// Project every entry that has both times set. Untimed entries are left out
/// here but still show up in the plain listing.
pub fn project(setlist: &[SetlistEntry]) -> Vec<TimelineEvent> {
    setlist
        .iter()
        .filter_map(|entry| {
            let (start, end) = (entry.start_time?, entry.end_time?);
            Some(TimelineEvent {
                start,
                end,
                headline: entry.song_name.clone(),
                body: format!(
                    "Transition: {} / Duration: {} / Footnote: {}",
                    entry.transition,
                    entry.duration_label(),
                    entry.footnote.as_deref().unwrap_or("")
                ),
                group: entry.set_number,
            })
        })
        .collect()
}

/// Split projected events into per-set runs, in first-seen set order.
pub fn group_by_set(events: &[TimelineEvent]) -> Vec<(u32, Vec<&TimelineEvent>)> {
    let mut groups: Vec<(u32, Vec<&TimelineEvent>)> = Vec::new();
    for event in events {
        match groups.iter_mut().find(|(set, _)| *set == event.group) {
            Some((_, members)) => members.push(event),
            None => groups.push((event.group, vec![event])),
        }
    }
    groups
}
