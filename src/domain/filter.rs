use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Default number of tasks requested per list query
pub const DEFAULT_LIMIT: u32 = 10;

/// Limits offered by the filter bar
pub const LIMIT_CHOICES: [u32; 5] = [5, 10, 20, 50, 100];

/// Sort order for the task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Urgency,
    Deadline,
    CreatedAt,
}

impl SortKey {
    /// Parse the `sort` location parameter
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "urgency" => Some(Self::Urgency),
            "deadline" => Some(Self::Deadline),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Urgency => "urgency",
            Self::Deadline => "deadline",
            Self::CreatedAt => "created_at",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Urgency => "Urgency",
            Self::Deadline => "Deadline",
            Self::CreatedAt => "Newest",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Urgency => Self::Deadline,
            Self::Deadline => Self::CreatedAt,
            Self::CreatedAt => Self::Urgency,
        }
    }
}

/// Filter and sort parameters for a list query.
///
/// Serializes as the `list` object of a list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterParams {
    pub query: String,
    pub is_done: Option<bool>,
    pub limit: u32,
    pub sort: SortKey,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            query: String::new(),
            is_done: None,
            limit: DEFAULT_LIMIT,
            sort: SortKey::Urgency,
        }
    }
}

impl FilterParams {
    /// Cycle the completion filter: any -> open -> done -> any
    pub fn cycle_done(&mut self) {
        self.is_done = match self.is_done {
            None => Some(false),
            Some(false) => Some(true),
            Some(true) => None,
        };
    }

    /// Step to the next offered limit, wrapping around
    pub fn cycle_limit(&mut self) {
        let next = LIMIT_CHOICES
            .iter()
            .copied()
            .find(|choice| *choice > self.limit)
            .unwrap_or(LIMIT_CHOICES[0]);
        self.limit = next;
    }

    pub fn cycle_sort(&mut self) {
        self.sort = self.sort.next();
    }

    pub fn done_label(&self) -> &'static str {
        match self.is_done {
            None => "all",
            Some(false) => "open",
            Some(true) => "done",
        }
    }
}

/// View state carried in the location string (`?meeting=..&q=..`)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub meeting: Option<String>,
    pub filter: FilterParams,
}

impl Location {
    /// Read a location string. Unknown keys are ignored and bad values fall
    /// back to their defaults.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let raw = raw.split_once('?').map(|(_, q)| q).unwrap_or(raw);

        let mut location = Location::default();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "meeting" if !value.is_empty() => location.meeting = Some(value.into_owned()),
                "q" => location.filter.query = value.into_owned(),
                "done" => location.filter.is_done = Some(value == "true"),
                "limit" => {
                    location.filter.limit = value
                        .trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|limit| *limit > 0)
                        .unwrap_or(DEFAULT_LIMIT);
                }
                "sort" => {
                    location.filter.sort = SortKey::from_param(&value).unwrap_or_default();
                }
                _ => {}
            }
        }
        location
    }

    /// Serialize to a query string without the leading `?`, omitting defaults
    pub fn to_query(&self) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        if let Some(meeting) = &self.meeting {
            out.append_pair("meeting", meeting);
        }
        if !self.filter.query.is_empty() {
            out.append_pair("q", &self.filter.query);
        }
        if let Some(done) = self.filter.is_done {
            out.append_pair("done", if done { "true" } else { "false" });
        }
        if self.filter.limit != DEFAULT_LIMIT {
            out.append_pair("limit", &self.filter.limit.to_string());
        }
        if self.filter.sort != SortKey::Urgency {
            out.append_pair("sort", self.filter.sort.as_param());
        }
        out.finish()
    }

    /// Location string as shown to the user
    pub fn display(&self) -> String {
        let query = self.to_query();
        if query.is_empty() {
            "/".to_string()
        } else {
            format!("/?{}", query)
        }
    }
}

/// Oldest entries are dropped past this many
pub const HISTORY_LIMIT: usize = 100;

/// Back/forward navigation over pushed locations
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Location>,
    cursor: usize,
}

impl History {
    pub fn new(initial: Location) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &Location {
        &self.entries[self.cursor]
    }

    /// Push a new entry, dropping anything ahead of the cursor.
    /// Pushing the current location again is a no-op.
    pub fn push(&mut self, location: Location) {
        if *self.current() == location {
            return;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(location);
        if self.entries.len() > HISTORY_LIMIT {
            let excess = self.entries.len() - HISTORY_LIMIT;
            self.entries.drain(..excess);
        }
        self.cursor = self.entries.len() - 1;
    }

    pub fn back(&mut self) -> Option<&Location> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor])
    }

    pub fn forward(&mut self) -> Option<&Location> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(&self.entries[self.cursor])
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_defaults() {
        let location = Location::parse("");
        assert_eq!(location, Location::default());
        assert_eq!(location.filter.limit, 10);
        assert_eq!(location.filter.sort, SortKey::Urgency);
        assert_eq!(location.filter.is_done, None);
    }

    #[test]
    fn test_round_trip_omits_defaults() {
        let location = Location {
            meeting: Some("m-1".to_string()),
            filter: FilterParams {
                query: "weekly report".to_string(),
                is_done: Some(false),
                limit: 20,
                sort: SortKey::CreatedAt,
            },
        };
        let query = location.to_query();
        assert_eq!(
            query,
            "meeting=m-1&q=weekly+report&done=false&limit=20&sort=created_at"
        );
        assert_eq!(Location::parse(&query), location);

        let defaults = Location::default();
        assert_eq!(defaults.to_query(), "");
        assert_eq!(Location::parse(&defaults.to_query()), defaults);
    }

    #[test]
    fn test_round_trip_unicode_query() {
        let mut location = Location::default();
        location.filter.query = "写报告 & 总结".to_string();
        location.filter.is_done = Some(true);
        assert_eq!(Location::parse(&location.to_query()), location);
    }

    #[test]
    fn test_parse_accepts_leading_question_mark_and_bad_values() {
        let location = Location::parse("?limit=abc&sort=priority&done=yes&tab=task");
        assert_eq!(location.filter.limit, DEFAULT_LIMIT);
        assert_eq!(location.filter.sort, SortKey::Urgency);
        // Any present value other than "true" reads as false
        assert_eq!(location.filter.is_done, Some(false));

        let location = Location::parse("/?limit=0");
        assert_eq!(location.filter.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_filter_cycles() {
        let mut filter = FilterParams::default();
        filter.cycle_done();
        assert_eq!(filter.is_done, Some(false));
        filter.cycle_done();
        assert_eq!(filter.is_done, Some(true));
        filter.cycle_done();
        assert_eq!(filter.is_done, None);

        filter.cycle_limit();
        assert_eq!(filter.limit, 20);
        filter.limit = 100;
        filter.cycle_limit();
        assert_eq!(filter.limit, 5);

        filter.cycle_sort();
        assert_eq!(filter.sort, SortKey::Deadline);
    }

    #[test]
    fn test_filter_serializes_as_list_params() {
        let json = serde_json::to_value(FilterParams::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"query": "", "is_done": null, "limit": 10, "sort": "urgency"})
        );
    }

    #[test]
    fn test_history_back_forward() {
        let first = Location::default();
        let mut second = Location::default();
        second.filter.query = "a".to_string();
        let mut third = Location::default();
        third.filter.query = "b".to_string();

        let mut history = History::new(first.clone());
        assert!(!history.can_go_back());
        history.push(second.clone());
        history.push(third.clone());

        assert_eq!(history.back(), Some(&second));
        assert_eq!(history.back(), Some(&first));
        assert_eq!(history.back(), None);
        assert_eq!(history.forward(), Some(&second));

        // Pushing from the middle drops the forward branch
        let mut other = Location::default();
        other.filter.limit = 50;
        history.push(other.clone());
        assert!(!history.can_go_forward());
        assert_eq!(history.current(), &other);
    }

    #[test]
    fn test_history_ignores_duplicate_push() {
        let mut history = History::new(Location::default());
        history.push(Location::default());
        assert!(!history.can_go_back());
    }

    #[test]
    fn test_history_drops_oldest_past_limit() {
        let mut history = History::new(Location::default());
        for i in 0..HISTORY_LIMIT + 20 {
            let mut location = Location::default();
            location.filter.query = format!("q{}", i);
            history.push(location);
        }

        let mut steps = 0;
        while history.back().is_some() {
            steps += 1;
        }
        assert_eq!(steps, HISTORY_LIMIT - 1);
        assert_eq!(history.current().filter.query, "q20");
        assert!(history.forward().is_some());
    }
}
