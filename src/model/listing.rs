use serde::Serialize;

/// Competitions of a calendar page, grouped by month panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompetitionListing {
    pub months: Vec<Month>,
}

impl CompetitionListing {
    pub fn competition_count(&self) -> usize {
        self.months.iter().map(|m| m.competitions.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Month {
    pub name: String,
    pub competitions: Vec<Competition>,
}

/// A competition day as announced on the calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Competition {
    /// `YYYY.MM.DD` as printed upstream.
    pub date: String,
    pub title: String,
    pub location: String,
    pub categories: Vec<Category>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact_location: Option<String>,
}

/// A category (age group and class) held at a competition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    /// Link to the category's results, empty while the competition is upcoming.
    pub url: String,
}
