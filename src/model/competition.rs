use serde::Serialize;

/// Announcement details from a competition's info page.
///
/// Every field defaults to an empty string when its label is missing upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionInfo {
    pub title: String,
    pub date: String,
    pub location: String,
    /// Free text with `<br>` line breaks turned into `\n`.
    pub info: String,
    pub organizer: String,
    pub organizer_address: String,
    pub organizer_phone: String,
    pub organizer_email: String,
    pub organizer_website: String,
    pub representative: String,
    pub deadline: String,
    pub venue_capacity: String,
    pub dance_floor_size: String,
    pub dance_floor_surface: String,
    pub entrance_fee: String,
    pub awards: String,
    pub notes: String,
}

/// Final standings, judges and officials of a single competition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionResults {
    pub title: String,
    pub date: String,
    pub location: String,
    pub organizer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer_representative: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_count: Option<String>,
    pub judges: Vec<Judge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commissioner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supervisor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub announcer: Option<String>,
    pub counters: Vec<String>,
    pub results: Vec<ResultEntry>,
}

impl CompetitionResults {
    /// Whether any official besides the judges is known.
    pub fn has_officials(&self) -> bool {
        self.commissioner.is_some()
            || self.supervisor.is_some()
            || self.announcer.is_some()
            || !self.counters.is_empty()
    }
}

/// A judge on the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Judge {
    pub name: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Single-letter code used as column header on the marks sheet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// One line of the results table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEntry {
    pub position: String,
    pub number: String,
    pub name: String,
    pub club: String,
    /// Nearest preceding round header ("Döntő", "Elődöntő", ...), empty if none.
    pub section: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_link: Option<String>,
}

/// Registered couples of a competition, grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryList {
    pub title: String,
    pub date: String,
    pub location: String,
    pub participant_count: String,
    pub categories: Vec<EntryCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryCategory {
    pub name: String,
    pub participants: Vec<Entrant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entrant {
    pub number: String,
    pub name: String,
    pub club: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}
