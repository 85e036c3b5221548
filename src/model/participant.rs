use serde::Serialize;

/// A couple's profile with its competition history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: String,
    pub club: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latin_class: Option<String>,
    pub competitions: Vec<ParticipantCompetition>,
}

/// A past start of the couple.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantCompetition {
    pub date: String,
    pub event: String,
    pub category: String,
    pub participants_count: String,
    pub position: String,
    pub standard: String,
    pub latin: String,
    pub points: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_link: Option<String>,
}
