use serde::Deserialize;

use questify_database::model::calendar::ImportedEvent;

const UNTITLED: &str = "(no title)";

#[derive(Debug, Default, Deserialize)]
pub struct GoogleEventList {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleEvent {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start: GoogleEventTime,
    #[serde(default)]
    pub end: GoogleEventTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct GoogleEventTime {
    #[serde(default, rename = "dateTime")]
    pub date_time: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GraphEventList {
    #[serde(default)]
    pub value: Vec<GraphEvent>,
}

#[derive(Debug, Deserialize)]
pub struct GraphEvent {
    pub id: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default, rename = "bodyPreview")]
    pub body_preview: Option<String>,
    pub start: GraphEventTime,
    pub end: GraphEventTime,
}

#[derive(Debug, Deserialize)]
pub struct GraphEventTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
}

/// Google events; all-day entries span the whole day in UTC.
/// Entries without any start or end are skipped.
pub fn from_google(list: GoogleEventList) -> Vec<ImportedEvent> {
    list.items
        .into_iter()
        .filter_map(|event| {
            let start = google_time(&event.start, "T00:00:00Z")?;
            let end = google_time(&event.end, "T23:59:59Z")?;
            Some(ImportedEvent {
                external_id: event.id,
                title: title_or_default(event.summary),
                start,
                end,
                description: event.description,
            })
        })
        .collect()
}

/// Microsoft Graph events; Graph reports UTC wall time without an offset.
pub fn from_graph(list: GraphEventList) -> Vec<ImportedEvent> {
    list.value
        .into_iter()
        .map(|event| ImportedEvent {
            external_id: event.id,
            title: title_or_default(event.subject),
            start: with_utc_suffix(event.start.date_time),
            end: with_utc_suffix(event.end.date_time),
            description: event.body_preview.filter(|preview| !preview.trim().is_empty()),
        })
        .collect()
}

fn google_time(time: &GoogleEventTime, all_day_suffix: &str) -> Option<String> {
    time.date_time
        .clone()
        .or_else(|| time.date.as_ref().map(|date| format!("{date}{all_day_suffix}")))
}

fn title_or_default(raw: Option<String>) -> String {
    raw.map(|title| title.trim().to_owned())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| UNTITLED.to_owned())
}

fn with_utc_suffix(date_time: String) -> String {
    if date_time.ends_with('Z') {
        date_time
    } else {
        format!("{date_time}Z")
    }
}

#[cfg(test)]
mod tests {
    use super::{GoogleEventList, GraphEventList, from_google, from_graph};

    #[test]
    fn google_timed_and_all_day_events() {
        let list: GoogleEventList = serde_json::from_value(serde_json::json!({
            "items": [
                {
                    "id": "a1",
                    "summary": "Raid night",
                    "start": {"dateTime": "2024-05-01T18:00:00Z"},
                    "end": {"dateTime": "2024-05-01T20:00:00Z"}
                },
                {
                    "id": "b2",
                    "start": {"date": "2024-05-03"},
                    "end": {"date": "2024-05-03"}
                },
                {
                    "id": "c3",
                    "summary": "broken"
                }
            ]
        }))
        .unwrap();

        let events = from_google(list);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "Raid night");
        assert_eq!(events[0].start, "2024-05-01T18:00:00Z");
        assert_eq!(events[1].title, "(no title)");
        assert_eq!(events[1].start, "2024-05-03T00:00:00Z");
        assert_eq!(events[1].end, "2024-05-03T23:59:59Z");
    }

    #[test]
    fn graph_events_gain_utc_suffix() {
        let list: GraphEventList = serde_json::from_value(serde_json::json!({
            "value": [
                {
                    "id": "m1",
                    "subject": "Standup",
                    "bodyPreview": "",
                    "start": {"dateTime": "2024-05-01T09:00:00.0000000"},
                    "end": {"dateTime": "2024-05-01T09:15:00.0000000"}
                }
            ]
        }))
        .unwrap();

        let events = from_graph(list);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].external_id, "m1");
        assert_eq!(events[0].start, "2024-05-01T09:00:00.0000000Z");
        assert_eq!(events[0].description, None);
    }
}
