use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tracks::repo_types::Track;

fn default_layout_version() -> String {
    "GP".to_string()
}

/// Body for POST (create) and PUT (full replace).
#[derive(Debug, Deserialize)]
pub struct CreateTrackRequest {
    pub name: String,
    pub location: String,
    pub country: String,
    #[serde(default = "default_layout_version")]
    pub layout_version: String,
    pub turns: Option<i32>,
    pub length_km: Option<f64>,
}

impl CreateTrackRequest {
    pub fn into_track(self, id: Uuid) -> Track {
        Track {
            id,
            name: self.name,
            location: self.location,
            country: self.country,
            layout_version: self.layout_version,
            turns: self.turns,
            length_km: self.length_km,
        }
    }
}

/// PATCH body; every field optional.
#[derive(Debug, Default, Deserialize)]
pub struct PatchTrackRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub layout_version: Option<String>,
    pub turns: Option<i32>,
    pub length_km: Option<f64>,
}

impl PatchTrackRequest {
    /// Merge into an existing row. Blank name/location/country are treated
    /// as absent; layout_version applies whenever the field is present, even
    /// blank. Numeric fields can be set but never cleared.
    pub fn apply(&self, track: &mut Track) {
        if let Some(name) = non_blank(&self.name) {
            track.name = name.to_string();
        }
        if let Some(location) = non_blank(&self.location) {
            track.location = location.to_string();
        }
        if let Some(country) = non_blank(&self.country) {
            track.country = country.to_string();
        }
        if let Some(layout_version) = &self.layout_version {
            track.layout_version = layout_version.clone();
        }
        if let Some(turns) = self.turns {
            track.turns = Some(turns);
        }
        if let Some(length_km) = self.length_km {
            track.length_km = Some(length_km);
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// List item carrying the identity fields only.
#[derive(Debug, Serialize)]
pub struct TrackSummary {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub country: String,
    pub layout_version: String,
}

impl From<Track> for TrackSummary {
    fn from(track: Track) -> Self {
        Self {
            id: track.id,
            name: track.name,
            location: track.location,
            country: track.country,
            layout_version: track.layout_version,
        }
    }
}

/// Full payload for single-track endpoints.
#[derive(Debug, Serialize)]
pub struct TrackDetails {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub country: String,
    pub layout_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turns: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_km: Option<f64>,
}

impl From<Track> for TrackDetails {
    fn from(track: Track) -> Self {
        Self {
            id: track.id,
            name: track.name,
            location: track.location,
            country: track.country,
            layout_version: track.layout_version,
            turns: track.turns,
            length_km: track.length_km,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monza() -> Track {
        Track {
            id: Uuid::new_v4(),
            name: "Monza".into(),
            location: "Monza".into(),
            country: "Italy".into(),
            layout_version: "GP".into(),
            turns: Some(11),
            length_km: Some(5.793),
        }
    }

    #[test]
    fn create_defaults_layout_version_to_gp() {
        let request: CreateTrackRequest = serde_json::from_str(
            r#"{"name":"Monza","location":"Monza","country":"Italy"}"#,
        )
        .expect("deserialize");
        assert_eq!(request.layout_version, "GP");
        assert!(request.turns.is_none());

        let track = request.into_track(Uuid::new_v4());
        assert_eq!(track.layout_version, "GP");
    }

    #[test]
    fn patch_applies_present_fields() {
        let mut track = monza();
        let patch = PatchTrackRequest {
            name: Some("Autodromo Nazionale Monza".into()),
            turns: Some(12),
            length_km: Some(5.8),
            ..Default::default()
        };
        patch.apply(&mut track);
        assert_eq!(track.name, "Autodromo Nazionale Monza");
        assert_eq!(track.turns, Some(12));
        assert_eq!(track.length_km, Some(5.8));
        // untouched fields survive
        assert_eq!(track.country, "Italy");
        assert_eq!(track.layout_version, "GP");
    }

    #[test]
    fn patch_ignores_blank_name_location_country() {
        let mut track = monza();
        let patch = PatchTrackRequest {
            name: Some("   ".into()),
            location: Some(String::new()),
            country: Some("\t".into()),
            ..Default::default()
        };
        patch.apply(&mut track);
        assert_eq!(track.name, "Monza");
        assert_eq!(track.location, "Monza");
        assert_eq!(track.country, "Italy");
    }

    #[test]
    fn patch_layout_version_applies_even_when_blank() {
        let mut track = monza();
        let patch = PatchTrackRequest {
            layout_version: Some(String::new()),
            ..Default::default()
        };
        patch.apply(&mut track);
        assert_eq!(track.layout_version, "");
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut track = monza();
        let original = track.clone();
        PatchTrackRequest::default().apply(&mut track);
        assert_eq!(track, original);
    }

    #[test]
    fn details_omit_absent_optionals() {
        let mut track = monza();
        track.turns = None;
        track.length_km = None;
        let json = serde_json::to_string(&TrackDetails::from(track)).expect("serialize");
        assert!(!json.contains("turns"));
        assert!(!json.contains("length_km"));
    }
}
