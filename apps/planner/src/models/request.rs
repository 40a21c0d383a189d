//! Ephemeral input to a generation run, assembled at job time from
//! collaborator-provided values. Nothing here is persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripFacts {
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub group_size: u32,
}

impl TripFacts {
    /// Inclusive day span: a trip from the 15th to the 17th lasts 3 days.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// Every field optional; absent preferences are simply left out of the
/// prompt, never replaced with placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TravelPreferences {
    pub budget: Option<String>,
    pub accommodation: Option<String>,
    pub activities: Option<Vec<String>>,
    pub eating_habits: Option<String>,
}

impl TravelPreferences {
    pub fn is_empty(&self) -> bool {
        self.budget.is_none()
            && self.accommodation.is_none()
            && self.activities.is_none()
            && self.eating_habits.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub include_budget_breakdown: bool,
    pub include_restaurants: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub facts: TripFacts,
    pub preferences: TravelPreferences,
    pub notes: Vec<String>,
    pub options: GenerationOptions,
}

#[cfg(test)]
pub(crate) fn sample_request() -> GenerationRequest {
    GenerationRequest {
        facts: TripFacts {
            destination: "Lisbon".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 7, 17).unwrap(),
            group_size: 2,
        },
        preferences: TravelPreferences {
            budget: Some("mid-range".to_string()),
            accommodation: Some("boutique hotel".to_string()),
            activities: Some(vec!["food tours".to_string(), "museums".to_string()]),
            eating_habits: Some("vegetarian".to_string()),
        },
        notes: vec![
            "We want to see the Alfama district".to_string(),
            "No early mornings please".to_string(),
        ],
        options: GenerationOptions {
            include_budget_breakdown: true,
            include_restaurants: true,
        },
    }
}
