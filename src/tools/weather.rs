//! Canned weather lookup tool
//!
//! A demo stand-in for a real weather service: a fixed table of city
//! descriptions, case-insensitive on input, total on unknown cities.

use super::{Tool, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

/// Mock weather data, keyed by lowercase city name
pub(crate) const WEATHER_TABLE: &[(&str, &str)] = &[
    ("new york", "Sunny, 22°C (72°F) with light winds"),
    ("london", "Cloudy, 15°C (59°F) with occasional drizzle"),
    ("tokyo", "Rainy, 18°C (64°F) with high humidity"),
    ("karachi", "Hot and sunny, 35°C (95°F) with clear skies"),
    ("islamabad", "Pleasant, 28°C (82°F) with partly cloudy skies"),
    ("lahore", "Warm and humid, 32°C (90°F) with hazy conditions"),
    ("paris", "Mild, 20°C (68°F) with overcast skies"),
    ("delhi", "Very hot, 42°C (108°F) with dusty conditions"),
    ("dubai", "Extremely hot, 45°C (113°F) with bright sunshine"),
    ("sydney", "Cool, 16°C (61°F) with partly cloudy skies"),
    ("mumbai", "Hot and humid, 34°C (93°F) with monsoon clouds"),
    ("toronto", "Cold, 5°C (41°F) with snow showers"),
];

/// Number of sample cities named in the unknown-city response
const SAMPLE_CITIES: usize = 6;

/// Title-case each whitespace-separated word
pub(crate) fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a weather reply for a city, or the known-city sample for misses
pub(crate) fn weather_for(city: &str) -> String {
    let needle = city.trim().to_lowercase();
    match WEATHER_TABLE.iter().find(|(name, _)| *name == needle) {
        Some((name, description)) => {
            format!("Weather in {}: {}", title_case(name), description)
        }
        None => {
            let sample = WEATHER_TABLE
                .iter()
                .take(SAMPLE_CITIES)
                .map(|(name, _)| title_case(name))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "I don't have weather data for {}. This is a demo function with data for: {}, and more. Try asking about one of these cities!",
                city.trim(),
                sample
            )
        }
    }
}

pub struct WeatherTool;

#[derive(Debug, Deserialize)]
struct WeatherInput {
    city: String,
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &'static str {
        "get_weather_info"
    }

    fn description(&self) -> String {
        "Get weather information for a given city.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["city"],
            "properties": {
                "city": {
                    "type": "string",
                    "description": "Name of the city to look up"
                }
            }
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        match serde_json::from_value::<WeatherInput>(input) {
            Ok(args) => ToolOutput::success(weather_for(&args.city)),
            Err(e) => ToolOutput::error(format!("Invalid input: {e}")),
        }
    }
}
