use meditate_rs_protocol::GenerateMeditationRequest;
use serde_json::json;

/// Script of exactly `count` whitespace-separated words.
pub fn script_with_words(count: usize) -> String {
    let mut words = vec!["Welcome".to_string()];
    words.extend((1..count).map(|idx| format!("breath{idx}")));
    words.truncate(count);
    words.join(" ")
}

pub fn request(emotions: &[&str], goals: &[&str], outcomes: &[&str]) -> GenerateMeditationRequest {
    GenerateMeditationRequest {
        emotions: json!(emotions),
        goals: json!(goals),
        outcomes: json!(outcomes),
        title: None,
    }
}
