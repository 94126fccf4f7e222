//! Sample paths served when a requested path id is not in storage
//!
//! Ids 1 and 2 map to the programming and data science samples; every other
//! id gets a generic placeholder. The output is a pure function of the ids.

use crate::db::models::{ContentProgress, PathMetadata};
use crate::views::{ContentSummaryView, PathDetailView, UserProgressView};

/// Fixed timestamp used for every mock `created_at` / `enrolled_at`
pub const MOCK_TIMESTAMP: &str = "2025-03-28T20:00:00Z";

struct Sample {
    title: String,
    description: String,
    subject: &'static str,
    contents: [(&'static str, &'static str); 2],
}

fn sample_for(path_id: i64) -> Sample {
    match path_id {
        1 => Sample {
            title: "Python Programming Basics".to_string(),
            description: "Learn Python programming from scratch".to_string(),
            subject: "programming",
            contents: [
                ("Python Syntax Basics", "Core syntax and built-in data types"),
                ("Functions and Modules", "Defining functions and organizing code into modules"),
            ],
        },
        2 => Sample {
            title: "Introduction to Data Analysis".to_string(),
            description: "Master the fundamentals of data analysis".to_string(),
            subject: "data_science",
            contents: [
                ("Data Analysis Overview", "Key concepts and the analysis workflow"),
                ("Data Cleaning and Preprocessing", "Techniques for cleaning and preparing data"),
            ],
        },
        other => Sample {
            title: format!("Sample Learning Path {}", other),
            description: format!("Placeholder learning path {}", other),
            subject: "other",
            contents: [
                ("Fundamentals", "Foundational concepts"),
                ("Going Further", "A deeper look at the core ideas"),
            ],
        },
    }
}

/// Build the mock detail for `path_id`.
///
/// `user_progress` is an empty snapshot when a user id is supplied and
/// `null` otherwise.
pub fn mock_path(path_id: i64, user_id: Option<i64>) -> PathDetailView {
    let sample = sample_for(path_id);

    let contents = sample
        .contents
        .iter()
        .zip([(101, "video", 1), (102, "interactive", 2)])
        .map(|((title, description), (id, content_type, level))| ContentSummaryView {
            id,
            title: title.to_string(),
            description: Some(description.to_string()),
            content_type: content_type.to_string(),
            subject: sample.subject.to_string(),
            difficulty_level: level,
        })
        .collect();

    PathDetailView {
        id: path_id,
        title: sample.title,
        description: sample.description,
        subject: sample.subject.to_string(),
        difficulty_level: 2,
        estimated_hours: Some(25.0),
        created_at: MOCK_TIMESTAMP.to_string(),
        metadata: PathMetadata {
            goals: vec![
                "Master the core syntax".to_string(),
                "Understand the key concepts".to_string(),
            ],
            prerequisites: vec![],
            difficulty: "beginner".to_string(),
        },
        contents,
        user_progress: user_id.map(|_| UserProgressView {
            overall_progress: 0.0,
            content_progress: ContentProgress::new(),
            enrolled_at: MOCK_TIMESTAMP.to_string(),
        }),
    }
}
