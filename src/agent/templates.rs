//! Canned bilingual responses, used when no language model is configured
//! or as the fallback when a remote call fails.
//!
//! Language choice is a marker-word heuristic over the user's original
//! message: if it contains any common Roman Urdu word, the Urdu template
//! set is used, otherwise English.

use super::intent::Intent;

const URDU_MARKERS: [&str; 7] = ["hai", "karna", "kal", "aaj", "mera", "mere", "kaam"];

/// Marker-word check for Roman Urdu input.
pub fn is_roman_urdu(message: &str) -> bool {
    let lowered = message.to_lowercase();
    URDU_MARKERS.iter().any(|w| lowered.contains(w))
}

/// Render the canned reply for `intent`, in the language detected from
/// `original_message`.
pub fn render(intent: &Intent, original_message: &str) -> String {
    if is_roman_urdu(original_message) {
        render_urdu(intent)
    } else {
        render_english(intent)
    }
}

fn render_english(intent: &Intent) -> String {
    match intent {
        Intent::CreateTask { title, .. } => {
            format!("✅ I've created task: '{title}'")
        }
        Intent::ListTasks { .. } => "📋 Here are your tasks:".to_string(),
        Intent::SummarizeTasks => "📊 Here's a summary of your tasks:".to_string(),
        Intent::DeleteTask { task_id } => {
            format!("🗑️ Task #{task_id} has been deleted")
        }
        Intent::CompleteTask { task_id } => {
            format!("✅ Great job! Task #{task_id} marked complete!")
        }
        Intent::UpdateTask { new_title, .. } => {
            format!("✏️ Task updated to: '{new_title}'")
        }
        Intent::Help => "👋 I can help you manage tasks! Try saying:\n\
                         - \"Add task buy milk tomorrow\"\n\
                         - \"Kal doodh lena hai\" (Roman Urdu)\n\
                         - \"Show my tasks\"\n\
                         - \"Mark task 1 as done\"\n\
                         - \"Delete task 3\""
            .to_string(),
        Intent::Unknown { .. } => {
            "🤔 I didn't understand. Try: 'Add task buy milk' or 'Show my tasks'".to_string()
        }
    }
}

fn render_urdu(intent: &Intent) -> String {
    match intent {
        Intent::CreateTask { title, .. } => {
            format!("✅ Task ban gaya: '{title}'")
        }
        Intent::ListTasks { .. } => "📋 Ye rahe aapke tasks:".to_string(),
        Intent::SummarizeTasks => "📊 Aapke tasks ka khulasa:".to_string(),
        Intent::DeleteTask { task_id } => {
            format!("🗑️ Task #{task_id} delete ho gaya")
        }
        Intent::CompleteTask { task_id } => {
            format!("✅ Shabaash! Task #{task_id} complete ho gaya!")
        }
        Intent::UpdateTask { new_title, .. } => {
            format!("✏️ Task update ho gaya: '{new_title}'")
        }
        Intent::Help => "👋 Main aapki madad kar sakta hoon! Try karein:\n\
                         - \"Add task buy milk tomorrow\"\n\
                         - \"Kal doodh lena hai\"\n\
                         - \"Show my tasks\"\n\
                         - \"Task 1 complete karo\"\n\
                         - \"Delete task 3\""
            .to_string(),
        Intent::Unknown { .. } => {
            "🤔 Samajh nahi aaya. Try karein: 'Add task buy milk' ya 'Show my tasks'".to_string()
        }
    }
}
