//! Rule-based intent parser.
//!
//! A pure function from a raw message to a classified [`Intent`]. The
//! message is lower-cased and trimmed, then a fixed ordered list of regex
//! patterns is tried per category with un-anchored search; first match wins
//! within a category, and categories are tried in a fixed priority order:
//! create → list → summarize → complete → delete → update → help → unknown.
//! The order is load-bearing — several patterns overlap and changing it
//! changes classification.
//!
//! Patterns cover English plus Roman Urdu (Urdu written in Latin script),
//! e.g. "Kal doodh lena hai" → create_task.

use std::sync::LazyLock;

use regex::Regex;

/// Classified purpose of a chat message, with extracted parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    CreateTask {
        title: String,
        description: String,
        date_hint: Option<String>,
    },
    ListTasks {
        /// Raw status filter word as typed (`pending`/`active`/`completed`).
        status: Option<String>,
    },
    SummarizeTasks,
    CompleteTask {
        task_id: i64,
    },
    DeleteTask {
        task_id: i64,
    },
    UpdateTask {
        task_id: i64,
        new_title: String,
    },
    Help,
    Unknown {
        original_message: String,
    },
}

impl Intent {
    /// Stable tag used in message metadata and the chat response.
    pub fn name(&self) -> &'static str {
        match self {
            Intent::CreateTask { .. } => "create_task",
            Intent::ListTasks { .. } => "list_tasks",
            Intent::SummarizeTasks => "summarize_tasks",
            Intent::CompleteTask { .. } => "complete_task",
            Intent::DeleteTask { .. } => "delete_task",
            Intent::UpdateTask { .. } => "update_task",
            Intent::Help => "help",
            Intent::Unknown { .. } => "unknown",
        }
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("static intent pattern"))
        .collect()
}

// English create patterns first, then the Roman Urdu ones; the trailing
// "<text> lena/karna/hai" pattern is deliberately broad and must stay last.
static CREATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?:add|create|new)\s+(?:task\s+)?(?:to\s+)?(.+)",
        r"i\s+(?:need|want)\s+(?:to\s+)?(.+)",
        r"reminder?\s+(?:to\s+)?(.+)",
        r"(?:kal|aaj|parso)\s+(.+)\s+(?:hai|karna)",
        r"(.+)\s+(?:lena|karna|hai)",
    ])
});

static DATE_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(tomorrow|today|kal|aaj|parso|next\s+\w+|\d+/\d+)").expect("static date pattern")
});

static LIST_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?:show|list|get|view)\s+(?:my\s+)?(?:tasks|todos)",
        r"what\s+(?:are\s+)?my\s+(?:tasks|todos)",
        r"(?:pending|active|completed)\s+(?:tasks|todos)",
        r"mere\s+(?:tasks|kaam)",
    ])
});

static STATUS_FILTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(pending|active|completed)").expect("static status pattern"));

static COMPLETE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?:mark|complete|finish|done)\s+(?:task\s+)?(?:id\s+)?(\d+)",
        r"(?:task|kaam)\s+(\d+)\s+(?:complete|khatam|done)",
    ])
});

static DELETE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?:delete|remove|cancel)\s+(?:task\s+)?(?:id\s+)?(\d+)",
        r"(?:task|kaam)\s+(\d+)\s+(?:delete|hata)",
    ])
});

static UPDATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:update|change|edit)\s+(?:task\s+)?(?:id\s+)?(\d+)\s+(?:to\s+)?(.+)")
        .expect("static update pattern")
});

const SUMMARIZE_KEYWORDS: [&str; 4] = ["summarize", "summary", "overview", "kitne tasks"];
const HELP_KEYWORDS: [&str; 3] = ["help", "kya kar sakte", "commands"];

/// Classify `message` into an [`Intent`]. Pure; no I/O.
pub fn parse(message: &str) -> Intent {
    let lowered = message.to_lowercase();
    let lowered = lowered.trim();

    // === CREATE ===
    for re in CREATE_PATTERNS.iter() {
        if let Some(caps) = re.captures(lowered)
            && let Some(task_text) = caps.get(1)
        {
            let title = title_case(task_text.as_str().trim());
            let date_hint = DATE_HINT.find(lowered).map(|m| m.as_str().to_string());
            let description = match &date_hint {
                Some(hint) => format!("Created via AI chat - {hint}"),
                None => "Created via AI chat".to_string(),
            };
            return Intent::CreateTask { title, description, date_hint };
        }
    }

    // === LIST ===
    for re in LIST_PATTERNS.iter() {
        if re.is_match(lowered) {
            let status = STATUS_FILTER.find(lowered).map(|m| m.as_str().to_string());
            return Intent::ListTasks { status };
        }
    }

    // === SUMMARIZE === (substring test, not anchored)
    if SUMMARIZE_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return Intent::SummarizeTasks;
    }

    // === COMPLETE ===
    for re in COMPLETE_PATTERNS.iter() {
        if let Some(id) = captured_id(re, lowered) {
            return Intent::CompleteTask { task_id: id };
        }
    }

    // === DELETE ===
    for re in DELETE_PATTERNS.iter() {
        if let Some(id) = captured_id(re, lowered) {
            return Intent::DeleteTask { task_id: id };
        }
    }

    // === UPDATE ===
    if let Some(caps) = UPDATE_PATTERN.captures(lowered)
        && let (Some(id), Some(text)) = (caps.get(1), caps.get(2))
        && let Ok(task_id) = id.as_str().parse::<i64>()
    {
        return Intent::UpdateTask {
            task_id,
            new_title: title_case(text.as_str().trim()),
        };
    }

    // === HELP ===
    if HELP_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return Intent::Help;
    }

    Intent::Unknown { original_message: message.to_string() }
}

fn captured_id(re: &Regex, message: &str) -> Option<i64> {
    re.captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

/// Python-`str.title()` equivalent: uppercase every letter that follows a
/// non-letter, lowercase the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_task_with_date_hint() {
        let intent = parse("Add task buy milk tomorrow");
        match intent {
            Intent::CreateTask { title, description, date_hint } => {
                assert_eq!(title, "Buy Milk Tomorrow");
                assert_eq!(date_hint.as_deref(), Some("tomorrow"));
                assert_eq!(description, "Created via AI chat - tomorrow");
            }
            other => panic!("expected create_task, got {other:?}"),
        }
    }

    #[test]
    fn create_without_date_hint() {
        match parse("create task write report") {
            Intent::CreateTask { title, description, date_hint } => {
                assert_eq!(title, "Write Report");
                assert_eq!(date_hint, None);
                assert_eq!(description, "Created via AI chat");
            }
            other => panic!("expected create_task, got {other:?}"),
        }
    }

    #[test]
    fn i_need_to_phrasing_creates() {
        match parse("I need to call the dentist") {
            Intent::CreateTask { title, .. } => assert_eq!(title, "Call The Dentist"),
            other => panic!("expected create_task, got {other:?}"),
        }
    }

    #[test]
    fn roman_urdu_kal_pattern_creates() {
        match parse("Kal doodh lena hai") {
            Intent::CreateTask { title, date_hint, .. } => {
                assert_eq!(title, "Doodh Lena");
                assert_eq!(date_hint.as_deref(), Some("kal"));
            }
            other => panic!("expected create_task, got {other:?}"),
        }
    }

    #[test]
    fn roman_urdu_trailing_karna_creates() {
        match parse("ghar saaf karna") {
            Intent::CreateTask { title, .. } => assert_eq!(title, "Ghar Saaf"),
            other => panic!("expected create_task, got {other:?}"),
        }
    }

    #[test]
    fn show_my_tasks_lists_without_filter() {
        assert_eq!(parse("Show my tasks"), Intent::ListTasks { status: None });
        assert_eq!(parse("what are my todos"), Intent::ListTasks { status: None });
        assert_eq!(parse("mere kaam"), Intent::ListTasks { status: None });
    }

    #[test]
    fn status_filter_extracted_from_anywhere_in_message() {
        assert_eq!(
            parse("show my pending tasks"),
            Intent::ListTasks { status: Some("pending".to_string()) }
        );
        assert_eq!(
            parse("completed tasks"),
            Intent::ListTasks { status: Some("completed".to_string()) }
        );
    }

    #[test]
    fn summarize_fires_on_keyword_substring() {
        assert_eq!(parse("give me a summary please"), Intent::SummarizeTasks);
        assert_eq!(parse("kitne tasks?"), Intent::SummarizeTasks);
        // "overview" buried mid-sentence still fires.
        assert_eq!(parse("quick overview of everything"), Intent::SummarizeTasks);
    }

    #[test]
    fn broad_urdu_create_shadows_summarize() {
        // "hain" contains "hai", and the trailing-hai create pattern runs
        // before the summarize keyword check, so this classifies as create.
        match parse("kitne tasks hain?") {
            Intent::CreateTask { .. } => {}
            other => panic!("expected create_task by priority, got {other:?}"),
        }
    }

    #[test]
    fn mark_task_done_completes() {
        assert_eq!(parse("Mark task 5 as done"), Intent::CompleteTask { task_id: 5 });
        assert_eq!(parse("finish task 12"), Intent::CompleteTask { task_id: 12 });
        assert_eq!(parse("task 3 khatam"), Intent::CompleteTask { task_id: 3 });
    }

    #[test]
    fn delete_task_extracts_id() {
        assert_eq!(parse("Delete task 3"), Intent::DeleteTask { task_id: 3 });
        assert_eq!(parse("remove task id 7"), Intent::DeleteTask { task_id: 7 });
        assert_eq!(parse("kaam 2 hata do"), Intent::DeleteTask { task_id: 2 });
    }

    #[test]
    fn update_extracts_id_and_title_cased_text() {
        match parse("update task 4 to buy brown bread") {
            Intent::UpdateTask { task_id, new_title } => {
                assert_eq!(task_id, 4);
                assert_eq!(new_title, "Buy Brown Bread");
            }
            other => panic!("expected update_task, got {other:?}"),
        }
    }

    #[test]
    fn help_keywords() {
        assert_eq!(parse("help"), Intent::Help);
        assert_eq!(parse("aap kya kar sakte ho?"), Intent::Help);
        assert_eq!(parse("list of commands"), Intent::Help);
    }

    #[test]
    fn unknown_carries_original_message() {
        match parse("the weather is nice") {
            Intent::Unknown { original_message } => {
                assert_eq!(original_message, "the weather is nice");
            }
            other => panic!("expected unknown, got {other:?}"),
        }
    }

    #[test]
    fn category_priority_create_beats_complete() {
        // "add" fires in the create category before the complete patterns
        // are ever tried, even though "done" appears later in the message.
        match parse("add task 5 things to get done") {
            Intent::CreateTask { .. } => {}
            other => panic!("expected create_task by priority, got {other:?}"),
        }
    }

    #[test]
    fn first_match_wins_within_category() {
        // Both the english "delete ... <id>" and urdu "task <id> delete"
        // shapes are present; the english pattern is tried first.
        assert_eq!(parse("delete task 9"), Intent::DeleteTask { task_id: 9 });
    }

    #[test]
    fn title_case_matches_python_semantics() {
        assert_eq!(title_case("buy milk tomorrow"), "Buy Milk Tomorrow");
        assert_eq!(title_case("BUY MILK"), "Buy Milk");
        assert_eq!(title_case("call mom at 5pm"), "Call Mom At 5Pm");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn input_is_lowercased_and_trimmed_before_matching() {
        assert_eq!(parse("  DELETE TASK 3  "), Intent::DeleteTask { task_id: 3 });
    }
}
