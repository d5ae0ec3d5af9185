//! Prompt templates and builders for every generation call.

/// System framing shared by the notes and quiz prompts.
pub const SYSTEM_PROMPT: &str = "You are Smart Teacher, an academic tutor.\n\
Given a lecture transcript, produce:\n\
1. Clear, structured MARKDOWN notes.\n\
2. A JSON quiz with exactly 4 options per question.\n";

/// Output-shape hint appended to the strict quiz prompt.
pub const QUIZ_JSON_HINT: &str = "Output *only* a valid JSON array:\n\
[{\"question\":\"...\",\"options\":[\"...\",\"...\",\"...\",\"...\"],\"correct_index\":1,\"explanation\":\"...\"}]\n";

/// Output-shape hint for the timed quiz: anchor each question to a
/// transcript timestamp.
pub const TIMED_QUIZ_JSON_HINT: &str = "Output *only* a valid JSON array:\n\
[{\"prompt\":\"...\",\"choices\":[\"...\",\"...\"],\"answer_index\":0,\"start\":12.0}]\n\
Set \"start\" to the transcript second the question refers to.\n";

/// Request header carried on both the notes and quiz prompts.
pub fn header(title: &str, video_url: &str, num_questions: u32, difficulty: &str) -> String {
    format!(
        "Video: {}\nURL: {}\nQuestions: {}\nDifficulty: {}\n",
        if title.is_empty() { "Untitled" } else { title },
        video_url,
        num_questions,
        difficulty
    )
}

pub fn notes_prompt(header: &str, transcript: &str) -> String {
    format!("{SYSTEM_PROMPT}\n\n{header}\nGenerate MARKDOWN notes only:\n\n{transcript}")
}

pub fn quiz_prompt(header: &str, num_questions: u32, transcript: &str) -> String {
    format!(
        "{SYSTEM_PROMPT}\n\n{header}\nGenerate {num_questions} MCQs in JSON format only.\n\
         {QUIZ_JSON_HINT}\nTranscript:\n{transcript}"
    )
}

pub fn timed_quiz_prompt(header: &str, num_questions: u32, transcript: &str) -> String {
    format!(
        "{SYSTEM_PROMPT}\n\n{header}\nGenerate {num_questions} MCQs in JSON format only, \
         each anchored to a timestamp from the transcript.\n\
         {TIMED_QUIZ_JSON_HINT}\nTranscript (with second offsets):\n{transcript}"
    )
}

pub fn detect_language_prompt(text_prefix: &str) -> String {
    format!(
        "Detect language of this text and return only language name (e.g., English, Hindi):\n\n{text_prefix}"
    )
}

pub fn translate_to_english_prompt(detected_lang: &str, text_prefix: &str) -> String {
    format!("Translate this {detected_lang} text into English:\n\n{text_prefix}")
}

pub fn translate_prompt(source_lang: &str, target_lang: &str, text: &str) -> String {
    format!("Translate from {source_lang} to {target_lang}:\n\n{text}")
}

pub fn summarize_prompt(text: &str) -> String {
    format!("Summarize this text in 5 concise bullet points:\n\n{text}")
}

pub fn proofread_prompt(text: &str) -> String {
    format!("Proofread and improve grammar and clarity:\n\n{text}")
}

pub fn repair_json_prompt(broken: &str) -> String {
    format!("Fix this invalid JSON to valid JSON array only:\n{broken}")
}
