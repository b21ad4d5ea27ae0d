//! Prompt templates; every prompt demands a single JSON object

/// Is the question about a named person, work or event, and which keywords name it
pub fn keyword_judgment(question: &str) -> String {
    format!(
        "Reply strictly with one JSON object: {{\"judgment\": true if the question is a noun or \
         concerns a person, work or event, otherwise false, \"keywords\": [the question's \
         keywords or the names of works and people]}}. Question: {question}"
    )
}

pub fn persona_answer(question: &str, persona: &str) -> String {
    format!(
        "Reply strictly with one JSON object: {{\"answer\": \"your reply, in character\"}}. \
         Question: {question}. Persona: {persona}"
    )
}

pub fn dominant_entity(text: &str) -> String {
    format!(
        "Reply strictly with one JSON object: {{\"name\": \"the work or person mentioned most \
         in the text\"}}. Text: {text}"
    )
}

pub fn compose_answer(question: &str, passages: &[String], persona: &str) -> String {
    format!(
        "Reply strictly with one JSON object: {{\"answer\": \"your answer, in character\"}}. \
         Question: {question}. What you know: {}. Persona: {persona}",
        passages.join(" ")
    )
}

pub fn can_answer(question: &str, knowledge: &str) -> String {
    format!(
        "Reply strictly with one JSON object: {{\"can_answer\": boolean, \"message\": string}}. \
         If the question concerns a person, work or event the material does not mention, set \
         can_answer to false and message to that name; otherwise set can_answer to true and \
         message to your answer. Question: {question}. Material: {knowledge}"
    )
}

pub fn can_answer_or_follow_up(question: &str, knowledge: &str) -> String {
    format!(
        "Reply strictly with one JSON object: {{\"can_answer\": boolean, \"message\": string}}. \
         If the material is not closely related to the question, set can_answer to false and \
         message to three follow-up questions about it; otherwise set can_answer to true and \
         message to your answer. Question: {question}. Material: {knowledge}"
    )
}

pub fn answer_with_keywords(question: &str, data: &str) -> String {
    format!(
        "Reply strictly with one JSON object: {{\"answer\": \"your answer, with details\", \
         \"keywords\": \"keywords of the material\"}}. Question: {question}. Material: {data}"
    )
}

/// Leading `max_chars` characters of `text`
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
