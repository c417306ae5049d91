// src/services/prompt.rs

use crate::models::exam::{ExamParameters, QuestionType};

/// Builds the natural-language instruction for exam generation.
///
/// The model is asked for an explicitly delimited, numbered format so the
/// free-text parser has stable boundaries to split on.
pub fn exam_prompt(params: &ExamParameters) -> String {
    let mut prompt = format!(
        "You are an experienced examiner. Write exactly {count} {difficulty}-level exam \
         questions about \"{topic}\" in the subject \"{subject}\".\n\n",
        count = params.question_count,
        difficulty = params.difficulty.as_str(),
        topic = params.topic,
        subject = params.subject,
    );

    prompt.push_str(type_instructions(params.question_type));

    prompt.push_str(
        "\nFormat requirements:\n\
         - Number every question as \"Question N:\" on its own line.\n\
         - After each question include a line starting with \"Answer:\".\n\
         - After the answer include a line starting with \"Explanation:\".\n\
         - Do not add any text before the first question or after the last explanation.\n",
    );

    prompt.push_str(&format!(
        "\nThe exam will be taken under a {} minute time limit, so keep each question \
         answerable within that budget.\n",
        params.time_limit_minutes
    ));

    if let Some(custom) = params
        .custom_prompt
        .as_deref()
        .filter(|c| !c.trim().is_empty())
    {
        prompt.push_str("\nAdditional instructions from the exam author:\n");
        prompt.push_str(custom);
        prompt.push('\n');
    }

    if let Some(syllabus) = params
        .syllabus_text
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        prompt.push_str("\nBase the questions on this syllabus excerpt:\n");
        prompt.push_str(syllabus);
        prompt.push('\n');
    }

    prompt
}

fn type_instructions(question_type: QuestionType) -> &'static str {
    match question_type {
        QuestionType::MultipleChoice => {
            "Each question must be multiple choice: provide exactly 4 options labeled \
             \"A)\" through \"D)\", one per line, and mark the correct one in the Answer \
             line as a single letter (e.g. \"Answer: B\").\n"
        }
        QuestionType::TrueFalse => {
            "Each question must be a true/false statement. The Answer line must be \
             exactly \"Answer: True\" or \"Answer: False\".\n"
        }
        QuestionType::ShortAnswer => {
            "Each question must be answerable in one or two sentences. Put the reference \
             answer in the Answer line.\n"
        }
        QuestionType::Essay => {
            "Each question must prompt an essay-length response. Put a model outline of \
             the expected answer in the Answer line.\n"
        }
        QuestionType::Mixed => {
            "Mix question styles: mostly multiple choice with 4 options labeled \"A)\" \
             through \"D)\" and the correct letter in the Answer line, plus some short \
             open questions whose reference answer goes in the Answer line.\n"
        }
    }
}

/// Fixed instruction for syllabus topic extraction. Requests strict JSON in
/// the documented shape; the reply is still commonly wrapped in a fenced
/// code block, which the extractor tolerates.
pub fn extraction_prompt(syllabus_content: &str) -> String {
    format!(
        "You are an expert educational content analyzer. Extract and organize the main \
         topics from this syllabus.\n\
         For each topic, please:\n\
         1. Identify the main subject area\n\
         2. List subtopics\n\
         3. Note any key concepts or theories mentioned\n\
         4. Indicate approximate difficulty level (Beginner, Intermediate, Advanced)\n\n\
         Format the response as a structured JSON with the following format:\n\
         {{\n\
           \"mainSubject\": \"Subject name\",\n\
           \"topics\": [\n\
             {{\n\
               \"name\": \"Topic name\",\n\
               \"subtopics\": [\"Subtopic 1\", \"Subtopic 2\"],\n\
               \"keyTerms\": [\"Term 1\", \"Term 2\"],\n\
               \"difficulty\": \"Beginner|Intermediate|Advanced\"\n\
             }}\n\
           ]\n\
         }}\n\n\
         Here's the syllabus content:\n{}",
        syllabus_content
    )
}
