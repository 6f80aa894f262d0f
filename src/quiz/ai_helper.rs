use crate::error::GenerationError;
use crate::quiz::{Difficulty, Question, QuestionFormat, QuestionSet};
use async_trait::async_trait;
use chatgpt::prelude::*;
use chatgpt::types::CompletionResponse;
use log::{debug, warn};
use serde_json::Value;

/// Anything that turns a prompt into raw text. The output is untrusted.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, prompt: &str) -> std::result::Result<String, GenerationError>;
}

#[async_trait]
impl Completion for ChatGPT {
    async fn complete(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
        let response: CompletionResponse = self.send_message(prompt).await?;
        let content = response.message().clone().content;

        debug!("Completion: {:?}", content);

        Ok(content)
    }
}

/// How many questions of each difficulty a set of `n` should contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyPlan {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

impl DifficultyPlan {
    /// Splits `n` as evenly as possible; the remainder goes to easy first, then medium.
    pub fn for_count(n: usize) -> Self {
        let base = n / 3;
        let remainder = n - 3 * base;
        Self {
            easy: base + usize::from(remainder >= 1),
            medium: base + usize::from(remainder >= 2),
            hard: base,
        }
    }

    pub fn count_of(&self, difficulty: Difficulty) -> usize {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

pub struct QuestionGenerator<C> {
    completion: C,
}

impl<C: Completion> QuestionGenerator<C> {
    pub fn new(completion: C) -> Self {
        Self { completion }
    }

    #[cfg(test)]
    pub fn completion(&self) -> &C {
        &self.completion
    }

    /// One generation attempt: prompt, complete, parse, validate.
    pub async fn generate(
        &self,
        summary: &str,
        n: usize,
    ) -> std::result::Result<QuestionSet, GenerationError> {
        debug!("Generating {} questions for summary: {:?}", n, summary);
        let prompt = build_prompt(summary, n);
        let raw = self.completion.complete(&prompt).await?;
        parse_questions(&raw, n)
    }
}

pub fn build_prompt(summary: &str, n: usize) -> String {
    let plan = DifficultyPlan::for_count(n);
    let formats = QuestionFormat::ALL
        .iter()
        .map(|f| format!("\"{}\"", f))
        .collect::<Vec<_>>()
        .join(", ");
    let difficulties = Difficulty::ALL
        .iter()
        .map(|d| format!("\"{}\"", d))
        .collect::<Vec<_>>()
        .join(", ");

    let mut format_mix = String::new();
    if n >= 3 {
        format_mix.push_str("- Include at least TWO different \"question_format\" values.\n");
    }
    if n >= 6 {
        format_mix.push_str(&format!(
            "- Include at least one question of EACH format: {}.\n",
            formats
        ));
    }
    if format_mix.is_empty() {
        format_mix.push_str("- Any allowed format may be used.\n");
    }

    format!(
        r#"You are a quiz generator for a CLI game.

TASK
- Create EXACTLY {n} questions based ONLY on the ARTICLE SUMMARY provided below.
- Use a RANDOM mix of formats. Allowed values for "question_format":
  1) "multiple" - classic multiple choice question.
  2) "fill_blank" - a sentence with ONE blank "____"; the correct option completes it.
  3) "true_false" - a plain True/False question.
  4) "riddle" - a clue-style riddle; players must infer the answer.
  5) "scenario" - a short situation; ask what happens or what someone should do.
  6) "combo_multiple" - list claims [A]-[D] inside the question; options are combinations like "A and D", "B only".

STRICT RULES
- The output MUST be a JSON array of objects and nothing else. No markdown, no prose.
- Each object MUST have EXACTLY these keys:
  - "question": string
  - "options": object with string keys "a", "b", "c", "d" (only "a" and "b" for "true_false")
  - "answer": one of the option keys
  - "difficulty": one of {difficulties}
  - "question_format": one of {formats}
- Use ONLY facts present or directly implied in the summary.
- Exactly one option is correct and its key is "answer".
- Keep questions concise and unambiguous. Avoid duplicates.

DIFFICULTY DISTRIBUTION & ORDER
- Produce exactly {easy} "easy", {medium} "medium" and {hard} "hard" questions.
- Output order MUST be grouped by difficulty: all easy first, then all medium, then all hard.
- Within each difficulty group, formats should appear in RANDOM order.
- HARD questions must combine 2+ facts from the summary or need multi-step elimination,
  with near-miss distractors. No "All of the above" / "None of the above".

FORMAT RULES
- "fill_blank": exactly one blank "____"; every option is a feasible completion.
- "true_false": exactly 2 options, e.g. "True" and "False".
- "riddle": phrase the question as a short clue; four possible answers.
- "scenario": describe a short situation based on the summary; four plausible choices.
- "combo_multiple": FIRST list four claims labelled [A], [B], [C], [D], each on its own line,
  then ask "Which combination is correct?". Exactly one option matches the true subset.

FORMAT MIX
{format_mix}
ARTICLE SUMMARY:
"""{summary}"""
"#,
        n = n,
        difficulties = difficulties,
        formats = formats,
        easy = plan.easy,
        medium = plan.medium,
        hard = plan.hard,
        format_mix = format_mix,
        summary = summary,
    )
}

/// Parses and validates the generator's raw output. Any invalid element rejects the whole batch.
pub fn parse_questions(raw: &str, n: usize) -> std::result::Result<QuestionSet, GenerationError> {
    let elements: Vec<Value> = serde_json::from_str(strip_code_fence(raw))?;
    if elements.is_empty() {
        return Err(GenerationError::Empty);
    }
    if elements.len() != n {
        return Err(GenerationError::WrongCount {
            expected: n,
            actual: elements.len(),
        });
    }

    let questions = elements
        .iter()
        .enumerate()
        .map(|(index, value)| {
            Question::from_value(value).map_err(|reason| GenerationError::Invalid { index, reason })
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut set = QuestionSet::new(questions);
    if !set.is_grouped_by_difficulty() {
        warn!("Generator ignored the difficulty order, regrouping {} questions", n);
        // sort_by_key is stable, so the order inside each block is kept
        set.questions.sort_by_key(|q| q.difficulty());
    }

    let plan = DifficultyPlan::for_count(n);
    for difficulty in Difficulty::ALL {
        let (wanted, got) = (plan.count_of(difficulty), set.count_of(difficulty));
        if wanted != got {
            warn!(
                "Asked for {} {} questions, generator returned {}",
                wanted, difficulty, got
            );
        }
    }

    Ok(set)
}

// Chat models like to wrap JSON in ```json fences even when told not to
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(rest) = rest.strip_suffix("```") else {
        return trimmed;
    };
    match rest.split_once('\n') {
        Some((lang, body)) if !lang.trim_start().starts_with('[') => body.trim(),
        _ => rest.trim(),
    }
}
