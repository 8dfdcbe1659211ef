// Prompt text for the generative scanner.

use crate::ats::models::ScoreInput;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// Describes the object the model must answer with. Enforcement happens in the parser.
pub const ATS_JSON_SHAPE: &str = r#"Return a JSON object with these keys:
{
  "score": 0-100,
  "components": {
    "similarity": 0.0-1.0,
    "keywordCoverage": 0.0-1.0,
    "recency": 0.0-1.0,
    "formatQuality": 0.0-1.0
  },
  "matchedKeywords": ["skill found in the resume"],
  "missingMustHaves": ["required skill absent from the resume"],
  "notes": ["short observation"]
}"#;

pub fn build_ats_prompt(input: &ScoreInput) -> String {
    format!(
        "You are an applicant tracking system. Score the resume for the job.\n\
         \n\
         JOB DESCRIPTION:\n{jd}\n\
         \n\
         Required skills: {required}\n\
         Bonus skills: {bonus}\n\
         \n\
         RESUME:\n{resume}\n\
         \n\
         {shape}\n\
         \n\
         {json_only}",
        jd = input.job_description,
        required = join_or_none(&input.required_skills),
        bonus = join_or_none(&input.bonus_skills),
        resume = input.resume_text,
        shape = ATS_JSON_SHAPE,
        json_only = JSON_ONLY_INSTRUCTION,
    )
}

fn join_or_none(skills: &[String]) -> String {
    if skills.is_empty() {
        "(none)".to_string()
    } else {
        skills.join(", ")
    }
}
