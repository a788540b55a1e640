// Assessment prompt templates.
// The system message fixes the JSON contract; the user prompt carries keywords and excerpt.

pub const ASSESSMENT_SYSTEM: &str = "\
You are a reliable recruitment assistant screening CVs. \
You MUST respond with a single valid JSON object only, following the requested schema exactly. \
Do NOT include any text outside the JSON object.";

pub const NO_KEYWORDS_PLACEHOLDER: &str = "No keywords supplied.";

pub const ASSESSMENT_PROMPT_TEMPLATE: &str = r#"Compare the CV below with the requested keywords and return ONLY a strict JSON object with this schema:
{
  "score": integer between 0 and 100,
  "decision": "strong_yes" | "yes" | "maybe" | "no",
  "summary": "one short sentence summarizing the application",
  "strengths": ["concrete strengths"],
  "missingSkills": ["skills tied to the keywords that the CV does not show"],
  "risks": ["possible concerns such as limited experience or availability"]
}

Keywords to cover: {keywords}

CV (excerpt of {excerpt_chars} characters out of {total_chars}):
"""{excerpt}"""

Return only the requested JSON, no additional text."#;
