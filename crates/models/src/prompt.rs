use crate::traits::LengthBounds;

pub fn build_entity_prompt(text: &str) -> String {
    format!(
        r#"Extract named entities from the following meeting transcript.

INSTRUCTIONS:
1. Identify every named entity mention
2. Copy each entity exactly as it appears in the text
3. Output ONLY valid JSON, nothing else
4. Use the exact schema below

SCHEMA:
{{
  "entities": [
    {{"text": "Entity text", "label": "PERSON|ORG|GPE|LOC|DATE|TIME|MONEY|PERCENT|EVENT|LAW|PRODUCT|NORP|FAC"}}
  ]
}}

RULES:
- PERSON is a person, ORG an organization, GPE a country, city or state
- Labels must be one of the values listed in the schema
- The text field must be a verbatim substring of the transcript
- List each distinct entity once
- Output ONLY the JSON object, no markdown, no explanations

TEXT:
{}

JSON OUTPUT:"#,
        text
    )
}

pub fn build_sentiment_prompt(sentence: &str) -> String {
    format!(
        r#"Classify the sentiment of the sentence below.

Respond with ONLY a JSON object of the form:
{{"label": "POSITIVE|NEGATIVE", "confidence": 0.0}}

The confidence is a number between 0 and 1.

SENTENCE:
{}

JSON OUTPUT:"#,
        sentence
    )
}

pub fn build_summary_prompt(text: &str, bounds: LengthBounds) -> String {
    format!(
        "Summarize the following excerpt of meeting minutes.\n\n\
        Write between {} and {} words. Keep names, decisions and dates. \
        Do NOT use markdown formatting and do not add a preamble.\n\n\
        EXCERPT:\n{}\n\n\
        SUMMARY:",
        bounds.min, bounds.max, text
    )
}

pub fn build_retry_prompt(invalid_json: &str) -> String {
    format!(
        r#"The following JSON is invalid:

{}

Fix this JSON. Output only valid JSON with no markdown formatting, no code blocks, no explanations. Just the raw JSON object."#,
        invalid_json
    )
}
