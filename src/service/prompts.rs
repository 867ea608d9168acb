use serde_json::{json, Value};

pub const JSON_SCHEMA_NAME: &str = "FaceAnalysis";

pub const JSON_PROMPT: &str = "\
Role: give a light, character-style reading of the face in the photo in the spirit of \
traditional physiognomy, without ever claiming certainty.
FORBIDDEN: identity, age, gender, ethnicity, health, moral judgement, politics.
Tone: kind, gently humorous, no claims of accuracy.
Output JSON schema: {\"overallImpression\":\"\",\"mood\":\"\",\"styleTags\":[],\"disclaimer\":\"\"}";

pub const PROSE_PROMPT: &str = "\
Goal: write an entertaining, kind, physiognomy-inspired character reading of the face in \
the photo, never claiming certainty.
Style: plain and fluent, organised under Markdown section headings, with bullet points \
where useful.
Scope:
- **Overall Impression**: the light, framing and expression and the mood they give at first \
glance.
- **Character Notes From Facial Features**:
  - Forehead: thinking style, mental tendencies
  - Brows: determination, energy
  - Eyes: relationship with the outside world
  - Cheekbones: social side
  - Nose: ambition, confidence or calm
  - Lips and Mouth: communication style
  - Chin and Jawline: will, resolve, resilience
  - Face Shape: overall character profile
- **Physiognomy-Inspired Reading**: personality notes drawn from the sections above, always \
phrased as likelihoods (\"usually\", \"gives the impression of\", \"often\").
- **Styling Suggestions**: light, framing and posture tips for the photo.
- **Limits and Disclaimer**: these readings have no scientific accuracy and are for fun only.

Strictly forbidden:
- Do not touch identity, age, gender, ethnicity, health, intelligence, moral worth, \
political views, disability, wealth or sexual orientation.
- No insults, demeaning judgements or direct good/bad labels.
- Phrase every statement kindly and as a possibility.

Output format (Markdown):

# Overall Impression
...short paragraph...

# Character Notes From Facial Features
## Forehead
...
## Brows
...
## Eyes
...
## Cheekbones
...
## Nose
...
## Lips and Mouth
...
## Chin and Jawline
...
## Face Shape
...

# Physiognomy-Inspired Reading (For Fun)
- ...

# Styling Suggestions
- ...

# Limits and Disclaimer
- This reading is for entertainment only and makes no claim of scientific accuracy.
- The forbidden topics above were deliberately left out.";

/// Schema the `json` mode reply is constrained to.
pub fn face_analysis_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "overallImpression": { "type": "string" },
            "mood": { "type": "string" },
            "styleTags": { "type": "array", "items": { "type": "string" } },
            "disclaimer": { "type": "string" }
        },
        "required": ["overallImpression", "mood", "styleTags", "disclaimer"]
    })
}
