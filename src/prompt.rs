//! Prompt templates sent to the completion endpoint.
//!
//! The transcript is embedded verbatim; nothing here truncates or chunks it.

use crate::transcript::Transcript;

/// Prompt asking for the five-field JSON analysis
pub fn analysis_prompt(transcript: &Transcript) -> String {
    format!(
        r#"You are a Smart Meeting Assistant.
Analyze the following meeting transcript and extract:
1. Action items
2. Deadlines
3. Decisions made
4. Participant mentions
5. Summarize key points in 3-5 bullet points

Return ONLY valid JSON with exactly these keys: action_items, deadlines, decisions, participants, summary.
Each key holds a list. Action items may be objects like {{"task": "...", "assignee": "...", "deadline": "..."}}; other entries may be plain strings.
No preamble, no explanation, no markdown code blocks, just the JSON object.

Transcript:
"""{}""""#,
        transcript.as_str()
    )
}

/// Prompt asking for a short prose summary
pub fn summary_prompt(transcript: &Transcript) -> String {
    format!(
        r#"Provide a brief 2-3 sentence summary of this meeting transcript.
No preamble, just the summary.

Transcript:
"""{}""""#,
        transcript.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_prompt_embeds_transcript_and_keys() {
        let transcript = Transcript::new("John: ship it Friday").unwrap();
        let prompt = analysis_prompt(&transcript);
        assert!(prompt.contains("\"\"\"John: ship it Friday\"\"\""));
        for key in ["action_items", "deadlines", "decisions", "participants", "summary"] {
            assert!(prompt.contains(key), "missing {key}");
        }
    }

    #[test]
    fn summary_prompt_embeds_transcript() {
        let transcript = Transcript::new("Ana: budget approved").unwrap();
        let prompt = summary_prompt(&transcript);
        assert!(prompt.starts_with("Provide a brief 2-3 sentence summary"));
        assert!(prompt.ends_with("\"\"\"Ana: budget approved\"\"\""));
    }
}
