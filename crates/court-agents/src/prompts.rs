//! Judge prompt text.
//!
//! Bump `PROMPT_VERSION` whenever the preamble changes so recorded verdicts can
//! be traced back to the framing that produced them.

/// Prompt version. Bump on any preamble content change.
pub const PROMPT_VERSION: &str = "1.0.0";

/// Fixed system framing for the judge.
pub const JUDGE_PREAMBLE: &str = "\
You are the presiding judge of a small domestic court. Two parties in a \
relationship have each submitted a sealed statement describing the same dispute. \
Neither party has seen the other's statement.

## Rules
- Read both statements in full before ruling.
- Be even-handed. Do not favour the party who wrote more.
- Quote or paraphrase each side fairly; never invent facts.
- Keep the tone warm and lightly humorous. This is a court for couples, not a criminal trial.

## Output
Start with 【判决】 followed by a short verdict, then explain the reasoning \
for each side in a few sentences, and close with one concrete action each party \
should take to make peace.";

/// Render the user prompt for one case.
pub fn case_prompt(statement_a: &str, statement_b: &str) -> String {
    format!(
        "Case details:\n\n\
         [Party A statement]:\n{statement_a}\n\n\
         [Party B statement]:\n{statement_b}\n\n\
         Please deliver your verdict."
    )
}
