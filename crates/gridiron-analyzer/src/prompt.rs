//! Prompt construction for play analysis.

use gridiron_models::Persona;

const PREAMBLE: &str = "You are an experienced American football coordinator reviewing game film. \
Watch the attached clip of a single play and break down both sides of the ball. \
For the offense and for the defense, identify the formation, the personnel grouping, \
the key players (by position, and by jersey number when it is visible), \
and the play type and concept that was run.";

const FIELD_GUIDE: &str = "Fill every field for both `offense` and `defense`:
- summary: one short sentence describing what this side did on the play.
- play_type: the play category (e.g. inside zone, outside run, quick pass, screen, RPO, Cover 3, blitz).
- formation: the formation or alignment (e.g. shotgun trips right, I-form, 4-3 over, nickel).
- personnel: the personnel grouping (e.g. 11 personnel, 21 personnel, base, dime).
- key_players: the players who decided the play, each as a short string such as \"QB #12\" or \"MLB #54\".
- details: the detailed breakdown of assignments, technique and result.";

const DETAILS_FORMAT: &str = "FORMATTING RULE for `details`: write it as a bulleted list, not prose. \
Every line MUST start with \"- \" followed by one observation. \
Do not write paragraphs, headings or numbered lists in `details`.";

const OUTPUT_RULE: &str = "Base every field on what is visible in the clip. \
If something cannot be determined, say so briefly instead of leaving the field empty. \
Respond only with JSON matching the provided schema.";

fn tone_directive(persona: Persona) -> &'static str {
    match persona {
        Persona::Standard => {
            "Write `coach_feedback` in a neutral, constructive tone: name what worked, \
what did not, and one concrete coaching point."
        }
        Persona::Strict => {
            "Write `coach_feedback` as a strict, demanding coach: direct and blunt about \
every missed assignment and loafed rep, with no softening."
        }
        Persona::Mentor => {
            "Write `coach_feedback` as a calm, patient mentor: encouraging, explaining \
the why behind each correction so a young player can learn from it."
        }
    }
}

/// Build the instruction text sent alongside the video.
///
/// With a persona, `coach_feedback` is requested for each side in that
/// persona's voice. The tone applies to `coach_feedback` only; the factual
/// fields stay objective regardless of persona. Without one, feedback is
/// not mentioned at all.
pub fn build_prompt(persona: Option<Persona>) -> String {
    let mut sections = vec![PREAMBLE, FIELD_GUIDE, DETAILS_FORMAT];

    if let Some(persona) = persona {
        sections.push(
            "Also fill `coach_feedback` for each side: a few sentences of coaching feedback \
on how that side executed.",
        );
        sections.push(tone_directive(persona));
        sections.push(
            "The tone above applies ONLY to `coach_feedback`. Keep summary, play_type, \
formation, personnel, key_players and details factual and neutral.",
        );
    }

    sections.push(OUTPUT_RULE);
    sections.join("\n\n")
}
