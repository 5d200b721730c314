//! crates/academy_core/src/script.rs
//!
//! The fixed text of the lead-capture interview: prompts, quick-reply option
//! sets, the course recommendation and the handoff template.

use crate::domain::LeadProfile;

//=========================================================================================
// Prompts and Quick Replies
//=========================================================================================

pub const GREETING: &str = "Hi there! 👋 Welcome to our academy. I can help you find the right \
coaching program for NEET, JEE, EAMCET or Foundation. May I know your name?";

pub const ASK_EMAIL: &str = "Thanks! What's your email address?";
pub const ASK_COURSE: &str = "Which course are you interested in?";
pub const ASK_CLASS: &str = "Which class are you currently studying in?";
pub const ASK_WEAK_SUBJECTS: &str =
    "Which subjects do you find difficult? You can pick one or type several separated by commas.";
pub const ASK_STRONG_SUBJECTS: &str =
    "And which subjects are you strong in? Separate several with commas.";
pub const ASK_TARGET_YEAR: &str = "Which year are you planning to take the exam?";

pub const HANDOFF_OFFER: &str = "Would you like to talk to our academic counselor right away? \
Tap below to continue on WhatsApp and we'll share batch timings and fee details.";

pub const COURSE_OPTIONS: [&str; 4] = ["NEET", "JEE", "EAMCET", "Foundation"];
pub const CLASS_OPTIONS: [&str; 5] = ["9", "10", "11", "12", "Dropper"];
pub const SUBJECT_OPTIONS: [&str; 4] = ["Physics", "Chemistry", "Mathematics", "Biology"];
pub const YEAR_OPTIONS: [&str; 4] = ["2025", "2026", "2027", "2028"];

pub fn ask_phone(name: &str) -> String {
    format!("Nice to meet you, {name}! 😊 Could you share your phone number so our counselor can reach you?")
}

pub fn options(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

/// Splits a subjects answer. Comma-separated input becomes one trimmed entry per
/// piece, in order; anything else is a single entry.
pub fn split_subjects(input: &str) -> Vec<String> {
    let input = input.trim();
    if input.contains(',') {
        input.split(',').map(|s| s.trim().to_string()).collect()
    } else {
        vec![input.to_string()]
    }
}

//=========================================================================================
// Recommendation
//=========================================================================================

const NEET_HEADER: &str = "🎯 *Personalized NEET Plan for You:*";
const NEET_BULLETS: [(&str, &str); 3] = [
    (
        "Biology",
        "• Biology: line-by-line NCERT revision with daily diagram practice",
    ),
    (
        "Chemistry",
        "• Chemistry: reaction-mechanism drills and weekly organic tests",
    ),
    (
        "Physics",
        "• Physics: concept-first problem sessions with our senior faculty",
    ),
];
const NEET_CLOSING: &str = "📚 Our NEET Integrated Program covers all of this with regular mock tests!";

const JEE_HEADER: &str = "🎯 *Personalized JEE Plan for You:*";
const JEE_BULLETS: [(&str, &str); 3] = [
    (
        "Mathematics",
        "• Mathematics: topic-wise problem sets from basics to JEE Advanced level",
    ),
    (
        "Physics",
        "• Physics: application-based numericals and doubt-clearing sessions",
    ),
    (
        "Chemistry",
        "• Chemistry: formula sheets and timed practice for physical chemistry",
    ),
];
const JEE_CLOSING: &str = "📚 Our JEE Main + Advanced Program gives you all-round preparation!";

const EAMCET_BLOCK: &str = "🎯 *EAMCET Preparation Plan:*\n\
• Speed-and-accuracy drills on state syllabus patterns\n\
📚 Our EAMCET Crash Course includes daily tests and previous-year papers!";

const FOUNDATION_BLOCK: &str = "🎯 *Foundation Program Plan:*\n\
• Strong basics in Maths and Science for classes 8 to 10\n\
📚 Our Foundation Program builds early confidence for NEET and JEE!";

/// Builds the recommendation shown at the end of the interview.
///
/// Bullets follow the course's fixed subject order, not the order the visitor
/// typed. Subjects outside the course's set are ignored.
pub fn recommendation(course: &str, weak_subjects: &[String]) -> String {
    if course.eq_ignore_ascii_case("NEET") {
        subject_plan(NEET_HEADER, &NEET_BULLETS, NEET_CLOSING, weak_subjects)
    } else if course.eq_ignore_ascii_case("JEE") {
        subject_plan(JEE_HEADER, &JEE_BULLETS, JEE_CLOSING, weak_subjects)
    } else if course.eq_ignore_ascii_case("EAMCET") {
        EAMCET_BLOCK.to_string()
    } else {
        FOUNDATION_BLOCK.to_string()
    }
}

fn subject_plan(
    header: &str,
    bullets: &[(&str, &str)],
    closing: &str,
    weak_subjects: &[String],
) -> String {
    let mut lines = vec![header.to_string()];
    lines.extend(
        bullets
            .iter()
            .filter(|(subject, _)| weak_subjects.iter().any(|w| w == subject))
            .map(|(_, bullet)| (*bullet).to_string()),
    );
    lines.push(closing.to_string());
    lines.join("\n")
}

//=========================================================================================
// Summary and Handoff
//=========================================================================================

fn detail_lines(profile: &LeadProfile) -> String {
    format!(
        "• Name: {}\n\
         • Phone: {}\n\
         • Email: {}\n\
         • Interested Course: {}\n\
         • Current Class: {}\n\
         • Weak Subjects: {}\n\
         • Strong Subjects: {}\n\
         • Target Exam Year: {}",
        profile.name,
        profile.phone,
        profile.email,
        profile.interested_course,
        profile.current_class,
        profile.weak_subjects.join(", "),
        profile.strong_subjects.join(", "),
        profile.target_exam_year,
    )
}

/// The recap appended after the recommendation in the final engine message.
pub fn summary(profile: &LeadProfile) -> String {
    format!(
        "📋 *Here's what you shared with us:*\n{}\n\nThank you, {}! Our team will get in touch with you soon.",
        detail_lines(profile),
        profile.name
    )
}

/// The plain-text message handed to the external contact channel.
/// Fields not collected yet render as empty strings.
pub fn handoff_message(profile: &LeadProfile) -> String {
    format!(
        "Hello! I'm interested in joining your coaching programs.\n\
         \n\
         *My Details:*\n\
         {}\n\
         \n\
         Please share the course details, fee structure and batch timings.\n\
         Looking forward to hearing from you!",
        detail_lines(profile)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subjects(values: &[&str]) -> Vec<String> {
        options(values)
    }

    #[test]
    fn split_subjects_handles_lists_and_single_values() {
        assert_eq!(
            split_subjects("Physics, Chemistry"),
            subjects(&["Physics", "Chemistry"])
        );
        assert_eq!(split_subjects("  Physics  "), subjects(&["Physics"]));
        assert_eq!(
            split_subjects("Physics and Chemistry"),
            subjects(&["Physics and Chemistry"])
        );
    }

    #[test]
    fn neet_bullets_follow_fixed_order() {
        let text = recommendation("NEET", &subjects(&["Physics", "Biology"]));
        let biology = text.find("• Biology").unwrap();
        let physics = text.find("• Physics").unwrap();
        assert!(biology < physics);
        assert!(!text.contains("• Chemistry"));
        assert!(text.starts_with(NEET_HEADER));
        assert!(text.ends_with(NEET_CLOSING));
    }

    #[test]
    fn course_match_ignores_case_but_subjects_do_not() {
        let text = recommendation("jee", &subjects(&["mathematics", "Physics"]));
        assert!(text.starts_with(JEE_HEADER));
        assert!(text.contains("• Physics"));
        assert!(!text.contains("• Mathematics"));
    }

    #[test]
    fn unmatched_subjects_produce_no_bullets() {
        let text = recommendation("NEET", &subjects(&["Mathematics"]));
        assert_eq!(text, format!("{NEET_HEADER}\n{NEET_CLOSING}"));
    }

    #[test]
    fn eamcet_and_fallback_blocks_are_fixed() {
        let weak = subjects(&["Physics", "Chemistry"]);
        assert_eq!(recommendation("EAMCET", &weak), EAMCET_BLOCK);
        assert_eq!(recommendation("Foundation", &weak), FOUNDATION_BLOCK);
        assert_eq!(recommendation("", &weak), FOUNDATION_BLOCK);
        assert_eq!(recommendation("Olympiad", &[]), FOUNDATION_BLOCK);
        assert_eq!(EAMCET_BLOCK.lines().count(), 3);
        assert_eq!(FOUNDATION_BLOCK.lines().count(), 3);
    }

    #[test]
    fn handoff_renders_missing_fields_as_empty() {
        let profile = LeadProfile {
            name: "Ravi".to_string(),
            phone: "9000000001".to_string(),
            email: "ravi@example.org".to_string(),
            ..Default::default()
        };
        let text = handoff_message(&profile);
        assert!(text.contains("• Name: Ravi\n"));
        assert!(text.contains("• Interested Course: \n"));
        assert!(text.contains("• Weak Subjects: \n"));
        assert!(text.contains("• Target Exam Year: \n"));
        assert!(text.contains("\n\n*My Details:*\n"));
    }
}
