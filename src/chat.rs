use std::fmt::Write;

use chrono::NaiveDate;

use crate::analytics;
use crate::models::{RiskLevel, StudentRecord};
use crate::risk::{self, Factor};

pub const GREETING: &str = "Hello! I am the EarlySignal assistant. How can I help you today?";

pub const QUICK_ACTIONS: [&str; 4] = [
    "Show high-risk CS students",
    "Explain risk calculation",
    "Intervention for low attendance",
    "Export department report",
];

/// Department keywords a message may mention, with the department-name
/// fragment each one selects.
const DEPARTMENT_KEYWORDS: [(&str, &str); 7] = [
    ("cs", "computer science"),
    ("computer science", "computer science"),
    ("mechanical", "mechanical"),
    ("ec", "electronics"),
    ("electronics", "electronics"),
    ("civil", "civil"),
    ("mba", "mba"),
];

#[derive(Debug, Clone, PartialEq)]
pub enum ChatAction {
    ExportCsv {
        department: Option<String>,
        file_name: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub text: String,
    pub action: Option<ChatAction>,
}

impl ChatReply {
    fn text(text: String) -> Self {
        Self { text, action: None }
    }
}

pub struct ChatContext<'a> {
    pub students: &'a [StudentRecord],
    pub today: NaiveDate,
}

pub struct Message {
    original: String,
    normalized: String,
    words: Vec<String>,
}

impl Message {
    pub fn new(text: &str) -> Self {
        let normalized = text.to_lowercase().replace('-', " ");
        let words = normalized
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            original: text.trim().to_string(),
            normalized,
            words,
        }
    }

    fn mentions(&self, phrase: &str) -> bool {
        self.normalized.contains(phrase)
    }

    fn mentions_any(&self, phrases: &[&str]) -> bool {
        phrases.iter().any(|phrase| self.mentions(phrase))
    }

    fn has_word(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    /// Earliest department keyword in the message, matched on whole words.
    fn department(&self) -> Option<DepartmentMatch> {
        for start in 0..self.words.len() {
            for (keyword, fragment) in DEPARTMENT_KEYWORDS {
                let parts: Vec<&str> = keyword.split(' ').collect();
                let window = &self.words[start..];
                if window.len() >= parts.len()
                    && window.iter().zip(parts.iter()).all(|(w, p)| w == p)
                {
                    return Some(DepartmentMatch { keyword, fragment });
                }
            }
        }
        None
    }
}

#[derive(Debug, Clone, Copy)]
struct DepartmentMatch {
    keyword: &'static str,
    fragment: &'static str,
}

impl DepartmentMatch {
    fn label(self) -> String {
        self.keyword.to_uppercase()
    }
}

/// Students whose department contains `fragment` (case-insensitive), or all
/// students when no fragment is given.
pub fn select_department<'a>(
    students: &'a [StudentRecord],
    fragment: Option<&str>,
) -> Vec<&'a StudentRecord> {
    students
        .iter()
        .filter(|student| match fragment {
            Some(fragment) => student
                .department
                .to_lowercase()
                .contains(&fragment.to_lowercase()),
            None => true,
        })
        .collect()
}

type Predicate = fn(&Message) -> bool;
type Responder = fn(&Message, &ChatContext<'_>) -> ChatReply;

pub struct Rule {
    pub name: &'static str,
    matches: Predicate,
    respond: Responder,
}

/// Ordered rule table. The first rule whose predicate accepts a message answers
/// it; nothing is remembered between turns.
pub struct Chatbot {
    rules: Vec<Rule>,
}

impl Default for Chatbot {
    fn default() -> Self {
        Self {
            rules: vec![
                Rule {
                    name: "risk-lookup",
                    matches: asks_about_risk_tier,
                    respond: risk_lookup,
                },
                Rule {
                    name: "explain-scoring",
                    matches: asks_for_explanation,
                    respond: explain_scoring,
                },
                Rule {
                    name: "interventions",
                    matches: asks_for_interventions,
                    respond: interventions,
                },
                Rule {
                    name: "export",
                    matches: asks_for_export,
                    respond: export,
                },
                Rule {
                    name: "departments",
                    matches: asks_about_departments,
                    respond: department_breakdown,
                },
                Rule {
                    name: "totals",
                    matches: asks_for_totals,
                    respond: totals,
                },
            ],
        }
    }
}

impl Chatbot {
    pub fn rule_for(&self, text: &str) -> Option<&'static str> {
        let message = Message::new(text);
        self.rules
            .iter()
            .find(|rule| (rule.matches)(&message))
            .map(|rule| rule.name)
    }

    pub fn reply(&self, text: &str, context: &ChatContext<'_>) -> ChatReply {
        let message = Message::new(text);
        self.rules
            .iter()
            .find(|rule| (rule.matches)(&message))
            .map(|rule| (rule.respond)(&message, context))
            .unwrap_or_else(|| fallback(&message))
    }
}

fn asks_about_risk_tier(message: &Message) -> bool {
    message.mentions_any(&["high risk", "at risk"])
}

fn asks_for_explanation(message: &Message) -> bool {
    message.mentions_any(&["explain", "calculat"])
        || (message.has_word("how") && !message.mentions("how many"))
}

fn asks_for_interventions(message: &Message) -> bool {
    message.mentions_any(&["intervention", "help", "improve"])
}

fn asks_for_export(message: &Message) -> bool {
    message.mentions_any(&["export", "download", "report"])
}

fn asks_about_departments(message: &Message) -> bool {
    message.mentions("department") || message.has_word("dept")
}

fn asks_for_totals(message: &Message) -> bool {
    message.mentions_any(&["total", "count", "how many"])
}

fn mean(students: &[&StudentRecord], value: fn(&StudentRecord) -> f64) -> f64 {
    if students.is_empty() {
        return 0.0;
    }
    students.iter().map(|s| value(s)).sum::<f64>() / students.len() as f64
}

fn risk_lookup(message: &Message, context: &ChatContext<'_>) -> ChatReply {
    let department = message.department();
    let filtered = select_department(context.students, department.map(|d| d.fragment));
    let scope = department
        .map(|d| format!(" in {}", d.label()))
        .unwrap_or_default();

    if message.mentions("high risk") {
        let high: Vec<&StudentRecord> = filtered
            .into_iter()
            .filter(|s| s.assess().level == RiskLevel::HighRisk)
            .collect();
        if high.is_empty() {
            return ChatReply::text(format!("I found no high-risk students{scope}."));
        }
        return ChatReply::text(format!(
            "I found {} high-risk students{}. Their average attendance is {:.1}% and average GPA is {:.2}. \
             Would you like me to provide specific intervention recommendations?",
            high.len(),
            scope,
            mean(&high, |s| s.attendance),
            mean(&high, |s| s.gpa),
        ));
    }

    let at_risk = filtered
        .iter()
        .filter(|s| s.assess().level == RiskLevel::AtRisk)
        .count();
    ChatReply::text(format!(
        "I found {at_risk} at-risk students{scope}. These students show warning signs but can be \
         helped with timely interventions."
    ))
}

fn explain_scoring(_message: &Message, _context: &ChatContext<'_>) -> ChatReply {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "Risk scores combine {} weighted factors. Each factor adds points only when a student is worse than its reference value:",
        Factor::ALL.len()
    );
    let _ = writeln!(text);
    for factor in Factor::ALL.iter().take(5) {
        let _ = writeln!(text, "- {} ({} weight)", factor.label(), factor.weight());
    }
    let _ = writeln!(text);
    let _ = writeln!(text, "Scores range from 0 to 100:");
    let _ = writeln!(text, "- below {}: Low Risk (green)", risk::AT_RISK_THRESHOLD);
    let _ = writeln!(
        text,
        "- {} to below {}: At Risk (orange)",
        risk::AT_RISK_THRESHOLD,
        risk::HIGH_RISK_THRESHOLD
    );
    let _ = write!(text, "- {} and above: High Risk (red)", risk::HIGH_RISK_THRESHOLD);
    ChatReply::text(text)
}

fn interventions(message: &Message, _context: &ChatContext<'_>) -> ChatReply {
    let text = if message.mentions("attendance") {
        "For students with low attendance, I recommend:\n\n\
         1. Schedule attendance improvement meeting with student and parents\n\
         2. Implement daily attendance tracking with counselor check-ins\n\
         3. Identify and address barriers to attendance (transportation, health, etc.)\n\
         4. Create personalized attendance recovery plan\n\
         5. Provide attendance incentives and recognition\n\n\
         Would you like to see students with attendance below 75%?"
    } else if message.mentions_any(&["grade", "gpa"]) {
        "For students with low GPA, I recommend:\n\n\
         1. Enroll in subject-specific tutoring sessions\n\
         2. Schedule weekly academic progress meetings with faculty advisor\n\
         3. Connect with peer study groups\n\
         4. Assess learning style and provide tailored resources\n\
         5. Monitor progress with mid-term assessments\n\n\
         Should I identify students with a previous-semester GPA below 7.5?"
    } else {
        "General intervention strategies include:\n\n\
         1. Academic Support: tutoring, study groups, time management\n\
         2. Financial Assistance: aid programs, emergency funds, scholarships\n\
         3. Counseling: mental health support, academic advising\n\
         4. Engagement: club participation, peer mentoring, campus events\n\
         5. Monitoring: regular check-ins, progress tracking\n\n\
         Which area would you like to focus on?"
    };
    ChatReply::text(text.to_string())
}

fn export(message: &Message, context: &ChatContext<'_>) -> ChatReply {
    let department = message.department();
    let count = select_department(context.students, department.map(|d| d.fragment)).len();
    let file_name = format!("student-report-{}.csv", context.today.format("%Y-%m-%d"));
    let scope = department
        .map(|d| format!(" from {}", d.label()))
        .unwrap_or_default();

    ChatReply {
        text: format!(
            "I've exported a CSV report with {count} students{scope} to {file_name}. \
             The file includes all student data with risk scores and levels."
        ),
        action: Some(ChatAction::ExportCsv {
            department: department.map(|d| d.fragment.to_string()),
            file_name,
        }),
    }
}

fn department_breakdown(_message: &Message, context: &ChatContext<'_>) -> ChatReply {
    let mut text = String::from("Here's the breakdown by department:\n\n");
    for stats in analytics::by_department(context.students) {
        let _ = writeln!(
            text,
            "{}: {} students, {} high-risk ({:.1}%)",
            stats.department,
            stats.tiers.total(),
            stats.tiers.high_risk,
            stats.high_risk_share()
        );
    }
    text.push_str("\nWhich department would you like to focus on?");
    ChatReply::text(text)
}

fn totals(_message: &Message, context: &ChatContext<'_>) -> ChatReply {
    let summary = analytics::summarize(context.students);
    let mut text = String::from("Current student statistics:\n\n");
    let _ = writeln!(text, "- Total Students: {}", summary.total);
    for level in [RiskLevel::HighRisk, RiskLevel::AtRisk, RiskLevel::LowRisk] {
        let count = summary.count(level);
        let _ = writeln!(
            text,
            "- {}: {} ({:.1}%)",
            level.label(),
            count,
            summary.share(count)
        );
    }
    let _ = writeln!(text);
    let _ = writeln!(text, "Average Attendance: {:.1}%", summary.avg_attendance);
    let _ = write!(text, "Average GPA: {:.2}", summary.avg_gpa);
    ChatReply::text(text)
}

fn fallback(message: &Message) -> ChatReply {
    ChatReply::text(format!(
        "I understand you're asking about \"{}\". I can help you with:\n\n\
         - Finding high-risk or at-risk students by department\n\
         - Explaining how risk scores are calculated\n\
         - Providing intervention recommendations\n\
         - Exporting reports and data\n\
         - Analyzing department statistics\n\n\
         Try asking something like \"Show high-risk CS students\".",
        message.original
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date")
    }

    #[test]
    fn rules_are_checked_in_priority_order() {
        let bot = Chatbot::default();
        assert_eq!(bot.rule_for("Show high-risk CS students"), Some("risk-lookup"));
        assert_eq!(bot.rule_for("how are at risk students scored"), Some("risk-lookup"));
        assert_eq!(bot.rule_for("Explain risk calculation"), Some("explain-scoring"));
        assert_eq!(
            bot.rule_for("Intervention for low attendance"),
            Some("interventions")
        );
        assert_eq!(bot.rule_for("Export department report"), Some("export"));
        assert_eq!(bot.rule_for("dept overview"), Some("departments"));
        assert_eq!(bot.rule_for("How many students are there?"), Some("totals"));
        assert_eq!(bot.rule_for("show me the roster"), None);
    }

    #[test]
    fn quick_actions_all_match_a_rule() {
        let bot = Chatbot::default();
        for action in QUICK_ACTIONS {
            assert!(bot.rule_for(action).is_some(), "{action}");
        }
    }

    #[test]
    fn high_risk_lookup_filters_by_department_keyword() {
        let students = sample::generate(&mut StdRng::seed_from_u64(4));
        let context = ChatContext {
            students: &students,
            today: today(),
        };
        let expected = students
            .iter()
            .filter(|s| s.department == "Computer Science")
            .filter(|s| s.assess().level == RiskLevel::HighRisk)
            .count();

        let reply = Chatbot::default().reply("Show high-risk CS students", &context);
        if expected == 0 {
            assert_eq!(reply.text, "I found no high-risk students in CS.");
        } else {
            assert!(reply
                .text
                .starts_with(&format!("I found {expected} high-risk students in CS.")));
        }
        assert!(reply.action.is_none());
    }

    #[test]
    fn department_keywords_match_whole_words() {
        assert_eq!(Message::new("civil engineering").department().map(|d| d.keyword), Some("civil"));
        assert_eq!(
            Message::new("at risk in computer science").department().map(|d| d.keyword),
            Some("computer science")
        );
        assert!(Message::new("seconds").department().is_none());
        assert!(Message::new("physics").department().is_none());
    }

    #[test]
    fn export_reply_carries_action() {
        let students = sample::generate(&mut StdRng::seed_from_u64(4));
        let context = ChatContext {
            students: &students,
            today: today(),
        };
        let reply = Chatbot::default().reply("download the MBA report", &context);
        assert_eq!(
            reply.action,
            Some(ChatAction::ExportCsv {
                department: Some("mba".to_string()),
                file_name: "student-report-2026-03-14.csv".to_string(),
            })
        );
        assert!(reply.text.contains("with 4 students from MBA"));
    }

    #[test]
    fn totals_and_fallback() {
        let students = sample::generate(&mut StdRng::seed_from_u64(4));
        let context = ChatContext {
            students: &students,
            today: today(),
        };
        let bot = Chatbot::default();
        let reply = bot.reply("total count please", &context);
        assert!(reply.text.contains("- Total Students: 20"));

        let reply = bot.reply("what's for lunch", &context);
        assert!(reply.text.starts_with("I understand you're asking about \"what's for lunch\""));
    }

    #[test]
    fn empty_collection_does_not_divide_by_zero() {
        let context = ChatContext {
            students: &[],
            today: today(),
        };
        let bot = Chatbot::default();
        assert_eq!(
            bot.reply("any high risk students?", &context).text,
            "I found no high-risk students."
        );
        assert!(bot
            .reply("how many students", &context)
            .text
            .contains("Average GPA: 0.00"));
    }
}
