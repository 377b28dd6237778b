//! Guided complaint intake over chat: a fixed question sequence that
//! collects the same fields as the manual form, then performs the same
//! insert. Every (state, input) pair resolves through [`step`], a pure
//! function; the only side effects (the insert and the ticket lookup)
//! are returned as [`Transition`] values for the handler to execute.

use crate::services::complaint::NewComplaint;
use crate::utils::{is_digits, title_case};
use dashmap::DashMap;
use std::sync::Arc;

pub const DEPARTMENT_OPTIONS: [&str; 6] = [
    "Water Supply",
    "Electricity",
    "Roads & Transport",
    "Health & Sanitation",
    "Education",
    "Other",
];

const MAIN_OPTIONS: [&str; 2] = ["Report an Issue", "Check Status"];

/// Fields collected so far during a report flow. Filled front to back
/// as the conversation advances.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportDraft {
    pub department: String,
    pub complaint: String,
    pub name: String,
    pub phone: String,
    pub district: String,
    pub block: String,
    pub gp: String,
    pub village: String,
    pub landmark: String,
    pub pincode: String,
}

impl From<ReportDraft> for NewComplaint {
    fn from(draft: ReportDraft) -> Self {
        NewComplaint {
            name: draft.name,
            phone: draft.phone,
            district: draft.district,
            block: draft.block,
            gp: draft.gp,
            village: draft.village,
            landmark: draft.landmark,
            pincode: draft.pincode,
            department: draft.department,
            complaint: draft.complaint,
            proof: None,
            voice_proof: None,
        }
    }
}

/// Where the conversation stands. Absent session state is `Init`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ChatState {
    #[default]
    Init,
    AskDepartment,
    AskComplaint(ReportDraft),
    AskName(ReportDraft),
    AskPhone(ReportDraft),
    AskDistrict(ReportDraft),
    AskBlock(ReportDraft),
    AskGp(ReportDraft),
    AskVillage(ReportDraft),
    AskLandmark(ReportDraft),
    AskPincode(ReportDraft),
    ConfirmSubmit(ReportDraft),
    AskTicketId,
}

/// One chat turn's outcome: either a plain reply with the next state, or
/// a side effect the caller must perform before composing the reply.
#[derive(Clone, Debug, PartialEq)]
pub enum Transition {
    Reply {
        next: ChatState,
        response: String,
        options: Vec<String>,
    },
    /// Persist the completed draft as a new complaint.
    Submit { draft: ReportDraft },
    /// Look up the status of an existing ticket.
    Lookup { ticket_id: i32 },
}

fn reply(next: ChatState, response: impl Into<String>) -> Transition {
    Transition::Reply {
        next,
        response: response.into(),
        options: Vec::new(),
    }
}

fn reply_with_options(
    next: ChatState,
    response: impl Into<String>,
    options: &[&str],
) -> Transition {
    Transition::Reply {
        next,
        response: response.into(),
        options: options.iter().map(|s| s.to_string()).collect(),
    }
}

/// Advance the conversation by one message.
pub fn step(state: ChatState, message: &str, logged_in: bool) -> Transition {
    let lowered = message.to_lowercase();

    match state {
        ChatState::Init => {
            if lowered.contains("report an issue") {
                if logged_in {
                    reply_with_options(
                        ChatState::AskDepartment,
                        "Okay, let's file a detailed report. Please choose the concerned department.",
                        &DEPARTMENT_OPTIONS,
                    )
                } else {
                    reply(
                        ChatState::Init,
                        "You must be logged in to report an issue. Please log in first.",
                    )
                }
            } else if lowered.contains("check status") {
                if logged_in {
                    reply(
                        ChatState::AskTicketId,
                        "Sure, I can check a complaint's status. What is the ticket ID number?",
                    )
                } else {
                    reply(
                        ChatState::Init,
                        "You must be logged in to check a status. Please log in first.",
                    )
                }
            } else if logged_in {
                reply_with_options(
                    ChatState::Init,
                    "Hi! I'm Citra, your CityZen assistant. You can report any city issues \
                     here or check the status of a report you've submitted. How can I help \
                     you today?",
                    &MAIN_OPTIONS,
                )
            } else {
                reply(ChatState::Init, "Welcome! Please log in to use the chatbot.")
            }
        }

        ChatState::AskDepartment => {
            let draft = ReportDraft {
                department: title_case(message),
                ..Default::default()
            };
            let response = format!(
                "Department: {}. Now, please describe your complaint in detail.",
                draft.department
            );
            reply(ChatState::AskComplaint(draft), response)
        }

        ChatState::AskComplaint(mut draft) => {
            draft.complaint = message.to_string();
            reply(ChatState::AskName(draft), "Thank you. What is your full name?")
        }

        ChatState::AskName(mut draft) => {
            draft.name = title_case(message);
            reply(
                ChatState::AskPhone(draft),
                "Got it. What is your 10-digit phone number?",
            )
        }

        ChatState::AskPhone(mut draft) => {
            if is_digits(lowered.trim(), 10) {
                draft.phone = lowered.trim().to_string();
                reply(
                    ChatState::AskDistrict(draft),
                    "Thanks. Now for the location. Which district is this in?",
                )
            } else {
                reply(
                    ChatState::AskPhone(draft),
                    "That doesn't seem like a valid 10-digit phone number. Please try again.",
                )
            }
        }

        ChatState::AskDistrict(mut draft) => {
            draft.district = title_case(message);
            reply(ChatState::AskBlock(draft), "Which block?")
        }

        ChatState::AskBlock(mut draft) => {
            draft.block = title_case(message);
            reply(
                ChatState::AskGp(draft),
                "And the Gram Panchayat (GP) name?",
            )
        }

        ChatState::AskGp(mut draft) => {
            draft.gp = title_case(message);
            reply(ChatState::AskVillage(draft), "What is the village name?")
        }

        ChatState::AskVillage(mut draft) => {
            draft.village = title_case(message);
            reply(
                ChatState::AskLandmark(draft),
                "Please provide a nearby landmark.",
            )
        }

        ChatState::AskLandmark(mut draft) => {
            draft.landmark = message.to_string();
            reply(
                ChatState::AskPincode(draft),
                "Finally, what is the 6-digit PIN code?",
            )
        }

        ChatState::AskPincode(mut draft) => {
            if is_digits(lowered.trim(), 6) {
                draft.pincode = lowered.trim().to_string();
                let summary = format!(
                    "Please confirm: Name: {}, Phone: {}, Location: {}, Dept: {}.",
                    draft.name, draft.phone, draft.village, draft.department
                );
                reply_with_options(
                    ChatState::ConfirmSubmit(draft),
                    summary,
                    &["Yes, submit", "No, cancel"],
                )
            } else {
                reply(
                    ChatState::AskPincode(draft),
                    "That doesn't look like a valid 6-digit PIN code. Please try again.",
                )
            }
        }

        ChatState::ConfirmSubmit(draft) => {
            if lowered.contains("yes") {
                Transition::Submit { draft }
            } else {
                reply_with_options(
                    ChatState::Init,
                    "Okay, I've canceled the report. How else can I help?",
                    &MAIN_OPTIONS,
                )
            }
        }

        ChatState::AskTicketId => match lowered.trim().parse::<i32>() {
            Ok(ticket_id) => Transition::Lookup { ticket_id },
            Err(_) => reply(
                ChatState::AskTicketId,
                "That doesn't look like a valid ticket ID. Please provide a number.",
            ),
        },
    }
}

/// Reply after a successful submit. The flow always resets to Init.
pub fn submitted_reply(ticket_id: i32) -> Transition {
    reply(
        ChatState::Init,
        format!(
            "Thank you! Your complaint is submitted. Your ticket ID is #{ticket_id}. \
             You can upload photo or video proof at /api/v1/complaints/{ticket_id}/proof."
        ),
    )
}

///// Reply after a failed submit: the draft is discarded, no retry.
pub fn submit_failed_reply() -> Transition {
    reply(
        ChatState::Init,
        "An error occurred and I've canceled this report. Please try again.",
    )
}

/// Outcome of a ticket lookup, resolved by the handler against the
/// database and the requesting user's phone.
#[derive(Debug, Clone, PartialEq)]
pub enum TicketLookup {
    Owned { status: String },
    NotYours,
    NotFound,
}

/// Reply after a ticket lookup. One attempt either way, then Init.
pub fn lookup_reply(ticket_id: i32, outcome: TicketLookup) -> Transition {
    let response = match outcome {
        TicketLookup::Owned { status } => {
            format!("The status for ticket #{ticket_id} is: '{status}'.")
        }
        TicketLookup::NotYours => "This ticket does not belong to you.".to_string(),
        TicketLookup::NotFound => {
            format!("Sorry, I could not find a complaint with ticket ID #{ticket_id}.")
        }
    };
    reply(ChatState::Init, response)
}

/// Per-user conversation state, held in process. Anonymous clients never
/// advance past Init, so only authenticated users get an entry.
#[derive(Clone, Default)]
pub struct ChatSessions {
    states: Arc<DashMap<i32, ChatState>>,
}

impl ChatSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the user's state; missing state means Init.
    pub fn take(&self, user_id: i32) -> ChatState {
        self.states
            .remove(&user_id)
            .map(|(_, state)| state)
            .unwrap_or_default()
    }

    pub fn put(&self, user_id: i32, state: ChatState) {
        // No point storing the resting state.
        if state == ChatState::Init {
            return;
        }
        self.states.insert(user_id, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply_parts(t: Transition) -> (ChatState, String, Vec<String>) {
        match t {
            Transition::Reply {
                next,
                response,
                options,
            } => (next, response, options),
            other => panic!("expected Reply, got {other:?}"),
        }
    }

    #[test]
    fn greeting_offers_both_options_when_logged_in() {
        let (next, _, options) = reply_parts(step(ChatState::Init, "hello there", true));
        assert_eq!(next, ChatState::Init);
        assert_eq!(options, vec!["Report an Issue", "Check Status"]);
    }

    #[test]
    fn greeting_prompts_login_when_anonymous() {
        let (next, response, options) = reply_parts(step(ChatState::Init, "hello", false));
        assert_eq!(next, ChatState::Init);
        assert!(response.contains("log in"));
        assert!(options.is_empty());
    }

    #[test]
    fn report_intent_requires_login() {
        let (next, response, _) =
            reply_parts(step(ChatState::Init, "I want to report an issue", false));
        assert_eq!(next, ChatState::Init);
        assert!(response.contains("logged in"));
    }

    #[test]
    fn report_intent_starts_flow_with_departments() {
        let (next, _, options) =
            reply_parts(step(ChatState::Init, "please, Report an Issue", true));
        assert_eq!(next, ChatState::AskDepartment);
        assert_eq!(options.len(), DEPARTMENT_OPTIONS.len());
    }

    #[test]
    fn check_status_intent_starts_lookup() {
        let (next, _, _) = reply_parts(step(ChatState::Init, "check status of my ticket", true));
        assert_eq!(next, ChatState::AskTicketId);
    }

    #[test]
    fn department_and_name_are_title_cased() {
        let t = step(ChatState::AskDepartment, "water SUPPLY", true);
        let (next, response, _) = reply_parts(t);
        match &next {
            ChatState::AskComplaint(draft) => assert_eq!(draft.department, "Water Supply"),
            other => panic!("unexpected state {other:?}"),
        }
        assert!(response.contains("Water Supply"));

        let draft = ReportDraft {
            department: "Water Supply".into(),
            complaint: "pipe burst".into(),
            ..Default::default()
        };
        let (next, _, _) = reply_parts(step(ChatState::AskName(draft), "ravi kumar", true));
        match next {
            ChatState::AskPhone(draft) => assert_eq!(draft.name, "Ravi Kumar"),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn complaint_and_landmark_kept_verbatim() {
        let draft = ReportDraft::default();
        let (next, _, _) = reply_parts(step(
            ChatState::AskComplaint(draft),
            "the HAND PUMP is broken",
            true,
        ));
        match next {
            ChatState::AskName(draft) => assert_eq!(draft.complaint, "the HAND PUMP is broken"),
            other => panic!("unexpected state {other:?}"),
        }

        let draft = ReportDraft::default();
        let (next, _, _) = reply_parts(step(
            ChatState::AskLandmark(draft),
            "near the OLD temple",
            true,
        ));
        match next {
            ChatState::AskPincode(draft) => assert_eq!(draft.landmark, "near the OLD temple"),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn nine_digit_phone_reprompts_without_advancing() {
        let draft = ReportDraft::default();
        let (next, response, _) =
            reply_parts(step(ChatState::AskPhone(draft.clone()), "900000000", true));
        assert_eq!(next, ChatState::AskPhone(draft));
        assert!(response.contains("valid 10-digit"));
    }

    #[test]
    fn eleven_digit_phone_reprompts_without_advancing() {
        let draft = ReportDraft::default();
        let (next, _, _) = reply_parts(step(ChatState::AskPhone(draft.clone()), "90000000011", true));
        assert_eq!(next, ChatState::AskPhone(draft));
    }

    #[test]
    fn ten_digit_phone_advances_to_district() {
        let draft = ReportDraft::default();
        let (next, _, _) = reply_parts(step(ChatState::AskPhone(draft), "9000000001", true));
        match next {
            ChatState::AskDistrict(draft) => assert_eq!(draft.phone, "9000000001"),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn bad_pincode_reprompts() {
        let draft = ReportDraft::default();
        let (next, _, _) = reply_parts(step(ChatState::AskPincode(draft.clone()), "75200", true));
        assert_eq!(next, ChatState::AskPincode(draft));
    }

    #[test]
    fn good_pincode_moves_to_confirmation_with_summary() {
        let draft = ReportDraft {
            name: "Ravi Kumar".into(),
            phone: "9000000001".into(),
            village: "Sakhigopal".into(),
            department: "Water Supply".into(),
            ..Default::default()
        };
        let (next, response, options) =
            reply_parts(step(ChatState::AskPincode(draft), "752001", true));
        assert!(matches!(next, ChatState::ConfirmSubmit(_)));
        assert!(response.contains("Ravi Kumar"));
        assert!(response.contains("Sakhigopal"));
        assert_eq!(options, vec!["Yes, submit", "No, cancel"]);
    }

    #[test]
    fn confirm_with_yes_submits_draft() {
        let draft = ReportDraft {
            pincode: "752001".into(),
            ..Default::default()
        };
        let t = step(ChatState::ConfirmSubmit(draft.clone()), "yes please", true);
        assert_eq!(t, Transition::Submit { draft });
    }

    #[test]
    fn confirm_with_anything_else_cancels() {
        let draft = ReportDraft::default();
        let (next, response, _) =
            reply_parts(step(ChatState::ConfirmSubmit(draft), "no thanks", true));
        assert_eq!(next, ChatState::Init);
        assert!(response.contains("canceled"));
    }

    #[test]
    fn ticket_id_parses_to_lookup() {
        assert_eq!(
            step(ChatState::AskTicketId, " 17 ", true),
            Transition::Lookup { ticket_id: 17 }
        );
    }

    #[test]
    fn non_numeric_ticket_id_reprompts() {
        let (next, response, _) = reply_parts(step(ChatState::AskTicketId, "seventeen", true));
        assert_eq!(next, ChatState::AskTicketId);
        assert!(response.contains("valid ticket ID"));
    }

    #[test]
    fn lookup_reply_never_reveals_foreign_status() {
        let t = lookup_reply(5, TicketLookup::NotYours);
        let (next, response, _) = reply_parts(t);
        assert_eq!(next, ChatState::Init);
        assert!(!response.contains("Pending"));
        assert!(response.contains("does not belong to you"));
    }

    #[test]
    fn sessions_default_to_init_and_drop_resting_state() {
        let sessions = ChatSessions::new();
        assert_eq!(sessions.take(1), ChatState::Init);

        sessions.put(1, ChatState::AskDepartment);
        assert_eq!(sessions.take(1), ChatState::AskDepartment);
        // take() removes the entry
        assert_eq!(sessions.take(1), ChatState::Init);

        sessions.put(1, ChatState::Init);
        assert_eq!(sessions.take(1), ChatState::Init);
    }
}
