//! Platform event identifiers.
//!
//! Any string is accepted as an event id; these are the events known at the
//! time of writing.

pub const CHAT_POST_SURVEY_EMAIL_TRANSCRIPT: &str = "denver_post_survey_email_transcript";
pub const CONVERSATIONAL_COMMAND: &str = "conversational_command";
pub const MESSAGING_NEW_CONVERSATION: &str = "controllerbot_messaging_new_conversation";
pub const MESSAGING_TTR: &str = "controllerbot_messaging_ttr";
pub const MESSAGING_PARTICIPANT_CHANGE: &str = "controllerbot_messaging_participants_change";
pub const MESSAGING_CONVERSATION_IDLE: &str = "controllerbot_messaging_conversation_idle";
pub const MESSAGING_CONVERSATION_ROUTING: &str = "controllerbot_messaging_conversation_routing";
pub const MESSAGING_LINE_IN_OFF_HOURS: &str = "controllerbot_messaging_mid_conversation_msg";
pub const MESSAGING_CONVERSATION_END: &str = "controllerbot_messaging_conversation_end";
pub const MESSAGING_SURVEY_STARTED: &str = "surveybot_messaging_survey_started";
pub const MESSAGING_SURVEY_ENDED: &str = "surveybot_messaging_survey_ended";
pub const THIRD_PARTY_BOTS_POST_HOOK: &str = "bot_connectors_post_hook";
pub const THIRD_PARTY_BOTS_ERROR_HOOK: &str = "bot_connectors_error_hook";
pub const THIRD_PARTY_BOTS_CUSTOM_INTEGRATION: &str = "bot_connectors_custom_integration";
pub const THIRD_PARTY_BOTS_PRE_HOOK: &str = "bot_connectors_pre_hook";

/// Every known event id
pub const ALL: [&str; 15] = [
    CHAT_POST_SURVEY_EMAIL_TRANSCRIPT,
    CONVERSATIONAL_COMMAND,
    MESSAGING_NEW_CONVERSATION,
    MESSAGING_TTR,
    MESSAGING_PARTICIPANT_CHANGE,
    MESSAGING_CONVERSATION_IDLE,
    MESSAGING_CONVERSATION_ROUTING,
    MESSAGING_LINE_IN_OFF_HOURS,
    MESSAGING_CONVERSATION_END,
    MESSAGING_SURVEY_STARTED,
    MESSAGING_SURVEY_ENDED,
    THIRD_PARTY_BOTS_POST_HOOK,
    THIRD_PARTY_BOTS_ERROR_HOOK,
    THIRD_PARTY_BOTS_CUSTOM_INTEGRATION,
    THIRD_PARTY_BOTS_PRE_HOOK,
];

/// Whether `event_id` is one of the known platform events
pub fn is_known(event_id: &str) -> bool {
    ALL.contains(&event_id)
}
