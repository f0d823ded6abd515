//! Canonical verb table
//!
//! One table of phrases for every accepted spelling of a command. Verbs are
//! matched by prefix on the first comma-separated field; help topics are
//! matched exactly.

use crate::model::CommandVerb;

/// Every accepted phrase and the verb it stands for
pub const VERB_ALIASES: &[(&str, CommandVerb)] = &[
    ("request timesheet", CommandVerb::RequestTimesheet),
    ("form request", CommandVerb::RequestTimesheet),
    ("submit timesheet", CommandVerb::SubmitTimesheet),
    ("form submit", CommandVerb::SubmitTimesheet),
    ("request report", CommandVerb::RequestReport),
    ("report", CommandVerb::RequestReport),
];

/// Lowercase and collapse runs of whitespace to a single space
pub(crate) fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Verb whose phrase prefixes `field`; the longest matching phrase wins
pub fn match_verb(field: &str) -> Option<CommandVerb> {
    let field = normalize(field);
    VERB_ALIASES
        .iter()
        .filter(|(phrase, _)| field.starts_with(phrase))
        .max_by_key(|(phrase, _)| phrase.len())
        .map(|(_, verb)| *verb)
}

/// Verb whose phrase equals `topic` exactly
pub fn match_topic(topic: &str) -> Option<CommandVerb> {
    let topic = normalize(topic);
    VERB_ALIASES
        .iter()
        .find(|(phrase, _)| *phrase == topic)
        .map(|(_, verb)| *verb)
}

/// All phrases accepted for `verb`, canonical first
pub fn aliases_of(verb: CommandVerb) -> Vec<&'static str> {
    let mut phrases: Vec<&'static str> = VERB_ALIASES
        .iter()
        .filter(|(_, v)| *v == verb)
        .map(|(phrase, _)| *phrase)
        .collect();
    phrases.sort_by_key(|phrase| *phrase != verb.phrase());
    phrases
}
