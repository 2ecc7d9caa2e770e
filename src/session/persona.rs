//! Persona prompt assembly.
//!
//! The persona is a single system-role turn generated once per session
//! lifecycle (load/reset) and prepended to every completion request. It is
//! never mutated mid-session.

use super::types::Turn;
use crate::config::{Config, PartyMember};

/// Build the persona prompt from the validated configuration.
///
/// Deterministic: the same config always yields the same turn. The paragraph
/// combines, in order: self-description directive, response-format
/// directive, party roster sentence, per-member facts, then the free-text
/// personality. Empty optional fields contribute nothing.
pub fn build_persona(config: &Config) -> Turn {
    let familiar = &config.familiar;
    let mut parts: Vec<String> = Vec::new();

    parts.push(format!(
        "Imagine you are a {kind} familiar in a dungeons and dragons game. \
         Your name is {name} and you should refer to yourself in the third person \
         as {name} or {pronoun}. Your owner is {owner}. \
         Do not describe yourself as an AI.",
        kind = familiar.kind,
        name = familiar.name,
        pronoun = familiar.pronoun,
        owner = familiar.owner,
    ));

    parts.push(
        "Keep your responses to a maximum of one to three sentences and respond \
         only in the third person."
            .to_string(),
    );

    if let Some(roster) = roster_sentence(&config.party) {
        parts.push(roster);
    }

    for member in &config.party {
        for fact in &member.facts {
            let fact = fact.trim();
            if !fact.is_empty() {
                parts.push(fact.to_string());
            }
        }
    }

    let personality = familiar.personality.trim();
    if !personality.is_empty() {
        parts.push(personality.to_string());
    }

    Turn::system(parts.join(" "))
}

/// Comma-separated roster with an "and" before the final member.
///
/// Returns `None` for an empty party so the prompt carries no stray
/// punctuation.
fn roster_sentence(party: &[PartyMember]) -> Option<String> {
    let clauses: Vec<String> = party.iter().map(member_clause).collect();
    let list = match clauses.as_slice() {
        [] => return None,
        [only] => only.clone(),
        [head @ .., last] => format!("{} and {last}", head.join(", ")),
    };
    Some(format!("Members of the party are {list}."))
}

/// `'Name' ('Nick' for short) a gender species profession`, skipping any
/// empty annotation.
fn member_clause(member: &PartyMember) -> String {
    let mut clause = format!("'{}'", member.name);

    if let Some(nickname) = member.nickname.as_deref() {
        let nickname = nickname.trim();
        if !nickname.is_empty() {
            clause.push_str(&format!(" ('{nickname}' for short)"));
        }
    }

    let descriptors: Vec<&str> = [&member.gender, &member.species, &member.profession]
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if !descriptors.is_empty() {
        clause.push_str(" a ");
        clause.push_str(&descriptors.join(" "));
    }

    clause
}
