//! Macro-construct expansion: CDRs, departure procedures, STARs, playbook
//! directives and airways, each as its own pass over the token sequence.
//!
//! Passes run in a fixed order (CDR, DP, STAR, airway) so that constructs
//! emitted by one pass are still seen by the later ones, and each pass is
//! idempotent on its own output. Unmatched construct tokens pass through
//! unexpanded; the resolver reports them instead of dropping them.

use lazy_static::lazy_static;
use regex::Regex;

use crate::nav::{self, NavData};
use crate::token::TokenSlot;

/// CDR expansion at route-text level. A line consisting of a single known
/// code becomes that code's entire stored route; inline codes are replaced
/// in place by their stored tokens.
pub fn expand_cdr_text(route_text: &str, nav: &NavData) -> String {
    let tokens: Vec<&str> = route_text.split_whitespace().collect();

    if tokens.len() == 1 {
        let code = tokens[0].to_uppercase();
        if let Some(route) = nav.cdrs.route(&code) {
            return route.to_uppercase();
        }
        return route_text.to_string();
    }

    let mut out: Vec<String> = Vec::new();
    for tok in tokens {
        let code = tok.to_uppercase();
        match nav.cdrs.route(&code) {
            Some(route) => out.extend(route.to_uppercase().split_whitespace().map(String::from)),
            None => out.push(code),
        }
    }
    out.join(" ")
}

/// Expands a playbook directive body (everything after `PB.`) into the
/// matching stored route strings.
///
/// `PB.{play}` takes every route under the play; `.{origins}` and
/// `.{destinations}` parts narrow by endpoint (empty part = any, so
/// `PB.PLAY..KSFO` filters destination only). A mandatory-wrapped directive
/// re-wraps each expansion just inside its endpoints so the airports stay
/// advisory connectors.
pub fn expand_playbook(
    body: &str,
    mandatory: bool,
    color: Option<&str>,
    nav: &NavData,
) -> Vec<String> {
    let parts: Vec<&str> = body.split('.').collect();
    let play = parts.first().map(|s| s.trim()).unwrap_or("");
    if play.is_empty() {
        return Vec::new();
    }

    let play_norm = nav::normalize_play_name(play);
    let origin_tokens = endpoint_tokens(parts.get(1));
    let dest_tokens = endpoint_tokens(parts.get(2));

    nav.playbooks
        .matching(&play_norm, &origin_tokens, &dest_tokens)
        .into_iter()
        .map(|route| {
            let mut text = route.full_route.clone();
            if mandatory {
                text = rewrap_mandatory(&text);
            }
            match color {
                Some(c) => format!("{};{}", text, c),
                None => text,
            }
        })
        .collect()
}

fn endpoint_tokens(part: Option<&&str>) -> Vec<String> {
    part.map(|p| {
        p.to_uppercase()
            .split_whitespace()
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

// ">" goes on the second token and "<" on the second-to-last so the
// endpoints themselves stay outside the mandatory span.
fn rewrap_mandatory(route: &str) -> String {
    let mut tokens: Vec<String> = route.split_whitespace().map(String::from).collect();
    if tokens.len() > 2 {
        tokens[1] = format!(">{}", tokens[1]);
        let last_interior = tokens.len() - 2;
        tokens[last_interior] = format!("{}<", tokens[last_interior]);
        tokens.join(" ")
    } else {
        format!(">{}<", route)
    }
}

/// The route origin for DP matching: the first 3-4 character token that is
/// not a facility center.
pub fn find_route_origin(slots: &[TokenSlot], nav: &NavData) -> Option<String> {
    for slot in slots {
        let code = slot.text.as_str();
        if code.starts_with("ZZ_") || nav.points.is_facility(code) {
            continue;
        }
        let len = code.chars().count();
        if len == 3 || len == 4 {
            return Some(code.to_string());
        }
    }
    None
}

lazy_static! {
    static ref TRANSITION_FIX_RE: Regex = Regex::new(r"^[A-Z0-9]{3,6}$").unwrap();
}

/// Departure procedure pass. Tokens bearing a digit or `#` are matched
/// through the prioritized lookup chain; a hit is replaced by its body
/// sequence, plus the transition sequence when the token (or the token that
/// follows it) names a valid transition. The transition is oriented so its
/// first point meets the body's last, and the duplicate seam point dropped.
pub fn expand_procedures(slots: Vec<TokenSlot>, nav: &NavData) -> Vec<TokenSlot> {
    if nav.procedures.is_empty() || slots.is_empty() {
        return slots;
    }
    let origin = match find_route_origin(&slots, nav) {
        Some(o) => o,
        None => return slots,
    };

    let mut out: Vec<TokenSlot> = Vec::new();
    let mut i = 0;
    while i < slots.len() {
        let slot = &slots[i];
        let text = slot.text.as_str();

        if !text.contains(|c: char| c.is_ascii_digit() || c == '#') {
            out.push(slot.clone());
            i += 1;
            continue;
        }

        let rec = match nav.procedures.find(text, &origin) {
            Some(r) => r,
            None => {
                out.push(slot.clone());
                i += 1;
                continue;
            }
        };

        let code_left = rec.code.split('.').next().unwrap_or(&rec.code);
        let mut full = nav
            .procedures
            .body_sequence(&rec.code, &origin)
            .unwrap_or_default();

        // Transition fix from the token's own ".FIX" suffix, or from the
        // following token (consumed only when the combination is valid)
        let tok_parts: Vec<&str> = text.split('.').collect();
        let mut consumed_next = false;
        let trans_fix = if tok_parts.len() == 2 {
            Some((tok_parts[1].to_string(), false))
        } else {
            slots.get(i + 1).and_then(|next| {
                if TRANSITION_FIX_RE.is_match(&next.text) {
                    Some((next.text.clone(), true))
                } else {
                    None
                }
            })
        };

        if let Some((fix, from_next)) = trans_fix {
            let trans_code = format!("{}.{}", code_left, fix);
            if let Some(trans) = nav.procedures.transition_sequence(&trans_code, &origin) {
                full.extend(joined_transition(full.last().cloned(), trans));
                consumed_next = from_next;
            }
        }

        if full.is_empty() {
            out.push(slot.clone());
        } else {
            out.extend(full.iter().map(|p| slot.derived(p)));
            if consumed_next {
                i += 1;
            }
        }
        i += 1;
    }

    out
}

// Orients a transition against the body seam (forward or reversed so its
// first point equals the body's last) and drops the duplicated junction.
fn joined_transition(body_last: Option<String>, trans: Vec<String>) -> Vec<String> {
    let mut chosen = trans.clone();
    if let Some(bl) = &body_last {
        if chosen.first() == Some(bl) {
            // forward already aligned
        } else {
            let mut rev = trans;
            rev.reverse();
            if rev.first() == Some(bl) {
                chosen = rev;
            }
        }
        if chosen.first() == Some(bl) {
            chosen.remove(0);
        }
    }
    chosen
}

/// STAR pass: a token matching a transition computer code or STAR code is
/// replaced by the stored pre-joined route-point list, filtered by the
/// route's destination (its last token), latest effective date winning.
pub fn expand_stars(slots: Vec<TokenSlot>, nav: &NavData) -> Vec<TokenSlot> {
    if nav.stars.is_empty() || slots.is_empty() {
        return slots;
    }

    let dest = slots
        .iter()
        .rev()
        .find(|s| !s.text.is_empty())
        .map(|s| s.text.clone());

    let mut out = Vec::new();
    for slot in &slots {
        if nav.stars.contains(&slot.text) {
            if let Some(route) = nav.stars.find_route(&slot.text, dest.as_deref()) {
                out.extend(route.route_points.iter().map(|p| slot.derived(p)));
                continue;
            }
        }
        out.push(slot.clone());
    }
    out
}

/// Airway pass: an interior token found in the airway table whose previous
/// and next tokens both sit on the airway is replaced by the fixes strictly
/// between them, reversed when the route traverses the airway backwards.
/// Synthesized fixes are mandatory only when both bounding tokens are.
pub fn expand_airways(slots: Vec<TokenSlot>, nav: &NavData) -> Vec<TokenSlot> {
    if slots.len() < 3 {
        return slots;
    }

    let mut out = Vec::new();
    for i in 0..slots.len() {
        if i > 0 && i + 1 < slots.len() {
            if let Some(fixes) = nav.airways.fixes(&slots[i].text) {
                let prev = &slots[i - 1];
                let next = &slots[i + 1];
                let from = fixes.iter().position(|f| *f == prev.text);
                let to = fixes.iter().position(|f| *f == next.text);

                if let (Some(from), Some(to)) = (from, to) {
                    if (from as i64 - to as i64).abs() > 1 {
                        let mandatory = prev.mandatory && next.mandatory;
                        let middle: Vec<&String> = if from < to {
                            fixes[from + 1..to].iter().collect()
                        } else {
                            fixes[to + 1..from].iter().rev().collect()
                        };
                        out.extend(middle.into_iter().map(|f| TokenSlot {
                            text: f.clone(),
                            mandatory,
                            source_index: slots[i].source_index,
                        }));
                        continue;
                    }
                    if (from as i64 - to as i64).abs() == 1 {
                        // Endpoints are adjacent on the airway: nothing to
                        // insert, and the airway token itself must not leak
                        // into resolution
                        continue;
                    }
                }
            }
        }
        out.push(slots[i].clone());
    }
    out
}
