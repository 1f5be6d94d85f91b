//! The full interpretation pipeline: one input line in, resolved points,
//! segments and per-token diagnostics out.
//!
//! Pass order is fixed: color split, whole-line wrapper, playbook directive
//! (which may yield several route strings), CDR text expansion, tokenize,
//! DP, STAR, airway, then left-to-right point resolution and segment
//! annotation. No token failure aborts a line.

use std::collections::HashSet;

use crate::error::RouteIssue;
use crate::expand;
use crate::nav::{NamedPoint, NavData};
use crate::resolve::{self, ResolvedPoint};
use crate::segment::{self, Segment};
use crate::token::{self, TokenKind, TokenSlot, PLAYBOOK_PREFIX};

#[derive(Debug)]
pub struct RouteLine {
    /// Zero-based input line the route came from. Playbook expansions share
    /// their directive's line index.
    pub line_index: usize,
    pub route_text: String,
    pub color: Option<String>,
    pub points: Vec<ResolvedPoint>,
    pub segments: Vec<Segment>,
    pub issues: Vec<RouteIssue>,
}

/// Interprets a whole input document. Segments duplicated across routes
/// (common with playbook expansions sharing a trunk) are kept only on the
/// first route that produces them.
pub fn interpret(nav: &NavData, input: &str) -> Vec<RouteLine> {
    let mut out = Vec::new();
    let mut seen_segments: HashSet<String> = HashSet::new();

    for (line_index, raw) in input.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let (body, color) = token::split_color(raw);
        let (inner, wrapped) = token::strip_line_wrapper(body);

        if inner.to_uppercase().starts_with(PLAYBOOK_PREFIX) {
            let directive = inner.to_uppercase();
            let routes = expand::expand_playbook(
                &directive[PLAYBOOK_PREFIX.len()..],
                wrapped,
                color.as_deref(),
                nav,
            );
            if routes.is_empty() {
                let tok = directive
                    .split_whitespace()
                    .next()
                    .unwrap_or(&directive)
                    .to_string();
                out.push(RouteLine {
                    line_index,
                    route_text: directive.clone(),
                    color,
                    points: Vec::new(),
                    segments: Vec::new(),
                    issues: vec![RouteIssue::ExpansionNotFound { token: tok }],
                });
                continue;
            }
            for r in routes {
                let (rbody, rcolor) = token::split_color(&r);
                let (rinner, rwrapped) = token::strip_line_wrapper(rbody);
                out.push(interpret_route(
                    nav,
                    line_index,
                    rinner,
                    rwrapped,
                    rcolor,
                    &mut seen_segments,
                ));
            }
            continue;
        }

        out.push(interpret_route(
            nav,
            line_index,
            inner,
            wrapped,
            color,
            &mut seen_segments,
        ));
    }

    out
}

fn interpret_route(
    nav: &NavData,
    line_index: usize,
    body: &str,
    wrapped: bool,
    color: Option<String>,
    seen_segments: &mut HashSet<String>,
) -> RouteLine {
    let expanded_text = expand::expand_cdr_text(body, nav);

    let mut slots = token::tokenize(&expanded_text);
    if wrapped {
        for s in &mut slots {
            s.mandatory = true;
        }
    }

    let slots = expand::expand_procedures(slots, nav);
    let slots = expand::expand_stars(slots, nav);
    let slots = expand::expand_airways(slots, nav);

    let (points, issues) = resolve_slots(nav, &slots);

    let mut segments = segment::annotate(&points);
    segments.retain(|s| seen_segments.insert(s.dedup_key()));

    RouteLine {
        line_index,
        route_text: expanded_text,
        color,
        points,
        segments,
        issues,
    }
}

// Left-to-right resolution. The look-ahead neighbor is resolved with the
// previous point and, when the current token is unambiguous, a tentative
// context-free resolution of the current token; a hint that fails the
// plausibility gate is simply absent.
fn resolve_slots(nav: &NavData, slots: &[TokenSlot]) -> (Vec<ResolvedPoint>, Vec<RouteIssue>) {
    let mut points: Vec<ResolvedPoint> = Vec::new();
    let mut issues: Vec<RouteIssue> = Vec::new();
    let mut prev: Option<NamedPoint> = None;

    for (i, slot) in slots.iter().enumerate() {
        let next_hint = slots.get(i + 1).and_then(|n| {
            let current = if resolve::candidate_count(nav, &slot.text) == 1 {
                resolve::resolve_name(nav, &slot.text, None, None)
            } else {
                None
            };
            resolve::resolve_name(nav, &n.text, prev.as_ref(), current.as_ref())
        });

        let mut resolved = resolve::resolve_name(nav, &slot.text, prev.as_ref(), next_hint.as_ref());

        // Stale procedure token that survived expansion, e.g. "TRTLL6" for a
        // fix charted as TRTLL: retry the 5-character root
        if resolved.is_none()
            && slot.text.len() == 6
            && slot.text.chars().any(|c| c.is_ascii_digit())
        {
            if let Some(root) = slot.text.get(..5) {
                resolved = resolve::resolve_name(nav, root, prev.as_ref(), next_hint.as_ref());
            }
        }

        match resolved {
            Some(p) => {
                points.push(ResolvedPoint {
                    id: p.id.clone(),
                    latlon: p.latlon,
                    mandatory: slot.mandatory,
                    source_index: slot.source_index,
                    is_airport: nav.is_airport_ident(&p.id),
                });
                prev = Some(p);
            }
            None => issues.push(issue_for(nav, slot)),
        }
    }

    (points, issues)
}

fn issue_for(nav: &NavData, slot: &TokenSlot) -> RouteIssue {
    let token = slot.text.clone();
    match token::classify(slot, nav).kind {
        TokenKind::Unknown => RouteIssue::UnknownToken { token },
        TokenKind::Airway
        | TokenKind::Procedure
        | TokenKind::CodedRoute
        | TokenKind::PlaybookDirective => RouteIssue::ExpansionNotFound { token },
        _ => RouteIssue::UnresolvedFix { token },
    }
}
