//! Route-line tokenization and token classification.
//!
//! The classification grammars overlap (a 5-character token could be a fix,
//! an ARINC coordinate, or a stale procedure code), so `classify` applies
//! its checks in a fixed documented order.

use lazy_static::lazy_static;
use regex::Regex;

use crate::coord;
use crate::nav::NavData;

pub const PLAYBOOK_PREFIX: &str = "PB.";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenKind {
    Airport,
    Facility,
    Fix,
    Airway,
    Procedure,
    CodedRoute,
    PlaybookDirective,
    CoordinateLiteral,
    Unknown,
}

#[derive(Clone, Debug)]
pub struct RouteToken {
    pub text: String,
    pub kind: TokenKind,
    pub mandatory: bool,
    pub source_index: usize,
}

/// A cleaned, uppercased token with its mandatory flag and the index of the
/// pre-expansion token it descends from. Expansion passes operate on these.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenSlot {
    pub text: String,
    pub mandatory: bool,
    pub source_index: usize,
}

impl TokenSlot {
    pub fn derived(&self, text: &str) -> TokenSlot {
        TokenSlot {
            text: text.to_uppercase(),
            mandatory: self.mandatory,
            source_index: self.source_index,
        }
    }
}

/// Splits off the renderer color suffix (`;RED`), which is not part of the
/// route grammar but must be stripped before tokenization.
pub fn split_color(line: &str) -> (&str, Option<String>) {
    match line.find(';') {
        Some(i) => {
            let color = line[i + 1..].trim();
            (
                line[..i].trim(),
                if color.is_empty() {
                    None
                } else {
                    Some(color.to_uppercase())
                },
            )
        }
        None => (line.trim(), None),
    }
}

/// Whole-line `>...<` wrapper detection.
pub fn strip_line_wrapper(body: &str) -> (&str, bool) {
    let trimmed = body.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('>') && trimmed.ends_with('<') {
        (trimmed[1..trimmed.len() - 1].trim(), true)
    } else {
        (trimmed, false)
    }
}

/// Whitespace tokenization with the `>`/`<` mandatory state machine. The
/// markers may sit on token boundaries (`>KJFK MERIT<`) or wrap a single
/// token (`>MERIT<`); both endpoints of the marked span are mandatory.
pub fn tokenize(body: &str) -> Vec<TokenSlot> {
    let mut out = Vec::new();
    let mut inside = false;

    for raw in body.split_whitespace() {
        let clean: String = raw
            .chars()
            .filter(|c| *c != '>' && *c != '<')
            .collect::<String>()
            .to_uppercase();
        if clean.is_empty() {
            continue;
        }

        let has_open = raw.contains('>');
        let has_close = raw.contains('<');

        let mandatory = if has_open && has_close {
            true
        } else if has_open {
            inside = true;
            true
        } else if has_close {
            inside = false;
            true
        } else {
            inside
        };

        out.push(TokenSlot {
            text: clean,
            mandatory,
            source_index: out.len(),
        });
    }

    out
}

lazy_static! {
    // V4, J80, Q22, T294, A699
    static ref AIRWAY_RE: Regex = Regex::new(r"^[A-Z]{1,2}\d{1,3}$").unwrap();
    // SKORR5, CLTCH#, DEEZZ5.TOWIN
    static ref PROC_RE: Regex = Regex::new(r"^[A-Z]{2,6}[0-9#](\.[A-Z0-9]{1,6})?$").unwrap();
}

pub fn looks_like_airway(token: &str) -> bool {
    AIRWAY_RE.is_match(token)
}

pub fn looks_like_procedure(token: &str) -> bool {
    PROC_RE.is_match(token)
}

/// Classifies one cleaned token. Order matters: CDR table, playbook prefix,
/// airway table, procedure code pattern, point table, coordinate grammars,
/// then airway-shaped strays, then Unknown.
pub fn classify(slot: &TokenSlot, nav: &NavData) -> RouteToken {
    let text = &slot.text;

    let kind = if nav.cdrs.contains(text) {
        TokenKind::CodedRoute
    } else if text.starts_with(PLAYBOOK_PREFIX) {
        TokenKind::PlaybookDirective
    } else if nav.airways.contains(text) {
        TokenKind::Airway
    } else if looks_like_procedure(text) && !nav.points.contains(text) {
        TokenKind::Procedure
    } else if nav.points.contains(text)
        || nav.points.is_facility(text)
        || nav.areas.contains(text)
    {
        if text.starts_with("ZZ_") || nav.points.is_facility(text) || nav.areas.contains(text) {
            TokenKind::Facility
        } else if text.chars().count() == 4 {
            TokenKind::Airport
        } else {
            TokenKind::Fix
        }
    } else if coord::parse_coordinate(text).is_some() {
        TokenKind::CoordinateLiteral
    } else if looks_like_airway(text) {
        // Airway-shaped but absent from the table; reported as a failed
        // expansion downstream rather than an unknown token
        TokenKind::Airway
    } else {
        TokenKind::Unknown
    };

    RouteToken {
        text: text.clone(),
        kind,
        mandatory: slot.mandatory,
        source_index: slot.source_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LatLon;

    fn nav() -> NavData {
        let mut nav = NavData::default();
        nav.points.insert("KJFK", LatLon::new(40.64, -73.78));
        nav.points.insert("MERIT", LatLon::new(41.38, -72.95));
        nav.points.insert("ZZ_ZBW", LatLon::new(42.7, -71.5));
        nav.points.finish_load();
        nav.airways.insert("Q22", &["BURGG", "WYNDE", "RBV"]);
        nav.cdrs.insert("ACKMKEN0", "KACK LFV KMKE");
        nav
    }

    #[test]
    fn color_and_wrapper_split() {
        let (body, color) = split_color("KJFK MERIT KBOS;red");
        assert_eq!(body, "KJFK MERIT KBOS");
        assert_eq!(color.as_deref(), Some("RED"));

        let (inner, mandatory) = strip_line_wrapper(">KJFK MERIT<");
        assert!(mandatory);
        assert_eq!(inner, "KJFK MERIT");
    }

    #[test]
    fn tokenize_mandatory_span() {
        let slots = tokenize(">KJFK MERIT< WAVEY KBOS");
        let flags: Vec<bool> = slots.iter().map(|s| s.mandatory).collect();
        assert_eq!(flags, vec![true, true, false, false]);
        assert_eq!(slots[0].text, "KJFK");
        assert_eq!(slots[3].source_index, 3);
    }

    #[test]
    fn tokenize_single_wrapped_token() {
        let slots = tokenize("KJFK >MERIT< WAVEY");
        let flags: Vec<bool> = slots.iter().map(|s| s.mandatory).collect();
        assert_eq!(flags, vec![false, true, false]);
    }

    #[test]
    fn classify_priority_order() {
        let nav = nav();
        let k = |t: &str| {
            classify(
                &TokenSlot {
                    text: t.to_string(),
                    mandatory: false,
                    source_index: 0,
                },
                &nav,
            )
            .kind
        };

        assert_eq!(k("ACKMKEN0"), TokenKind::CodedRoute);
        assert_eq!(k("PB.CAN1EAST"), TokenKind::PlaybookDirective);
        assert_eq!(k("Q22"), TokenKind::Airway);
        assert_eq!(k("SKORR5"), TokenKind::Procedure);
        assert_eq!(k("DEEZZ5.TOWIN"), TokenKind::Procedure);
        assert_eq!(k("KJFK"), TokenKind::Airport);
        assert_eq!(k("MERIT"), TokenKind::Fix);
        assert_eq!(k("ZZ_ZBW"), TokenKind::Facility);
        assert_eq!(k("ZBW"), TokenKind::Facility);
        assert_eq!(k("5275N"), TokenKind::CoordinateLiteral);
        assert_eq!(k("51/53"), TokenKind::CoordinateLiteral);
        // Airway-shaped but not in the table
        assert_eq!(k("J999"), TokenKind::Airway);
        assert_eq!(k("@@@"), TokenKind::Unknown);
    }

    #[test]
    fn charted_point_outranks_procedure_shape() {
        let mut nav = nav();
        // A charted fix whose name fits the procedure grammar classifies as
        // a fix, so a plausibility rejection reports it as unresolved rather
        // than as a failed expansion
        nav.points.insert("SKORR5", LatLon::new(40.55, -73.9));
        nav.points.finish_load();
        let slot = TokenSlot {
            text: "SKORR5".to_string(),
            mandatory: false,
            source_index: 0,
        };
        assert_eq!(classify(&slot, &nav).kind, TokenKind::Fix);
    }
}
