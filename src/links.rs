//! Link destination and action parsing.
//!
//! Raw /Dest arrays and /A action dictionaries are normalized into URI
//! strings: internal destinations become `#page=N&zoom=nan,x,y` (1-based
//! page number, viewport coordinates), external actions keep their scheme
//! URI. [`resolve_link`] is the reverse mapping from an internal URI back
//! to a zero-based page number and viewport coordinates.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::object::Object;
use crate::pages::page_bounds;

/// Whether a normalized link URI points outside the document.
pub fn is_external_link(uri: &str) -> bool {
    !uri.starts_with('#')
}

/// Parse a raw /Dest value into a normalized URI.
///
/// Explicit destination arrays (direct or via one level of indirection)
/// yield an internal URI. Destinations whose page reference cannot be
/// located in the page tree yield `Ok(None)` rather than an error, since
/// a dangling destination is a property of the document, not a fault of
/// the caller.
pub fn parse_link_dest(doc: &Document, dest: &Object) -> Result<Option<String>> {
    let Some(resolved) = doc.resolve(dest) else {
        return Ok(None);
    };
    let Some(arr) = resolved.as_array() else {
        return Ok(None);
    };
    let Some(page_obj) = arr.first() else {
        return Ok(None);
    };
    let Some(page_ref) = page_obj.as_reference() else {
        return Ok(None);
    };

    let Some(page_no) = doc.find_page_number(page_ref) else {
        log::warn!("Destination page {} not found in page tree", page_ref);
        return Ok(None);
    };

    // Destination coordinates are in page space (origin bottom-left); the
    // in-memory model uses viewport coordinates (origin top-left). The
    // y == 0 case bypasses inversion, matching the writer.
    let (x, y) = match arr.get(1).and_then(|f| doc.resolve(f)).and_then(|f| f.as_name()) {
        Some("XYZ") => {
            let x = number_at(doc, arr, 2);
            let y = number_at(doc, arr, 3);
            let h = page_bounds(doc, page_ref)?.height();
            (x, if y != 0.0 { h - y } else { 0.0 })
        },
        Some("FitH") | Some("FitBH") => {
            let y = number_at(doc, arr, 2);
            let h = page_bounds(doc, page_ref)?.height();
            (0.0, if y != 0.0 { h - y } else { 0.0 })
        },
        Some("FitV") | Some("FitBV") => (number_at(doc, arr, 2), 0.0),
        _ => (0.0, 0.0),
    };

    Ok(Some(format_internal_uri(page_no, x, y)))
}

/// Parse a raw /A action value into a normalized URI.
///
/// URI actions produce an external URI; GoTo actions defer to their /D
/// destination. Other action kinds carry no navigable target and yield
/// `Ok(None)`.
pub fn parse_link_action(doc: &Document, action: &Object) -> Result<Option<String>> {
    let Some(dict) = doc.resolve_dict(action) else {
        return Ok(None);
    };

    match dict.get("S").and_then(|s| doc.resolve(s)).and_then(|s| s.as_name()) {
        Some("URI") => {
            let uri = dict
                .get("URI")
                .and_then(|u| doc.resolve(u))
                .and_then(|u| u.to_text_string());
            Ok(uri)
        },
        Some("GoTo") => match dict.get("D") {
            Some(dest) => parse_link_dest(doc, dest),
            None => Ok(None),
        },
        _ => Ok(None),
    }
}

/// Resolve an internal URI to `(page, x, y)`.
///
/// The page number is validated against the document; a URI naming a page
/// that does not exist is a referential error.
pub fn resolve_link(doc: &Document, uri: &str) -> Result<(usize, f32, f32)> {
    let (page_no, x, y) = parse_internal_uri(uri)
        .ok_or_else(|| Error::Structure(format!("malformed internal link: {uri}")))?;

    if doc.lookup_page_obj(page_no).is_none() {
        return Err(Error::PageNotFound(page_no));
    }
    Ok((page_no, x, y))
}

/// Format an internal URI from a zero-based page number and coordinates.
fn format_internal_uri(page_no: usize, x: f32, y: f32) -> String {
    format!("#page={}&zoom=nan,{},{}", page_no + 1, x, y)
}

/// Parse an internal URI; returns a zero-based page number.
fn parse_internal_uri(uri: &str) -> Option<(usize, f32, f32)> {
    let rest = uri.strip_prefix("#page=")?;
    let (page_str, params) = match rest.split_once('&') {
        Some((p, rest)) => (p, Some(rest)),
        None => (rest, None),
    };
    let page_1based: usize = page_str.parse().ok()?;
    let page_no = page_1based.checked_sub(1)?;

    let (mut x, mut y) = (0.0, 0.0);
    if let Some(params) = params {
        if let Some(zoom) = params.strip_prefix("zoom=") {
            let mut parts = zoom.split(',');
            let _zoom = parts.next();
            x = parts.next().and_then(|v| v.parse().ok()).unwrap_or(0.0);
            y = parts.next().and_then(|v| v.parse().ok()).unwrap_or(0.0);
        }
    }
    Some((page_no, x, y))
}

/// Read a number from an array slot, treating Null and absence as zero.
fn number_at(doc: &Document, arr: &[Object], idx: usize) -> f32 {
    arr.get(idx)
        .and_then(|v| doc.resolve(v))
        .and_then(|v| v.as_number())
        .unwrap_or(0.0) as f32
}
