//! Generated-variant suffix rules.
//!
//! WordPress and image optimization plugins write resized or re-encoded
//! copies next to the original (`photo-300x200.jpg`, `photo-scaled.jpg`,
//! `photo-smush-original.jpg`). The rules below fold those back onto the
//! original filename. The list is closed: suffixes introduced by other
//! plugins are not recognized and such variants show up as separate files.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Pattern for each recognized variant suffix: `-WxH` dimensions, `-scaled`,
/// `-smush-original`.
pub const VARIANT_SUFFIX_RULES: &[&str] = &[r"-\d+x\d+", r"-scaled", r"-smush-original"];

/// One or more suffixes immediately followed by a trailing `.ext`.
static VARIANT_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = VARIANT_SUFFIX_RULES.join("|");
    let pattern = format!(r"(?s)^(?P<stem>.*?)(?:{alternatives})+(?P<ext>\.[A-Za-z0-9]+)$");
    Regex::new(&pattern).expect("variant suffix rules are valid regex")
});

/// Removes a trailing run of variant suffixes that sits right before the
/// file extension. Names without a trailing extension are left untouched.
pub fn strip_variant_suffix(url: &str) -> Cow<'_, str> {
    match VARIANT_SUFFIX_RE.captures(url) {
        Some(caps) => Cow::Owned(format!("{}{}", &caps["stem"], &caps["ext"])),
        None => Cow::Borrowed(url),
    }
}
