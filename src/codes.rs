// 🔤 Code Rules - headquarter / branch conventions
//
// A SWIFT (BIC) code is 8 or 11 characters. The first 8 characters are the
// "root" shared by a headquarter and all of its branches. Headquarters carry
// the literal suffix "XXX" in the 11-character form.
//
// The headquarter/branch relation is never stored: it is recomputed from
// (code prefix, is_headquarter flag) every time it is needed.

/// Length of the shared root (institution + country + location)
pub const ROOT_LEN: usize = 8;

/// Suffix that marks a headquarter code at import time
pub const HEADQUARTER_SUFFIX: &str = "XXX";

/// First 8 characters of a code.
///
/// Shorter input is returned unchanged; callers then match on that shorter
/// prefix.
pub fn root_of(code: &str) -> &str {
    match code.char_indices().nth(ROOT_LEN) {
        Some((idx, _)) => &code[..idx],
        None => code,
    }
}

/// Import-time convention: a code is a headquarter iff it ends with "XXX"
pub fn is_headquarter_code(code: &str) -> bool {
    code.ends_with(HEADQUARTER_SUFFIX)
}

/// Is `candidate` (with its headquarter flag) a branch of `headquarter_code`?
pub fn is_branch_of(candidate: &str, candidate_is_headquarter: bool, headquarter_code: &str) -> bool {
    !candidate_is_headquarter && candidate.starts_with(root_of(headquarter_code))
}
