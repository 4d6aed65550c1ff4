//! Property name normalization.

/// Normalize a property name to its canonical form.
///
/// Leading/trailing whitespace and a leading `/` are dropped, the name is
/// lowercased, inner spaces become `-`, and a trailing `[0]` index is removed
/// so that `fcs/throttle-cmd-norm[0]` and `fcs/throttle-cmd-norm` share a node.
pub fn normalize(name: &str) -> String {
    let trimmed = name.trim().trim_start_matches('/');
    let mut out: String = trimmed
        .chars()
        .map(|c| if c == ' ' { '-' } else { c.to_ascii_lowercase() })
        .collect();
    if let Some(stripped) = out.strip_suffix("[0]") {
        out = stripped.to_string();
    }
    out
}

/// Property name a component publishes its own output under.
///
/// Names that already contain a path separator are used as written, bare
/// names land under `fcs/`.
pub fn component_property_name(component: &str) -> String {
    let base = normalize(component);
    if base.contains('/') {
        base
    } else {
        format!("fcs/{base}")
    }
}
