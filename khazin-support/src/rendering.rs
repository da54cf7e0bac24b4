//! Text rendering utilities for human-friendly diagnostics.
//!
//! Used by the container to format resolution chains, wiring
//! explanations and "did you mean?" hints.

use std::fmt::Write as _;

/// Renders a resolution chain as a single line.
///
/// # Examples
/// ```
/// use khazin_support::rendering::render_chain;
///
/// let chain = vec!["UserController", "UserService", "UserController"];
/// assert_eq!(render_chain(&chain), "UserController → UserService → UserController");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    chain
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// One line of a vertical wiring explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEntry {
    /// Name the binding is registered under
    pub name: String,
    /// Lifetime label, e.g. "Singleton"
    pub lifetime: String,
    /// Nesting depth below the requested binding
    pub depth: usize,
}

/// Renders a dependency tree top-down, one binding per line.
///
/// ```text
/// [Transient] usercontroller
/// [Transient]   userservice
/// [Instance ]     userrepository
/// ```
pub fn render_tree(entries: &[ChainEntry]) -> String {
    let width = entries.iter().map(|e| e.lifetime.len()).max().unwrap_or(0);

    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(
            out,
            "[{:<width$}] {}{}",
            entry.lifetime,
            "  ".repeat(entry.depth),
            entry.name,
        );
    }
    out
}

/// Shortens a fully qualified type name for display.
///
/// ```
/// use khazin_support::rendering::shorten_type_name;
///
/// assert_eq!(shorten_type_name("app::services::UserService"), "UserService");
/// assert_eq!(
///     shorten_type_name("alloc::sync::Arc<dyn app::contracts::UserRepository>"),
///     "Arc<dyn UserRepository>"
/// );
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut chars = full_name.chars().peekable();
    let mut segment = String::new();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                segment.clear();
            }
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' => {
                result.push_str(&segment);
                result.push(ch);
                segment.clear();
            }
            _ => segment.push(ch),
        }
    }

    result.push_str(&segment);
    result
}

/// Suggests registered names that look like `requested`.
///
/// Candidates are ranked by edit distance; substring matches always
/// qualify. At most `limit` names are returned, closest first.
///
/// ```
/// use khazin_support::rendering::suggest_similar;
///
/// let known = ["userservice", "userrepository", "clock"];
/// assert_eq!(suggest_similar("userservise", &known, 2)[0], "userservice");
/// ```
pub fn suggest_similar(requested: &str, available: &[impl AsRef<str>], limit: usize) -> Vec<String> {
    let requested = requested.to_lowercase();
    let threshold = (requested.chars().count() / 3).max(1);

    let mut scored: Vec<(usize, &str)> = available
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !name.is_empty() && *name != requested)
        .filter_map(|name| {
            let lowered = name.to_lowercase();
            if lowered.contains(&requested) || requested.contains(&lowered) {
                return Some((0, name));
            }
            let distance = edit_distance(&requested, &lowered);
            (distance <= threshold).then_some((distance, name))
        })
        .collect();

    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, name)| name.to_string())
        .collect()
}

/// Levenshtein distance over chars.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
