//! Text rendering utilities for diagnostics.
//!
//! Type names produced by [`std::any::type_name`] are long and noisy.
//! These helpers turn them into something a human can scan in an
//! error message or a container dump.

/// Renders an inheritance chain as a readable string.
///
/// # Examples
/// ```
/// use autobind_support::rendering::render_chain;
///
/// let chain = vec!["Bar", "Foo", "Base", "Bar"];
/// assert_eq!(render_chain(&chain), "Bar → Foo → Base → Bar");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    let mut out = String::new();
    for (i, link) in chain.iter().enumerate() {
        if i > 0 {
            out.push_str(" → ");
        }
        out.push_str(link.as_ref());
    }
    out
}

/// Renders a single binding line: `contract ← implementation [lifecycle]`.
///
/// Both names are shortened with [`shorten_type_name`].
///
/// ```
/// use autobind_support::rendering::render_binding;
///
/// let line = render_binding("dyn app::IFoo", "app::Foo", "Singleton");
/// assert_eq!(line, "dyn IFoo ← Foo [Singleton]");
/// ```
pub fn render_binding(contract: &str, implementation: &str, annotation: &str) -> String {
    format!(
        "{} ← {} [{annotation}]",
        shorten_type_name(contract),
        shorten_type_name(implementation),
    )
}

/// Strips module paths from every path inside a type name.
///
/// ```
/// use autobind_support::rendering::shorten_type_name;
///
/// let short = shorten_type_name("my_app::services::user::UserService");
/// assert_eq!(short, "UserService");
///
/// let short = shorten_type_name("dyn my_app::handlers::Handler<my_app::Ping>");
/// assert_eq!(short, "dyn Handler<Ping>");
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut out = String::with_capacity(full_name.len());
    let mut start = 0;

    for (i, ch) in full_name.char_indices() {
        if is_delimiter(ch) {
            out.push_str(last_segment(&full_name[start..i]));
            out.push(ch);
            start = i + ch.len_utf8();
        }
    }

    out.push_str(last_segment(&full_name[start..]));
    out
}

fn is_delimiter(ch: char) -> bool {
    matches!(ch, '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&')
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Suggests described type names close to a requested one.
///
/// Names are compared without their module paths, ignoring case. A
/// candidate qualifies when one short name contains the other or when
/// they are a few edits apart; closer candidates come first.
///
/// ```
/// use autobind_support::rendering::suggest_similar;
///
/// let described = ["app::UserService", "app::Mailer"];
/// assert_eq!(suggest_similar("app::UserServise", &described, 3), vec!["app::UserService"]);
/// ```
pub fn suggest_similar(requested: &str, available: &[&str], max_suggestions: usize) -> Vec<String> {
    let wanted = shorten_type_name(requested).to_lowercase();

    let mut ranked: Vec<(usize, &str)> = available
        .iter()
        .filter(|name| **name != requested)
        .filter_map(|name| {
            let candidate = shorten_type_name(name).to_lowercase();
            if candidate.contains(&wanted) || wanted.contains(&candidate) {
                return Some((0, *name));
            }

            let distance = strsim::levenshtein(&wanted, &candidate);
            let tolerance = (wanted.chars().count() / 3).max(1);
            (distance <= tolerance).then_some((distance, *name))
        })
        .collect();

    // stable: equal distances keep the caller's order
    ranked.sort_by_key(|(distance, _)| *distance);
    ranked
        .into_iter()
        .take(max_suggestions)
        .map(|(_, name)| name.to_string())
        .collect()
}
