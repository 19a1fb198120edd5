/// Lazily compiled, process-wide regex for a literal pattern.
///
/// Only for patterns written in the source; user-supplied patterns go through
/// `rules::capture::Pattern::compile` so that errors are reported.
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}
