use std::fmt::Display;

/// Join the display forms of `items` with `separator`.
pub fn join<T: Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

/// One item per line, without a trailing newline.
pub fn join_lines<T: Display>(items: &[T]) -> String {
    join(items, "\n")
}
