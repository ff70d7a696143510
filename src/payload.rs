use std::borrow::Cow;

/// Marker trait for values carried by a [`TypedEnvelope`](crate::TypedEnvelope).
///
/// A fresh typed envelope takes its `message_type` from [`Payload::message_type`].
/// The default implementation returns the bare type name: module paths and generic
/// arguments are dropped, so `my_app::orders::OrderPlaced` becomes `"OrderPlaced"` and
/// `Batch<my_app::orders::OrderPlaced>` becomes `"Batch"`.
///
/// `#[derive(Payload)]` follows the same rule, or uses a custom name given with
/// `#[payload(message_type = "...")]`.
pub trait Payload {
    fn message_type() -> Cow<'static, str> {
        Cow::Owned(short_type_name(std::any::type_name::<Self>()))
    }
}

/// Drops generic argument lists and every `path::` prefix from a fully qualified type name.
fn short_type_name(full: &str) -> String {
    let mut short = String::with_capacity(full.len());
    let mut segment = String::new();
    let mut depth = 0usize;
    let mut prev = None;
    for c in full.chars() {
        match c {
            '<' => depth += 1,
            '>' if prev != Some('-') && depth > 0 => depth -= 1,
            _ if depth > 0 => {}
            '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&' | '*' => {
                short.push_str(last_path_segment(&segment));
                short.push(c);
                segment.clear();
            }
            _ => segment.push(c),
        }
        prev = Some(c);
    }
    short.push_str(last_path_segment(&segment));
    short
}

fn last_path_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

impl Payload for String {}
impl Payload for Vec<u8> {}

#[cfg(test)]
mod tests {
    use super::*;

    struct OrderPlaced;
    impl Payload for OrderPlaced {}

    struct Batch<T>(#[allow(dead_code)] Vec<T>);
    impl<T> Payload for Batch<T> {}

    #[test]
    fn default_name_is_unqualified() {
        assert_eq!(OrderPlaced::message_type(), "OrderPlaced");
    }

    #[test]
    fn generic_arguments_are_dropped() {
        assert_eq!(Batch::<OrderPlaced>::message_type(), "Batch");
        assert_eq!(Batch::<Batch<OrderPlaced>>::message_type(), "Batch");
        assert_eq!(String::message_type(), "String");
        assert_eq!(Vec::<u8>::message_type(), "Vec");
    }

    #[test]
    fn short_type_name_handles_tuples_and_references() {
        assert_eq!(
            short_type_name("(alloc::string::String, &core::option::Option<a::B>)"),
            "(String, &Option)"
        );
        assert_eq!(short_type_name("a::Wrap<fn() -> a::B>"), "Wrap");
        assert_eq!(short_type_name("[a::B; 4]"), "[B; 4]");
    }
}
