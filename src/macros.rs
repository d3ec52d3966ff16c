/// Builds a [`Tag`](crate::Tag) tree from a terse literal description.
///
/// The name comes first, optionally `ns:name`. Values follow after commas,
/// attributes after a `;`, and children after `=>` in square brackets.
/// Every child is itself a `tag!` invocation (or any `Result<Tag>`).
///
/// Evaluates to `Result<Tag>`: invalid identifiers are reported instead of
/// panicking.
///
/// # Examples
///
/// ```rust
/// use sdlang::{tag, to_string};
///
/// let server = tag!("server", "alpha"; "port" = 8080, "tls:enabled" = true => [
///     tag!("path", "/"),
///     tag!("content", 1, 2),
/// ])
/// .unwrap();
///
/// assert_eq!(server.attribute("port").and_then(|v| v.as_i64()), Some(8080));
/// assert_eq!(server.attribute_ns("tls", "enabled").and_then(|v| v.as_bool()), Some(true));
/// assert_eq!(server.child_count(), 2);
/// assert_eq!(
///     to_string(&server).unwrap(),
///     "server \"alpha\" port=8080 tls:enabled=true {\n\tpath \"/\"\n\t1 2\n}\n"
/// );
/// ```
#[macro_export]
macro_rules! tag {
    (
        $name:expr
        $(, $value:expr)*
        $(; $($key:literal = $attr:expr),* $(,)?)?
        $(=> [ $($child:expr),* $(,)? ])?
    ) => {{
        #[allow(clippy::redundant_closure_call)]
        let built = (|| -> $crate::Result<$crate::Tag> {
            let (namespace, name) = $crate::macros::split_qualified($name);
            #[allow(unused_mut)]
            let mut tag = $crate::Tag::with_namespace(namespace, name)?;
            $( tag.add_value($value); )*
            $($(
                let (namespace, name) = $crate::macros::split_qualified($key);
                tag.set_attribute_ns(namespace, name, $attr)?;
            )*)?
            $($( tag.add_child($child?); )*)?
            Ok(tag)
        })();
        built
    }};
}

/// Splits `ns:name` at the first colon; a bare name has the empty namespace.
#[doc(hidden)]
pub fn split_qualified(qualified: &str) -> (&str, &str) {
    qualified.split_once(':').unwrap_or(("", qualified))
}
