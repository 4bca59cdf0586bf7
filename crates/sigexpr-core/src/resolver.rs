//! Name resolution callbacks used during evaluation.
//!
//! The evaluator never knows where values come from. It asks a
//! [`VariableResolver`] for every identifier and a [`FunctionResolver`] for
//! every call it cannot handle itself. [`ChannelResolver`] binds `v<digit>`
//! names to the current sample of an input channel; [`MapResolver`] binds
//! fixed values and is handy for tests and one-shot evaluation.

use std::collections::HashMap;

/// Maps a variable name to its current value.
///
/// Returning `None` means "unresolved"; the evaluator turns that into an
/// evaluation error. Implementations called from the render loop must not
/// allocate or block.
pub trait VariableResolver {
    /// Resolve `name`, or `None` if it is unknown.
    fn resolve(&self, name: &str) -> Option<f64>;
}

/// Maps a function name and its evaluated arguments to a value.
pub trait FunctionResolver {
    /// Call `name` with `args`, or `None` if it is unknown.
    fn call(&self, name: &str, args: &[f64]) -> Option<f64>;
}

impl<F> VariableResolver for F
where
    F: Fn(&str) -> Option<f64>,
{
    fn resolve(&self, name: &str) -> Option<f64> {
        self(name)
    }
}

/// Function resolver that knows no functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFunctions;

impl FunctionResolver for NoFunctions {
    fn call(&self, _name: &str, _args: &[f64]) -> Option<f64> {
        None
    }
}

/// Parse a channel variable name: `v` followed by exactly one decimal digit.
///
/// ```rust
/// use sigexpr_core::channel_index;
///
/// assert_eq!(channel_index("v3"), Some(3));
/// assert_eq!(channel_index("v12"), None);
/// assert_eq!(channel_index("x0"), None);
/// ```
#[inline]
pub fn channel_index(name: &str) -> Option<usize> {
    match name.as_bytes() {
        [b'v', d] if d.is_ascii_digit() => Some(usize::from(d - b'0')),
        _ => None,
    }
}

/// Resolves `v<digit>` to the sample at the cursor in channel `<digit>`.
///
/// Channels are borrowed for one render pass. Both the channel digit and the
/// cursor are bounds-checked; anything out of range is unresolved rather
/// than read.
#[derive(Debug, Clone, Copy)]
pub struct ChannelResolver<'a> {
    channels: &'a [&'a [f64]],
    cursor: usize,
}

impl<'a> ChannelResolver<'a> {
    /// Bind to a channel set with the cursor at sample 0.
    pub fn new(channels: &'a [&'a [f64]]) -> Self {
        Self {
            channels,
            cursor: 0,
        }
    }

    /// Move the cursor to `index`.
    #[inline]
    pub fn set_cursor(&mut self, index: usize) {
        self.cursor = index;
    }

    /// Current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of bound channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

impl VariableResolver for ChannelResolver<'_> {
    #[inline]
    fn resolve(&self, name: &str) -> Option<f64> {
        let channel = self.channels.get(channel_index(name)?)?;
        channel.get(self.cursor).copied()
    }
}

/// Resolver backed by a fixed name → value table.
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    values: HashMap<String, f64>,
}

impl MapResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style binding.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    /// Bind or rebind `name`.
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }
}

impl VariableResolver for MapResolver {
    fn resolve(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}

impl FromIterator<(String, f64)> for MapResolver {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_index_accepts_single_digit() {
        for d in 0..10 {
            assert_eq!(channel_index(&format!("v{d}")), Some(d));
        }
    }

    #[test]
    fn channel_index_rejects_other_names() {
        for name in ["v", "v10", "va", "V0", "x1", "", "vv"] {
            assert_eq!(channel_index(name), None, "{name}");
        }
    }

    #[test]
    fn channel_resolver_reads_cursor_sample() {
        let a = [1.0, 2.0, 3.0];
        let b = [10.0, 20.0, 30.0];
        let channels: [&[f64]; 2] = [&a, &b];
        let mut resolver = ChannelResolver::new(&channels);

        assert_eq!(resolver.resolve("v0"), Some(1.0));
        resolver.set_cursor(2);
        assert_eq!(resolver.resolve("v1"), Some(30.0));
        assert_eq!(resolver.cursor(), 2);
    }

    #[test]
    fn channel_resolver_rejects_missing_channel() {
        let a = [1.0];
        let channels: [&[f64]; 1] = [&a];
        let resolver = ChannelResolver::new(&channels);
        assert_eq!(resolver.resolve("v1"), None);
        assert_eq!(resolver.resolve("v9"), None);
    }

    #[test]
    fn channel_resolver_rejects_cursor_past_channel_end() {
        let a = [1.0];
        let channels: [&[f64]; 1] = [&a];
        let mut resolver = ChannelResolver::new(&channels);
        resolver.set_cursor(1);
        assert_eq!(resolver.resolve("v0"), None);
    }

    #[test]
    fn map_resolver_lookup() {
        let resolver = MapResolver::new().with("gain", 0.5);
        assert_eq!(resolver.resolve("gain"), Some(0.5));
        assert_eq!(resolver.resolve("v0"), None);
    }

    #[test]
    fn closures_are_resolvers() {
        let resolver = |name: &str| (name == "x").then_some(4.0);
        assert_eq!(resolver.resolve("x"), Some(4.0));
        assert_eq!(resolver.resolve("y"), None);
    }
}
