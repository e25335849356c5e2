use itertools::Itertools;

/// Helper trait which can be used to display symbols, specifications, configurations
/// and such. This is mainly used for debugging purposes and for surfacing execution
/// traces to a caller, it makes no promise of being parseable.
pub trait Show {
    /// Returns a human readable representation of `self`. A read symbol should come out
    /// as `a`, the empty symbol as `ε`, a stack as the word spelled from top to bottom.
    fn show(&self) -> String;

    /// Show a collection of the thing, for a collection of states this should be
    /// `{q0, q1, q2}`.
    fn show_collection<'a, I: IntoIterator<Item = &'a Self>>(iter: I) -> String
    where
        Self: 'a + Sized,
    {
        format!("{{{}}}", iter.into_iter().map(|x| x.show()).join(", "))
    }
}

impl Show for char {
    fn show(&self) -> String {
        self.to_string()
    }

    fn show_collection<'a, I: IntoIterator<Item = &'a Self>>(iter: I) -> String
    where
        Self: 'a,
    {
        format!("\"{}\"", iter.into_iter().join(""))
    }
}

/// An absent read/write symbol stands for ε (or the blank tape symbol).
impl Show for Option<char> {
    fn show(&self) -> String {
        match self {
            Some(c) => c.to_string(),
            None => "ε".to_string(),
        }
    }
}

impl Show for String {
    fn show(&self) -> String {
        self.clone()
    }
}
