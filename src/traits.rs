/// Anything that has a canonical form used for comparison, e.g. a match
/// criterion with an unordered set of CoS values or a MAC address.
///
/// Parsed and declared values must both pass through `normalize` before they
/// are compared, otherwise a re-run against an unchanged device is not a no-op.
pub trait Normalize {
    /// Rewrite `self` into its canonical form, in place.
    fn normalize(&mut self);

    /// Consume `self` and return its canonical form.
    fn normalized(mut self) -> Self
    where
        Self: Sized,
    {
        self.normalize();
        self
    }
}

impl<T: Normalize> Normalize for Option<T> {
    fn normalize(&mut self) {
        if let Some(inner) = self {
            inner.normalize();
        }
    }
}

/// Free-form values compare without surrounding whitespace, the way the
/// grammar captures them.
impl Normalize for String {
    fn normalize(&mut self) {
        let trimmed = self.trim();
        if trimmed.len() != self.len() {
            *self = trimmed.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_is_trimmed() {
        assert_eq!(" audio ".to_string().normalized(), "audio");
        assert_eq!("voice".to_string().normalized(), "voice");
    }

    #[test]
    fn test_option_normalizes_its_value() {
        assert_eq!(Some("\tvideo".to_string()).normalized(), Some("video".to_string()));
        assert_eq!(None::<String>.normalized(), None);
    }
}
